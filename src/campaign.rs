//! Campaign orchestration: the main point of interaction.
//!
//! A campaign owns the search space, the objective, the recommender, and
//! the measurement history, and mediates between them: measurements flow
//! in through [`add_measurements`](Campaign::add_measurements), batches of
//! recommended experiments flow out through
//! [`recommend`](Campaign::recommend).

use std::sync::Arc;

use crate::config::MetaRecommenderConfig;
use crate::error::{Error, Result};
use crate::objective::Objective;
use crate::parameter::Parameter;
use crate::recommender::MetaRecommender;
use crate::searchspace::{SearchSpace, SearchSpaceType};
use crate::table::Table;
use crate::telemetry::{labels, MetricsSink, NoopMetricsSink};
use crate::value::Value;

/// Name of the measurement column tagging each row with its batch number.
pub const BATCH_NR_COLUMN: &str = "BatchNr";

/// Name of the measurement column tagging each row with the fit cycle it
/// was first used in. Unset (missing) until the next recommendation is
/// computed.
pub const FIT_NR_COLUMN: &str = "FitNr";

/// Defines and records an experimentation process.
///
/// A campaign is single-threaded, synchronous state: measurement history
/// and the recommendation cache are exclusively owned, and callers must
/// serialize access externally when sharing an instance across threads.
///
/// # Examples
///
/// ```
/// use bayopt::prelude::*;
///
/// let searchspace = SearchSpace::new(vec![
///     Parameter::numerical_discrete("Temperature", [10.0, 20.0, 30.0], 0.5).unwrap(),
///     Parameter::categorical("Solvent", ["water", "ethanol"]).unwrap(),
/// ])
/// .unwrap();
/// let recommender = TwoPhaseMetaRecommender::new(
///     RandomRecommender::with_seed(42),
///     RandomRecommender::with_seed(1337),
///     2,
/// );
/// let mut campaign = Campaign::new(
///     searchspace,
///     Some(Objective::single(Target::max("Yield"))),
///     recommender,
/// );
///
/// let batch = campaign.recommend(3).unwrap();
/// assert_eq!(batch.n_rows(), 3);
///
/// // Report the measured outcomes back.
/// let mut measured = batch.clone();
/// measured
///     .add_column(
///         "Yield",
///         vec![Value::Float(0.5), Value::Float(0.7), Value::Float(0.6)],
///     )
///     .unwrap();
/// campaign.add_measurements(&measured, true).unwrap();
/// assert_eq!(campaign.n_batches_done(), 1);
/// ```
pub struct Campaign {
    pub(crate) searchspace: SearchSpace,
    pub(crate) objective: Option<Objective>,
    pub(crate) recommender: Box<dyn MetaRecommender>,
    pub(crate) n_batches_done: usize,
    pub(crate) n_fits_done: usize,
    pub(crate) measurements: Table,
    pub(crate) cached_recommendation: Table,
    pub(crate) metrics: Arc<dyn MetricsSink>,
}

impl std::fmt::Debug for Campaign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Campaign")
            .field("n_batches_done", &self.n_batches_done)
            .field("n_fits_done", &self.n_fits_done)
            .finish_non_exhaustive()
    }
}

impl Campaign {
    /// Creates a campaign.
    pub fn new(
        searchspace: SearchSpace,
        objective: Option<Objective>,
        recommender: impl MetaRecommender + 'static,
    ) -> Self {
        Self::from_parts(searchspace, objective, Box::new(recommender))
    }

    pub(crate) fn from_parts(
        searchspace: SearchSpace,
        objective: Option<Objective>,
        recommender: Box<dyn MetaRecommender>,
    ) -> Self {
        Self {
            searchspace,
            objective,
            recommender,
            n_batches_done: 0,
            n_fits_done: 0,
            measurements: Table::default(),
            cached_recommendation: Table::default(),
            metrics: Arc::new(NoopMetricsSink),
        }
    }

    /// Replaces the metrics sink, e.g. with a real exporter or a counting
    /// stub in tests.
    #[must_use]
    pub fn with_metrics(mut self, metrics: impl MetricsSink + 'static) -> Self {
        self.metrics = Arc::new(metrics);
        self
    }

    /// Returns the search space.
    #[must_use]
    pub fn searchspace(&self) -> &SearchSpace {
        &self.searchspace
    }

    /// Returns the objective, if any.
    #[must_use]
    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    /// Returns the parameters of the underlying search space.
    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.searchspace.parameters()
    }

    /// Returns the experimental data added to the campaign.
    #[must_use]
    pub fn measurements(&self) -> &Table {
        &self.measurements
    }

    /// Returns the number of measurement batches accepted so far.
    #[must_use]
    pub fn n_batches_done(&self) -> usize {
        self.n_batches_done
    }

    /// Returns the number of fit cycles performed so far.
    #[must_use]
    pub fn n_fits_done(&self) -> usize {
        self.n_fits_done
    }

    pub(crate) fn recommender_config(&self) -> Result<MetaRecommenderConfig> {
        self.recommender.to_config()
    }

    /// Adds a batch of measured experiments to the internal database.
    ///
    /// Each call is one batch: the rows are appended to the measurement
    /// history tagged with an incremented batch number and an unset fit
    /// number, and matching discrete search-space entries are flagged as
    /// measured. `within_tolerance` controls whether numerical values must
    /// lie within their parameter's tolerance to match a grid entry.
    ///
    /// The recommendation cache is invalidated before any validation runs,
    /// so a failed call never leaves a stale cache behind.
    ///
    /// # Errors
    ///
    /// Returns a validation error — and leaves the measurement history
    /// untouched — if a target column has missing
    /// ([`Error::MissingTargetValues`]) or non-numeric
    /// ([`Error::NonNumericTarget`]) values, or a parameter column has
    /// missing ([`Error::MissingParameterValues`]) or (for numerical
    /// parameters) non-numeric ([`Error::NonNumericParameter`]) entries.
    /// Absent columns are [`Error::MissingColumn`].
    pub fn add_measurements(&mut self, data: &Table, within_tolerance: bool) -> Result<()> {
        // Invalidate the cache before anything below can fail, so a
        // half-applied cache never lingers.
        self.cached_recommendation = Table::default();

        if let Some(objective) = &self.objective {
            for target in objective.targets() {
                let column = data.column(&target.name)?;
                if column.iter().any(Value::is_missing) {
                    return Err(Error::MissingTargetValues {
                        target: target.name.clone(),
                    });
                }
                if column.iter().any(|v| !v.is_numeric()) {
                    return Err(Error::NonNumericTarget {
                        target: target.name.clone(),
                    });
                }
            }
        }

        for parameter in self.searchspace.parameters() {
            let column = data.column(parameter.name())?;
            if column.iter().any(Value::is_missing) {
                return Err(Error::MissingParameterValues {
                    parameter: parameter.name().to_owned(),
                });
            }
            if parameter.is_numerical() && column.iter().any(|v| !v.is_numeric()) {
                return Err(Error::NonNumericParameter {
                    parameter: parameter.name().to_owned(),
                });
            }
        }

        if matches!(
            self.searchspace.space_type(),
            SearchSpaceType::Discrete | SearchSpaceType::Hybrid
        ) {
            self.searchspace.mark_as_measured(data, within_tolerance)?;
        }

        self.n_batches_done += 1;
        let mut to_insert = data.clone();
        let batch_nr = i64::try_from(self.n_batches_done)
            .map_err(|_| Error::Internal("batch counter overflow"))?;
        to_insert.add_column(
            BATCH_NR_COLUMN,
            vec![Value::Int(batch_nr); data.n_rows()],
        )?;
        to_insert.add_column(FIT_NR_COLUMN, vec![Value::Missing; data.n_rows()])?;
        self.measurements.append(&to_insert)?;

        trace_info!(
            n_rows = data.n_rows(),
            batch_nr = self.n_batches_done,
            "measurements added"
        );
        self.metrics.record_value(labels::COUNT_ADD_RESULTS, 1.0);
        Ok(())
    }

    /// Provides the recommendations for the next batch of experiments.
    ///
    /// If a cached batch of exactly `batch_size` rows exists, it is
    /// returned verbatim without consulting the recommender. The cache is
    /// keyed on size only, not on measurement state: re-asking with the
    /// same size before adding data intentionally returns the identical
    /// batch (idempotent re-ask). Adding measurements invalidates the
    /// cache.
    ///
    /// Otherwise, if measurements exist, the fit counter is incremented
    /// and rows not yet associated with a fit cycle are tagged with it;
    /// the meta recommender then produces the batch, which is cached and
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBatchSize`] for `batch_size < 1` and any
    /// error from the meta recommender (including
    /// [`Error::DatasetShrank`] and [`Error::NoRecommendersLeft`]).
    pub fn recommend(&mut self, batch_size: usize) -> Result<Table> {
        if batch_size < 1 {
            return Err(Error::InvalidBatchSize { batch_size });
        }

        if self.cached_recommendation.n_rows() == batch_size {
            trace_debug!(batch_size, "returning cached recommendation");
            return Ok(self.cached_recommendation.clone());
        }

        if self.measurements.n_rows() > 0 {
            self.n_fits_done += 1;
            let fit_nr = i64::try_from(self.n_fits_done)
                .map_err(|_| Error::Internal("fit counter overflow"))?;
            self.measurements
                .fill_missing(FIT_NR_COLUMN, &Value::Int(fit_nr))?;
        } else {
            self.metrics
                .record_value(labels::NAKED_INITIAL_RECOMMENDATION, 1.0);
        }

        let batch = self.recommender.recommend(
            batch_size,
            &self.searchspace,
            self.objective.as_ref(),
            &self.measurements,
            None,
        )?;

        self.cached_recommendation = batch.clone();

        trace_info!(batch_size, n_fits_done = self.n_fits_done, "batch recommended");
        self.metrics.record_value(labels::COUNT_RECOMMEND, 1.0);
        #[allow(clippy::cast_precision_loss)]
        self.metrics
            .record_value(labels::BATCH_SIZE, batch_size as f64);

        Ok(batch)
    }
}
