//! Meta recommenders that switch between underlying recommenders based on
//! the experimentation progress.
//!
//! Each variant separates its declarative configuration from the runtime
//! bookkeeping it accumulates across calls: configuration lives in plain
//! immutable fields, state lives behind a [`Mutex`] and is only ever
//! touched through [`select_recommender`](MetaRecommender::select_recommender)
//! and [`recommend`](MetaRecommender::recommend).
//!
//! All variants share one contract: the measurement count observed across
//! successive calls must be non-decreasing. A shrinking count is a usage
//! error ([`Error::DatasetShrank`]), not a transient condition, because a
//! campaign's measurement history is append-only.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::MetaRecommenderConfig;
use crate::error::{Error, Result};
use crate::objective::Objective;
use crate::searchspace::SearchSpace;
use crate::table::Table;

use super::Recommender;

/// Exhaustion policy of a [`SequentialMetaRecommender`].
///
/// Defines what happens when the last recommender in the sequence has been
/// consumed but additional recommender changes are triggered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionMode {
    /// Signal [`Error::NoRecommendersLeft`].
    #[default]
    Raise,
    /// Keep using the last recommender indefinitely.
    ReuseLast,
    /// Restart from the beginning of the sequence.
    Cyclic,
}

/// Trait for recommenders that delegate to an underlying recommender
/// chosen from the experimentation progress.
pub trait MetaRecommender: Send + Sync {
    /// Selects the underlying recommender for the given measurement count.
    ///
    /// Selection reads the current phase/position and may latch internal
    /// state (a two-phase switch, a sequence advance) as a side effect.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DatasetShrank`] if the count decreased since the
    /// last call and [`Error::NoRecommendersLeft`] on sequence exhaustion.
    fn select_recommender(&self, n_measurements: usize) -> Result<Arc<dyn Recommender>>;

    /// Recommends the next batch by delegating to the selected underlying
    /// recommender, then updates the meta recommender's own bookkeeping.
    ///
    /// # Errors
    ///
    /// Any error from selection or from the underlying recommender; in the
    /// error case the bookkeeping is left untouched.
    fn recommend(
        &self,
        batch_size: usize,
        searchspace: &SearchSpace,
        objective: Option<&Objective>,
        measurements: &Table,
        pending_experiments: Option<&Table>,
    ) -> Result<Table>;

    /// Returns the declarative configuration of this meta recommender.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSerializable`] for meta recommenders without a
    /// serializable identity (the streaming variant, or any variant
    /// wrapping a non-serializable underlying recommender).
    fn to_config(&self) -> Result<MetaRecommenderConfig>;
}

/// A two-phased meta recommender that switches at a specified point.
///
/// The switch happens when a recommendation is requested and the total
/// number of collected measurements (including any gathered before this
/// meta recommender was active) is at least `switch_after`. If
/// `remain_switched` is set, the switch is sticky: the post-switch
/// recommender keeps being used even if a later call observes fewer
/// measurements than the threshold.
///
/// Throughout each phase the **same** recommender object is reused; no new
/// instances are created. Keep that in mind with stateful recommenders.
///
/// # Examples
///
/// ```
/// use bayopt::recommender::{
///     MetaRecommender, RandomRecommender, Recommender, TwoPhaseMetaRecommender,
/// };
///
/// let meta = TwoPhaseMetaRecommender::new(
///     RandomRecommender::with_seed(0),
///     RandomRecommender::with_seed(1),
///     3,
/// );
/// // Below the threshold the initial recommender is selected.
/// let selected = meta.select_recommender(2).unwrap();
/// assert_eq!(selected.name(), "RandomRecommender");
/// ```
pub struct TwoPhaseMetaRecommender {
    initial_recommender: Arc<dyn Recommender>,
    recommender: Arc<dyn Recommender>,
    switch_after: usize,
    remain_switched: bool,
    has_switched: Mutex<bool>,
}

impl TwoPhaseMetaRecommender {
    /// Creates a two-phase meta recommender switching once the measurement
    /// count reaches `switch_after`.
    pub fn new(
        initial_recommender: impl Recommender + 'static,
        recommender: impl Recommender + 'static,
        switch_after: usize,
    ) -> Self {
        Self::from_arcs(
            Arc::new(initial_recommender),
            Arc::new(recommender),
            switch_after,
        )
    }

    /// Creates a two-phase meta recommender from shared recommenders.
    #[must_use]
    pub fn from_arcs(
        initial_recommender: Arc<dyn Recommender>,
        recommender: Arc<dyn Recommender>,
        switch_after: usize,
    ) -> Self {
        Self {
            initial_recommender,
            recommender,
            switch_after,
            remain_switched: false,
            has_switched: Mutex::new(false),
        }
    }

    /// Keeps the recommender switched even if the measurement count later
    /// drops below the threshold.
    #[must_use]
    pub fn remain_switched(mut self, remain: bool) -> Self {
        self.remain_switched = remain;
        self
    }
}

impl MetaRecommender for TwoPhaseMetaRecommender {
    fn select_recommender(&self, n_measurements: usize) -> Result<Arc<dyn Recommender>> {
        let mut has_switched = self.has_switched.lock();
        if n_measurements >= self.switch_after || (*has_switched && self.remain_switched) {
            if !*has_switched {
                trace_debug!(
                    n_measurements,
                    switch_after = self.switch_after,
                    "two-phase meta recommender switched"
                );
            }
            *has_switched = true;
            Ok(Arc::clone(&self.recommender))
        } else {
            Ok(Arc::clone(&self.initial_recommender))
        }
    }

    fn recommend(
        &self,
        batch_size: usize,
        searchspace: &SearchSpace,
        objective: Option<&Objective>,
        measurements: &Table,
        pending_experiments: Option<&Table>,
    ) -> Result<Table> {
        let recommender = self.select_recommender(measurements.n_rows())?;
        recommender.recommend(
            batch_size,
            searchspace,
            objective,
            measurements,
            pending_experiments,
        )
    }

    fn to_config(&self) -> Result<MetaRecommenderConfig> {
        Ok(MetaRecommenderConfig::TwoPhase {
            initial_recommender: self.initial_recommender.to_config()?,
            recommender: self.recommender.to_config()?,
            switch_after: self.switch_after,
            remain_switched: self.remain_switched,
        })
    }
}

/// Runtime bookkeeping of a [`SequentialMetaRecommender`].
#[derive(Debug)]
struct SequentialState {
    /// Position in the recommender sequence.
    step: usize,
    /// Whether the recommender at the current position produced a batch.
    was_used: bool,
    /// The measurement count recorded at the last successful recommend call.
    n_last_measurements: usize,
}

/// A meta recommender that walks a pre-defined sequence of recommenders.
///
/// The sequence advances exactly once per strictly-increasing measurement
/// count observation: a new recommender is taken whenever the current one
/// has produced a batch **and** the measurement count grew since that
/// batch. The content of the measurements is ignored, only the count
/// matters.
///
/// For infinite or lazily produced sequences see
/// [`StreamingSequentialMetaRecommender`].
#[derive(Debug)]
pub struct SequentialMetaRecommender {
    recommenders: Vec<Arc<dyn Recommender>>,
    mode: ExhaustionMode,
    state: Mutex<SequentialState>,
}

impl SequentialMetaRecommender {
    /// Creates a sequential meta recommender in [`ExhaustionMode::Raise`]
    /// mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyRecommenderSequence`] if no recommenders are
    /// given.
    pub fn new(recommenders: impl IntoIterator<Item = Arc<dyn Recommender>>) -> Result<Self> {
        let recommenders: Vec<Arc<dyn Recommender>> = recommenders.into_iter().collect();
        if recommenders.is_empty() {
            return Err(Error::EmptyRecommenderSequence);
        }
        Ok(Self {
            recommenders,
            mode: ExhaustionMode::Raise,
            state: Mutex::new(SequentialState {
                step: 0,
                was_used: false,
                n_last_measurements: 0,
            }),
        })
    }

    /// Sets the exhaustion policy.
    #[must_use]
    pub fn mode(mut self, mode: ExhaustionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Resolves the recommender at the given sequence position according
    /// to the exhaustion policy.
    fn recommender_at(&self, step: usize) -> Result<Arc<dyn Recommender>> {
        let index = match self.mode {
            ExhaustionMode::ReuseLast => step.min(self.recommenders.len() - 1),
            ExhaustionMode::Cyclic => step % self.recommenders.len(),
            ExhaustionMode::Raise => {
                if step >= self.recommenders.len() {
                    return Err(Error::NoRecommendersLeft {
                        requested: step + 1,
                        available: self.recommenders.len(),
                    });
                }
                step
            }
        };
        Ok(Arc::clone(&self.recommenders[index]))
    }
}

impl MetaRecommender for SequentialMetaRecommender {
    fn select_recommender(&self, n_measurements: usize) -> Result<Arc<dyn Recommender>> {
        let mut state = self.state.lock();

        // A shrinking measurement history means the meta recommender was
        // not used as intended; fail before resolving any recommender.
        if n_measurements < state.n_last_measurements {
            return Err(Error::DatasetShrank {
                last: state.n_last_measurements,
                current: n_measurements,
            });
        }

        let more_data = n_measurements > state.n_last_measurements;
        if !state.was_used || !more_data {
            return self.recommender_at(state.step);
        }

        state.step += 1;
        state.was_used = false;
        trace_debug!(step = state.step, "sequential meta recommender advanced");
        self.recommender_at(state.step)
    }

    fn recommend(
        &self,
        batch_size: usize,
        searchspace: &SearchSpace,
        objective: Option<&Objective>,
        measurements: &Table,
        pending_experiments: Option<&Table>,
    ) -> Result<Table> {
        let n_measurements = measurements.n_rows();
        let recommender = self.select_recommender(n_measurements)?;
        let batch = recommender.recommend(
            batch_size,
            searchspace,
            objective,
            measurements,
            pending_experiments,
        )?;

        let mut state = self.state.lock();
        state.was_used = true;
        state.n_last_measurements = n_measurements;
        Ok(batch)
    }

    fn to_config(&self) -> Result<MetaRecommenderConfig> {
        Ok(MetaRecommenderConfig::Sequential {
            recommenders: self
                .recommenders
                .iter()
                .map(|r| r.to_config())
                .collect::<Result<_>>()?,
            mode: self.mode,
        })
    }
}

/// The caller-supplied producer feeding a
/// [`StreamingSequentialMetaRecommender`]: a next-or-exhausted function.
type RecommenderSource = Box<dyn FnMut() -> Option<Arc<dyn Recommender>> + Send>;

/// Runtime bookkeeping of a [`StreamingSequentialMetaRecommender`].
struct StreamingState {
    source: RecommenderSource,
    /// Number of recommenders pulled from the source so far.
    step: usize,
    /// The measurement count observed at the last call; `None` until the
    /// first call so that the first call always advances.
    n_last_measurements: Option<usize>,
    /// The recommender returned from the last call.
    last_recommender: Option<Arc<dyn Recommender>>,
}

/// A meta recommender that pulls recommenders from a lazy, possibly
/// infinite source.
///
/// Advancement follows the same rules as [`SequentialMetaRecommender`],
/// but the source is consumed one pull at a time and cannot be rewound:
/// exhaustion ([`Error::NoRecommendersLeft`]) is non-recoverable and there
/// is no exhaustion-mode policy.
///
/// This variant is fundamentally **non-restartable and non-serializable**
/// because the lazy source has no serializable identity;
/// [`to_config`](MetaRecommender::to_config) always fails with
/// [`Error::NotSerializable`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use bayopt::recommender::{
///     MetaRecommender, RandomRecommender, Recommender, StreamingSequentialMetaRecommender,
/// };
///
/// // An infinite source of freshly seeded recommenders.
/// let mut seed = 0;
/// let meta = StreamingSequentialMetaRecommender::from_source(move || {
///     seed += 1;
///     Some(Arc::new(RandomRecommender::with_seed(seed)) as Arc<dyn Recommender>)
/// });
///
/// assert!(meta.select_recommender(0).is_ok());
/// assert!(meta.to_config().is_err());
/// ```
pub struct StreamingSequentialMetaRecommender {
    state: Mutex<StreamingState>,
}

impl StreamingSequentialMetaRecommender {
    /// Creates a streaming meta recommender from a next-or-exhausted
    /// producer function.
    pub fn from_source(
        source: impl FnMut() -> Option<Arc<dyn Recommender>> + Send + 'static,
    ) -> Self {
        Self {
            state: Mutex::new(StreamingState {
                source: Box::new(source),
                step: 0,
                n_last_measurements: None,
                last_recommender: None,
            }),
        }
    }

    /// Creates a streaming meta recommender draining the given iterator.
    pub fn from_iterator<I>(recommenders: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Recommender>>,
        I::IntoIter: Send + 'static,
    {
        let mut iter = recommenders.into_iter();
        Self::from_source(move || iter.next())
    }
}

impl MetaRecommender for StreamingSequentialMetaRecommender {
    fn select_recommender(&self, n_measurements: usize) -> Result<Arc<dyn Recommender>> {
        let mut state = self.state.lock();

        if let Some(last) = state.n_last_measurements {
            if n_measurements < last {
                return Err(Error::DatasetShrank {
                    last,
                    current: n_measurements,
                });
            }
        }

        // The sentinel `None` compares below any valid count, so the first
        // call always advances the source.
        let advance = state
            .n_last_measurements
            .map_or(true, |last| n_measurements > last);
        if advance {
            match (state.source)() {
                Some(recommender) => {
                    state.step += 1;
                    state.last_recommender = Some(recommender);
                    trace_debug!(step = state.step, "streaming meta recommender advanced");
                }
                None => {
                    return Err(Error::NoRecommendersLeft {
                        requested: state.step + 1,
                        available: state.step,
                    });
                }
            }
        }

        state.n_last_measurements = Some(n_measurements);
        state
            .last_recommender
            .clone()
            .ok_or(Error::Internal("streaming state has no recommender"))
    }

    fn recommend(
        &self,
        batch_size: usize,
        searchspace: &SearchSpace,
        objective: Option<&Objective>,
        measurements: &Table,
        pending_experiments: Option<&Table>,
    ) -> Result<Table> {
        let recommender = self.select_recommender(measurements.n_rows())?;
        recommender.recommend(
            batch_size,
            searchspace,
            objective,
            measurements,
            pending_experiments,
        )
    }

    fn to_config(&self) -> Result<MetaRecommenderConfig> {
        // The lazy source cannot be replayed; refusing here keeps the
        // failure at the serialization boundary instead of silently
        // dropping state.
        Err(Error::NotSerializable {
            type_name: "StreamingSequentialMetaRecommender".to_owned(),
        })
    }
}
