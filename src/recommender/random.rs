//! Random recommender implementation.

use parking_lot::Mutex;

use crate::config::RecommenderConfig;
use crate::error::{Error, Result};
use crate::objective::Objective;
use crate::parameter::Parameter;
use crate::rng_util;
use crate::searchspace::SearchSpace;
use crate::table::Table;
use crate::value::Value;

use super::Recommender;

/// A model-free recommender that samples candidates uniformly at random.
///
/// Discrete candidates are drawn without replacement from the search
/// space's grid; continuous parameters are sampled uniformly within their
/// bounds. The measurement history and objective are ignored, which makes
/// this recommender a natural initial phase before a surrogate-model
/// backend has enough data to fit.
///
/// # Examples
///
/// ```
/// use bayopt::recommender::RandomRecommender;
///
/// // Create with a default random seed
/// let recommender = RandomRecommender::new();
///
/// // Create with a fixed seed for reproducibility
/// let recommender = RandomRecommender::with_seed(42);
/// ```
#[derive(Debug)]
pub struct RandomRecommender {
    rng: Mutex<fastrand::Rng>,
    seed: Option<u64>,
}

impl RandomRecommender {
    /// Creates a new random recommender with a default random seed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::new()),
            seed: None,
        }
    }

    /// Creates a new random recommender with a fixed seed.
    ///
    /// Using the same seed produces the same sequence of batches.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
            seed: Some(seed),
        }
    }
}

impl Default for RandomRecommender {
    fn default() -> Self {
        Self::new()
    }
}

impl Recommender for RandomRecommender {
    fn recommend(
        &self,
        batch_size: usize,
        searchspace: &SearchSpace,
        _objective: Option<&Objective>,
        _measurements: &Table,
        _pending_experiments: Option<&Table>,
    ) -> Result<Table> {
        let mut rng = self.rng.lock();

        let discrete = searchspace.discrete();
        let mut batch = if discrete.is_empty() {
            Table::default()
        } else {
            let available = discrete.exp_rep().n_rows();
            if batch_size > available {
                return Err(Error::InsufficientCandidates {
                    requested: batch_size,
                    available,
                });
            }
            // Partial Fisher-Yates: only the first batch_size slots are fixed.
            let mut indices: Vec<usize> = (0..available).collect();
            for i in 0..batch_size {
                let j = rng.usize(i..available);
                indices.swap(i, j);
            }
            discrete.exp_rep().select_rows(&indices[..batch_size])
        };

        for parameter in searchspace.continuous().parameters() {
            let Parameter::NumericalContinuous { name, low, high } = parameter else {
                return Err(Error::Internal("discrete parameter in continuous subspace"));
            };
            let cells = (0..batch_size)
                .map(|_| Value::Float(rng_util::f64_range(&mut rng, *low, *high)))
                .collect();
            batch.add_column(name.clone(), cells)?;
        }

        Ok(batch)
    }

    fn name(&self) -> &str {
        "RandomRecommender"
    }

    fn to_config(&self) -> Result<RecommenderConfig> {
        Ok(RecommenderConfig::Random { seed: self.seed })
    }
}
