//! Recommender trait and implementations.
//!
//! A [`Recommender`] produces a batch of candidate experiments given the
//! search space, objective, and measurement history. Surrogate-model
//! backends (Gaussian-process regressors behind an acquisition optimizer,
//! gradient boosting, ...) live outside this crate and plug in through
//! this trait; the crate itself ships the model-free
//! [`RandomRecommender`] plus the meta recommenders in [`meta`] that
//! select among underlying recommenders as a campaign progresses.

pub mod meta;
pub mod random;

pub use meta::{
    ExhaustionMode, MetaRecommender, SequentialMetaRecommender,
    StreamingSequentialMetaRecommender, TwoPhaseMetaRecommender,
};
pub use random::RandomRecommender;

use crate::config::RecommenderConfig;
use crate::error::{Error, Result};
use crate::objective::Objective;
use crate::searchspace::SearchSpace;
use crate::table::Table;

/// Trait for strategies producing a batch of candidate experiments.
///
/// Implementations must be deterministic given identical inputs and
/// internal state, except where they intentionally sample randomly. The
/// trait requires `Send + Sync` so recommenders can be shared behind
/// `Arc` by the meta recommenders.
pub trait Recommender: Send + Sync + std::fmt::Debug {
    /// Recommends the next batch of experiments.
    ///
    /// # Arguments
    ///
    /// * `batch_size` - Number of candidates to return; the result has
    ///   exactly this many rows (recommendation is all-or-nothing).
    /// * `searchspace` - The space to recommend from, in its native
    ///   representation.
    /// * `objective` - The optimization goal, if any.
    /// * `measurements` - The accumulated measurement history.
    /// * `pending_experiments` - Candidates already handed out but not yet
    ///   measured.
    ///
    /// # Errors
    ///
    /// Implementations fail fast; no partial batches are ever returned.
    fn recommend(
        &self,
        batch_size: usize,
        searchspace: &SearchSpace,
        objective: Option<&Objective>,
        measurements: &Table,
        pending_experiments: Option<&Table>,
    ) -> Result<Table>;

    /// Returns a short human-readable name for this recommender.
    fn name(&self) -> &str;

    /// Returns the declarative configuration of this recommender.
    ///
    /// The default implementation refuses: external backends have no
    /// serializable identity unless they opt in explicitly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSerializable`] unless overridden.
    fn to_config(&self) -> Result<RecommenderConfig> {
        Err(Error::NotSerializable {
            type_name: self.name().to_owned(),
        })
    }
}
