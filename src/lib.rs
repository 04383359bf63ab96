#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]

//! Bayesian experimental-design optimization library: given a search space
//! of experiment parameters, an objective built from one or more targets,
//! and a history of measurements, it recommends the next batch of
//! experiments to run. Surrogate-model backends plug in through a narrow
//! [`Recommender`](recommender::Recommender) contract; the crate itself
//! provides the campaign orchestration, the meta recommenders that decide
//! which strategy handles each call as the campaign progresses, and the
//! constraint engine that prunes discrete candidate grids.
//!
//! # Getting Started
//!
//! ```
//! use bayopt::prelude::*;
//!
//! let searchspace = SearchSpace::from_product(
//!     vec![
//!         Parameter::numerical_discrete("Fraction_1", [25.0, 50.0, 75.0], 0.1)?,
//!         Parameter::numerical_discrete("Fraction_2", [25.0, 50.0, 75.0], 0.1)?,
//!     ],
//!     vec![Constraint::sum_target(["Fraction_1", "Fraction_2"], 100.0, 0.0)?],
//! )?;
//!
//! let recommender = TwoPhaseMetaRecommender::new(
//!     RandomRecommender::with_seed(42),
//!     RandomRecommender::with_seed(1337),
//!     2,
//! );
//!
//! let mut campaign = Campaign::new(
//!     searchspace,
//!     Some(Objective::single(Target::max("Yield"))),
//!     recommender,
//! );
//!
//! let batch = campaign.recommend(2)?;
//! assert_eq!(batch.n_rows(), 2);
//! # Ok::<(), bayopt::Error>(())
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`Campaign`] | Orchestrate an experimentation process: record measurements, produce recommendation batches, track batch/fit counters. |
//! | [`SearchSpace`] | The set of valid parameter combinations — a constraint-filtered discrete grid plus continuous bounds. |
//! | [`Parameter`] | One axis of the search space — [`NumericalDiscrete`](Parameter::NumericalDiscrete), [`NumericalContinuous`](Parameter::NumericalContinuous), [`Categorical`](Parameter::Categorical). |
//! | [`Condition`] / [`Constraint`] | Declarative predicates and their combinators flagging invalid candidate rows. |
//! | [`Objective`] / [`Target`] | What gets optimized — a single target or multiple targets in a Pareto sense. |
//! | [`Recommender`](recommender::Recommender) | Strategy producing a batch of candidate experiments (external surrogate backends plug in here). |
//! | [`MetaRecommender`](recommender::MetaRecommender) | Selects among underlying recommenders based on experimentation progress. |
//!
//! # Meta Recommenders
//!
//! | Variant | Selection rule |
//! |---------|----------------|
//! | [`TwoPhaseMetaRecommender`](recommender::TwoPhaseMetaRecommender) | Switches from an initial to a main recommender once the measurement count reaches a threshold. |
//! | [`SequentialMetaRecommender`](recommender::SequentialMetaRecommender) | Walks a finite recommender sequence, advancing once per measurement-count increase; configurable exhaustion policy. |
//! | [`StreamingSequentialMetaRecommender`](recommender::StreamingSequentialMetaRecommender) | Same advancement over a lazy, possibly infinite source; not serializable. |
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) at recommendation and measurement-ingestion points | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

mod campaign;
mod condition;
pub mod config;
mod constraint;
mod error;
mod objective;
mod parameter;
pub mod recommender;
mod rng_util;
mod searchspace;
mod table;
pub mod telemetry;
mod value;

pub use campaign::{Campaign, BATCH_NR_COLUMN, FIT_NR_COLUMN};
pub use condition::{Condition, ThresholdOperator};
pub use constraint::{Combiner, Constraint};
pub use error::{Error, Result};
pub use objective::{Objective, Target, TargetMode};
pub use parameter::Parameter;
pub use searchspace::{SearchSpace, SearchSpaceType, SubspaceContinuous, SubspaceDiscrete};
pub use table::Table;
pub use value::{Value, ValueKey};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use bayopt::prelude::*;
/// ```
pub mod prelude {
    pub use crate::campaign::{Campaign, BATCH_NR_COLUMN, FIT_NR_COLUMN};
    pub use crate::condition::{Condition, ThresholdOperator};
    pub use crate::config::{CampaignConfig, MetaRecommenderConfig, RecommenderConfig};
    pub use crate::constraint::{Combiner, Constraint};
    pub use crate::error::{Error, Result};
    pub use crate::objective::{Objective, Target, TargetMode};
    pub use crate::parameter::Parameter;
    pub use crate::recommender::{
        ExhaustionMode, MetaRecommender, RandomRecommender, Recommender,
        SequentialMetaRecommender, StreamingSequentialMetaRecommender, TwoPhaseMetaRecommender,
    };
    pub use crate::searchspace::{SearchSpace, SearchSpaceType};
    pub use crate::table::Table;
    pub use crate::telemetry::{MetricsSink, NoopMetricsSink};
    pub use crate::value::Value;
}
