//! Persisted campaign configuration.
//!
//! A configuration document declaratively describes a campaign's search
//! space, objective, and recommender, together with an embedded version
//! tag. Documents can be fully instantiated
//! ([`Campaign::from_config_json`]) or only structurally validated
//! ([`Campaign::validate_config_json`]) — the latter checks every
//! definition without materializing the discrete candidate grid, so large
//! search spaces can be vetted cheaply.
//!
//! Unknown top-level keys are rejected. Streaming meta recommenders have
//! no configuration representation: serializing a campaign that uses one
//! fails with [`Error::NotSerializable`].

use serde::{Deserialize, Serialize};

use crate::campaign::Campaign;
use crate::constraint::Constraint;
use crate::error::{Error, Result};
use crate::objective::Objective;
use crate::parameter::Parameter;
use crate::recommender::{
    ExhaustionMode, MetaRecommender, RandomRecommender, Recommender,
    SequentialMetaRecommender, TwoPhaseMetaRecommender,
};
use crate::searchspace::SearchSpace;

/// Declarative description of a pure recommender.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RecommenderConfig {
    /// A [`RandomRecommender`], optionally seeded.
    #[serde(rename = "RandomRecommender")]
    Random {
        /// Fixed seed for reproducible sampling.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<u64>,
    },
}

impl RecommenderConfig {
    /// Instantiates the described recommender.
    #[must_use]
    pub fn build(&self) -> std::sync::Arc<dyn Recommender> {
        match self {
            RecommenderConfig::Random { seed } => match seed {
                Some(seed) => std::sync::Arc::new(RandomRecommender::with_seed(*seed)),
                None => std::sync::Arc::new(RandomRecommender::new()),
            },
        }
    }
}

fn default_switch_after() -> usize {
    1
}

/// Declarative description of a meta recommender.
///
/// There is intentionally no variant for the streaming meta recommender:
/// its lazy source has no serializable identity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MetaRecommenderConfig {
    /// A [`TwoPhaseMetaRecommender`].
    #[serde(rename = "TwoPhaseMetaRecommender")]
    TwoPhase {
        /// The recommender used before the switch.
        initial_recommender: RecommenderConfig,
        /// The recommender used after the switch.
        recommender: RecommenderConfig,
        /// The measurement count triggering the switch.
        #[serde(default = "default_switch_after")]
        switch_after: usize,
        /// Whether the switch is sticky.
        #[serde(default)]
        remain_switched: bool,
    },
    /// A [`SequentialMetaRecommender`].
    #[serde(rename = "SequentialMetaRecommender")]
    Sequential {
        /// The recommender sequence.
        recommenders: Vec<RecommenderConfig>,
        /// The exhaustion policy.
        #[serde(default)]
        mode: ExhaustionMode,
    },
}

impl Default for MetaRecommenderConfig {
    fn default() -> Self {
        MetaRecommenderConfig::TwoPhase {
            initial_recommender: RecommenderConfig::Random { seed: None },
            recommender: RecommenderConfig::Random { seed: None },
            switch_after: default_switch_after(),
            remain_switched: false,
        }
    }
}

impl MetaRecommenderConfig {
    /// Checks the structural invariants of this description.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyRecommenderSequence`] for an empty sequential
    /// sequence.
    pub fn validate(&self) -> Result<()> {
        match self {
            MetaRecommenderConfig::TwoPhase { .. } => Ok(()),
            MetaRecommenderConfig::Sequential { recommenders, .. } => {
                if recommenders.is_empty() {
                    return Err(Error::EmptyRecommenderSequence);
                }
                Ok(())
            }
        }
    }

    /// Instantiates the described meta recommender.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyRecommenderSequence`] for an empty sequential
    /// sequence.
    pub fn build(&self) -> Result<Box<dyn MetaRecommender>> {
        match self {
            MetaRecommenderConfig::TwoPhase {
                initial_recommender,
                recommender,
                switch_after,
                remain_switched,
            } => Ok(Box::new(
                TwoPhaseMetaRecommender::from_arcs(
                    initial_recommender.build(),
                    recommender.build(),
                    *switch_after,
                )
                .remain_switched(*remain_switched),
            )),
            MetaRecommenderConfig::Sequential { recommenders, mode } => Ok(Box::new(
                SequentialMetaRecommender::new(recommenders.iter().map(RecommenderConfig::build))?
                    .mode(*mode),
            )),
        }
    }
}

/// The persisted configuration document of a [`Campaign`].
///
/// # Examples
///
/// ```
/// use bayopt::Campaign;
///
/// let config = r#"{
///     "version": "0.1.0",
///     "parameters": [
///         {"type": "NumericalDiscrete", "name": "Pressure", "values": [1.0, 5.0, 10.0], "tolerance": 0.2},
///         {"type": "Categorical", "name": "Granularity", "values": ["coarse", "fine"]}
///     ],
///     "constraints": [],
///     "objective": {"type": "SingleTarget", "target": {"name": "Yield", "mode": "MAX"}},
///     "recommender": {
///         "type": "TwoPhaseMetaRecommender",
///         "initial_recommender": {"type": "RandomRecommender", "seed": 42},
///         "recommender": {"type": "RandomRecommender"},
///         "switch_after": 2
///     }
/// }"#;
///
/// // Structural validation does not materialize the candidate grid.
/// Campaign::validate_config_json(config).unwrap();
///
/// let campaign = Campaign::from_config_json(config).unwrap();
/// assert_eq!(campaign.parameters().count(), 2);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CampaignConfig {
    /// The crate version that wrote the document. Accepted (and ignored)
    /// on load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// The search-space parameters.
    pub parameters: Vec<Parameter>,
    /// The search-space constraints.
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    /// The optimization objective.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<Objective>,
    /// The recommender; defaults to a two-phase random/random setup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommender: Option<MetaRecommenderConfig>,
}

impl CampaignConfig {
    /// Structurally validates the document without building a search
    /// space.
    ///
    /// Beyond per-definition checks, every column referenced by a
    /// constraint must name a declared parameter.
    ///
    /// # Errors
    ///
    /// The first validation error encountered.
    pub fn validate(&self) -> Result<()> {
        if self.parameters.is_empty() {
            return Err(Error::EmptySearchSpace);
        }
        let mut names = std::collections::HashSet::new();
        for parameter in &self.parameters {
            parameter.validate()?;
            if !names.insert(parameter.name()) {
                return Err(Error::DuplicateParameters {
                    parameter: parameter.name().to_owned(),
                });
            }
        }
        for constraint in &self.constraints {
            constraint.validate()?;
            for column in constraint.referenced_columns() {
                if !names.contains(column) {
                    return Err(Error::MissingColumn {
                        column: column.to_owned(),
                    });
                }
            }
        }
        if let Some(objective) = &self.objective {
            objective.validate()?;
        }
        if let Some(recommender) = &self.recommender {
            recommender.validate()?;
        }
        Ok(())
    }

    /// Builds a campaign from the document.
    ///
    /// # Errors
    ///
    /// Any validation error, or any error from search-space construction.
    pub fn build(self) -> Result<Campaign> {
        self.validate()?;
        let searchspace = SearchSpace::from_product(self.parameters, self.constraints)?;
        let recommender = self.recommender.unwrap_or_default().build()?;
        Ok(Campaign::from_parts(searchspace, self.objective, recommender))
    }
}

impl Campaign {
    /// Creates a campaign from a configuration JSON document.
    ///
    /// The embedded version tag is accepted regardless of its value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for malformed JSON (including unknown
    /// top-level keys) and any validation or construction error.
    pub fn from_config_json(config: &str) -> Result<Self> {
        let config: CampaignConfig = serde_json::from_str(config)?;
        config.build()
    }

    /// Validates a configuration JSON document without building the
    /// campaign.
    ///
    /// This structurally checks the document — parameters, constraints,
    /// objective, and recommender — but does not materialize the discrete
    /// candidate grid, so it also accepts search-space descriptions that
    /// would be expensive to instantiate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for malformed JSON and the first
    /// validation error otherwise.
    pub fn validate_config_json(config: &str) -> Result<()> {
        let config: CampaignConfig = serde_json::from_str(config)?;
        config.validate()
    }

    /// Serializes this campaign's configuration to a JSON document with an
    /// embedded version tag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSerializable`] if the campaign's recommender
    /// has no serializable identity (e.g. a streaming meta recommender).
    pub fn to_config_json(&self) -> Result<String> {
        let config = CampaignConfig {
            version: Some(env!("CARGO_PKG_VERSION").to_owned()),
            parameters: self.parameters().cloned().collect(),
            constraints: self.searchspace().discrete().constraints().to_vec(),
            objective: self.objective().cloned(),
            recommender: Some(self.recommender_config()?),
        };
        Ok(serde_json::to_string_pretty(&config)?)
    }
}
