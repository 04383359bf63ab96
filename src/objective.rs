//! Optimization targets and objectives.
//!
//! A [`Target`] names a measured outcome column and the direction it
//! should be driven in; an [`Objective`] combines one or more targets
//! into the optimization goal handed to recommender backends.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The direction in which a target is optimized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TargetMode {
    /// Drive the target as high as possible.
    Max,
    /// Drive the target as low as possible.
    Min,
    /// Drive the target into a bounded interval.
    Match,
}

/// A measured outcome column to optimize.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// The name of the measurement column.
    pub name: String,
    /// The optimization direction.
    pub mode: TargetMode,
    /// Closed bounds; required for [`TargetMode::Match`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<(f64, f64)>,
}

impl Target {
    /// Creates a maximization target.
    pub fn max(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: TargetMode::Max,
            bounds: None,
        }
    }

    /// Creates a minimization target.
    pub fn min(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: TargetMode::Min,
            bounds: None,
        }
    }

    /// Creates a match-mode target with the given closed bounds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTargetBounds`] unless the bounds are finite
    /// with `lower < upper`.
    pub fn match_interval(name: impl Into<String>, lower: f64, upper: f64) -> Result<Self> {
        let target = Self {
            name: name.into(),
            mode: TargetMode::Match,
            bounds: Some((lower, upper)),
        };
        target.validate()?;
        Ok(target)
    }

    /// Checks the structural invariants of this target.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTargetBounds`] if a match-mode target has
    /// no bounds, or any given bounds are not a finite proper interval.
    pub fn validate(&self) -> Result<()> {
        match self.bounds {
            Some((lower, upper)) => {
                if !lower.is_finite() || !upper.is_finite() || lower >= upper {
                    return Err(Error::InvalidTargetBounds {
                        target: self.name.clone(),
                    });
                }
                Ok(())
            }
            None if self.mode == TargetMode::Match => Err(Error::InvalidTargetBounds {
                target: self.name.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// The optimization goal of a campaign.
///
/// # Examples
///
/// ```
/// use bayopt::{Objective, Target};
///
/// let single = Objective::single(Target::max("Yield"));
/// assert_eq!(single.n_outputs(), 1);
///
/// let pareto = Objective::pareto([Target::max("Yield"), Target::min("Cost")]).unwrap();
/// assert!(pareto.is_multi_output());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Objective {
    /// Optimize a single target.
    SingleTarget {
        /// The target to optimize.
        target: Target,
    },
    /// Optimize multiple targets in a Pareto sense.
    Pareto {
        /// The targets to optimize (at least two, unique names).
        targets: Vec<Target>,
    },
}

impl Objective {
    /// Creates a single-target objective.
    #[must_use]
    pub fn single(target: Target) -> Self {
        Objective::SingleTarget { target }
    }

    /// Creates a Pareto objective.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooFewParetoTargets`] for fewer than two targets
    /// and [`Error::DuplicateTargetNames`] for repeated target names.
    pub fn pareto(targets: impl IntoIterator<Item = Target>) -> Result<Self> {
        let objective = Objective::Pareto {
            targets: targets.into_iter().collect(),
        };
        objective.validate()?;
        Ok(objective)
    }

    /// Returns the targets included in the objective.
    #[must_use]
    pub fn targets(&self) -> &[Target] {
        match self {
            Objective::SingleTarget { target } => core::slice::from_ref(target),
            Objective::Pareto { targets } => targets,
        }
    }

    /// Returns the number of outputs the objective produces.
    #[must_use]
    pub fn n_outputs(&self) -> usize {
        self.targets().len()
    }

    /// Returns `true` if the objective produces multiple outputs.
    #[must_use]
    pub fn is_multi_output(&self) -> bool {
        matches!(self, Objective::Pareto { .. })
    }

    /// Checks the structural invariants of this objective and its targets.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooFewParetoTargets`],
    /// [`Error::DuplicateTargetNames`], or a target validation error.
    pub fn validate(&self) -> Result<()> {
        if let Objective::Pareto { targets } = self {
            if targets.len() < 2 {
                return Err(Error::TooFewParetoTargets { got: targets.len() });
            }
        }
        let mut seen = std::collections::HashSet::new();
        for target in self.targets() {
            target.validate()?;
            if !seen.insert(target.name.as_str()) {
                return Err(Error::DuplicateTargetNames {
                    name: target.name.clone(),
                });
            }
        }
        Ok(())
    }
}
