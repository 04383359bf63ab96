//! Experiment parameter definitions.
//!
//! Parameters define the axes of the search space. Discrete parameters
//! enumerate their admissible values and feed the candidate grid;
//! continuous parameters only carry bounds.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::Value;

/// A single experiment parameter.
///
/// # Examples
///
/// ```
/// use bayopt::Parameter;
///
/// let temperature = Parameter::numerical_discrete("Temperature", [10.0, 20.0, 30.0], 0.5).unwrap();
/// assert!(temperature.is_numerical());
/// assert!(temperature.is_discrete());
///
/// let solvent = Parameter::categorical("Solvent", ["water", "ethanol"]).unwrap();
/// assert!(!solvent.is_numerical());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Parameter {
    /// A numerical parameter restricted to an explicit list of values.
    NumericalDiscrete {
        /// The parameter name.
        name: String,
        /// The admissible values.
        values: Vec<f64>,
        /// Absolute tolerance used when matching measured values against
        /// the grid. Must be non-negative and small enough that no
        /// measured value can match two grid values at once.
        #[serde(default)]
        tolerance: f64,
    },
    /// A numerical parameter varying freely within closed bounds.
    NumericalContinuous {
        /// The parameter name.
        name: String,
        /// The lower bound.
        low: f64,
        /// The upper bound.
        high: f64,
    },
    /// A categorical parameter with string labels.
    Categorical {
        /// The parameter name.
        name: String,
        /// The admissible labels.
        values: Vec<String>,
    },
}

impl Parameter {
    /// Creates a numerical discrete parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyParameterValues`] if `values` is empty and
    /// [`Error::InvalidParameter`] if values repeat, the tolerance is
    /// negative, or the tolerance reaches half the minimum spacing between
    /// values (which would make grid matching ambiguous).
    pub fn numerical_discrete(
        name: impl Into<String>,
        values: impl IntoIterator<Item = f64>,
        tolerance: f64,
    ) -> Result<Self> {
        let parameter = Parameter::NumericalDiscrete {
            name: name.into(),
            values: values.into_iter().collect(),
            tolerance,
        };
        parameter.validate()?;
        Ok(parameter)
    }

    /// Creates a numerical continuous parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if the bounds are not finite or
    /// `low > high`.
    pub fn numerical_continuous(name: impl Into<String>, low: f64, high: f64) -> Result<Self> {
        let parameter = Parameter::NumericalContinuous {
            name: name.into(),
            low,
            high,
        };
        parameter.validate()?;
        Ok(parameter)
    }

    /// Creates a categorical parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyParameterValues`] if `values` is empty and
    /// [`Error::InvalidParameter`] if labels repeat.
    pub fn categorical<I, S>(name: impl Into<String>, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parameter = Parameter::Categorical {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        };
        parameter.validate()?;
        Ok(parameter)
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Parameter::NumericalDiscrete { name, .. }
            | Parameter::NumericalContinuous { name, .. }
            | Parameter::Categorical { name, .. } => name,
        }
    }

    /// Returns `true` for numerical parameters.
    #[must_use]
    pub fn is_numerical(&self) -> bool {
        matches!(
            self,
            Parameter::NumericalDiscrete { .. } | Parameter::NumericalContinuous { .. }
        )
    }

    /// Returns `true` for parameters with an enumerable value set.
    #[must_use]
    pub fn is_discrete(&self) -> bool {
        matches!(
            self,
            Parameter::NumericalDiscrete { .. } | Parameter::Categorical { .. }
        )
    }

    /// Returns the enumerated values of a discrete parameter as cells, or
    /// `None` for continuous parameters.
    #[must_use]
    pub fn discrete_values(&self) -> Option<Vec<Value>> {
        match self {
            Parameter::NumericalDiscrete { values, .. } => {
                Some(values.iter().map(|&v| Value::Float(v)).collect())
            }
            Parameter::Categorical { values, .. } => Some(
                values
                    .iter()
                    .map(|v| Value::Str(v.clone()))
                    .collect(),
            ),
            Parameter::NumericalContinuous { .. } => None,
        }
    }

    /// Checks the structural invariants of this parameter definition.
    ///
    /// Constructors run this automatically; configuration loading re-runs
    /// it so deserialized parameters cannot bypass the checks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyParameterValues`] or
    /// [`Error::InvalidParameter`].
    pub fn validate(&self) -> Result<()> {
        match self {
            Parameter::NumericalDiscrete {
                name,
                values,
                tolerance,
            } => {
                if values.is_empty() {
                    return Err(Error::EmptyParameterValues {
                        parameter: name.clone(),
                    });
                }
                let mut seen: Vec<u64> = Vec::with_capacity(values.len());
                for v in values {
                    if !v.is_finite() {
                        return Err(Error::InvalidParameter {
                            parameter: name.clone(),
                            reason: "values must be finite".to_owned(),
                        });
                    }
                    let bits = Value::Float(*v).key();
                    let bits = match bits {
                        crate::value::ValueKey::Float(b) => b,
                        _ => return Err(Error::Internal("float value produced non-float key")),
                    };
                    if seen.contains(&bits) {
                        return Err(Error::InvalidParameter {
                            parameter: name.clone(),
                            reason: format!("duplicate value {v}"),
                        });
                    }
                    seen.push(bits);
                }
                if *tolerance < 0.0 {
                    return Err(Error::InvalidParameter {
                        parameter: name.clone(),
                        reason: "tolerance must be non-negative".to_owned(),
                    });
                }
                if values.len() > 1 {
                    let mut sorted = values.clone();
                    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(core::cmp::Ordering::Equal));
                    let min_spacing = sorted
                        .windows(2)
                        .map(|w| w[1] - w[0])
                        .fold(f64::INFINITY, f64::min);
                    if *tolerance >= min_spacing / 2.0 {
                        return Err(Error::InvalidParameter {
                            parameter: name.clone(),
                            reason: format!(
                                "tolerance {tolerance} must be smaller than half the minimum value spacing ({min_spacing})"
                            ),
                        });
                    }
                }
                Ok(())
            }
            Parameter::NumericalContinuous { name, low, high } => {
                if !low.is_finite() || !high.is_finite() || low > high {
                    return Err(Error::InvalidParameter {
                        parameter: name.clone(),
                        reason: format!("bounds must be finite with low <= high, got [{low}, {high}]"),
                    });
                }
                Ok(())
            }
            Parameter::Categorical { name, values } => {
                if values.is_empty() {
                    return Err(Error::EmptyParameterValues {
                        parameter: name.clone(),
                    });
                }
                let mut seen = std::collections::HashSet::new();
                for v in values {
                    if !seen.insert(v.as_str()) {
                        return Err(Error::InvalidParameter {
                            parameter: name.clone(),
                            reason: format!("duplicate label '{v}'"),
                        });
                    }
                }
                Ok(())
            }
        }
    }
}
