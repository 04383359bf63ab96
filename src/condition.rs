//! Atomic predicates evaluated per-column over a row collection.
//!
//! Conditions are the leaves of the constraint engine: each one is bound
//! to a single column and produces a boolean mask with one entry per input
//! row. They are stateless and reusable across evaluations.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::Value;

/// Comparison operator of a threshold condition.
///
/// `=` and `==` are synonyms: both parse to [`Equal`](ThresholdOperator::Equal),
/// which always serializes as `=`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThresholdOperator {
    /// Strictly less than the threshold.
    #[serde(rename = "<")]
    LessThan,
    /// Less than or equal to the threshold.
    #[serde(rename = "<=")]
    LessOrEqual,
    /// Equal to the threshold (floating-point exact).
    #[serde(rename = "=", alias = "==")]
    Equal,
    /// Not equal to the threshold.
    #[serde(rename = "!=")]
    NotEqual,
    /// Strictly greater than the threshold.
    #[serde(rename = ">")]
    GreaterThan,
    /// Greater than or equal to the threshold.
    #[serde(rename = ">=")]
    GreaterOrEqual,
}

impl ThresholdOperator {
    /// Applies the operator to a value and a threshold.
    #[must_use]
    pub fn compare(self, value: f64, threshold: f64) -> bool {
        match self {
            ThresholdOperator::LessThan => value < threshold,
            ThresholdOperator::LessOrEqual => value <= threshold,
            ThresholdOperator::Equal => value == threshold,
            ThresholdOperator::NotEqual => value != threshold,
            ThresholdOperator::GreaterThan => value > threshold,
            ThresholdOperator::GreaterOrEqual => value >= threshold,
        }
    }
}

impl FromStr for ThresholdOperator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "<" => Ok(ThresholdOperator::LessThan),
            "<=" => Ok(ThresholdOperator::LessOrEqual),
            "=" | "==" => Ok(ThresholdOperator::Equal),
            "!=" => Ok(ThresholdOperator::NotEqual),
            ">" => Ok(ThresholdOperator::GreaterThan),
            ">=" => Ok(ThresholdOperator::GreaterOrEqual),
            other => Err(Error::UnknownOperator {
                operator: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for ThresholdOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ThresholdOperator::LessThan => "<",
            ThresholdOperator::LessOrEqual => "<=",
            ThresholdOperator::Equal => "=",
            ThresholdOperator::NotEqual => "!=",
            ThresholdOperator::GreaterThan => ">",
            ThresholdOperator::GreaterOrEqual => ">=",
        };
        f.write_str(s)
    }
}

/// A named predicate over one column of tabular data.
///
/// Conditions are combined by
/// [`Constraint::Exclude`](crate::Constraint::Exclude) to prune
/// search-space candidates.
///
/// # Examples
///
/// ```
/// use bayopt::{Condition, Value};
///
/// let hot = Condition::threshold("Temperature", ">", 100.0).unwrap();
/// let mask = hot.evaluate(&[Value::Float(90.0), Value::Float(120.0)]);
/// assert_eq!(mask, vec![false, true]);
///
/// let polar = Condition::sub_selection("Solvent", [Value::Str("water".into())]);
/// let mask = polar.evaluate(&[Value::Str("water".into()), Value::Str("hexane".into())]);
/// assert_eq!(mask, vec![true, false]);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Condition {
    /// Compares numeric column values against a fixed threshold.
    Threshold {
        /// The column the condition is bound to.
        parameter: String,
        /// The threshold to compare against.
        threshold: f64,
        /// The comparison operator.
        operator: ThresholdOperator,
    },
    /// Tests column values for membership in a fixed selection.
    ///
    /// Membership uses exact equality with no tolerance.
    SubSelection {
        /// The column the condition is bound to.
        parameter: String,
        /// The admissible values.
        selection: Vec<Value>,
    },
}

impl Condition {
    /// Creates a threshold condition from an operator string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownOperator`] if `operator` is not one of
    /// `<`, `<=`, `=`, `==`, `!=`, `>`, `>=`.
    pub fn threshold(
        parameter: impl Into<String>,
        operator: &str,
        threshold: f64,
    ) -> Result<Self> {
        Ok(Condition::Threshold {
            parameter: parameter.into(),
            threshold,
            operator: operator.parse()?,
        })
    }

    /// Creates a subselection condition.
    pub fn sub_selection(
        parameter: impl Into<String>,
        selection: impl IntoIterator<Item = Value>,
    ) -> Self {
        Condition::SubSelection {
            parameter: parameter.into(),
            selection: selection.into_iter().collect(),
        }
    }

    /// Returns the name of the column this condition is bound to.
    #[must_use]
    pub fn parameter(&self) -> &str {
        match self {
            Condition::Threshold { parameter, .. } | Condition::SubSelection { parameter, .. } => {
                parameter
            }
        }
    }

    /// Evaluates the condition over a column, producing a boolean mask of
    /// the same length and order.
    ///
    /// Threshold conditions evaluate to `false` for non-numeric or missing
    /// cells; subselection membership is exact equality.
    #[must_use]
    pub fn evaluate(&self, values: &[Value]) -> Vec<bool> {
        match self {
            Condition::Threshold {
                threshold, operator, ..
            } => values
                .iter()
                .map(|v| {
                    v.as_f64()
                        .is_some_and(|x| operator.compare(x, *threshold))
                })
                .collect(),
            Condition::SubSelection { selection, .. } => {
                values.iter().map(|v| selection.contains(v)).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_parse_synonyms() {
        let eq: ThresholdOperator = "=".parse().unwrap();
        let eq2: ThresholdOperator = "==".parse().unwrap();
        assert_eq!(eq, ThresholdOperator::Equal);
        assert_eq!(eq, eq2);
        assert_eq!(eq.to_string(), "=");
    }

    #[test]
    fn test_operator_parse_rejects_unknown() {
        let err = "=>".parse::<ThresholdOperator>().unwrap_err();
        assert!(matches!(err, Error::UnknownOperator { operator } if operator == "=>"));
    }

    #[test]
    fn test_operator_serde_aliases() {
        let op: ThresholdOperator = serde_json::from_str(r#""==""#).unwrap();
        assert_eq!(op, ThresholdOperator::Equal);
        assert_eq!(serde_json::to_string(&op).unwrap(), r#""=""#);
    }

    #[test]
    fn test_threshold_all_operators() {
        let cases = [
            ("<", vec![true, false, false]),
            ("<=", vec![true, true, false]),
            ("=", vec![false, true, false]),
            ("!=", vec![true, false, true]),
            (">", vec![false, false, true]),
            (">=", vec![false, true, true]),
        ];
        let data = [Value::Float(1.0), Value::Float(2.0), Value::Float(3.0)];
        for (op, expected) in cases {
            let cond = Condition::threshold("x", op, 2.0).unwrap();
            assert_eq!(cond.evaluate(&data), expected, "operator {op}");
        }
    }

    #[test]
    fn test_threshold_non_numeric_is_false() {
        let cond = Condition::threshold("x", ">", 0.0).unwrap();
        let mask = cond.evaluate(&[Value::Str("a".into()), Value::Missing, Value::Int(1)]);
        assert_eq!(mask, vec![false, false, true]);
    }

    #[test]
    fn test_sub_selection_exact_membership() {
        let cond = Condition::sub_selection("x", [Value::Int(1), Value::Str("a".into())]);
        let mask = cond.evaluate(&[
            Value::Int(1),
            // No tolerance: Float(1.0) is not Int(1).
            Value::Float(1.0),
            Value::Str("a".into()),
            Value::Str("b".into()),
        ]);
        assert_eq!(mask, vec![true, false, true, false]);
    }

    #[test]
    fn test_evaluate_is_pure() {
        let cond = Condition::threshold("x", ">=", 2.0).unwrap();
        let data = [Value::Float(1.0), Value::Float(2.0)];
        assert_eq!(cond.evaluate(&data), cond.evaluate(&data));
    }
}
