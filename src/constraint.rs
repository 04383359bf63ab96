//! Declarative constraints that prune a discrete candidate grid.
//!
//! A constraint combines [`Condition`]s or aggregates whole rows to flag
//! invalid parameter combinations. `evaluate` always returns the index set
//! of **violating** rows, never the valid ones; callers drop or invert as
//! needed.
//!
//! The constraint taxonomy is a closed tagged union: the serde `type` tag
//! replaces the runtime subclass registry of dynamically typed libraries,
//! so dispatch from tag to variant is fixed at compile time.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::error::{Error, Result};
use crate::table::Table;
use crate::value::ValueKey;

/// Logical combiner folding condition masks left-to-right.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Combiner {
    /// All conditions must hold.
    #[default]
    And,
    /// At least one condition must hold.
    Or,
    /// An odd number of conditions must hold.
    Xor,
}

impl Combiner {
    fn apply(self, acc: bool, x: bool) -> bool {
        match self {
            Combiner::And => acc && x,
            Combiner::Or => acc || x,
            Combiner::Xor => acc ^ x,
        }
    }
}

/// A declarative constraint over a table of parameter combinations.
///
/// Each variant declares two static capability flags: whether it can be
/// evaluated eagerly while the search space is constructed
/// ([`eval_during_creation`](Constraint::eval_during_creation)) and whether
/// it must be re-evaluated during modeling
/// ([`eval_during_modeling`](Constraint::eval_during_modeling)).
///
/// # Examples
///
/// ```
/// use bayopt::{Constraint, Table, Value};
///
/// let mut grid = Table::new(["f1", "f2"]);
/// grid.push_row(vec![Value::Float(40.0), Value::Float(60.0)]).unwrap();
/// grid.push_row(vec![Value::Float(50.0), Value::Float(60.0)]).unwrap();
///
/// let mixture = Constraint::sum_target(["f1", "f2"], 100.0, 0.0).unwrap();
/// // The second row sums to 110 and is flagged as violating.
/// assert_eq!(mixture.evaluate(&grid).unwrap(), vec![1]);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Constraint {
    /// Flags rows where the combined condition mask is true.
    Exclude {
        /// The conditions to combine (at least one).
        conditions: Vec<Condition>,
        /// How the per-condition masks are folded.
        #[serde(default)]
        combiner: Combiner,
    },
    /// Flags rows whose sum over the listed columns deviates from a target
    /// by more than the tolerance.
    SumTarget {
        /// The columns to sum (unique names).
        parameters: Vec<String>,
        /// The required sum.
        target_value: f64,
        /// Admissible absolute deviation; `0.0` requires an exact match.
        #[serde(default)]
        tolerance: f64,
    },
    /// Flags rows whose product over the listed columns deviates from a
    /// target by more than the tolerance.
    ProdTarget {
        /// The columns to multiply (unique names).
        parameters: Vec<String>,
        /// The required product.
        target_value: f64,
        /// Admissible absolute deviation; `0.0` requires an exact match.
        #[serde(default)]
        tolerance: f64,
    },
    /// Flags rows where any label occurs more than once across the listed
    /// columns.
    NoLabelDuplicates {
        /// The columns whose labels must be pairwise distinct.
        parameters: Vec<String>,
    },
    /// Flags rows where the listed columns do not all hold the same value.
    LinkedParameters {
        /// The columns whose values must be identical.
        parameters: Vec<String>,
    },
    /// Flags rows that duplicate an earlier row once the listed columns
    /// are collapsed into an order-independent label multiset (combined
    /// with the values of all other columns).
    ///
    /// The first occurrence in input order is kept; later duplicates are
    /// flagged. Detection is stable with respect to input row order.
    PermutationInvariance {
        /// The columns that are permutation invariant.
        parameters: Vec<String>,
    },
}

impl Constraint {
    /// Creates an exclusion constraint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyConditions`] if no conditions are given.
    pub fn exclude(
        conditions: impl IntoIterator<Item = Condition>,
        combiner: Combiner,
    ) -> Result<Self> {
        let constraint = Constraint::Exclude {
            conditions: conditions.into_iter().collect(),
            combiner,
        };
        constraint.validate()?;
        Ok(constraint)
    }

    /// Creates a sum constraint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateParameters`] if `parameters` contains a
    /// name more than once.
    pub fn sum_target<I, S>(parameters: I, target_value: f64, tolerance: f64) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let constraint = Constraint::SumTarget {
            parameters: parameters.into_iter().map(Into::into).collect(),
            target_value,
            tolerance,
        };
        constraint.validate()?;
        Ok(constraint)
    }

    /// Creates a product constraint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateParameters`] if `parameters` contains a
    /// name more than once.
    pub fn prod_target<I, S>(parameters: I, target_value: f64, tolerance: f64) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let constraint = Constraint::ProdTarget {
            parameters: parameters.into_iter().map(Into::into).collect(),
            target_value,
            tolerance,
        };
        constraint.validate()?;
        Ok(constraint)
    }

    /// Creates a no-label-duplicates constraint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateParameters`] if `parameters` contains a
    /// name more than once.
    pub fn no_label_duplicates<I, S>(parameters: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let constraint = Constraint::NoLabelDuplicates {
            parameters: parameters.into_iter().map(Into::into).collect(),
        };
        constraint.validate()?;
        Ok(constraint)
    }

    /// Creates a linked-parameters constraint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateParameters`] if `parameters` contains a
    /// name more than once.
    pub fn linked_parameters<I, S>(parameters: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let constraint = Constraint::LinkedParameters {
            parameters: parameters.into_iter().map(Into::into).collect(),
        };
        constraint.validate()?;
        Ok(constraint)
    }

    /// Creates a permutation-invariance constraint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateParameters`] if `parameters` contains a
    /// name more than once.
    pub fn permutation_invariance<I, S>(parameters: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let constraint = Constraint::PermutationInvariance {
            parameters: parameters.into_iter().map(Into::into).collect(),
        };
        constraint.validate()?;
        Ok(constraint)
    }

    /// Returns the type tag of this constraint, matching its serialized
    /// `type` field.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Constraint::Exclude { .. } => "Exclude",
            Constraint::SumTarget { .. } => "SumTarget",
            Constraint::ProdTarget { .. } => "ProdTarget",
            Constraint::NoLabelDuplicates { .. } => "NoLabelDuplicates",
            Constraint::LinkedParameters { .. } => "LinkedParameters",
            Constraint::PermutationInvariance { .. } => "PermutationInvariance",
        }
    }

    /// Returns `true` if this constraint can be evaluated eagerly while
    /// the search-space grid is constructed.
    #[must_use]
    pub fn eval_during_creation(&self) -> bool {
        match self {
            Constraint::Exclude { .. }
            | Constraint::SumTarget { .. }
            | Constraint::ProdTarget { .. }
            | Constraint::NoLabelDuplicates { .. }
            | Constraint::LinkedParameters { .. }
            | Constraint::PermutationInvariance { .. } => true,
        }
    }

    /// Returns `true` if this constraint must be re-evaluated during
    /// modeling.
    #[must_use]
    pub fn eval_during_modeling(&self) -> bool {
        match self {
            Constraint::Exclude { .. }
            | Constraint::SumTarget { .. }
            | Constraint::ProdTarget { .. }
            | Constraint::NoLabelDuplicates { .. }
            | Constraint::LinkedParameters { .. }
            | Constraint::PermutationInvariance { .. } => false,
        }
    }

    /// Returns the column names this constraint references.
    #[must_use]
    pub fn referenced_columns(&self) -> Vec<&str> {
        match self {
            Constraint::Exclude { conditions, .. } => {
                conditions.iter().map(Condition::parameter).collect()
            }
            Constraint::SumTarget { parameters, .. }
            | Constraint::ProdTarget { parameters, .. }
            | Constraint::NoLabelDuplicates { parameters }
            | Constraint::LinkedParameters { parameters }
            | Constraint::PermutationInvariance { parameters } => {
                parameters.iter().map(String::as_str).collect()
            }
        }
    }

    /// Checks the structural invariants of this constraint.
    ///
    /// Constructors run this automatically; configuration loading re-runs
    /// it so deserialized constraints cannot bypass the checks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyConditions`] or [`Error::DuplicateParameters`].
    pub fn validate(&self) -> Result<()> {
        match self {
            Constraint::Exclude { conditions, .. } => {
                if conditions.is_empty() {
                    return Err(Error::EmptyConditions);
                }
                Ok(())
            }
            Constraint::SumTarget { parameters, .. }
            | Constraint::ProdTarget { parameters, .. }
            | Constraint::NoLabelDuplicates { parameters }
            | Constraint::LinkedParameters { parameters }
            | Constraint::PermutationInvariance { parameters } => {
                if parameters.is_empty() {
                    return Err(Error::EmptyConditions);
                }
                let mut seen = HashSet::new();
                for p in parameters {
                    if !seen.insert(p.as_str()) {
                        return Err(Error::DuplicateParameters {
                            parameter: p.clone(),
                        });
                    }
                }
                Ok(())
            }
        }
    }

    /// Evaluates the constraint on a table of parameter combinations.
    ///
    /// Returns the indices of **violating** rows in ascending input order.
    /// Evaluation is pure: the same table always yields the same index set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingColumn`] if a referenced column is absent
    /// from the table. This is a configuration error and fails fast rather
    /// than yielding an empty result.
    pub fn evaluate(&self, table: &Table) -> Result<Vec<usize>> {
        match self {
            Constraint::Exclude {
                conditions,
                combiner,
            } => {
                let mut masks = conditions.iter().map(|cond| {
                    table
                        .column(cond.parameter())
                        .map(|column| cond.evaluate(column))
                });
                let mut folded = masks
                    .next()
                    .ok_or(Error::EmptyConditions)??;
                for mask in masks {
                    let mask = mask?;
                    for (acc, x) in folded.iter_mut().zip(mask) {
                        *acc = combiner.apply(*acc, x);
                    }
                }
                Ok(mask_to_indices(&folded))
            }
            Constraint::SumTarget {
                parameters,
                target_value,
                tolerance,
            } => aggregate_target(table, parameters, *target_value, *tolerance, 0.0, |a, b| a + b),
            Constraint::ProdTarget {
                parameters,
                target_value,
                tolerance,
            } => aggregate_target(table, parameters, *target_value, *tolerance, 1.0, |a, b| a * b),
            Constraint::NoLabelDuplicates { parameters } => {
                let columns = resolve_columns(table, parameters)?;
                let mask: Vec<bool> = (0..table.n_rows())
                    .map(|row| {
                        let distinct: HashSet<ValueKey> =
                            columns.iter().map(|col| col[row].key()).collect();
                        distinct.len() < parameters.len()
                    })
                    .collect();
                Ok(mask_to_indices(&mask))
            }
            Constraint::LinkedParameters { parameters } => {
                let columns = resolve_columns(table, parameters)?;
                let mask: Vec<bool> = (0..table.n_rows())
                    .map(|row| {
                        let distinct: HashSet<ValueKey> =
                            columns.iter().map(|col| col[row].key()).collect();
                        distinct.len() != 1
                    })
                    .collect();
                Ok(mask_to_indices(&mask))
            }
            Constraint::PermutationInvariance { parameters } => {
                let invariant = resolve_columns(table, parameters)?;
                let others: Vec<&[crate::value::Value]> = table
                    .column_names()
                    .iter()
                    .filter(|name| !parameters.contains(*name))
                    .map(|name| table.column(name))
                    .collect::<Result<_>>()?;

                // First occurrence wins, so rows are visited strictly in
                // input order.
                let mut seen: HashSet<(Vec<ValueKey>, Vec<ValueKey>)> = HashSet::new();
                let mut violating = Vec::new();
                for row in 0..table.n_rows() {
                    let mut collapsed: Vec<ValueKey> =
                        invariant.iter().map(|col| col[row].key()).collect();
                    collapsed.sort();
                    let rest: Vec<ValueKey> = others.iter().map(|col| col[row].key()).collect();
                    if !seen.insert((collapsed, rest)) {
                        violating.push(row);
                    }
                }
                Ok(violating)
            }
        }
    }
}

fn aggregate_target(
    table: &Table,
    parameters: &[String],
    target_value: f64,
    tolerance: f64,
    init: f64,
    fold: impl Fn(f64, f64) -> f64,
) -> Result<Vec<usize>> {
    let columns = resolve_columns(table, parameters)?;
    let mask: Vec<bool> = (0..table.n_rows())
        .map(|row| {
            let reduced = columns
                .iter()
                .map(|col| col[row].as_f64().unwrap_or(f64::NAN))
                .fold(init, &fold);
            (reduced - target_value).abs() > tolerance
        })
        .collect();
    Ok(mask_to_indices(&mask))
}

fn resolve_columns<'t>(
    table: &'t Table,
    parameters: &[String],
) -> Result<Vec<&'t [crate::value::Value]>> {
    parameters.iter().map(|name| table.column(name)).collect()
}

fn mask_to_indices(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(i, &bad)| bad.then_some(i))
        .collect()
}
