//! Search spaces: the set of valid parameter combinations.
//!
//! The discrete subspace materializes the cartesian product of its
//! parameters' values as a candidate grid and prunes it with the declared
//! constraints at construction time. The continuous subspace only carries
//! parameter bounds; candidate generation inside bounds is left to the
//! recommender backends.

use serde::{Deserialize, Serialize};

use crate::constraint::Constraint;
use crate::error::{Error, Result};
use crate::parameter::Parameter;
use crate::table::Table;
use crate::value::Value;

/// Classification of a search space by the kinds of parameters it holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchSpaceType {
    /// Only discrete parameters.
    Discrete,
    /// Only continuous parameters.
    Continuous,
    /// Both discrete and continuous parameters.
    Hybrid,
}

/// The discrete part of a search space: an explicit candidate grid plus
/// per-row measurement metadata.
#[derive(Clone, Debug)]
pub struct SubspaceDiscrete {
    parameters: Vec<Parameter>,
    constraints: Vec<Constraint>,
    exp_rep: Table,
    measured: Vec<bool>,
}

impl SubspaceDiscrete {
    /// Builds the subspace from the cartesian product of the parameters'
    /// values, then drops every row violating a constraint that supports
    /// evaluation at creation time.
    ///
    /// Constraints are applied sequentially, each on the grid left over by
    /// the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingColumn`] if a constraint references a
    /// parameter that is not part of the (discrete) grid.
    pub fn from_product(parameters: Vec<Parameter>, constraints: Vec<Constraint>) -> Result<Self> {
        for parameter in &parameters {
            parameter.validate()?;
        }
        for constraint in &constraints {
            constraint.validate()?;
        }

        let mut exp_rep = Table::new(parameters.iter().map(Parameter::name));
        if !parameters.is_empty() {
            let value_lists: Vec<Vec<Value>> = parameters
                .iter()
                .map(|p| {
                    p.discrete_values()
                        .ok_or(Error::Internal("continuous parameter in discrete subspace"))
                })
                .collect::<Result<_>>()?;

            let mut rows: Vec<Vec<Value>> = vec![Vec::new()];
            for values in &value_lists {
                let mut next = Vec::with_capacity(rows.len() * values.len());
                for row in &rows {
                    for value in values {
                        let mut extended = row.clone();
                        extended.push(value.clone());
                        next.push(extended);
                    }
                }
                rows = next;
            }
            for row in rows {
                exp_rep.push_row(row)?;
            }
        }

        for constraint in constraints
            .iter()
            .filter(|c| c.eval_during_creation())
        {
            let violating = constraint.evaluate(&exp_rep)?;
            let violating: std::collections::HashSet<usize> = violating.into_iter().collect();
            exp_rep.retain_rows(|i| !violating.contains(&i));
        }

        let measured = vec![false; exp_rep.n_rows()];
        Ok(Self {
            parameters,
            constraints,
            exp_rep,
            measured,
        })
    }

    /// Returns the discrete parameters.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Returns the declared constraints.
    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Returns the candidate grid in experimental representation.
    #[must_use]
    pub fn exp_rep(&self) -> &Table {
        &self.exp_rep
    }

    /// Returns `true` if the subspace has no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Returns the number of grid rows flagged as measured.
    #[must_use]
    pub fn n_measured(&self) -> usize {
        self.measured.iter().filter(|&&m| m).count()
    }

    /// Returns `true` if grid row `i` has been flagged as measured.
    #[must_use]
    pub fn is_measured(&self, i: usize) -> bool {
        self.measured.get(i).copied().unwrap_or(false)
    }

    /// Flags the grid rows matching the given measurements as measured.
    ///
    /// Categorical values must match exactly. Numerical values match their
    /// nearest grid value; if `within_tolerance` is set, the nearest value
    /// must additionally lie within the parameter's tolerance, otherwise
    /// the row is left unmatched. Rows that match no grid entry are
    /// silently ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingColumn`] if `data` lacks a parameter column.
    pub fn mark_as_measured(&mut self, data: &Table, within_tolerance: bool) -> Result<()> {
        for row in 0..data.n_rows() {
            let mut resolved: Vec<Value> = Vec::with_capacity(self.parameters.len());
            let mut unmatched = false;
            for parameter in &self.parameters {
                let cell = data.get(row, parameter.name())?;
                match parameter {
                    Parameter::Categorical { .. } => resolved.push(cell.clone()),
                    Parameter::NumericalDiscrete {
                        values, tolerance, ..
                    } => {
                        let Some(x) = cell.as_f64() else {
                            unmatched = true;
                            break;
                        };
                        let nearest = values.iter().copied().fold(values[0], |best, v| {
                            if (v - x).abs() < (best - x).abs() {
                                v
                            } else {
                                best
                            }
                        });
                        if within_tolerance && (nearest - x).abs() > *tolerance {
                            unmatched = true;
                            break;
                        }
                        resolved.push(Value::Float(nearest));
                    }
                    Parameter::NumericalContinuous { .. } => {
                        return Err(Error::Internal(
                            "continuous parameter in discrete subspace",
                        ));
                    }
                }
            }
            if unmatched {
                continue;
            }

            let columns: Vec<&[Value]> = self
                .parameters
                .iter()
                .map(|p| self.exp_rep.column(p.name()))
                .collect::<Result<_>>()?;
            for (i, flag) in self.measured.iter_mut().enumerate() {
                let matches = columns
                    .iter()
                    .zip(&resolved)
                    .all(|(column, value)| column[i].key() == value.key());
                if matches {
                    *flag = true;
                }
            }
        }
        Ok(())
    }
}

/// The continuous part of a search space: parameter bounds only.
#[derive(Clone, Debug)]
pub struct SubspaceContinuous {
    parameters: Vec<Parameter>,
}

impl SubspaceContinuous {
    /// Creates the subspace from continuous parameters.
    #[must_use]
    pub fn new(parameters: Vec<Parameter>) -> Self {
        Self { parameters }
    }

    /// Returns the continuous parameters.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Returns `true` if the subspace has no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

/// The full search space of a campaign.
///
/// # Examples
///
/// ```
/// use bayopt::{Constraint, Parameter, SearchSpace, SearchSpaceType};
///
/// let searchspace = SearchSpace::from_product(
///     vec![
///         Parameter::numerical_discrete("f1", [25.0, 50.0, 75.0], 0.1).unwrap(),
///         Parameter::numerical_discrete("f2", [25.0, 50.0, 75.0], 0.1).unwrap(),
///     ],
///     vec![Constraint::sum_target(["f1", "f2"], 100.0, 0.0).unwrap()],
/// )
/// .unwrap();
///
/// assert_eq!(searchspace.space_type(), SearchSpaceType::Discrete);
/// // Of the 9 grid points only (25,75), (50,50), (75,25) sum to 100.
/// assert_eq!(searchspace.discrete().exp_rep().n_rows(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct SearchSpace {
    discrete: SubspaceDiscrete,
    continuous: SubspaceContinuous,
}

impl SearchSpace {
    /// Builds a search space from parameters and constraints.
    ///
    /// Discrete parameters form the candidate grid (pruned by the
    /// constraints); continuous parameters contribute bounds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySearchSpace`] if no parameters are given, or
    /// any error from grid construction and constraint evaluation.
    pub fn from_product(
        parameters: Vec<Parameter>,
        constraints: Vec<Constraint>,
    ) -> Result<Self> {
        if parameters.is_empty() {
            return Err(Error::EmptySearchSpace);
        }
        let mut seen = std::collections::HashSet::new();
        for parameter in &parameters {
            if !seen.insert(parameter.name().to_owned()) {
                return Err(Error::DuplicateParameters {
                    parameter: parameter.name().to_owned(),
                });
            }
        }

        let (discrete, continuous): (Vec<Parameter>, Vec<Parameter>) =
            parameters.into_iter().partition(Parameter::is_discrete);
        Ok(Self {
            discrete: SubspaceDiscrete::from_product(discrete, constraints)?,
            continuous: SubspaceContinuous::new(continuous),
        })
    }

    /// Builds an unconstrained search space.
    ///
    /// # Errors
    ///
    /// See [`from_product`](Self::from_product).
    pub fn new(parameters: Vec<Parameter>) -> Result<Self> {
        Self::from_product(parameters, Vec::new())
    }

    /// Returns the discrete subspace.
    #[must_use]
    pub fn discrete(&self) -> &SubspaceDiscrete {
        &self.discrete
    }

    /// Returns the continuous subspace.
    #[must_use]
    pub fn continuous(&self) -> &SubspaceContinuous {
        &self.continuous
    }

    /// Returns all parameters, discrete first.
    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.discrete
            .parameters()
            .iter()
            .chain(self.continuous.parameters())
    }

    /// Returns the classification of this search space.
    #[must_use]
    pub fn space_type(&self) -> SearchSpaceType {
        match (self.discrete.is_empty(), self.continuous.is_empty()) {
            (false, true) => SearchSpaceType::Discrete,
            (true, _) => SearchSpaceType::Continuous,
            (false, false) => SearchSpaceType::Hybrid,
        }
    }

    /// Flags discrete grid entries matching the given measurements.
    ///
    /// No-op for purely continuous spaces. See
    /// [`SubspaceDiscrete::mark_as_measured`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingColumn`] if `data` lacks a discrete
    /// parameter column.
    pub fn mark_as_measured(&mut self, data: &Table, within_tolerance: bool) -> Result<()> {
        if self.discrete.is_empty() {
            return Ok(());
        }
        self.discrete.mark_as_measured(data, within_tolerance)
    }
}
