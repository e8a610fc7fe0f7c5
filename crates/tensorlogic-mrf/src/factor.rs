//! Factor representation and operations.
//!
//! The network, the evidence reducer and the Gibbs sampler only talk to
//! factors through [`PotentialFactor`]. [`DenseFactor`] is the dense
//! `ndarray` implementation used throughout the crate.

use scirs2_core::ndarray::{ArrayD, Axis, IxDyn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;

use crate::error::{MrfError, Result};

/// Assignment of category indices to variables.
///
/// Used both as evidence and as a full or partial sample.
pub type Assignment = HashMap<String, usize>;

/// Capabilities a factor must provide to take part in a Markov network.
///
/// φ(X₁, ..., Xₖ) → ℝ⁺ over an ordered scope of distinct variables.
pub trait PotentialFactor: Clone + Debug {
    /// Ordered scope of the factor.
    fn scope(&self) -> &[String];

    /// Number of categories of `var`, or `None` if it is not in scope.
    fn cardinality(&self, var: &str) -> Option<usize>;

    /// Fix the variables of `assignment` that are in scope and drop their
    /// dimensions. Keys outside the scope are ignored.
    fn condition(&self, assignment: &Assignment) -> Result<Self>;

    /// Pointwise product over the union of both scopes.
    fn combine(&self, other: &Self) -> Result<Self>;

    /// Dense table of weights over the joint scope, axes in scope order.
    fn table(&self) -> ArrayD<f64>;
}

/// A factor backed by a dense table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DenseFactor {
    name: String,
    variables: Vec<String>,
    values: ArrayD<f64>,
}

impl DenseFactor {
    /// Create a new factor.
    pub fn new(name: String, variables: Vec<String>, values: ArrayD<f64>) -> Result<Self> {
        if values.ndim() != variables.len() {
            return Err(MrfError::DimensionMismatch {
                expected: vec![variables.len()],
                got: vec![values.ndim()],
            });
        }

        for (i, var) in variables.iter().enumerate() {
            if variables[..i].contains(var) {
                return Err(MrfError::InvalidFactor(format!(
                    "variable {} appears twice in the scope of {}",
                    var, name
                )));
            }
        }

        if values.iter().any(|&v| v < 0.0 || !v.is_finite()) {
            return Err(MrfError::InvalidFactor(format!(
                "{} has negative or non-finite weights",
                name
            )));
        }

        Ok(Self {
            name,
            variables,
            values,
        })
    }

    /// Create a factor from a flat row-major table.
    pub fn from_shape_vec(
        name: impl Into<String>,
        variables: &[&str],
        shape: &[usize],
        values: Vec<f64>,
    ) -> Result<Self> {
        let values = ArrayD::from_shape_vec(IxDyn(shape), values)?;
        Self::new(
            name.into(),
            variables.iter().map(|v| v.to_string()).collect(),
            values,
        )
    }

    /// Create a factor with every weight equal to one.
    pub fn ones(name: String, variables: Vec<String>, card: usize) -> Self {
        let shape = vec![card; variables.len()];
        Self {
            name,
            variables,
            values: ArrayD::ones(IxDyn(&shape)),
        }
    }

    /// Create a uniform factor whose weights sum to one.
    pub fn uniform(name: String, variables: Vec<String>, card: usize) -> Self {
        let mut factor = Self::ones(name, variables, card);
        factor.normalize();
        factor
    }

    /// Factor name for debugging.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying table.
    pub fn values(&self) -> &ArrayD<f64> {
        &self.values
    }

    /// Normalize factor to sum to 1.
    pub fn normalize(&mut self) {
        let sum: f64 = self.values.iter().sum();
        if sum > 0.0 {
            self.values /= sum;
        }
    }

    fn axis_of(&self, var: &str) -> Result<usize> {
        self.variables
            .iter()
            .position(|v| v == var)
            .ok_or_else(|| MrfError::UnknownVariable(var.to_string()))
    }

    /// Weight of a full assignment to the scope.
    pub fn value(&self, assignment: &Assignment) -> Result<f64> {
        let mut index = Vec::with_capacity(self.variables.len());
        for (axis, var) in self.variables.iter().enumerate() {
            let value = *assignment
                .get(var)
                .ok_or_else(|| MrfError::MissingVariable(var.clone()))?;
            let cardinality = self.values.shape()[axis];
            if value >= cardinality {
                return Err(MrfError::ValueOutOfRange {
                    variable: var.clone(),
                    value,
                    cardinality,
                });
            }
            index.push(value);
        }
        Ok(self.values[index.as_slice()])
    }

    /// Compute the product of two factors.
    ///
    /// φ₁(X₁) * φ₂(X₂) = φ(X₁ ∪ X₂)
    pub fn product(&self, other: &DenseFactor) -> Result<DenseFactor> {
        let mut all_vars = self.variables.clone();
        let mut shape = self.values.shape().to_vec();
        let mut other_axes = Vec::with_capacity(other.variables.len());

        for (axis, var) in other.variables.iter().enumerate() {
            let card = other.values.shape()[axis];
            match all_vars.iter().position(|v| v == var) {
                Some(pos) => {
                    if shape[pos] != card {
                        return Err(MrfError::CardinalityMismatch {
                            variable: var.clone(),
                            expected: shape[pos],
                            got: card,
                        });
                    }
                    other_axes.push(pos);
                }
                None => {
                    other_axes.push(all_vars.len());
                    all_vars.push(var.clone());
                    shape.push(card);
                }
            }
        }

        let self_rank = self.variables.len();
        let mut result_values = ArrayD::zeros(IxDyn(&shape));
        let mut other_index = vec![0; other_axes.len()];

        for (index, slot) in result_values.indexed_iter_mut() {
            for (i, &axis) in other_axes.iter().enumerate() {
                other_index[i] = index[axis];
            }
            let self_index: Vec<usize> = (0..self_rank).map(|axis| index[axis]).collect();
            *slot = self.values[self_index.as_slice()] * other.values[other_index.as_slice()];
        }

        Ok(DenseFactor {
            name: format!("{}*{}", self.name, other.name),
            variables: all_vars,
            values: result_values,
        })
    }

    /// Reduce factor to a single variable assignment.
    pub fn reduce(&self, var: &str, value: usize) -> Result<DenseFactor> {
        self.axis_of(var)?;
        let mut assignment = Assignment::new();
        assignment.insert(var.to_string(), value);
        self.condition(&assignment)
    }

    /// Marginalize out a variable by summing over it.
    ///
    /// ∑ₓ φ(X, Y) = φ(Y)
    pub fn marginalize_out(&self, var: &str) -> Result<DenseFactor> {
        let var_idx = self.axis_of(var)?;
        let new_values = self.values.sum_axis(Axis(var_idx));
        let new_vars: Vec<String> = self
            .variables
            .iter()
            .filter(|v| *v != var)
            .cloned()
            .collect();

        Ok(DenseFactor {
            name: format!("{}_marg", self.name),
            variables: new_vars,
            values: new_values,
        })
    }
}

impl PotentialFactor for DenseFactor {
    fn scope(&self) -> &[String] {
        &self.variables
    }

    fn cardinality(&self, var: &str) -> Option<usize> {
        self.variables
            .iter()
            .position(|v| v == var)
            .map(|idx| self.values.shape()[idx])
    }

    fn condition(&self, assignment: &Assignment) -> Result<Self> {
        let mut view = self.values.view();
        let mut remaining = Vec::with_capacity(self.variables.len());

        // Walk axes from the back so that removing one never shifts the
        // position of an axis still to be visited.
        for (axis, var) in self.variables.iter().enumerate().rev() {
            match assignment.get(var) {
                Some(&value) => {
                    let cardinality = view.shape()[axis];
                    if value >= cardinality {
                        return Err(MrfError::ValueOutOfRange {
                            variable: var.clone(),
                            value,
                            cardinality,
                        });
                    }
                    view = view.index_axis_move(Axis(axis), value);
                }
                None => remaining.push(var.clone()),
            }
        }

        if remaining.len() == self.variables.len() {
            return Ok(self.clone());
        }
        remaining.reverse();

        Ok(DenseFactor {
            name: format!("{}_reduced", self.name),
            variables: remaining,
            values: view.to_owned(),
        })
    }

    fn combine(&self, other: &Self) -> Result<Self> {
        self.product(other)
    }

    fn table(&self) -> ArrayD<f64> {
        self.values.clone()
    }
}
