//! Markov network: undirected graph plus the factors that induced it.
//!
//! All bookkeeping (variable order, cardinalities, variable → factor index
//! lists, graph edges) is computed in a single pass by
//! [`MarkovNetwork::new`] and never patched afterwards. Conditioning on
//! evidence builds a new network instead of mutating this one.

use indexmap::IndexMap;
use scirs2_core::ndarray::ArrayD;
use std::sync::Arc;

use crate::error::{MrfError, Result};
use crate::factor::{DenseFactor, PotentialFactor};
use crate::graph::UndirectedGraph;

#[derive(Clone, Debug, PartialEq)]
struct VariableEntry {
    cardinality: usize,
    factor_indices: Vec<usize>,
}

/// A Markov random field over discrete variables.
///
/// Variable indices follow first-seen order across the factor list and are
/// the vertex ids of [`graph`](Self::graph). Factors are held behind `Arc`
/// so reduced networks and parallel chains share unchanged tables.
#[derive(Clone, Debug)]
pub struct MarkovNetwork<F: PotentialFactor = DenseFactor> {
    graph: UndirectedGraph,
    factors: Vec<Arc<F>>,
    variables: IndexMap<String, VariableEntry>,
}

impl<F: PotentialFactor> MarkovNetwork<F> {
    /// Build a network from a list of factors.
    pub fn new(factors: Vec<F>) -> Result<Self> {
        Self::from_shared(factors.into_iter().map(Arc::new).collect())
    }

    /// Build a network from factors that are already shared.
    pub fn from_shared(factors: Vec<Arc<F>>) -> Result<Self> {
        let mut variables: IndexMap<String, VariableEntry> = IndexMap::new();

        for (factor_idx, factor) in factors.iter().enumerate() {
            for var in factor.scope() {
                let cardinality = factor.cardinality(var).ok_or_else(|| {
                    MrfError::InvalidFactor(format!("no cardinality for scope variable {}", var))
                })?;

                let entry = variables
                    .entry(var.clone())
                    .or_insert_with(|| VariableEntry {
                        cardinality,
                        factor_indices: Vec::new(),
                    });

                if entry.cardinality != cardinality {
                    return Err(MrfError::CardinalityMismatch {
                        variable: var.clone(),
                        expected: entry.cardinality,
                        got: cardinality,
                    });
                }
                if entry.factor_indices.last() != Some(&factor_idx) {
                    entry.factor_indices.push(factor_idx);
                }
            }
        }

        let mut graph = UndirectedGraph::new(variables.len());
        for factor in &factors {
            let indices: Vec<usize> = factor
                .scope()
                .iter()
                .filter_map(|var| variables.get_index_of(var))
                .collect();
            for (i, &u) in indices.iter().enumerate() {
                for &v in &indices[i + 1..] {
                    graph.add_edge(u, v);
                }
            }
        }

        log::trace!(
            "built Markov network: {} variables, {} factors, {} edges",
            variables.len(),
            factors.len(),
            graph.num_edges()
        );

        Ok(Self {
            graph,
            factors,
            variables,
        })
    }

    /// Underlying undirected graph.
    pub fn graph(&self) -> &UndirectedGraph {
        &self.graph
    }

    /// Factors in construction order.
    pub fn factors(&self) -> &[Arc<F>] {
        &self.factors
    }

    /// Factor at `index`.
    pub fn factor(&self, index: usize) -> Option<&F> {
        self.factors.get(index).map(Arc::as_ref)
    }

    /// Number of variables.
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Number of factors.
    pub fn num_factors(&self) -> usize {
        self.factors.len()
    }

    /// Variable names in index order.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    /// Check whether `name` is a network variable.
    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Index of a variable.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.variables.get_index_of(name)
    }

    /// Name of the variable at `index`.
    pub fn variable_name(&self, index: usize) -> Option<&str> {
        self.variables.get_index(index).map(|(name, _)| name.as_str())
    }

    fn entry(&self, name: &str) -> Result<&VariableEntry> {
        self.variables
            .get(name)
            .ok_or_else(|| MrfError::UnknownVariable(name.to_string()))
    }

    /// Number of categories of a variable.
    pub fn cardinality(&self, name: &str) -> Result<usize> {
        Ok(self.entry(name)?.cardinality)
    }

    /// Indices of the factors whose scope contains `name`.
    pub fn factor_indices(&self, name: &str) -> Result<&[usize]> {
        Ok(&self.entry(name)?.factor_indices)
    }

    /// Names of the variables adjacent to `name`.
    pub fn neighbors(&self, name: &str) -> Result<Vec<&str>> {
        let index = self
            .index_of(name)
            .ok_or_else(|| MrfError::UnknownVariable(name.to_string()))?;
        Ok(self
            .graph
            .neighbors(index)
            .filter_map(|neighbor| self.variable_name(neighbor))
            .collect())
    }

    /// Markov blanket of `name`, which in an undirected model is exactly its
    /// neighborhood.
    pub fn markov_blanket(&self, name: &str) -> Result<Vec<&str>> {
        self.neighbors(name)
    }

    /// Check whether `u` and `v` share a factor. Unknown names yield `false`.
    pub fn has_edge(&self, u: &str, v: &str) -> bool {
        match (self.index_of(u), self.index_of(v)) {
            (Some(u), Some(v)) => self.graph.has_edge(u, v),
            _ => false,
        }
    }

    /// Every edge as a pair of names, lower index first.
    pub fn edges(&self) -> Vec<(&str, &str)> {
        let mut edges = Vec::with_capacity(self.graph.num_edges());
        for (u, name) in self.variable_names().enumerate() {
            for v in self.graph.neighbors(u).filter(|&v| v > u) {
                if let Some(other) = self.variable_name(v) {
                    edges.push((name, other));
                }
            }
        }
        edges
    }

    /// Unnormalized joint: the product of every factor.
    ///
    /// Exponential in the number of variables; meant for small models.
    pub fn joint_distribution(&self) -> Result<F> {
        let mut factors = self.factors.iter();
        let first = factors
            .next()
            .ok_or_else(|| MrfError::InvalidArgument("network has no factors".to_string()))?;
        factors.try_fold(first.as_ref().clone(), |acc, factor| acc.combine(factor))
    }
}

/// Builder for networks over dense factors.
///
/// Provides unary and pairwise potentials on top of arbitrary factors.
#[derive(Clone, Debug, Default)]
pub struct MarkovNetworkBuilder {
    factors: Vec<DenseFactor>,
}

impl MarkovNetworkBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an arbitrary factor.
    pub fn add_factor(&mut self, factor: DenseFactor) -> &mut Self {
        self.factors.push(factor);
        self
    }

    /// Add a unary potential φ(x_i).
    pub fn add_unary_potential(&mut self, var: &str, potential: ArrayD<f64>) -> Result<&mut Self> {
        let factor = DenseFactor::new(format!("φ({})", var), vec![var.to_string()], potential)?;
        self.factors.push(factor);
        Ok(self)
    }

    /// Add a pairwise potential φ(x_i, x_j).
    pub fn add_pairwise_potential(
        &mut self,
        var1: &str,
        var2: &str,
        potential: ArrayD<f64>,
    ) -> Result<&mut Self> {
        let factor = DenseFactor::new(
            format!("φ({},{})", var1, var2),
            vec![var1.to_string(), var2.to_string()],
            potential,
        )?;
        self.factors.push(factor);
        Ok(self)
    }

    /// Number of factors added so far.
    pub fn num_factors(&self) -> usize {
        self.factors.len()
    }

    /// Build the network.
    pub fn build(&self) -> Result<MarkovNetwork> {
        MarkovNetwork::new(self.factors.clone())
    }
}
