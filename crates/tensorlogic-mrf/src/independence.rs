//! Conditional independence by graph separation.
//!
//! `X ⊥ Y | Z` holds in a Markov network when every path between `X` and `Y`
//! passes through `Z`. Cutting every edge incident to `Z` and looking for a
//! connected component that touches both `X` and `Y` decides this exactly.

use crate::error::{MrfError, Result};
use crate::factor::PotentialFactor;
use crate::network::MarkovNetwork;

impl<F: PotentialFactor> MarkovNetwork<F> {
    /// Check whether `x` and `y` are separated by `given`.
    ///
    /// Every name in the three sets must be a network variable. Variables in
    /// `given` keep their vertex but lose all incident edges, so a variable
    /// listed in both `x` and `y` always makes the answer `false`.
    pub fn is_independent(&self, x: &[&str], y: &[&str], given: &[&str]) -> Result<bool> {
        let x = self.indices_of(x)?;
        let y = self.indices_of(y)?;
        let given = self.indices_of(given)?;

        let mut graph = self.graph().clone();
        for &vertex in &given {
            graph.remove_incident_edges(vertex);
        }

        let mut in_x = vec![false; graph.num_vertices()];
        let mut in_y = vec![false; graph.num_vertices()];
        for &vertex in &x {
            in_x[vertex] = true;
        }
        for &vertex in &y {
            in_y[vertex] = true;
        }

        let dependent = graph.connected_components().iter().any(|component| {
            component.iter().any(|&v| in_x[v]) && component.iter().any(|&v| in_y[v])
        });

        Ok(!dependent)
    }

    fn indices_of(&self, names: &[&str]) -> Result<Vec<usize>> {
        names
            .iter()
            .map(|name| {
                self.index_of(name)
                    .ok_or_else(|| MrfError::UnknownVariable(name.to_string()))
            })
            .collect()
    }
}
