//! Undirected graph over variable indices.
//!
//! Vertices are the dense indices `0..n` handed out by the network builder;
//! each vertex owns an ordered set of neighbor indices.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

/// Undirected simple graph with index-based adjacency sets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndirectedGraph {
    adjacency: Vec<BTreeSet<usize>>,
}

impl UndirectedGraph {
    /// Create a graph with `num_vertices` isolated vertices.
    pub fn new(num_vertices: usize) -> Self {
        Self {
            adjacency: vec![BTreeSet::new(); num_vertices],
        }
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges.
    pub fn num_edges(&self) -> usize {
        self.adjacency.iter().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// All vertex ids in ascending order.
    pub fn vertices(&self) -> impl Iterator<Item = usize> {
        0..self.adjacency.len()
    }

    /// Add the edge `{u, v}`.
    ///
    /// Returns `false` if the edge was already present, is a self loop, or
    /// names a vertex outside the graph.
    pub fn add_edge(&mut self, u: usize, v: usize) -> bool {
        if u == v || u >= self.adjacency.len() || v >= self.adjacency.len() {
            return false;
        }
        let inserted = self.adjacency[u].insert(v);
        self.adjacency[v].insert(u);
        inserted
    }

    /// Check whether the edge `{u, v}` exists.
    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.adjacency
            .get(u)
            .map(|neighbors| neighbors.contains(&v))
            .unwrap_or(false)
    }

    /// Neighbors of `vertex` in ascending order.
    pub fn neighbors(&self, vertex: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency.get(vertex).into_iter().flatten().copied()
    }

    /// Degree of `vertex`.
    pub fn degree(&self, vertex: usize) -> usize {
        self.adjacency.get(vertex).map(BTreeSet::len).unwrap_or(0)
    }

    /// Remove every edge incident to `vertex`. The vertex itself stays.
    pub fn remove_incident_edges(&mut self, vertex: usize) {
        let Some(neighbors) = self.adjacency.get_mut(vertex) else {
            return;
        };
        let neighbors = std::mem::take(neighbors);
        for other in neighbors {
            self.adjacency[other].remove(&vertex);
        }
    }

    /// Partition the vertices into connected components.
    ///
    /// Components are listed in order of their smallest vertex; vertices
    /// inside a component are sorted.
    pub fn connected_components(&self) -> Vec<Vec<usize>> {
        let mut visited = vec![false; self.adjacency.len()];
        let mut components = Vec::new();

        for start in self.vertices() {
            if visited[start] {
                continue;
            }
            visited[start] = true;

            let mut component = Vec::new();
            let mut queue = VecDeque::new();
            queue.push_back(start);

            while let Some(vertex) = queue.pop_front() {
                component.push(vertex);
                for next in self.neighbors(vertex) {
                    if !visited[next] {
                        visited[next] = true;
                        queue.push_back(next);
                    }
                }
            }

            component.sort_unstable();
            components.push(component);
        }

        components
    }
}
