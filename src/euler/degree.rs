//! Degree accumulation over an undirected multigraph.

use crate::models::Edge;
use std::collections::HashMap;
use std::hash::Hash;

/// Vertex degrees derived from an edge list.
///
/// Only vertices that touch at least one edge appear. Iteration follows the
/// order in which vertices are first seen in the edge list.
#[derive(Debug, Clone)]
pub struct DegreeTable<V> {
    index: HashMap<V, usize>,
    entries: Vec<(V, usize)>,
}

impl<V: Eq + Hash + Clone> DegreeTable<V> {
    /// Build the table in a single pass. A self-loop counts twice.
    pub fn from_edges(edges: &[Edge<V>]) -> Self {
        let mut table = Self {
            index: HashMap::new(),
            entries: Vec::new(),
        };

        for edge in edges {
            let (a, b) = edge.endpoints();
            table.increment(a);
            table.increment(b);
        }

        table
    }

    fn increment(&mut self, vertex: &V) {
        match self.index.get(vertex) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(vertex.clone(), self.entries.len());
                self.entries.push((vertex.clone(), 1));
            }
        }
    }

    /// Degree of `vertex`, zero if it touches no edge.
    pub fn degree(&self, vertex: &V) -> usize {
        self.index
            .get(vertex)
            .map(|&slot| self.entries[slot].1)
            .unwrap_or(0)
    }

    /// Sum of all degrees. Always twice the edge count.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, d)| d).sum()
    }

    /// Vertices with odd degree, in first-seen order.
    pub fn odd_vertices(&self) -> Vec<&V> {
        self.entries
            .iter()
            .filter(|(_, d)| d % 2 == 1)
            .map(|(v, _)| v)
            .collect()
    }

    pub fn odd_count(&self) -> usize {
        self.entries.iter().filter(|(_, d)| d % 2 == 1).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, vertex: &V) -> bool {
        self.index.contains_key(vertex)
    }

    /// `(vertex, degree)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&V, usize)> {
        self.entries.iter().map(|(v, d)| (v, *d))
    }

    /// Dense position of `vertex` in first-seen order.
    pub(crate) fn slot(&self, vertex: &V) -> Option<usize> {
        self.index.get(vertex).copied()
    }
}
