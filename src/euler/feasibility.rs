//! Parity and connectivity checks for Euler circuits and paths.

use super::DegreeTable;
use crate::models::Edge;
use petgraph::unionfind::UnionFind;
use std::fmt;
use std::hash::Hash;

/// Can the edge list be drawn in one stroke, judging by parity alone?
///
/// True iff zero (circuit) or exactly two (path) vertices have odd degree.
/// `vertices` is informational: degrees come from `edges`, and a vertex with
/// no incident edge cannot change the odd count. An empty edge list is
/// vacuously Eulerian.
///
/// Connectivity is not checked here; see [`analyze`] and
/// [`EulerReport::is_traversable`].
pub fn is_euler_possible<V: Eq + Hash + Clone>(_vertices: &[V], edges: &[Edge<V>]) -> bool {
    matches!(DegreeTable::from_edges(edges).odd_count(), 0 | 2)
}

/// What kind of one-stroke drawing the parity permits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EulerKind<V> {
    /// Every degree is even; the walk can close on itself.
    Circuit,
    /// Exactly two odd vertices; any walk must start at one and end at the other.
    Path { start: V, end: V },
    /// More than two odd vertices.
    Impossible { odd: usize },
}

impl<V> EulerKind<V> {
    pub fn is_possible(&self) -> bool {
        !matches!(self, EulerKind::Impossible { .. })
    }
}

impl<V: fmt::Display> fmt::Display for EulerKind<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EulerKind::Circuit => write!(f, "circuit"),
            EulerKind::Path { start, end } => write!(f, "path ({start} -> {end})"),
            EulerKind::Impossible { odd } => write!(f, "impossible ({odd} odd vertices)"),
        }
    }
}

/// Classify an edge list by its odd-degree vertices.
pub fn classify<V: Eq + Hash + Clone>(edges: &[Edge<V>]) -> EulerKind<V> {
    kind_from_table(&DegreeTable::from_edges(edges))
}

fn kind_from_table<V: Eq + Hash + Clone>(table: &DegreeTable<V>) -> EulerKind<V> {
    match table.odd_vertices().as_slice() {
        [] => EulerKind::Circuit,
        [start, end] => EulerKind::Path {
            start: (*start).clone(),
            end: (*end).clone(),
        },
        odd => EulerKind::Impossible { odd: odd.len() },
    }
}

/// Do all vertices that touch an edge lie in one connected component?
///
/// Isolated vertices are ignored, so an empty edge list is connected.
pub fn is_connected<V: Eq + Hash + Clone>(edges: &[Edge<V>]) -> bool {
    connected_from_table(&DegreeTable::from_edges(edges), edges)
}

fn connected_from_table<V: Eq + Hash + Clone>(table: &DegreeTable<V>, edges: &[Edge<V>]) -> bool {
    if table.len() <= 1 {
        return true;
    }

    let mut components = UnionFind::<usize>::new(table.len());
    for edge in edges {
        let (a, b) = edge.endpoints();
        // Every endpoint was inserted while building the table.
        if let (Some(x), Some(y)) = (table.slot(a), table.slot(b)) {
            components.union(x, y);
        }
    }

    let labels = components.into_labeling();
    labels.iter().all(|&label| label == labels[0])
}

/// Degree, parity and connectivity findings for one edge list.
#[derive(Debug, Clone)]
pub struct EulerReport<V> {
    /// Degrees of every vertex touching an edge
    pub degrees: DegreeTable<V>,
    /// Parity classification
    pub kind: EulerKind<V>,
    /// Number of edges inspected
    pub edge_count: usize,
    /// Whether the edge-bearing vertices form a single component
    pub connected: bool,
    /// Number of self-loop edges
    pub loops: usize,
}

impl<V: Eq + Hash + Clone> EulerReport<V> {
    /// Parity verdict, identical to [`is_euler_possible`].
    pub fn is_possible(&self) -> bool {
        self.kind.is_possible()
    }

    /// Parity AND connectivity: a one-stroke drawing really exists.
    pub fn is_traversable(&self) -> bool {
        self.is_possible() && self.connected
    }

    /// Verdict for a one-stroke check, with or without the connectivity rule.
    pub fn passes(&self, require_connected: bool) -> bool {
        if require_connected {
            self.is_traversable()
        } else {
            self.is_possible()
        }
    }

    /// Parity passes but the edges fall apart into several components.
    pub fn is_disconnected_candidate(&self) -> bool {
        self.is_possible() && !self.connected
    }

    pub fn odd_vertices(&self) -> Vec<&V> {
        self.degrees.odd_vertices()
    }
}

/// Build a full [`EulerReport`] in one pass over the edges (plus one union pass).
pub fn analyze<V: Eq + Hash + Clone>(edges: &[Edge<V>]) -> EulerReport<V> {
    let degrees = DegreeTable::from_edges(edges);
    let kind = kind_from_table(&degrees);
    let connected = connected_from_table(&degrees, edges);

    EulerReport {
        degrees,
        kind,
        edge_count: edges.len(),
        connected,
        loops: edges.iter().filter(|edge| edge.is_loop()).count(),
    }
}
