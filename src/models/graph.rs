//! Graph and payload types for onestroke.
//!
//! K_i: An edge always has exactly two endpoints. Anything else is rejected
//! at construction or decode time, never coerced.

use crate::euler::{self, EulerReport};
use crate::models::{OnestrokeError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::Hash;
use std::path::Path;

/// Vertex identifier as it appears on the wire.
///
/// The backend uses integers; hand-written puzzles often use letters.
/// `Int(1)` and `Name("1")` are distinct vertices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VertexId {
    Int(i64),
    Name(String),
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VertexId::Int(n) => write!(f, "{n}"),
            VertexId::Name(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for VertexId {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for VertexId {
    fn from(s: &str) -> Self {
        Self::Name(s.to_string())
    }
}

impl From<String> for VertexId {
    fn from(s: String) -> Self {
        Self::Name(s)
    }
}

/// Undirected edge between two vertices.
///
/// Self-loops (`a == b`) and parallel edges are allowed.
/// Serialized as a two-element array `[a, b]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge<V> {
    a: V,
    b: V,
}

impl<V> Edge<V> {
    pub fn new(a: V, b: V) -> Self {
        Self { a, b }
    }

    /// Both endpoints, in the order given at construction.
    pub fn endpoints(&self) -> (&V, &V) {
        (&self.a, &self.b)
    }
}

impl<V: PartialEq> Edge<V> {
    pub fn is_loop(&self) -> bool {
        self.a == self.b
    }
}

impl<V> From<(V, V)> for Edge<V> {
    fn from((a, b): (V, V)) -> Self {
        Self::new(a, b)
    }
}

impl<V> TryFrom<Vec<V>> for Edge<V> {
    type Error = OnestrokeError;

    /// Fails fast unless exactly two endpoints are present.
    fn try_from(endpoints: Vec<V>) -> Result<Self> {
        let arity = endpoints.len();
        let mut it = endpoints.into_iter();
        match (it.next(), it.next(), it.next()) {
            (Some(a), Some(b), None) => Ok(Self::new(a, b)),
            _ => Err(OnestrokeError::MalformedEdge { arity }),
        }
    }
}

impl<V: Serialize> Serialize for Edge<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        (&self.a, &self.b).serialize(serializer)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Edge<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let endpoints = Vec::<V>::deserialize(deserializer)?;
        Edge::try_from(endpoints).map_err(serde::de::Error::custom)
    }
}

/// Graph payload exchanged with the puzzle backend.
///
/// `nodes` is informational; feasibility is derived from `edges` alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "V: Serialize",
    deserialize = "V: Deserialize<'de>"
))]
pub struct Graph<V = VertexId> {
    #[serde(default)]
    pub nodes: Vec<V>,
    pub edges: Vec<Edge<V>>,
}

impl<V> Graph<V> {
    pub fn new(nodes: Vec<V>, edges: Vec<Edge<V>>) -> Self {
        Self { nodes, edges }
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

impl<V: Eq + Hash + Clone> Graph<V> {
    /// Parity check: can an Euler circuit or path exist?
    pub fn check(&self) -> bool {
        euler::is_euler_possible(&self.nodes, &self.edges)
    }

    /// Full degree, parity and connectivity report.
    pub fn analyze(&self) -> EulerReport<V> {
        euler::analyze(&self.edges)
    }
}

impl Graph<VertexId> {
    /// Load a graph from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| OnestrokeError::io(format!("Failed to read {}", path.display()), e))?;

        serde_json::from_str(&content)
            .map_err(|e| OnestrokeError::ParseError(format!("{}: {e}", path.display())))
    }

    /// Parse a graph from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| OnestrokeError::ParseError(e.to_string()))
    }
}

/// Response from `POST /solve`.
///
/// `ok == false` carries an `error` message instead of a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<VertexId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SolveResponse {
    /// Walk order if the backend found one.
    pub fn path(&self) -> Option<&[VertexId]> {
        if self.ok { self.path.as_deref() } else { None }
    }
}

/// Request body for `POST /hint`.
///
/// `state` is the puzzle state as the caller tracks it; the backend treats
/// it as opaque structured context. A screenshot may ride along as base64 PNG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HintRequest {
    pub state: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_b64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_move: Option<Edge<VertexId>>,
}

impl HintRequest {
    pub fn new(state: serde_json::Value) -> Self {
        Self {
            state,
            image_b64: None,
            suggested_move: None,
        }
    }
}
