//! onestroke - Euler path feasibility and a client for the one-stroke puzzle backend.
//!
//! ## Architecture
//!
//! - **Checker** (`euler`): degree table, parity verdict, connectivity report.
//!   Pure and synchronous; needs nothing from the network.
//! - **Client** (`client`): typed pass-through to the puzzle backend's
//!   `/generate`, `/level`, `/solve` and `/hint` endpoints.
//!
//! ## Epistemic Design
//!
//! - K_i (Knowledge): Compile-time enforced invariants (two-endpoint edges)
//! - B_i (Beliefs): Runtime fallible operations (Result, Option)
//! - I^R (Resolvable): User-configurable parameters
//! - I^B (Bounded): Network uncertainties (retry, backoff)

pub mod client;
pub mod euler;
pub mod models;

// Re-exports for convenience
pub use client::{BackendClient, HealthCheckResult, HealthStatus};
pub use euler::{DegreeTable, EulerKind, EulerReport, analyze, classify, is_connected, is_euler_possible};
pub use models::{
    Config, Edge, Graph, HintRequest, OnestrokeError, Result, SolveResponse, VertexId,
};
