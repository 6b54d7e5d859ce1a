//! Core data models for onestroke.
//!
//! Epistemic mapping:
//! - K_i (Knowledge): Concrete types with compile-time guarantees (two-endpoint edges)
//! - B_i (Beliefs): Wrapped in Result/Option
//! - I^R (Resolvable): Generics and config parameters
//! - I^B (Bounded): Error variants with fallback strategies

mod config;
mod error;
mod graph;

pub use config::*;
pub use error::*;
pub use graph::*;
