//! Euler circuit/path feasibility.
//!
//! K_i: A connected graph has an Euler circuit iff every degree is even, and
//! an Euler path iff exactly two degrees are odd. Parity is computed from the
//! edge list alone; connectivity is reported separately.

mod degree;
mod feasibility;

pub use degree::*;
pub use feasibility::*;
