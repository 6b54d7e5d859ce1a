//! Puzzle backend client module.

mod backend;

pub use backend::*;
