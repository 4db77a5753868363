// src/core/mod.rs

//! Core data structures and types

pub mod bitstring;
pub mod error;
pub mod state;

// Re-export public types for convenient access via `qsearch::core::TypeName`
pub use bitstring::{Bitstring, Register};
pub use error::{ExecutionError, SearchError, SearchResult};
pub use state::QuantumState;

pub mod constants;
pub use constants::qsearch_constants::{DEFAULT_PASSES, DEFAULT_SHOTS, MAX_PASSES, MAX_REGISTER_WIDTH};
