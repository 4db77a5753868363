//! Error handling logic

use thiserror::Error;

/// Errors raised while configuring or running an amplification search.
///
/// Every variant is terminal for the current run: no partial ranking is
/// ever produced once one of these has been returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// Invalid register width or a predicate that is not total over the register.
    /// Detected during setup, before any state is prepared.
    #[error("Configuration Error: {message}")]
    Configuration {
        /// Configuration failure message
        message: String,
    },

    /// No bitstring satisfies the predicate, so the iteration count is undefined.
    #[error("Degenerate Input: predicate '{predicate}' marks no bitstring of width {width}")]
    DegenerateInput {
        /// Register width the predicate was evaluated over
        width: usize,
        /// Label of the offending predicate
        predicate: String,
    },

    /// A pass was requested with zero shots.
    #[error("Invalid Shot Count: {shots} (must be > 0)")]
    InvalidShotCount {
        /// The rejected shot count
        shots: u32,
    },

    /// A run was requested with a pass count outside `1..=3`.
    #[error("Invalid Pass Count: {passes} (must be 1, 2 or 3)")]
    InvalidPassCount {
        /// The rejected pass count
        passes: usize,
    },

    /// The backend failed to prepare, apply or sample. Carried through unchanged.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

impl SearchError {
    /// Shorthand for a [`SearchError::Configuration`] with the given message.
    pub fn configuration(message: impl Into<String>) -> Self {
        SearchError::Configuration { message: message.into() }
    }
}

/// Failures reported by a [`Backend`](crate::simulation::Backend) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// An operation or a sample was requested before `prepare`.
    #[error("Execution Error ({backend}): no prepared state")]
    NotPrepared {
        /// Name of the backend
        backend: String,
    },

    /// An operation was built for a different register width than the prepared state.
    #[error("Execution Error ({backend}): operation width {found} does not match prepared width {expected}")]
    WidthMismatch {
        /// Name of the backend
        backend: String,
        /// Width of the prepared register
        expected: usize,
        /// Width the operation was built for
        found: usize,
    },

    /// Any other fault inside the execution substrate.
    #[error("Execution Error ({backend}): {message}")]
    Fault {
        /// Name of the backend
        backend: String,
        /// Fault description
        message: String,
    },
}

/// Result alias used throughout the crate.
pub type SearchResult<T> = Result<T, SearchError>;
