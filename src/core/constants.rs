//! Constants shared by the engine and the run configuration.

/// Defaults and limits for amplification runs
pub mod qsearch_constants {
    /// Shot count used when a run request does not name one.
    pub const DEFAULT_SHOTS: u32 = 1024;
    /// Pass count used when a run request does not name one.
    pub const DEFAULT_PASSES: usize = 1;
    /// Largest register the dense state-vector simulation accepts (2^16 amplitudes).
    pub const MAX_REGISTER_WIDTH: usize = 16;
    /// Largest number of passes a single run may coordinate.
    pub const MAX_PASSES: usize = 3;
    /// Used for the iteration count `floor(π/4 · sqrt(2^N / M))`
    pub const PI: f64 = std::f64::consts::PI;
}
