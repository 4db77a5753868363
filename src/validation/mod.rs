// src/validation/mod.rs

//! Sanity checks on simulated states.
//!
//! Oracle and diffusion are both real orthogonal matrices, so a state that
//! starts real and normalized must stay that way through any number of
//! iterations. The simulator runs these checks before it samples.

use crate::core::QuantumState;
use thiserror::Error;

// Default tolerance values (can be overridden by caller)
const DEFAULT_NORM_TOLERANCE: f64 = 1e-9;
const DEFAULT_IMAGINARY_TOLERANCE: f64 = 1e-12;

/// A property the amplification circuit should have preserved but did not.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("state vector normalization failed: sum(|a_k|^2) = {norm_sq} (deviation > {tolerance})")]
    Unnormalized { norm_sq: f64, tolerance: f64 },

    #[error("amplitude {index} has imaginary part {imaginary} (tolerance {tolerance})")]
    ComplexAmplitude { index: usize, imaginary: f64, tolerance: f64 },
}

/// Checks that the squared amplitudes sum to 1 within `tolerance`.
pub fn check_normalization(state: &QuantumState, tolerance: Option<f64>) -> Result<(), ValidationError> {
    let tolerance = tolerance.unwrap_or(DEFAULT_NORM_TOLERANCE);
    let norm_sq: f64 = state.vector().iter().map(|c| c.norm_sqr()).sum();
    if (norm_sq - 1.0).abs() > tolerance {
        return Err(ValidationError::Unnormalized { norm_sq, tolerance });
    }
    Ok(())
}

/// Checks that every amplitude is real within `tolerance`.
pub fn check_real_amplitudes(state: &QuantumState, tolerance: Option<f64>) -> Result<(), ValidationError> {
    let tolerance = tolerance.unwrap_or(DEFAULT_IMAGINARY_TOLERANCE);
    match state.vector().iter().position(|c| c.im.abs() > tolerance) {
        Some(index) => Err(ValidationError::ComplexAmplitude {
            index,
            imaginary: state.vector()[index].im,
            tolerance,
        }),
        None => Ok(()),
    }
}

/// Runs every check with default tolerances.
pub fn validate_state(state: &QuantumState) -> Result<(), ValidationError> {
    check_normalization(state, None)?;
    check_real_amplitudes(state, None)
}
