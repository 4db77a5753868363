// src/core/state.rs

use super::bitstring::{Bitstring, Register};
use num_complex::Complex;
use num_traits::Zero;
use std::fmt;

/// A superposition over all 2^N bitstrings of a register.
///
/// Owned by whichever backend is executing a pass; it is never shared between
/// passes and is consumed when the backend samples it.
#[derive(Debug, Clone, PartialEq)] // Avoid Eq for floating-point complex numbers
pub struct QuantumState {
    /// Amplitude of basis state `k` lives at index `k`.
    state_vector: Vec<Complex<f64>>,
    register: Register,
}

impl QuantumState {
    /// Wraps a raw amplitude vector. The caller guarantees `len == register.dim()`.
    pub(crate) fn new(register: Register, initial_vector: Vec<Complex<f64>>) -> Self {
        Self { state_vector: initial_vector, register }
    }

    /// The equal superposition |s⟩ = 2^(-N/2) Σ|x⟩.
    pub fn uniform(register: Register) -> Self {
        let dim = register.dim();
        let amplitude = Complex::new(1.0 / (dim as f64).sqrt(), 0.0);
        Self::new(register, vec![amplitude; dim])
    }

    /// The computational basis state |b⟩.
    pub fn basis(register: Register, bits: &Bitstring) -> Self {
        let mut vector = vec![Complex::zero(); register.dim()];
        if let Some(slot) = vector.get_mut(bits.index()) {
            *slot = Complex::new(1.0, 0.0);
        }
        Self::new(register, vector)
    }

    /// Provides read-only access to the amplitudes.
    pub fn vector(&self) -> &[Complex<f64>] {
        &self.state_vector
    }

    pub(crate) fn vector_mut(&mut self) -> &mut [Complex<f64>] {
        &mut self.state_vector
    }

    /// Register this state is defined over.
    pub fn register(&self) -> Register {
        self.register
    }

    /// Number of basis states (2^N).
    pub fn dim(&self) -> usize {
        self.state_vector.len()
    }

    /// Born-rule probability of every basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.state_vector.iter().map(|c| c.norm_sqr()).collect()
    }

    /// Probability of observing `bits` on measurement.
    pub fn probability_of(&self, bits: &Bitstring) -> f64 {
        self.state_vector.get(bits.index()).map_or(0.0, |c| c.norm_sqr())
    }

    /// Total probability over the basis states for which `include` returns true.
    pub fn probability_where<F>(&self, mut include: F) -> f64
    where
        F: FnMut(usize) -> bool,
    {
        self.state_vector
            .iter()
            .enumerate()
            .filter(|(k, _)| include(*k))
            .map(|(_, c)| c.norm_sqr())
            .sum()
    }
}

impl fmt::Display for QuantumState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "State[")?;
        for (i, c) in self.state_vector.iter().enumerate() {
            write!(f, "{}{:.4}", if i > 0 { ", " } else { "" }, c)?;
        }
        write!(f, "]")
    }
}
