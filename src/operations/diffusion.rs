// src/operations/diffusion.rs

use super::Unitary;
use crate::core::{QuantumState, Register, SearchResult};
use num_complex::Complex;

/// Reflection about the uniform superposition, D = 2|s⟩⟨s| − I.
///
/// Depends only on the register width, so one instance serves every
/// iteration and every pass of that width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffusionOperator {
    register: Register,
}

impl DiffusionOperator {
    /// # Errors
    /// * `SearchError::Configuration` if `width` is out of range.
    pub fn new(width: usize) -> SearchResult<Self> {
        Ok(Self::for_register(Register::new(width)?))
    }

    pub fn for_register(register: Register) -> Self {
        Self { register }
    }

    /// Dense matrix form: entry (i, j) is `2/2^N − δ_ij`.
    ///
    /// Only intended for inspection on small registers; `apply` never builds it.
    pub fn matrix(&self) -> Vec<Vec<Complex<f64>>> {
        let dim = self.register.dim();
        let off = 2.0 / dim as f64;
        (0..dim)
            .map(|i| {
                (0..dim)
                    .map(|j| Complex::new(if i == j { off - 1.0 } else { off }, 0.0))
                    .collect()
            })
            .collect()
    }
}

impl Unitary for DiffusionOperator {
    fn register(&self) -> Register {
        self.register
    }

    // 2|s⟩⟨s|ψ⟩ − |ψ⟩ reduces to a_k → 2·mean(a) − a_k.
    fn apply_to(&self, state: &mut QuantumState) {
        let vector = state.vector_mut();
        let dim = vector.len() as f64;
        let mean = vector.iter().sum::<Complex<f64>>() / dim;
        for amp in vector.iter_mut() {
            *amp = mean * 2.0 - *amp;
        }
    }
}
