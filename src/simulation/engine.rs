// src/simulation/engine.rs
use crate::circuits::InitialState;
use crate::core::{QuantumState, Register};
use crate::operations::Operation;
use crate::simulation::CountDistribution;
use rand::Rng;
use rand::distr::{Distribution, StandardUniform};
use tracing::trace;

/// Dense state-vector engine: holds the working state of one pass.
/// (Internal visibility)
pub(crate) struct SimulationEngine {
    /// Amplitude vector of dimension 2^N.
    state: QuantumState,
}

impl SimulationEngine {
    /// Prepares `initial` on `register`. The caller has already validated the width.
    pub(crate) fn init(register: Register, initial: InitialState) -> Self {
        let state = match initial {
            InitialState::Uniform => QuantumState::uniform(register),
            InitialState::Basis(bits) => QuantumState::basis(register, &bits),
        };
        Self { state }
    }

    pub(crate) fn register(&self) -> Register {
        self.state.register()
    }

    pub(crate) fn state(&self) -> &QuantumState {
        &self.state
    }

    /// Applies a single operation to the working state in place.
    /// The caller guarantees matching widths.
    pub(crate) fn apply_operation(&mut self, op: &Operation) {
        trace!(operation = %op, "applying operation");
        op.as_unitary().apply_to(&mut self.state);
    }

    /// Measures the state `shots` times, consuming it.
    ///
    /// Each shot draws `r` uniformly from `[0, Σp)` and selects the first basis
    /// state whose cumulative probability exceeds `r`.
    pub(crate) fn measure<R>(self, shots: u32, rng: &mut R) -> CountDistribution
    where
        R: Rng + ?Sized,
    {
        let register = self.state.register();
        let mut cumulative = Vec::with_capacity(self.state.dim());
        let mut running = 0.0;
        for p in self.state.probabilities() {
            running += p;
            cumulative.push(running);
        }
        let total = running;
        // Floating-point slack can leave r >= every cumulative entry; fall back
        // to the last state that actually carries probability.
        let fallback = self
            .state
            .vector()
            .iter()
            .rposition(|c| c.norm_sqr() > 0.0)
            .unwrap_or(0);

        let mut histogram = vec![0u64; self.state.dim()];
        for _ in 0..shots {
            let u: f64 = StandardUniform.sample(rng);
            let r = u * total;
            let k = cumulative.partition_point(|&c| c <= r);
            let k = if k < histogram.len() { k } else { fallback };
            histogram[k] += 1;
        }
        CountDistribution::from_histogram(register, &histogram)
    }
}
