// src/simulation/mod.rs

//! Execution backends for amplification circuits.
//!
//! The amplification engine never assumes how a circuit is executed. It talks
//! to a [`Backend`]: something that can prepare a state, apply unitary steps
//! in order, and sample the result. [`Simulator`] is the local, noiseless,
//! dense state-vector implementation; a remote executor implements the same
//! trait.

mod results;
pub(crate) mod engine;

pub use results::{CountDistribution, PassResult};

use crate::circuits::{Circuit, InitialState};
use crate::core::{ExecutionError, QuantumState, Register, MAX_REGISTER_WIDTH};
use crate::operations::Operation;
use crate::validation::validate_state;
use engine::SimulationEngine;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, instrument};

/// An opaque executor for amplification circuits.
///
/// Calls arrive strictly in the order `prepare`, `apply`*, `sample`. A
/// backend must treat `sample` as measurement: the prepared state is gone
/// afterwards and a new `prepare` is required.
pub trait Backend {
    /// Short identifier used in errors and trace events.
    fn name(&self) -> &str;

    /// Prepares `initial` on a fresh register of `register.width()` qubits,
    /// discarding any previous state.
    fn prepare(&mut self, register: Register, initial: InitialState) -> Result<(), ExecutionError>;

    /// Applies one unitary step to the prepared state.
    fn apply(&mut self, op: &Operation) -> Result<(), ExecutionError>;

    /// Measures the prepared state `shots` times and consumes it.
    fn sample(&mut self, shots: u32) -> Result<CountDistribution, ExecutionError>;

    /// Runs a whole circuit: prepare, every operation in order, then sample.
    fn execute(&mut self, circuit: &Circuit, shots: u32) -> Result<CountDistribution, ExecutionError> {
        self.prepare(circuit.register(), circuit.initial_state())?;
        for op in circuit.operations() {
            self.apply(op)?;
        }
        self.sample(shots)
    }
}

/// Local noiseless state-vector simulator.
///
/// Sampling is the only step that consumes randomness. Two simulators created
/// with the same seed produce identical counts for identical call sequences.
pub struct Simulator {
    engine: Option<SimulationEngine>,
    rng: StdRng,
    seed: u64,
    max_width: usize,
}

impl Simulator {
    /// Creates a simulator seeded from the thread-local entropy source.
    /// The chosen seed is available through [`Simulator::seed`].
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Creates a simulator whose sampler is seeded deterministically.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            engine: None,
            rng: StdRng::seed_from_u64(seed),
            seed,
            max_width: MAX_REGISTER_WIDTH,
        }
    }

    /// Caps the register width this simulator will prepare.
    pub fn with_max_width(mut self, max_width: usize) -> Self {
        self.max_width = max_width.min(MAX_REGISTER_WIDTH);
        self
    }

    /// Seed of the measurement sampler.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The prepared state, if one exists and has not been measured yet.
    pub fn state(&self) -> Option<&QuantumState> {
        self.engine.as_ref().map(|e| e.state())
    }

    fn engine_mut(&mut self) -> Result<&mut SimulationEngine, ExecutionError> {
        self.engine.as_mut().ok_or_else(|| ExecutionError::NotPrepared {
            backend: "simulator".to_string(),
        })
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for Simulator {
    fn name(&self) -> &str {
        "simulator"
    }

    #[instrument(skip(self), fields(seed = self.seed))]
    fn prepare(&mut self, register: Register, initial: InitialState) -> Result<(), ExecutionError> {
        // A rejected prepare must not leave the previous state sampleable.
        self.engine = None;
        if register.width() > self.max_width {
            return Err(ExecutionError::Fault {
                backend: self.name().to_string(),
                message: format!(
                    "register of {} qubits exceeds simulator limit of {}",
                    register.width(),
                    self.max_width
                ),
            });
        }
        if let InitialState::Basis(bits) = initial {
            if bits.width() != register.width() {
                return Err(ExecutionError::WidthMismatch {
                    backend: self.name().to_string(),
                    expected: register.width(),
                    found: bits.width(),
                });
            }
        }
        debug!(width = register.width(), %initial, "preparing state");
        self.engine = Some(SimulationEngine::init(register, initial));
        Ok(())
    }

    fn apply(&mut self, op: &Operation) -> Result<(), ExecutionError> {
        let engine = self.engine_mut()?;
        let expected = engine.register().width();
        if op.width() != expected {
            return Err(ExecutionError::WidthMismatch {
                backend: "simulator".to_string(),
                expected,
                found: op.width(),
            });
        }
        engine.apply_operation(op);
        Ok(())
    }

    fn sample(&mut self, shots: u32) -> Result<CountDistribution, ExecutionError> {
        let engine = self.engine.take().ok_or_else(|| ExecutionError::NotPrepared {
            backend: self.name().to_string(),
        })?;
        validate_state(engine.state()).map_err(|e| ExecutionError::Fault {
            backend: self.name().to_string(),
            message: e.to_string(),
        })?;
        debug!(shots, "sampling state");
        Ok(engine.measure(shots, &mut self.rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Bitstring, SearchResult};
    use crate::operations::{DiffusionOperator, PhaseOracle};
    use crate::predicate::ExactMatch;
    use num_complex::Complex;
    use std::sync::Arc;

    const TEST_TOLERANCE: f64 = 1e-9;

    /// Asserts that two complex state vectors are approximately equal component-wise.
    fn assert_complex_vec_approx_equal(actual: &[Complex<f64>], expected: &[Complex<f64>], context: &str) {
        assert_eq!(actual.len(), expected.len(), "Vector length mismatch - {}", context);
        for i in 0..actual.len() {
            let dist_sq = (actual[i] - expected[i]).norm_sqr();
            assert!(
                dist_sq < TEST_TOLERANCE * TEST_TOLERANCE,
                "Vector mismatch at index {} - Actual: {}, Expected: {}, Context: {}",
                i, actual[i], expected[i], context
            );
        }
    }

    #[test]
    fn test_single_iteration_on_two_qubits_is_exact() -> SearchResult<()> {
        // N=2, M=1: one iteration lands exactly on the marked state.
        let register = Register::new(2)?;
        let target: Bitstring = "11".parse()?;
        let oracle = Arc::new(PhaseOracle::build(&ExactMatch::new(target), 2)?);
        let mut sim = Simulator::with_seed(1);
        sim.prepare(register, InitialState::Uniform)?;
        sim.apply(&Operation::PhaseOracle(oracle))?;
        sim.apply(&Operation::Diffusion(DiffusionOperator::for_register(register)))?;

        let expected = vec![Complex::new(0.0, 0.0), Complex::new(0.0, 0.0), Complex::new(0.0, 0.0), Complex::new(1.0, 0.0)];
        let state = sim.state().expect("state is prepared");
        assert_complex_vec_approx_equal(state.vector(), &expected, "Grover N=2 after one iteration");

        let counts = sim.sample(100)?;
        assert_eq!(counts.count(&target), 100);
        Ok(())
    }

    #[test]
    fn test_sample_consumes_state() -> SearchResult<()> {
        let mut sim = Simulator::with_seed(3);
        sim.prepare(Register::new(1)?, InitialState::Uniform)?;
        sim.sample(10)?;
        assert!(sim.state().is_none());
        assert!(matches!(sim.sample(10), Err(ExecutionError::NotPrepared { .. })));
        Ok(())
    }

    #[test]
    fn test_apply_before_prepare_fails() -> SearchResult<()> {
        let mut sim = Simulator::with_seed(3);
        let op = Operation::Diffusion(DiffusionOperator::new(2)?);
        assert!(matches!(sim.apply(&op), Err(ExecutionError::NotPrepared { .. })));
        Ok(())
    }

    #[test]
    fn test_width_mismatch_reported() -> SearchResult<()> {
        let mut sim = Simulator::with_seed(3);
        sim.prepare(Register::new(3)?, InitialState::Uniform)?;
        let op = Operation::Diffusion(DiffusionOperator::new(2)?);
        assert!(matches!(
            sim.apply(&op),
            Err(ExecutionError::WidthMismatch { expected: 3, found: 2, .. })
        ));
        Ok(())
    }

    #[test]
    fn test_max_width_enforced() -> SearchResult<()> {
        let mut sim = Simulator::with_seed(3).with_max_width(2);
        let err = sim.prepare(Register::new(3)?, InitialState::Uniform).unwrap_err();
        assert!(matches!(err, ExecutionError::Fault { .. }));
        Ok(())
    }

    #[test]
    fn test_failed_prepare_discards_previous_state() -> SearchResult<()> {
        let mut sim = Simulator::with_seed(5).with_max_width(2);
        sim.prepare(Register::new(2)?, InitialState::Uniform)?;
        assert!(sim.state().is_some());

        assert!(sim.prepare(Register::new(3)?, InitialState::Uniform).is_err());
        assert!(sim.state().is_none());
        let err = sim.sample(16).unwrap_err();
        assert!(matches!(err, ExecutionError::NotPrepared { .. }));

        let bad_basis = InitialState::Basis("101".parse()?);
        sim.prepare(Register::new(2)?, InitialState::Uniform)?;
        assert!(sim.prepare(Register::new(2)?, bad_basis).is_err());
        assert!(matches!(sim.sample(16), Err(ExecutionError::NotPrepared { .. })));
        Ok(())
    }

    #[test]
    fn test_seed_is_reported() {
        assert_eq!(Simulator::with_seed(99).seed(), 99);
    }
}
