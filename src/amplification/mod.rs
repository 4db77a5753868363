// src/amplification/mod.rs

//! One complete amplitude-amplification pass.
//!
//! A pass prepares the uniform superposition, applies the oracle + diffusion
//! iteration `k` times and samples the result. `k` is the optimum
//! `floor(π/4 · sqrt(2^N / M))` unless an [`IterationPolicy::Fixed`] count
//! overrides it.

use crate::circuits::{Circuit, CircuitBuilder};
use crate::core::constants::qsearch_constants::PI;
use crate::core::{ExecutionError, Register, SearchError, SearchResult};
use crate::operations::{DiffusionOperator, PhaseOracle};
use crate::predicate::{MarkedSet, Predicate};
use crate::simulation::{Backend, PassResult};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Optimal Grover iteration count `floor(π/4 · sqrt(2^N / M))`.
///
/// # Errors
/// * `SearchError::DegenerateInput` if `marked == 0`.
/// * `SearchError::Configuration` if `width` is out of range or `marked > 2^N`.
pub fn optimal_iterations(width: usize, marked: usize) -> SearchResult<usize> {
    let register = Register::new(width)?;
    if marked == 0 {
        return Err(SearchError::DegenerateInput {
            width,
            predicate: "<analytic>".to_string(),
        });
    }
    let dim = register.dim();
    if marked > dim {
        return Err(SearchError::configuration(format!(
            "{} marked bitstrings exceed the {} states of a {}-qubit register",
            marked, dim, width
        )));
    }
    Ok(iterations_for(dim, marked))
}

fn iterations_for(dim: usize, marked: usize) -> usize {
    let ratio = dim as f64 / marked as f64;
    (PI / 4.0 * ratio.sqrt()).floor() as usize
}

/// Ideal probability of measuring a marked bitstring after `k` iterations,
/// `sin²((2k + 1)·θ)` with `sin θ = sqrt(M / 2^N)`.
pub fn success_probability(width: usize, marked: usize, k: usize) -> SearchResult<f64> {
    let register = Register::new(width)?;
    let dim = register.dim();
    if marked > dim {
        return Err(SearchError::configuration(format!(
            "{} marked bitstrings exceed the {} states of a {}-qubit register",
            marked, dim, width
        )));
    }
    let theta = (marked as f64 / dim as f64).sqrt().asin();
    Ok(((2 * k + 1) as f64 * theta).sin().powi(2))
}

/// How many oracle + diffusion iterations a pass applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IterationPolicy {
    /// `floor(π/4 · sqrt(2^N / M))`.
    #[default]
    Optimal,
    /// A caller-chosen count, regardless of M.
    Fixed(usize),
}

/// Builds and executes single amplification passes against a backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmplificationEngine {
    iterations: IterationPolicy,
}

impl AmplificationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_iterations(iterations: IterationPolicy) -> Self {
        Self { iterations }
    }

    pub fn iteration_policy(&self) -> IterationPolicy {
        self.iterations
    }

    /// Builds the circuit for one pass without executing it.
    ///
    /// Returns the circuit together with the marked count M it was built for.
    ///
    /// # Errors
    /// * `SearchError::Configuration` for an invalid width or non-total predicate.
    /// * `SearchError::DegenerateInput` if the predicate marks nothing.
    pub fn build_circuit(&self, predicate: &dyn Predicate, width: usize) -> SearchResult<(Circuit, usize)> {
        let register = Register::new(width)?;
        let marked = MarkedSet::enumerate(predicate, register)?;
        if marked.is_empty() {
            return Err(SearchError::DegenerateInput {
                width,
                predicate: predicate.label(),
            });
        }
        let m = marked.count();
        let k = match self.iterations {
            IterationPolicy::Optimal => iterations_for(register.dim(), m),
            IterationPolicy::Fixed(k) => k,
        };
        let oracle = Arc::new(PhaseOracle::from_marked(marked));
        let diffusion = DiffusionOperator::for_register(register);
        let circuit = CircuitBuilder::new(register)
            .grover_iterations(&oracle, diffusion, k)
            .build()?;
        Ok((circuit, m))
    }

    /// Runs one complete pass: validation, oracle construction, `k` iterations, measurement.
    ///
    /// # Errors
    /// * `SearchError::InvalidShotCount` if `shots == 0`.
    /// * `SearchError::Configuration` for an invalid width or non-total predicate.
    /// * `SearchError::DegenerateInput` if the predicate marks nothing.
    /// * `SearchError::Execution` if the backend fails, or returns a
    ///   distribution whose total differs from `shots`.
    #[instrument(skip(self, backend, predicate), fields(backend = backend.name(), predicate = %predicate.label()))]
    pub fn run_pass<B>(
        &self,
        backend: &mut B,
        predicate: &dyn Predicate,
        width: usize,
        shots: u32,
    ) -> SearchResult<PassResult>
    where
        B: Backend + ?Sized,
    {
        if shots == 0 {
            return Err(SearchError::InvalidShotCount { shots });
        }
        let (circuit, marked) = self.build_circuit(predicate, width)?;
        debug!(marked, iterations = circuit.iterations(), "executing amplification circuit");

        let counts = backend.execute(&circuit, shots)?;
        if counts.total() != u64::from(shots) {
            return Err(ExecutionError::Fault {
                backend: backend.name().to_string(),
                message: format!("returned {} samples for {} requested shots", counts.total(), shots),
            }
            .into());
        }
        if counts.register() != circuit.register() {
            return Err(ExecutionError::WidthMismatch {
                backend: backend.name().to_string(),
                expected: circuit.register().width(),
                found: counts.register().width(),
            }
            .into());
        }

        Ok(PassResult::new(
            counts,
            circuit.iterations(),
            shots,
            marked,
            predicate.label(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Bitstring;
    use crate::predicate::{ExactMatch, FnPredicate, Order, Sorted};
    use crate::simulation::Simulator;

    #[test]
    fn test_known_iteration_counts() -> SearchResult<()> {
        assert_eq!(optimal_iterations(2, 1)?, 1);
        assert_eq!(optimal_iterations(3, 1)?, 2);
        assert_eq!(optimal_iterations(3, 4)?, 1);
        assert_eq!(optimal_iterations(4, 1)?, 3);
        assert_eq!(optimal_iterations(10, 1)?, 25);
        // M = 2^N: floor(π/4) = 0, nothing to amplify.
        assert_eq!(optimal_iterations(3, 8)?, 0);
        Ok(())
    }

    #[test]
    fn test_zero_marked_is_degenerate() {
        assert!(matches!(optimal_iterations(3, 0), Err(SearchError::DegenerateInput { .. })));
    }

    #[test]
    fn test_success_probability_single_marked_three_qubits() -> SearchResult<()> {
        let k = optimal_iterations(3, 1)?;
        let p = success_probability(3, 1, k)?;
        assert!(p > 0.9, "p = {}", p);
        assert!((p - 0.9453).abs() < 1e-3);
        Ok(())
    }

    #[test]
    fn test_optimum_beats_neighbours() -> SearchResult<()> {
        for width in 2..=8 {
            let k = optimal_iterations(width, 1)?;
            let best = success_probability(width, 1, k)?;
            assert!(best >= success_probability(width, 1, k + 1)?);
            if k > 0 {
                assert!(best >= success_probability(width, 1, k - 1)?);
            }
        }
        Ok(())
    }

    #[test]
    fn test_degenerate_pass_runs_nothing() -> SearchResult<()> {
        let mut sim = Simulator::with_seed(5);
        let nothing = FnPredicate::total("nothing", |_: &Bitstring| false);
        let err = AmplificationEngine::new().run_pass(&mut sim, &nothing, 3, 64).unwrap_err();
        assert!(matches!(err, SearchError::DegenerateInput { width: 3, .. }));
        assert!(sim.state().is_none());
        Ok(())
    }

    #[test]
    fn test_zero_shots_rejected() -> SearchResult<()> {
        let mut sim = Simulator::with_seed(5);
        let p = Sorted::new(Order::Ascending);
        let err = AmplificationEngine::new().run_pass(&mut sim, &p, 3, 0).unwrap_err();
        assert_eq!(err, SearchError::InvalidShotCount { shots: 0 });
        Ok(())
    }

    #[test]
    fn test_pass_amplifies_target() -> SearchResult<()> {
        let mut sim = Simulator::with_seed(2024);
        let target: Bitstring = "101".parse()?;
        let pass = AmplificationEngine::new().run_pass(&mut sim, &ExactMatch::new(target), 3, 1024)?;
        assert_eq!(pass.iterations(), 2);
        assert_eq!(pass.marked_count(), 1);
        assert_eq!(pass.counts().total(), 1024);
        let (dominant, fraction) = pass.dominant().expect("samples were taken");
        assert_eq!(dominant, target);
        assert!(fraction > 0.85);
        Ok(())
    }

    #[test]
    fn test_fixed_iterations_override() -> SearchResult<()> {
        let engine = AmplificationEngine::with_iterations(IterationPolicy::Fixed(5));
        let (circuit, marked) = engine.build_circuit(&ExactMatch::new("011".parse()?), 3)?;
        assert_eq!(marked, 1);
        assert_eq!(circuit.iterations(), 5);
        assert_eq!(circuit.len(), 10);
        Ok(())
    }
}
