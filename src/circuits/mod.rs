// src/circuits/mod.rs

//! Defines structures for representing and building ordered sequences of
//! operations (`qsearch::operations::Operation`).
//!
//! A `Circuit` is what the amplification engine hands to a backend: a
//! register, the state to prepare on it, and the unitary steps to apply in
//! order before measurement.

use crate::core::{Bitstring, Register, SearchError, SearchResult};
use crate::operations::{DiffusionOperator, Operation, PhaseOracle};
use std::fmt;
use std::sync::Arc;

/// The state a backend prepares before applying any operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialState {
    /// Equal superposition over all 2^N bitstrings.
    Uniform,
    /// A single computational basis state.
    Basis(Bitstring),
}

impl fmt::Display for InitialState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitialState::Uniform => write!(f, "|s⟩"),
            InitialState::Basis(b) => write!(f, "|{}⟩", b),
        }
    }
}

/// Represents an ordered sequence of operations applied to one register.
#[derive(Clone, PartialEq)]
pub struct Circuit {
    register: Register,
    initial: InitialState,
    /// The order is significant: O then D within every iteration.
    operations: Vec<Operation>,
    /// Number of complete oracle + diffusion iterations appended.
    iterations: usize,
}

impl Circuit {
    /// Creates an empty circuit that prepares the uniform superposition.
    pub fn new(register: Register) -> Self {
        Self {
            register,
            initial: InitialState::Uniform,
            operations: Vec::new(),
            iterations: 0,
        }
    }

    /// Appends an operation after checking it was built for this register.
    ///
    /// # Errors
    /// * `SearchError::Configuration` on a register width mismatch.
    pub fn add_operation(&mut self, op: Operation) -> SearchResult<()> {
        if op.width() != self.register.width() {
            return Err(SearchError::configuration(format!(
                "operation '{}' acts on {} qubits but the circuit register has {}",
                op,
                op.width(),
                self.register.width()
            )));
        }
        self.operations.push(op);
        Ok(())
    }

    /// Appends one Grover iteration: the oracle, then the diffusion operator.
    pub fn add_grover_iteration(
        &mut self,
        oracle: &Arc<PhaseOracle>,
        diffusion: DiffusionOperator,
    ) -> SearchResult<()> {
        self.add_operation(Operation::PhaseOracle(Arc::clone(oracle)))?;
        self.add_operation(Operation::Diffusion(diffusion))?;
        self.iterations += 1;
        Ok(())
    }

    pub fn register(&self) -> Register {
        self.register
    }

    pub fn initial_state(&self) -> InitialState {
        self.initial
    }

    /// Returns a slice containing the ordered sequence of operations in this circuit.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Number of oracle + diffusion iterations.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

//-------------------------------------------------------------------------
// Circuit Builder
//-------------------------------------------------------------------------

/// A helper struct for programmatically constructing `Circuit` instances using method chaining.
///
/// Errors are deferred to [`CircuitBuilder::build`] so chains stay readable.
pub struct CircuitBuilder {
    circuit: Circuit,
    error: Option<SearchError>,
}

impl CircuitBuilder {
    pub fn new(register: Register) -> Self {
        Self {
            circuit: Circuit::new(register),
            error: None,
        }
    }

    /// Prepares `initial` instead of the uniform superposition.
    pub fn initial_state(mut self, initial: InitialState) -> Self {
        if let InitialState::Basis(b) = initial {
            if b.width() != self.circuit.register.width() {
                self.record(SearchError::configuration(format!(
                    "initial bitstring {} does not match register width {}",
                    b,
                    self.circuit.register.width()
                )));
            }
        }
        self.circuit.initial = initial;
        self
    }

    pub fn add_op(mut self, op: Operation) -> Self {
        if let Err(e) = self.circuit.add_operation(op) {
            self.record(e);
        }
        self
    }

    /// Appends `count` oracle + diffusion iterations.
    pub fn grover_iterations(mut self, oracle: &Arc<PhaseOracle>, diffusion: DiffusionOperator, count: usize) -> Self {
        for _ in 0..count {
            if let Err(e) = self.circuit.add_grover_iteration(oracle, diffusion) {
                self.record(e);
                break;
            }
        }
        self
    }

    fn record(&mut self, e: SearchError) {
        // Keep the first failure; later ones are usually consequences of it.
        self.error.get_or_insert(e);
    }

    /// Finalizes the construction process and returns the built `Circuit`.
    pub fn build(self) -> SearchResult<Circuit> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.circuit),
        }
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "qsearch::Circuit[{} operations, {} iterations on {}]",
            self.operations.len(),
            self.iterations,
            self.register
        )?;
        writeln!(f, "  prepare {}", self.initial)?;
        for (t, op) in self.operations.iter().enumerate() {
            writeln!(f, "  {:>3}: {}", t, op)?;
        }
        writeln!(f, "  measure")
    }
}

// Keep the Debug impl delegating to Display
impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::ExactMatch;

    #[test]
    fn test_iterations_alternate_oracle_then_diffusion() -> SearchResult<()> {
        let register = Register::new(3)?;
        let oracle = Arc::new(PhaseOracle::build(&ExactMatch::new("101".parse()?), 3)?);
        let circuit = CircuitBuilder::new(register)
            .grover_iterations(&oracle, DiffusionOperator::for_register(register), 2)
            .build()?;
        assert_eq!(circuit.iterations(), 2);
        assert_eq!(circuit.len(), 4);
        for pair in circuit.operations().chunks(2) {
            assert!(matches!(pair[0], Operation::PhaseOracle(_)));
            assert!(matches!(pair[1], Operation::Diffusion(_)));
        }
        assert_eq!(circuit.initial_state(), InitialState::Uniform);
        Ok(())
    }

    #[test]
    fn test_mismatched_operation_rejected() -> SearchResult<()> {
        let result = CircuitBuilder::new(Register::new(3)?)
            .add_op(Operation::Diffusion(DiffusionOperator::new(2)?))
            .build();
        assert!(matches!(result, Err(SearchError::Configuration { .. })));
        Ok(())
    }

    #[test]
    fn test_display_lists_steps() -> SearchResult<()> {
        let register = Register::new(2)?;
        let circuit = CircuitBuilder::new(register)
            .initial_state(InitialState::Basis("01".parse()?))
            .add_op(Operation::Diffusion(DiffusionOperator::for_register(register)))
            .build()?;
        let text = circuit.to_string();
        assert!(text.contains("prepare |01⟩"));
        assert!(text.contains("Diffusion[2 qubits]"));
        Ok(())
    }
}
