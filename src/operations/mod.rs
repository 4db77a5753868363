// src/operations/mod.rs

//! The two transforms an amplification iteration is built from.
//!
//! A Grover iteration is the phase oracle followed by the diffusion
//! operator. Both are exact: the oracle encodes precisely the marked subset
//! of a predicate and the diffusion operator is the reflection about the
//! uniform superposition.

mod diffusion;
mod oracle;

pub use diffusion::DiffusionOperator;
pub use oracle::PhaseOracle;

use crate::core::{QuantumState, Register, SearchError, SearchResult};
use std::fmt;
use std::sync::Arc;

/// A unitary transform over a fixed register.
pub trait Unitary {
    /// Register the transform was built for.
    fn register(&self) -> Register;

    /// Applies the transform in place. Assumes the widths already match.
    fn apply_to(&self, state: &mut QuantumState);

    /// Applies the transform after checking that `state` has the same width.
    fn apply(&self, state: &mut QuantumState) -> SearchResult<()> {
        let expected = self.register().width();
        let found = state.register().width();
        if expected != found {
            return Err(SearchError::configuration(format!(
                "transform built for {} qubits applied to a {}-qubit state",
                expected, found
            )));
        }
        self.apply_to(state);
        Ok(())
    }
}

/// One step of a circuit, handed to a backend for execution.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Sign flip on every marked bitstring. Shared so repeated iterations do
    /// not copy the marked set.
    PhaseOracle(Arc<PhaseOracle>),
    /// Reflection about the mean.
    Diffusion(DiffusionOperator),
}

impl Operation {
    /// Width of the register this operation acts on.
    pub fn width(&self) -> usize {
        self.as_unitary().register().width()
    }

    /// Views the operation through the common [`Unitary`] contract.
    pub fn as_unitary(&self) -> &dyn Unitary {
        match self {
            Operation::PhaseOracle(oracle) => &**oracle as &dyn Unitary,
            Operation::Diffusion(diffusion) => diffusion as &dyn Unitary,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::PhaseOracle(oracle) => write!(
                f,
                "Oracle[{} marked: {}]",
                oracle.marked_count(),
                oracle.marked_set().label()
            ),
            Operation::Diffusion(d) => write!(f, "Diffusion[{} qubits]", d.register().width()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Bitstring;
    use crate::predicate::{Order, Sorted};

    #[test]
    fn test_oracle_squared_is_identity() -> SearchResult<()> {
        let register = Register::new(3)?;
        let oracle = PhaseOracle::build(&Sorted::new(Order::Ascending), 3)?;
        // Start from a non-uniform state so every sign matters.
        let mut state = QuantumState::uniform(register);
        DiffusionOperator::for_register(register).apply(&mut state)?;
        oracle.apply(&mut state)?;
        let once = state.clone();
        oracle.apply(&mut state)?;
        oracle.apply(&mut state)?;
        assert_eq!(state, once);
        Ok(())
    }

    #[test]
    fn test_width_mismatch_rejected() -> SearchResult<()> {
        let d = DiffusionOperator::new(2)?;
        let mut state = QuantumState::basis(Register::new(3)?, &Bitstring::from_index(0, 3)?);
        assert!(matches!(d.apply(&mut state), Err(SearchError::Configuration { .. })));
        Ok(())
    }

    #[test]
    fn test_operation_width() -> SearchResult<()> {
        let oracle = Arc::new(PhaseOracle::build(&Sorted::default(), 4)?);
        assert_eq!(Operation::PhaseOracle(oracle).width(), 4);
        assert_eq!(Operation::Diffusion(DiffusionOperator::new(4)?).width(), 4);
        Ok(())
    }
}
