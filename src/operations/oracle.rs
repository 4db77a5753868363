// src/operations/oracle.rs

use super::Unitary;
use crate::core::{Bitstring, QuantumState, Register, SearchResult};
use crate::predicate::{MarkedSet, Predicate};

/// Diagonal sign-flip transform O with O|x⟩ = −|x⟩ for marked x and +|x⟩ otherwise.
///
/// The marked subset is enumerated exactly once at build time; applying the
/// oracle never re-evaluates the predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseOracle {
    marked: MarkedSet,
}

impl PhaseOracle {
    /// Builds the oracle for `predicate` over a register of `width` qubits.
    ///
    /// # Errors
    /// * `SearchError::Configuration` if `width` is out of range or the predicate is not total.
    pub fn build(predicate: &dyn Predicate, width: usize) -> SearchResult<Self> {
        let register = Register::new(width)?;
        Ok(Self::from_marked(MarkedSet::enumerate(predicate, register)?))
    }

    /// Wraps an already enumerated marked set.
    pub fn from_marked(marked: MarkedSet) -> Self {
        Self { marked }
    }

    /// Number of marked bitstrings (M).
    pub fn marked_count(&self) -> usize {
        self.marked.count()
    }

    pub fn marked_set(&self) -> &MarkedSet {
        &self.marked
    }

    pub fn is_marked(&self, bits: &Bitstring) -> bool {
        self.marked.contains(bits)
    }

    /// The ±1 diagonal of the oracle matrix, indexed by basis state.
    pub fn diagonal(&self) -> Vec<f64> {
        self.marked
            .flags()
            .iter()
            .map(|&m| if m { -1.0 } else { 1.0 })
            .collect()
    }
}

impl Unitary for PhaseOracle {
    fn register(&self) -> Register {
        self.marked.register()
    }

    fn apply_to(&self, state: &mut QuantumState) {
        for (amp, &flip) in state.vector_mut().iter_mut().zip(self.marked.flags()) {
            if flip {
                *amp = -*amp;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SearchError;
    use crate::predicate::{ExactMatch, FnPredicate, Mark};
    use num_complex::Complex;

    #[test]
    fn test_oracle_flips_only_marked() -> SearchResult<()> {
        let target: Bitstring = "101".parse()?;
        let oracle = PhaseOracle::build(&ExactMatch::new(target), 3)?;
        let register = Register::new(3)?;
        let mut state = QuantumState::uniform(register);
        oracle.apply(&mut state)?;
        let amp = 1.0 / 8f64.sqrt();
        for (k, c) in state.vector().iter().enumerate() {
            let expected = if k == 5 { -amp } else { amp };
            assert!((c - Complex::new(expected, 0.0)).norm() < 1e-12, "index {}", k);
        }
        Ok(())
    }

    #[test]
    fn test_diagonal_matches_marked_set() -> SearchResult<()> {
        let oracle = PhaseOracle::build(&FnPredicate::total("weight 2", |b: &Bitstring| b.count_ones() == 2), 3)?;
        assert_eq!(oracle.marked_count(), 3);
        assert_eq!(oracle.diagonal(), vec![1.0, 1.0, 1.0, -1.0, 1.0, -1.0, -1.0, 1.0]);
        Ok(())
    }

    #[test]
    fn test_invalid_width_rejected() {
        let err = PhaseOracle::build(&FnPredicate::total("any", |_: &Bitstring| true), 0).unwrap_err();
        assert!(matches!(err, SearchError::Configuration { .. }));
    }

    #[test]
    fn test_non_total_predicate_rejected() {
        let partial = FnPredicate::partial("never", |_: &Bitstring| None::<Mark>);
        assert!(matches!(PhaseOracle::build(&partial, 2), Err(SearchError::Configuration { .. })));
    }
}
