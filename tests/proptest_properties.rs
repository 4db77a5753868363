//! Property-based tests for the amplification building blocks.
//!
//! Covers the iteration-count formula, oracle involution, shot accounting and
//! predicate purity over randomly chosen registers and marked sets.

use proptest::prelude::*;
use qsearch::{
    AmplificationEngine, Bitstring, DiffusionOperator, FnPredicate, Order, PhaseOracle, Predicate, PrefixMatch,
    QuantumState, Register, Simulator, Sorted, SortingNetwork, Unitary, optimal_iterations, success_probability,
};
use std::f64::consts::PI;

/// A register width together with a bitmask over its basis states.
///
/// Bit `k` of the mask marks basis index `k`; masks are never zero.
fn arb_marked_mask() -> impl Strategy<Value = (usize, u64)> {
    (1_usize..=6).prop_flat_map(|width| {
        let dim = 1_u64 << width;
        let full = if dim == 64 { u64::MAX } else { (1_u64 << dim) - 1 };
        (Just(width), 1_u64..=full)
    })
}

fn mask_predicate(mask: u64) -> FnPredicate {
    FnPredicate::total(format!("mask {:#x}", mask), move |b: &Bitstring| (mask >> b.index()) & 1 == 1)
}

proptest! {
    /// k = floor(π/4 · sqrt(2^N / M)) for every valid (N, M).
    #[test]
    fn test_iteration_count_formula((width, marked) in (1_usize..=12).prop_flat_map(|w| (Just(w), 1_usize..=(1 << w)))) {
        let expected = (PI / 4.0 * ((1_usize << width) as f64 / marked as f64).sqrt()).floor() as usize;
        prop_assert_eq!(optimal_iterations(width, marked).expect("valid input"), expected);
    }

    /// The phase oracle squares to the identity on any state it can reach.
    #[test]
    fn test_oracle_applied_twice_is_identity((width, mask) in arb_marked_mask()) {
        let register = Register::new(width).expect("valid width");
        let oracle = PhaseOracle::build(&mask_predicate(mask), width).expect("total predicate");
        let diffusion = DiffusionOperator::for_register(register);

        // Move away from the uniform state first so the check is not trivial.
        let mut state = QuantumState::uniform(register);
        oracle.apply(&mut state).expect("widths match");
        diffusion.apply(&mut state).expect("widths match");
        let before = state.clone();

        oracle.apply(&mut state).expect("widths match");
        oracle.apply(&mut state).expect("widths match");
        for (a, b) in state.vector().iter().zip(before.vector()) {
            prop_assert!((a - b).norm() < 1e-12);
        }
    }

    /// The oracle marks exactly the bitstrings the predicate marks.
    #[test]
    fn test_oracle_marks_exactly_the_predicate((width, mask) in arb_marked_mask()) {
        let oracle = PhaseOracle::build(&mask_predicate(mask), width).expect("total predicate");
        prop_assert_eq!(oracle.marked_count(), mask.count_ones() as usize);
        for (k, sign) in oracle.diagonal().iter().enumerate() {
            let marked = (mask >> k) & 1 == 1;
            prop_assert_eq!(*sign, if marked { -1.0 } else { 1.0 });
        }
    }

    /// Count distributions always hold exactly the requested number of shots.
    #[test]
    fn test_counts_total_equals_shots((width, mask) in arb_marked_mask(), shots in 1_u32..=2000, seed in any::<u64>()) {
        let mut sim = Simulator::with_seed(seed);
        let pass = AmplificationEngine::new()
            .run_pass(&mut sim, &mask_predicate(mask), width, shots)
            .expect("pass succeeds");
        prop_assert_eq!(pass.counts().total(), u64::from(shots));
        prop_assert_eq!(pass.shots(), shots);
    }

    /// Same seed, same counts.
    #[test]
    fn test_sampling_is_reproducible((width, mask) in arb_marked_mask(), seed in any::<u64>()) {
        let run = |seed| {
            let mut sim = Simulator::with_seed(seed);
            AmplificationEngine::new()
                .run_pass(&mut sim, &mask_predicate(mask), width, 256)
                .expect("pass succeeds")
        };
        prop_assert_eq!(run(seed), run(seed));
    }

    /// Evaluating a predicate twice gives the same answer.
    #[test]
    fn test_predicates_are_pure(width in 1_usize..=10, index in any::<usize>(), prefix_len in 1_usize..=10) {
        let bits = Bitstring::from_index(index % (1 << width), width).expect("index in range");
        let sorted = Sorted::new(Order::Descending);
        prop_assert_eq!(sorted.evaluate(&bits), sorted.evaluate(&bits));

        if let Some(prefix) = bits.prefix(prefix_len.min(width)) {
            let prefix_match = PrefixMatch::new(prefix);
            let first = prefix_match.evaluate(&bits);
            prop_assert_eq!(first, prefix_match.evaluate(&bits));
            prop_assert!(first.is_some_and(|m| m.is_marked()));
        }
    }

    /// The full bubble network always produces a sorted bitstring with the
    /// same number of ones.
    #[test]
    fn test_sorting_network_sorts(width in 1_usize..=8, index in any::<usize>(), descending in any::<bool>()) {
        let order = if descending { Order::Descending } else { Order::Ascending };
        let input = Bitstring::from_index(index % (1 << width), width).expect("index in range");
        let network = SortingNetwork::bubble(width, order);
        let output = network.apply(&input).expect("widths match");
        prop_assert_eq!(output.count_ones(), input.count_ones());
        prop_assert!(Sorted::new(order).evaluate(&output).is_some_and(|m| m.is_marked()));
    }

    /// With a single marked state on at least two qubits the optimum is
    /// well above chance.
    #[test]
    fn test_single_marked_success_probability(width in 2_usize..=12) {
        let k = optimal_iterations(width, 1).expect("valid input");
        let p = success_probability(width, 1, k).expect("valid input");
        prop_assert!(p > 0.9, "width {} k {} p {}", width, k, p);
    }
}
