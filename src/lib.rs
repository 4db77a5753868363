// src/lib.rs

//! `qsearch` - Grover amplitude amplification over fixed-width bitstrings
//!
//! A classical [`Predicate`] decides which bitstrings of an N-qubit register
//! are "good". The library turns it into a phase oracle, pairs it with the
//! diffusion operator, runs the optimal number of iterations on a
//! [`Backend`] and samples the result. [`MultiPassCoordinator`] chains up to
//! three such passes, optionally narrowing the predicate between them, and
//! merges their counts into a single [`FinalRanking`].
//!
//! The library emits `tracing` events but never installs a subscriber.

pub mod core;
pub mod predicate;
pub mod operations;
pub mod circuits;
pub mod simulation;
pub mod amplification;
pub mod coordinator;
pub mod validation;

// Re-export the most common types for easier top-level use
pub use core::{Bitstring, ExecutionError, QuantumState, Register, SearchError, SearchResult};
pub use predicate::{
    Conjunction, ExactMatch, FnPredicate, Mark, MarkedSet, Order, Predicate, PrefixMatch, SharedPredicate,
    Sorted, SortedPermutationOf, SortingNetwork,
};
pub use operations::{DiffusionOperator, Operation, PhaseOracle, Unitary};
pub use circuits::{Circuit, CircuitBuilder, InitialState};
pub use simulation::{Backend, CountDistribution, PassResult, Simulator};
pub use amplification::{AmplificationEngine, IterationPolicy, optimal_iterations, success_probability};
pub use coordinator::{
    DominantPrefix, FinalRanking, MergeWeights, MultiPassCoordinator, NarrowingPolicy, NoNarrowing, PassCount,
    RankedOutcome, RunRequest,
};
pub use validation::{ValidationError, check_normalization, check_real_amplitudes, validate_state};

// Example 1: Single-pass search for one bitstring
// Three qubits, one marked state: k = floor(π/4 · sqrt(8)) = 2 iterations
// push the success probability to about 94.5 %.
/// ```
/// use qsearch::{AmplificationEngine, Bitstring, ExactMatch, Simulator, SearchError};
///
/// let target: Bitstring = "101".parse()?;
/// let mut sim = Simulator::with_seed(7);
/// let pass = AmplificationEngine::new().run_pass(&mut sim, &ExactMatch::new(target), 3, 1024)?;
///
/// println!("{}", pass);
/// assert_eq!(pass.iterations(), 2);
/// assert_eq!(pass.counts().total(), 1024);
/// let (dominant, fraction) = pass.dominant().expect("1024 shots were taken");
/// assert_eq!(dominant, target);
/// assert!(fraction > 0.85);
/// # Ok::<(), SearchError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: Two-pass sort search with prefix narrowing
// Pass 1 amplifies every sorted 3-bit string; pass 2 keeps only those sharing
// the first bit of pass 1's dominant outcome.
/// ```
/// use qsearch::{DominantPrefix, MultiPassCoordinator, Order, RunRequest, SearchError, Simulator, Sorted};
///
/// let request = RunRequest::builder(3, Sorted::new(Order::Ascending))
///     .passes(2)
///     .narrowing(DominantPrefix::growing())
///     .shots(512)
///     .build()?;
/// let mut sim = Simulator::with_seed(11);
/// let ranking = MultiPassCoordinator::new().run(&request, &mut sim)?;
///
/// println!("{}", ranking);
/// assert_eq!(ranking.passes().len(), 2);
/// assert!(ranking.passes()[1].marked_count <= ranking.passes()[0].marked_count);
/// let total: f64 = ranking.entries().iter().map(|e| e.confidence).sum();
/// assert!((total - 1.0).abs() < 1e-9);
/// # Ok::<(), SearchError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item
