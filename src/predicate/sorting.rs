// src/predicate/sorting.rs

//! Sortedness predicates and the compare-and-swap network they rely on.

use super::{Mark, Predicate};
use crate::core::{Bitstring, SearchError, SearchResult};
use std::fmt;

/// Direction a bitstring is considered sorted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Order {
    /// All zeros before all ones (`0011`).
    #[default]
    Ascending,
    /// All ones before all zeros (`1100`).
    Descending,
}

impl Order {
    /// Whether bit `a` followed by bit `b` respects this order.
    fn in_order(self, a: bool, b: bool) -> bool {
        match self {
            Order::Ascending => !a || b,
            Order::Descending => a || !b,
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Order::Ascending => write!(f, "ascending"),
            Order::Descending => write!(f, "descending"),
        }
    }
}

/// A fixed schedule of compare-and-swap comparators over bit positions.
///
/// Each comparator `(i, j)` with `i < j` exchanges the two bits when they are
/// out of order. One comparator is one pass of the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortingNetwork {
    width: usize,
    order: Order,
    comparators: Vec<(usize, usize)>,
}

impl SortingNetwork {
    /// The full bubble schedule for `width` bits: `(0,1), (1,2), …` shrinking by
    /// one comparator per sweep. For 3 bits this is `(0,1), (1,2), (0,1)`.
    pub fn bubble(width: usize, order: Order) -> Self {
        let mut comparators = Vec::new();
        for sweep in 0..width.saturating_sub(1) {
            for i in 0..width - 1 - sweep {
                comparators.push((i, i + 1));
            }
        }
        Self { width, order, comparators }
    }

    /// The first `passes` comparators of the bubble schedule.
    pub fn with_passes(width: usize, order: Order, passes: usize) -> Self {
        let mut network = Self::bubble(width, order);
        network.comparators.truncate(passes);
        network
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn order(&self) -> Order {
        self.order
    }

    /// Number of comparator passes.
    pub fn passes(&self) -> usize {
        self.comparators.len()
    }

    pub fn comparators(&self) -> &[(usize, usize)] {
        &self.comparators
    }

    /// Runs `input` through every comparator. Returns `None` on a width mismatch.
    pub fn apply(&self, input: &Bitstring) -> Option<Bitstring> {
        if input.width() != self.width {
            return None;
        }
        let mut bits = *input;
        for &(i, j) in &self.comparators {
            let (a, b) = (bits.bit(i)?, bits.bit(j)?);
            if !self.order.in_order(a, b) {
                bits = bits.swapped(i, j);
            }
        }
        Some(bits)
    }
}

/// `true` when every adjacent pair of bits respects `order`.
pub(crate) fn is_sorted(bits: &Bitstring, order: Order) -> bool {
    let raw = bits.bits();
    raw.windows(2).all(|w| order.in_order(w[0] == 1, w[1] == 1))
}

/// Marks every bitstring already in sorted order (an ordering check).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sorted {
    order: Order,
}

impl Sorted {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

impl Predicate for Sorted {
    fn evaluate(&self, bits: &Bitstring) -> Option<Mark> {
        Some(Mark::from(is_sorted(bits, self.order)))
    }

    fn label(&self) -> String {
        format!("sorted {}", self.order)
    }
}

/// Marks the sorted permutation of a fixed input.
///
/// Amplifying this predicate "sorts" the input: the dominant measurement is
/// the input with its ones moved to the end (ascending) or front (descending).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedPermutationOf {
    input: Bitstring,
    target: Bitstring,
}

impl SortedPermutationOf {
    /// Marks the fully sorted form of `input`, the output of the complete
    /// bubble network.
    pub fn new(input: Bitstring, order: Order) -> Self {
        let target = input.gathered(order == Order::Descending);
        Self { input, target }
    }

    /// Marks whatever `network` turns `input` into; a truncated network may
    /// leave the target unsorted.
    ///
    /// # Errors
    /// * `SearchError::Configuration` if the network and input widths differ.
    pub fn with_network(input: Bitstring, network: &SortingNetwork) -> SearchResult<Self> {
        let target = network.apply(&input).ok_or_else(|| {
            SearchError::configuration(format!(
                "{}-bit sorting network cannot sort {}-bit input {}",
                network.width(),
                input.width(),
                input
            ))
        })?;
        Ok(Self { input, target })
    }

    /// The unsorted bitstring this predicate was built from.
    pub fn input(&self) -> Bitstring {
        self.input
    }

    /// The bitstring this predicate marks.
    pub fn target(&self) -> Bitstring {
        self.target
    }
}

impl Predicate for SortedPermutationOf {
    fn evaluate(&self, bits: &Bitstring) -> Option<Mark> {
        if bits.width() != self.input.width() {
            return None;
        }
        Some(Mark::from(*bits == self.target))
    }

    fn label(&self) -> String {
        format!("sorted permutation of {}", self.input)
    }
}
