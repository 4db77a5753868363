// src/predicate/mod.rs

//! Marking predicates: the criterion that decides which bitstrings the
//! phase oracle flips.
//!
//! Every concrete marking strategy implements the single [`Predicate`]
//! contract. Predicates are pure; a predicate that has no answer for some
//! bitstring returns `None`, and that gap is reported as a configuration
//! fault when the marked set is enumerated, never during amplification.

mod sorting;

pub use sorting::{Order, Sorted, SortedPermutationOf, SortingNetwork};

use crate::core::{Bitstring, Register, SearchError, SearchResult};
use std::fmt;
use std::sync::Arc;

/// Outcome of evaluating a predicate on one bitstring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    /// The bitstring satisfies the predicate; the oracle flips its sign.
    Marked,
    /// The bitstring is left untouched by the oracle.
    Unmarked,
}

impl Mark {
    /// `true` for [`Mark::Marked`].
    pub fn is_marked(self) -> bool {
        matches!(self, Mark::Marked)
    }
}

impl From<bool> for Mark {
    fn from(marked: bool) -> Self {
        if marked { Mark::Marked } else { Mark::Unmarked }
    }
}

/// A pure marking criterion over bitstrings.
///
/// Implementations must be deterministic and side-effect free. Returning
/// `None` means the predicate is undefined for that bitstring, which makes it
/// non-total for any register containing it.
pub trait Predicate: Send + Sync {
    /// Decides whether `bits` is marked.
    fn evaluate(&self, bits: &Bitstring) -> Option<Mark>;

    /// Short human-readable description used in errors and trace events.
    fn label(&self) -> String;
}

/// Predicates are shared between the coordinator, narrowing policies and oracles.
pub type SharedPredicate = Arc<dyn Predicate>;

/// Marks exactly one bitstring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactMatch {
    target: Bitstring,
}

impl ExactMatch {
    /// Predicate marking `target` alone; bitstrings of another width are undefined.
    pub fn new(target: Bitstring) -> Self {
        Self { target }
    }

    /// The single marked bitstring.
    pub fn target(&self) -> Bitstring {
        self.target
    }
}

impl Predicate for ExactMatch {
    fn evaluate(&self, bits: &Bitstring) -> Option<Mark> {
        // Undefined across widths rather than silently unmarked.
        if bits.width() != self.target.width() {
            return None;
        }
        Some(Mark::from(*bits == self.target))
    }

    fn label(&self) -> String {
        format!("equals {}", self.target)
    }
}

/// Marks every bitstring whose leading bits equal a prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixMatch {
    prefix: Bitstring,
}

impl PrefixMatch {
    /// Predicate marking bitstrings that start with `prefix`.
    ///
    /// ```
    /// use qsearch::{Bitstring, Predicate, PrefixMatch};
    ///
    /// let prefix: Bitstring = "10".parse()?;
    /// let p = PrefixMatch::new(prefix);
    /// assert!(p.evaluate(&"101".parse()?).is_some_and(|m| m.is_marked()));
    /// assert!(p.evaluate(&"011".parse()?).is_some_and(|m| !m.is_marked()));
    /// # Ok::<(), qsearch::SearchError>(())
    /// ```
    pub fn new(prefix: Bitstring) -> Self {
        Self { prefix }
    }

    /// The leading bits every marked bitstring carries.
    pub fn prefix(&self) -> Bitstring {
        self.prefix
    }
}

impl Predicate for PrefixMatch {
    fn evaluate(&self, bits: &Bitstring) -> Option<Mark> {
        if self.prefix.width() > bits.width() {
            return None;
        }
        Some(Mark::from(bits.has_prefix(&self.prefix)))
    }

    fn label(&self) -> String {
        format!("starts with {}", self.prefix)
    }
}

type MarkFn = dyn Fn(&Bitstring) -> Option<Mark> + Send + Sync;

/// Wraps an arbitrary pure closure.
pub struct FnPredicate {
    label: String,
    f: Box<MarkFn>,
}

impl FnPredicate {
    /// Wraps a closure that may leave some bitstrings undefined.
    pub fn partial<F>(label: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Bitstring) -> Option<Mark> + Send + Sync + 'static,
    {
        Self { label: label.into(), f: Box::new(f) }
    }

    /// Wraps a total boolean closure.
    pub fn total<G>(label: impl Into<String>, g: G) -> Self
    where
        G: Fn(&Bitstring) -> bool + Send + Sync + 'static,
    {
        Self::partial(label, move |b: &Bitstring| Some(Mark::from(g(b))))
    }
}

impl Predicate for FnPredicate {
    fn evaluate(&self, bits: &Bitstring) -> Option<Mark> {
        (self.f)(bits)
    }

    fn label(&self) -> String {
        self.label.clone()
    }
}

impl fmt::Debug for FnPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPredicate").field("label", &self.label).finish_non_exhaustive()
    }
}

/// Marks a bitstring only when both inner predicates mark it.
///
/// Narrowing policies build these so a later pass can only shrink the marked set.
#[derive(Clone)]
pub struct Conjunction {
    left: SharedPredicate,
    right: SharedPredicate,
}

impl Conjunction {
    /// Marks what both `left` and `right` mark; undefined if either side is.
    pub fn new(left: SharedPredicate, right: SharedPredicate) -> Self {
        Self { left, right }
    }
}

impl Predicate for Conjunction {
    fn evaluate(&self, bits: &Bitstring) -> Option<Mark> {
        let left = self.left.evaluate(bits)?;
        let right = self.right.evaluate(bits)?;
        Some(Mark::from(left.is_marked() && right.is_marked()))
    }

    fn label(&self) -> String {
        format!("({}) and ({})", self.left.label(), self.right.label())
    }
}

impl fmt::Debug for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Conjunction({})", self.label())
    }
}

/// The subset of a register's bitstrings a predicate marks.
///
/// Building one is the setup-time totality check: every one of the 2^N
/// bitstrings is evaluated exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedSet {
    register: Register,
    marked: Vec<bool>,
    count: usize,
    label: String,
}

impl MarkedSet {
    /// Evaluates `predicate` over every bitstring of `register`.
    ///
    /// # Errors
    /// * `SearchError::Configuration` if the predicate is undefined for any bitstring.
    pub fn enumerate(predicate: &dyn Predicate, register: Register) -> SearchResult<Self> {
        let mut marked = Vec::with_capacity(register.dim());
        for bits in register.basis() {
            match predicate.evaluate(&bits) {
                Some(mark) => marked.push(mark.is_marked()),
                None => {
                    return Err(SearchError::configuration(format!(
                        "predicate '{}' is not total: undefined for bitstring {}",
                        predicate.label(),
                        bits
                    )));
                }
            }
        }
        let count = marked.iter().filter(|m| **m).count();
        Ok(Self {
            register,
            marked,
            count,
            label: predicate.label(),
        })
    }

    /// Number of marked bitstrings (M).
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn register(&self) -> Register {
        self.register
    }

    /// Label of the predicate this set was enumerated from.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether basis index `index` is marked; out-of-range indices are unmarked.
    pub fn contains_index(&self, index: usize) -> bool {
        self.marked.get(index).copied().unwrap_or(false)
    }

    pub fn contains(&self, bits: &Bitstring) -> bool {
        bits.width() == self.register.width() && self.contains_index(bits.index())
    }

    /// The marked bitstrings in ascending basis-index order.
    pub fn iter(&self) -> impl Iterator<Item = Bitstring> + '_ {
        let width = self.register.width();
        Bitstring::all(width).filter(move |b| self.marked[b.index()])
    }

    pub(crate) fn flags(&self) -> &[bool] {
        &self.marked
    }
}
