// src/coordinator/narrowing.rs

use crate::core::SearchResult;
use crate::predicate::{Conjunction, PrefixMatch, SharedPredicate};
use crate::simulation::PassResult;
use std::sync::Arc;
use tracing::debug;

/// Derives the predicate for the next pass from the previous pass's result.
///
/// Policies receive the predicate the previous pass amplified and may only
/// narrow it: the returned predicate should mark a subset of what `current`
/// marks.
pub trait NarrowingPolicy: Send + Sync {
    /// `completed` is the number of passes already run (at least 1).
    fn narrow(
        &self,
        completed: usize,
        previous: &PassResult,
        current: &SharedPredicate,
    ) -> SearchResult<SharedPredicate>;

    fn label(&self) -> String;
}

/// Every pass amplifies the unconstrained predicate; passes act as
/// independent repeated trials.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNarrowing;

impl NarrowingPolicy for NoNarrowing {
    fn narrow(&self, _: usize, _: &PassResult, current: &SharedPredicate) -> SearchResult<SharedPredicate> {
        Ok(Arc::clone(current))
    }

    fn label(&self) -> String {
        "none".to_string()
    }
}

/// Restricts the next pass to bitstrings sharing a prefix with the most
/// frequent outcome of the previous pass that the current predicate marks.
/// Unmarked outcomes never seed a prefix; if no marked outcome was observed
/// the predicate is kept as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DominantPrefix {
    /// After `p` completed passes, pin the first `p` bits.
    Growing,
    /// Always pin the first `len` bits.
    Fixed(usize),
}

impl DominantPrefix {
    pub fn growing() -> Self {
        DominantPrefix::Growing
    }

    pub fn fixed(len: usize) -> Self {
        DominantPrefix::Fixed(len)
    }

    fn prefix_len(&self, completed: usize, width: usize) -> usize {
        match self {
            DominantPrefix::Growing => completed.min(width),
            DominantPrefix::Fixed(len) => (*len).min(width),
        }
    }
}

impl NarrowingPolicy for DominantPrefix {
    fn narrow(
        &self,
        completed: usize,
        previous: &PassResult,
        current: &SharedPredicate,
    ) -> SearchResult<SharedPredicate> {
        let Some((dominant, fraction)) = previous.dominant_marked(current.as_ref()) else {
            debug!(predicate = %current.label(), "no marked outcome observed, keeping predicate");
            return Ok(Arc::clone(current));
        };
        let len = self.prefix_len(completed, dominant.width());
        let Some(prefix) = dominant.prefix(len).filter(|p| p.width() > 0) else {
            return Ok(Arc::clone(current));
        };
        debug!(%dominant, fraction, %prefix, "narrowing to prefix of dominant marked outcome");
        Ok(Arc::new(Conjunction::new(
            Arc::clone(current),
            Arc::new(PrefixMatch::new(prefix)),
        )))
    }

    fn label(&self) -> String {
        match self {
            DominantPrefix::Growing => "dominant prefix (growing)".to_string(),
            DominantPrefix::Fixed(len) => format!("dominant prefix ({} bits)", len),
        }
    }
}
