// src/coordinator/mod.rs

//! Orchestrates one to three sequential amplification passes and merges
//! their count distributions into a single ranking.
//!
//! Pass 1 always amplifies the unconstrained predicate. Each later pass asks
//! the request's [`NarrowingPolicy`] for its predicate, given the previous
//! pass's result. Passes are strictly sequential and a failure in any of them
//! aborts the run: no partial ranking is returned.

mod narrowing;
mod ranking;
mod request;

pub use narrowing::{DominantPrefix, NarrowingPolicy, NoNarrowing};
pub use ranking::{FinalRanking, PassSummary, RankedOutcome};
pub use request::{MergeWeights, PassCount, RunRequest, RunRequestBuilder};

use crate::amplification::AmplificationEngine;
use crate::core::{Bitstring, SearchError, SearchResult};
use crate::predicate::SharedPredicate;
use crate::simulation::{Backend, PassResult};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Runs multi-pass amplification requests against a backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiPassCoordinator;

impl MultiPassCoordinator {
    pub fn new() -> Self {
        Self
    }

    /// Executes every pass of `request` in order and merges the results.
    ///
    /// # Errors
    /// Any error from a pass (see [`AmplificationEngine::run_pass`]) or from
    /// the narrowing policy, returned unchanged.
    #[instrument(skip(self, request, backend), fields(backend = backend.name(), passes = request.passes().get()))]
    pub fn run<B>(&self, request: &RunRequest, backend: &mut B) -> SearchResult<FinalRanking>
    where
        B: Backend + ?Sized,
    {
        let engine = AmplificationEngine::with_iterations(request.iterations());
        let width = request.register().width();
        let mut predicate: SharedPredicate = Arc::clone(request.predicate());
        let mut results: Vec<PassResult> = Vec::with_capacity(request.passes().get());

        for pass in 0..request.passes().get() {
            if let Some(previous) = results.last() {
                predicate = request.narrowing().narrow(pass, previous, &predicate)?;
            }
            debug!(pass = pass + 1, predicate = %predicate.label(), "starting pass");
            let result = engine.run_pass(backend, predicate.as_ref(), width, request.shots())?;
            debug!(
                pass = pass + 1,
                iterations = result.iterations(),
                dominant = ?result.dominant(),
                "pass complete"
            );
            results.push(result);
        }

        merge(&results, request.weights())
    }
}

/// Merges pass results into a ranking.
///
/// Confidence of a bitstring is `Σ weights[p] · fraction_p(b)`. Entries are
/// ordered by descending confidence, then by the earliest pass in which the
/// bitstring was dominant (never-dominant last), then by basis index.
///
/// # Errors
/// * `SearchError::Configuration` unless there is exactly one weight per pass.
pub fn merge(results: &[PassResult], weights: &[f64]) -> SearchResult<FinalRanking> {
    if weights.len() != results.len() {
        return Err(SearchError::configuration(format!(
            "{} merge weights given for {} passes",
            weights.len(),
            results.len()
        )));
    }
    let mut confidence: HashMap<Bitstring, f64> = HashMap::new();
    let mut dominant_in: HashMap<Bitstring, usize> = HashMap::new();
    let mut passes = Vec::with_capacity(results.len());

    for (p, (result, &weight)) in results.iter().zip(weights).enumerate() {
        let counts = result.counts();
        for (bits, _) in counts.iter() {
            *confidence.entry(*bits).or_insert(0.0) += weight * counts.fraction(bits);
        }
        let dominant = result.dominant();
        if let Some((bits, _)) = dominant {
            dominant_in.entry(bits).or_insert(p);
        }
        passes.push(PassSummary {
            predicate: result.predicate().to_string(),
            marked_count: result.marked_count(),
            iterations: result.iterations(),
            shots: result.shots(),
            weight,
            dominant,
        });
    }

    let mut entries: Vec<RankedOutcome> = confidence
        .into_iter()
        .map(|(bitstring, confidence)| RankedOutcome {
            bitstring,
            confidence,
            dominant_in: dominant_in.get(&bitstring).copied(),
        })
        .collect();
    entries.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| earliest_first(a.dominant_in, b.dominant_in))
            .then_with(|| a.bitstring.cmp(&b.bitstring))
    });

    Ok(FinalRanking::new(entries, passes))
}

fn earliest_first(a: Option<usize>, b: Option<usize>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
