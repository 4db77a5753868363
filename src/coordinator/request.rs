// src/coordinator/request.rs

use super::narrowing::{NarrowingPolicy, NoNarrowing};
use crate::amplification::IterationPolicy;
use crate::core::{DEFAULT_PASSES, DEFAULT_SHOTS, MAX_PASSES, Register, SearchError, SearchResult};
use crate::predicate::{MarkedSet, Predicate, SharedPredicate};
use std::fmt;
use std::sync::Arc;

/// Number of sequential passes in a run: 1, 2 or 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PassCount(usize);

impl PassCount {
    pub const SINGLE: PassCount = PassCount(1);
    pub const TWO: PassCount = PassCount(2);
    pub const THREE: PassCount = PassCount(3);

    /// # Errors
    /// * `SearchError::InvalidPassCount` outside `1..=3`.
    pub fn new(passes: usize) -> SearchResult<Self> {
        if passes == 0 || passes > MAX_PASSES {
            return Err(SearchError::InvalidPassCount { passes });
        }
        Ok(Self(passes))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for PassCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How per-pass count fractions are weighted when merged.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MergeWeights {
    /// Every pass contributes `1 / passes`.
    #[default]
    Equal,
    /// One non-negative weight per pass, normalized to sum to 1.
    Custom(Vec<f64>),
}

impl MergeWeights {
    /// Resolves to one normalized weight per pass.
    ///
    /// # Errors
    /// * `SearchError::Configuration` on a length mismatch, a negative or
    ///   non-finite weight, or weights summing to zero.
    pub fn normalized(&self, passes: PassCount) -> SearchResult<Vec<f64>> {
        let n = passes.get();
        match self {
            MergeWeights::Equal => Ok(vec![1.0 / n as f64; n]),
            MergeWeights::Custom(weights) => {
                if weights.len() != n {
                    return Err(SearchError::configuration(format!(
                        "{} merge weights given for {} passes",
                        weights.len(),
                        n
                    )));
                }
                if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
                    return Err(SearchError::configuration(format!("invalid merge weight {}", w)));
                }
                let sum: f64 = weights.iter().sum();
                if sum <= 0.0 {
                    return Err(SearchError::configuration("merge weights sum to zero"));
                }
                Ok(weights.iter().map(|w| w / sum).collect())
            }
        }
    }
}

/// A validated request for a multi-pass amplification run.
///
/// Build one with [`RunRequest::builder`]; every parameter is checked in
/// `build` so no quantum work starts on an invalid request.
#[derive(Clone)]
pub struct RunRequest {
    register: Register,
    predicate: SharedPredicate,
    shots: u32,
    passes: PassCount,
    narrowing: Arc<dyn NarrowingPolicy>,
    weights: Vec<f64>,
    iterations: IterationPolicy,
}

impl RunRequest {
    /// Starts a request for `width` qubits marked by `predicate`.
    pub fn builder<P>(width: usize, predicate: P) -> RunRequestBuilder
    where
        P: Predicate + 'static,
    {
        RunRequestBuilder::new(width, Arc::new(predicate))
    }

    /// Starts a request from an already shared predicate.
    pub fn builder_shared(width: usize, predicate: SharedPredicate) -> RunRequestBuilder {
        RunRequestBuilder::new(width, predicate)
    }

    pub fn register(&self) -> Register {
        self.register
    }

    pub fn predicate(&self) -> &SharedPredicate {
        &self.predicate
    }

    pub fn shots(&self) -> u32 {
        self.shots
    }

    pub fn passes(&self) -> PassCount {
        self.passes
    }

    pub fn narrowing(&self) -> &dyn NarrowingPolicy {
        self.narrowing.as_ref()
    }

    /// Normalized merge weight of each pass.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn iterations(&self) -> IterationPolicy {
        self.iterations
    }
}

impl fmt::Debug for RunRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunRequest")
            .field("register", &self.register)
            .field("predicate", &self.predicate.label())
            .field("shots", &self.shots)
            .field("passes", &self.passes)
            .field("narrowing", &self.narrowing.label())
            .field("weights", &self.weights)
            .field("iterations", &self.iterations)
            .finish()
    }
}

/// Collects run parameters; defaults are 1024 shots, one pass, no
/// narrowing, equal weights and the optimal iteration count.
pub struct RunRequestBuilder {
    width: usize,
    predicate: SharedPredicate,
    shots: u32,
    passes: usize,
    narrowing: Arc<dyn NarrowingPolicy>,
    weights: MergeWeights,
    iterations: IterationPolicy,
}

impl RunRequestBuilder {
    fn new(width: usize, predicate: SharedPredicate) -> Self {
        Self {
            width,
            predicate,
            shots: DEFAULT_SHOTS,
            passes: DEFAULT_PASSES,
            narrowing: Arc::new(NoNarrowing),
            weights: MergeWeights::Equal,
            iterations: IterationPolicy::Optimal,
        }
    }

    /// Measurement shots per pass; must be positive.
    pub fn shots(mut self, shots: u32) -> Self {
        self.shots = shots;
        self
    }

    /// Number of sequential passes, 1 to 3.
    pub fn passes(mut self, passes: usize) -> Self {
        self.passes = passes;
        self
    }

    /// Policy deriving each later pass's predicate. Defaults to [`NoNarrowing`].
    pub fn narrowing<N>(mut self, policy: N) -> Self
    where
        N: NarrowingPolicy + 'static,
    {
        self.narrowing = Arc::new(policy);
        self
    }

    /// Per-pass merge weights. Defaults to equal weights.
    pub fn weights(mut self, weights: MergeWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Overrides the optimal Grover iteration count for every pass.
    pub fn iterations(mut self, iterations: IterationPolicy) -> Self {
        self.iterations = iterations;
        self
    }

    /// Validates every parameter and produces the request.
    ///
    /// # Errors
    /// * `SearchError::Configuration` for an invalid width, invalid merge
    ///   weights, or a predicate that is not total over the register.
    /// * `SearchError::InvalidShotCount` if shots is zero.
    /// * `SearchError::InvalidPassCount` outside `1..=3`.
    pub fn build(self) -> SearchResult<RunRequest> {
        let register = Register::new(self.width)?;
        if self.shots == 0 {
            return Err(SearchError::InvalidShotCount { shots: self.shots });
        }
        let passes = PassCount::new(self.passes)?;
        let weights = self.weights.normalized(passes)?;
        // Totality is a setup-time property; the marked set itself is rebuilt per pass.
        MarkedSet::enumerate(self.predicate.as_ref(), register)?;
        Ok(RunRequest {
            register,
            predicate: self.predicate,
            shots: self.shots,
            passes,
            narrowing: self.narrowing,
            weights,
            iterations: self.iterations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Bitstring;
    use crate::predicate::{ExactMatch, FnPredicate, Mark, Order, Sorted};

    #[test]
    fn test_defaults() -> SearchResult<()> {
        let request = RunRequest::builder(3, Sorted::new(Order::Ascending)).build()?;
        assert_eq!(request.shots(), 1024);
        assert_eq!(request.passes(), PassCount::SINGLE);
        assert_eq!(request.weights(), &[1.0]);
        assert_eq!(request.iterations(), IterationPolicy::Optimal);
        assert_eq!(request.narrowing().label(), "none");
        Ok(())
    }

    #[test]
    fn test_invalid_parameters() {
        let p = || Sorted::new(Order::Ascending);
        assert!(matches!(
            RunRequest::builder(0, p()).build(),
            Err(SearchError::Configuration { .. })
        ));
        assert_eq!(
            RunRequest::builder(3, p()).shots(0).build().unwrap_err(),
            SearchError::InvalidShotCount { shots: 0 }
        );
        assert_eq!(
            RunRequest::builder(3, p()).passes(4).build().unwrap_err(),
            SearchError::InvalidPassCount { passes: 4 }
        );
        assert_eq!(
            RunRequest::builder(3, p()).passes(0).build().unwrap_err(),
            SearchError::InvalidPassCount { passes: 0 }
        );
    }

    #[test]
    fn test_non_total_predicate_rejected_at_setup() {
        let partial = FnPredicate::partial("leading one only", |b: &Bitstring| {
            b.bit(0).filter(|bit| *bit).map(|_| Mark::Marked)
        });
        assert!(matches!(
            RunRequest::builder(3, partial).build(),
            Err(SearchError::Configuration { .. })
        ));
        let wrong_width = ExactMatch::new("10".parse().expect("valid literal"));
        assert!(matches!(
            RunRequest::builder(3, wrong_width).build(),
            Err(SearchError::Configuration { .. })
        ));
    }

    #[test]
    fn test_custom_weights_normalized() -> SearchResult<()> {
        let request = RunRequest::builder(3, Sorted::default())
            .passes(2)
            .weights(MergeWeights::Custom(vec![1.0, 3.0]))
            .build()?;
        assert_eq!(request.weights(), &[0.25, 0.75]);
        Ok(())
    }

    #[test]
    fn test_bad_custom_weights() {
        let bad = [vec![1.0], vec![-1.0, 2.0], vec![0.0, 0.0], vec![f64::NAN, 1.0]];
        for weights in bad {
            let result = RunRequest::builder(3, Sorted::default())
                .passes(2)
                .weights(MergeWeights::Custom(weights))
                .build();
            assert!(matches!(result, Err(SearchError::Configuration { .. })));
        }
    }
}
