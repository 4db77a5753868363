// src/simulation/results.rs
use crate::core::{Bitstring, Register, SearchError, SearchResult};
use crate::predicate::Predicate;
use std::collections::HashMap;
use std::fmt;

/// Observation counts per bitstring from one measurement run.
///
/// Only observed bitstrings are stored. The sum over all entries is the
/// number of shots taken; the distribution is immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountDistribution {
    register: Register,
    counts: HashMap<Bitstring, u64>,
    total: u64,
}

impl CountDistribution {
    /// Builds a distribution from raw counts, e.g. from a remote backend.
    ///
    /// # Errors
    /// * `SearchError::Configuration` if any bitstring has the wrong width.
    pub fn new(register: Register, counts: HashMap<Bitstring, u64>) -> SearchResult<Self> {
        if let Some(bad) = counts.keys().find(|b| b.width() != register.width()) {
            return Err(SearchError::configuration(format!(
                "count entry {} does not match register width {}",
                bad,
                register.width()
            )));
        }
        let counts: HashMap<Bitstring, u64> = counts.into_iter().filter(|(_, c)| *c > 0).collect();
        let total = counts.values().sum();
        Ok(Self { register, counts, total })
    }

    /// Builds a distribution from a dense per-index histogram. (Internal visibility)
    pub(crate) fn from_histogram(register: Register, histogram: &[u64]) -> Self {
        let width = register.width();
        let counts: HashMap<Bitstring, u64> = Bitstring::all(width)
            .zip(histogram.iter().copied())
            .filter(|(_, c)| *c > 0)
            .collect();
        let total = counts.values().sum();
        Self { register, counts, total }
    }

    pub fn register(&self) -> Register {
        self.register
    }

    /// Sum of all counts; equals the shots taken.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Times `bits` was observed (0 if never).
    pub fn count(&self, bits: &Bitstring) -> u64 {
        self.counts.get(bits).copied().unwrap_or(0)
    }

    /// Normalized observation frequency of `bits`.
    pub fn fraction(&self, bits: &Bitstring) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(bits) as f64 / self.total as f64
    }

    /// Number of distinct bitstrings observed.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Observed bitstrings by descending count; equal counts by ascending basis index.
    pub fn ranked(&self) -> Vec<(Bitstring, u64)> {
        let mut entries: Vec<(Bitstring, u64)> = self.counts.iter().map(|(b, c)| (*b, *c)).collect();
        entries.sort_by(|(ba, ca), (bb, cb)| cb.cmp(ca).then(ba.cmp(bb)));
        entries
    }

    /// The most frequently observed bitstring, if anything was observed.
    pub fn dominant(&self) -> Option<(Bitstring, u64)> {
        self.ranked().into_iter().next()
    }

    /// Iterates over the raw (bitstring, count) entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&Bitstring, &u64)> {
        self.counts.iter()
    }
}

impl fmt::Display for CountDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (bits, count)) in self.ranked().iter().enumerate() {
            write!(f, "{}'{}': {}", if i > 0 { ", " } else { "" }, bits, count)?;
        }
        write!(f, "}}")
    }
}

/// The outcome of one amplification pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PassResult {
    counts: CountDistribution,
    iterations: usize,
    shots: u32,
    marked_count: usize,
    predicate: String,
}

impl PassResult {
    pub(crate) fn new(
        counts: CountDistribution,
        iterations: usize,
        shots: u32,
        marked_count: usize,
        predicate: String,
    ) -> Self {
        Self {
            counts,
            iterations,
            shots,
            marked_count,
            predicate,
        }
    }

    pub fn counts(&self) -> &CountDistribution {
        &self.counts
    }

    /// Oracle + diffusion iterations applied (k).
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn shots(&self) -> u32 {
        self.shots
    }

    /// Marked bitstrings under this pass's predicate (M).
    pub fn marked_count(&self) -> usize {
        self.marked_count
    }

    /// Label of the predicate this pass amplified.
    pub fn predicate(&self) -> &str {
        &self.predicate
    }

    /// Dominant outcome and its normalized count fraction.
    pub fn dominant(&self) -> Option<(Bitstring, f64)> {
        self.counts
            .dominant()
            .map(|(b, _)| (b, self.counts.fraction(&b)))
    }

    /// Most frequent outcome that `predicate` marks, with its count fraction.
    /// Outcomes the predicate rejects or cannot judge are skipped.
    pub fn dominant_marked(&self, predicate: &dyn Predicate) -> Option<(Bitstring, f64)> {
        self.counts
            .ranked()
            .into_iter()
            .find(|(b, _)| predicate.evaluate(b).is_some_and(|m| m.is_marked()))
            .map(|(b, _)| (b, self.counts.fraction(&b)))
    }
}

impl fmt::Display for PassResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pass Result:")?;
        writeln!(f, "  Predicate: {} (M = {})", self.predicate, self.marked_count)?;
        writeln!(f, "  Iterations: {}, Shots: {}", self.iterations, self.shots)?;
        writeln!(f, "  Counts: {}", self.counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(s: &str) -> Bitstring {
        s.parse().expect("valid bitstring literal")
    }

    #[test]
    fn test_histogram_totals_and_fractions() -> SearchResult<()> {
        let dist = CountDistribution::from_histogram(Register::new(2)?, &[10, 0, 30, 60]);
        assert_eq!(dist.total(), 100);
        assert_eq!(dist.len(), 3);
        assert_eq!(dist.count(&bits("01")), 0);
        assert!((dist.fraction(&bits("11")) - 0.6).abs() < 1e-12);
        assert_eq!(dist.dominant(), Some((bits("11"), 60)));
        Ok(())
    }

    #[test]
    fn test_ranked_breaks_ties_by_index() -> SearchResult<()> {
        let dist = CountDistribution::from_histogram(Register::new(2)?, &[5, 7, 7, 1]);
        let order: Vec<String> = dist.ranked().iter().map(|(b, _)| b.to_string()).collect();
        assert_eq!(order, vec!["01", "10", "00", "11"]);
        Ok(())
    }

    #[test]
    fn test_new_rejects_wrong_width() -> SearchResult<()> {
        let mut counts = HashMap::new();
        counts.insert(bits("101"), 3);
        let err = CountDistribution::new(Register::new(2)?, counts).unwrap_err();
        assert!(matches!(err, SearchError::Configuration { .. }));
        Ok(())
    }

    #[test]
    fn test_dominant_marked_skips_unmarked_outcomes() -> SearchResult<()> {
        use crate::predicate::{Order, Sorted};
        let dist = CountDistribution::from_histogram(Register::new(3)?, &[2, 1, 40, 9, 0, 0, 0, 5]);
        let pass = PassResult::new(dist, 1, 57, 4, "sorted".to_string());
        assert_eq!(pass.dominant().map(|(b, _)| b), Some(bits("010")));
        let (best, fraction) = pass
            .dominant_marked(&Sorted::new(Order::Ascending))
            .expect("a sorted outcome was observed");
        assert_eq!(best, bits("011"));
        assert!((fraction - 9.0 / 57.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_dominant_marked_none_when_nothing_marked_observed() -> SearchResult<()> {
        use crate::predicate::{Order, Sorted};
        let dist = CountDistribution::from_histogram(Register::new(3)?, &[0, 0, 12, 0, 3, 7, 0, 0]);
        let pass = PassResult::new(dist, 1, 22, 4, "sorted".to_string());
        assert!(pass.dominant_marked(&Sorted::new(Order::Ascending)).is_none());
        Ok(())
    }
}
