// src/coordinator/ranking.rs
use crate::core::Bitstring;
use std::fmt;

/// One bitstring in the final ranking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedOutcome {
    pub bitstring: Bitstring,
    /// Weighted sum of this bitstring's count fraction over all passes.
    pub confidence: f64,
    /// Earliest pass (0-based) in which this bitstring was the dominant outcome.
    pub dominant_in: Option<usize>,
}

/// What survives of a pass once its counts have been merged.
#[derive(Debug, Clone, PartialEq)]
pub struct PassSummary {
    pub predicate: String,
    pub marked_count: usize,
    pub iterations: usize,
    pub shots: u32,
    pub weight: f64,
    /// Dominant outcome and its count fraction in that pass.
    pub dominant: Option<(Bitstring, f64)>,
}

/// Candidate bitstrings ordered by descending aggregate confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalRanking {
    entries: Vec<RankedOutcome>,
    passes: Vec<PassSummary>,
}

impl FinalRanking {
    pub(crate) fn new(entries: Vec<RankedOutcome>, passes: Vec<PassSummary>) -> Self {
        Self { entries, passes }
    }

    /// The highest-confidence outcome.
    pub fn top(&self) -> Option<&RankedOutcome> {
        self.entries.first()
    }

    /// Aggregate confidence of `bits`; 0.0 if it was never observed.
    pub fn confidence(&self, bits: &Bitstring) -> f64 {
        self.entries
            .iter()
            .find(|e| e.bitstring == *bits)
            .map_or(0.0, |e| e.confidence)
    }

    pub fn entries(&self) -> &[RankedOutcome] {
        &self.entries
    }

    /// Per-pass metadata, in execution order.
    pub fn passes(&self) -> &[PassSummary] {
        &self.passes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for FinalRanking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Final Ranking ({} passes):", self.passes.len())?;
        for (i, pass) in self.passes.iter().enumerate() {
            write!(
                f,
                "  pass {}: {} (M = {}, k = {}, shots = {}, weight = {:.3})",
                i + 1,
                pass.predicate,
                pass.marked_count,
                pass.iterations,
                pass.shots,
                pass.weight
            )?;
            match pass.dominant {
                Some((b, frac)) => writeln!(f, " -> {} ({:.2} %)", b, frac * 100.0)?,
                None => writeln!(f)?,
            }
        }
        if self.entries.is_empty() {
            return writeln!(f, "  No outcomes observed.");
        }
        for entry in &self.entries {
            writeln!(f, "  {}: {:.4}", entry.bitstring, entry.confidence)?;
        }
        Ok(())
    }
}
