//! Core data models for Detoxa
//!
//! These models are used throughout the codebase for representing
//! samples, candidate rewrites, metrics, and final decisions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identifier of one lexical-root pattern in the catalog.
///
/// All morphological variants of one offending root collapse to a single id,
/// so downstream consumers can count distinct roots instead of raw hits.
pub type MatchId = String;

/// Set of pattern hits found in one text snapshot.
///
/// Always derived from exactly one fixed text; recomputed on demand,
/// never incrementally updated.
pub type MatchSet = BTreeSet<MatchId>;

/// Label used for a decision that keeps the original text.
pub const SOURCE_UNCHANGED: &str = "unchanged";

/// One input row: an original text and the rewrites produced for it.
///
/// `original` is immutable once set; only the candidate list grows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    pub id: String,
    pub original: String,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl Sample {
    pub fn new(id: impl Into<String>, original: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            original: original.into(),
            candidates: Vec::new(),
        }
    }
}

/// The text produced by one generation attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub text: String,
    /// Label of the generator that produced this text.
    pub generator: String,
    /// 0 for the first pass, 1 for the refinement pass.
    pub pass_index: u8,
}

/// The three quality dimensions for one (original, candidate) pair.
///
/// All three are always computed from the same pair and are never mixed
/// across pairs. Each value lies in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricTriple {
    /// Semantic similarity between original and candidate.
    pub similarity: f64,
    /// One minus the toxicity probability of the candidate alone.
    pub attribute: f64,
    /// Heuristic grammaticality / completeness score.
    pub fluency: f64,
}

/// Why the validation gate reverted a candidate to the original.
///
/// A reversion is an expected, named outcome — not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevertReason {
    /// Candidate was blank or whitespace-only.
    Empty,
    /// Length ratio fell outside the configured acceptance window.
    LengthRatio,
    /// Relative length change exceeded the configured maximum.
    RelativeChange,
    /// Candidate ends in a bare preposition/conjunction.
    Truncation,
}

impl std::fmt::Display for RevertReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RevertReason::Empty => write!(f, "empty"),
            RevertReason::LengthRatio => write!(f, "length-ratio"),
            RevertReason::RelativeChange => write!(f, "relative-change"),
            RevertReason::Truncation => write!(f, "truncation"),
        }
    }
}

/// Final output for one sample.
///
/// Either a candidate's text tagged with its generator label, or the
/// original text tagged `"unchanged"`. Exactly one decision exists per
/// sample at any time; it is recomputed, never patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub text: String,
    pub source: String,
}

impl Decision {
    pub fn unchanged(original: &str) -> Self {
        Self {
            text: original.to_string(),
            source: SOURCE_UNCHANGED.to_string(),
        }
    }

    pub fn is_unchanged(&self) -> bool {
        self.source == SOURCE_UNCHANGED
    }
}

/// Run-level accounting for a batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    /// Samples with no lexicon hits in the original — no generator ran.
    pub clean_inputs: usize,
    pub rewritten: usize,
    pub unchanged: usize,
    /// Gate reversions observed across all passes.
    pub reverted: usize,
    /// Samples excluded due to malformed input.
    pub failed: usize,
    pub generator_calls: u64,
    pub scorer_calls: u64,
    pub retries: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_unchanged() {
        let d = Decision::unchanged("текст");
        assert!(d.is_unchanged());
        assert_eq!(d.text, "текст");
        assert_eq!(d.source, SOURCE_UNCHANGED);
    }

    #[test]
    fn test_sample_candidates_append_only() {
        let mut s = Sample::new("1", "original");
        s.candidates.push(Candidate {
            text: "rewrite".to_string(),
            generator: "llm".to_string(),
            pass_index: 0,
        });
        assert_eq!(s.original, "original");
        assert_eq!(s.candidates.len(), 1);
    }

    #[test]
    fn test_revert_reason_display() {
        assert_eq!(RevertReason::LengthRatio.to_string(), "length-ratio");
        assert_eq!(RevertReason::Truncation.to_string(), "truncation");
    }
}
