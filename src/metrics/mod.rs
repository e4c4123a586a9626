//! Metric adapter: similarity, attribute, and fluency for one text pair
//!
//! Wraps the external embedder and toxicity classifier behind one
//! `measure(original, candidate)` call. Inputs are whitespace-normalized and
//! truncated to a fixed character budget before any remote call. A failed
//! collaborator call fails the whole measurement; substituting a default
//! score would break the composite's monotonicity guarantee.

pub mod remote;

pub use remote::RemoteScorer;

use crate::models::MetricTriple;
use crate::textutil;
use thiserror::Error;

/// Character budget applied to both texts before scoring calls.
/// Keeps inputs under collaborator-side sequence limits.
pub const MAX_SCORING_CHARS: usize = 2000;

/// Fixed-dimension semantic embedding provider.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, MetricError>;
}

/// External attribute classifier; returns the probability in [0,1] that the
/// text still carries the undesired attribute.
pub trait AttributeClassifier: Send + Sync {
    fn toxicity(&self, text: &str) -> Result<f64, MetricError>;
}

#[derive(Debug, Error)]
pub enum MetricError {
    #[error("embedding call failed: {0}")]
    Embedding(String),
    #[error("classifier call failed: {0}")]
    Classifier(String),
    #[error("embedding dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
}

/// Computes a [`MetricTriple`] for one (original, candidate) pair.
pub struct MetricAdapter {
    embedder: Box<dyn Embedder>,
    classifier: Box<dyn AttributeClassifier>,
}

impl MetricAdapter {
    pub fn new(embedder: Box<dyn Embedder>, classifier: Box<dyn AttributeClassifier>) -> Self {
        Self {
            embedder,
            classifier,
        }
    }

    /// Score one pair. All three metrics come from this single pair.
    pub fn measure(&self, original: &str, candidate: &str) -> Result<MetricTriple, MetricError> {
        let original_norm = textutil::normalize_whitespace(original);
        let candidate_norm = textutil::normalize_whitespace(candidate);
        let original_in = textutil::truncate_chars(&original_norm, MAX_SCORING_CHARS);
        let candidate_in = textutil::truncate_chars(&candidate_norm, MAX_SCORING_CHARS);

        let similarity = if candidate_in.is_empty() || original_in.is_empty() {
            0.0
        } else {
            let a = self.embedder.embed(original_in)?;
            let b = self.embedder.embed(candidate_in)?;
            cosine_clipped(&a, &b)?
        };

        // The classifier sees the candidate alone, never the original.
        let attribute = if candidate_in.is_empty() {
            0.0
        } else {
            1.0 - self.classifier.toxicity(candidate_in)?.clamp(0.0, 1.0)
        };

        Ok(MetricTriple {
            similarity,
            attribute,
            fluency: fluency(original, candidate),
        })
    }
}

/// Cosine similarity clipped to [0, 1].
///
/// Embedding cosine can dip slightly negative for unrelated texts; clip
/// rather than let negative values reach the composite.
pub fn cosine_clipped(a: &[f32], b: &[f32]) -> Result<f64, MetricError> {
    if a.len() != b.len() {
        return Err(MetricError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        dot += f64::from(x) * f64::from(y);
        norm_a += f64::from(x) * f64::from(x);
        norm_b += f64::from(y) * f64::from(y);
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok((dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0))
}

/// Heuristic fluency score in [0, 1].
///
/// Starts at 1.0; penalties multiply, so compounding failures drive the
/// score toward zero without ever going negative:
/// - candidate shrank below 50% of the original: x0.7 (below 70%: x0.85)
/// - trailing closed-class function word (truncation): x0.6
/// - unbalanced parentheses: x0.9
/// - odd straight-quote count: x0.9
pub fn fluency(original: &str, candidate: &str) -> f64 {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return 0.0;
    }

    let mut score = 1.0;

    let orig_len = original.chars().count();
    if orig_len > 0 {
        let ratio = candidate.chars().count() as f64 / orig_len as f64;
        if ratio < 0.5 {
            score *= 0.7;
        } else if ratio < 0.7 {
            score *= 0.85;
        }
    }

    if textutil::ends_with_function_word(candidate) {
        score *= 0.6;
    }
    if textutil::unbalanced_parens(candidate) {
        score *= 0.9;
    }
    if textutil::odd_quote_count(candidate) {
        score *= 0.9;
    }

    score
}
