//! Composite acceptance score
//!
//! Combines the three quality dimensions into one [0,1] score. The default
//! is a multiplicative conjunction: a rewrite that fails badly on any single
//! dimension is not rescued by excelling on the others. A weighted-sum
//! variant exists for deployments that want softer trade-offs; both are pure
//! and monotone non-decreasing in each input.

use crate::models::MetricTriple;
use serde::Deserialize;

/// How the three metrics combine.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CompositeWeights {
    /// `attribute * similarity * fluency` — the J-score.
    Balanced,
    /// Normalized weighted sum.
    Weighted {
        attribute: f64,
        similarity: f64,
        fluency: f64,
    },
}

impl Default for CompositeWeights {
    fn default() -> Self {
        CompositeWeights::Balanced
    }
}

impl CompositeWeights {
    /// The ensemble-ranking weights of the reference deployment.
    pub fn reference_weighted() -> Self {
        CompositeWeights::Weighted {
            attribute: 0.45,
            similarity: 0.35,
            fluency: 0.20,
        }
    }
}

/// Combine a metric triple into a single score in [0, 1].
pub fn composite(metrics: &MetricTriple, weights: &CompositeWeights) -> f64 {
    let a = metrics.attribute.clamp(0.0, 1.0);
    let s = metrics.similarity.clamp(0.0, 1.0);
    let f = metrics.fluency.clamp(0.0, 1.0);

    match *weights {
        CompositeWeights::Balanced => a * s * f,
        CompositeWeights::Weighted {
            attribute,
            similarity,
            fluency,
        } => {
            let total = attribute + similarity + fluency;
            if total <= 0.0 {
                return 0.0;
            }
            (a * attribute + s * similarity + f * fluency) / total
        }
    }
}
