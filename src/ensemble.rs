//! Ensemble selector
//!
//! Ranks independently produced candidates and decides whether any of them
//! beats the original. Attribute-zeroing priority comes first: a candidate
//! with zero residual matches beats one with any, regardless of composite
//! score. A change is accepted only when it demonstrably helped on the
//! attribute dimension — if the original has the same or fewer residual
//! matches than every candidate, the decision is the original.

use crate::lexicon::Matcher;
use crate::metrics::MetricAdapter;
use crate::models::{Candidate, Decision};
use crate::pipeline::CallCounters;
use crate::scoring::{composite, CompositeWeights};
use std::cmp::Ordering;
use tracing::warn;

/// A candidate with its ranking key attached.
struct Ranked<'a> {
    candidate: &'a Candidate,
    matches: usize,
    /// `None` when scoring failed; unscoreable candidates rank after all
    /// scoreable candidates of the same match cardinality.
    score: Option<f64>,
    /// Input position, for a stable final tie-break.
    position: usize,
}

/// Pick the best candidate, or the original when no candidate reduced
/// attribute presence. Pure with respect to its inputs: re-running over the
/// same candidate set always yields the same decision.
pub fn select(
    original: &str,
    candidates: &[Candidate],
    matcher: &Matcher,
    metrics: Option<&MetricAdapter>,
    weights: &CompositeWeights,
    counters: &CallCounters,
) -> Decision {
    if candidates.is_empty() {
        return Decision::unchanged(original);
    }

    let mut ranked: Vec<Ranked<'_>> = candidates
        .iter()
        .enumerate()
        .map(|(position, candidate)| {
            let matches = matcher.detect(&candidate.text).len();
            let score = metrics.and_then(|adapter| {
                counters.record_scorer_call();
                match adapter.measure(original, &candidate.text) {
                    Ok(m) => Some(composite(&m, weights)),
                    Err(e) => {
                        warn!(
                            generator = %candidate.generator,
                            error = %e,
                            "candidate scoring failed, ranking it last within its tier"
                        );
                        None
                    }
                }
            });
            Ranked {
                candidate,
                matches,
                score,
                position,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.matches
            .cmp(&b.matches)
            .then_with(|| compare_scores(b.score, a.score))
            .then_with(|| a.position.cmp(&b.position))
    });

    let original_matches = matcher.detect(original).len();
    let best = &ranked[0];

    // No candidate actually reduced attribute presence: keep the original.
    if ranked.iter().all(|r| original_matches <= r.matches) {
        return Decision::unchanged(original);
    }

    Decision {
        text: best.candidate.text.clone(),
        source: best.candidate.generator.clone(),
    }
}

/// Descending by score when called as `compare_scores(b, a)`; `None` sorts
/// after any present score.
fn compare_scores(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}
