//! Two-pass refinement loop
//!
//! State machine: `FirstPass` -> (`RefinementPass` | `Done`) -> `Done`.
//! The first pass rewrites the original; if lexicon matches remain and the
//! gated text is long enough to risk a second attempt, a narrower pass runs
//! with the residual matches as the generator hint. The winner is the pass
//! with the fewest residual matches; ties break on composite score, then on
//! the first pass (fewer generation calls, less downstream surprise).
//!
//! Generator failures never escape this module: a failed pass degrades to
//! "no improvement", i.e. the original text with an empty delta.

use crate::gate::{self, GateConfig};
use crate::generators::Generator;
use crate::lexicon::Matcher;
use crate::metrics::MetricAdapter;
use crate::models::{Candidate, MatchSet, RevertReason};
use crate::pipeline::{CallCounters, RetryPolicy};
use crate::scoring::{composite, CompositeWeights};
use tracing::{debug, warn};

/// One completed pass: the gated candidate and its residual matches.
#[derive(Debug, Clone)]
pub struct PassOutcome {
    pub candidate: Candidate,
    pub matches: MatchSet,
    pub reverted: Option<RevertReason>,
}

/// The loop's result: the winning pass and how many passes ran.
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    pub winner: PassOutcome,
    pub passes_run: u8,
}

enum LoopState {
    FirstPass,
    RefinementPass { first: PassOutcome },
    Done(LoopOutcome),
}

pub struct RefinementLoop<'a> {
    matcher: &'a Matcher,
    gate: &'a GateConfig,
    weights: CompositeWeights,
    /// Used only for tie-breaking; `None` (or a failing adapter) degrades
    /// tie-breaks to "prefer first pass".
    metrics: Option<&'a MetricAdapter>,
    /// Gated first-pass texts shorter than this skip the second pass; on
    /// very short texts another rewrite risks destroying the whole text.
    refine_min_chars: usize,
    retry: RetryPolicy,
    counters: &'a CallCounters,
}

impl<'a> RefinementLoop<'a> {
    pub fn new(
        matcher: &'a Matcher,
        gate: &'a GateConfig,
        weights: CompositeWeights,
        metrics: Option<&'a MetricAdapter>,
        refine_min_chars: usize,
        retry: RetryPolicy,
        counters: &'a CallCounters,
    ) -> Self {
        Self {
            matcher,
            gate,
            weights,
            metrics,
            refine_min_chars,
            retry,
            counters,
        }
    }

    /// Drive one generator through the state machine for one original text.
    pub fn run(&self, generator: &dyn Generator, original: &str) -> LoopOutcome {
        let mut state = LoopState::FirstPass;
        loop {
            state = match state {
                LoopState::FirstPass => {
                    let first = self.run_pass(generator, original, None, 0);
                    if first.matches.is_empty() {
                        LoopState::Done(LoopOutcome {
                            winner: first,
                            passes_run: 1,
                        })
                    } else if first.candidate.text.chars().count() >= self.refine_min_chars {
                        LoopState::RefinementPass { first }
                    } else {
                        debug!(
                            generator = generator.label(),
                            "text too short for a refinement pass"
                        );
                        LoopState::Done(LoopOutcome {
                            winner: first,
                            passes_run: 1,
                        })
                    }
                }
                LoopState::RefinementPass { first } => {
                    let second = self.run_pass(generator, original, Some(&first.matches), 1);
                    let winner = self.pick_winner(original, first, second);
                    LoopState::Done(LoopOutcome {
                        winner,
                        passes_run: 2,
                    })
                }
                LoopState::Done(outcome) => return outcome,
            };
        }
    }

    /// Generate (with retry), gate, and re-detect for one pass.
    fn run_pass(
        &self,
        generator: &dyn Generator,
        original: &str,
        hint: Option<&MatchSet>,
        pass_index: u8,
    ) -> PassOutcome {
        let raw = match self.retry.call(self.counters, || generator.generate(original, hint)) {
            Ok(text) => text,
            Err(e) => {
                // No improvement this pass; the loop never raises past here.
                warn!(
                    generator = generator.label(),
                    pass_index,
                    error = %e,
                    "generation failed, keeping original for this pass"
                );
                original.to_string()
            }
        };

        let gated = gate::validate(original, &raw, self.gate);
        let matches = self.matcher.detect(&gated.text);
        PassOutcome {
            candidate: Candidate {
                text: gated.text,
                generator: generator.label().to_string(),
                pass_index,
            },
            matches,
            reverted: gated.reverted,
        }
    }

    fn pick_winner(&self, original: &str, first: PassOutcome, second: PassOutcome) -> PassOutcome {
        if second.matches.len() < first.matches.len() {
            return second;
        }
        if second.matches.len() > first.matches.len() {
            return first;
        }

        // Same residual cardinality: break the tie on composite score.
        // A metric failure degrades to preferring the first pass.
        if let Some(adapter) = self.metrics {
            let score = |text: &str| -> Option<f64> {
                self.counters.record_scorer_call();
                match adapter.measure(original, text) {
                    Ok(m) => Some(composite(&m, &self.weights)),
                    Err(e) => {
                        warn!(error = %e, "tie-break scoring failed, preferring first pass");
                        None
                    }
                }
            };
            if let (Some(s1), Some(s2)) = (score(&first.candidate.text), score(&second.candidate.text)) {
                if s2 > s1 {
                    return second;
                }
            }
        }

        first
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{GenError, GenResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted generator: returns canned outputs per pass.
    struct Scripted {
        outputs: Vec<GenResult<String>>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(outputs: Vec<GenResult<String>>) -> Self {
            Self {
                outputs,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Generator for Scripted {
        fn label(&self) -> &str {
            "scripted"
        }

        fn generate(&self, _original: &str, _hint: Option<&MatchSet>) -> GenResult<String> {
            let idx = self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outputs.get(idx) {
                Some(Ok(s)) => Ok(s.clone()),
                Some(Err(_)) => Err(GenError::Request("scripted failure".into())),
                None => Err(GenError::Request("script exhausted".into())),
            }
        }
    }

    fn no_retry() -> RetryPolicy {
        RetryPolicy {
            max_retries: 0,
            backoff: std::time::Duration::ZERO,
        }
    }

    fn make_loop<'a>(
        matcher: &'a Matcher,
        gate: &'a GateConfig,
        counters: &'a CallCounters,
    ) -> RefinementLoop<'a> {
        RefinementLoop::new(
            matcher,
            gate,
            CompositeWeights::Balanced,
            None,
            20,
            no_retry(),
            counters,
        )
    }

    const ORIGINAL: &str = "Купме ашарга была инде? Симереп чучка буласыз бит";

    #[test]
    fn test_clean_first_pass_stops_early() {
        let matcher = Matcher::builtin();
        let gate = GateConfig::default();
        let counters = CallCounters::default();
        let rloop = make_loop(&matcher, &gate, &counters);

        let generator = Scripted::new(vec![Ok(
            "Купме ашарга была инде? Симереп буласыз бит".to_string()
        )]);
        let outcome = rloop.run(&generator, ORIGINAL);

        assert_eq!(outcome.passes_run, 1);
        assert_eq!(generator.calls(), 1);
        assert!(outcome.winner.matches.is_empty());
        assert_eq!(outcome.winner.candidate.pass_index, 0);
    }

    #[test]
    fn test_residual_matches_trigger_second_pass() {
        let matcher = Matcher::builtin();
        let gate = GateConfig::default();
        let counters = CallCounters::default();
        let rloop = make_loop(&matcher, &gate, &counters);

        // First pass keeps "чучка"; second pass removes it.
        let generator = Scripted::new(vec![
            Ok("Купме ашарга была инде? Симереп чучка буласыз".to_string()),
            Ok("Купме ашарга была инде? Симереп буласыз бит".to_string()),
        ]);
        let outcome = rloop.run(&generator, ORIGINAL);

        assert_eq!(outcome.passes_run, 2);
        assert_eq!(generator.calls(), 2);
        assert!(outcome.winner.matches.is_empty());
        assert_eq!(outcome.winner.candidate.pass_index, 1);
    }

    #[test]
    fn test_tie_prefers_first_pass_without_metrics() {
        let matcher = Matcher::builtin();
        let gate = GateConfig::default();
        let counters = CallCounters::default();
        let rloop = make_loop(&matcher, &gate, &counters);

        // Both passes leave the same single match.
        let generator = Scripted::new(vec![
            Ok("Купме ашарга была инде? Симереп чучка буласыз".to_string()),
            Ok("Купме ашарга чучка буласыз бит шунда ук".to_string()),
        ]);
        let outcome = rloop.run(&generator, ORIGINAL);

        assert_eq!(outcome.passes_run, 2);
        assert_eq!(outcome.winner.candidate.pass_index, 0);
    }

    #[test]
    fn test_generator_failure_degrades_to_original() {
        let matcher = Matcher::builtin();
        let gate = GateConfig::default();
        let counters = CallCounters::default();
        let rloop = make_loop(&matcher, &gate, &counters);

        let generator = Scripted::new(vec![
            Err(GenError::Request("down".into())),
            Err(GenError::Request("down".into())),
        ]);
        let outcome = rloop.run(&generator, ORIGINAL);

        // Both passes degraded to the original; the original still matches.
        assert_eq!(outcome.winner.candidate.text, ORIGINAL);
        assert!(!outcome.winner.matches.is_empty());
    }

    #[test]
    fn test_short_text_skips_refinement() {
        let matcher = Matcher::builtin();
        let gate = GateConfig::default();
        let counters = CallCounters::default();
        let rloop = make_loop(&matcher, &gate, &counters);

        // Gated output still matches, but is shorter than refine_min_chars.
        let generator = Scripted::new(vec![Ok("эх чучка".to_string())]);
        let outcome = rloop.run(&generator, "эх чучка дим");

        assert_eq!(outcome.passes_run, 1);
        assert_eq!(generator.calls(), 1);
    }
}
