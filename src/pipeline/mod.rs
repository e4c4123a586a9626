//! Detoxification pipeline
//!
//! Orchestrates the per-sample flow and the parallel batch:
//! 1. Detect lexicon matches in the original; clean inputs pass through
//!    untouched with no generator call.
//! 2. Run the two-pass refinement loop once per configured generator.
//! 3. Hand each loop's winner to the ensemble selector.
//!
//! Samples are independent, so the batch is a rayon map with a configurable
//! worker cap; results are written back by sample index, never by completion
//! order. Call accounting goes through injected atomic counters, read only
//! after all workers join.

use crate::config::DetoxConfig;
use crate::dataset::RowResult;
use crate::ensemble;
use crate::generators::{GenResult, Generator};
use crate::lexicon::Matcher;
use crate::metrics::MetricAdapter;
use crate::models::{Decision, RunSummary};
use crate::refine::RefinementLoop;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{info, warn};

/// Thread-safe accounting for external calls. Injected into workers,
/// incremented atomically, read after the batch joins.
#[derive(Debug, Default)]
pub struct CallCounters {
    generator_calls: AtomicU64,
    scorer_calls: AtomicU64,
    retries: AtomicU64,
}

impl CallCounters {
    pub fn record_generator_call(&self) {
        self.generator_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scorer_call(&self) {
        self.scorer_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn generator_calls(&self) -> u64 {
        self.generator_calls.load(Ordering::Relaxed)
    }

    pub fn scorer_calls(&self) -> u64 {
        self.scorer_calls.load(Ordering::Relaxed)
    }

    pub fn retries(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }
}

/// Bounded retry with short backoff, applied around every generator call.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn call<T>(
        &self,
        counters: &CallCounters,
        mut f: impl FnMut() -> GenResult<T>,
    ) -> GenResult<T> {
        let mut attempt = 0;
        loop {
            counters.record_generator_call();
            match f() {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    counters.record_retry();
                    warn!(attempt, error = %e, "generator call failed, retrying");
                    std::thread::sleep(self.backoff);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Outcome of one sample's run, before write-back.
#[derive(Debug, Clone)]
pub struct SampleOutcome {
    pub decision: Decision,
    /// True when the original had no lexicon matches and nothing ran.
    pub clean_input: bool,
    /// Gate reversions observed across this sample's passes.
    pub reverted_passes: usize,
}

pub struct DetoxPipeline<'a> {
    config: &'a DetoxConfig,
    matcher: &'a Matcher,
    generators: &'a [Box<dyn Generator>],
    metrics: Option<&'a MetricAdapter>,
    counters: CallCounters,
}

impl<'a> DetoxPipeline<'a> {
    pub fn new(
        config: &'a DetoxConfig,
        matcher: &'a Matcher,
        generators: &'a [Box<dyn Generator>],
        metrics: Option<&'a MetricAdapter>,
    ) -> Self {
        Self {
            config,
            matcher,
            generators,
            metrics,
            counters: CallCounters::default(),
        }
    }

    pub fn counters(&self) -> &CallCounters {
        &self.counters
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.config.max_retries,
            backoff: Duration::from_millis(self.config.retry_backoff_ms),
        }
    }

    /// Process one sample end to end.
    pub fn process(&self, original: &str) -> SampleOutcome {
        // No lexicon hits in the original: nothing to remove, nothing runs.
        if self.matcher.detect(original).is_empty() {
            return SampleOutcome {
                decision: Decision::unchanged(original),
                clean_input: true,
                reverted_passes: 0,
            };
        }

        let rloop = RefinementLoop::new(
            self.matcher,
            &self.config.gate,
            self.config.weights,
            self.metrics,
            self.config.refine_min_chars,
            self.retry_policy(),
            &self.counters,
        );

        let mut candidates = Vec::with_capacity(self.generators.len());
        let mut reverted_passes = 0;
        for generator in self.generators {
            let outcome = rloop.run(generator.as_ref(), original);
            if outcome.winner.reverted.is_some() {
                reverted_passes += 1;
            }
            candidates.push(outcome.winner.candidate);
        }

        let decision = ensemble::select(
            original,
            &candidates,
            self.matcher,
            self.metrics,
            &self.config.weights,
            &self.counters,
        );

        SampleOutcome {
            decision,
            clean_input: false,
            reverted_passes,
        }
    }

    /// Run the batch over pre-read rows. Returns `(id, original, decision)`
    /// triples in input order plus the run summary. Malformed rows are
    /// excluded with a diagnostic; the batch never aborts for them.
    pub fn run_batch(
        &self,
        rows: &[RowResult],
        show_progress: bool,
    ) -> anyhow::Result<(Vec<(String, String, Decision)>, RunSummary)> {
        let mut summary = RunSummary {
            total: rows.len(),
            ..Default::default()
        };

        let valid: Vec<(usize, &str, &str)> = rows
            .iter()
            .enumerate()
            .filter_map(|(idx, row)| match row {
                Ok(r) => Some((idx, r.id.as_str(), r.original.as_str())),
                Err(e) => {
                    warn!(row = idx + 1, error = %e, "sample excluded from batch");
                    None
                }
            })
            .collect();
        summary.failed = rows.len() - valid.len();

        let bar = if show_progress {
            let bar = ProgressBar::new(valid.len() as u64);
            bar.set_style(
                ProgressStyle::with_template(
                    "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            Some(bar)
        } else {
            None
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .build()?;

        // rayon's ordered collect keeps results indexed by sample, not by
        // completion order.
        let outcomes: Vec<(String, String, SampleOutcome)> = pool.install(|| {
            valid
                .par_iter()
                .map(|&(_, id, original)| {
                    let outcome = self.process(original);
                    if let Some(bar) = &bar {
                        bar.inc(1);
                    }
                    (id.to_string(), original.to_string(), outcome)
                })
                .collect()
        });

        if let Some(bar) = &bar {
            bar.finish_and_clear();
        }

        let mut results = Vec::with_capacity(outcomes.len());
        for (id, original, outcome) in outcomes {
            if outcome.clean_input {
                summary.clean_inputs += 1;
            }
            if outcome.decision.is_unchanged() {
                summary.unchanged += 1;
            } else {
                summary.rewritten += 1;
            }
            summary.reverted += outcome.reverted_passes;
            results.push((id, original, outcome.decision));
        }

        summary.generator_calls = self.counters.generator_calls();
        summary.scorer_calls = self.counters.scorer_calls();
        summary.retries = self.counters.retries();

        info!(
            total = summary.total,
            rewritten = summary.rewritten,
            unchanged = summary.unchanged,
            reverted = summary.reverted,
            failed = summary.failed,
            "batch complete"
        );

        Ok((results, summary))
    }
}
