//! Run command - full detoxification pipeline over a TSV dataset

use crate::config::DetoxConfig;
use crate::dataset;
use crate::generators::{Generator, LlmBackend, LlmClient, LlmRewriter};
use crate::metrics::{MetricAdapter, RemoteScorer};
use crate::pipeline::DetoxPipeline;
use anyhow::{Context, Result};
use console::style;
use std::path::Path;
use std::time::Duration;
use tracing::info;

fn generator_label(backend: LlmBackend) -> &'static str {
    match backend {
        LlmBackend::OpenAi => "gpt",
        LlmBackend::Anthropic => "claude",
    }
}

fn build_adapter(config: &DetoxConfig) -> Option<MetricAdapter> {
    config.scoring.as_ref().map(|scoring| {
        let timeout = Duration::from_secs(scoring.timeout_secs);
        MetricAdapter::new(
            Box::new(RemoteScorer::new(&scoring.url, timeout)),
            Box::new(RemoteScorer::new(&scoring.url, timeout)),
        )
    })
}

/// Run the pipeline
pub fn run(
    config: &DetoxConfig,
    input: &Path,
    output: &Path,
    backend_override: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let matcher = super::load_matcher(config, None)?;
    let rows = dataset::read_rows(input, &config.columns)
        .with_context(|| format!("failed to read dataset {}", input.display()))?;
    info!(rows = rows.len(), "dataset loaded");

    if dry_run {
        return list_dirty_rows(&rows, &matcher);
    }

    let mut llm = config.llm.clone();
    if let Some(backend) = backend_override {
        llm.backend = match backend {
            "anthropic" => LlmBackend::Anthropic,
            _ => LlmBackend::OpenAi,
        };
    }
    let backend = llm.backend;
    let client = LlmClient::from_env(llm)?;
    let generators: Vec<Box<dyn Generator>> =
        vec![Box::new(LlmRewriter::new(client, generator_label(backend)))];

    let adapter = build_adapter(config);
    if adapter.is_none() {
        info!("no scoring service configured, tie-breaks prefer the first pass");
    }

    let pipeline = DetoxPipeline::new(config, &matcher, &generators, adapter.as_ref());
    let (results, summary) = pipeline.run_batch(&rows, true)?;

    dataset::write_decisions(output, &config.columns, &results)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("\n{}", style("Detoxa Run").bold());
    println!(
        "{}",
        style("──────────────────────────────────────").dim()
    );
    println!(
        "  Total: {}  Rewritten: {}  Unchanged: {}  Clean inputs: {}",
        summary.total,
        style(summary.rewritten).green(),
        summary.unchanged,
        summary.clean_inputs,
    );
    println!(
        "  Gate reversions: {}  Failed rows: {}",
        style(summary.reverted).yellow(),
        if summary.failed > 0 {
            style(summary.failed).red().to_string()
        } else {
            summary.failed.to_string()
        },
    );
    println!(
        "  Generator calls: {}  Scorer calls: {}  Retries: {}",
        summary.generator_calls, summary.scorer_calls, summary.retries,
    );
    println!(
        "\n{} Wrote {}\n",
        style("✓").green(),
        style(output.display()).cyan()
    );
    Ok(())
}

/// List rows the pipeline would send to a generator, without calling one.
fn list_dirty_rows(rows: &[dataset::RowResult], matcher: &crate::lexicon::Matcher) -> Result<()> {
    println!("\n{}\n", style("Dry run — rows with lexicon hits").bold());

    let mut dirty = 0;
    for row in rows.iter().flatten() {
        let matches = matcher.detect(&row.original);
        if matches.is_empty() {
            continue;
        }
        dirty += 1;
        let ids: Vec<&str> = matches.iter().map(String::as_str).collect();
        println!(
            "  {:<12} {}",
            style(&row.id).cyan(),
            style(ids.join(", ")).yellow()
        );
    }

    println!(
        "\n{} of {} rows would be rewritten\n",
        style(dirty).bold(),
        rows.len()
    );
    Ok(())
}
