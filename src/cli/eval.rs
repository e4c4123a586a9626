//! Eval command - score a finished dataset

use crate::config::DetoxConfig;
use crate::dataset;
use crate::metrics::{MetricAdapter, RemoteScorer};
use crate::reporters;
use anyhow::{bail, Context, Result};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Run the eval command
pub fn run(config: &DetoxConfig, input: &Path, format: &str, top: Option<usize>) -> Result<()> {
    let Some(scoring) = config.scoring.as_ref() else {
        bail!(
            "evaluation needs a scoring service; add a [scoring] section with \
             its url to detoxa.toml"
        );
    };

    let rows = dataset::read_rows(input, &config.columns)
        .with_context(|| format!("failed to read dataset {}", input.display()))?;
    info!(rows = rows.len(), "dataset loaded");

    let timeout = Duration::from_secs(scoring.timeout_secs);
    let adapter = MetricAdapter::new(
        Box::new(RemoteScorer::new(&scoring.url, timeout)),
        Box::new(RemoteScorer::new(&scoring.url, timeout)),
    );

    let top = top.unwrap_or(config.report_top);
    let report = reporters::evaluate(&rows, &adapter, &config.weights, top);
    let rendered = reporters::report(&report, format)?;
    println!("{rendered}");
    Ok(())
}
