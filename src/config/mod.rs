//! Project configuration
//!
//! Loads `detoxa.toml` from the working directory (or an explicit path).
//! Every field is optional with a sensible default, so an empty or missing
//! file is valid. Thresholds are deployment policy, not constants — see the
//! gate and scoring docs for what each knob trades off.

use crate::gate::GateConfig;
use crate::generators::LlmConfig;
use crate::scoring::CompositeWeights;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "detoxa.toml";

/// Column-name contract for dataset files.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub id: String,
    pub original: String,
    pub candidate: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            id: "ID".to_string(),
            original: "tat_toxic".to_string(),
            candidate: "tat_detox1".to_string(),
        }
    }
}

/// Remote scoring service (embeddings + toxicity classifier).
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringServiceConfig {
    pub url: String,
    #[serde(default = "default_scoring_timeout")]
    pub timeout_secs: u64,
}

fn default_scoring_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetoxConfig {
    pub gate: GateConfig,
    pub weights: CompositeWeights,
    /// Gated first-pass texts shorter than this skip the refinement pass.
    pub refine_min_chars: usize,
    /// Parallel workers for the batch (also the external-call concurrency cap).
    pub workers: usize,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub columns: ColumnConfig,
    /// External pattern catalog; the built-in one is used when absent.
    pub lexicon: Option<PathBuf>,
    pub llm: LlmConfig,
    /// Optional scoring service; without it, tie-breaking degrades to
    /// "prefer first pass" and `eval` is unavailable.
    pub scoring: Option<ScoringServiceConfig>,
    /// Worst-N / best-N rows shown in evaluation reports.
    pub report_top: usize,
}

impl Default for DetoxConfig {
    fn default() -> Self {
        Self {
            gate: GateConfig::default(),
            weights: CompositeWeights::default(),
            refine_min_chars: 20,
            workers: 8,
            max_retries: 3,
            retry_backoff_ms: 1000,
            columns: ColumnConfig::default(),
            lexicon: None,
            llm: LlmConfig::default(),
            scoring: None,
            report_top: 5,
        }
    }
}

impl DetoxConfig {
    /// Load from an explicit path, or from `detoxa.toml` in `dir` when it
    /// exists, falling back to defaults.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let default = dir.join(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    debug!("no config file found, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }
}

/// Commented example written by `detoxa init`.
pub const EXAMPLE_CONFIG: &str = r#"# detoxa.toml — all fields optional; shown values are the defaults.

# Validation gate policy. Tighter bounds preserve meaning; looser bounds let
# aggressive rewrites through.
[gate]
min_ratio = 0.3
max_ratio = 1.5
max_relative_change = 0.5
min_words_for_truncation_check = 3

# Composite score. mode = "balanced" is attribute * similarity * fluency.
# For a weighted sum instead:
#   [weights]
#   mode = "weighted"
#   attribute = 0.45
#   similarity = 0.35
#   fluency = 0.20
[weights]
mode = "balanced"

refine_min_chars = 20
workers = 8
max_retries = 3
retry_backoff_ms = 1000
report_top = 5

# Dataset column names.
[columns]
id = "ID"
original = "tat_toxic"
candidate = "tat_detox1"

# Rewrite model. backend = "open_ai" or "anthropic"; base_url overrides the
# endpoint for OpenAI-compatible proxies. Keys come from OPENAI_API_KEY /
# ANTHROPIC_API_KEY.
[llm]
backend = "open_ai"
model = "gpt-4o-mini"
max_tokens = 300
temperature = 0.2
seed = 42
timeout_secs = 120

# Remote scoring service (POST /embed, POST /toxicity). Required for `eval`
# and for composite tie-breaking during `run`.
# [scoring]
# url = "http://localhost:8090"
# timeout_secs = 30

# External pattern catalog (replaces the built-in one).
# lexicon = "lexicon.toml"
"#;
