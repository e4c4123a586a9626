//! CLI command definitions and handlers

mod eval;
mod init;
mod lexicon;
mod run;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// Detoxa - quality-gated detoxification rewrites
#[derive(Parser, Debug)]
#[command(name = "detoxa")]
#[command(
    version,
    about = "Quality-gated rewrite selection for text detoxification",
    long_about = "Detoxa rewrites toxic text through LLM generators, validates every \
candidate against a content-preservation gate, and selects the best rewrite per \
sample by lexicon residue and a composite quality score.\n\n\
BYOK: rewrite-model keys come from OPENAI_API_KEY / ANTHROPIC_API_KEY.",
    after_help = "\
Examples:
  detoxa init                                Write an example detoxa.toml
  detoxa run input.tsv -o output.tsv         Detoxify a dataset
  detoxa run input.tsv -o out.tsv --dry-run  List rows that would be rewritten
  detoxa eval submission.tsv                 Score a finished dataset
  detoxa eval submission.tsv --format json   Machine-readable report
  detoxa lexicon --text \"Симереп чучка буласыз\"   Test the pattern catalog"
)]
pub struct Cli {
    /// Config file path (default: detoxa.toml in the working directory)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of parallel workers (1-64); overrides the config value
    #[arg(long, global = true, value_parser = parse_workers)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write an example detoxa.toml config file
    Init,

    /// Run the detoxification pipeline over a TSV dataset
    #[command(after_help = "\
Examples:
  detoxa run input.tsv -o output.tsv
  detoxa run input.tsv -o output.tsv --backend anthropic
  detoxa run input.tsv -o output.tsv --workers 4
  detoxa run input.tsv -o output.tsv --dry-run")]
    Run {
        /// Input TSV with id and original-text columns
        input: PathBuf,

        /// Output TSV path
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// Override the rewrite backend from the config
        #[arg(long, value_parser = ["open_ai", "anthropic"])]
        backend: Option<String>,

        /// List rows with lexicon hits without calling any generator
        #[arg(long)]
        dry_run: bool,
    },

    /// Score a finished dataset and print an evaluation report
    Eval {
        /// TSV with id, original, and candidate columns
        input: PathBuf,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Worst/best rows to show (overrides the config value)
        #[arg(long)]
        top: Option<usize>,
    },

    /// Print the active pattern catalog, optionally testing a sample text
    Lexicon {
        /// External catalog file (overrides the config value)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Sample text to run against the catalog
        #[arg(long)]
        text: Option<String>,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Init => init::run(&cwd),

        Commands::Run {
            input,
            output,
            backend,
            dry_run,
        } => {
            let mut config = crate::config::DetoxConfig::load(cli.config.as_deref(), &cwd)?;
            if let Some(workers) = cli.workers {
                config.workers = workers;
            }
            run::run(&config, &input, &output, backend.as_deref(), dry_run)
        }

        Commands::Eval { input, format, top } => {
            let config = crate::config::DetoxConfig::load(cli.config.as_deref(), &cwd)?;
            eval::run(&config, &input, &format, top)
        }

        Commands::Lexicon { catalog, text } => {
            let config = crate::config::DetoxConfig::load(cli.config.as_deref(), &cwd)?;
            lexicon::run(&config, catalog.as_deref(), text.as_deref())
        }
    }
}

/// Build the matcher from an explicit catalog path, the configured one, or
/// the built-in catalog.
pub(crate) fn load_matcher(
    config: &crate::config::DetoxConfig,
    explicit: Option<&std::path::Path>,
) -> Result<crate::lexicon::Matcher> {
    use anyhow::Context;

    let path = explicit.or(config.lexicon.as_deref());
    match path {
        Some(p) => crate::lexicon::Matcher::from_toml(p)
            .with_context(|| format!("failed to load pattern catalog {}", p.display())),
        None => Ok(crate::lexicon::Matcher::builtin()),
    }
}
