//! Init command - write an example config file

use crate::config::{DEFAULT_CONFIG_FILE, EXAMPLE_CONFIG};
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

/// Run the init command
pub fn run(dir: &Path) -> Result<()> {
    let config_path = dir.join(DEFAULT_CONFIG_FILE);

    if config_path.exists() {
        println!(
            "{} {} already exists, leaving it untouched",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
        return Ok(());
    }

    std::fs::write(&config_path, EXAMPLE_CONFIG)
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );
    println!("  Edit it, then: detoxa run input.tsv -o output.tsv");
    Ok(())
}
