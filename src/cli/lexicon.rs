//! Lexicon command - inspect the active pattern catalog

use crate::config::DetoxConfig;
use anyhow::Result;
use console::style;
use std::path::Path;

/// Run the lexicon command
pub fn run(config: &DetoxConfig, catalog: Option<&Path>, text: Option<&str>) -> Result<()> {
    let matcher = super::load_matcher(config, catalog)?;

    println!(
        "\n{} ({} patterns)\n",
        style("Active pattern catalog").bold(),
        matcher.len()
    );
    for (id, tier) in matcher.entries() {
        println!("  {:<24} {:?}", style(id).cyan(), tier);
    }

    if let Some(text) = text {
        let matches = matcher.detect(text);
        println!("\n{}", style("Sample text").bold());
        println!("  {text}");
        if matches.is_empty() {
            println!("  {} no lexicon hits\n", style("✓").green());
        } else {
            let ids: Vec<&str> = matches.iter().map(String::as_str).collect();
            println!(
                "  {} {} hit(s): {}\n",
                style("✗").red(),
                matches.len(),
                style(ids.join(", ")).yellow()
            );
        }
    } else {
        println!();
    }

    Ok(())
}
