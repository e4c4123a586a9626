//! Text (terminal) reporter with colors and formatting

use super::{EvalReport, EvalRow};
use anyhow::Result;
use console::style;

/// Color a score for quick scanning.
fn format_score(score: f64) -> String {
    let rendered = format!("{:.3}", score);
    if score >= 0.7 {
        style(rendered).green().to_string()
    } else if score >= 0.4 {
        style(rendered).yellow().to_string()
    } else {
        style(rendered).red().to_string()
    }
}

fn push_rows(out: &mut String, rows: &[EvalRow]) {
    for row in rows {
        out.push_str(&format!(
            "  {:<12} J={}  STA={:.3}  SIM={:.3}  FL={:.3}\n",
            row.id,
            format_score(row.composite),
            row.metrics.attribute,
            row.metrics.similarity,
            row.metrics.fluency,
        ));
    }
}

/// Render report as formatted terminal output
pub fn render(report: &EvalReport) -> Result<String> {
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", style("Detoxa Evaluation").bold()));
    out.push_str(&format!(
        "{}\n",
        style("──────────────────────────────────────").dim()
    ));
    out.push_str(&format!(
        "Rows scored: {}  Errors: {}\n\n",
        report.scored_count(),
        report.error_count()
    ));

    out.push_str(&format!("{}\n", style("MEANS").bold()));
    out.push_str(&format!(
        "  Composite: {}  Attribute: {}  Similarity: {}  Fluency: {}\n\n",
        format_score(report.mean_composite),
        format_score(report.mean_attribute),
        format_score(report.mean_similarity),
        format_score(report.mean_fluency),
    ));

    if !report.worst.is_empty() {
        out.push_str(&format!(
            "{} (lowest composite)\n",
            style("WORST ROWS").bold()
        ));
        push_rows(&mut out, &report.worst);
        out.push('\n');
    }

    if !report.best.is_empty() {
        out.push_str(&format!(
            "{} (highest composite)\n",
            style("BEST ROWS").bold()
        ));
        push_rows(&mut out, &report.best);
        out.push('\n');
    }

    if !report.errors.is_empty() {
        out.push_str(&format!("{}\n", style("ERRORS").bold()));
        for err in &report.errors {
            out.push_str(&format!("  {:<12} {}\n", err.id, err.error));
        }
        out.push('\n');
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_report;

    #[test]
    fn test_text_render_sections() {
        let report = test_report();
        let rendered = render(&report).expect("render text");
        assert!(rendered.contains("Detoxa Evaluation"));
        assert!(rendered.contains("MEANS"));
        assert!(rendered.contains("WORST ROWS"));
        assert!(rendered.contains("ERRORS"));
    }

    #[test]
    fn test_text_render_row_ids_present() {
        let report = test_report();
        let rendered = render(&report).expect("render text");
        assert!(rendered.contains('1'));
        assert!(rendered.contains('2'));
    }
}
