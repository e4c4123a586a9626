//! JSON reporter
//!
//! Outputs the full EvalReport as pretty-printed JSON for machine
//! consumption or piping to jq.

use super::EvalReport;
use anyhow::Result;

/// Render report as JSON
pub fn render(report: &EvalReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_report;

    #[test]
    fn test_json_render_valid() {
        let report = test_report();
        let json_str = render(&report).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(
            parsed["rows"].as_array().expect("rows array").len(),
            report.scored_count()
        );
        assert!(parsed["mean_composite"].is_number());
    }

    #[test]
    fn test_json_errors_serialized() {
        let report = test_report();
        let json_str = render(&report).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(
            parsed["errors"].as_array().expect("errors array").len(),
            report.error_count()
        );
    }
}
