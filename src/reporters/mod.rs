//! Evaluation reports
//!
//! Scores a finished dataset (id, original, candidate) row by row and
//! renders the result in one of two formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON
//!
//! Metric failures are per-row errors surfaced in the report; a failed row
//! never contributes a fabricated score to the means.

mod json;
mod text;

use crate::dataset::RowResult;
use crate::metrics::MetricAdapter;
use crate::models::MetricTriple;
use crate::scoring::{composite, CompositeWeights};
use anyhow::{anyhow, Result};
use serde::Serialize;
use std::str::FromStr;
use tracing::warn;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// One scored row.
#[derive(Debug, Clone, Serialize)]
pub struct EvalRow {
    pub id: String,
    pub metrics: MetricTriple,
    pub composite: f64,
}

/// One row that could not be scored.
#[derive(Debug, Clone, Serialize)]
pub struct EvalError {
    pub id: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvalReport {
    pub rows: Vec<EvalRow>,
    pub errors: Vec<EvalError>,
    pub mean_similarity: f64,
    pub mean_attribute: f64,
    pub mean_fluency: f64,
    pub mean_composite: f64,
    /// Lowest-composite rows, ascending.
    pub worst: Vec<EvalRow>,
    /// Highest-composite rows, descending.
    pub best: Vec<EvalRow>,
}

impl EvalReport {
    pub fn scored_count(&self) -> usize {
        self.rows.len()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

/// Score every row of a finished dataset. Rows without a candidate column
/// and rows the metric adapter rejects land in `errors`.
pub fn evaluate(
    rows: &[RowResult],
    adapter: &MetricAdapter,
    weights: &CompositeWeights,
    top: usize,
) -> EvalReport {
    let mut scored = Vec::new();
    let mut errors = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        let row = match row {
            Ok(r) => r,
            Err(e) => {
                errors.push(EvalError {
                    id: format!("row {}", idx + 1),
                    error: e.to_string(),
                });
                continue;
            }
        };
        let Some(candidate) = row.candidate.as_deref() else {
            errors.push(EvalError {
                id: row.id.clone(),
                error: "missing candidate text".to_string(),
            });
            continue;
        };

        match adapter.measure(&row.original, candidate) {
            Ok(metrics) => scored.push(EvalRow {
                id: row.id.clone(),
                composite: composite(&metrics, weights),
                metrics,
            }),
            Err(e) => {
                warn!(id = %row.id, error = %e, "row scoring failed");
                errors.push(EvalError {
                    id: row.id.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    let n = scored.len() as f64;
    let mean = |f: fn(&EvalRow) -> f64| {
        if scored.is_empty() {
            0.0
        } else {
            scored.iter().map(f).sum::<f64>() / n
        }
    };

    let mean_similarity = mean(|r| r.metrics.similarity);
    let mean_attribute = mean(|r| r.metrics.attribute);
    let mean_fluency = mean(|r| r.metrics.fluency);
    let mean_composite = mean(|r| r.composite);

    let mut by_composite = scored.clone();
    by_composite.sort_by(|a, b| {
        a.composite
            .partial_cmp(&b.composite)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let worst: Vec<EvalRow> = by_composite.iter().take(top).cloned().collect();
    let best: Vec<EvalRow> = by_composite.iter().rev().take(top).cloned().collect();

    EvalReport {
        rows: scored,
        errors,
        mean_similarity,
        mean_attribute,
        mean_fluency,
        mean_composite,
        worst,
        best,
    }
}

/// Render an evaluation report in the specified format
pub fn report(report: &EvalReport, format: &str) -> Result<String> {
    let fmt = OutputFormat::from_str(format)?;
    report_with_format(report, fmt)
}

/// Render an evaluation report using an OutputFormat enum
pub fn report_with_format(report: &EvalReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(report),
        OutputFormat::Json => json::render(report),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::ColumnConfig;
    use crate::dataset::read_rows;
    use crate::metrics::{AttributeClassifier, Embedder, MetricError};
    use std::io::Write;

    struct StubEmbedder;

    impl Embedder for StubEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, MetricError> {
            let mut v = vec![0.0f32; 32];
            for c in text.chars() {
                v[(c as usize) % 32] += 1.0;
            }
            Ok(v)
        }
    }

    struct StubClassifier;

    impl AttributeClassifier for StubClassifier {
        fn toxicity(&self, text: &str) -> Result<f64, MetricError> {
            Ok(if text.contains("чучка") { 0.9 } else { 0.1 })
        }
    }

    pub(crate) fn test_report() -> EvalReport {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(
            file,
            "ID\ttat_toxic\ttat_detox1\n\
             1\tСимереп чучка буласыз бит\tСимереп буласыз бит\n\
             2\tсаламга ут төртте\tсаламга ут төртте\n\
             3\tбуш юл калсын\t\n"
        )
        .expect("write tsv");

        let rows = read_rows(file.path(), &ColumnConfig::default()).expect("read");
        let adapter = MetricAdapter::new(Box::new(StubEmbedder), Box::new(StubClassifier));
        evaluate(&rows, &adapter, &CompositeWeights::Balanced, 2)
    }

    #[test]
    fn test_evaluate_means_and_errors() {
        let report = test_report();
        assert_eq!(report.scored_count(), 2);
        assert_eq!(report.error_count(), 1);
        assert!(report.mean_composite > 0.0);
        assert!(report.mean_attribute > 0.5);
        assert_eq!(report.errors[0].id, "3");
    }

    #[test]
    fn test_worst_and_best_ordering() {
        let report = test_report();
        assert_eq!(report.worst.len(), 2);
        assert_eq!(report.best.len(), 2);
        assert!(report.worst[0].composite <= report.worst[1].composite);
        assert!(report.best[0].composite >= report.best[1].composite);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(
            OutputFormat::from_str("TEXT").expect("parse"),
            OutputFormat::Text
        );
        assert_eq!(
            OutputFormat::from_str("json").expect("parse"),
            OutputFormat::Json
        );
        assert!(OutputFormat::from_str("yaml").is_err());
    }

    #[test]
    fn test_empty_report_means_are_zero() {
        let adapter = MetricAdapter::new(Box::new(StubEmbedder), Box::new(StubClassifier));
        let report = evaluate(&[], &adapter, &CompositeWeights::Balanced, 5);
        assert_eq!(report.scored_count(), 0);
        assert_eq!(report.mean_composite, 0.0);
    }
}
