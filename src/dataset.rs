//! Tab-separated dataset I/O
//!
//! Input rows carry an id, the original text, and (for evaluation mode) a
//! candidate text. Column names are a configurable contract; the reference
//! deployment uses `ID` / `tat_toxic` / `tat_detox1`. Malformed rows are
//! yielded as per-row errors so a batch never aborts for a handful of bad
//! lines; output preserves input order.

use crate::config::ColumnConfig;
use crate::models::Decision;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("csv error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
    #[error("missing required column '{0}'")]
    MissingColumn(String),
    #[error("row {row}: missing or empty field '{field}'")]
    BadRow { row: usize, field: String },
}

/// One parsed input row.
#[derive(Debug, Clone)]
pub struct InputRow {
    pub id: String,
    pub original: String,
    /// Present only when the candidate column exists (evaluation mode).
    pub candidate: Option<String>,
}

/// Per-row read result: malformed rows are errors, not aborts.
pub type RowResult = Result<InputRow, DatasetError>;

fn tsv_reader(path: &Path) -> Result<csv::Reader<std::fs::File>, DatasetError> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_path(path)
        .map_err(|e| DatasetError::Csv {
            path: path.display().to_string(),
            source: e,
        })
}

/// Read all rows. The candidate column is optional; id and original are
/// required and must be non-empty per row.
pub fn read_rows(path: &Path, columns: &ColumnConfig) -> Result<Vec<RowResult>, DatasetError> {
    let mut reader = tsv_reader(path)?;

    let headers = reader
        .headers()
        .map_err(|e| DatasetError::Csv {
            path: path.display().to_string(),
            source: e,
        })?
        .clone();

    let find = |name: &str| headers.iter().position(|h| h == name);
    let id_idx = find(&columns.id).ok_or_else(|| DatasetError::MissingColumn(columns.id.clone()))?;
    let original_idx = find(&columns.original)
        .ok_or_else(|| DatasetError::MissingColumn(columns.original.clone()))?;
    let candidate_idx = find(&columns.candidate);

    let mut rows = Vec::new();
    for (row_num, record) in reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                rows.push(Err(DatasetError::Csv {
                    path: path.display().to_string(),
                    source: e,
                }));
                continue;
            }
        };

        let field = |idx: usize, name: &str| -> Result<String, DatasetError> {
            let value = record.get(idx).unwrap_or("").trim();
            if value.is_empty() {
                return Err(DatasetError::BadRow {
                    row: row_num + 1,
                    field: name.to_string(),
                });
            }
            Ok(value.to_string())
        };

        let parsed = field(id_idx, &columns.id).and_then(|id| {
            let original = field(original_idx, &columns.original)?;
            let candidate = candidate_idx
                .and_then(|idx| record.get(idx))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from);
            Ok(InputRow {
                id,
                original,
                candidate,
            })
        });
        rows.push(parsed);
    }

    Ok(rows)
}

/// Write `{id, original, decision}` rows, preserving the given order and the
/// configured column names.
pub fn write_decisions(
    path: &Path,
    columns: &ColumnConfig,
    rows: &[(String, String, Decision)],
) -> Result<(), DatasetError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .map_err(|e| DatasetError::Csv {
            path: path.display().to_string(),
            source: e,
        })?;

    let as_csv = |e: csv::Error| DatasetError::Csv {
        path: path.display().to_string(),
        source: e,
    };

    writer
        .write_record([&columns.id, &columns.original, &columns.candidate])
        .map_err(as_csv)?;
    for (id, original, decision) in rows {
        writer
            .write_record([id, original, &decision.text])
            .map_err(as_csv)?;
    }
    writer.flush().map_err(|e| DatasetError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}
