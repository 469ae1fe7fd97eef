//! Single-table CSV export

use super::artifact::{ensure_dir, export_file_name, now_timestamp, PendingArtifact};
use super::enumerate::require_table;
use crate::core::database::DataSource;
use crate::core::error::{BackupError, Result};
use crate::core::value::TableData;
use serde::Serialize;
use std::path::PathBuf;

/// A completed export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportArtifact {
    pub path: PathBuf,
    pub table: String,
    pub timestamp: String,
    pub columns: usize,
    pub rows: usize,
}

/// Produces `EXPORT_<table>_<timestamp>.csv` artifacts
#[derive(Debug, Clone)]
pub struct TabularExporter {
    output_dir: PathBuf,
}

impl TabularExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Export `table` from `source`
    ///
    /// The name is checked against a fresh enumeration first; an unknown
    /// table fails with `UnknownTable` before anything touches the disk.
    pub async fn run(&self, source: &dyn DataSource, table: &str) -> Result<ExportArtifact> {
        require_table(source, table).await?;
        tracing::info!(table = %table, "starting CSV export");

        let data = source.fetch_table(table).await?;
        let timestamp = now_timestamp();

        ensure_dir(&self.output_dir).await?;
        let pending = PendingArtifact::new(&self.output_dir, &export_file_name(table, &timestamp));
        let partial = pending.partial_path().to_path_buf();

        let bytes = render_csv(&data).map_err(|e| BackupError::write(&partial, e))?;
        tokio::fs::write(&partial, bytes)
            .await
            .map_err(|e| BackupError::write(&partial, e))?;
        let path = pending.commit().await?;

        let artifact = ExportArtifact {
            path,
            table: table.to_string(),
            timestamp,
            columns: data.columns.len(),
            rows: data.row_count(),
        };
        tracing::info!(
            path = %artifact.path.display(),
            rows = artifact.rows,
            "CSV export complete"
        );
        Ok(artifact)
    }
}

/// Header record then one record per row
///
/// Nulls become empty fields; other values, binary ones included, are
/// written verbatim with standard CSV quoting.
pub fn render_csv(data: &TableData) -> std::io::Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&data.columns)?;
    for row in &data.rows {
        writer.write_record(row.iter().map(|v| v.as_bytes().unwrap_or_default()))?;
    }
    writer.into_inner().map_err(|e| e.into_error())
}
