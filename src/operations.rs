//! Operator-facing entry points
//!
//! Each function opens its own connection, runs one engine, and releases the
//! connection before returning.

use crate::core::{with_source, BackupSettings, ConnectionConfig, Result};
use crate::engine::{
    list_tables, DumpArtifact, DumpEngine, DumpOptions, ExportArtifact, TabularExporter,
};

/// Tables an operator can choose from
pub async fn available_tables(config: &ConnectionConfig) -> Result<Vec<String>> {
    with_source(config, |source| Box::pin(async move { list_tables(source).await })).await
}

/// Dump the whole database into `settings.output_dir`
pub async fn full_backup(
    config: &ConnectionConfig,
    settings: &BackupSettings,
    options: DumpOptions,
) -> Result<DumpArtifact> {
    let engine = DumpEngine::new(settings.output_dir.clone()).with_options(options);
    with_source(config, |source| {
        Box::pin(async move { engine.run(source).await })
    })
    .await
}

/// Export one table into `settings.output_dir`
///
/// `table` is re-validated against the live schema before anything is written.
pub async fn export_table(
    config: &ConnectionConfig,
    settings: &BackupSettings,
    table: &str,
) -> Result<ExportArtifact> {
    let exporter = TabularExporter::new(settings.output_dir.clone());
    let table = table.to_string();
    with_source(config, |source| {
        Box::pin(async move { exporter.run(source, &table).await })
    })
    .await
}
