//! Table enumeration shared by the dump and export engines

use crate::core::database::DataSource;
use crate::core::error::{BackupError, Result};

/// List every table of the connected database, in engine order
///
/// An empty database yields an empty list; failures are returned, never
/// turned into an empty list.
pub async fn list_tables(source: &dyn DataSource) -> Result<Vec<String>> {
    let tables = source.list_tables().await?;
    tracing::debug!(count = tables.len(), "enumerated tables");
    Ok(tables)
}

/// Re-enumerate and check that `table` currently exists
pub async fn require_table(source: &dyn DataSource, table: &str) -> Result<()> {
    let tables = list_tables(source).await?;
    if tables.iter().any(|t| t == table) {
        Ok(())
    } else {
        Err(BackupError::unknown_table(table))
    }
}
