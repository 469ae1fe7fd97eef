//! Data source trait
//!
//! This module defines the read-only query interface every backend implements.
//! The dump and export engines only ever talk to a database through it.

use super::config::ConnectionConfig;
use super::database_types::DatabaseType;
use super::error::Result;
use super::value::TableData;
use async_trait::async_trait;

/// Read-only view of a relational database
///
/// Implementations never issue schema-modifying statements against the source.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Get the database type
    fn database_type(&self) -> DatabaseType;

    /// Name of the connected database, used for artifact naming
    fn database_name(&self) -> String;

    /// Open the connection described by `config`
    ///
    /// Fails with `ConnectionFailure` if the database cannot be reached.
    async fn connect(&self, config: &ConnectionConfig) -> Result<()>;

    /// Check if connected to the database
    fn is_connected(&self) -> bool;

    /// Release the connection; safe to call when already disconnected
    async fn disconnect(&self) -> Result<()>;

    /// Every table currently defined, in the engine's reported order
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// The engine's own `CREATE TABLE` text for `table`, without terminator
    async fn create_statement(&self, table: &str) -> Result<String>;

    /// Column names and every row of `table`, each cell tagged at read time
    async fn fetch_table(&self, table: &str) -> Result<TableData>;

    /// Start a read-consistent snapshot spanning subsequent reads
    async fn begin_snapshot(&self) -> Result<()> {
        Ok(())
    }

    /// End a snapshot started with [`DataSource::begin_snapshot`]
    async fn end_snapshot(&self) -> Result<()> {
        Ok(())
    }
}

/// Quote an identifier with backticks, doubling embedded backticks
///
/// Both MySQL and SQLite accept backtick-quoted identifiers.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}
