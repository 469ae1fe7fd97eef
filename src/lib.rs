//! # Rust Backup System
//!
//! Logical backup tooling for relational databases: a full SQL dump that can
//! be replayed to rebuild a database, and a single-table CSV export.
//!
//! ## Features
//!
//! - **Portable dumps**: `DROP`/`CREATE` taken verbatim from the engine, one
//!   multi-row `INSERT` per non-empty table
//! - **Exact literal encoding**: `NULL`, unquoted numerics, quoted and escaped text
//! - **CSV export**: header plus rows, standard quoting
//! - **Write-once artifacts**: aborted runs leave nothing that looks complete
//! - **Scoped connections**: released on every exit path
//!
//! ## Supported Databases
//!
//! | Database | Feature | Notes |
//! |----------|---------|-------|
//! | SQLite | `sqlite` (default) | Opened read-only |
//! | MySQL/MariaDB | `mysql` | `SHOW CREATE TABLE`, optional consistent snapshot |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rust_backup_system::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ConnectionConfig::builder(DatabaseType::Sqlite)
//!         .database("shop.db")
//!         .build()?;
//!     let settings = BackupSettings::default();
//!
//!     let dump = full_backup(&config, &settings, DumpOptions::default()).await?;
//!     println!("wrote {}", dump.path.display());
//!
//!     let export = export_table(&config, &settings, "orders").await?;
//!     println!("wrote {} rows", export.rows);
//!     Ok(())
//! }
//! ```
//!
//! ## Project Structure
//!
//! ```text
//! rust_backup_system/
//! ├── src/
//! │   ├── core/        # Errors, values, config, DataSource trait, sessions
//! │   ├── backends/    # SQLite and MySQL data sources
//! │   ├── engine/      # Enumeration, dump, CSV export, artifacts
//! │   ├── cli/         # backup-cli binary
//! │   ├── operations.rs
//! │   └── lib.rs
//! ├── demos/
//! ├── tests/
//! └── benches/
//! ```

/// Core backup system types and traits
pub mod core;

/// Data source backend implementations
pub mod backends;

/// Dump and export engines
pub mod engine;

/// One-call operations with scoped connections
pub mod operations;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::core::{
        BackupError, BackupSettings, ColumnValue, ConnectionConfig, DataSource, DatabaseType,
        ErrorKind, Result, TableData,
    };
    pub use crate::engine::{
        DumpArtifact, DumpEngine, DumpOptions, ExportArtifact, TabularExporter, ValueEncoder,
    };
    pub use crate::operations::{available_tables, export_table, full_backup};

    #[cfg(feature = "mysql")]
    pub use crate::backends::MysqlSource;
    #[cfg(feature = "sqlite")]
    pub use crate::backends::SqliteSource;
}

// Re-export at root level for convenience
pub use core::{
    BackupError, BackupSettings, ColumnValue, ConnectionConfig, DataSource, DatabaseType,
    ErrorKind, Result, TableData,
};
pub use engine::{DumpArtifact, DumpEngine, DumpOptions, ExportArtifact, TabularExporter};
