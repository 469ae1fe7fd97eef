//! Core backup system types and traits
//!
//! This module provides the fundamental building blocks: error types, the
//! data source trait, value types, configuration and scoped connections.

pub mod config;
pub mod database;
pub mod database_types;
pub mod error;
pub mod session;
pub mod value;

// Re-export commonly used types
pub use config::{BackupSettings, ConnectionBuilder, ConnectionConfig};
pub use database::{quote_identifier, DataSource};
pub use database_types::DatabaseType;
pub use error::{BackupError, ErrorKind, Result};
pub use session::with_source;
pub use value::{ColumnValue, Row, TableData};
