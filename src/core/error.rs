//! Error types for the backup system
//!
//! This module defines all error types that can occur while enumerating,
//! dumping or exporting a database.

use std::path::{Path, PathBuf};

/// Result type alias for backup operations
pub type Result<T> = std::result::Result<T, BackupError>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Coarse classification of a [`BackupError`], suitable for operator tooling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ConnectionFailure,
    QueryFailure,
    UnknownTable,
    WriteFailure,
    InvalidConfig,
    UnsupportedDatabase,
}

/// Error types for backup operations
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    /// The database could not be reached, authenticated against, or is not connected
    #[error("Connection failure: {message}")]
    ConnectionFailure {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// A read or metadata request failed on an established connection
    #[error("Query failure ({context}): {message}")]
    QueryFailure {
        context: String,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Export requested against a table absent from the current enumeration
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// The destination artifact could not be created or written
    #[error("Write failure on {}: {source}", .path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Connection settings are missing or malformed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The requested backend is unknown or was not compiled in
    #[error("Unsupported database: {0}")]
    UnsupportedDatabase(String),
}

impl BackupError {
    /// Create a connection failure without an underlying cause
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        BackupError::ConnectionFailure {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a connection failure wrapping a driver error
    pub fn connection_with_source<S, E>(msg: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let message = format!("{}: {}", msg.into(), source);
        BackupError::ConnectionFailure {
            message,
            source: Some(Box::new(source)),
        }
    }

    /// Create a query failure without an underlying cause
    pub fn query<C: Into<String>, S: Into<String>>(context: C, msg: S) -> Self {
        BackupError::QueryFailure {
            context: context.into(),
            message: msg.into(),
            source: None,
        }
    }

    /// Create a query failure wrapping a driver error
    pub fn query_with_source<C, E>(context: C, source: E) -> Self
    where
        C: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        BackupError::QueryFailure {
            context: context.into(),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an unknown table error
    pub fn unknown_table<S: Into<String>>(table: S) -> Self {
        BackupError::UnknownTable(table.into())
    }

    /// Create a write failure for the given destination
    pub fn write(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        BackupError::WriteFailure {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        BackupError::InvalidConfig(msg.into())
    }

    /// Create an unsupported database error
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        BackupError::UnsupportedDatabase(msg.into())
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            BackupError::ConnectionFailure { .. } => ErrorKind::ConnectionFailure,
            BackupError::QueryFailure { .. } => ErrorKind::QueryFailure,
            BackupError::UnknownTable(_) => ErrorKind::UnknownTable,
            BackupError::WriteFailure { .. } => ErrorKind::WriteFailure,
            BackupError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            BackupError::UnsupportedDatabase(_) => ErrorKind::UnsupportedDatabase,
        }
    }
}
