//! Connection configuration
//!
//! Settings are resolved once by the caller and handed to connection
//! acquisition; nothing below this layer reads the process environment.

use super::database_types::DatabaseType;
use super::error::{BackupError, Result};
use std::path::{Path, PathBuf};

/// Default directory artifacts are written to
pub const DEFAULT_OUTPUT_DIR: &str = "backups";

/// Parameters needed to open a source database
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub db_type: DatabaseType,
    pub host: String,
    pub port: u16,
    /// Database name (MySQL) or file path (SQLite)
    pub database: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("db_type", &self.db_type)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl ConnectionConfig {
    /// Start building a configuration for the specified database type
    pub fn builder(db_type: DatabaseType) -> ConnectionBuilder {
        ConnectionBuilder::new(db_type)
    }

    /// Resolve from the process environment
    ///
    /// Reads `mysql_host`, `mysql_port`, `mysql_user`, `mysql_password`,
    /// `mysql_database` and the optional `BACKUP_DB_TYPE`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_type = match lookup("BACKUP_DB_TYPE") {
            Some(raw) => raw.parse::<DatabaseType>().map_err(BackupError::config)?,
            None => DatabaseType::Mysql,
        };

        let mut builder = ConnectionBuilder::new(db_type);
        if let Some(host) = lookup("mysql_host") {
            builder = builder.host(host);
        }
        if let Some(port) = lookup("mysql_port") {
            let port = port
                .trim()
                .parse::<u16>()
                .map_err(|_| BackupError::config(format!("mysql_port is not a port: '{}'", port)))?;
            builder = builder.port(port);
        }
        if let Some(user) = lookup("mysql_user") {
            builder = builder.username(user);
        }
        if let Some(password) = lookup("mysql_password") {
            builder = builder.password(password);
        }
        if let Some(database) = lookup("mysql_database") {
            builder = builder.database(database);
        }

        builder.build()
    }

    /// Check the configuration is usable before a connection is attempted
    pub fn validate(&self) -> Result<()> {
        if self.database.trim().is_empty() {
            return Err(BackupError::config("database name is required"));
        }
        if self.db_type == DatabaseType::Mysql {
            if self.host.trim().is_empty() {
                return Err(BackupError::config("host is required for mysql"));
            }
            if self.port == 0 {
                return Err(BackupError::config("port must be non-zero"));
            }
        }
        Ok(())
    }

    /// Name used for artifact naming and logging
    ///
    /// For SQLite this is the file stem of the database path.
    pub fn display_name(&self) -> String {
        match self.db_type {
            DatabaseType::Mysql => self.database.clone(),
            DatabaseType::Sqlite => Path::new(&self.database)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.database.clone()),
        }
    }
}

/// Builder for [`ConnectionConfig`]
pub struct ConnectionBuilder {
    db_type: DatabaseType,
    host: Option<String>,
    port: Option<u16>,
    database: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

impl ConnectionBuilder {
    /// Create a new connection builder for the specified database type
    pub fn new(db_type: DatabaseType) -> Self {
        Self {
            db_type,
            host: None,
            port: None,
            database: None,
            username: None,
            password: None,
        }
    }

    /// Set the database host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the database port
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the database name, or the file path for SQLite
    pub fn database<S: Into<String>>(mut self, database: S) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set the username
    pub fn username<S: Into<String>>(mut self, username: S) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the password
    pub fn password<S: Into<String>>(mut self, password: S) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Fill defaults and validate
    pub fn build(self) -> Result<ConnectionConfig> {
        let config = ConnectionConfig {
            db_type: self.db_type,
            host: self.host.unwrap_or_else(|| "localhost".to_string()),
            port: self
                .port
                .or(self.db_type.default_port())
                .unwrap_or_default(),
            database: self.database.unwrap_or_default(),
            username: self.username.unwrap_or_else(|| "root".to_string()),
            password: self.password.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Where artifacts go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSettings {
    pub output_dir: PathBuf,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl BackupSettings {
    /// `BACKUP_DIR` if set, else [`DEFAULT_OUTPUT_DIR`]
    pub fn from_env() -> Self {
        std::env::var_os("BACKUP_DIR")
            .map(|dir| Self {
                output_dir: PathBuf::from(dir),
            })
            .unwrap_or_default()
    }
}
