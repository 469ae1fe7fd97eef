//! Database type definitions
//!
//! This module defines the source engines the dump engine can read from, and
//! the dialect details the generated script depends on.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported source database types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    /// MySQL/MariaDB database
    #[default]
    Mysql,
    /// SQLite database file
    Sqlite,
}

impl DatabaseType {
    /// Convert database type to string representation
    pub fn to_str(&self) -> &'static str {
        match self {
            DatabaseType::Mysql => "mysql",
            DatabaseType::Sqlite => "sqlite",
        }
    }

    /// Default TCP port, if the engine is reached over the network
    pub fn default_port(&self) -> Option<u16> {
        match self {
            DatabaseType::Mysql => Some(3306),
            DatabaseType::Sqlite => None,
        }
    }

    /// Statement toggling foreign key enforcement for a replayed script
    pub fn foreign_key_checks(&self, enabled: bool) -> &'static str {
        match (self, enabled) {
            (DatabaseType::Mysql, false) => "SET FOREIGN_KEY_CHECKS=0;",
            (DatabaseType::Mysql, true) => "SET FOREIGN_KEY_CHECKS=1;",
            (DatabaseType::Sqlite, false) => "PRAGMA foreign_keys=OFF;",
            (DatabaseType::Sqlite, true) => "PRAGMA foreign_keys=ON;",
        }
    }

    /// Whether a backslash inside a string literal is an escape character
    pub fn backslash_escapes(&self) -> bool {
        matches!(self, DatabaseType::Mysql)
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for DatabaseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(DatabaseType::Mysql),
            "sqlite" | "sqlite3" => Ok(DatabaseType::Sqlite),
            _ => Err(format!("Invalid database type: '{}'", s)),
        }
    }
}
