//! Data source backend implementations
//!
//! This module contains concrete implementations of the DataSource trait
//! for various database systems.

#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "mysql")]
pub use mysql::MysqlSource;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteSource;

use crate::core::{BackupError, ConnectionConfig, DataSource, DatabaseType, Result};

/// Create the backend for `db_type`, unconnected
pub fn source_for(db_type: DatabaseType) -> Result<Box<dyn DataSource>> {
    match db_type {
        #[cfg(feature = "mysql")]
        DatabaseType::Mysql => Ok(Box::new(MysqlSource::new())),
        #[cfg(feature = "sqlite")]
        DatabaseType::Sqlite => Ok(Box::new(SqliteSource::new())),
        #[allow(unreachable_patterns)]
        other => Err(BackupError::unsupported(format!(
            "{} support was not compiled in",
            other
        ))),
    }
}

/// Create and connect the backend described by `config`
pub async fn open(config: &ConnectionConfig) -> Result<Box<dyn DataSource>> {
    config.validate()?;
    let source = source_for(config.db_type)?;
    source.connect(config).await?;
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "mysql"))]
    #[test]
    fn test_mysql_not_compiled_in() {
        let err = source_for(DatabaseType::Mysql).err().unwrap();
        assert_eq!(err.kind(), crate::core::ErrorKind::UnsupportedDatabase);
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_sqlite_backend_selected() {
        let source = source_for(DatabaseType::Sqlite).unwrap();
        assert_eq!(source.database_type(), DatabaseType::Sqlite);
        assert!(!source.is_connected());
    }
}
