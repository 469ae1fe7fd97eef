//! SQLite data source implementation
//!
//! This module provides a SQLite implementation of the DataSource trait.
//! The database file is opened read-only; blocking driver calls run on the
//! blocking thread pool.

use crate::core::{
    config::ConnectionConfig,
    database::{quote_identifier, DataSource},
    database_types::DatabaseType,
    error::{BackupError, Result},
    value::{ColumnValue, Row, TableData},
};
use async_trait::async_trait;
use parking_lot::Mutex as SyncMutex;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::sync::Arc;
use tokio::sync::Mutex;

const LIST_TABLES_SQL: &str = "SELECT name FROM sqlite_master \
     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name";

const CREATE_STATEMENT_SQL: &str =
    "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1";

// hidden = 2 (virtual) or 3 (stored) marks generated columns.
const GENERATED_COLUMNS_SQL: &str =
    "SELECT name FROM pragma_table_xinfo(?1) WHERE hidden IN (2, 3)";

// Implicit indexes (UNIQUE, PRIMARY KEY) have no sql and come back with the table.
const INDEX_STATEMENTS_SQL: &str = "SELECT sql FROM sqlite_master \
     WHERE type = 'index' AND tbl_name = ?1 AND sql IS NOT NULL ORDER BY name";

/// SQLite data source
pub struct SqliteSource {
    connection: Arc<Mutex<Option<Connection>>>,
    name: SyncMutex<String>,
}

impl SqliteSource {
    /// Create a new, unconnected SQLite source
    pub fn new() -> Self {
        Self {
            connection: Arc::new(Mutex::new(None)),
            name: SyncMutex::new(String::new()),
        }
    }

    /// Tag a SQLite cell by its storage class
    fn to_column_value(value: ValueRef<'_>) -> ColumnValue {
        match value {
            ValueRef::Null => ColumnValue::Null,
            ValueRef::Integer(v) => ColumnValue::from(v),
            ValueRef::Real(v) => ColumnValue::from_f64(v),
            ValueRef::Text(v) => ColumnValue::Text(String::from_utf8_lossy(v).into_owned()),
            ValueRef::Blob(v) => ColumnValue::Binary(v.to_vec()),
        }
    }

    /// Run `f` against the open connection on the blocking pool
    async fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let connection_arc = Arc::clone(&self.connection);

        tokio::task::spawn_blocking(move || -> Result<T> {
            let connection = connection_arc.blocking_lock();
            let conn = connection
                .as_ref()
                .ok_or_else(|| BackupError::connection("Not connected to database"))?;
            f(conn)
        })
        .await
        .map_err(|e| BackupError::connection(format!("Task join error: {}", e)))?
    }
}

impl Default for SqliteSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for SqliteSource {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Sqlite
    }

    fn database_name(&self) -> String {
        self.name.lock().clone()
    }

    async fn connect(&self, config: &ConnectionConfig) -> Result<()> {
        // Clean up any existing connection first
        {
            let mut connection = self.connection.lock().await;
            *connection = None;
        }

        let path = config.database.clone();
        let connection_arc = Arc::clone(&self.connection);

        tokio::task::spawn_blocking(move || -> Result<()> {
            let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX;
            let conn = Connection::open_with_flags(&path, flags).map_err(|e| {
                BackupError::connection_with_source(format!("cannot open '{}'", path), e)
            })?;

            let mut connection = connection_arc.blocking_lock();
            *connection = Some(conn);
            Ok(())
        })
        .await
        .map_err(|e| BackupError::connection(format!("Task join error: {}", e)))??;

        *self.name.lock() = config.display_name();
        tracing::debug!(database = %config.database, "opened sqlite source read-only");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connection
            .try_lock()
            .map(|conn| conn.is_some())
            .unwrap_or(false)
    }

    async fn disconnect(&self) -> Result<()> {
        let mut connection = self.connection.lock().await;
        *connection = None;
        Ok(())
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        self.with_connection(|conn| {
            let mut stmt = conn
                .prepare(LIST_TABLES_SQL)
                .map_err(|e| BackupError::query_with_source("list tables", e))?;
            let names = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
                .map_err(|e| BackupError::query_with_source("list tables", e))?;
            Ok(names)
        })
        .await
    }

    async fn create_statement(&self, table: &str) -> Result<String> {
        let table = table.to_string();
        self.with_connection(move |conn| {
            let context = format!("create statement for {}", quote_identifier(&table));
            let sql: Option<String> = conn
                .query_row(CREATE_STATEMENT_SQL, [&table], |row| row.get(0))
                .map_err(|e| BackupError::query_with_source(context.clone(), e))?;
            let mut statements =
                vec![sql.ok_or_else(|| BackupError::query(context.clone(), "engine reported no definition"))?];

            let mut stmt = conn
                .prepare(INDEX_STATEMENTS_SQL)
                .map_err(|e| BackupError::query_with_source(context.clone(), e))?;
            let indexes = stmt
                .query_map([&table], |row| row.get::<_, String>(0))
                .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
                .map_err(|e| BackupError::query_with_source(context, e))?;
            statements.extend(indexes);

            Ok(statements.join(";\n"))
        })
        .await
    }

    async fn fetch_table(&self, table: &str) -> Result<TableData> {
        let sql = format!("SELECT * FROM {}", quote_identifier(table));
        let table = table.to_string();
        self.with_connection(move |conn| {
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| BackupError::query_with_source(sql.clone(), e))?;
            let columns: Vec<String> = stmt
                .column_names()
                .into_iter()
                .map(str::to_string)
                .collect();
            let column_count = columns.len();

            let mut rows = stmt
                .query([])
                .map_err(|e| BackupError::query_with_source(sql.clone(), e))?;
            let mut data: Vec<Row> = Vec::new();
            while let Some(row) = rows
                .next()
                .map_err(|e| BackupError::query_with_source(sql.clone(), e))?
            {
                let mut values = Vec::with_capacity(column_count);
                for i in 0..column_count {
                    let value = row
                        .get_ref(i)
                        .map_err(|e| BackupError::query_with_source(sql.clone(), e))?;
                    values.push(Self::to_column_value(value));
                }
                data.push(values);
            }
            drop(rows);

            let mut stmt = conn
                .prepare(GENERATED_COLUMNS_SQL)
                .map_err(|e| BackupError::query_with_source(GENERATED_COLUMNS_SQL, e))?;
            let generated = stmt
                .query_map([&table], |row| row.get::<_, String>(0))
                .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
                .map_err(|e| BackupError::query_with_source(GENERATED_COLUMNS_SQL, e))?;

            Ok(TableData::new(columns, data).with_generated(generated))
        })
        .await
    }

    async fn begin_snapshot(&self) -> Result<()> {
        self.with_connection(|conn| {
            conn.execute_batch("BEGIN")
                .map_err(|e| BackupError::query_with_source("begin snapshot", e))
        })
        .await
    }

    async fn end_snapshot(&self) -> Result<()> {
        self.with_connection(|conn| {
            if conn.is_autocommit() {
                return Ok(());
            }
            conn.execute_batch("COMMIT")
                .map_err(|e| BackupError::query_with_source("end snapshot", e))
        })
        .await
    }
}
