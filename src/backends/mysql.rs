//! MySQL data source implementation
//!
//! This module provides a MySQL/MariaDB implementation of the DataSource trait
//! using mysql_async. Rows are read over the text protocol, so the tag of a
//! cell comes from its column metadata rather than from the wire value.

use crate::core::{
    config::ConnectionConfig,
    database::{quote_identifier, DataSource},
    database_types::DatabaseType,
    error::{BackupError, Result},
    value::{ColumnValue, Row, TableData},
};
use async_trait::async_trait;
use mysql_async::consts::ColumnType;
use mysql_async::prelude::*;
use mysql_async::{Column, Conn, OptsBuilder, Value};
use parking_lot::Mutex as SyncMutex;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Collation id of the `binary` character set
const BINARY_CHARSET: u16 = 63;

// DEFAULT_GENERATED only marks expression defaults; those columns take inserts.
const GENERATED_COLUMNS_SQL: &str = "SELECT COLUMN_NAME FROM information_schema.COLUMNS \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? \
     AND (EXTRA LIKE '%VIRTUAL GENERATED%' OR EXTRA LIKE '%STORED GENERATED%' \
     OR EXTRA LIKE '%PERSISTENT GENERATED%') \
     ORDER BY ORDINAL_POSITION";

/// How the cells of one result column are tagged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CellKind {
    Numeric,
    Text,
    Binary,
}

/// MySQL data source
pub struct MysqlSource {
    conn: Arc<Mutex<Option<Conn>>>,
    name: SyncMutex<String>,
}

impl MysqlSource {
    /// Create a new, unconnected MySQL source
    pub fn new() -> Self {
        Self {
            conn: Arc::new(Mutex::new(None)),
            name: SyncMutex::new(String::new()),
        }
    }

    /// Whether values of this column type are written unquoted
    pub(crate) fn is_numeric_type(column_type: ColumnType) -> bool {
        matches!(
            column_type,
            ColumnType::MYSQL_TYPE_TINY
                | ColumnType::MYSQL_TYPE_SHORT
                | ColumnType::MYSQL_TYPE_LONG
                | ColumnType::MYSQL_TYPE_INT24
                | ColumnType::MYSQL_TYPE_LONGLONG
                | ColumnType::MYSQL_TYPE_FLOAT
                | ColumnType::MYSQL_TYPE_DOUBLE
                | ColumnType::MYSQL_TYPE_DECIMAL
                | ColumnType::MYSQL_TYPE_NEWDECIMAL
                | ColumnType::MYSQL_TYPE_YEAR
        )
    }

    /// Whether this column type holds byte strings
    fn is_string_type(column_type: ColumnType) -> bool {
        matches!(
            column_type,
            ColumnType::MYSQL_TYPE_STRING
                | ColumnType::MYSQL_TYPE_VAR_STRING
                | ColumnType::MYSQL_TYPE_VARCHAR
                | ColumnType::MYSQL_TYPE_TINY_BLOB
                | ColumnType::MYSQL_TYPE_MEDIUM_BLOB
                | ColumnType::MYSQL_TYPE_LONG_BLOB
                | ColumnType::MYSQL_TYPE_BLOB
                | ColumnType::MYSQL_TYPE_BIT
                | ColumnType::MYSQL_TYPE_GEOMETRY
        )
    }

    /// Classify a column from its type and character set
    ///
    /// Numeric and temporal columns also report the binary character set, so
    /// only string-like types are treated as raw bytes.
    pub(crate) fn cell_kind(column_type: ColumnType, charset: u16) -> CellKind {
        if Self::is_numeric_type(column_type) {
            CellKind::Numeric
        } else if charset == BINARY_CHARSET && Self::is_string_type(column_type) {
            CellKind::Binary
        } else {
            CellKind::Text
        }
    }

    fn column_kind(column: &Column) -> CellKind {
        Self::cell_kind(column.column_type(), column.character_set())
    }

    /// Tag a wire value, given the kind of its column
    pub(crate) fn to_column_value(value: &Value, kind: CellKind) -> ColumnValue {
        match value {
            Value::NULL => ColumnValue::Null,
            Value::Int(v) => ColumnValue::from(*v),
            Value::UInt(v) => ColumnValue::from(*v),
            Value::Float(v) => ColumnValue::from_f64(f64::from(*v)),
            Value::Double(v) => ColumnValue::from_f64(*v),
            Value::Bytes(bytes) => match kind {
                CellKind::Binary => ColumnValue::Binary(bytes.clone()),
                CellKind::Numeric => {
                    ColumnValue::Numeric(String::from_utf8_lossy(bytes).into_owned())
                }
                CellKind::Text => ColumnValue::Text(String::from_utf8_lossy(bytes).into_owned()),
            },
            Value::Date(year, month, day, hour, minute, second, micros) => {
                let mut text = format!(
                    "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                    year, month, day, hour, minute, second
                );
                if *micros > 0 {
                    text.push_str(&format!(".{:06}", micros));
                }
                ColumnValue::Text(text)
            }
            Value::Time(negative, days, hours, minutes, seconds, micros) => {
                let total_hours = u32::from(*hours) + days * 24;
                let mut text = format!(
                    "{}{:02}:{:02}:{:02}",
                    if *negative { "-" } else { "" },
                    total_hours,
                    minutes,
                    seconds
                );
                if *micros > 0 {
                    text.push_str(&format!(".{:06}", micros));
                }
                ColumnValue::Text(text)
            }
        }
    }

    fn not_connected() -> BackupError {
        BackupError::connection("Not connected to database")
    }
}

impl Default for MysqlSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for MysqlSource {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Mysql
    }

    fn database_name(&self) -> String {
        self.name.lock().clone()
    }

    async fn connect(&self, config: &ConnectionConfig) -> Result<()> {
        // Clean up any existing connection first
        self.disconnect().await?;

        let opts = OptsBuilder::default()
            .ip_or_hostname(config.host.clone())
            .tcp_port(config.port)
            .user(Some(config.username.clone()))
            .pass(Some(config.password.clone()))
            .db_name(Some(config.database.clone()))
            .prefer_socket(false);

        let conn = Conn::new(opts).await.map_err(|e| {
            BackupError::connection_with_source(
                format!("cannot reach {}:{}", config.host, config.port),
                e,
            )
        })?;

        *self.conn.lock().await = Some(conn);
        *self.name.lock() = config.display_name();
        tracing::debug!(host = %config.host, port = config.port, "connected to mysql");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.conn
            .try_lock()
            .map(|conn| conn.is_some())
            .unwrap_or(false)
    }

    async fn disconnect(&self) -> Result<()> {
        let conn = self.conn.lock().await.take();
        if let Some(conn) = conn {
            conn.disconnect()
                .await
                .map_err(|e| BackupError::connection_with_source("disconnect", e))?;
        }
        Ok(())
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(Self::not_connected)?;

        let tables: Vec<(String, String)> = conn
            .query("SHOW FULL TABLES")
            .await
            .map_err(|e| BackupError::query_with_source("SHOW FULL TABLES", e))?;

        Ok(tables
            .into_iter()
            .filter(|(_, kind)| kind == "BASE TABLE")
            .map(|(name, _)| name)
            .collect())
    }

    async fn create_statement(&self, table: &str) -> Result<String> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(Self::not_connected)?;

        let sql = format!("SHOW CREATE TABLE {}", quote_identifier(table));
        let row: Option<(String, String)> = conn
            .query_first(sql.as_str())
            .await
            .map_err(|e| BackupError::query_with_source(sql.clone(), e))?;

        row.map(|(_, create)| create)
            .ok_or_else(|| BackupError::query(sql, "engine reported no definition"))
    }

    async fn fetch_table(&self, table: &str) -> Result<TableData> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(Self::not_connected)?;

        let generated: Vec<String> = conn
            .exec(GENERATED_COLUMNS_SQL, (table.to_string(),))
            .await
            .map_err(|e| BackupError::query_with_source(GENERATED_COLUMNS_SQL, e))?;

        let sql = format!("SELECT * FROM {}", quote_identifier(table));
        let mut result = conn
            .query_iter(sql.as_str())
            .await
            .map_err(|e| BackupError::query_with_source(sql.clone(), e))?;

        let columns = result.columns().map(|c| c.to_vec()).unwrap_or_default();
        let kinds: Vec<CellKind> = columns.iter().map(Self::column_kind).collect();
        let names: Vec<String> = columns.iter().map(|c| c.name_str().into_owned()).collect();

        let raw_rows: Vec<mysql_async::Row> = result
            .collect()
            .await
            .map_err(|e| BackupError::query_with_source(sql.clone(), e))?;

        let mut rows: Vec<Row> = Vec::with_capacity(raw_rows.len());
        for raw in &raw_rows {
            let mut values = Vec::with_capacity(names.len());
            for (i, kind) in kinds.iter().enumerate() {
                let value = raw
                    .as_ref(i)
                    .ok_or_else(|| BackupError::query(sql.clone(), "row shorter than column list"))?;
                values.push(Self::to_column_value(value, *kind));
            }
            rows.push(values);
        }

        Ok(TableData::new(names, rows).with_generated(generated))
    }

    async fn begin_snapshot(&self) -> Result<()> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(Self::not_connected)?;
        conn.query_drop("START TRANSACTION WITH CONSISTENT SNAPSHOT, READ ONLY")
            .await
            .map_err(|e| BackupError::query_with_source("begin snapshot", e))
    }

    async fn end_snapshot(&self) -> Result<()> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(Self::not_connected)?;
        conn.query_drop("COMMIT")
            .await
            .map_err(|e| BackupError::query_with_source("end snapshot", e))
    }
}
