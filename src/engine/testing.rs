//! In-memory data source for engine tests

use crate::core::config::ConnectionConfig;
use crate::core::database::{quote_identifier, DataSource};
use crate::core::database_types::DatabaseType;
use crate::core::error::{BackupError, Result};
use crate::core::value::{ColumnValue, TableData};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

pub(crate) struct MemorySource {
    name: String,
    tables: Vec<(String, TableData)>,
    fail_list: bool,
    fail_fetch: Option<String>,
    snapshots_begun: AtomicUsize,
    snapshots_ended: AtomicUsize,
}

impl MemorySource {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tables: Vec::new(),
            fail_list: false,
            fail_fetch: None,
            snapshots_begun: AtomicUsize::new(0),
            snapshots_ended: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_table(mut self, name: &str, data: TableData) -> Self {
        self.tables.push((name.to_string(), data));
        self
    }

    pub(crate) fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub(crate) fn failing_fetch(mut self, table: &str) -> Self {
        self.fail_fetch = Some(table.to_string());
        self
    }

    pub(crate) fn snapshot_calls(&self) -> (usize, usize) {
        (
            self.snapshots_begun.load(Ordering::SeqCst),
            self.snapshots_ended.load(Ordering::SeqCst),
        )
    }

    fn table(&self, name: &str) -> Result<&TableData> {
        self.tables
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data)
            .ok_or_else(|| BackupError::query(name, "no such table"))
    }
}

/// `shop`: `log` (no rows) and `orders` (three rows, one NULL price, one apostrophe)
pub(crate) fn shop_source() -> MemorySource {
    let orders = TableData::new(
        vec!["id".into(), "name".into(), "price".into()],
        vec![
            vec![1.into(), "Widget".into(), ColumnValue::Numeric("9.99".into())],
            vec![2.into(), "O'Brien's Tea".into(), ColumnValue::Numeric("4.5".into())],
            vec![3.into(), "Gadget".into(), ColumnValue::Null],
        ],
    );
    let log = TableData::new(vec!["id".into(), "message".into()], vec![]);

    MemorySource::new("shop")
        .with_table("log", log)
        .with_table("orders", orders)
}

#[async_trait]
impl DataSource for MemorySource {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Mysql
    }

    fn database_name(&self) -> String {
        self.name.clone()
    }

    async fn connect(&self, _config: &ConnectionConfig) -> Result<()> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }

    async fn disconnect(&self) -> Result<()> {
        Ok(())
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        if self.fail_list {
            return Err(BackupError::connection("server has gone away"));
        }
        Ok(self.tables.iter().map(|(n, _)| n.clone()).collect())
    }

    async fn create_statement(&self, table: &str) -> Result<String> {
        let data = self.table(table)?;
        let columns: Vec<String> = data
            .columns
            .iter()
            .map(|c| format!("{} text", quote_identifier(c)))
            .collect();
        Ok(format!(
            "CREATE TABLE {} ({})",
            quote_identifier(table),
            columns.join(", ")
        ))
    }

    async fn fetch_table(&self, table: &str) -> Result<TableData> {
        if self.fail_fetch.as_deref() == Some(table) {
            return Err(BackupError::query(table, "lost connection during query"));
        }
        self.table(table).cloned()
    }

    async fn begin_snapshot(&self) -> Result<()> {
        self.snapshots_begun.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn end_snapshot(&self) -> Result<()> {
        self.snapshots_ended.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
