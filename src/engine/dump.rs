//! Full SQL dump
//!
//! Writes one self-contained script per run. For every table in enumeration
//! order the script carries a `DROP TABLE IF EXISTS`, the engine's own
//! `CREATE TABLE`, and for non-empty tables a single multi-row `INSERT`.
//! Foreign key checks are switched off once at the top and back on once at
//! the end so tables can be recreated in any order.

use super::artifact::{dump_file_name, ensure_dir, now_timestamp, PendingArtifact};
use super::encode::ValueEncoder;
use super::enumerate::list_tables;
use crate::core::database::{quote_identifier, DataSource};
use crate::core::database_types::DatabaseType;
use crate::core::error::{BackupError, Result};
use crate::core::value::TableData;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

/// Tuning for a dump run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpOptions {
    /// Read every table inside one read-consistent snapshot
    pub consistent_snapshot: bool,
}

/// Rows written for one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub rows: usize,
}

/// A completed dump
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DumpArtifact {
    pub path: PathBuf,
    pub database: String,
    pub timestamp: String,
    pub tables: Vec<TableSummary>,
}

impl DumpArtifact {
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }
}

/// Produces `FULL_BACKUP_<database>_<timestamp>.sql` artifacts
#[derive(Debug, Clone)]
pub struct DumpEngine {
    output_dir: PathBuf,
    options: DumpOptions,
}

impl DumpEngine {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            options: DumpOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DumpOptions) -> Self {
        self.options = options;
        self
    }

    /// Dump every table of `source`
    ///
    /// Any failure aborts the run and removes the partially written file.
    pub async fn run(&self, source: &dyn DataSource) -> Result<DumpArtifact> {
        let database = source.database_name();
        let timestamp = now_timestamp();
        tracing::info!(database = %database, "starting full SQL dump");

        ensure_dir(&self.output_dir).await?;
        let pending = PendingArtifact::new(&self.output_dir, &dump_file_name(&database, &timestamp));
        let partial = pending.partial_path().to_path_buf();
        let file = tokio::fs::File::create(&partial)
            .await
            .map_err(|e| BackupError::write(&partial, e))?;
        let mut writer = BufWriter::new(file);

        if self.options.consistent_snapshot {
            source.begin_snapshot().await?;
        }

        let written = write_script(source, &database, &timestamp, &mut writer, &partial).await;

        if self.options.consistent_snapshot {
            if let Err(e) = source.end_snapshot().await {
                if written.is_ok() {
                    return Err(e);
                }
                tracing::warn!(error = %e, "could not end snapshot after failed dump");
            }
        }

        let tables = written?;
        drop(writer);
        let path = pending.commit().await?;

        let artifact = DumpArtifact {
            path,
            database,
            timestamp,
            tables,
        };
        tracing::info!(
            path = %artifact.path.display(),
            tables = artifact.tables.len(),
            rows = artifact.total_rows(),
            "full SQL dump complete"
        );
        Ok(artifact)
    }
}

async fn write_script<W>(
    source: &dyn DataSource,
    database: &str,
    timestamp: &str,
    writer: &mut W,
    path: &Path,
) -> Result<Vec<TableSummary>>
where
    W: AsyncWrite + Unpin + Send,
{
    let dialect = source.database_type();
    let encoder = ValueEncoder::for_dialect(dialect);

    let tables = list_tables(source).await?;
    write_all(writer, path, &script_header(dialect, database, timestamp)).await?;

    let mut summaries = Vec::with_capacity(tables.len());
    for table in &tables {
        tracing::debug!(table = %table, "dumping table");
        let create = source.create_statement(table).await?;
        let data = source.fetch_table(table).await?;
        write_all(writer, path, &table_section(&encoder, table, &create, &data)).await?;
        summaries.push(TableSummary {
            name: table.clone(),
            rows: data.row_count(),
        });
    }

    write_all(writer, path, &script_footer(dialect)).await?;
    writer
        .flush()
        .await
        .map_err(|e| BackupError::write(path, e))?;
    Ok(summaries)
}

async fn write_all<W>(writer: &mut W, path: &Path, text: &str) -> Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    writer
        .write_all(text.as_bytes())
        .await
        .map_err(|e| BackupError::write(path, e))
}

// Line breaks in a name would end the comment early.
fn comment_safe(name: &str) -> String {
    name.replace(['\r', '\n'], " ")
}

/// Leading comments and the foreign key guard
pub fn script_header(dialect: DatabaseType, database: &str, timestamp: &str) -> String {
    format!(
        "-- Full backup of database `{}`\n-- Date: {}\n\n{}\n\n",
        comment_safe(database),
        timestamp,
        dialect.foreign_key_checks(false)
    )
}

/// Re-enables foreign key checks
pub fn script_footer(dialect: DatabaseType) -> String {
    format!("{}\n", dialect.foreign_key_checks(true))
}

/// Drop, create and (if any rows) insert statements for one table
///
/// Generated columns are left out of the insert, which then names the
/// columns it fills.
pub fn table_section(encoder: &ValueEncoder, table: &str, create: &str, data: &TableData) -> String {
    let ident = quote_identifier(table);
    let create = create.trim_end().trim_end_matches(';');

    let mut section = format!(
        "-- Structure for table {}\nDROP TABLE IF EXISTS {};\n{};\n\n",
        comment_safe(&ident),
        ident,
        create
    );
    let insert = if data.has_generated() {
        let stored = data.without_generated();
        encoder.insert_statement(table, Some(stored.columns.as_slice()), &stored.rows)
    } else {
        encoder.insert_statement(table, None, &data.rows)
    };
    if let Some(insert) = insert {
        section.push_str(&format!(
            "-- Data for table {}\n{}\n\n",
            comment_safe(&ident),
            insert
        ));
    }
    section
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::core::value::ColumnValue;
    use crate::engine::testing::{shop_source, MemorySource};

    fn read_single_file(dir: &Path) -> (PathBuf, String) {
        let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(entries.len(), 1, "expected exactly one artifact: {:?}", entries);
        let path = entries.remove(0);
        let text = std::fs::read_to_string(&path).unwrap();
        (path, text)
    }

    #[test]
    fn test_table_section_without_rows() {
        let data = TableData::new(vec!["id".into()], vec![]);
        let section = table_section(&ValueEncoder::MYSQL, "log", "CREATE TABLE `log` (id int)", &data);
        assert_eq!(
            section,
            "-- Structure for table `log`\nDROP TABLE IF EXISTS `log`;\nCREATE TABLE `log` (id int);\n\n"
        );
    }

    #[test]
    fn test_table_section_strips_existing_terminator() {
        let data = TableData::default();
        let section = table_section(&ValueEncoder::MYSQL, "t", "CREATE TABLE t (a int);\n", &data);
        assert!(section.contains("CREATE TABLE t (a int);\n"));
        assert!(!section.contains(";;"));
    }

    #[tokio::test]
    async fn test_shop_dump() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let source = shop_source();

        let artifact = DumpEngine::new(dir.path()).run(&source).await?;
        let (path, text) = read_single_file(dir.path());
        assert_eq!(path, artifact.path);

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("FULL_BACKUP_shop_"));
        assert!(name.ends_with(".sql"));

        assert!(text.contains("SET FOREIGN_KEY_CHECKS=0;"));
        assert!(text.trim_end().ends_with("SET FOREIGN_KEY_CHECKS=1;"));
        assert_eq!(text.matches("SET FOREIGN_KEY_CHECKS").count(), 2);

        assert!(text.contains("DROP TABLE IF EXISTS `log`;\nCREATE TABLE `log`"));
        assert!(!text.contains("INSERT INTO `log`"));

        assert_eq!(text.matches("INSERT INTO `orders`").count(), 1);
        assert!(text.contains(
            "INSERT INTO `orders` VALUES \n(1, 'Widget', 9.99),\n(2, 'O''Brien''s Tea', 4.5),\n(3, 'Gadget', NULL);"
        ));

        assert_eq!(
            artifact.tables,
            vec![
                TableSummary { name: "log".into(), rows: 0 },
                TableSummary { name: "orders".into(), rows: 3 },
            ]
        );
        assert_eq!(artifact.total_rows(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_sections_follow_enumeration_order() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let source = MemorySource::new("ordered")
            .with_table("zeta", TableData::default())
            .with_table("alpha", TableData::default());

        DumpEngine::new(dir.path()).run(&source).await?;
        let (_, text) = read_single_file(dir.path());
        let zeta = text.find("DROP TABLE IF EXISTS `zeta`").unwrap();
        let alpha = text.find("DROP TABLE IF EXISTS `alpha`").unwrap();
        assert!(zeta < alpha);
        Ok(())
    }

    #[tokio::test]
    async fn test_read_failure_leaves_no_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let source = shop_source().failing_fetch("orders");

        let err = DumpEngine::new(dir.path()).run(&source).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::QueryFailure);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_enumeration_failure_is_surfaced() {
        let dir = tempfile::tempdir().unwrap();
        let source = shop_source().failing_list();

        let err = DumpEngine::new(dir.path()).run(&source).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConnectionFailure);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_snapshot_is_always_ended() {
        let dir = tempfile::tempdir().unwrap();
        let options = DumpOptions {
            consistent_snapshot: true,
        };

        let source = shop_source();
        DumpEngine::new(dir.path())
            .with_options(options)
            .run(&source)
            .await
            .unwrap();
        assert_eq!(source.snapshot_calls(), (1, 1));

        let failing = shop_source().failing_fetch("orders");
        let other = tempfile::tempdir().unwrap();
        assert!(DumpEngine::new(other.path())
            .with_options(options)
            .run(&failing)
            .await
            .is_err());
        assert_eq!(failing.snapshot_calls(), (1, 1));
    }

    #[tokio::test]
    async fn test_empty_database() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let source = MemorySource::new("blank");

        let artifact = DumpEngine::new(dir.path()).run(&source).await?;
        assert!(artifact.tables.is_empty());
        let (_, text) = read_single_file(dir.path());
        assert!(!text.contains("DROP TABLE"));
        assert!(text.ends_with("SET FOREIGN_KEY_CHECKS=1;\n"));
        Ok(())
    }

    #[tokio::test]
    async fn test_unwritable_destination() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"").unwrap();

        let err = DumpEngine::new(&blocker).run(&shop_source()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WriteFailure);
    }

    #[test]
    fn test_numeric_and_null_never_quoted() {
        let data = TableData::new(
            vec!["a".into(), "b".into()],
            vec![vec![ColumnValue::Numeric("0.25".into()), ColumnValue::Null]],
        );
        let section = table_section(&ValueEncoder::MYSQL, "t", "CREATE TABLE t (a double, b text)", &data);
        assert!(section.contains("(0.25, NULL);"));
    }

    #[test]
    fn test_generated_columns_are_not_inserted() {
        let data = TableData::new(
            vec!["a".into(), "b".into()],
            vec![vec![1.into(), 2.into()], vec![5.into(), 10.into()]],
        )
        .with_generated(vec!["b".into()]);
        let section = table_section(
            &ValueEncoder::MYSQL,
            "g",
            "CREATE TABLE `g` (`a` int, `b` int GENERATED ALWAYS AS (`a` * 2) VIRTUAL)",
            &data,
        );
        assert!(section.contains("INSERT INTO `g` (`a`) VALUES \n(1),\n(5);"));
    }

    #[test]
    fn test_binary_cells_written_as_hex() {
        let data = TableData::new(
            vec!["id".into(), "raw".into()],
            vec![vec![1.into(), ColumnValue::Binary(vec![0x00, 0xff, 0x41])]],
        );
        let section = table_section(&ValueEncoder::MYSQL, "b", "CREATE TABLE b (id int, raw blob)", &data);
        assert!(section.contains("INSERT INTO `b` VALUES \n(1, X'00FF41');"));
    }
}
