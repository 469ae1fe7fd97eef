//! Artifact naming and write-once file handling
//!
//! Artifacts are written to a `.partial` sibling and only renamed into place
//! once fully flushed. A [`PendingArtifact`] dropped without
//! [`PendingArtifact::commit`] removes its partial file, so an aborted run
//! never leaves a file that looks complete.

use crate::core::error::{BackupError, Result};
use chrono::{DateTime, Local, TimeZone};
use std::path::{Path, PathBuf};

/// Timestamp format embedded in artifact names
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

const PARTIAL_SUFFIX: &str = ".partial";

/// Format an instant for artifact names
pub fn timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Local wall-clock timestamp for artifact names
pub fn now_timestamp() -> String {
    timestamp(&Local::now())
}

/// `FULL_BACKUP_<database>_<timestamp>.sql`
pub fn dump_file_name(database: &str, timestamp: &str) -> String {
    format!("FULL_BACKUP_{}_{}.sql", sanitize(database), timestamp)
}

/// `EXPORT_<table>_<timestamp>.csv`
pub fn export_file_name(table: &str, timestamp: &str) -> String {
    format!("EXPORT_{}_{}.csv", sanitize(table), timestamp)
}

// Path separators would escape the output directory.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            other => other,
        })
        .collect()
}

/// Create the output directory if it does not exist
pub async fn ensure_dir(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| BackupError::write(dir, e))
}

/// An artifact being written
pub struct PendingArtifact {
    final_path: PathBuf,
    partial_path: PathBuf,
    committed: bool,
}

impl PendingArtifact {
    /// Reserve `dir/file_name`; writes go to a partial sibling
    pub fn new(dir: &Path, file_name: &str) -> Self {
        let final_path = dir.join(file_name);
        let partial_path = dir.join(format!("{}{}", file_name, PARTIAL_SUFFIX));
        Self {
            final_path,
            partial_path,
            committed: false,
        }
    }

    /// Path the in-progress data is written to
    pub fn partial_path(&self) -> &Path {
        &self.partial_path
    }

    /// Move the partial file into place
    pub async fn commit(mut self) -> Result<PathBuf> {
        tokio::fs::rename(&self.partial_path, &self.final_path)
            .await
            .map_err(|e| BackupError::write(&self.final_path, e))?;
        self.committed = true;
        Ok(self.final_path.clone())
    }
}

impl Drop for PendingArtifact {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match std::fs::remove_file(&self.partial_path) {
            Ok(()) => {
                tracing::warn!(path = %self.partial_path.display(), "removed incomplete artifact");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    path = %self.partial_path.display(),
                    error = %e,
                    "could not remove incomplete artifact"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(timestamp(&at), "2024-03-09_07-05-01");
        assert_eq!(now_timestamp().len(), "YYYY-MM-DD_HH-MM-SS".len());
    }

    #[test]
    fn test_file_names() {
        assert_eq!(
            dump_file_name("shop", "2024-03-09_07-05-01"),
            "FULL_BACKUP_shop_2024-03-09_07-05-01.sql"
        );
        assert_eq!(
            export_file_name("orders", "2024-03-09_07-05-01"),
            "EXPORT_orders_2024-03-09_07-05-01.csv"
        );
        assert_eq!(export_file_name("a/b", "t"), "EXPORT_a_b_t.csv");
    }

    #[tokio::test]
    async fn test_commit_moves_partial() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let pending = PendingArtifact::new(dir.path(), "out.sql");
        tokio::fs::write(pending.partial_path(), b"data").await.unwrap();

        let path = pending.commit().await?;
        assert_eq!(path, dir.path().join("out.sql"));
        assert!(path.exists());
        assert!(!dir.path().join("out.sql.partial").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_drop_removes_partial() {
        let dir = tempfile::tempdir().unwrap();
        {
            let pending = PendingArtifact::new(dir.path(), "out.sql");
            tokio::fs::write(pending.partial_path(), b"half").await.unwrap();
        }
        assert!(!dir.path().join("out.sql.partial").exists());
        assert!(!dir.path().join("out.sql").exists());
    }

    #[tokio::test]
    async fn test_ensure_dir_creates_nested() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_dir(&nested).await?;
        assert!(nested.is_dir());
        Ok(())
    }
}
