//! SQLite-backed metadata sink.
//!
//! One SQL transaction spans the whole run: opened at `begin`, committed at
//! `end`. If the sink is dropped without `end` (fatal run error), the
//! uncommitted transaction rolls back when the connection closes.

use bundlescan_core::{CoreError, MetadataSink, Result};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use tracing::debug;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS archives(
    id INTEGER PRIMARY KEY,
    path TEXT NOT NULL,
    size INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS records(
    id INTEGER PRIMARY KEY,
    archive_id INTEGER REFERENCES archives(id),
    path TEXT NOT NULL,
    access_path TEXT NOT NULL,
    directory TEXT NOT NULL
);
";

pub struct SqliteSink {
    db_path: PathBuf,
    conn: Option<Connection>,
    current_archive: Option<i64>,
}

impl SqliteSink {
    /// The database file is not touched until [`MetadataSink::begin`].
    #[must_use]
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            conn: None,
            current_archive: None,
        }
    }
}

fn sink_err(e: rusqlite::Error) -> CoreError {
    CoreError::Sink(e.to_string())
}

impl MetadataSink for SqliteSink {
    fn begin(&mut self) -> Result<()> {
        let conn = Connection::open(&self.db_path).map_err(sink_err)?;
        conn.execute_batch(SCHEMA).map_err(sink_err)?;
        conn.execute_batch("BEGIN").map_err(sink_err)?;
        debug!("opened metadata database {}", self.db_path.display());
        self.conn = Some(conn);
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        let conn = self
            .conn
            .take()
            .ok_or_else(|| CoreError::Sink("transaction was never started".into()))?;
        conn.execute_batch("COMMIT").map_err(sink_err)?;
        conn.execute_batch(
            "CREATE INDEX IF NOT EXISTS idx_records_path ON records(path);
             CREATE INDEX IF NOT EXISTS idx_records_archive ON records(archive_id);",
        )
        .map_err(sink_err)?;
        debug!("finalized metadata database {}", self.db_path.display());
        Ok(())
    }

    fn begin_archive(&mut self, relative_path: &str, size_bytes: u64) -> Result<()> {
        let conn = self
            .conn
            .as_ref()
            .ok_or_else(|| CoreError::Sink("transaction was never started".into()))?;
        conn.prepare_cached("INSERT INTO archives(path, size) VALUES (?1, ?2)")
            .map_err(sink_err)?
            .execute(params![relative_path, size_bytes as i64])
            .map_err(sink_err)?;
        self.current_archive = Some(conn.last_insert_rowid());
        Ok(())
    }

    fn end_archive(&mut self) -> Result<()> {
        self.current_archive = None;
        Ok(())
    }

    fn write_record(
        &mut self,
        relative_path: &str,
        access_path: &str,
        containing_dir: &Path,
    ) -> Result<()> {
        let conn = self
            .conn
            .as_ref()
            .ok_or_else(|| CoreError::Sink("transaction was never started".into()))?;
        conn.prepare_cached(
            "INSERT INTO records(archive_id, path, access_path, directory)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .map_err(sink_err)?
        .execute(params![
            self.current_archive,
            relative_path,
            access_path,
            containing_dir.to_string_lossy()
        ])
        .map_err(sink_err)?;
        Ok(())
    }
}
