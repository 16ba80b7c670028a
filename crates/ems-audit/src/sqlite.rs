//! SQLite audit backend (feature `sqlite`).
//!
//! Creates `audit.db` in the configured output directory with a single
//! `audit_log` table.

use std::path::Path;

use rusqlite::Connection;

use crate::sink::AuditSink;
use crate::{AuditEntry, AuditError, AuditResult};

/// Writes the audit trail to an SQLite database.
pub struct SqliteAuditWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteAuditWriter {
    /// Open (or create) `audit.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> AuditResult<Self> {
        let conn = Connection::open(dir.join("audit.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS audit_log (
                 id           INTEGER PRIMARY KEY AUTOINCREMENT,
                 incident_id  INTEGER NOT NULL,
                 at_unix_secs INTEGER NOT NULL,
                 actor        TEXT    NOT NULL,
                 kind         TEXT    NOT NULL,
                 prev_status  TEXT,
                 new_status   TEXT    NOT NULL,
                 description  TEXT    NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl AuditSink for SqliteAuditWriter {
    fn append(&mut self, entry: &AuditEntry) -> AuditResult<()> {
        if self.finished {
            return Err(AuditError::Finished);
        }
        self.conn.execute(
            "INSERT INTO audit_log \
             (incident_id, at_unix_secs, actor, kind, prev_status, new_status, description) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                entry.incident.get() as i64,
                entry.at.unix_secs(),
                entry.actor.label(),
                entry.kind.as_str(),
                entry.prev_status.map(|s| s.as_str()),
                entry.new_status.as_str(),
                entry.description,
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> AuditResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
