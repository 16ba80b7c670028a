//! CSV audit backend.
//!
//! Creates `audit_log.csv` in the configured output directory.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::sink::AuditSink;
use crate::{AuditEntry, AuditError, AuditResult};

pub(crate) const HEADER: [&str; 7] =
    ["incident_id", "at_unix_secs", "actor", "kind", "prev_status", "new_status", "description"];

/// Writes the audit trail to a single CSV file.
pub struct CsvAuditWriter {
    log:      Writer<File>,
    finished: bool,
}

impl CsvAuditWriter {
    /// Open (or create) `audit_log.csv` in `dir` and write the header row.
    pub fn new(dir: &Path) -> AuditResult<Self> {
        let mut log = Writer::from_path(dir.join("audit_log.csv"))?;
        log.write_record(HEADER)?;
        Ok(Self { log, finished: false })
    }
}

impl AuditSink for CsvAuditWriter {
    fn append(&mut self, entry: &AuditEntry) -> AuditResult<()> {
        if self.finished {
            return Err(AuditError::Finished);
        }
        self.log.write_record([
            entry.incident.get().to_string().as_str(),
            entry.at.unix_secs().to_string().as_str(),
            entry.actor.label(),
            entry.kind.as_str(),
            entry.prev_status.map_or("", |s| s.as_str()),
            entry.new_status.as_str(),
            entry.description.as_str(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> AuditResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.log.flush()?;
        Ok(())
    }
}
