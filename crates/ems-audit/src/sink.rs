//! The `AuditSink` trait and the in-memory sink.

use ems_core::IncidentId;

use crate::{AuditEntry, AuditKind, AuditResult};

/// Trait implemented by every audit backend.
///
/// Appends are best effort from the engine's point of view: a failed append
/// never rolls back the state change it describes.  The dispatcher logs the
/// failure and keeps the first error for the caller to inspect.
pub trait AuditSink {
    /// Append one entry.
    fn append(&mut self, entry: &AuditEntry) -> AuditResult<()>;

    /// Flush and close underlying handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> AuditResult<()> {
        Ok(())
    }
}

/// Keeps every entry in a `Vec`.  Used by tests and short-lived tools.
#[derive(Default, Debug)]
pub struct MemoryAuditLog {
    entries: Vec<AuditEntry>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries for one incident, in append order.
    pub fn for_incident(&self, incident: IncidentId) -> impl Iterator<Item = &AuditEntry> {
        self.entries.iter().filter(move |e| e.incident == incident)
    }

    /// Kinds recorded for one incident, in append order.
    pub fn kinds(&self, incident: IncidentId) -> Vec<AuditKind> {
        self.for_incident(incident).map(|e| e.kind).collect()
    }
}

impl AuditSink for MemoryAuditLog {
    fn append(&mut self, entry: &AuditEntry) -> AuditResult<()> {
        self.entries.push(entry.clone());
        Ok(())
    }
}
