//! Audit entry type.

use std::fmt;

use ems_core::{IncidentId, IncidentStatus, Timestamp};

/// What happened to the incident.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum AuditKind {
    Opened,
    Dispatched,
    /// Manual status change that is none of the others (e.g. IN_SERVICE).
    StatusChanged,
    Cancelled,
    /// Arrival on scene, which closes the incident.
    Completed,
    /// Vehicle back at base and released.
    Returned,
}

impl AuditKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditKind::Opened        => "OPENED",
            AuditKind::Dispatched    => "DISPATCHED",
            AuditKind::StatusChanged => "STATUS_CHANGED",
            AuditKind::Cancelled     => "CANCELLED",
            AuditKind::Completed     => "COMPLETED",
            AuditKind::Returned      => "RETURNED",
        }
    }
}

impl fmt::Display for AuditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who caused the change.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Actor {
    /// Automatic transition triggered by the timer engine.
    System,
    /// An operator, identified by login.
    User(String),
}

impl Actor {
    pub fn user(login: impl Into<String>) -> Self {
        Actor::User(login.into())
    }

    /// Column value: `SYSTEM` or the operator login.
    pub fn label(&self) -> &str {
        match self {
            Actor::System => "SYSTEM",
            Actor::User(login) => login,
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of an incident's audit trail.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AuditEntry {
    pub incident:    IncidentId,
    pub actor:       Actor,
    pub kind:        AuditKind,
    /// `None` for the entry that opens the incident.
    pub prev_status: Option<IncidentStatus>,
    pub new_status:  IncidentStatus,
    pub description: String,
    pub at:          Timestamp,
}

impl AuditEntry {
    pub fn new(
        incident:    IncidentId,
        actor:       Actor,
        kind:        AuditKind,
        prev_status: Option<IncidentStatus>,
        new_status:  IncidentStatus,
        description: impl Into<String>,
        at:          Timestamp,
    ) -> Self {
        Self { incident, actor, kind, prev_status, new_status, description: description.into(), at }
    }
}
