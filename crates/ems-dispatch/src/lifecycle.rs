//! Incident state machine.
//!
//! ```text
//! OPEN ──dispatch──▶ DISPATCHED ──mark_in_service──▶ IN_SERVICE
//!  │                     │                               │
//!  │                     └──────────arrival──────────────┴──▶ COMPLETED
//!  └──cancel──▶ CANCELLED
//! ```
//!
//! `COMPLETED` and `CANCELLED` are terminal.  The functions here only mutate
//! the in-memory `Incident`; saving it is the caller's job.

use ems_core::{Incident, IncidentStatus, Timestamp};

use crate::{DispatchError, DispatchResult};

/// `true` if the lifecycle allows `from → to`.
pub fn can_transition(from: IncidentStatus, to: IncidentStatus) -> bool {
    use IncidentStatus::*;
    matches!(
        (from, to),
        (Open, Dispatched)
            | (Open, Cancelled)
            | (Dispatched, InService)
            | (Dispatched, Completed)
            | (InService, Completed)
    )
}

/// Fail with [`DispatchError::InvalidTransition`] unless `incident` may move
/// to `to`.
pub fn check_transition(incident: &Incident, to: IncidentStatus) -> DispatchResult<()> {
    if can_transition(incident.status, to) {
        Ok(())
    } else {
        Err(DispatchError::InvalidTransition { incident: incident.id, from: incident.status, to })
    }
}

/// Move to `to` after checking the transition.  Returns the previous status.
pub fn transition(incident: &mut Incident, to: IncidentStatus) -> DispatchResult<IncidentStatus> {
    check_transition(incident, to)?;
    let prev = incident.status;
    incident.status = to;
    Ok(prev)
}

/// Close the incident at `arrived_at` and freeze its service figures.
///
/// Service minutes run from opening to arrival.  The SLA is met when they do
/// not exceed the target; otherwise the overage is recorded.
pub fn complete(incident: &mut Incident, arrived_at: Timestamp) -> DispatchResult<IncidentStatus> {
    let prev = transition(incident, IncidentStatus::Completed)?;
    let minutes = arrived_at.minutes_since(incident.opened_at);
    let met = minutes <= incident.sla_target_minutes;

    incident.closed_at       = Some(arrived_at);
    incident.service_minutes = Some(minutes);
    incident.sla_met         = Some(met);
    incident.overage_minutes = (!met).then(|| minutes - incident.sla_target_minutes);
    Ok(prev)
}

/// Cancel an `OPEN` incident.
pub fn cancel(incident: &mut Incident, now: Timestamp) -> DispatchResult<IncidentStatus> {
    let prev = transition(incident, IncidentStatus::Cancelled)?;
    incident.closed_at = Some(now);
    Ok(prev)
}
