use std::fmt;

use ems_core::{
    CrewId, IncidentId, IncidentStatus, LocationId, Role, Shift, StaffId, StaffStatus,
    VehicleClass, VehicleId,
};
use ems_store::StoreError;
use thiserror::Error;

/// A record the engine looked for and did not find.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum EntityRef {
    Incident(IncidentId),
    Vehicle(VehicleId),
    Crew(CrewId),
    Staff(StaffId),
    Location(LocationId),
    /// The service record of an incident.
    ServiceRecordFor(IncidentId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Incident(id)         => write!(f, "incident {}", id.0),
            EntityRef::Vehicle(id)          => write!(f, "vehicle {}", id.0),
            EntityRef::Crew(id)             => write!(f, "crew {}", id.0),
            EntityRef::Staff(id)            => write!(f, "staff member {}", id.0),
            EntityRef::Location(id)         => write!(f, "location {}", id.0),
            EntityRef::ServiceRecordFor(id) => write!(f, "service record for incident {}", id.0),
        }
    }
}

/// Why a crew may not be bound to a vehicle.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum CrewViolation {
    #[error("a crew needs at least one member")]
    Empty,

    #[error("staff member {name} ({staff}) is listed more than once")]
    DuplicateMember { staff: StaffId, name: String },

    #[error("staff member {name} ({staff}) is disabled")]
    InactiveStaff { staff: StaffId, name: String },

    #[error("staff member {name} ({staff}) is {status} and cannot join a crew")]
    UnavailableStaff { staff: StaffId, name: String, status: StaffStatus },

    #[error("staff member {name} ({staff}) already belongs to an active crew")]
    AlreadyAssigned { staff: StaffId, name: String },

    #[error("staff member {name} ({staff}) works the {found} shift, crew shift is {expected}")]
    ShiftMismatch { staff: StaffId, name: String, expected: Shift, found: Shift },

    #[error("a {class} crew needs at least one {role}")]
    MissingRole { class: VehicleClass, role: Role },
}

/// Why no vehicle could be assigned.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum NoCandidateReason {
    /// No available vehicle of the class has a complete crew and a road
    /// path to the incident.
    NoneAvailable { class: VehicleClass },
    /// Candidates exist but none can arrive within the SLA target.
    NoneWithinSla { sla_minutes: i64, nearest_minutes: i64 },
}

impl fmt::Display for NoCandidateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoCandidateReason::NoneAvailable { class } => {
                write!(f, "no available {class} vehicle with a complete crew can reach the incident")
            }
            NoCandidateReason::NoneWithinSla { sla_minutes, nearest_minutes } => write!(
                f,
                "no eligible vehicle within SLA ({sla_minutes} min; nearest is {nearest_minutes} min away)"
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{0} not found")]
    NotFound(EntityRef),

    #[error("{incident} cannot move from {from} to {to}")]
    InvalidTransition { incident: IncidentId, from: IncidentStatus, to: IncidentStatus },

    #[error("{0}")]
    InvalidState(String),

    #[error("crew rejected: {0}")]
    Crew(#[from] CrewViolation),

    #[error("{incident}: {reason}")]
    NoEligibleResource { incident: IncidentId, reason: NoCandidateReason },

    #[error("dispatch configuration error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl DispatchError {
    /// `true` for illegal transitions and already-performed actions.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, DispatchError::InvalidTransition { .. } | DispatchError::InvalidState(_))
    }
}

pub type DispatchResult<T> = Result<T, DispatchError>;
