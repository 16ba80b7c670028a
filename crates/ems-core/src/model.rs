//! Entity model shared by the routing, store, and dispatch crates.
//!
//! Entities are plain data: no behaviour beyond small predicates.  Lifecycle
//! rules live in `ems-dispatch`; persistence lives behind the `ems-store`
//! traits.

use std::fmt;
use std::str::FromStr;

use crate::{
    CoreError, CrewId, IncidentId, LocationId, SegmentId, ServiceRecordId, StaffId, Timestamp,
    VehicleId,
};

// ── Enum labels ───────────────────────────────────────────────────────────────

/// Implement `as_str`, `Display`, and `FromStr` for a fieldless enum using
/// upper-case labels (the store's column values).
macro_rules! labelled_enum {
    ($name:ident, $what:literal { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;
            fn from_str(s: &str) -> Result<Self, CoreError> {
                match s.trim().to_ascii_uppercase().as_str() {
                    $($label => Ok($name::$variant),)+
                    _ => Err(CoreError::UnknownLabel { what: $what, value: s.to_owned() }),
                }
            }
        }
    };
}

// ── Enums ─────────────────────────────────────────────────────────────────────

/// Ambulance capability class.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VehicleClass {
    /// Basic life support.
    Basic,
    /// Intensive care (advanced life support).
    Icu,
}

labelled_enum!(VehicleClass, "vehicle class" { Basic => "BASIC", Icu => "ICU" });

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VehicleStatus {
    #[default]
    Available,
    /// Serving an open service record.
    Busy,
    Maintenance,
    Inactive,
}

labelled_enum!(VehicleStatus, "vehicle status" {
    Available   => "AVAILABLE",
    Busy        => "BUSY",
    Maintenance => "MAINTENANCE",
    Inactive    => "INACTIVE",
});

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    Driver,
    Nurse,
    Doctor,
}

labelled_enum!(Role, "staff role" { Driver => "DRIVER", Nurse => "NURSE", Doctor => "DOCTOR" });

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shift {
    Morning,
    Afternoon,
    Night,
}

labelled_enum!(Shift, "shift" { Morning => "MORNING", Afternoon => "AFTERNOON", Night => "NIGHT" });

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StaffStatus {
    #[default]
    Available,
    Busy,
    OffShift,
    Inactive,
}

labelled_enum!(StaffStatus, "staff status" {
    Available => "AVAILABLE",
    Busy      => "BUSY",
    OffShift  => "OFF_SHIFT",
    Inactive  => "INACTIVE",
});

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    Low,
    Medium,
    High,
}

labelled_enum!(Severity, "severity" { Low => "LOW", Medium => "MEDIUM", High => "HIGH" });

/// Incident lifecycle status.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IncidentStatus {
    #[default]
    Open,
    Dispatched,
    /// Crew on scene treating the patient.
    InService,
    Completed,
    Cancelled,
}

labelled_enum!(IncidentStatus, "incident status" {
    Open       => "OPEN",
    Dispatched => "DISPATCHED",
    InService  => "IN_SERVICE",
    Completed  => "COMPLETED",
    Cancelled  => "CANCELLED",
});

impl IncidentStatus {
    /// `true` for `Completed` and `Cancelled`.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, IncidentStatus::Completed | IncidentStatus::Cancelled)
    }

    /// `true` while a vehicle is on its way or on scene.
    #[inline]
    pub fn is_in_progress(self) -> bool {
        matches!(self, IncidentStatus::Dispatched | IncidentStatus::InService)
    }
}

// ── Road network ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub id:   LocationId,
    pub name: String,
}

/// An undirected road between two locations.  Traversable both ways at the
/// same cost.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadSegment {
    pub id:          SegmentId,
    pub from:        LocationId,
    pub to:          LocationId,
    pub distance_km: f64,
}

impl RoadSegment {
    pub fn new(id: u64, from: u64, to: u64, distance_km: f64) -> Self {
        Self {
            id: SegmentId(id),
            from: LocationId(from),
            to: LocationId(to),
            distance_km,
        }
    }
}

// ── Fleet ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vehicle {
    pub id:     VehicleId,
    /// Licence plate, used in operator-facing messages.
    pub plate:  String,
    pub class:  VehicleClass,
    /// Location the vehicle is dispatched from and returns to.
    pub base:   LocationId,
    pub status: VehicleStatus,
    pub active: bool,
}

impl Vehicle {
    /// `true` if the vehicle may be considered for a new dispatch.
    #[inline]
    pub fn is_dispatchable(&self) -> bool {
        self.active && self.status == VehicleStatus::Available
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Staff {
    pub id:     StaffId,
    pub name:   String,
    pub role:   Role,
    pub shift:  Shift,
    pub status: StaffStatus,
    /// `false` once the staff member has been disabled by an administrator.
    pub active: bool,
}

/// A team bound to (at most) one vehicle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Crew {
    pub id:          CrewId,
    pub vehicle:     Option<VehicleId>,
    pub description: String,
    pub active:      bool,
    pub members:     Vec<StaffId>,
}

/// A crew that has not been stored yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrewDraft {
    pub vehicle:     VehicleId,
    pub description: String,
    pub members:     Vec<StaffId>,
}

// ── Incidents & service records ───────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Incident {
    pub id:                 IncidentId,
    pub location:           LocationId,
    pub severity:           Severity,
    /// Free-text call category ("cardiac arrest", "fall", …).
    pub kind:               String,
    pub notes:              String,
    pub opened_at:          Timestamp,
    pub status:             IncidentStatus,
    /// Fixed when the incident is registered; never recomputed.
    pub sla_target_minutes: i64,
    pub closed_at:          Option<Timestamp>,

    // ── Frozen at completion ──────────────────────────────────────────────
    /// Minutes from opening to arrival on scene.
    pub service_minutes:    Option<i64>,
    pub sla_met:            Option<bool>,
    /// Minutes past the SLA target; `None` when the target was met.
    pub overage_minutes:    Option<i64>,
}

/// An incident that has not been stored yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncidentDraft {
    pub location:           LocationId,
    pub severity:           Severity,
    pub kind:               String,
    pub notes:              String,
    pub opened_at:          Timestamp,
    pub sla_target_minutes: i64,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceRecord {
    pub id:            ServiceRecordId,
    pub incident:      IncidentId,
    pub vehicle:       VehicleId,
    pub crew:          CrewId,
    pub dispatched_at: Timestamp,
    pub arrived_at:    Option<Timestamp>,
    pub returned_at:   Option<Timestamp>,
    /// Shortest-path distance from the vehicle's base, in km.
    pub distance_km:   f64,
}

impl ServiceRecord {
    /// A record is open until its vehicle is back at base.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.returned_at.is_none()
    }
}

/// A service record that has not been stored yet.
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceRecordDraft {
    pub incident:      IncidentId,
    pub vehicle:       VehicleId,
    pub crew:          CrewId,
    pub dispatched_at: Timestamp,
    pub distance_km:   f64,
}

/// One road segment of the path chosen for a service record, in traversal
/// order (`order` starts at 1).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutePathSegment {
    pub record:  ServiceRecordId,
    pub segment: SegmentId,
    pub order:   u32,
}
