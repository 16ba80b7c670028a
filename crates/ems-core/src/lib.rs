//! `ems-core` — foundational types for the ambulance dispatch engine.
//!
//! This crate is a dependency of every other `ems-*` crate.  It has no
//! `ems-*` dependencies and a single external one (`thiserror`, plus optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                         |
//! |-------------|------------------------------------------------------------------|
//! | [`ids`]     | `LocationId`, `SegmentId`, `VehicleId`, `CrewId`, `StaffId`, …   |
//! | [`time`]    | `Timestamp`, whole-minute arithmetic, `format_minutes`           |
//! | [`model`]   | entities (`Vehicle`, `Crew`, `Staff`, `Incident`, …) and enums   |
//! | [`error`]   | `CoreError`, `CoreResult`                                        |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod ids;
pub mod model;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use ids::{CrewId, IncidentId, LocationId, SegmentId, ServiceRecordId, StaffId, VehicleId};
pub use model::{
    Crew, CrewDraft, Incident, IncidentDraft, IncidentStatus, Location, RoadSegment,
    RoutePathSegment, Role, ServiceRecord, ServiceRecordDraft, Severity, Shift, Staff,
    StaffStatus, Vehicle, VehicleClass, VehicleStatus,
};
pub use time::{Timestamp, format_minutes};
