//! `ems-dispatch` — the ambulance dispatch engine.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                        |
//! |-----------------|-----------------------------------------------------------------|
//! | [`config`]      | `DispatchConfig`, `SelectionPolicy`, `SeverityRule`             |
//! | [`crew`]        | crew rule table, `validate_crew`, `validate_members`            |
//! | [`policy`]      | `class_compatible`, `travel_minutes`, `Candidate`, `select`     |
//! | [`lifecycle`]   | incident state machine, completion freeze                       |
//! | [`timer`]       | `TimerSnapshot::compute`, `Advance`                             |
//! | [`dispatcher`]  | `Dispatcher<S, R, A>` — every operation against the store       |
//! | [`error`]       | `DispatchError`, `CrewViolation`, `NoCandidateReason`           |
//!
//! # Flow
//!
//! 1. `register_incident` opens an incident with an SLA target derived from
//!    its severity.
//! 2. `dispatch` filters available vehicles (class, crew, reachability),
//!    applies the [`SelectionPolicy`], reserves the vehicle, and opens a
//!    service record.
//! 3. `evaluate_and_advance` is called whenever the incident is displayed.
//!    It reports elapsed and remaining minutes for each phase and records
//!    arrival and return once their estimates have run out.
//!
//! # Feature flags
//!
//! | Flag     | Effect                                                            |
//! |----------|-------------------------------------------------------------------|
//! | `serde`  | `Serialize`/`Deserialize` on `DispatchConfig` and `TimerSnapshot` |
//! | `sqlite` | Enables `ems_audit::SqliteAuditWriter`                            |

pub mod config;
pub mod crew;
pub mod dispatcher;
pub mod error;
pub mod lifecycle;
pub mod policy;
pub mod timer;


pub use config::{DispatchConfig, SelectionPolicy, SeverityRule};
pub use crew::{CrewCandidate, is_complete, required_roles, validate_crew, validate_members};
pub use dispatcher::{Assignment, Dispatcher};
pub use error::{CrewViolation, DispatchError, DispatchResult, EntityRef, NoCandidateReason};
pub use policy::{Candidate, class_compatible, select, travel_minutes};
pub use timer::{Advance, SlaStatus, TimerSnapshot, TravelTimes};
