//! `ems-store` — record store contracts for the dispatch engine.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                          |
//! |-------------|-------------------------------------------------------------------|
//! | [`traits`]  | `VehicleStore`, `CrewStore`, `StaffStore`, `IncidentStore`, …     |
//! | [`memory`]  | `MemoryStore` — in-process reference implementation               |
//! | [`error`]   | `StoreError`, `StoreResult<T>`                                    |
//!
//! The durable record store is owned by the surrounding application; the
//! engine only sees it through these traits.  `MemoryStore` backs the unit
//! tests and the demo binary.

pub mod error;
pub mod memory;
pub mod traits;

#[cfg(test)]
mod tests;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use traits::{
    CrewStore, DispatchStore, IncidentStore, RoadStore, ServiceRecordStore, StaffStore,
    VehicleStore,
};
