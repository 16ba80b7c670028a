//! Store contracts consumed by the dispatch engine.
//!
//! One trait per record family, mirroring the tables of the record store.
//! Lookups return `Ok(None)` for unknown ids; `Err` is reserved for adapter
//! failures.  Each `save_*` call is atomic for its row; nothing here spans
//! several rows except [`VehicleStore::try_reserve_vehicle`], which is a
//! compare-and-set on a single vehicle.

use ems_core::{
    Crew, CrewDraft, CrewId, Incident, IncidentDraft, IncidentId, Location, LocationId,
    RoadSegment, RoutePathSegment, ServiceRecord, ServiceRecordDraft, ServiceRecordId, Staff,
    StaffId, Vehicle, VehicleClass, VehicleId,
};

use crate::StoreResult;

pub trait VehicleStore {
    fn find_vehicle(&self, id: VehicleId) -> StoreResult<Option<Vehicle>>;

    /// Active vehicles with status `AVAILABLE`, optionally restricted to one
    /// class, ordered by id.
    fn find_available_vehicles(&self, class: Option<VehicleClass>) -> StoreResult<Vec<Vehicle>>;

    fn save_vehicle(&mut self, vehicle: &Vehicle) -> StoreResult<()>;

    /// Atomically move the vehicle from `AVAILABLE` to `BUSY`.
    ///
    /// Returns `Ok(false)` without writing if the vehicle is unknown, inactive
    /// or no longer `AVAILABLE`.
    fn try_reserve_vehicle(&mut self, id: VehicleId) -> StoreResult<bool>;
}

pub trait CrewStore {
    fn find_crew(&self, id: CrewId) -> StoreResult<Option<Crew>>;

    /// The active crew bound to `vehicle`, if any.
    fn find_active_crew_for_vehicle(&self, vehicle: VehicleId) -> StoreResult<Option<Crew>>;

    /// Store a new active crew bound to `draft.vehicle`.
    fn create_crew(&mut self, draft: CrewDraft) -> StoreResult<Crew>;

    fn save_crew(&mut self, crew: &Crew) -> StoreResult<()>;

    /// Number of active crews listing `staff` as a member.
    fn count_active_crew_memberships_for_staff(&self, staff: StaffId) -> StoreResult<usize>;
}

pub trait StaffStore {
    fn find_staff(&self, id: StaffId) -> StoreResult<Option<Staff>>;
    fn save_staff(&mut self, staff: &Staff) -> StoreResult<()>;
}

pub trait IncidentStore {
    fn find_incident(&self, id: IncidentId) -> StoreResult<Option<Incident>>;

    /// Store a new `OPEN` incident.
    fn create_incident(&mut self, draft: IncidentDraft) -> StoreResult<Incident>;

    fn save_incident(&mut self, incident: &Incident) -> StoreResult<()>;
}

pub trait ServiceRecordStore {
    /// The most recent service record for `incident`.
    fn find_service_record_by_incident(
        &self,
        incident: IncidentId,
    ) -> StoreResult<Option<ServiceRecord>>;

    /// The record `vehicle` is currently serving (no return timestamp yet).
    fn find_open_service_record_for_vehicle(
        &self,
        vehicle: VehicleId,
    ) -> StoreResult<Option<ServiceRecord>>;

    fn create_service_record(&mut self, draft: ServiceRecordDraft) -> StoreResult<ServiceRecord>;

    fn save_service_record(&mut self, record: &ServiceRecord) -> StoreResult<()>;

    /// Replace the stored path of `record`.
    fn save_route_path(
        &mut self,
        record: ServiceRecordId,
        path: &[RoutePathSegment],
    ) -> StoreResult<()>;

    /// Stored path of `record`, in traversal order.
    fn route_path(&self, record: ServiceRecordId) -> StoreResult<Vec<RoutePathSegment>>;
}

pub trait RoadStore {
    fn find_location(&self, id: LocationId) -> StoreResult<Option<Location>>;

    /// Every road segment; the engine builds its graph from this set.
    fn all_road_segments(&self) -> StoreResult<Vec<RoadSegment>>;
}

/// Everything the dispatcher needs from the record store.
///
/// Blanket-implemented for any type that implements all the record traits.
pub trait DispatchStore:
    VehicleStore + CrewStore + StaffStore + IncidentStore + ServiceRecordStore + RoadStore
{
}

impl<T> DispatchStore for T where
    T: VehicleStore + CrewStore + StaffStore + IncidentStore + ServiceRecordStore + RoadStore
{
}
