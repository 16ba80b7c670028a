//! `MemoryStore` — an in-process implementation of every store trait.
//!
//! Rows live in `BTreeMap`s keyed by id, so iteration (and therefore
//! `find_available_vehicles`) is ordered by id.  Ids handed out by the
//! `create_*` methods continue after the largest id seen so far, including
//! seeded rows.

use std::collections::BTreeMap;

use ems_core::{
    Crew, CrewDraft, CrewId, Incident, IncidentDraft, IncidentId, IncidentStatus, Location,
    LocationId, RoadSegment, RoutePathSegment, SegmentId, ServiceRecord, ServiceRecordDraft,
    ServiceRecordId, Staff, StaffId, Vehicle, VehicleClass, VehicleId, VehicleStatus,
};

use crate::traits::{
    CrewStore, IncidentStore, RoadStore, ServiceRecordStore, StaffStore, VehicleStore,
};
use crate::{StoreError, StoreResult};

#[derive(Default)]
pub struct MemoryStore {
    locations:   BTreeMap<LocationId, Location>,
    segments:    BTreeMap<SegmentId, RoadSegment>,
    vehicles:    BTreeMap<VehicleId, Vehicle>,
    staff:       BTreeMap<StaffId, Staff>,
    crews:       BTreeMap<CrewId, Crew>,
    incidents:   BTreeMap<IncidentId, Incident>,
    records:     BTreeMap<ServiceRecordId, ServiceRecord>,
    route_paths: BTreeMap<ServiceRecordId, Vec<RoutePathSegment>>,

    next_crew:     u64,
    next_incident: u64,
    next_record:   u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Seeding ───────────────────────────────────────────────────────────
    //
    // Reference data is inserted as-is, replacing any row with the same id.

    pub fn insert_location(&mut self, location: Location) {
        self.locations.insert(location.id, location);
    }

    pub fn insert_segment(&mut self, segment: RoadSegment) {
        self.segments.insert(segment.id, segment);
    }

    pub fn insert_vehicle(&mut self, vehicle: Vehicle) {
        self.vehicles.insert(vehicle.id, vehicle);
    }

    pub fn insert_staff(&mut self, staff: Staff) {
        self.staff.insert(staff.id, staff);
    }

    pub fn insert_crew(&mut self, crew: Crew) {
        self.next_crew = self.next_crew.max(crew.id.0);
        self.crews.insert(crew.id, crew);
    }

    pub fn insert_incident(&mut self, incident: Incident) {
        self.next_incident = self.next_incident.max(incident.id.0);
        self.incidents.insert(incident.id, incident);
    }

    // ── Inspection ────────────────────────────────────────────────────────

    pub fn vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    pub fn incidents(&self) -> impl Iterator<Item = &Incident> {
        self.incidents.values()
    }

    pub fn service_records(&self) -> impl Iterator<Item = &ServiceRecord> {
        self.records.values()
    }

    pub fn crews(&self) -> impl Iterator<Item = &Crew> {
        self.crews.values()
    }
}

/// Overwrite an existing row, failing if the id was never stored.
fn replace<K: Ord + Copy, V: Clone>(
    map:    &mut BTreeMap<K, V>,
    key:    K,
    value:  &V,
    entity: &'static str,
    raw_id: u64,
) -> StoreResult<()> {
    match map.get_mut(&key) {
        Some(slot) => {
            *slot = value.clone();
            Ok(())
        }
        None => Err(StoreError::Missing { entity, id: raw_id }),
    }
}

// ── Trait impls ───────────────────────────────────────────────────────────────

impl VehicleStore for MemoryStore {
    fn find_vehicle(&self, id: VehicleId) -> StoreResult<Option<Vehicle>> {
        Ok(self.vehicles.get(&id).cloned())
    }

    fn find_available_vehicles(&self, class: Option<VehicleClass>) -> StoreResult<Vec<Vehicle>> {
        Ok(self
            .vehicles
            .values()
            .filter(|v| v.is_dispatchable())
            .filter(|v| class.is_none_or(|c| v.class == c))
            .cloned()
            .collect())
    }

    fn save_vehicle(&mut self, vehicle: &Vehicle) -> StoreResult<()> {
        replace(&mut self.vehicles, vehicle.id, vehicle, "vehicle", vehicle.id.0)
    }

    fn try_reserve_vehicle(&mut self, id: VehicleId) -> StoreResult<bool> {
        match self.vehicles.get_mut(&id) {
            Some(v) if v.is_dispatchable() => {
                v.status = VehicleStatus::Busy;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

impl CrewStore for MemoryStore {
    fn find_crew(&self, id: CrewId) -> StoreResult<Option<Crew>> {
        Ok(self.crews.get(&id).cloned())
    }

    fn find_active_crew_for_vehicle(&self, vehicle: VehicleId) -> StoreResult<Option<Crew>> {
        Ok(self
            .crews
            .values()
            .find(|c| c.active && c.vehicle == Some(vehicle))
            .cloned())
    }

    fn create_crew(&mut self, draft: CrewDraft) -> StoreResult<Crew> {
        self.next_crew += 1;
        let crew = Crew {
            id:          CrewId(self.next_crew),
            vehicle:     Some(draft.vehicle),
            description: draft.description,
            active:      true,
            members:     draft.members,
        };
        self.crews.insert(crew.id, crew.clone());
        Ok(crew)
    }

    fn save_crew(&mut self, crew: &Crew) -> StoreResult<()> {
        replace(&mut self.crews, crew.id, crew, "crew", crew.id.0)
    }

    fn count_active_crew_memberships_for_staff(&self, staff: StaffId) -> StoreResult<usize> {
        Ok(self
            .crews
            .values()
            .filter(|c| c.active && c.members.contains(&staff))
            .count())
    }
}

impl StaffStore for MemoryStore {
    fn find_staff(&self, id: StaffId) -> StoreResult<Option<Staff>> {
        Ok(self.staff.get(&id).cloned())
    }

    fn save_staff(&mut self, staff: &Staff) -> StoreResult<()> {
        replace(&mut self.staff, staff.id, staff, "staff", staff.id.0)
    }
}

impl IncidentStore for MemoryStore {
    fn find_incident(&self, id: IncidentId) -> StoreResult<Option<Incident>> {
        Ok(self.incidents.get(&id).cloned())
    }

    fn create_incident(&mut self, draft: IncidentDraft) -> StoreResult<Incident> {
        self.next_incident += 1;
        let incident = Incident {
            id:                 IncidentId(self.next_incident),
            location:           draft.location,
            severity:           draft.severity,
            kind:               draft.kind,
            notes:              draft.notes,
            opened_at:          draft.opened_at,
            status:             IncidentStatus::Open,
            sla_target_minutes: draft.sla_target_minutes,
            closed_at:          None,
            service_minutes:    None,
            sla_met:            None,
            overage_minutes:    None,
        };
        self.incidents.insert(incident.id, incident.clone());
        Ok(incident)
    }

    fn save_incident(&mut self, incident: &Incident) -> StoreResult<()> {
        replace(&mut self.incidents, incident.id, incident, "incident", incident.id.0)
    }
}

impl ServiceRecordStore for MemoryStore {
    fn find_service_record_by_incident(
        &self,
        incident: IncidentId,
    ) -> StoreResult<Option<ServiceRecord>> {
        Ok(self
            .records
            .values()
            .rev()
            .find(|r| r.incident == incident)
            .cloned())
    }

    fn find_open_service_record_for_vehicle(
        &self,
        vehicle: VehicleId,
    ) -> StoreResult<Option<ServiceRecord>> {
        Ok(self
            .records
            .values()
            .find(|r| r.vehicle == vehicle && r.is_open())
            .cloned())
    }

    fn create_service_record(&mut self, draft: ServiceRecordDraft) -> StoreResult<ServiceRecord> {
        self.next_record += 1;
        let record = ServiceRecord {
            id:            ServiceRecordId(self.next_record),
            incident:      draft.incident,
            vehicle:       draft.vehicle,
            crew:          draft.crew,
            dispatched_at: draft.dispatched_at,
            arrived_at:    None,
            returned_at:   None,
            distance_km:   draft.distance_km,
        };
        self.records.insert(record.id, record.clone());
        Ok(record)
    }

    fn save_service_record(&mut self, record: &ServiceRecord) -> StoreResult<()> {
        replace(&mut self.records, record.id, record, "service record", record.id.0)
    }

    fn save_route_path(
        &mut self,
        record: ServiceRecordId,
        path: &[RoutePathSegment],
    ) -> StoreResult<()> {
        if !self.records.contains_key(&record) {
            return Err(StoreError::Missing { entity: "service record", id: record.0 });
        }
        let mut rows = path.to_vec();
        rows.sort_by_key(|s| s.order);
        self.route_paths.insert(record, rows);
        Ok(())
    }

    fn route_path(&self, record: ServiceRecordId) -> StoreResult<Vec<RoutePathSegment>> {
        Ok(self.route_paths.get(&record).cloned().unwrap_or_default())
    }
}

impl RoadStore for MemoryStore {
    fn find_location(&self, id: LocationId) -> StoreResult<Option<Location>> {
        Ok(self.locations.get(&id).cloned())
    }

    fn all_road_segments(&self) -> StoreResult<Vec<RoadSegment>> {
        Ok(self.segments.values().cloned().collect())
    }
}
