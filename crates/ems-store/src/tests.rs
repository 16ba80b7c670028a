//! Unit tests for ems-store.

use ems_core::{
    Crew, CrewDraft, CrewId, IncidentDraft, IncidentId, IncidentStatus, LocationId, Role,
    RoutePathSegment, SegmentId, ServiceRecordDraft, ServiceRecordId, Severity, Shift, Staff,
    StaffId, StaffStatus, Timestamp, Vehicle, VehicleClass, VehicleId, VehicleStatus,
};

use crate::{
    CrewStore, IncidentStore, MemoryStore, ServiceRecordStore, StaffStore, StoreError,
    VehicleStore,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn vehicle(id: u64, class: VehicleClass, status: VehicleStatus, active: bool) -> Vehicle {
    Vehicle {
        id: VehicleId(id),
        plate: format!("AMB-{id:03}"),
        class,
        base: LocationId(1),
        status,
        active,
    }
}

fn staff(id: u64, role: Role) -> Staff {
    Staff {
        id:     StaffId(id),
        name:   format!("staff {id}"),
        role,
        shift:  Shift::Morning,
        status: StaffStatus::Available,
        active: true,
    }
}

fn fleet() -> MemoryStore {
    let mut s = MemoryStore::new();
    s.insert_vehicle(vehicle(3, VehicleClass::Basic, VehicleStatus::Available, true));
    s.insert_vehicle(vehicle(1, VehicleClass::Icu, VehicleStatus::Available, true));
    s.insert_vehicle(vehicle(2, VehicleClass::Basic, VehicleStatus::Available, true));
    s.insert_vehicle(vehicle(4, VehicleClass::Basic, VehicleStatus::Maintenance, true));
    s.insert_vehicle(vehicle(5, VehicleClass::Basic, VehicleStatus::Available, false));
    s
}

// ── Vehicles ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod vehicles {
    use super::*;

    #[test]
    fn available_vehicles_are_active_and_ordered_by_id() {
        let s = fleet();
        let ids: Vec<u64> = s.find_available_vehicles(None).unwrap().iter().map(|v| v.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn available_vehicles_filtered_by_class() {
        let s = fleet();
        let basic = s.find_available_vehicles(Some(VehicleClass::Basic)).unwrap();
        assert!(basic.iter().all(|v| v.class == VehicleClass::Basic));
        assert_eq!(basic.len(), 2);
    }

    #[test]
    fn reserve_is_compare_and_set() {
        let mut s = fleet();
        assert!(s.try_reserve_vehicle(VehicleId(2)).unwrap());
        assert_eq!(s.find_vehicle(VehicleId(2)).unwrap().unwrap().status, VehicleStatus::Busy);
        // Second reservation loses.
        assert!(!s.try_reserve_vehicle(VehicleId(2)).unwrap());
    }

    #[test]
    fn reserve_refuses_unavailable_or_unknown() {
        let mut s = fleet();
        assert!(!s.try_reserve_vehicle(VehicleId(4)).unwrap());
        assert!(!s.try_reserve_vehicle(VehicleId(5)).unwrap());
        assert!(!s.try_reserve_vehicle(VehicleId(99)).unwrap());
        assert_eq!(s.find_vehicle(VehicleId(4)).unwrap().unwrap().status, VehicleStatus::Maintenance);
    }

    #[test]
    fn save_unknown_vehicle_fails() {
        let mut s = MemoryStore::new();
        let err = s
            .save_vehicle(&vehicle(9, VehicleClass::Basic, VehicleStatus::Available, true))
            .unwrap_err();
        assert!(matches!(err, StoreError::Missing { entity: "vehicle", id: 9 }));
    }
}

// ── Crews & staff ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod crews {
    use super::*;

    #[test]
    fn created_crew_is_active_and_bound() {
        let mut s = fleet();
        let crew = s
            .create_crew(CrewDraft {
                vehicle:     VehicleId(2),
                description: "day team".into(),
                members:     vec![StaffId(1), StaffId(2)],
            })
            .unwrap();
        assert!(crew.active);
        assert_eq!(crew.vehicle, Some(VehicleId(2)));
        assert_eq!(s.find_active_crew_for_vehicle(VehicleId(2)).unwrap(), Some(crew));
    }

    #[test]
    fn created_ids_continue_after_seeded_rows() {
        let mut s = fleet();
        s.insert_crew(Crew {
            id:          CrewId(7),
            vehicle:     None,
            description: String::new(),
            active:      false,
            members:     vec![],
        });
        let crew = s
            .create_crew(CrewDraft { vehicle: VehicleId(1), description: String::new(), members: vec![] })
            .unwrap();
        assert_eq!(crew.id, CrewId(8));
    }

    #[test]
    fn inactive_crews_do_not_count() {
        let mut s = fleet();
        let mut crew = s
            .create_crew(CrewDraft {
                vehicle:     VehicleId(2),
                description: String::new(),
                members:     vec![StaffId(1)],
            })
            .unwrap();
        assert_eq!(s.count_active_crew_memberships_for_staff(StaffId(1)).unwrap(), 1);

        crew.active = false;
        s.save_crew(&crew).unwrap();
        assert_eq!(s.count_active_crew_memberships_for_staff(StaffId(1)).unwrap(), 0);
        assert!(s.find_active_crew_for_vehicle(VehicleId(2)).unwrap().is_none());
    }

    #[test]
    fn staff_round_trip() {
        let mut s = MemoryStore::new();
        s.insert_staff(staff(1, Role::Driver));
        let mut st = s.find_staff(StaffId(1)).unwrap().unwrap();
        st.status = StaffStatus::Busy;
        s.save_staff(&st).unwrap();
        assert_eq!(s.find_staff(StaffId(1)).unwrap().unwrap().status, StaffStatus::Busy);
        assert!(s.find_staff(StaffId(2)).unwrap().is_none());
    }
}

// ── Incidents & service records ───────────────────────────────────────────────

#[cfg(test)]
mod incidents {
    use super::*;

    fn draft() -> IncidentDraft {
        IncidentDraft {
            location:           LocationId(3),
            severity:           Severity::Medium,
            kind:               "fall".into(),
            notes:              String::new(),
            opened_at:          Timestamp(1_000),
            sla_target_minutes: 15,
        }
    }

    #[test]
    fn created_incident_is_open() {
        let mut s = MemoryStore::new();
        let inc = s.create_incident(draft()).unwrap();
        assert_eq!(inc.id, IncidentId(1));
        assert_eq!(inc.status, IncidentStatus::Open);
        assert!(inc.closed_at.is_none());
        assert!(inc.sla_met.is_none());
    }

    #[test]
    fn latest_record_wins_and_open_lookup_ignores_returned() {
        let mut s = fleet();
        let inc = s.create_incident(draft()).unwrap();
        let mk = |at| ServiceRecordDraft {
            incident:      inc.id,
            vehicle:       VehicleId(2),
            crew:          CrewId(1),
            dispatched_at: Timestamp(at),
            distance_km:   4.0,
        };
        let mut first = s.create_service_record(mk(1_000)).unwrap();
        first.returned_at = Some(Timestamp(2_000));
        s.save_service_record(&first).unwrap();
        let second = s.create_service_record(mk(3_000)).unwrap();

        assert_eq!(s.find_service_record_by_incident(inc.id).unwrap().unwrap().id, second.id);
        assert_eq!(
            s.find_open_service_record_for_vehicle(VehicleId(2)).unwrap().unwrap().id,
            second.id
        );
    }

    #[test]
    fn route_path_is_kept_in_order() {
        let mut s = MemoryStore::new();
        let rec = s
            .create_service_record(ServiceRecordDraft {
                incident:      IncidentId(1),
                vehicle:       VehicleId(1),
                crew:          CrewId(1),
                dispatched_at: Timestamp(0),
                distance_km:   2.0,
            })
            .unwrap();
        let seg = |id, order| RoutePathSegment { record: rec.id, segment: SegmentId(id), order };
        s.save_route_path(rec.id, &[seg(20, 2), seg(10, 1)]).unwrap();

        let path = s.route_path(rec.id).unwrap();
        assert_eq!(path.iter().map(|p| p.order).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(path[0].segment, SegmentId(10));
    }

    #[test]
    fn route_path_for_unknown_record_fails() {
        let mut s = MemoryStore::new();
        let err = s.save_route_path(ServiceRecordId(5), &[]).unwrap_err();
        assert!(matches!(err, StoreError::Missing { entity: "service record", id: 5 }));
        assert!(s.route_path(ServiceRecordId(5)).unwrap().is_empty());
    }
}
