//! Synthetic city: road network, fleet, and staff roster.
//!
//! Eight locations, two stations.  Vehicles are seeded without crews; `main`
//! assembles them through the dispatcher so the crew rules apply.

use std::io::Cursor;

use anyhow::Result;

use ems_core::{
    Location, LocationId, Role, Shift, Staff, StaffId, StaffStatus, Vehicle, VehicleClass,
    VehicleId, VehicleStatus,
};
use ems_routing::load_segments_reader;
use ems_store::MemoryStore;

// ── Locations ─────────────────────────────────────────────────────────────────

pub const CENTRAL_STATION: LocationId = LocationId(1);
pub const NORTH_STATION:   LocationId = LocationId(2);
pub const OLD_TOWN:        LocationId = LocationId(3);
pub const RIVERSIDE:       LocationId = LocationId(4);
pub const UNIVERSITY:      LocationId = LocationId(5);
pub const HARBOR:          LocationId = LocationId(6);
pub const HOSPITAL_HILL:   LocationId = LocationId(7);
pub const AIRPORT:         LocationId = LocationId(8);

const LOCATIONS: [(LocationId, &str); 8] = [
    (CENTRAL_STATION, "Central Station"),
    (NORTH_STATION,   "North Station"),
    (OLD_TOWN,        "Old Town"),
    (RIVERSIDE,       "Riverside"),
    (UNIVERSITY,      "University"),
    (HARBOR,          "Harbor"),
    (HOSPITAL_HILL,   "Hospital Hill"),
    (AIRPORT,         "Airport"),
];

// Undirected; distances in km.
const ROADS_CSV: &str = "\
id,from,to,distance_km\n\
1,1,3,2.5\n\
2,3,4,3.0\n\
3,1,5,4.0\n\
4,5,7,2.0\n\
5,2,5,3.5\n\
6,2,8,12.0\n\
7,4,6,2.5\n\
8,6,8,9.0\n\
9,3,7,3.5\n\
";

// ── Fleet ─────────────────────────────────────────────────────────────────────

/// A crew to assemble at start-up.
pub struct CrewPlan {
    pub vehicle:     VehicleId,
    pub members:     &'static [StaffId],
    pub description: &'static str,
}

pub const CREWS: [CrewPlan; 4] = [
    CrewPlan { vehicle: VehicleId(1), members: &[StaffId(1), StaffId(4)], description: "AMB-101 day" },
    CrewPlan { vehicle: VehicleId(2), members: &[StaffId(2), StaffId(5)], description: "AMB-102 day" },
    CrewPlan {
        vehicle:     VehicleId(3),
        members:     &[StaffId(3), StaffId(6), StaffId(7)],
        description: "ICU-201 day",
    },
    CrewPlan {
        vehicle:     VehicleId(4),
        members:     &[StaffId(8), StaffId(9), StaffId(10)],
        description: "ICU-202 night",
    },
];

fn vehicle(id: u64, plate: &str, class: VehicleClass, base: LocationId) -> Vehicle {
    Vehicle {
        id: VehicleId(id),
        plate: plate.to_owned(),
        class,
        base,
        // Crew assembly brings each vehicle into service.
        status: VehicleStatus::Inactive,
        active: false,
    }
}

fn staff(id: u64, name: &str, role: Role, shift: Shift) -> Staff {
    Staff {
        id: StaffId(id),
        name: name.to_owned(),
        role,
        shift,
        status: StaffStatus::Available,
        active: true,
    }
}

/// Build the store with roads, vehicles, and staff.
pub fn build_city() -> Result<MemoryStore> {
    let mut store = MemoryStore::new();

    for (id, name) in LOCATIONS {
        store.insert_location(Location { id, name: name.to_owned() });
    }
    for segment in load_segments_reader(Cursor::new(ROADS_CSV))? {
        store.insert_segment(segment);
    }

    store.insert_vehicle(vehicle(1, "AMB-101", VehicleClass::Basic, CENTRAL_STATION));
    store.insert_vehicle(vehicle(2, "AMB-102", VehicleClass::Basic, NORTH_STATION));
    store.insert_vehicle(vehicle(3, "ICU-201", VehicleClass::Icu, CENTRAL_STATION));
    store.insert_vehicle(vehicle(4, "ICU-202", VehicleClass::Icu, NORTH_STATION));

    for s in [
        staff(1, "Alice Moreau", Role::Driver, Shift::Morning),
        staff(2, "Bruno Silva", Role::Driver, Shift::Morning),
        staff(3, "Chen Wei", Role::Driver, Shift::Morning),
        staff(4, "Dana Okafor", Role::Nurse, Shift::Morning),
        staff(5, "Eva Lindqvist", Role::Nurse, Shift::Morning),
        staff(6, "Farid Haddad", Role::Nurse, Shift::Morning),
        staff(7, "Grace Kim", Role::Doctor, Shift::Morning),
        staff(8, "Hector Ruiz", Role::Driver, Shift::Night),
        staff(9, "Ines Duarte", Role::Nurse, Shift::Night),
        staff(10, "Jonas Berg", Role::Doctor, Shift::Night),
    ] {
        store.insert_staff(s);
    }

    Ok(store)
}

/// Display name of `location`.
pub fn location_name(location: LocationId) -> &'static str {
    LOCATIONS
        .iter()
        .find(|(id, _)| *id == location)
        .map_or("?", |&(_, name)| name)
}
