//! Unit tests for ems-core primitives.

#[cfg(test)]
mod ids {
    use crate::{IncidentId, LocationId, VehicleId};

    #[test]
    fn ordering() {
        assert!(VehicleId(0) < VehicleId(1));
        assert!(LocationId(100) > LocationId(99));
    }

    #[test]
    fn display() {
        assert_eq!(IncidentId(7).to_string(), "IncidentId(7)");
    }

    #[test]
    fn from_raw() {
        assert_eq!(VehicleId::from(3), VehicleId(3));
        assert_eq!(VehicleId(3).get(), 3);
    }
}

#[cfg(test)]
mod time {
    use crate::{Timestamp, format_minutes};

    #[test]
    fn minute_arithmetic() {
        let t = Timestamp(1_000);
        assert_eq!(t.plus_minutes(2), Timestamp(1_120));
        assert_eq!(t.plus_secs(5), Timestamp(1_005));
        assert_eq!(Timestamp(1_120) - t, 120);
    }

    #[test]
    fn minutes_since_truncates() {
        let open = Timestamp(0);
        assert_eq!(Timestamp(359).minutes_since(open), 5); // 5 min 59 s
        assert_eq!(Timestamp(360).minutes_since(open), 6);
        assert_eq!(Timestamp(59).minutes_since(open), 0);
    }

    #[test]
    fn minutes_since_negative_when_reversed() {
        assert_eq!(Timestamp(0).minutes_since(Timestamp(600)), -10);
    }

    #[test]
    fn formatting() {
        assert_eq!(format_minutes(85), "1h 25m");
        assert_eq!(format_minutes(15), "15m");
        assert_eq!(format_minutes(0), "0m");
        assert_eq!(format_minutes(-3), "-3m");
        assert_eq!(format_minutes(120), "2h 0m");
        assert_eq!(format_minutes(-61), "-1h 1m");
    }
}

#[cfg(test)]
mod model {
    use crate::{
        CoreError, IncidentStatus, Role, ServiceRecord, ServiceRecordId, Severity, StaffStatus,
        Timestamp, Vehicle, VehicleClass, VehicleId, VehicleStatus,
    };
    use crate::{CrewId, IncidentId, LocationId};

    #[test]
    fn labels_round_trip_through_from_str() {
        assert_eq!("HIGH".parse::<Severity>().unwrap(), Severity::High);
        assert_eq!("icu".parse::<VehicleClass>().unwrap(), VehicleClass::Icu);
        assert_eq!(" off_shift ".parse::<StaffStatus>().unwrap(), StaffStatus::OffShift);
        assert_eq!(IncidentStatus::InService.to_string(), "IN_SERVICE");
        assert_eq!(Role::Doctor.as_str(), "DOCTOR");
    }

    #[test]
    fn unknown_label_is_an_error() {
        let err = "URGENT".parse::<Severity>().unwrap_err();
        assert_eq!(
            err,
            CoreError::UnknownLabel { what: "severity", value: "URGENT".into() }
        );
    }

    #[test]
    fn terminal_statuses() {
        assert!(IncidentStatus::Completed.is_terminal());
        assert!(IncidentStatus::Cancelled.is_terminal());
        assert!(!IncidentStatus::Open.is_terminal());
        assert!(IncidentStatus::InService.is_in_progress());
        assert!(!IncidentStatus::Open.is_in_progress());
    }

    #[test]
    fn dispatchable_requires_active_and_available() {
        let mut v = Vehicle {
            id:     VehicleId(1),
            plate:  "AMB-001".into(),
            class:  VehicleClass::Basic,
            base:   LocationId(1),
            status: VehicleStatus::Available,
            active: true,
        };
        assert!(v.is_dispatchable());
        v.active = false;
        assert!(!v.is_dispatchable());
        v.active = true;
        v.status = VehicleStatus::Maintenance;
        assert!(!v.is_dispatchable());
    }

    #[test]
    fn service_record_open_until_return() {
        let mut r = ServiceRecord {
            id:            ServiceRecordId(1),
            incident:      IncidentId(1),
            vehicle:       VehicleId(1),
            crew:          CrewId(1),
            dispatched_at: Timestamp(0),
            arrived_at:    Some(Timestamp(300)),
            returned_at:   None,
            distance_km:   5.0,
        };
        assert!(r.is_open());
        r.returned_at = Some(Timestamp(600));
        assert!(!r.is_open());
    }
}
