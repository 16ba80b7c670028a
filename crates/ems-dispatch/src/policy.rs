//! Candidate ranking and the selection policy.
//!
//! Everything here is pure: the dispatcher gathers candidates from the store
//! and the router, then asks [`select`] to pick one.

use std::cmp::Ordering;

use ems_core::{CrewId, VehicleClass, VehicleId};
use ems_routing::Route;

use crate::config::SelectionPolicy;
use crate::NoCandidateReason;

/// Whether a vehicle of class `offered` may answer a call that requires
/// `required`.
///
/// Strict equality in both directions: an ICU unit never covers a BASIC call
/// (it is held back for critical cases) and a BASIC unit never covers an ICU
/// call.
#[inline]
pub fn class_compatible(required: VehicleClass, offered: VehicleClass) -> bool {
    match (required, offered) {
        (VehicleClass::Basic, VehicleClass::Basic) => true,
        (VehicleClass::Icu, VehicleClass::Icu) => true,
        (VehicleClass::Basic, VehicleClass::Icu) | (VehicleClass::Icu, VehicleClass::Basic) => false,
    }
}

/// Whole minutes to drive `distance_km` at `speed_kmh`, rounded up.
///
/// A path length that sums to a whole number of minutes plus float noise
/// (e.g. `5.000000000000001`) counts as that whole number.
pub fn travel_minutes(distance_km: f64, speed_kmh: f64) -> i64 {
    const NOISE: f64 = 1e-9;
    let minutes = distance_km * 60.0 / speed_kmh;
    (minutes - NOISE).ceil().max(0.0) as i64
}

/// An eligible vehicle: available, class-compatible, complete crew, and
/// reachable from its base.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub vehicle:        VehicleId,
    pub plate:          String,
    pub class:          VehicleClass,
    pub crew:           CrewId,
    pub distance_km:    f64,
    pub travel_minutes: i64,
    pub sla_minutes:    i64,
    pub within_sla:     bool,
    /// Base → incident.
    pub route:          Route,
}

/// Distance ascending, then vehicle id.
pub fn by_distance(a: &Candidate, b: &Candidate) -> Ordering {
    a.distance_km.total_cmp(&b.distance_km).then_with(|| a.vehicle.cmp(&b.vehicle))
}

/// Sort candidates into presentation order (see [`by_distance`]).
pub fn rank(candidates: &mut [Candidate]) {
    candidates.sort_by(by_distance);
}

/// Pick one candidate according to `policy`.
///
/// `class` and `sla_minutes` only shape the failure reason.
pub fn select<'a>(
    policy:      SelectionPolicy,
    candidates:  &'a [Candidate],
    class:       VehicleClass,
    sla_minutes: i64,
) -> Result<&'a Candidate, NoCandidateReason> {
    let nearest = candidates
        .iter()
        .min_by(|a, b| by_distance(a, b))
        .ok_or(NoCandidateReason::NoneAvailable { class })?;

    match policy {
        SelectionPolicy::Nearest => Ok(nearest),
        SelectionPolicy::SlaBounded => candidates
            .iter()
            .filter(|c| c.within_sla)
            .min_by(|a, b| by_distance(a, b))
            .ok_or(NoCandidateReason::NoneWithinSla {
                sla_minutes,
                nearest_minutes: nearest.travel_minutes,
            }),
    }
}
