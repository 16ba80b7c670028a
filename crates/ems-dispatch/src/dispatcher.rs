//! `Dispatcher<S, R, A>` — the engine's entry point.
//!
//! The dispatcher owns its collaborators: the record store `S`, the router
//! `R` and the audit sink `A`.  Every operation is synchronous and takes the
//! current time as an argument.
//!
//! Audit entries are best effort.  A failed append is logged with `warn!`,
//! the first such error is kept for [`Dispatcher::take_audit_error`], and the
//! state change it described stands.

use ems_audit::{Actor, AuditEntry, AuditError, AuditKind, AuditSink};
use ems_core::{
    Crew, CrewDraft, CrewId, Incident, IncidentDraft, IncidentId, IncidentStatus, LocationId,
    RoutePathSegment, ServiceRecord, ServiceRecordDraft, Severity, Staff, StaffId, StaffStatus,
    Timestamp, Vehicle, VehicleId, VehicleStatus,
};
use ems_routing::{RoadGraph, Route, Router};
use ems_store::DispatchStore;
use tracing::{debug, info, warn};

use crate::crew::{self, CrewCandidate};
use crate::lifecycle;
use crate::policy::{self, Candidate};
use crate::timer::{Advance, TimerSnapshot};
use crate::{DispatchConfig, DispatchError, DispatchResult, EntityRef};

/// The outcome of a successful dispatch.
#[derive(Clone, Debug)]
pub struct Assignment {
    pub incident:       Incident,
    pub record:         ServiceRecord,
    pub vehicle:        Vehicle,
    pub crew:           Crew,
    pub route:          Route,
    pub travel_minutes: i64,
    pub within_sla:     bool,
}

pub struct Dispatcher<S: DispatchStore, R: Router, A: AuditSink> {
    config:      DispatchConfig,
    store:       S,
    router:      R,
    audit:       A,
    audit_error: Option<AuditError>,
}

impl<S: DispatchStore, R: Router, A: AuditSink> Dispatcher<S, R, A> {
    /// Create a dispatcher after validating `config`.
    pub fn new(config: DispatchConfig, store: S, router: R, audit: A) -> DispatchResult<Self> {
        config.validate()?;
        Ok(Self { config, store, router, audit, audit_error: None })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Direct store access, e.g. for seeding reference data.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn audit(&self) -> &A {
        &self.audit
    }

    pub fn audit_mut(&mut self) -> &mut A {
        &mut self.audit
    }

    /// Take the first swallowed audit error, if any.
    pub fn take_audit_error(&mut self) -> Option<AuditError> {
        self.audit_error.take()
    }

    pub fn into_parts(self) -> (S, R, A) {
        (self.store, self.router, self.audit)
    }

    // ── Incidents ─────────────────────────────────────────────────────────

    /// Open a new incident at `location`.  The SLA target comes from the
    /// severity and is never recomputed.
    pub fn register_incident(
        &mut self,
        location: LocationId,
        severity: Severity,
        kind:     &str,
        notes:    &str,
        actor:    &Actor,
        now:      Timestamp,
    ) -> DispatchResult<Incident> {
        if self.store.find_location(location)?.is_none() {
            return Err(DispatchError::NotFound(EntityRef::Location(location)));
        }
        let rule = self.config.rule(severity);
        let incident = self.store.create_incident(IncidentDraft {
            location,
            severity,
            kind: kind.to_owned(),
            notes: notes.to_owned(),
            opened_at: now,
            sla_target_minutes: rule.sla_minutes,
        })?;
        info!(incident = %incident.id, %severity, sla = rule.sla_minutes, "incident opened");

        self.record_audit(AuditEntry::new(
            incident.id,
            actor.clone(),
            AuditKind::Opened,
            None,
            IncidentStatus::Open,
            format!("{kind} ({severity}) opened, SLA target {} min", rule.sla_minutes),
            now,
        ));
        Ok(incident)
    }

    /// Every vehicle that could answer `incident`, nearest first.
    pub fn suggest_vehicles(&self, incident: IncidentId) -> DispatchResult<Vec<Candidate>> {
        let incident = self.load_incident(incident)?;
        lifecycle::check_transition(&incident, IncidentStatus::Dispatched)?;
        self.candidates(&incident)
    }

    /// Assign the best vehicle to an `OPEN` incident.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the incident does not exist.
    /// - `InvalidTransition` if it is not `OPEN`.
    /// - `NoEligibleResource` if the policy finds no vehicle; the incident
    ///   stays `OPEN`.
    /// - `InvalidState` if the chosen vehicle was taken between the scan and
    ///   the reservation; nothing has been written.
    /// - `Store` if a write after the reservation fails; the vehicle, crew
    ///   and incident are put back as they were.
    pub fn dispatch(
        &mut self,
        incident: IncidentId,
        actor:    &Actor,
        now:      Timestamp,
    ) -> DispatchResult<Assignment> {
        let mut incident = self.load_incident(incident)?;
        lifecycle::check_transition(&incident, IncidentStatus::Dispatched)?;

        let rule = self.config.rule(incident.severity);
        let candidates = self.candidates(&incident)?;
        let chosen =
            match policy::select(self.config.policy, &candidates, rule.class, rule.sla_minutes) {
                Ok(c) => c.clone(),
                Err(reason) => {
                    info!(incident = %incident.id, %reason, "no vehicle assigned");
                    return Err(DispatchError::NoEligibleResource { incident: incident.id, reason });
                }
            };

        let crew = self
            .store
            .find_crew(chosen.crew)?
            .ok_or(DispatchError::NotFound(EntityRef::Crew(chosen.crew)))?;

        // The reservation is the first write: if another dispatch took the
        // vehicle since the scan, nothing has changed.
        if !self.store.try_reserve_vehicle(chosen.vehicle)? {
            return Err(DispatchError::InvalidState(format!(
                "vehicle {} ({}) is no longer available",
                chosen.plate, chosen.vehicle
            )));
        }
        let before = incident.clone();
        let (vehicle, record, prev) = match self.commit_dispatch(&mut incident, &chosen, &crew, now) {
            Ok(committed) => committed,
            Err(e) => {
                self.release_reservation(&before, chosen.vehicle, &crew);
                return Err(e);
            }
        };
        self.save_route_path(&record, &chosen.route);

        info!(
            incident = %incident.id,
            vehicle = %vehicle.id,
            distance_km = chosen.distance_km,
            eta_min = chosen.travel_minutes,
            within_sla = chosen.within_sla,
            "vehicle dispatched"
        );
        self.record_audit(AuditEntry::new(
            incident.id,
            actor.clone(),
            AuditKind::Dispatched,
            Some(prev),
            IncidentStatus::Dispatched,
            format!(
                "Vehicle {} ({}) dispatched, distance {:.2} km, ETA {} min",
                vehicle.plate, vehicle.class, chosen.distance_km, chosen.travel_minutes
            ),
            now,
        ));

        Ok(Assignment {
            incident,
            record,
            vehicle,
            crew,
            route: chosen.route,
            travel_minutes: chosen.travel_minutes,
            within_sla: chosen.within_sla,
        })
    }

    /// Crew reports on scene and starts treatment.
    pub fn mark_in_service(
        &mut self,
        incident: IncidentId,
        actor:    &Actor,
        now:      Timestamp,
    ) -> DispatchResult<Incident> {
        let mut incident = self.load_incident(incident)?;
        let prev = lifecycle::transition(&mut incident, IncidentStatus::InService)?;
        self.store.save_incident(&incident)?;

        self.record_audit(AuditEntry::new(
            incident.id,
            actor.clone(),
            AuditKind::StatusChanged,
            Some(prev),
            IncidentStatus::InService,
            "Crew on scene, treatment started",
            now,
        ));
        Ok(incident)
    }

    /// Record arrival on scene, closing the incident.
    pub fn record_arrival(
        &mut self,
        incident: IncidentId,
        actor:    &Actor,
        now:      Timestamp,
    ) -> DispatchResult<Incident> {
        let incident = self.load_incident(incident)?;
        lifecycle::check_transition(&incident, IncidentStatus::Completed)?;
        let record = self.load_record(incident.id)?;
        if record.arrived_at.is_some() {
            return Err(DispatchError::InvalidState(format!(
                "arrival already recorded for incident {}",
                incident.id.0
            )));
        }
        self.apply_arrival(incident, record, actor, now)
    }

    /// Cancel an `OPEN` incident.
    pub fn cancel_incident(
        &mut self,
        incident: IncidentId,
        actor:    &Actor,
        now:      Timestamp,
    ) -> DispatchResult<Incident> {
        let mut incident = self.load_incident(incident)?;
        let prev = lifecycle::cancel(&mut incident, now)?;
        self.store.save_incident(&incident)?;
        info!(incident = %incident.id, "incident cancelled");

        self.record_audit(AuditEntry::new(
            incident.id,
            actor.clone(),
            AuditKind::Cancelled,
            Some(prev),
            IncidentStatus::Cancelled,
            "Incident cancelled before dispatch",
            now,
        ));
        Ok(incident)
    }

    // ── Timers ────────────────────────────────────────────────────────────

    /// Timer snapshot at `now` without applying due transitions.
    pub fn peek_timer(&self, incident: IncidentId, now: Timestamp) -> DispatchResult<TimerSnapshot> {
        let incident = self.load_incident(incident)?;
        let record = self.store.find_service_record_by_incident(incident.id)?;
        let plate = match &record {
            Some(r) => self.store.find_vehicle(r.vehicle)?.map(|v| v.plate),
            None => None,
        };
        Ok(TimerSnapshot::compute(&incident, record.as_ref(), plate.as_deref(), &self.config, now))
    }

    /// Compute the timer snapshot, apply every due transition, and return
    /// the snapshot of the updated state.
    ///
    /// Idempotent: a second call at the same `now` finds nothing due.
    pub fn evaluate_and_advance(
        &mut self,
        incident: IncidentId,
        now:      Timestamp,
    ) -> DispatchResult<TimerSnapshot> {
        loop {
            let snapshot = self.peek_timer(incident, now)?;
            if snapshot.is_settled() {
                return Ok(snapshot);
            }
            let mut progressed = false;
            for advance in &snapshot.pending {
                progressed |= self.apply_advance(incident, *advance)?;
            }
            if !progressed {
                return Ok(snapshot);
            }
        }
    }

    fn apply_advance(&mut self, incident: IncidentId, advance: Advance) -> DispatchResult<bool> {
        let incident = self.load_incident(incident)?;
        let record = self.load_record(incident.id)?;
        match advance {
            Advance::RecordArrival { at } => {
                // Only the first evaluation writes.
                if record.arrived_at.is_some() || !incident.status.is_in_progress() {
                    return Ok(false);
                }
                debug!(incident = %incident.id, "outbound estimate elapsed, recording arrival");
                self.apply_arrival(incident, record, &Actor::System, at)?;
                Ok(true)
            }
            Advance::RecordReturn { at } => {
                if record.returned_at.is_some() || record.arrived_at.is_none() {
                    return Ok(false);
                }
                debug!(incident = %incident.id, "return budget elapsed, releasing vehicle");
                self.apply_return(&incident, record, at)?;
                Ok(true)
            }
        }
    }

    // ── Crews ─────────────────────────────────────────────────────────────

    /// Bind a new crew of `members` to `vehicle`.
    ///
    /// On success the vehicle is active (and `AVAILABLE` if it was
    /// `INACTIVE`) and every member is `AVAILABLE`.
    pub fn assemble_crew(
        &mut self,
        vehicle:     VehicleId,
        members:     &[StaffId],
        description: &str,
    ) -> DispatchResult<Crew> {
        let mut vehicle = self.load_vehicle(vehicle)?;
        if let Some(existing) = self.store.find_active_crew_for_vehicle(vehicle.id)? {
            return Err(DispatchError::InvalidState(format!(
                "vehicle {} already has active crew {}",
                vehicle.plate, existing.id.0
            )));
        }

        let mut staff = Vec::with_capacity(members.len());
        let mut memberships = Vec::with_capacity(members.len());
        for &id in members {
            let s = self
                .store
                .find_staff(id)?
                .ok_or(DispatchError::NotFound(EntityRef::Staff(id)))?;
            memberships.push(self.store.count_active_crew_memberships_for_staff(id)?);
            staff.push(s);
        }
        let candidates: Vec<CrewCandidate<'_>> = staff
            .iter()
            .zip(&memberships)
            .map(|(s, &n)| CrewCandidate::new(s, n))
            .collect();
        crew::validate_crew(vehicle.class, &candidates)?;

        let crew = self.store.create_crew(CrewDraft {
            vehicle:     vehicle.id,
            description: description.to_owned(),
            members:     members.to_vec(),
        })?;

        vehicle.active = true;
        if vehicle.status == VehicleStatus::Inactive {
            vehicle.status = VehicleStatus::Available;
        }
        self.store.save_vehicle(&vehicle)?;

        for mut s in staff {
            if s.status != StaffStatus::Available {
                s.status = StaffStatus::Available;
                self.store.save_staff(&s)?;
            }
        }
        info!(crew = %crew.id, vehicle = %vehicle.id, members = members.len(), "crew assembled");
        Ok(crew)
    }

    /// Release the active crew of `vehicle` and take the vehicle out of
    /// service.
    pub fn disband_crew(&mut self, vehicle: VehicleId) -> DispatchResult<Crew> {
        let mut vehicle = self.load_vehicle(vehicle)?;
        let Some(mut crew) = self.store.find_active_crew_for_vehicle(vehicle.id)? else {
            return Err(DispatchError::InvalidState(format!(
                "vehicle {} has no active crew",
                vehicle.plate
            )));
        };
        if let Some(record) = self.store.find_open_service_record_for_vehicle(vehicle.id)? {
            return Err(DispatchError::InvalidState(format!(
                "vehicle {} is serving incident {}",
                vehicle.plate, record.incident.0
            )));
        }

        self.set_member_status(&crew, StaffStatus::Available, |s| {
            matches!(s, StaffStatus::Available | StaffStatus::Busy)
        })?;
        crew.active = false;
        self.store.save_crew(&crew)?;

        vehicle.active = false;
        vehicle.status = VehicleStatus::Inactive;
        self.store.save_vehicle(&vehicle)?;
        info!(crew = %crew.id, vehicle = %vehicle.id, "crew disbanded");
        Ok(crew)
    }

    /// Edit a crew's roster and description.
    ///
    /// An active crew may not be edited while it is serving an incident and
    /// keeps its vehicle.  An inactive crew given `vehicle` is bound to it and
    /// reactivated; the vehicle must not already have an active crew.
    ///
    /// Members already on the roster are only checked for shift.  New
    /// members go through the full crew checks, and role coverage is checked
    /// against the class of the crew's vehicle.
    pub fn update_crew(
        &mut self,
        crew:        CrewId,
        description: Option<&str>,
        members:     &[StaffId],
        vehicle:     Option<VehicleId>,
    ) -> DispatchResult<Crew> {
        let mut crew = self
            .store
            .find_crew(crew)?
            .ok_or(DispatchError::NotFound(EntityRef::Crew(crew)))?;

        if crew.active {
            if let Some(record) = self.serving_record(&crew)? {
                return Err(DispatchError::InvalidState(format!(
                    "crew {} is serving incident {}",
                    crew.id.0, record.incident.0
                )));
            }
            if vehicle.is_some_and(|v| crew.vehicle != Some(v)) {
                return Err(DispatchError::InvalidState(format!(
                    "crew {} is active and cannot change vehicle",
                    crew.id.0
                )));
            }
        }

        let reactivate = !crew.active && vehicle.is_some();
        let target = match (reactivate, vehicle, crew.vehicle) {
            (true, Some(id), _) => {
                let v = self.load_vehicle(id)?;
                if let Some(existing) = self.store.find_active_crew_for_vehicle(v.id)? {
                    return Err(DispatchError::InvalidState(format!(
                        "vehicle {} already has active crew {}",
                        v.plate, existing.id.0
                    )));
                }
                Some(v)
            }
            (_, _, Some(current)) => Some(self.load_vehicle(current)?),
            _ => None,
        };

        let check_memberships = reactivate || crew.active;
        let mut staff = Vec::with_capacity(members.len());
        let mut retained = Vec::with_capacity(members.len());
        let mut memberships = Vec::with_capacity(members.len());
        for &id in members {
            let s = self
                .store
                .find_staff(id)?
                .ok_or(DispatchError::NotFound(EntityRef::Staff(id)))?;
            let kept = crew.members.contains(&id);
            let n = if check_memberships && !kept {
                self.store.count_active_crew_memberships_for_staff(id)?
            } else {
                0
            };
            staff.push(s);
            retained.push(kept);
            memberships.push(n);
        }
        let candidates: Vec<CrewCandidate<'_>> = staff
            .iter()
            .zip(retained.iter().zip(&memberships))
            .map(|(s, (&kept, &n))| if kept { CrewCandidate::retained(s) } else { CrewCandidate::new(s, n) })
            .collect();
        match &target {
            Some(v) => crew::validate_crew(v.class, &candidates)?,
            None => crew::validate_members(&candidates)?,
        }

        if reactivate {
            if let Some(mut new_vehicle) = target {
                if let Some(old) = crew.vehicle.filter(|&old| old != new_vehicle.id) {
                    self.retire_vehicle_without_crew(old)?;
                }
                new_vehicle.active = true;
                if new_vehicle.status == VehicleStatus::Inactive {
                    new_vehicle.status = VehicleStatus::Available;
                }
                self.store.save_vehicle(&new_vehicle)?;
                crew.vehicle = Some(new_vehicle.id);
                crew.active = true;
            }
        }
        if let Some(d) = description.map(str::trim).filter(|d| !d.is_empty()) {
            crew.description = d.to_owned();
        }
        crew.members = members.to_vec();
        self.store.save_crew(&crew)?;

        info!(
            crew = %crew.id,
            members = crew.members.len(),
            active = crew.active,
            reactivated = reactivate,
            "crew updated"
        );
        Ok(crew)
    }

    // ── Resources ─────────────────────────────────────────────────────────

    /// Put `vehicle` in or out of service.
    ///
    /// Activating sets it `AVAILABLE`, deactivating sets it `INACTIVE`.  Both
    /// are refused while the vehicle has an open service record, and
    /// deactivation is refused while it is `BUSY`.
    pub fn set_vehicle_active(&mut self, vehicle: VehicleId, active: bool) -> DispatchResult<Vehicle> {
        let mut vehicle = self.load_vehicle(vehicle)?;
        if let Some(record) = self.store.find_open_service_record_for_vehicle(vehicle.id)? {
            return Err(DispatchError::InvalidState(format!(
                "vehicle {} is serving incident {}",
                vehicle.plate, record.incident.0
            )));
        }
        if !active && vehicle.status == VehicleStatus::Busy {
            return Err(DispatchError::InvalidState(format!("vehicle {} is BUSY", vehicle.plate)));
        }

        vehicle.active = active;
        vehicle.status = if active { VehicleStatus::Available } else { VehicleStatus::Inactive };
        self.store.save_vehicle(&vehicle)?;
        info!(vehicle = %vehicle.id, active, "vehicle status changed");
        Ok(vehicle)
    }

    /// Change a staff member's status.  `BUSY` members are serving and are
    /// left alone; only dispatch sets `BUSY`.
    pub fn set_staff_status(&mut self, staff: StaffId, status: StaffStatus) -> DispatchResult<Staff> {
        let mut s = self.load_idle_staff(staff)?;
        if status == StaffStatus::Busy {
            return Err(DispatchError::InvalidState(format!(
                "staff member {} cannot be set BUSY outside a dispatch",
                s.name
            )));
        }
        s.status = status;
        self.store.save_staff(&s)?;
        info!(staff = %s.id, %status, "staff status changed");
        Ok(s)
    }

    /// Disable a staff member.  Refused while they are serving.
    pub fn disable_staff(&mut self, staff: StaffId) -> DispatchResult<Staff> {
        let mut s = self.load_idle_staff(staff)?;
        s.active = false;
        self.store.save_staff(&s)?;
        info!(staff = %s.id, "staff member disabled");
        Ok(s)
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn load_incident(&self, id: IncidentId) -> DispatchResult<Incident> {
        self.store.find_incident(id)?.ok_or(DispatchError::NotFound(EntityRef::Incident(id)))
    }

    fn load_vehicle(&self, id: VehicleId) -> DispatchResult<Vehicle> {
        self.store.find_vehicle(id)?.ok_or(DispatchError::NotFound(EntityRef::Vehicle(id)))
    }

    fn load_record(&self, incident: IncidentId) -> DispatchResult<ServiceRecord> {
        self.store
            .find_service_record_by_incident(incident)?
            .ok_or(DispatchError::NotFound(EntityRef::ServiceRecordFor(incident)))
    }

    fn load_idle_staff(&self, id: StaffId) -> DispatchResult<Staff> {
        let s = self.store.find_staff(id)?.ok_or(DispatchError::NotFound(EntityRef::Staff(id)))?;
        if s.status == StaffStatus::Busy {
            return Err(DispatchError::InvalidState(format!(
                "staff member {} is serving an incident",
                s.name
            )));
        }
        Ok(s)
    }

    /// The open service record `crew` is serving, if any.
    fn serving_record(&self, crew: &Crew) -> DispatchResult<Option<ServiceRecord>> {
        let Some(vehicle) = crew.vehicle else {
            return Ok(None);
        };
        Ok(self
            .store
            .find_open_service_record_for_vehicle(vehicle)?
            .filter(|r| r.crew == crew.id))
    }

    /// Take `vehicle` out of service if no active crew is bound to it.
    fn retire_vehicle_without_crew(&mut self, vehicle: VehicleId) -> DispatchResult<()> {
        if self.store.find_active_crew_for_vehicle(vehicle)?.is_some() {
            return Ok(());
        }
        let Some(mut v) = self.store.find_vehicle(vehicle)? else {
            return Ok(());
        };
        v.active = false;
        v.status = VehicleStatus::Inactive;
        self.store.save_vehicle(&v)?;
        Ok(())
    }

    /// Members of `crew`, skipping ids the store no longer knows.
    fn load_members(&self, crew: &Crew) -> DispatchResult<Vec<Staff>> {
        let mut members = Vec::with_capacity(crew.members.len());
        for &id in &crew.members {
            match self.store.find_staff(id)? {
                Some(s) => members.push(s),
                None => warn!(crew = %crew.id, staff = %id, "crew member missing from store"),
            }
        }
        Ok(members)
    }

    /// Set `status` on every member whose current status passes `filter`.
    fn set_member_status(
        &mut self,
        crew:   &Crew,
        status: StaffStatus,
        filter: impl Fn(StaffStatus) -> bool,
    ) -> DispatchResult<()> {
        for mut s in self.load_members(crew)? {
            if s.status != status && filter(s.status) {
                s.status = status;
                self.store.save_staff(&s)?;
            }
        }
        Ok(())
    }

    /// Every write of a dispatch after the vehicle is reserved.
    fn commit_dispatch(
        &mut self,
        incident: &mut Incident,
        chosen:   &Candidate,
        crew:     &Crew,
        now:      Timestamp,
    ) -> DispatchResult<(Vehicle, ServiceRecord, IncidentStatus)> {
        let vehicle = self.load_vehicle(chosen.vehicle)?;
        self.set_member_status(crew, StaffStatus::Busy, |_| true)?;

        let prev = lifecycle::transition(incident, IncidentStatus::Dispatched)?;
        self.store.save_incident(incident)?;

        let record = self.store.create_service_record(ServiceRecordDraft {
            incident:      incident.id,
            vehicle:       vehicle.id,
            crew:          crew.id,
            dispatched_at: now,
            distance_km:   chosen.distance_km,
        })?;
        Ok((vehicle, record, prev))
    }

    /// Undo a dispatch that failed after reserving `vehicle`.  Best effort:
    /// each failed step is logged and the rest still run.
    fn release_reservation(&mut self, incident: &Incident, vehicle: VehicleId, crew: &Crew) {
        warn!(incident = %incident.id, %vehicle, "dispatch failed after reservation, releasing vehicle");
        if let Err(e) = self.store.save_incident(incident) {
            warn!(incident = %incident.id, error = %e, "could not restore incident");
        }
        if let Err(e) = self.set_member_status(crew, StaffStatus::Available, |s| s == StaffStatus::Busy) {
            warn!(crew = %crew.id, error = %e, "could not release crew");
        }
        let released = self.load_vehicle(vehicle).and_then(|mut v| {
            if v.status == VehicleStatus::Busy {
                v.status = VehicleStatus::Available;
                self.store.save_vehicle(&v)?;
            }
            Ok(())
        });
        if let Err(e) = released {
            warn!(%vehicle, error = %e, "could not release vehicle");
        }
    }

    /// Eligible vehicles for `incident`, ranked nearest first.
    fn candidates(&self, incident: &Incident) -> DispatchResult<Vec<Candidate>> {
        let rule = self.config.rule(incident.severity);
        let graph = RoadGraph::from_segments(&self.store.all_road_segments()?);

        let mut out = Vec::new();
        for vehicle in self.store.find_available_vehicles(Some(rule.class))? {
            if !vehicle.is_dispatchable() || !policy::class_compatible(rule.class, vehicle.class) {
                continue;
            }
            let Some(crew) = self.store.find_active_crew_for_vehicle(vehicle.id)? else {
                debug!(vehicle = %vehicle.id, "skipped: no active crew");
                continue;
            };
            if !crew::is_complete(vehicle.class, &self.load_members(&crew)?) {
                debug!(vehicle = %vehicle.id, crew = %crew.id, "skipped: crew incomplete");
                continue;
            }
            let route = self.router.route(&graph, vehicle.base, incident.location);
            if !route.is_reachable() {
                debug!(vehicle = %vehicle.id, "skipped: incident unreachable from base");
                continue;
            }
            let minutes = self.config.travel_minutes(route.distance_km);
            out.push(Candidate {
                vehicle:        vehicle.id,
                plate:          vehicle.plate,
                class:          vehicle.class,
                crew:           crew.id,
                distance_km:    route.distance_km,
                travel_minutes: minutes,
                sla_minutes:    rule.sla_minutes,
                within_sla:     minutes <= rule.sla_minutes,
                route,
            });
        }
        policy::rank(&mut out);
        Ok(out)
    }

    /// Store the chosen path.  Failure is logged and otherwise ignored.
    fn save_route_path(&mut self, record: &ServiceRecord, route: &Route) {
        let path: Vec<RoutePathSegment> = route
            .segments
            .iter()
            .zip(1u32..)
            .map(|(&segment, order)| RoutePathSegment { record: record.id, segment, order })
            .collect();
        if let Err(e) = self.store.save_route_path(record.id, &path) {
            warn!(record = %record.id, error = %e, "could not save route path");
        }
    }

    fn apply_arrival(
        &mut self,
        mut incident: Incident,
        mut record:   ServiceRecord,
        actor:        &Actor,
        now:          Timestamp,
    ) -> DispatchResult<Incident> {
        let before = incident.clone();
        let prev = lifecycle::complete(&mut incident, now)?;
        record.arrived_at = Some(now);
        // The incident goes first; a failed record write puts it back so the
        // next poll retries the arrival.
        self.store.save_incident(&incident)?;
        if let Err(e) = self.store.save_service_record(&record) {
            if let Err(undo) = self.store.save_incident(&before) {
                warn!(incident = %incident.id, error = %undo, "could not restore incident");
            }
            return Err(e.into());
        }

        let minutes = incident.service_minutes.unwrap_or_default();
        let target = incident.sla_target_minutes;
        info!(incident = %incident.id, minutes, target, sla_met = ?incident.sla_met, "arrival recorded");

        let verdict = match incident.overage_minutes {
            Some(over) => format!("SLA missed by {over} min"),
            None => "SLA met".to_owned(),
        };
        let how = match actor {
            Actor::System => "Arrival recorded automatically",
            Actor::User(_) => "Arrival recorded",
        };
        self.record_audit(AuditEntry::new(
            incident.id,
            actor.clone(),
            AuditKind::Completed,
            Some(prev),
            IncidentStatus::Completed,
            format!("{how}; service time {minutes} min, SLA target {target} min, {verdict}"),
            now,
        ));
        Ok(incident)
    }

    fn apply_return(
        &mut self,
        incident:   &Incident,
        mut record: ServiceRecord,
        now:        Timestamp,
    ) -> DispatchResult<()> {
        record.returned_at = Some(now);
        self.store.save_service_record(&record)?;

        let mut vehicle = self.load_vehicle(record.vehicle)?;
        if vehicle.status == VehicleStatus::Busy {
            vehicle.status = VehicleStatus::Available;
            self.store.save_vehicle(&vehicle)?;
        }
        match self.store.find_crew(record.crew)? {
            Some(crew) => {
                self.set_member_status(&crew, StaffStatus::Available, |s| s == StaffStatus::Busy)?
            }
            None => warn!(crew = %record.crew, "crew of returning vehicle missing from store"),
        }
        info!(incident = %incident.id, vehicle = %vehicle.id, "vehicle back at base");

        let return_minutes = record.arrived_at.map_or(0, |a| now.minutes_since(a));
        self.record_audit(AuditEntry::new(
            incident.id,
            Actor::System,
            AuditKind::Returned,
            Some(incident.status),
            incident.status,
            format!(
                "Vehicle {} back at base after {return_minutes} min return leg; vehicle and crew released",
                vehicle.plate
            ),
            now,
        ));
        Ok(())
    }

    fn record_audit(&mut self, entry: AuditEntry) {
        if let Err(e) = self.audit.append(&entry) {
            warn!(incident = %entry.incident, kind = %entry.kind, error = %e, "audit append failed");
            // Keep only the first error.
            if self.audit_error.is_none() {
                self.audit_error = Some(e);
            }
        }
    }
}
