//! Service-level and phase timers.
//!
//! [`TimerSnapshot::compute`] is a pure function of an incident, its service
//! record and `now`.  It never writes: when a phase budget has run out it
//! lists the transition in [`TimerSnapshot::pending`] and the dispatcher
//! applies it (see `Dispatcher::evaluate_and_advance`).
//!
//! # Phases
//!
//! | Phase     | Budget                         | On exhaustion                |
//! |-----------|--------------------------------|------------------------------|
//! | outbound  | travel estimate                | record arrival, complete     |
//! | on scene  | *(none, arrival completes)*    |                              |
//! | return    | travel estimate (same road)    | record return, free vehicle  |
//!
//! The SLA clock runs from opening to arrival and ignores the return leg.

use ems_core::{
    Incident, IncidentId, IncidentStatus, ServiceRecord, Timestamp, format_minutes,
};

use crate::DispatchConfig;

/// A transition the timer found due.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Advance {
    /// Outbound estimate used up with no arrival recorded.
    RecordArrival { at: Timestamp },
    /// Return budget used up with no return recorded.
    RecordReturn { at: Timestamp },
}

/// SLA figures.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlaStatus {
    pub target_minutes:    i64,
    /// Opening → arrival, or → now while not arrived.
    pub elapsed_minutes:   i64,
    /// `target - elapsed`; negative once exceeded.
    pub remaining_minutes: i64,
    pub at_risk:           bool,
    pub exceeded:          bool,
    pub remaining_text:    String,
}

/// Travel figures, present once a vehicle has been dispatched.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TravelTimes {
    pub estimate_minutes:             i64,
    /// Dispatch → now (→ return once returned).
    pub since_dispatch_minutes:       i64,
    pub remaining_to_arrival_minutes: i64,
    pub remaining_to_arrival_text:    String,

    // ── After arrival ─────────────────────────────────────────────────────
    pub since_arrival_minutes:        Option<i64>,
    pub return_budget_minutes:        Option<i64>,
    /// Minutes of the return budget used, capped at the budget.
    pub into_return_minutes:          Option<i64>,
    pub remaining_to_return_minutes:  Option<i64>,
}

/// Everything an operator display needs about one incident at `now`.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimerSnapshot {
    pub incident:      IncidentId,
    pub status:        IncidentStatus,
    pub now:           Timestamp,
    pub opened_at:     Timestamp,
    pub dispatched_at: Option<Timestamp>,
    pub arrived_at:    Option<Timestamp>,
    pub returned_at:   Option<Timestamp>,
    pub closed_at:     Option<Timestamp>,
    pub distance_km:   Option<f64>,
    pub plate:         Option<String>,

    pub total_elapsed_minutes: i64,
    pub total_elapsed_text:    String,

    pub sla:    SlaStatus,
    pub travel: Option<TravelTimes>,

    pub is_dispatched: bool,
    pub is_arrived:    bool,
    pub is_returned:   bool,
    pub is_completed:  bool,

    /// Transitions that are due; empty once the incident is up to date.
    pub pending: Vec<Advance>,
}

impl TimerSnapshot {
    /// Compute the snapshot of `incident` at `now`.
    ///
    /// `record` is the incident's service record (if dispatched) and `plate`
    /// the plate of its vehicle.
    pub fn compute(
        incident: &Incident,
        record:   Option<&ServiceRecord>,
        plate:    Option<&str>,
        config:   &DispatchConfig,
        now:      Timestamp,
    ) -> TimerSnapshot {
        let opened = incident.opened_at;
        let mut pending = Vec::new();

        // Cancelled incidents stop every clock at closure.
        let clock = match incident.status {
            IncidentStatus::Cancelled => incident.closed_at.unwrap_or(now),
            _ => now,
        };

        let arrived_at  = record.and_then(|r| r.arrived_at);
        let returned_at = record.and_then(|r| r.returned_at);

        let travel = record.map(|r| {
            let estimate = config.travel_minutes(r.distance_km);
            let since_dispatch = returned_at.unwrap_or(clock).minutes_since(r.dispatched_at);

            let remaining_to_arrival = match arrived_at {
                Some(_) => 0,
                None => (estimate - clock.minutes_since(r.dispatched_at)).max(0),
            };
            if arrived_at.is_none() && remaining_to_arrival == 0 && incident.status.is_in_progress() {
                pending.push(Advance::RecordArrival { at: now });
            }

            let mut times = TravelTimes {
                estimate_minutes:             estimate,
                since_dispatch_minutes:       since_dispatch,
                remaining_to_arrival_minutes: remaining_to_arrival,
                remaining_to_arrival_text:    format_minutes(remaining_to_arrival),
                since_arrival_minutes:        None,
                return_budget_minutes:        None,
                into_return_minutes:          None,
                remaining_to_return_minutes:  None,
            };

            if let Some(arrived) = arrived_at {
                let since_arrival = returned_at.unwrap_or(clock).minutes_since(arrived).max(0);
                let remaining = match returned_at {
                    Some(_) => 0,
                    None => (estimate - since_arrival).max(0),
                };
                if returned_at.is_none() && remaining == 0 {
                    pending.push(Advance::RecordReturn { at: now });
                }
                times.since_arrival_minutes       = Some(since_arrival);
                times.return_budget_minutes       = Some(estimate);
                times.into_return_minutes         = Some(since_arrival.min(estimate));
                times.remaining_to_return_minutes = Some(remaining);
            }
            times
        });

        // ── Total elapsed ─────────────────────────────────────────────────
        let total_elapsed = match (arrived_at, returned_at) {
            (_, Some(returned)) => returned.minutes_since(opened),
            (Some(arrived), None) => arrived.minutes_since(opened) + clock.minutes_since(arrived),
            (None, None) => clock.minutes_since(opened),
        };

        // ── SLA ───────────────────────────────────────────────────────────
        let target = incident.sla_target_minutes;
        let sla_elapsed = match (incident.service_minutes, arrived_at) {
            (Some(frozen), _) if incident.status == IncidentStatus::Completed => frozen,
            (_, Some(arrived)) => arrived.minutes_since(opened),
            _ => clock.minutes_since(opened),
        };
        let remaining = target - sla_elapsed;
        let flagged = incident.status != IncidentStatus::Cancelled;
        let sla = SlaStatus {
            target_minutes:    target,
            elapsed_minutes:   sla_elapsed,
            remaining_minutes: remaining,
            at_risk: flagged
                && !incident.status.is_terminal()
                && remaining >= 0
                && remaining as f64 <= config.at_risk_fraction * target as f64,
            exceeded:       flagged && remaining < 0,
            remaining_text: format_minutes(remaining),
        };

        TimerSnapshot {
            incident:      incident.id,
            status:        incident.status,
            now,
            opened_at:     opened,
            dispatched_at: record.map(|r| r.dispatched_at),
            arrived_at,
            returned_at,
            closed_at:     incident.closed_at,
            distance_km:   record.map(|r| r.distance_km),
            plate:         plate.map(str::to_owned),

            total_elapsed_minutes: total_elapsed,
            total_elapsed_text:    format_minutes(total_elapsed),

            sla,
            travel,

            is_dispatched: record.is_some(),
            is_arrived:    arrived_at.is_some(),
            is_returned:   returned_at.is_some(),
            is_completed:  incident.status == IncidentStatus::Completed,

            pending,
        }
    }

    /// `true` if no transition is due.
    pub fn is_settled(&self) -> bool {
        self.pending.is_empty()
    }
}
