//! city — ambulance dispatch demo.
//!
//! Runs forty simulated minutes of a small city's dispatch desk: crews are
//! assembled, calls come in and are dispatched, and every incident is polled
//! once per minute so arrivals and returns are recorded as their travel
//! estimates run out.  The audit trail is written to `output/city/`.
//!
//! ```text
//! city [CONFIG.json] [OUTPUT_DIR]
//! ```
//!
//! `CONFIG.json` overrides any `DispatchConfig` field, e.g. `nearest.json`
//! switches to the nearest-vehicle policy.  Set `RUST_LOG=info` (or `debug`)
//! to see the engine's own log lines.

mod network;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ems_audit::{Actor, AuditSink, CsvAuditWriter};
use ems_core::{IncidentId, IncidentStatus, LocationId, Severity, Timestamp};
use ems_dispatch::{DispatchConfig, DispatchError, Dispatcher};
use ems_routing::DijkstraRouter;
use ems_store::{IncidentStore, ServiceRecordStore, VehicleStore};

use network::{
    AIRPORT, CREWS, HARBOR, HOSPITAL_HILL, RIVERSIDE, build_city, location_name,
};

// ── Constants ─────────────────────────────────────────────────────────────────

const START:       Timestamp = Timestamp(1_700_000_000); // fixed reference, 00:00 UTC
const SIM_MINUTES: i64       = 40;

// ── Calls ─────────────────────────────────────────────────────────────────────

struct Call {
    minute:    i64,
    location:  LocationId,
    severity:  Severity,
    kind:      &'static str,
    notes:     &'static str,
    /// Dispatch as soon as the call is registered.
    dispatch:  bool,
    cancel_at: Option<i64>,
}

static CALLS: [Call; 5] = [
    Call {
        minute: 0, location: HOSPITAL_HILL, severity: Severity::High,
        kind: "chest pain", notes: "male, 60s, conscious", dispatch: true, cancel_at: None,
    },
    Call {
        minute: 2, location: RIVERSIDE, severity: Severity::Medium,
        kind: "fall", notes: "possible wrist fracture", dispatch: true, cancel_at: None,
    },
    Call {
        minute: 4, location: AIRPORT, severity: Severity::Low,
        kind: "fever", notes: "", dispatch: true, cancel_at: None,
    },
    Call {
        minute: 5, location: HARBOR, severity: Severity::Low,
        kind: "minor cut", notes: "caller will drive to clinic", dispatch: false, cancel_at: Some(7),
    },
    Call {
        minute: 9, location: AIRPORT, severity: Severity::High,
        kind: "cardiac arrest", notes: "bystander CPR in progress", dispatch: true, cancel_at: None,
    },
];

/// Last state printed for an incident.
struct Tracked {
    id:        IncidentId,
    call:      &'static Call,
    status:    IncidentStatus,
    returned:  bool,
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let config = load_config(args.next().map(PathBuf::from).as_deref())?;
    let out_dir = args.next().map_or_else(|| PathBuf::from("output/city"), PathBuf::from);

    println!("=== city — ambulance dispatch ===");
    println!(
        "Policy: {:?}  |  Speed: {} km/h  |  Minutes: {SIM_MINUTES}",
        config.policy, config.speed_kmh
    );
    println!();

    // 1. City, fleet, and roster.
    let store = build_city()?;
    std::fs::create_dir_all(&out_dir)?;
    let audit = CsvAuditWriter::new(&out_dir)?;
    let mut dispatcher = Dispatcher::new(config, store, DijkstraRouter, audit)?;

    // 2. Bring the fleet into service.
    for plan in &CREWS {
        let crew = dispatcher
            .assemble_crew(plan.vehicle, plan.members, plan.description)
            .with_context(|| format!("assembling crew \"{}\"", plan.description))?;
        println!("Crew {} on vehicle {} ({} members)", crew.id.0, plan.vehicle.0, crew.members.len());
    }
    println!();

    // 3. Run the desk minute by minute.
    let operator = Actor::user("desk1");
    let mut tracked: Vec<Tracked> = Vec::new();

    for minute in 0..=SIM_MINUTES {
        let now = START.plus_minutes(minute);

        for call in CALLS.iter().filter(|c| c.minute == minute) {
            let incident = dispatcher.register_incident(
                call.location,
                call.severity,
                call.kind,
                call.notes,
                &operator,
                now,
            )?;
            println!(
                "[{minute:>3}m] #{} {} ({}) at {}, SLA {} min",
                incident.id.0,
                call.kind,
                call.severity,
                location_name(call.location),
                incident.sla_target_minutes
            );
            if call.dispatch {
                try_dispatch(&mut dispatcher, incident.id, &operator, now, minute)?;
            }
            tracked.push(Tracked {
                id:       incident.id,
                call,
                status:   incident.status,
                returned: false,
            });
        }

        for t in tracked.iter().filter(|t| t.call.cancel_at == Some(minute)) {
            dispatcher.cancel_incident(t.id, &operator, now)?;
            println!("[{minute:>3}m] #{} cancelled by caller", t.id.0);
        }

        for t in &mut tracked {
            let snap = dispatcher.evaluate_and_advance(t.id, now)?;
            if snap.status == IncidentStatus::Completed && t.status != IncidentStatus::Completed {
                println!(
                    "[{minute:>3}m] #{} {} on scene, SLA {}",
                    t.id.0,
                    snap.plate.as_deref().unwrap_or("?"),
                    if snap.sla.exceeded { "MISSED" } else { "met" }
                );
            }
            if snap.is_returned && !t.returned {
                println!(
                    "[{minute:>3}m] #{} {} back at base",
                    t.id.0,
                    snap.plate.as_deref().unwrap_or("?")
                );
            }
            t.status = snap.status;
            t.returned = snap.is_returned;
        }
    }
    println!();

    // 4. Summary.
    let end = START.plus_minutes(SIM_MINUTES);
    println!(
        "{:<4} {:<16} {:<7} {:<11} {:<8} {:>8} {:>5}",
        "#", "Call", "Sev", "Status", "Vehicle", "Service", "SLA"
    );
    println!("{}", "-".repeat(64));
    for t in &tracked {
        let incident = dispatcher
            .store()
            .find_incident(t.id)?
            .with_context(|| format!("incident {} vanished", t.id.0))?;
        let plate = match dispatcher.store().find_service_record_by_incident(t.id)? {
            Some(r) => dispatcher.store().find_vehicle(r.vehicle)?.map(|v| v.plate),
            None => None,
        };
        let service = incident
            .service_minutes
            .map_or_else(|| "-".to_owned(), |m| format!("{m} min"));
        let sla = match (incident.sla_met, incident.status) {
            (Some(true), _) => "met",
            (Some(false), _) => "miss",
            (None, IncidentStatus::Cancelled) => "-",
            (None, _) => {
                if dispatcher.peek_timer(t.id, end)?.sla.exceeded { "miss" } else { "open" }
            }
        };
        println!(
            "{:<4} {:<16} {:<7} {:<11} {:<8} {:>8} {:>5}",
            t.id.0,
            t.call.kind,
            incident.severity.as_str(),
            incident.status.as_str(),
            plate.as_deref().unwrap_or("-"),
            service,
            sla
        );
    }
    println!();

    // 5. One timer snapshot as the operator console would receive it.
    if let Some(first) = tracked.first() {
        let snap = dispatcher.peek_timer(first.id, end)?;
        println!("Timer snapshot for #{}:", first.id.0);
        println!("{}", serde_json::to_string_pretty(&snap)?);
        println!();
    }

    // 6. Flush the audit trail.
    if let Some(e) = dispatcher.take_audit_error() {
        warn!(error = %e, "some audit entries were not written");
    }
    let (_, _, mut audit) = dispatcher.into_parts();
    audit.finish()?;
    info!(dir = %out_dir.display(), "audit trail written");
    println!("Audit trail: {}", out_dir.join("audit_log.csv").display());

    Ok(())
}

fn try_dispatch(
    dispatcher: &mut Dispatcher<ems_store::MemoryStore, DijkstraRouter, CsvAuditWriter>,
    incident:   IncidentId,
    operator:   &Actor,
    now:        Timestamp,
    minute:     i64,
) -> Result<()> {
    match dispatcher.dispatch(incident, operator, now) {
        Ok(a) => {
            println!(
                "[{minute:>3}m] #{} -> {} ({}) {:.1} km, ETA {} min{}",
                incident.0,
                a.vehicle.plate,
                a.vehicle.class,
                a.record.distance_km,
                a.travel_minutes,
                if a.within_sla { "" } else { ", beyond SLA" }
            );
            Ok(())
        }
        Err(DispatchError::NoEligibleResource { reason, .. }) => {
            println!("[{minute:>3}m] #{} not dispatched: {reason}", incident.0);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Default configuration, or `path` read as JSON over the defaults.
fn load_config(path: Option<&Path>) -> Result<DispatchConfig> {
    let Some(path) = path else {
        return Ok(DispatchConfig::default());
    };
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let config = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}
