//! Dispatch engine configuration.

use ems_core::{Severity, VehicleClass};

use crate::{DispatchError, DispatchResult};

/// How the assignment policy chooses among eligible vehicles.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SelectionPolicy {
    /// Nearest vehicle whose estimated travel time fits the SLA target.  Fails
    /// when no candidate can make it in time.
    #[default]
    SlaBounded,
    /// Nearest eligible vehicle, SLA evaluated only when the incident closes.
    Nearest,
}

/// What a severity level demands.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeverityRule {
    pub class:       VehicleClass,
    pub sla_minutes: i64,
}

/// Top-level dispatch configuration.
///
/// The defaults are the service's operating rules; the demo binary can load
/// overrides from a JSON file.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DispatchConfig {
    /// Assumed average road speed, used for every travel estimate.  Default: 60.
    pub speed_kmh: f64,

    /// An SLA is "at risk" when the remaining minutes are at most this
    /// fraction of the target.  Default: 0.25.
    pub at_risk_fraction: f64,

    pub policy: SelectionPolicy,

    pub high:   SeverityRule,
    pub medium: SeverityRule,
    pub low:    SeverityRule,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            speed_kmh:        60.0,
            at_risk_fraction: 0.25,
            policy:           SelectionPolicy::SlaBounded,
            high:   SeverityRule { class: VehicleClass::Icu,   sla_minutes: 8 },
            medium: SeverityRule { class: VehicleClass::Basic, sla_minutes: 15 },
            low:    SeverityRule { class: VehicleClass::Basic, sla_minutes: 30 },
        }
    }
}

impl DispatchConfig {
    /// Default rules with a different selection policy.
    pub fn with_policy(policy: SelectionPolicy) -> Self {
        Self { policy, ..Self::default() }
    }

    #[inline]
    pub fn rule(&self, severity: Severity) -> SeverityRule {
        match severity {
            Severity::High   => self.high,
            Severity::Medium => self.medium,
            Severity::Low    => self.low,
        }
    }

    /// Estimated whole minutes to drive `distance_km` (ceiling).
    #[inline]
    pub fn travel_minutes(&self, distance_km: f64) -> i64 {
        crate::policy::travel_minutes(distance_km, self.speed_kmh)
    }

    /// Reject configurations the engine cannot work with.
    pub fn validate(&self) -> DispatchResult<()> {
        if !self.speed_kmh.is_finite() || self.speed_kmh <= 0.0 {
            return Err(DispatchError::Config(format!(
                "speed_kmh must be a positive number, got {}",
                self.speed_kmh
            )));
        }
        if !(0.0..=1.0).contains(&self.at_risk_fraction) {
            return Err(DispatchError::Config(format!(
                "at_risk_fraction must be within [0, 1], got {}",
                self.at_risk_fraction
            )));
        }
        for (name, rule) in [("high", self.high), ("medium", self.medium), ("low", self.low)] {
            if rule.sla_minutes <= 0 {
                return Err(DispatchError::Config(format!(
                    "{name} severity SLA must be positive, got {} min",
                    rule.sla_minutes
                )));
            }
        }
        Ok(())
    }
}
