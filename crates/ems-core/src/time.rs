//! Wall-clock time model.
//!
//! # Design
//!
//! Timestamps are Unix seconds held in a `Timestamp(i64)` newtype.  The
//! engine never reads the system clock itself: every operation that depends
//! on "now" takes it as an argument, so timer evaluation is a pure function
//! of its inputs and tests can move time freely.
//!
//! Durations are reported in **whole minutes**.  The elapsed minutes between
//! two instants truncate toward zero: 5 min 59 s is 5 minutes.

use std::fmt;

// ── Timestamp ─────────────────────────────────────────────────────────────────

/// An instant, in seconds since the Unix epoch.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const EPOCH: Timestamp = Timestamp(0);

    #[inline]
    pub fn from_unix_secs(secs: i64) -> Self {
        Timestamp(secs)
    }

    #[inline]
    pub fn unix_secs(self) -> i64 {
        self.0
    }

    /// The instant `secs` seconds after `self`.
    #[inline]
    pub fn plus_secs(self, secs: i64) -> Timestamp {
        Timestamp(self.0 + secs)
    }

    /// The instant `minutes` minutes after `self`.
    #[inline]
    pub fn plus_minutes(self, minutes: i64) -> Timestamp {
        Timestamp(self.0 + minutes * 60)
    }

    /// Whole minutes elapsed from `earlier` to `self`.
    ///
    /// Truncates toward zero; negative if `earlier` is after `self`.
    #[inline]
    pub fn minutes_since(self, earlier: Timestamp) -> i64 {
        (self.0 - earlier.0) / 60
    }
}

impl std::ops::Sub for Timestamp {
    type Output = i64;
    /// Seconds between two instants.
    #[inline]
    fn sub(self, rhs: Timestamp) -> i64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

// ── Formatting ────────────────────────────────────────────────────────────────

/// Human-readable minute count for operator displays.
///
/// `85 → "1h 25m"`, `15 → "15m"`, `-3 → "-3m"`, `120 → "2h 0m"`.
pub fn format_minutes(minutes: i64) -> String {
    let sign = if minutes < 0 { "-" } else { "" };
    let abs = minutes.unsigned_abs();
    let (hours, mins) = (abs / 60, abs % 60);
    if hours > 0 {
        format!("{sign}{hours}h {mins}m")
    } else {
        format!("{sign}{mins}m")
    }
}
