//! Routing-subsystem error type.

use thiserror::Error;

use ems_core::{LocationId, SegmentId};

/// Errors produced by `ems-routing`.
///
/// Unreachable targets are not errors: they yield an infinite-distance
/// [`Route`](crate::Route).
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("segment {segment} has invalid distance {distance_km} km")]
    InvalidDistance { segment: SegmentId, distance_km: f64 },

    #[error("segment {segment} starts and ends at {location}")]
    SelfLoop { segment: SegmentId, location: LocationId },

    #[error("segment parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RoutingResult<T> = Result<T, RoutingError>;
