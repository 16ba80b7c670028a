//! CSV road segment loader.
//!
//! # CSV format
//!
//! One row per undirected segment:
//!
//! ```csv
//! id,from,to,distance_km
//! 1,10,11,2.5
//! 2,11,12,1.2
//! ```
//!
//! `from` and `to` are location ids.  Unlike graph building, which skips bad
//! segments, the loader is strict: a negative distance or a self-loop fails
//! the whole load so bad data never reaches the store.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use ems_core::RoadSegment;

use crate::graph::validate_segment;
use crate::RoutingError;

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SegmentRecord {
    id:          u64,
    from:        u64,
    to:          u64,
    distance_km: f64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load road segments from a CSV file.
pub fn load_segments_csv(path: &Path) -> Result<Vec<RoadSegment>, RoutingError> {
    let file = std::fs::File::open(path)?;
    load_segments_reader(file)
}

/// Like [`load_segments_csv`] but accepts any `Read` source.
pub fn load_segments_reader<R: Read>(reader: R) -> Result<Vec<RoadSegment>, RoutingError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut segments = Vec::new();

    for result in csv_reader.deserialize::<SegmentRecord>() {
        let row = result.map_err(|e| RoutingError::Parse(e.to_string()))?;
        let segment = RoadSegment::new(row.id, row.from, row.to, row.distance_km);
        validate_segment(&segment)?;
        segments.push(segment);
    }

    Ok(segments)
}
