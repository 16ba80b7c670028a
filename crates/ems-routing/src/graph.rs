//! Road graph representation and builder.
//!
//! # Data layout
//!
//! Locations are interned into a dense node index `0..node_count` in the
//! order they are first seen.  Outgoing arcs use **Compressed Sparse Row
//! (CSR)** format: given node `n`, its arcs occupy
//!
//! ```text
//! arc_*[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! Every undirected [`RoadSegment`] contributes two arcs of equal weight, and
//! each arc remembers the segment it came from so a route can report the
//! segments it used.

use std::collections::HashMap;

use tracing::warn;

use ems_core::{LocationId, RoadSegment, SegmentId};

use crate::{RoutingError, RoutingResult};

/// Reject segments that cannot be traversed: non-finite or negative
/// distances, and segments whose endpoints coincide.
pub fn validate_segment(segment: &RoadSegment) -> RoutingResult<()> {
    if !segment.distance_km.is_finite() || segment.distance_km < 0.0 {
        return Err(RoutingError::InvalidDistance {
            segment:     segment.id,
            distance_km: segment.distance_km,
        });
    }
    if segment.from == segment.to {
        return Err(RoutingError::SelfLoop { segment: segment.id, location: segment.from });
    }
    Ok(())
}

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// Undirected road graph stored as directed arcs in CSR format.
///
/// Arc arrays are `pub` for direct indexed access in the Dijkstra inner loop.
/// Do not construct directly; use [`RoadGraphBuilder`] or
/// [`RoadGraph::from_segments`].
pub struct RoadGraph {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Location of each dense node index.
    pub node_location: Vec<LocationId>,

    /// `LocationId → node index`.
    node_index: HashMap<LocationId, u32>,

    // ── CSR arc adjacency ─────────────────────────────────────────────────
    /// CSR row pointer.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Arc data (indexed by arc position in sorted order) ────────────────
    /// Source node of each arc.  Needed to walk predecessor arcs back to the
    /// source during path reconstruction.
    pub arc_from: Vec<u32>,
    pub arc_to: Vec<u32>,
    pub arc_km: Vec<f64>,
    /// Segment each arc was derived from.
    pub arc_segment: Vec<SegmentId>,
}

impl RoadGraph {
    /// A graph with no nodes.  Every query except `from == to` is
    /// unreachable.
    pub fn empty() -> Self {
        RoadGraphBuilder::new().build()
    }

    /// Build a graph from the full segment set, skipping (and logging) any
    /// segment that fails [`validate_segment`].
    pub fn from_segments(segments: &[RoadSegment]) -> Self {
        let mut b = RoadGraphBuilder::with_capacity(segments.len(), segments.len() * 2);
        for s in segments {
            b.add_segment(s);
        }
        b.build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_location.len()
    }

    pub fn arc_count(&self) -> usize {
        self.arc_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_location.is_empty()
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    /// Dense index of `location`, or `None` if no segment touches it.
    #[inline]
    pub fn node_of(&self, location: LocationId) -> Option<usize> {
        self.node_index.get(&location).map(|&i| i as usize)
    }

    #[inline]
    pub fn location_of(&self, node: usize) -> LocationId {
        self.node_location[node]
    }

    /// Arc indices leaving `node`.  A contiguous range.
    #[inline]
    pub fn out_arcs(&self, node: usize) -> std::ops::Range<usize> {
        self.node_out_start[node] as usize..self.node_out_start[node + 1] as usize
    }

    #[inline]
    pub fn out_degree(&self, node: usize) -> usize {
        self.out_arcs(node).len()
    }
}

// ── RoadGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`RoadGraph`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use ems_core::RoadSegment;
/// use ems_routing::RoadGraphBuilder;
///
/// let mut b = RoadGraphBuilder::new();
/// b.add_segment(&RoadSegment::new(1, 10, 20, 2.5));
/// let graph = b.build();
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.arc_count(), 2); // both directions
/// ```
pub struct RoadGraphBuilder {
    nodes:    Vec<LocationId>,
    index:    HashMap<LocationId, u32>,
    raw_arcs: Vec<RawArc>,
}

struct RawArc {
    from:    u32,
    to:      u32,
    km:      f64,
    segment: SegmentId,
}

impl RoadGraphBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), index: HashMap::new(), raw_arcs: Vec::new() }
    }

    pub fn with_capacity(nodes: usize, arcs: usize) -> Self {
        Self {
            nodes:    Vec::with_capacity(nodes),
            index:    HashMap::with_capacity(nodes),
            raw_arcs: Vec::with_capacity(arcs),
        }
    }

    /// Intern `location`, returning its dense node index.
    pub fn add_location(&mut self, location: LocationId) -> u32 {
        if let Some(&i) = self.index.get(&location) {
            return i;
        }
        let i = self.nodes.len() as u32;
        self.nodes.push(location);
        self.index.insert(location, i);
        i
    }

    /// Add both arcs of an undirected segment.
    ///
    /// Returns `false` (and logs a warning) if the segment is rejected by
    /// [`validate_segment`]; the graph is still buildable without it.
    pub fn add_segment(&mut self, segment: &RoadSegment) -> bool {
        if let Err(e) = validate_segment(segment) {
            warn!(segment = %segment.id, error = %e, "skipping untraversable road segment");
            return false;
        }
        let a = self.add_location(segment.from);
        let b = self.add_location(segment.to);
        self.raw_arcs.push(RawArc { from: a, to: b, km: segment.distance_km, segment: segment.id });
        self.raw_arcs.push(RawArc { from: b, to: a, km: segment.distance_km, segment: segment.id });
        true
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn arc_count(&self) -> usize { self.raw_arcs.len() }

    /// Consume the builder and produce a [`RoadGraph`].
    ///
    /// Time complexity: O(E log E) for the arc sort.
    pub fn build(self) -> RoadGraph {
        let node_count = self.nodes.len();
        let arc_count = self.raw_arcs.len();

        let mut raw = self.raw_arcs;
        raw.sort_by_key(|a| a.from);

        let arc_from:    Vec<u32>       = raw.iter().map(|a| a.from).collect();
        let arc_to:      Vec<u32>       = raw.iter().map(|a| a.to).collect();
        let arc_km:      Vec<f64>       = raw.iter().map(|a| a.km).collect();
        let arc_segment: Vec<SegmentId> = raw.iter().map(|a| a.segment).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for a in &raw {
            node_out_start[a.from as usize + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, arc_count);

        RoadGraph {
            node_location: self.nodes,
            node_index: self.index,
            node_out_start,
            arc_from,
            arc_to,
            arc_km,
            arc_segment,
        }
    }
}

impl Default for RoadGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
