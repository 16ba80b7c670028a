//! Routing trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! The dispatcher calls routing through the [`Router`] trait, so a caller can
//! swap in A* or a cached index without touching the assignment policy.  The
//! default [`DijkstraRouter`] is plenty for city-scale graphs.
//!
//! # Units
//!
//! Costs are road distances in kilometres (`f64`).  Converting a distance to
//! travel minutes is the dispatcher's job (it owns the speed assumption).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ems_core::{LocationId, RoadSegment, SegmentId};

use crate::graph::RoadGraph;

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a routing query.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Total distance in km; `f64::INFINITY` if the target is unreachable.
    pub distance_km: f64,
    /// Locations visited from source to target inclusive.  Empty if
    /// unreachable; `[source]` if source and target coincide.
    pub path: Vec<LocationId>,
    /// Segments traversed, in order.  `path.len() - 1` entries when
    /// reachable.
    pub segments: Vec<SegmentId>,
}

impl Route {
    pub fn unreachable() -> Self {
        Route { distance_km: f64::INFINITY, path: vec![], segments: vec![] }
    }

    /// Zero-length route for `from == to`.
    pub fn stay(at: LocationId) -> Self {
        Route { distance_km: 0.0, path: vec![at], segments: vec![] }
    }

    #[inline]
    pub fn is_reachable(&self) -> bool {
        self.distance_km.is_finite()
    }

    /// `true` if source and destination are the same location.
    #[inline]
    pub fn is_trivial(&self) -> bool {
        self.is_reachable() && self.segments.is_empty()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable shortest-path engine.
///
/// Implementations must be `Send + Sync` so a dispatcher can be shared across
/// request-handling threads.
pub trait Router: Send + Sync {
    /// Shortest route from `from` to `to` over `graph`.
    ///
    /// Never fails: an unreachable target (including one that no segment
    /// touches) yields [`Route::unreachable`].
    fn route(&self, graph: &RoadGraph, from: LocationId, to: LocationId) -> Route;
}

/// Build a graph from `segments` and run [`DijkstraRouter`] once.
pub fn shortest_path(segments: &[RoadSegment], from: LocationId, to: LocationId) -> Route {
    DijkstraRouter.route(&RoadGraph::from_segments(segments), from, to)
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra over the CSR road graph, stopping as soon as the target
/// is settled.
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(&self, graph: &RoadGraph, from: LocationId, to: LocationId) -> Route {
        dijkstra(graph, from, to)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

const NO_ARC: usize = usize::MAX;

/// Heap entry.  Ordering is reversed so `BinaryHeap` (a max-heap) pops the
/// smallest tentative distance first.
#[derive(Copy, Clone, Debug)]
struct Frontier {
    km:   f64,
    node: usize,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other.km.total_cmp(&self.km).then_with(|| other.node.cmp(&self.node))
    }
}

fn dijkstra(graph: &RoadGraph, from: LocationId, to: LocationId) -> Route {
    if from == to {
        return Route::stay(from);
    }
    let (Some(source), Some(target)) = (graph.node_of(from), graph.node_of(to)) else {
        return Route::unreachable();
    };

    let n = graph.node_count();
    let mut dist     = vec![f64::INFINITY; n];
    // prev_arc[v] = arc that reached v; NO_ARC for unreached nodes.
    let mut prev_arc = vec![NO_ARC; n];
    let mut settled  = vec![false; n];

    dist[source] = 0.0;
    let mut heap = BinaryHeap::new();
    heap.push(Frontier { km: 0.0, node: source });

    while let Some(Frontier { km, node }) = heap.pop() {
        if settled[node] {
            continue;
        }
        settled[node] = true;

        if node == target {
            return reconstruct(graph, &prev_arc, source, target, km);
        }

        for arc in graph.out_arcs(node) {
            let next = graph.arc_to[arc] as usize;
            if settled[next] {
                continue;
            }
            let candidate = km + graph.arc_km[arc];
            if candidate < dist[next] {
                dist[next] = candidate;
                prev_arc[next] = arc;
                heap.push(Frontier { km: candidate, node: next });
            }
        }
    }

    Route::unreachable()
}

fn reconstruct(
    graph:    &RoadGraph,
    prev_arc: &[usize],
    source:   usize,
    target:   usize,
    km:       f64,
) -> Route {
    let mut arcs = Vec::new();
    let mut cur = target;
    while cur != source {
        let arc = prev_arc[cur];
        debug_assert_ne!(arc, NO_ARC, "settled node without predecessor");
        arcs.push(arc);
        cur = graph.arc_from[arc] as usize;
    }
    arcs.reverse();

    let mut path = Vec::with_capacity(arcs.len() + 1);
    path.push(graph.location_of(source));
    path.extend(arcs.iter().map(|&a| graph.location_of(graph.arc_to[a] as usize)));

    Route {
        distance_km: km,
        path,
        segments: arcs.iter().map(|&a| graph.arc_segment[a]).collect(),
    }
}
