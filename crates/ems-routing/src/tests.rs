//! Unit tests for ems-routing.
//!
//! All tests use hand-crafted segment lists.

#[cfg(test)]
mod helpers {
    use ems_core::RoadSegment;

    /// A small city for routing tests.
    ///
    /// Locations 1..=5:
    ///   1 ─10─ 2 ─10─ 3
    ///   │             │
    ///   50            10
    ///   │             │
    ///   4 ────10───── 5
    ///
    /// Shortest 1→5: 1→2→3→5 = 30 km (vs 1→4→5 = 60 km).
    pub fn grid_segments() -> Vec<RoadSegment> {
        vec![
            RoadSegment::new(1, 1, 2, 10.0),
            RoadSegment::new(2, 2, 3, 10.0),
            RoadSegment::new(3, 3, 5, 10.0),
            RoadSegment::new(4, 1, 4, 50.0),
            RoadSegment::new(5, 4, 5, 10.0),
        ]
    }
}

// ── Graph structure ───────────────────────────────────────────────────────────

#[cfg(test)]
mod graph {
    use ems_core::{LocationId, RoadSegment};
    use crate::{RoadGraph, RoadGraphBuilder};

    #[test]
    fn empty_build() {
        let g = RoadGraphBuilder::new().build();
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.arc_count(), 0);
        assert!(g.is_empty());
    }

    #[test]
    fn every_segment_yields_two_arcs() {
        let g = RoadGraph::from_segments(&super::helpers::grid_segments());
        assert_eq!(g.node_count(), 5);
        assert_eq!(g.arc_count(), 10);
    }

    #[test]
    fn csr_degrees() {
        let g = RoadGraph::from_segments(&super::helpers::grid_segments());
        let n1 = g.node_of(LocationId(1)).unwrap();
        let n2 = g.node_of(LocationId(2)).unwrap();
        assert_eq!(g.out_degree(n1), 2); // 1→2, 1→4
        assert_eq!(g.out_degree(n2), 2); // 2→1, 2→3
        for arc in g.out_arcs(n1) {
            assert_eq!(g.arc_from[arc] as usize, n1);
        }
    }

    #[test]
    fn unknown_location_has_no_node() {
        let g = RoadGraph::from_segments(&super::helpers::grid_segments());
        assert!(g.node_of(LocationId(99)).is_none());
    }

    #[test]
    fn untraversable_segments_are_skipped() {
        let mut b = RoadGraphBuilder::new();
        assert!(b.add_segment(&RoadSegment::new(1, 1, 2, 3.0)));
        assert!(!b.add_segment(&RoadSegment::new(2, 2, 3, -1.0)));
        assert!(!b.add_segment(&RoadSegment::new(3, 3, 3, 1.0)));
        assert!(!b.add_segment(&RoadSegment::new(4, 3, 4, f64::NAN)));
        let g = b.build();
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.arc_count(), 2);
    }

    #[test]
    fn add_location_interns() {
        let mut b = RoadGraphBuilder::new();
        let a = b.add_location(LocationId(7));
        let again = b.add_location(LocationId(7));
        assert_eq!(a, again);
        assert_eq!(b.node_count(), 1);
    }
}

// ── Dijkstra routing ──────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use ems_core::{LocationId, RoadSegment, SegmentId};
    use crate::{DijkstraRouter, RoadGraph, Router, shortest_path};

    #[test]
    fn two_hop_path_via_middle_location() {
        // X=1, Y=2, Z=3: X–Y 10 km, Y–Z 5 km.
        let segments = vec![RoadSegment::new(1, 1, 2, 10.0), RoadSegment::new(2, 2, 3, 5.0)];
        let route = shortest_path(&segments, LocationId(1), LocationId(3));
        assert_eq!(route.distance_km, 15.0);
        assert_eq!(route.path, vec![LocationId(1), LocationId(2), LocationId(3)]);
        assert_eq!(route.segments, vec![SegmentId(1), SegmentId(2)]);
    }

    #[test]
    fn shortest_path_prefers_cheaper_detour() {
        let route = shortest_path(&super::helpers::grid_segments(), LocationId(1), LocationId(5));
        assert_eq!(route.distance_km, 30.0);
        assert_eq!(
            route.path,
            vec![LocationId(1), LocationId(2), LocationId(3), LocationId(5)]
        );
        assert_eq!(route.segments, vec![SegmentId(1), SegmentId(2), SegmentId(3)]);
    }

    #[test]
    fn distance_is_symmetric() {
        let segments = super::helpers::grid_segments();
        let g = RoadGraph::from_segments(&segments);
        for a in 1..=5 {
            for b in 1..=5 {
                let ab = DijkstraRouter.route(&g, LocationId(a), LocationId(b));
                let ba = DijkstraRouter.route(&g, LocationId(b), LocationId(a));
                assert_eq!(ab.distance_km, ba.distance_km, "{a}→{b} vs {b}→{a}");
            }
        }
    }

    #[test]
    fn reversed_path_uses_same_segments() {
        let segments = super::helpers::grid_segments();
        let fwd = shortest_path(&segments, LocationId(1), LocationId(5));
        let back = shortest_path(&segments, LocationId(5), LocationId(1));
        let mut reversed = back.segments.clone();
        reversed.reverse();
        assert_eq!(fwd.segments, reversed);
    }

    #[test]
    fn same_location_is_zero_with_singleton_path() {
        let route = shortest_path(&super::helpers::grid_segments(), LocationId(3), LocationId(3));
        assert_eq!(route.distance_km, 0.0);
        assert_eq!(route.path, vec![LocationId(3)]);
        assert!(route.is_trivial());
    }

    #[test]
    fn same_location_outside_graph_is_still_zero() {
        let route = shortest_path(&[], LocationId(42), LocationId(42));
        assert_eq!(route.distance_km, 0.0);
        assert_eq!(route.path, vec![LocationId(42)]);
    }

    #[test]
    fn disconnected_target_is_unreachable() {
        let mut segments = super::helpers::grid_segments();
        segments.push(RoadSegment::new(10, 8, 9, 1.0)); // island
        let route = shortest_path(&segments, LocationId(1), LocationId(9));
        assert!(route.distance_km.is_infinite());
        assert!(route.path.is_empty());
        assert!(!route.is_reachable());
        assert!(!route.is_trivial());
    }

    #[test]
    fn unknown_target_is_unreachable() {
        let route = shortest_path(&super::helpers::grid_segments(), LocationId(1), LocationId(77));
        assert!(!route.is_reachable());
        assert!(route.segments.is_empty());
    }

    #[test]
    fn zero_length_segments_are_traversable() {
        let segments = vec![RoadSegment::new(1, 1, 2, 0.0), RoadSegment::new(2, 2, 3, 4.0)];
        let route = shortest_path(&segments, LocationId(1), LocationId(3));
        assert_eq!(route.distance_km, 4.0);
        assert_eq!(route.path.len(), 3);
    }

    #[test]
    fn parallel_segments_pick_the_shorter() {
        let segments = vec![RoadSegment::new(1, 1, 2, 9.0), RoadSegment::new(2, 2, 1, 4.5)];
        let route = shortest_path(&segments, LocationId(1), LocationId(2));
        assert_eq!(route.distance_km, 4.5);
        assert_eq!(route.segments, vec![SegmentId(2)]);
    }
}

// ── CSV loader ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::Cursor;

    use ems_core::{LocationId, SegmentId};
    use crate::{RoutingError, load_segments_reader};

    #[test]
    fn loads_rows() {
        let csv = "id,from,to,distance_km\n1,10,11,2.5\n2, 11, 12, 1.25\n";
        let segments = load_segments_reader(Cursor::new(csv)).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].id, SegmentId(1));
        assert_eq!(segments[1].from, LocationId(11));
        assert_eq!(segments[1].distance_km, 1.25);
    }

    #[test]
    fn rejects_negative_distance() {
        let csv = "id,from,to,distance_km\n1,10,11,-2\n";
        let err = load_segments_reader(Cursor::new(csv)).unwrap_err();
        assert!(matches!(err, RoutingError::InvalidDistance { .. }));
    }

    #[test]
    fn rejects_self_loop() {
        let csv = "id,from,to,distance_km\n1,10,10,2\n";
        let err = load_segments_reader(Cursor::new(csv)).unwrap_err();
        assert!(matches!(err, RoutingError::SelfLoop { location: LocationId(10), .. }));
    }

    #[test]
    fn rejects_malformed_row() {
        let csv = "id,from,to,distance_km\n1,ten,11,2\n";
        let err = load_segments_reader(Cursor::new(csv)).unwrap_err();
        assert!(matches!(err, RoutingError::Parse(_)));
    }
}
