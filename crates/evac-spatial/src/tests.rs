//! Unit tests for evac-spatial.
//!
//! All tests use hand-crafted networks so they run without any data file.

#[cfg(test)]
mod helpers {
    use evac_core::{GeoPoint, NodeId};
    use crate::{RoadNetwork, RoadNetworkBuilder};

    /// Build a small grid network for testing.
    ///
    /// Nodes (lat, lon):
    ///   0:(0,0)  1:(0,1)  2:(0,2)
    ///   3:(1,0)           4:(1,2)
    ///
    /// Undirected edges: 0-1, 1-2, 0-3, 2-4, 3-4
    ///
    /// Shortest path 0→4 by length:
    ///   0→1→2→4 = 300 m  vs  0→3→4 = 600 m
    pub fn grid_network() -> (RoadNetwork, [NodeId; 5]) {
        let mut b = RoadNetworkBuilder::new();

        let n0 = b.add_node(GeoPoint::new(0.0, 0.0));
        let n1 = b.add_node(GeoPoint::new(0.0, 1.0));
        let n2 = b.add_node(GeoPoint::new(0.0, 2.0));
        let n3 = b.add_node(GeoPoint::new(1.0, 0.0));
        let n4 = b.add_node(GeoPoint::new(1.0, 2.0));

        b.add_road(n0, n1, 100.0);
        b.add_road(n1, n2, 100.0);
        b.add_road(n2, n4, 100.0);
        b.add_road(n0, n3, 500.0); // long detour
        b.add_road(n3, n4, 100.0);

        (b.build().unwrap(), [n0, n1, n2, n3, n4])
    }
}

// ── Builder & network structure ────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use evac_core::{GeoPoint, NodeId};
    use crate::{RoadNetworkBuilder, SpatialError};

    #[test]
    fn empty_build() {
        let net = RoadNetworkBuilder::new().build().unwrap();
        assert_eq!(net.node_count(), 0);
        assert_eq!(net.edge_count(), 0);
        assert!(net.is_empty());
    }

    #[test]
    fn debug_shows_counts() {
        let (net, _) = super::helpers::grid_network();
        assert_eq!(format!("{net:?}"), "RoadNetwork { nodes: 5, edges: 10, .. }");
    }

    #[test]
    fn single_road() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(19.0, 72.8));
        let c = b.add_node(GeoPoint::new(19.1, 72.8));
        b.add_road(a, c, 1_000.0);
        let net = b.build().unwrap();
        assert_eq!(net.node_count(), 2);
        assert_eq!(net.edge_count(), 2); // bidirectional
    }

    #[test]
    fn csr_out_edges() {
        let (net, [n0, n1, n2, n3, n4]) = super::helpers::grid_network();

        let n1_out: Vec<_> = net.out_edges(n1).collect();
        assert_eq!(n1_out.len(), 2, "n1 should have 2 outgoing edges");

        assert_eq!(net.out_degree(n0), 2); // n0→n1, n0→n3
        assert_eq!(net.out_degree(n2), 2); // n2→n1, n2→n4
        assert_eq!(net.out_degree(n3), 2); // n3→n0, n3→n4
        assert_eq!(net.out_degree(n4), 2); // n4→n2, n4→n3
    }

    #[test]
    fn out_edges_source_correctness() {
        let (net, [n0, n1, _, _, _]) = super::helpers::grid_network();
        for e in net.out_edges(n0) {
            assert_eq!(net.edge_from[e.index()], n0);
        }
        assert!(net.out_edges(n0).any(|e| net.edge_to[e.index()] == n1));
    }

    #[test]
    fn directed_only_edge() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.0, 1.0));
        b.add_directed_edge(a, c, 100.0);
        let net = b.build().unwrap();
        assert_eq!(net.edge_count(), 1);
        assert_eq!(net.out_degree(a), 1);
        assert_eq!(net.out_degree(c), 0); // no return edge
    }

    #[test]
    fn parallel_edges_min_length() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.0, 1.0));
        b.add_directed_edge(a, c, 250.0);
        b.add_directed_edge(a, c, 180.0);
        b.add_directed_edge(a, c, 300.0);
        let net = b.build().unwrap();
        assert_eq!(net.out_degree(a), 3);
        assert_eq!(net.min_edge_length_m(a, c), Some(180.0));
        assert_eq!(net.min_edge_length_m(c, a), None);
        assert_eq!(net.min_edge_length_m(NodeId(9), a), None);
    }

    #[test]
    fn external_ids_and_positions() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node_with_id(9_001, GeoPoint::new(19.0, 72.8));
        let c = b.add_node(GeoPoint::new(19.1, 72.8));
        let net = b.build().unwrap();
        assert_eq!(net.external_id(a), Some(9_001));
        assert_eq!(net.external_id(c), Some(1));
        assert_eq!(net.position(a), Some(GeoPoint::new(19.0, 72.8)));
        assert_eq!(net.position(NodeId(5)), None);
    }

    #[test]
    fn rejects_negative_length() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.0, 1.0));
        b.add_directed_edge(a, c, -1.0);
        assert!(matches!(b.build(), Err(SpatialError::Data(_))));
    }

    #[test]
    fn rejects_nan_length() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.0, 1.0));
        b.add_road(a, c, f64::NAN);
        assert!(matches!(b.build(), Err(SpatialError::Data(_))));
    }

    #[test]
    fn rejects_dangling_edge() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        b.add_directed_edge(a, NodeId(7), 10.0);
        assert!(matches!(b.build(), Err(SpatialError::Data(_))));
    }

    #[test]
    fn rejects_non_finite_coordinate() {
        let mut b = RoadNetworkBuilder::new();
        b.add_node(GeoPoint::new(f64::NAN, 0.0));
        assert!(matches!(b.build(), Err(SpatialError::Coordinate(_))));
    }
}

// ── Weak components ───────────────────────────────────────────────────────────

#[cfg(test)]
mod components {
    use evac_core::{GeoPoint, NodeId};
    use crate::component::{largest_component_mask, weak_component_labels};
    use crate::{RoadNetworkBuilder, SpatialError};

    #[test]
    fn labels_ignore_direction() {
        // 0→1, 2→1 : one weak component {0,1,2};  3 alone
        let labels = weak_component_labels(4, [(0, 1), (2, 1)]);
        assert_eq!(labels, vec![0, 0, 0, 3]);
    }

    #[test]
    fn largest_mask_picks_biggest() {
        // {0,1}, {2,3,4}
        let mask = largest_component_mask(5, [(0, 1), (2, 3), (4, 3)]);
        assert_eq!(mask, vec![false, false, true, true, true]);
    }

    #[test]
    fn largest_mask_tie_keeps_lowest_index() {
        // {0,1}, {2,3}
        let mask = largest_component_mask(4, [(3, 2), (1, 0)]);
        assert_eq!(mask, vec![true, true, false, false]);
    }

    #[test]
    fn largest_mask_empty_graph() {
        assert!(largest_component_mask(0, []).is_empty());
    }

    #[test]
    fn build_largest_component_drops_islands() {
        let mut b = RoadNetworkBuilder::new();
        let island = b.add_node_with_id(10, GeoPoint::new(5.0, 5.0));
        let a = b.add_node_with_id(20, GeoPoint::new(0.0, 0.0));
        let c = b.add_node_with_id(30, GeoPoint::new(0.0, 0.1));
        let d = b.add_node_with_id(40, GeoPoint::new(0.0, 0.2));
        b.add_road(a, c, 100.0);
        b.add_directed_edge(d, c, 50.0);
        let _ = island;

        let net = b.build_largest_component().unwrap();
        assert_eq!(net.node_count(), 3);
        assert_eq!(net.edge_count(), 3);
        // Survivors are re-indexed densely in their original order.
        assert_eq!(net.external_id(NodeId(0)), Some(20));
        assert_eq!(net.external_id(NodeId(1)), Some(30));
        assert_eq!(net.external_id(NodeId(2)), Some(40));
        assert_eq!(net.min_edge_length_m(NodeId(2), NodeId(1)), Some(50.0));
    }

    #[test]
    fn build_largest_component_empty_is_error() {
        let result = RoadNetworkBuilder::new().build_largest_component();
        assert!(matches!(result, Err(SpatialError::EmptyNetwork)));
    }
}

// ── Spatial snap ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod snap {
    use evac_core::GeoPoint;
    use crate::{RoadNetworkBuilder, SpatialError};

    #[test]
    fn snap_exact_position() {
        let (net, [n0, ..]) = super::helpers::grid_network();
        assert_eq!(net.snap_to_node(GeoPoint::new(0.0, 0.0)), Some(n0));
    }

    #[test]
    fn snap_nearest() {
        let (net, [n0, n1, ..]) = super::helpers::grid_network();
        assert_eq!(net.snap_to_node(GeoPoint::new(0.0, 0.4)), Some(n0));
        assert_eq!(net.snap_to_node(GeoPoint::new(0.0, 0.6)), Some(n1));
    }

    #[test]
    fn snap_uses_great_circle_distance() {
        // At 60°N a degree of longitude is half a degree of latitude, so the
        // node 0.8° east is nearer than the node 0.5° north.
        let mut b = RoadNetworkBuilder::new();
        let north = b.add_node(GeoPoint::new(60.5, 10.0));
        let east = b.add_node(GeoPoint::new(60.0, 10.8));
        let net = b.build().unwrap();
        let q = GeoPoint::new(60.0, 10.0);
        assert!(q.distance_m(GeoPoint::new(60.0, 10.8)) < q.distance_m(GeoPoint::new(60.5, 10.0)));
        assert_eq!(net.snap_to_node(q), Some(east));
        let _ = north;
    }

    #[test]
    fn equidistant_nodes_resolve_to_lowest_id() {
        let mut b = RoadNetworkBuilder::new();
        let first = b.add_node(GeoPoint::new(1.0, 1.0));
        let _dup = b.add_node(GeoPoint::new(1.0, 1.0));
        let net = b.build().unwrap();
        assert_eq!(net.snap_to_node(GeoPoint::new(1.0, 1.0)), Some(first));
    }

    #[test]
    fn empty_network_returns_none() {
        let net = RoadNetworkBuilder::new().build().unwrap();
        assert!(net.snap_to_node(GeoPoint::new(0.0, 0.0)).is_none());
        assert!(matches!(
            net.nearest_node(GeoPoint::new(0.0, 0.0)),
            Err(SpatialError::EmptyNetwork)
        ));
    }
}

// ── Dijkstra routing ──────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use evac_core::{GeoPoint, NodeId};
    use crate::{DijkstraRouter, RoadNetworkBuilder, Router, SpatialError};

    #[test]
    fn trivial_same_node() {
        let (net, [n0, ..]) = super::helpers::grid_network();
        let p = DijkstraRouter.route(&net, n0, n0).unwrap();
        assert!(p.is_trivial());
        assert_eq!(p.nodes, vec![n0]);
        assert_eq!(p.length_m, 0.0);
    }

    #[test]
    fn shortest_path_correct() {
        let (net, [n0, n1, n2, _, n4]) = super::helpers::grid_network();
        let path = DijkstraRouter.route(&net, n0, n4).unwrap();

        assert_eq!(path.length_m, 300.0);
        assert_eq!(path.nodes, vec![n0, n1, n2, n4]);
        assert_eq!(path.edges.len(), 3);
        assert_eq!(path.source(), n0);
        assert_eq!(path.target(), n4);
        assert_eq!(net.edge_from[path.edges[0].index()], n0);
        assert_eq!(net.edge_to[path.edges[2].index()], n4);
    }

    #[test]
    fn tree_distances() {
        let (net, [n0, n1, n2, n3, n4]) = super::helpers::grid_network();
        let tree = DijkstraRouter.shortest_path_tree(&net, n0).unwrap();
        assert_eq!(tree.source(), n0);
        assert_eq!(tree.distance_m(n0), Some(0.0));
        assert_eq!(tree.distance_m(n1), Some(100.0));
        assert_eq!(tree.distance_m(n2), Some(200.0));
        assert_eq!(tree.distance_m(n4), Some(300.0));
        // n3 via n4 (400) beats the direct 500 m road.
        assert_eq!(tree.distance_m(n3), Some(400.0));
        assert_eq!(tree.reachable_count(), 5);
    }

    #[test]
    fn tree_path_matches_single_pair_route() {
        let (net, [n0, _, _, n3, _]) = super::helpers::grid_network();
        let tree = DijkstraRouter.shortest_path_tree(&net, n0).unwrap();
        let from_tree = tree.path_to(&net, n3).unwrap();
        let direct = DijkstraRouter.route(&net, n0, n3).unwrap();
        assert_eq!(from_tree.nodes, direct.nodes);
        assert_eq!(from_tree.length_m, direct.length_m);
    }

    #[test]
    fn tree_marks_unreachable() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.0, 1.0));
        b.add_directed_edge(c, a, 10.0);
        let net = b.build().unwrap();
        let tree = DijkstraRouter.shortest_path_tree(&net, a).unwrap();
        assert!(tree.is_reachable(a));
        assert!(!tree.is_reachable(c));
        assert_eq!(tree.distance_m(c), None);
        assert!(tree.path_to(&net, c).is_none());
        assert_eq!(tree.reachable_count(), 1);
    }

    #[test]
    fn no_route_disconnected() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(1.0, 0.0));
        let net = b.build().unwrap();
        let result = DijkstraRouter.route(&net, a, c);
        assert!(matches!(result, Err(SpatialError::NoRoute { .. })));
    }

    #[test]
    fn directed_one_way_blocks_return() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.0, 1.0));
        b.add_directed_edge(a, c, 100.0);
        let net = b.build().unwrap();

        assert!(DijkstraRouter.route(&net, a, c).is_ok());
        assert!(DijkstraRouter.route(&net, c, a).is_err());
    }

    #[test]
    fn unknown_node_is_error() {
        let (net, [n0, ..]) = super::helpers::grid_network();
        assert!(matches!(
            DijkstraRouter.route(&net, n0, NodeId(99)),
            Err(SpatialError::NodeNotFound(_))
        ));
        assert!(matches!(
            DijkstraRouter.shortest_path_tree(&net, NodeId(99)),
            Err(SpatialError::NodeNotFound(_))
        ));
    }

    #[test]
    fn parallel_edges_use_shortest() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.0, 1.0));
        b.add_directed_edge(a, c, 900.0);
        b.add_directed_edge(a, c, 400.0);
        let net = b.build().unwrap();
        let path = DijkstraRouter.route(&net, a, c).unwrap();
        assert_eq!(path.length_m, 400.0);
        assert_eq!(net.edge_length_m[path.edges[0].index()], 400.0);
    }
}

// ── CSV loader ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::Cursor;

    use evac_core::NodeId;
    use crate::{SpatialError, load_graph_readers};

    const NODES: &str = "\
osmid,y,x,street_count
101,19.000,72.800,2
102,19.001,72.800,3
103,19.002,72.800,2
900,19.500,73.000,1
";

    const EDGES: &str = "\
u,v,key,length
101,102,0,111.2
102,101,0,111.2
102,103,0,111.2
102,103,1,140.0
103,102,0,111.2
";

    #[test]
    fn loads_osmnx_style_tables() {
        let net = load_graph_readers(Cursor::new(NODES), Cursor::new(EDGES)).unwrap();
        // Node 900 has no edges and is pruned.
        assert_eq!(net.node_count(), 3);
        assert_eq!(net.edge_count(), 5);
        assert_eq!(net.external_id(NodeId(0)), Some(101));
        assert_eq!(net.min_edge_length_m(NodeId(1), NodeId(2)), Some(111.2));
        let pos = net.position(NodeId(2)).unwrap();
        assert_eq!(pos.lat, 19.002);
        assert_eq!(pos.lon, 72.8);
    }

    #[test]
    fn accepts_long_column_names() {
        let nodes = "node_id, latitude, longitude\n1, 10.0, 20.0\n2, 10.0, 20.01\n";
        let edges = "source,target,length_m\n1,2,1000\n";
        let net = load_graph_readers(Cursor::new(nodes), Cursor::new(edges)).unwrap();
        assert_eq!(net.node_count(), 2);
        assert_eq!(net.edge_count(), 1);
    }

    #[test]
    fn unknown_edge_endpoint_is_data_error() {
        let edges = "u,v,length\n101,555,10\n";
        let err = load_graph_readers(Cursor::new(NODES), Cursor::new(edges)).unwrap_err();
        assert!(matches!(err, SpatialError::Data(ref m) if m.contains("555")), "{err}");
    }

    #[test]
    fn duplicate_node_id_is_data_error() {
        let nodes = "id,lat,lon\n1,0,0\n1,0,1\n";
        let err = load_graph_readers(Cursor::new(nodes), Cursor::new("u,v,length\n")).unwrap_err();
        assert!(matches!(err, SpatialError::Data(_)));
    }

    #[test]
    fn bad_coordinate_is_rejected() {
        let nodes = "id,lat,lon\n1,NaN,0\n";
        let err = load_graph_readers(Cursor::new(nodes), Cursor::new("u,v,length\n")).unwrap_err();
        assert!(matches!(err, SpatialError::Coordinate(_)));
    }

    #[test]
    fn missing_column_is_parse_error() {
        let nodes = "id,lat\n1,0\n";
        let err = load_graph_readers(Cursor::new(nodes), Cursor::new("u,v,length\n")).unwrap_err();
        assert!(matches!(err, SpatialError::Parse(_)));
    }

    #[test]
    fn empty_node_table_is_error() {
        let err = load_graph_readers(Cursor::new("id,lat,lon\n"), Cursor::new("u,v,length\n"))
            .unwrap_err();
        assert!(matches!(err, SpatialError::EmptyNetwork));
    }
}

// ── OSM tag classification ────────────────────────────────────────────────────

#[cfg(all(test, feature = "osm"))]
mod osm {
    use crate::osm::{Direction, classify};

    #[test]
    fn residential_is_two_way() {
        assert_eq!(classify(&[("highway", "residential")]), Some(Direction::Both));
    }

    #[test]
    fn footway_and_private_are_skipped() {
        assert_eq!(classify(&[("highway", "footway")]), None);
        assert_eq!(classify(&[("highway", "service"), ("access", "private")]), None);
        assert_eq!(classify(&[("name", "no highway tag")]), None);
    }

    #[test]
    fn oneway_variants() {
        assert_eq!(classify(&[("highway", "primary"), ("oneway", "yes")]), Some(Direction::Forward));
        assert_eq!(classify(&[("highway", "primary"), ("oneway", "-1")]), Some(Direction::Backward));
        assert_eq!(classify(&[("highway", "motorway")]), Some(Direction::Forward));
        assert_eq!(classify(&[("highway", "motorway"), ("oneway", "no")]), Some(Direction::Both));
    }
}
