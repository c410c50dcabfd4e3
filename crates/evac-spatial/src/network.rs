//! The drivable road graph and its builder.
//!
//! # Data layout
//!
//! Outgoing edges are stored as a CSR adjacency: the edges leaving node `n`
//! are the `EdgeId`s in `node_out_start[n] .. node_out_start[n + 1]`.
//!
//! All edge arrays (`edge_from`, `edge_to`, `edge_length_m`) are sorted by
//! source node and indexed by `EdgeId`.  Parallel edges (several ways between
//! the same ordered pair of nodes) are kept as separate entries; length
//! accounting uses the shortest of them via
//! [`RoadNetwork::min_edge_length_m`].
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over each node's unit-sphere position maps an
//! arbitrary coordinate to the nearest `NodeId` by great-circle distance.

use std::fmt;

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use tracing::info;

use evac_core::{EdgeId, GeoPoint, NodeId};

use crate::component::largest_component_mask;
use crate::{SpatialError, SpatialResult};

// ── Spatial index entry ───────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f64; 3],
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 3]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared chord length.  Monotonic in great-circle distance, so the
    /// nearest entry by chord is the nearest by haversine.
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        let dz = self.point[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Directed, length-weighted road graph with a nearest-node index.
///
/// Immutable once built by [`RoadNetworkBuilder`].
pub struct RoadNetwork {
    /// Coordinate of each node, by `NodeId`.
    pub node_pos: Vec<GeoPoint>,

    /// Identifier each node carried in its source data (OSM id, CSV id).
    pub node_ext_id: Vec<i64>,

    /// `node_count + 1` offsets into the edge arrays.
    pub node_out_start: Vec<u32>,

    /// Tail of each edge; lets a path be walked backwards from its
    /// predecessor edges.
    pub edge_from: Vec<NodeId>,
    /// Head of each edge.
    pub edge_to: Vec<NodeId>,
    /// Road length in metres, the search cost.
    pub edge_length_m: Vec<f64>,

    spatial_idx: RTree<NodeEntry>,
}

impl fmt::Debug for RoadNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoadNetwork")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .finish_non_exhaustive()
    }
}

impl RoadNetwork {
    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    /// `true` if `node` indexes a node of this network.
    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_pos.len()
    }

    // ── Node attributes ───────────────────────────────────────────────────

    /// Position of `node`, or `None` if out of range.
    pub fn position(&self, node: NodeId) -> Option<GeoPoint> {
        self.node_pos.get(node.index()).copied()
    }

    /// Source-data identifier of `node`, or `None` if out of range.
    pub fn external_id(&self, node: NodeId) -> Option<i64> {
        self.node_ext_id.get(node.index()).copied()
    }

    // ── Adjacency ─────────────────────────────────────────────────────────

    #[inline]
    fn out_range(&self, node: NodeId) -> std::ops::Range<u32> {
        let i = node.index();
        self.node_out_start[i]..self.node_out_start[i + 1]
    }

    /// Edges leaving `node`.  Panics if `node` is out of range.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.out_range(node).map(EdgeId)
    }

    /// Parallel edges count separately.
    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        self.out_range(node).len()
    }

    /// Shortest length among all parallel edges `from → to`, or `None` if
    /// the pair is not directly connected.
    pub fn min_edge_length_m(&self, from: NodeId, to: NodeId) -> Option<f64> {
        if !self.contains(from) {
            return None;
        }
        self.out_edges(from)
            .filter(|e| self.edge_to[e.index()] == to)
            .map(|e| self.edge_length_m[e.index()])
            .min_by(f64::total_cmp)
    }

    // ── Snapping ──────────────────────────────────────────────────────────

    /// Node nearest to `pos` by great-circle distance, lowest id on ties.
    /// `None` for an empty network.
    pub fn snap_to_node(&self, pos: GeoPoint) -> Option<NodeId> {
        let mut hits = self
            .spatial_idx
            .nearest_neighbor_iter_with_distance_2(&pos.unit_vector());
        let (first, best_d2) = hits.next()?;
        let mut best = first.id;
        for (entry, d2) in hits {
            if d2 > best_d2 {
                break;
            }
            best = best.min(entry.id);
        }
        Some(best)
    }

    /// Like [`snap_to_node`](Self::snap_to_node) but fails with
    /// [`SpatialError::EmptyNetwork`] instead of returning `None`.
    pub fn nearest_node(&self, pos: GeoPoint) -> SpatialResult<NodeId> {
        self.snap_to_node(pos).ok_or(SpatialError::EmptyNetwork)
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Collects nodes and directed edges in any order; [`build`](Self::build)
/// or [`build_largest_component`](Self::build_largest_component) validate
/// them and produce the immutable [`RoadNetwork`].
///
/// # Example
///
/// ```
/// use evac_core::GeoPoint;
/// use evac_spatial::RoadNetworkBuilder;
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_node(GeoPoint::new(19.07, 72.87));
/// let c = b.add_node(GeoPoint::new(19.08, 72.88));
/// b.add_road(a, c, 1_200.0);
/// let net = b.build().unwrap();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 2); // bidirectional
/// ```
pub struct RoadNetworkBuilder {
    nodes:     Vec<GeoPoint>,
    ext_ids:   Vec<i64>,
    raw_edges: Vec<RawEdge>,
}

struct RawEdge {
    from:     NodeId,
    to:       NodeId,
    length_m: f64,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), ext_ids: Vec::new(), raw_edges: Vec::new() }
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:     Vec::with_capacity(nodes),
            ext_ids:   Vec::with_capacity(nodes),
            raw_edges: Vec::with_capacity(edges),
        }
    }

    /// Add a node whose external id is its own index.
    pub fn add_node(&mut self, pos: GeoPoint) -> NodeId {
        let ext = self.nodes.len() as i64;
        self.add_node_with_id(ext, pos)
    }

    /// Add a road node that carries `ext_id` from its source data.
    pub fn add_node_with_id(&mut self, ext_id: i64, pos: GeoPoint) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        self.ext_ids.push(ext_id);
        id
    }

    /// One-way edge.  Repeating a pair adds a parallel edge.
    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId, length_m: f64) {
        self.raw_edges.push(RawEdge { from, to, length_m });
    }

    /// Two-way road: one edge in each direction.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, length_m: f64) {
        self.add_directed_edge(a, b, length_m);
        self.add_directed_edge(b, a, length_m);
    }

    /// Position of a node added earlier.  Panics on an id this builder did
    /// not hand out.
    pub fn node_pos(&self, id: NodeId) -> GeoPoint {
        self.nodes[id.index()]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.raw_edges.len()
    }

    /// Validate and produce a [`RoadNetwork`] containing every node added.
    ///
    /// # Errors
    ///
    /// [`SpatialError::Coordinate`] for a non-finite or out-of-range node
    /// position, [`SpatialError::Data`] for a dangling edge endpoint or a
    /// negative/non-finite length.
    pub fn build(self) -> SpatialResult<RoadNetwork> {
        self.validate()?;
        Ok(self.assemble())
    }

    /// Validate, drop every node outside the largest weakly-connected
    /// component, re-index the survivors densely (relative order kept), and
    /// build.
    ///
    /// Equal-sized largest components resolve to the one holding the lowest
    /// node index.
    ///
    /// # Errors
    ///
    /// As [`build`](Self::build), plus [`SpatialError::EmptyNetwork`] when no
    /// node was added.
    pub fn build_largest_component(self) -> SpatialResult<RoadNetwork> {
        self.validate()?;
        if self.nodes.is_empty() {
            return Err(SpatialError::EmptyNetwork);
        }

        let keep = largest_component_mask(
            self.nodes.len(),
            self.raw_edges.iter().map(|e| (e.from.index(), e.to.index())),
        );

        let mut remap = vec![NodeId::INVALID; self.nodes.len()];
        let mut pruned = RoadNetworkBuilder::with_capacity(self.nodes.len(), self.raw_edges.len());
        for (i, (&pos, &ext)) in self.nodes.iter().zip(&self.ext_ids).enumerate() {
            if keep[i] {
                remap[i] = pruned.add_node_with_id(ext, pos);
            }
        }
        for e in &self.raw_edges {
            // Both endpoints of an edge always share a weak component.
            if keep[e.from.index()] {
                pruned.add_directed_edge(remap[e.from.index()], remap[e.to.index()], e.length_m);
            }
        }

        let dropped = self.nodes.len() - pruned.nodes.len();
        if dropped > 0 {
            info!(
                kept = pruned.nodes.len(),
                dropped,
                "restricted road network to its largest weakly-connected component"
            );
        }
        Ok(pruned.assemble())
    }

    fn validate(&self) -> SpatialResult<()> {
        for pos in &self.nodes {
            GeoPoint::try_new(pos.lat, pos.lon)?;
        }
        let n = self.nodes.len();
        for e in &self.raw_edges {
            if e.from.index() >= n || e.to.index() >= n {
                return Err(SpatialError::Data(format!(
                    "edge {} -> {} references a node outside 0..{n}",
                    e.from.0, e.to.0
                )));
            }
            if !e.length_m.is_finite() || e.length_m < 0.0 {
                return Err(SpatialError::Data(format!(
                    "edge {} -> {} has invalid length {}",
                    e.from.0, e.to.0, e.length_m
                )));
            }
        }
        Ok(())
    }

    /// Build without validation.
    fn assemble(self) -> RoadNetwork {
        let mut raw = self.raw_edges;
        // Stable: a node's edges keep insertion order.
        raw.sort_by_key(|e| e.from);

        let mut edge_from     = Vec::with_capacity(raw.len());
        let mut edge_to       = Vec::with_capacity(raw.len());
        let mut edge_length_m = Vec::with_capacity(raw.len());
        let mut node_out_start = Vec::with_capacity(self.nodes.len() + 1);
        node_out_start.push(0u32);

        let mut cursor = raw.iter().peekable();
        for n in 0..self.nodes.len() {
            while let Some(e) = cursor.next_if(|e| e.from.index() == n) {
                edge_from.push(e.from);
                edge_to.push(e.to);
                edge_length_m.push(e.length_m);
            }
            node_out_start.push(edge_to.len() as u32);
        }

        let spatial_idx = RTree::bulk_load(
            self.nodes
                .iter()
                .enumerate()
                .map(|(i, pos)| NodeEntry { point: pos.unit_vector(), id: NodeId(i as u32) })
                .collect(),
        );

        RoadNetwork {
            node_pos: self.nodes,
            node_ext_id: self.ext_ids,
            node_out_start,
            edge_from,
            edge_to,
            edge_length_m,
            spatial_idx,
        }
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
