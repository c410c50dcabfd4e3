//! Routing trait and default Dijkstra implementation.
//!
//! # Two query shapes
//!
//! - [`Router::shortest_path_tree`] runs one search from a source over the
//!   whole graph and records the distance to every reachable node.  One tree
//!   answers "how far is X" for any number of candidate destinations.
//! - [`Router::route`] answers a single pair and returns the explicit node
//!   sequence.  It stops as soon as the target is settled.
//!
//! Both use `edge_length_m` as the cost and the same heap ordering, so they
//! agree on distances and on which of several equal-length paths is chosen.
//!
//! # Pluggability
//!
//! The route engine calls routing via the [`Router`] trait, so applications
//! can swap in A* or contraction hierarchies without touching it.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use evac_core::{EdgeId, NodeId};

use crate::network::RoadNetwork;
use crate::{SpatialError, SpatialResult};

// ── Path ──────────────────────────────────────────────────────────────────────

/// An explicit shortest path between two nodes.
#[derive(Debug, Clone)]
pub struct Path {
    /// Nodes in travel order, source first, target last.  Never empty.
    pub nodes: Vec<NodeId>,
    /// Edges traversed, `nodes.len() - 1` of them.
    pub edges: Vec<EdgeId>,
    /// Sum of the traversed edges' lengths, metres.
    pub length_m: f64,
}

impl Path {
    /// `true` if the source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn source(&self) -> NodeId {
        self.nodes[0]
    }

    pub fn target(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }
}

// ── ShortestPathTree ──────────────────────────────────────────────────────────

/// Result of a single-source search: the shortest distance from `source` to
/// every node, and the edge that reached it.
#[derive(Debug, Clone)]
pub struct ShortestPathTree {
    source:    NodeId,
    /// `f64::INFINITY` for unreached nodes.
    dist:      Vec<f64>,
    /// `EdgeId::INVALID` for the source and for unreached nodes.
    prev_edge: Vec<EdgeId>,
}

impl ShortestPathTree {
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Shortest distance in metres, or `None` if `node` is unreachable or out
    /// of range.
    pub fn distance_m(&self, node: NodeId) -> Option<f64> {
        self.dist
            .get(node.index())
            .copied()
            .filter(|d| d.is_finite())
    }

    #[inline]
    pub fn is_reachable(&self, node: NodeId) -> bool {
        self.distance_m(node).is_some()
    }

    /// Number of nodes reachable from the source, the source included.
    pub fn reachable_count(&self) -> usize {
        self.dist.iter().filter(|d| d.is_finite()).count()
    }

    /// Walk the predecessor edges back from `target`.  `None` if `target` is
    /// unreachable.
    pub fn path_to(&self, network: &RoadNetwork, target: NodeId) -> Option<Path> {
        let length_m = self.distance_m(target)?;
        Some(trace_back(network, &self.prev_edge, target, length_m))
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable shortest-path engine.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so one router can serve concurrent
/// queries against a shared network.
pub trait Router: Send + Sync {
    /// Distances from `source` to every reachable node.
    fn shortest_path_tree(
        &self,
        network: &RoadNetwork,
        source: NodeId,
    ) -> SpatialResult<ShortestPathTree>;

    /// Explicit shortest path from `from` to `to`.
    ///
    /// `from == to` yields a single-node path of length 0.  Fails with
    /// [`SpatialError::NoRoute`] if `to` is unreachable.
    fn route(&self, network: &RoadNetwork, from: NodeId, to: NodeId) -> SpatialResult<Path>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra's algorithm over the CSR road graph, weighted by edge
/// length.  Lengths are validated non-negative at build time.
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn shortest_path_tree(
        &self,
        network: &RoadNetwork,
        source: NodeId,
    ) -> SpatialResult<ShortestPathTree> {
        check_node(network, source)?;
        let (dist, prev_edge) = dijkstra(network, source, None);
        Ok(ShortestPathTree { source, dist, prev_edge })
    }

    fn route(&self, network: &RoadNetwork, from: NodeId, to: NodeId) -> SpatialResult<Path> {
        check_node(network, from)?;
        check_node(network, to)?;
        if from == to {
            return Ok(Path { nodes: vec![from], edges: vec![], length_m: 0.0 });
        }

        let (dist, prev_edge) = dijkstra(network, from, Some(to));
        let length_m = dist[to.index()];
        if !length_m.is_finite() {
            return Err(SpatialError::NoRoute { from, to });
        }
        Ok(trace_back(network, &prev_edge, to, length_m))
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

fn check_node(network: &RoadNetwork, node: NodeId) -> SpatialResult<()> {
    if network.contains(node) {
        Ok(())
    } else {
        Err(SpatialError::NodeNotFound(node))
    }
}

/// Heap entry.  `Ord` is reversed so `BinaryHeap` (a max-heap) pops the
/// lowest cost first; equal costs pop the lowest `NodeId` first so results
/// are deterministic.
#[derive(Copy, Clone, PartialEq)]
struct State {
    cost: f64,
    node: NodeId,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Run Dijkstra from `from`, stopping once `target` (if any) is settled.
fn dijkstra(
    network: &RoadNetwork,
    from: NodeId,
    target: Option<NodeId>,
) -> (Vec<f64>, Vec<EdgeId>) {
    let n = network.node_count();
    // dist[v] = best known length (m) to reach v.
    let mut dist      = vec![f64::INFINITY; n];
    // prev_edge[v] = EdgeId that reached v; EdgeId::INVALID for unreached nodes.
    let mut prev_edge = vec![EdgeId::INVALID; n];

    dist[from.index()] = 0.0;

    let mut heap = BinaryHeap::new();
    heap.push(State { cost: 0.0, node: from });

    while let Some(State { cost, node }) = heap.pop() {
        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        if Some(node) == target {
            break;
        }

        for edge in network.out_edges(node) {
            let neighbor = network.edge_to[edge.index()];
            let new_cost = cost + network.edge_length_m[edge.index()];

            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                heap.push(State { cost: new_cost, node: neighbor });
            }
        }
    }

    (dist, prev_edge)
}

fn trace_back(network: &RoadNetwork, prev_edge: &[EdgeId], to: NodeId, length_m: f64) -> Path {
    let mut edges = Vec::new();
    let mut nodes = vec![to];
    let mut cur = to;
    loop {
        let e = prev_edge[cur.index()];
        if e == EdgeId::INVALID {
            break;
        }
        edges.push(e);
        cur = network.edge_from[e.index()];
        nodes.push(cur);
    }
    edges.reverse();
    nodes.reverse();
    Path { nodes, edges, length_m }
}
