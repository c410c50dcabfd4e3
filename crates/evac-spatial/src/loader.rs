//! CSV road-network loader.
//!
//! # CSV format
//!
//! Two tables, matching the node/edge columns of an osmnx graph export.
//! Extra columns are ignored; header names may use any listed alias.
//!
//! ```csv
//! osmid,y,x
//! 101,19.0760,72.8777
//! 102,19.0771,72.8790
//! ```
//!
//! ```csv
//! u,v,length
//! 101,102,182.4
//! 102,101,182.4
//! ```
//!
//! | Table | Column   | Aliases                     |
//! |-------|----------|-----------------------------|
//! | nodes | `id`     | `osmid`, `node_id`          |
//! | nodes | `lon`    | `x`, `longitude`            |
//! | nodes | `lat`    | `y`, `latitude`             |
//! | edges | `u`      | `source`, `from`            |
//! | edges | `v`      | `target`, `to`              |
//! | edges | `length` | `length_m`                  |
//!
//! Every edge row is one **directed** edge.  Repeated `(u, v)` rows are
//! parallel edges and are all kept.  The network is restricted to its
//! largest weakly-connected component before it is returned.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use evac_core::{GeoPoint, NodeId};

use crate::network::{RoadNetwork, RoadNetworkBuilder};
use crate::{SpatialError, SpatialResult};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRecord {
    #[serde(alias = "osmid", alias = "node_id")]
    id:  i64,
    #[serde(alias = "x", alias = "longitude")]
    lon: f64,
    #[serde(alias = "y", alias = "latitude")]
    lat: f64,
}

#[derive(Deserialize)]
struct EdgeRecord {
    #[serde(alias = "source", alias = "from")]
    u:      i64,
    #[serde(alias = "target", alias = "to")]
    v:      i64,
    #[serde(alias = "length_m")]
    length: f64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a road network from a node table and an edge table on disk.
pub fn load_graph_csv(nodes: &Path, edges: &Path) -> SpatialResult<RoadNetwork> {
    debug!(nodes = %nodes.display(), edges = %edges.display(), "loading road network");
    let node_file = File::open(nodes)?;
    let edge_file = File::open(edges)?;
    load_graph_readers(node_file, edge_file)
}

/// Like [`load_graph_csv`] but accepts any `Read` sources.
///
/// Useful for testing (pass a `std::io::Cursor`) or loading from network
/// streams.
///
/// # Errors
///
/// - [`SpatialError::Parse`] for malformed CSV or missing columns.
/// - [`SpatialError::Coordinate`] for a non-finite or out-of-range position.
/// - [`SpatialError::Data`] for duplicate node ids, edges naming unknown
///   nodes, or negative/non-finite lengths.
/// - [`SpatialError::EmptyNetwork`] if the node table has no rows.
pub fn load_graph_readers<N: Read, E: Read>(nodes: N, edges: E) -> SpatialResult<RoadNetwork> {
    let mut builder = RoadNetworkBuilder::new();
    let mut by_ext: HashMap<i64, NodeId> = HashMap::new();

    // ── Nodes ─────────────────────────────────────────────────────────────
    let mut node_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(nodes);
    for (row, result) in node_reader.deserialize::<NodeRecord>().enumerate() {
        let rec = result.map_err(|e| SpatialError::Parse(format!("nodes: {e}")))?;
        let pos = GeoPoint::try_new(rec.lat, rec.lon)?;
        if by_ext.contains_key(&rec.id) {
            return Err(SpatialError::Data(format!(
                "nodes row {}: duplicate node id {}",
                row + 1,
                rec.id
            )));
        }
        let id = builder.add_node_with_id(rec.id, pos);
        by_ext.insert(rec.id, id);
    }

    // ── Edges ─────────────────────────────────────────────────────────────
    let mut edge_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(edges);
    for (row, result) in edge_reader.deserialize::<EdgeRecord>().enumerate() {
        let rec = result.map_err(|e| SpatialError::Parse(format!("edges: {e}")))?;
        let lookup = |ext: i64| {
            by_ext.get(&ext).copied().ok_or_else(|| {
                SpatialError::Data(format!("edges row {}: unknown node id {ext}", row + 1))
            })
        };
        let from = lookup(rec.u)?;
        let to = lookup(rec.v)?;
        builder.add_directed_edge(from, to, rec.length);
    }

    let (raw_nodes, raw_edges) = (builder.node_count(), builder.edge_count());
    let network = builder.build_largest_component()?;
    info!(
        nodes = network.node_count(),
        edges = network.edge_count(),
        raw_nodes,
        raw_edges,
        "road network loaded"
    );
    Ok(network)
}
