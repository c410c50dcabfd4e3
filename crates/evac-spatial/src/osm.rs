//! OSM PBF loader, enabled with the `osm` Cargo feature.
//!
//! ```ignore
//! use std::path::Path;
//! use evac_spatial::osm::load_from_pbf;
//!
//! let network = load_from_pbf(Path::new("mumbai.osm.pbf"))?;
//! ```
//!
//! The file is read twice.  The first pass keeps car-drivable `highway=*`
//! ways and records the node ids they reference; the second pass keeps the
//! coordinates of those nodes only, so untagged points and building outlines
//! are never held in memory.
//!
//! One-way handling follows the usual OSM conventions: `oneway=yes|1|true`
//! and motorways are forward-only, `oneway=-1` is reverse-only.  Edge length
//! is the haversine distance between consecutive way nodes.  Nodes keep their
//! OSM id as external id, and the result is restricted to the largest
//! weakly-connected component.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use osmpbf::{Element, ElementReader};
use tracing::{debug, info};

use evac_core::{GeoPoint, NodeId};

use crate::network::{RoadNetwork, RoadNetworkBuilder};
use crate::{SpatialError, SpatialResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    Both,
    Forward,
    Backward,
}

struct DrivableWay {
    refs:      Vec<i64>,
    direction: Direction,
}

/// Load a drivable road network from an OSM PBF file.
///
/// # Errors
///
/// [`SpatialError::Osm`] on open and decode errors;
/// [`SpatialError::EmptyNetwork`] if the file has no drivable way.
pub fn load_from_pbf(path: &Path) -> SpatialResult<RoadNetwork> {
    let ways = read_ways(path)?;

    // BTreeMap so node indices follow OSM id order on every run.
    let mut coords: BTreeMap<i64, Option<GeoPoint>> = ways
        .iter()
        .flat_map(|w| w.refs.iter().map(|&id| (id, None)))
        .collect();
    debug!(ways = ways.len(), referenced_nodes = coords.len(), "drivable ways collected");

    open(path)?
        .for_each(|elem| {
            let (id, lat, lon) = match elem {
                Element::Node(n) => (n.id(), n.lat(), n.lon()),
                Element::DenseNode(n) => (n.id(), n.lat(), n.lon()),
                _ => return,
            };
            if let Some(slot) = coords.get_mut(&id) {
                *slot = Some(GeoPoint::new(lat, lon));
            }
        })
        .map_err(osm_error)?;

    let mut builder = RoadNetworkBuilder::with_capacity(coords.len(), coords.len() * 2);
    let index: HashMap<i64, NodeId> = coords
        .into_iter()
        .filter_map(|(id, pos)| pos.map(|p| (id, builder.add_node_with_id(id, p))))
        .collect();

    for way in &ways {
        for pair in way.refs.windows(2) {
            let (Some(&a), Some(&b)) = (index.get(&pair[0]), index.get(&pair[1])) else {
                continue;
            };
            let length_m = builder.node_pos(a).distance_m(builder.node_pos(b));
            match way.direction {
                Direction::Both => builder.add_road(a, b, length_m),
                Direction::Forward => builder.add_directed_edge(a, b, length_m),
                Direction::Backward => builder.add_directed_edge(b, a, length_m),
            }
        }
    }

    info!(
        path = %path.display(),
        ways = ways.len(),
        nodes = builder.node_count(),
        edges = builder.edge_count(),
        "parsed OSM road network"
    );
    builder.build_largest_component()
}

fn open(path: &Path) -> SpatialResult<ElementReader<std::io::BufReader<std::fs::File>>> {
    ElementReader::from_path(path).map_err(osm_error)
}

fn osm_error(e: osmpbf::Error) -> SpatialError {
    SpatialError::Osm(e.to_string())
}

fn read_ways(path: &Path) -> SpatialResult<Vec<DrivableWay>> {
    let mut ways = Vec::new();
    open(path)?
        .for_each(|elem| {
            let Element::Way(w) = elem else { return };
            let tags: Vec<(&str, &str)> = w.tags().collect();
            if let Some(direction) = classify(&tags) {
                ways.push(DrivableWay { refs: w.refs().collect(), direction });
            }
        })
        .map_err(osm_error)?;
    Ok(ways)
}

/// Travel direction for a car on a way with these tags, or `None` if cars
/// cannot use it.
pub(crate) fn classify(tags: &[(&str, &str)]) -> Option<Direction> {
    let tag = |key: &str| tags.iter().find(|(k, _)| *k == key).map(|(_, v)| *v);

    let highway = tag("highway")?;
    if matches!(
        highway,
        "footway" | "path" | "cycleway" | "pedestrian" | "steps" | "track" | "bridleway"
            | "corridor" | "proposed" | "construction" | "platform" | "elevator"
    ) {
        return None;
    }
    if matches!(tag("access"), Some("no" | "private")) || tag("area") == Some("yes") {
        return None;
    }

    Some(match tag("oneway") {
        Some("yes" | "1" | "true") => Direction::Forward,
        Some("-1" | "reverse") => Direction::Backward,
        Some("no" | "0" | "false") => Direction::Both,
        _ if matches!(highway, "motorway" | "motorway_link") => Direction::Forward,
        _ => Direction::Both,
    })
}
