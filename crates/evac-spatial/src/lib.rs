//! `evac-spatial`: road network, spatial indexing, and shortest paths.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`network`]   | `RoadNetwork` (CSR + R-tree), `RoadNetworkBuilder`        |
//! | [`component`] | Weakly-connected component labelling                      |
//! | [`router`]    | `Router` trait, `ShortestPathTree`, `Path`, `DijkstraRouter` |
//! | [`loader`]    | CSV node/edge tables → `RoadNetwork`                      |
//! | [`osm`]       | `load_from_pbf` (feature = `"osm"` only)                  |
//! | [`error`]     | `SpatialError`, `SpatialResult<T>`                        |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `osm`   | Enables OSM PBF loading via the `osmpbf` crate.             |
//! | `serde` | Derives `Serialize`/`Deserialize` on core value types.       |

pub mod component;
pub mod error;
pub mod loader;
pub mod network;
pub mod router;

#[cfg(feature = "osm")]
pub mod osm;

#[cfg(test)]
mod tests;

pub use error::{SpatialError, SpatialResult};
pub use loader::{load_graph_csv, load_graph_readers};
pub use network::{RoadNetwork, RoadNetworkBuilder};
pub use router::{DijkstraRouter, Path, Router, ShortestPathTree};
