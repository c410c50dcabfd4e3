//! Spatial-subsystem error type.

use thiserror::Error;

use evac_core::{CoreError, NodeId};

/// Errors produced by `evac-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("road network has no nodes")]
    EmptyNetwork,

    /// Malformed graph input: bad lengths, dangling edge endpoints,
    /// duplicate node ids.
    #[error("invalid graph data: {0}")]
    Data(String),

    #[error(transparent)]
    Coordinate(#[from] CoreError),

    #[error("graph parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "osm")]
    #[error("OSM parse error: {0}")]
    Osm(String),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
