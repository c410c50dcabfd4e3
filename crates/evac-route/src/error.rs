use thiserror::Error;

use evac_core::CoreError;
use evac_region::RegionError;
use evac_spatial::SpatialError;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("origin query is empty")]
    EmptyQuery,

    #[error("route count must be at least 1")]
    InvalidCount,

    #[error(transparent)]
    Config(#[from] CoreError),

    #[error(transparent)]
    Spatial(#[from] SpatialError),

    #[error(transparent)]
    Region(#[from] RegionError),

    /// The engine's own data disagreed with itself, e.g. every selected
    /// destination had a finite distance but no reconstructable path.
    #[error("internal routing inconsistency: {0}")]
    Internal(String),

    #[error("route query cancelled")]
    Cancelled,
}

pub type RouteResult<T> = Result<T, RouteError>;
