//! Query results.

use evac_core::{NodeId, RegionId};

/// One evacuation route from the origin node to a low-risk region.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    /// Normalised name of the destination region.
    pub destination:             String,
    /// Catalog row the destination was taken from.
    pub region_id:               RegionId,
    /// Road node nearest the destination region.
    pub destination_node:        NodeId,
    /// Source-data id (e.g. osmid) of `destination_node`.
    pub destination_external_id: i64,
    /// Nodes in travel order: origin node first, `destination_node` last.
    pub path:                    Vec<NodeId>,
    /// `path` as source-data ids, for drawing the route outside this
    /// process.
    pub external_path:           Vec<i64>,
    /// Sum of the shortest parallel edge between each consecutive pair of
    /// `path`, kilometres.  Not rounded.
    pub distance_km:             f64,
    /// `distance_km` at the configured average speed, minutes.  Not rounded.
    pub eta_min:                 f64,
}

/// Result of one `find_routes` call.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "status", rename_all = "snake_case"))]
pub enum RouteOutcome {
    /// The query did not reach the confidence threshold.
    NoMatch { confidence: u8 },
    /// The query resolved to `region`.  `routes` is ordered by ascending
    /// distance and may be empty.
    Matched {
        region:             String,
        confidence:         u8,
        origin_node:        NodeId,
        /// Source-data id of `origin_node`.
        origin_external_id: i64,
        routes:             Vec<Route>,
    },
}

impl RouteOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, RouteOutcome::Matched { .. })
    }

    pub fn confidence(&self) -> u8 {
        match self {
            RouteOutcome::NoMatch { confidence } | RouteOutcome::Matched { confidence, .. } => {
                *confidence
            }
        }
    }

    /// Resolved region name, if any.
    pub fn region(&self) -> Option<&str> {
        match self {
            RouteOutcome::Matched { region, .. } => Some(region.as_str()),
            RouteOutcome::NoMatch { .. } => None,
        }
    }

    /// Routes in result order; empty for `NoMatch`.
    pub fn routes(&self) -> &[Route] {
        match self {
            RouteOutcome::Matched { routes, .. } => routes.as_slice(),
            RouteOutcome::NoMatch { .. } => &[],
        }
    }

    pub fn summary(&self) -> RouteSummary {
        RouteSummary::of(self.routes())
    }
}

/// Totals across all routes of one outcome.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteSummary {
    pub route_count:       usize,
    pub total_distance_km: f64,
    pub combined_eta_min:  f64,
}

impl RouteSummary {
    pub fn of(routes: &[Route]) -> Self {
        routes.iter().fold(Self::default(), |acc, r| Self {
            route_count:       acc.route_count + 1,
            total_distance_km: acc.total_distance_km + r.distance_km,
            combined_eta_min:  acc.combined_eta_min + r.eta_min,
        })
    }
}
