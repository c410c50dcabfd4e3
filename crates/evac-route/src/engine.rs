//! The route engine: resolve an origin, run one shortest-path search, and
//! pick the nearest distinct low-risk destinations.
//!
//! # Shared state
//!
//! A [`RouteEngine`] owns the road network, the region catalog, and the
//! configuration, and never mutates them after construction.  It is
//! `Send + Sync`; wrap it in an `Arc` to serve concurrent queries.  Each call
//! allocates its own search state, so no locking is involved.
//!
//! # Cost
//!
//! One call is one full single-source search from the origin (O(E log V))
//! plus one early-exit single-pair search per selected route.  The
//! nearest-node lookup for every low-risk region is done once, at
//! construction.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error, warn};

use evac_core::{NodeId, RegionId, RoutingConfig};
use evac_region::{EditDistanceScorer, RegionCatalog, RegionResolver, Scorer};
use evac_spatial::{DijkstraRouter, RoadNetwork, Router, SpatialError};

use crate::overlay::RiskOverlay;
use crate::route::{Route, RouteOutcome};
use crate::{RouteError, RouteResult};

// ── EngineStatus ──────────────────────────────────────────────────────────────

/// Read-only counts for health checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineStatus {
    pub node_count:          usize,
    pub edge_count:          usize,
    pub region_count:        usize,
    pub unique_region_count: usize,
    pub low_risk_count:      usize,
}

// ── Candidate ─────────────────────────────────────────────────────────────────

/// A low-risk catalog row snapped to the road network.
#[derive(Clone, Copy, Debug)]
struct Destination {
    region: RegionId,
    node:   NodeId,
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    dest:       Destination,
    distance_m: f64,
}

// ── RouteEngine ───────────────────────────────────────────────────────────────

/// Shared, read-only routing context.
pub struct RouteEngine<R: Router = DijkstraRouter, S: Scorer = EditDistanceScorer> {
    network:      RoadNetwork,
    catalog:      RegionCatalog,
    config:       RoutingConfig,
    router:       R,
    resolver:     RegionResolver<S>,
    /// Low-risk rows in catalog order with their nearest node.
    destinations: Vec<Destination>,
}

impl RouteEngine {
    /// Build an engine with the default Dijkstra router and edit-distance
    /// resolver.
    ///
    /// # Errors
    ///
    /// [`RouteError::Config`] for an invalid `config`;
    /// [`RouteError::Spatial`] with [`SpatialError::EmptyNetwork`] if the
    /// network has no nodes.
    pub fn new(
        network: RoadNetwork,
        catalog: RegionCatalog,
        config:  RoutingConfig,
    ) -> RouteResult<Self> {
        Self::with_parts(network, catalog, config, DijkstraRouter, RegionResolver::new())
    }
}

impl<R: Router, S: Scorer> RouteEngine<R, S> {
    /// Build an engine with a custom router and resolver.
    pub fn with_parts(
        network:  RoadNetwork,
        catalog:  RegionCatalog,
        config:   RoutingConfig,
        router:   R,
        resolver: RegionResolver<S>,
    ) -> RouteResult<Self> {
        config.validate()?;
        if network.is_empty() {
            return Err(SpatialError::EmptyNetwork.into());
        }

        let destinations = catalog
            .low_risk()
            .map(|r| network.nearest_node(r.position).map(|node| Destination { region: r.id, node }))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            nodes = network.node_count(),
            regions = catalog.len(),
            destinations = destinations.len(),
            "route engine ready"
        );

        Ok(Self { network, catalog, config, router, resolver, destinations })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Counts for health/status reporting.
    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            node_count:          self.network.node_count(),
            edge_count:          self.network.edge_count(),
            region_count:        self.catalog.len(),
            unique_region_count: self.catalog.unique_names().len(),
            low_risk_count:      self.destinations.len(),
        }
    }

    /// Every distinct region name, in catalog order.
    pub fn region_names(&self) -> &[String] {
        self.catalog.unique_names()
    }

    /// Node → nearest region assignment for colouring the network by risk.
    pub fn risk_overlay(&self) -> RiskOverlay<'_> {
        RiskOverlay::build(&self.network, &self.catalog)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Up to `k` routes from the region best matching `origin_query` to the
    /// nearest distinct low-risk regions.
    ///
    /// # Errors
    ///
    /// - [`RouteError::EmptyQuery`] for a blank query.
    /// - [`RouteError::InvalidCount`] for `k == 0`.
    /// - [`RouteError::Internal`] if destinations were selected but not one
    ///   path could be reconstructed.
    ///
    /// A weak match is `Ok(RouteOutcome::NoMatch)`, and a match with no
    /// reachable low-risk region is `Ok(RouteOutcome::Matched)` with no
    /// routes; neither is an error.
    pub fn find_routes(&self, origin_query: &str, k: usize) -> RouteResult<RouteOutcome> {
        self.run(origin_query, k, None)
    }

    /// Like [`find_routes`](Self::find_routes), but returns
    /// [`RouteError::Cancelled`] once `cancel` is set.  The flag is checked
    /// after the shortest-path search and before each path reconstruction.
    pub fn find_routes_with_cancel(
        &self,
        origin_query: &str,
        k: usize,
        cancel: &AtomicBool,
    ) -> RouteResult<RouteOutcome> {
        self.run(origin_query, k, Some(cancel))
    }

    fn run(
        &self,
        origin_query: &str,
        k: usize,
        cancel: Option<&AtomicBool>,
    ) -> RouteResult<RouteOutcome> {
        if origin_query.trim().is_empty() {
            return Err(RouteError::EmptyQuery);
        }
        if k == 0 {
            return Err(RouteError::InvalidCount);
        }

        // ── 1. Resolve the origin ─────────────────────────────────────────
        let resolution = self.resolver.resolve(
            origin_query,
            self.catalog.unique_names().iter().map(String::as_str),
        );
        let confidence = resolution.confidence;
        let matched = match resolution.best_match {
            Some(name) if resolution.is_usable(self.config.min_confidence) => name,
            best => {
                debug!(query = origin_query, ?best, confidence, "origin did not resolve");
                return Ok(RouteOutcome::NoMatch { confidence });
            }
        };
        let origin_region = self.catalog.first_by_name(matched).ok_or_else(|| {
            RouteError::Internal(format!("resolved name {matched:?} missing from catalog"))
        })?;

        // ── 2–3. Snap and search once ─────────────────────────────────────
        let origin = self.network.nearest_node(origin_region.position)?;
        let origin_external_id = self.external_id(origin)?;
        let tree = self.router.shortest_path_tree(&self.network, origin)?;
        debug!(
            query = origin_query,
            region = matched,
            confidence,
            %origin,
            reachable = tree.reachable_count(),
            "origin resolved"
        );
        check_cancel(cancel)?;

        // ── 4–6. Rank reachable low-risk rows, one per name ───────────────
        let mut candidates: Vec<Candidate> = self
            .destinations
            .iter()
            .filter_map(|&dest| {
                tree.distance_m(dest.node).map(|distance_m| Candidate { dest, distance_m })
            })
            .collect();
        // Stable: equal distances keep catalog order.
        candidates.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));

        let mut seen: HashSet<&str> = HashSet::new();
        let picked: Vec<Candidate> = candidates
            .into_iter()
            .filter(|c| seen.insert(self.region_name(c.dest.region)))
            .take(k)
            .collect();

        // ── 7–8. Explicit paths ───────────────────────────────────────────
        let mut routes = Vec::with_capacity(picked.len());
        for candidate in &picked {
            check_cancel(cancel)?;
            match self.build_route(origin, candidate) {
                Ok(route) => routes.push(route),
                Err(e) => warn!(
                    region = self.region_name(candidate.dest.region),
                    node = %candidate.dest.node,
                    error = %e,
                    "skipping destination: no path despite finite distance"
                ),
            }
        }

        if !picked.is_empty() && routes.is_empty() {
            error!(
                region = matched,
                selected = picked.len(),
                "every selected destination failed path reconstruction"
            );
            return Err(RouteError::Internal(format!(
                "no path could be reconstructed for any of {} destinations from {matched:?}",
                picked.len()
            )));
        }

        Ok(RouteOutcome::Matched {
            region: matched.to_owned(),
            confidence,
            origin_node: origin,
            origin_external_id,
            routes,
        })
    }

    fn build_route(&self, origin: NodeId, candidate: &Candidate) -> RouteResult<Route> {
        let dest = candidate.dest;
        let path = self.router.route(&self.network, origin, dest.node)?;

        let length_m: f64 = path
            .nodes
            .windows(2)
            .map(|pair| self.network.min_edge_length_m(pair[0], pair[1]).unwrap_or(0.0))
            .sum();
        let distance_km = length_m / 1_000.0;

        let external_path = path
            .nodes
            .iter()
            .map(|&n| self.external_id(n))
            .collect::<RouteResult<Vec<i64>>>()?;

        Ok(Route {
            destination:             self.region_name(dest.region).to_owned(),
            region_id:               dest.region,
            destination_node:        dest.node,
            destination_external_id: self.external_id(dest.node)?,
            path:                    path.nodes,
            external_path,
            distance_km,
            eta_min:                 self.config.eta_minutes(distance_km),
        })
    }

    fn external_id(&self, node: NodeId) -> RouteResult<i64> {
        self.network
            .external_id(node)
            .ok_or_else(|| SpatialError::NodeNotFound(node).into())
    }

    fn region_name(&self, id: RegionId) -> &str {
        self.catalog.get(id).map_or("", |r| r.name.as_str())
    }
}

fn check_cancel(cancel: Option<&AtomicBool>) -> RouteResult<()> {
    match cancel {
        Some(flag) if flag.load(Ordering::Relaxed) => Err(RouteError::Cancelled),
        _ => Ok(()),
    }
}
