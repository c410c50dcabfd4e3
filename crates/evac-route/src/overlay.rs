//! Node → region assignment used to colour a road network by flood risk.

use evac_core::{EdgeId, NodeId, RegionId, RiskCategory};
use evac_region::{Region, RegionCatalog};
use evac_spatial::RoadNetwork;

/// Every node tagged with the region whose coordinate is closest to it.
///
/// Borrowed from the catalog it was built from; rebuild after swapping
/// catalogs.
pub struct RiskOverlay<'a> {
    catalog:     &'a RegionCatalog,
    node_region: Vec<RegionId>,
}

impl<'a> RiskOverlay<'a> {
    /// One nearest-region lookup per node.
    pub fn build(network: &RoadNetwork, catalog: &'a RegionCatalog) -> Self {
        let node_region = network
            .node_pos
            .iter()
            .map(|&pos| catalog.nearest_region(pos).map_or(RegionId::INVALID, |r| r.id))
            .collect();
        Self { catalog, node_region }
    }

    pub fn len(&self) -> usize {
        self.node_region.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_region.is_empty()
    }

    /// Region assigned to `node`, or `None` if the node is out of range.
    pub fn region_of(&self, node: NodeId) -> Option<&'a Region> {
        let id = *self.node_region.get(node.index())?;
        self.catalog.get(id)
    }

    /// Risk of the region an edge starts in.
    pub fn risk_of_edge(&self, network: &RoadNetwork, edge: EdgeId) -> Option<&'a RiskCategory> {
        let from = *network.edge_from.get(edge.index())?;
        self.region_of(from).map(|r| &r.risk)
    }

    /// Number of nodes assigned to low-risk regions.
    pub fn low_risk_node_count(&self) -> usize {
        self.node_region
            .iter()
            .filter_map(|&id| self.catalog.get(id))
            .filter(|r| r.risk.is_low())
            .count()
    }
}
