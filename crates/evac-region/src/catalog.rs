//! Region rows and the immutable catalog that holds them.
//!
//! # Ordering and duplicates
//!
//! The catalog keeps rows in the order they were supplied.  Names are not
//! required to be unique: several rows may share a name with different
//! coordinates or risk levels.  Name lookups ([`RegionCatalog::first_by_name`])
//! return the **first** row, and [`RegionCatalog::unique_names`] lists each
//! name once in first-occurrence order.

use std::collections::HashMap;
use std::fmt;

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use evac_core::{GeoPoint, RegionId, RiskCategory};

use crate::{RegionError, RegionResult};

// ── Region ────────────────────────────────────────────────────────────────────

/// A named area with a representative coordinate and a flood-risk level.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Region {
    /// Position in the catalog.  Assigned by [`RegionCatalog::new`].
    pub id:       RegionId,
    /// Trimmed, lower-cased name.
    pub name:     String,
    pub position: GeoPoint,
    pub risk:     RiskCategory,
}

impl Region {
    /// Create a region, normalising the name.  The id is a placeholder until
    /// the region is placed in a catalog.
    pub fn new(name: &str, position: GeoPoint, risk: RiskCategory) -> Self {
        Self {
            id: RegionId::INVALID,
            name: normalize_name(name),
            position,
            risk,
        }
    }
}

/// Trim and lower-case a region name or query.
pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

// ── R-tree region entry ───────────────────────────────────────────────────────

#[derive(Clone)]
struct RegionEntry {
    point: [f64; 3],
    id:    RegionId,
}

impl RTreeObject for RegionEntry {
    type Envelope = AABB<[f64; 3]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for RegionEntry {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        (0..3).map(|i| (self.point[i] - point[i]).powi(2)).sum()
    }
}

// ── RegionCatalog ─────────────────────────────────────────────────────────────

/// Validated, immutable, ordered list of regions.
pub struct RegionCatalog {
    regions:      Vec<Region>,
    unique_names: Vec<String>,
    first_by_name: HashMap<String, RegionId>,
    spatial_idx:  RTree<RegionEntry>,
}

impl fmt::Debug for RegionCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegionCatalog")
            .field("regions", &self.regions.len())
            .field("unique_names", &self.unique_names)
            .finish_non_exhaustive()
    }
}

impl RegionCatalog {
    /// Validate `regions` and assign each its catalog position as id.
    ///
    /// # Errors
    ///
    /// - [`RegionError::EmptyCatalog`] if `regions` is empty.
    /// - [`RegionError::Data`] for a blank name.
    /// - [`RegionError::Coordinate`] for a non-finite or out-of-range
    ///   position.
    pub fn new(regions: Vec<Region>) -> RegionResult<Self> {
        if regions.is_empty() {
            return Err(RegionError::EmptyCatalog);
        }

        let mut regions = regions;
        let mut unique_names = Vec::new();
        let mut first_by_name = HashMap::with_capacity(regions.len());

        for (i, region) in regions.iter_mut().enumerate() {
            region.name = normalize_name(&region.name);
            if region.name.is_empty() {
                return Err(RegionError::Data(format!("region {i} has a blank name")));
            }
            GeoPoint::try_new(region.position.lat, region.position.lon)?;

            let id = RegionId(i as u32);
            region.id = id;
            if !first_by_name.contains_key(&region.name) {
                first_by_name.insert(region.name.clone(), id);
                unique_names.push(region.name.clone());
            }
        }

        let entries = regions
            .iter()
            .map(|r| RegionEntry { point: r.position.unit_vector(), id: r.id })
            .collect();

        Ok(Self {
            regions,
            unique_names,
            first_by_name,
            spatial_idx: RTree::bulk_load(entries),
        })
    }

    /// Number of rows, duplicates included.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Always `false`: construction rejects empty catalogs.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// All rows in catalog order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.index())
    }

    /// Each distinct name once, in first-occurrence order.
    pub fn unique_names(&self) -> &[String] {
        &self.unique_names
    }

    /// First row carrying `name` (exact match on the normalised name).
    pub fn first_by_name(&self, name: &str) -> Option<&Region> {
        self.first_by_name
            .get(&normalize_name(name))
            .and_then(|&id| self.get(id))
    }

    /// Rows whose risk is [`RiskCategory::Low`], in catalog order.
    pub fn low_risk(&self) -> impl Iterator<Item = &Region> + '_ {
        self.regions.iter().filter(|r| r.risk.is_low())
    }

    /// Region whose coordinate is nearest to `pos` by great-circle distance.
    /// Equidistant regions resolve to the earliest row.
    pub fn nearest_region(&self, pos: GeoPoint) -> Option<&Region> {
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
        self.get(best)
    }
}
