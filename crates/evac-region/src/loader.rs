//! CSV region loader.
//!
//! # CSV format
//!
//! One row per area.  Column headers are normalised before lookup (trimmed,
//! lower-cased, spaces replaced by `_`), so `Flood-risk Level` and
//! `flood-risk_level` are the same column.  Extra columns are ignored.
//!
//! ```csv
//! Ward Code,Areas,Latitude,Longitude,Flood-risk_level
//! A,Colaba,18.9067,72.8147,High
//! K/E,Andheri East,19.1136,72.8697,Low
//! ```
//!
//! Required columns and the aliases accepted for them:
//!
//! | Column             | Aliases                                            |
//! |--------------------|----------------------------------------------------|
//! | `areas`            | `ward`, `area`, `region`                           |
//! | `flood_risk_level` | `flood-risk_level`, `flood_risk`, `risk_level`, `risk` |
//! | `latitude`         | `lat`, `y`                                         |
//! | `longitude`        | `lon`, `lng`, `x`                                  |
//!
//! An alias is only applied when the canonical column is absent, and aliases
//! are tried in the order listed, so the first matching alias wins.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use evac_core::{GeoPoint, RiskCategory};

use crate::catalog::{Region, RegionCatalog};
use crate::{RegionError, RegionResult};

const AREAS: &str = "areas";
const RISK: &str = "flood_risk_level";
const LATITUDE: &str = "latitude";
const LONGITUDE: &str = "longitude";

/// `(alias, canonical)` pairs, applied in order.
const ALIASES: &[(&str, &str)] = &[
    ("ward", AREAS),
    ("area", AREAS),
    ("region", AREAS),
    ("flood-risk_level", RISK),
    ("flood_risk", RISK),
    ("risk_level", RISK),
    ("risk", RISK),
    ("lat", LATITUDE),
    ("y", LATITUDE),
    ("lon", LONGITUDE),
    ("lng", LONGITUDE),
    ("x", LONGITUDE),
];

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a [`RegionCatalog`] from a CSV file.
pub fn load_regions_csv(path: &Path) -> RegionResult<RegionCatalog> {
    debug!(path = %path.display(), "loading region table");
    let file = File::open(path)?;
    load_regions_reader(file)
}

/// Like [`load_regions_csv`] but accepts any `Read` source.
///
/// # Errors
///
/// - [`RegionError::MissingColumns`] if a required column is absent after
///   normalisation and aliasing.
/// - [`RegionError::Data`] for a blank name or an unparsable or invalid
///   coordinate, naming the 1-based data row.
/// - [`RegionError::EmptyCatalog`] if the table has no rows.
pub fn load_regions_reader<R: Read>(reader: R) -> RegionResult<RegionCatalog> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| RegionError::Parse(e.to_string()))?;
    let columns = normalize_headers(headers.iter());
    let cols = ColumnMap::locate(&columns)?;
    debug!(?columns, "region columns resolved");

    let mut regions = Vec::new();
    for (i, result) in csv_reader.records().enumerate() {
        let rec = result.map_err(|e| RegionError::Parse(e.to_string()))?;
        let row = i + 1;
        let field = |idx: usize| rec.get(idx).unwrap_or("");

        let name = field(cols.areas);
        if name.trim().is_empty() {
            return Err(RegionError::Data(format!("row {row}: blank area name")));
        }
        let lat = parse_coord(field(cols.latitude), LATITUDE, row)?;
        let lon = parse_coord(field(cols.longitude), LONGITUDE, row)?;
        let position = GeoPoint::try_new(lat, lon)
            .map_err(|e| RegionError::Data(format!("row {row}: {e}")))?;
        let risk = RiskCategory::parse(field(cols.risk));

        regions.push(Region::new(name, position, risk));
    }

    let catalog = RegionCatalog::new(regions)?;
    info!(
        regions = catalog.len(),
        unique = catalog.unique_names().len(),
        low_risk = catalog.low_risk().count(),
        "region catalog loaded"
    );
    Ok(catalog)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

struct ColumnMap {
    areas:     usize,
    risk:      usize,
    latitude:  usize,
    longitude: usize,
}

impl ColumnMap {
    fn locate(columns: &[String]) -> RegionResult<Self> {
        let find = |name: &str| columns.iter().position(|c| c == name);
        let (areas, risk, latitude, longitude) =
            (find(AREAS), find(RISK), find(LATITUDE), find(LONGITUDE));

        match (areas, risk, latitude, longitude) {
            (Some(areas), Some(risk), Some(latitude), Some(longitude)) => {
                Ok(Self { areas, risk, latitude, longitude })
            }
            _ => {
                let missing = [AREAS, LATITUDE, LONGITUDE, RISK]
                    .into_iter()
                    .filter(|c| find(*c).is_none())
                    .map(str::to_owned)
                    .collect();
                Err(RegionError::MissingColumns { missing, found: columns.to_vec() })
            }
        }
    }
}

/// Normalise raw header names and apply [`ALIASES`].
fn normalize_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut columns: Vec<String> = raw
        .map(|h| h.trim().to_lowercase().replace(' ', "_"))
        .collect();

    for &(alias, canonical) in ALIASES {
        if columns.iter().any(|c| c == canonical) {
            continue;
        }
        if let Some(c) = columns.iter_mut().find(|c| c.as_str() == alias) {
            *c = canonical.to_owned();
        }
    }
    columns
}

fn parse_coord(raw: &str, column: &str, row: usize) -> RegionResult<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| RegionError::Data(format!("row {row}: {column} {raw:?} is not a number")))
}
