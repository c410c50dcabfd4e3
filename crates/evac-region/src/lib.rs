//! `evac-region`: the catalog of named areas and their flood risk, and the
//! fuzzy matcher that maps free text onto it.
//!
//! # Crate layout
//!
//! | Module       | Contents                                               |
//! |--------------|--------------------------------------------------------|
//! | [`catalog`]  | `Region`, `RegionCatalog` (validated, R-tree indexed)  |
//! | [`loader`]   | CSV → `RegionCatalog` with header normalisation        |
//! | [`resolver`] | `RegionResolver`, `Scorer`, `EditDistanceScorer`       |
//! | [`error`]    | `RegionError`, `RegionResult<T>`                       |

pub mod catalog;
pub mod error;
pub mod loader;
pub mod resolver;


pub use catalog::{Region, RegionCatalog};
pub use error::{RegionError, RegionResult};
pub use loader::{load_regions_csv, load_regions_reader};
pub use resolver::{EditDistanceScorer, RegionResolver, Resolution, Scorer};
