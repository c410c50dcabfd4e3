//! `evac-route`: k nearest low-risk evacuation routes for a free-text
//! origin.
//!
//! # Pipeline
//!
//! ```text
//! query ─▶ RegionResolver ─▶ origin region ─▶ nearest node
//!       ─▶ one shortest-path tree ─▶ low-risk candidates by distance
//!       ─▶ dedup by name, take k ─▶ explicit paths + km + ETA
//! ```
//!
//! # Crate layout
//!
//! | Module      | Contents                                              |
//! |-------------|-------------------------------------------------------|
//! | [`engine`]  | `RouteEngine`, `EngineStatus`                         |
//! | [`route`]   | `Route`, `RouteOutcome`, `RouteSummary`               |
//! | [`overlay`] | `RiskOverlay`, node → nearest region, for rendering  |
//! | [`error`]   | `RouteError`, `RouteResult<T>`                        |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public value types.     |

pub mod engine;
pub mod error;
pub mod overlay;
pub mod route;


pub use engine::{EngineStatus, RouteEngine};
pub use error::{RouteError, RouteResult};
pub use overlay::RiskOverlay;
pub use route::{Route, RouteOutcome, RouteSummary};
