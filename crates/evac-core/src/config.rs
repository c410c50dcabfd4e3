//! Routing configuration.

use crate::{CoreError, CoreResult};

/// Tunables for route selection and travel-time estimation.
///
/// Typically loaded from a JSON/TOML file (with the `serde` feature) or built
/// from CLI flags by the application crate, then handed to the route engine.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RoutingConfig {
    /// Average travel speed used for ETA estimates.  Default: 25 km/h.
    pub assumed_speed_kmph: f64,

    /// Lowest resolver confidence (0–100) accepted as a match.  Default: 50.
    pub min_confidence: u8,

    /// Number of routes a front end asks for when the caller gives none.
    /// Default: 5.
    pub route_count: usize,
}

impl RoutingConfig {
    pub const DEFAULT_SPEED_KMPH: f64 = 25.0;
    pub const DEFAULT_MIN_CONFIDENCE: u8 = 50;
    pub const DEFAULT_ROUTE_COUNT: usize = 5;

    /// Check that every field is usable.
    pub fn validate(&self) -> CoreResult<()> {
        if !self.assumed_speed_kmph.is_finite() || self.assumed_speed_kmph <= 0.0 {
            return Err(CoreError::Config(format!(
                "assumed_speed_kmph must be a positive finite number, got {}",
                self.assumed_speed_kmph
            )));
        }
        if self.min_confidence > 100 {
            return Err(CoreError::Config(format!(
                "min_confidence must be within 0..=100, got {}",
                self.min_confidence
            )));
        }
        if self.route_count == 0 {
            return Err(CoreError::Config("route_count must be at least 1".into()));
        }
        Ok(())
    }

    /// Estimated travel time in minutes for `distance_km`.
    #[inline]
    pub fn eta_minutes(&self, distance_km: f64) -> f64 {
        distance_km / self.assumed_speed_kmph * 60.0
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            assumed_speed_kmph: Self::DEFAULT_SPEED_KMPH,
            min_confidence: Self::DEFAULT_MIN_CONFIDENCE,
            route_count: Self::DEFAULT_ROUTE_COUNT,
        }
    }
}
