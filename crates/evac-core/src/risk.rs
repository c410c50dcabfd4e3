//! Flood-risk category attached to every region.

use std::fmt;

/// Flood-exposure category of a region.
///
/// Parsing is case-insensitive and trims whitespace; a blank value is
/// `Unknown`.  Any other string that is not one of the four known levels is
/// kept verbatim (lower-cased) in [`RiskCategory::Other`] instead of being
/// coerced to `Unknown`, so a misspelt level in the source data stays
/// visible and never counts as `Low`.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "String", into = "String"))]
pub enum RiskCategory {
    Low,
    Moderate,
    High,
    #[default]
    Unknown,
    /// Unrecognised level, stored normalised.
    Other(String),
}

impl RiskCategory {
    /// Normalise and classify a raw risk string.
    pub fn parse(raw: &str) -> Self {
        let norm = raw.trim().to_lowercase();
        match norm.as_str() {
            "low" => RiskCategory::Low,
            "moderate" => RiskCategory::Moderate,
            "high" => RiskCategory::High,
            "" | "unknown" => RiskCategory::Unknown,
            _ => RiskCategory::Other(norm),
        }
    }

    /// `true` only for [`RiskCategory::Low`]: the one category that qualifies
    /// a region as an evacuation destination.
    #[inline]
    pub fn is_low(&self) -> bool {
        matches!(self, RiskCategory::Low)
    }

    pub fn as_str(&self) -> &str {
        match self {
            RiskCategory::Low => "low",
            RiskCategory::Moderate => "moderate",
            RiskCategory::High => "high",
            RiskCategory::Unknown => "unknown",
            RiskCategory::Other(s) => s,
        }
    }
}

impl From<String> for RiskCategory {
    fn from(s: String) -> Self {
        RiskCategory::parse(&s)
    }
}

impl From<&str> for RiskCategory {
    fn from(s: &str) -> Self {
        RiskCategory::parse(s)
    }
}

impl From<RiskCategory> for String {
    fn from(r: RiskCategory) -> String {
        match r {
            RiskCategory::Other(s) => s,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
