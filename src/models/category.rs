use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Air-quality severity label assigned to each record.
///
/// Variants are declared in severity order and `Ord` follows that order, so
/// any table keyed by category can be sorted into display order directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AqiCategory {
    #[serde(rename = "Good")]
    Good,
    #[serde(rename = "Moderate")]
    Moderate,
    #[serde(rename = "Unhealthy for Sensitive Groups")]
    UnhealthyForSensitiveGroups,
    #[serde(rename = "Unhealthy")]
    Unhealthy,
    #[serde(rename = "Very Unhealthy")]
    VeryUnhealthy,
    #[serde(rename = "Hazardous")]
    Hazardous,
}

impl AqiCategory {
    /// Every category in display order, least to most severe.
    pub const ORDERED: [AqiCategory; 6] = [
        AqiCategory::Good,
        AqiCategory::Moderate,
        AqiCategory::UnhealthyForSensitiveGroups,
        AqiCategory::Unhealthy,
        AqiCategory::VeryUnhealthy,
        AqiCategory::Hazardous,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }

    /// Position in the fixed display order.
    pub fn rank(&self) -> usize {
        *self as usize
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ORDERED
            .iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
    }
}

impl FromStr for AqiCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown air-quality category '{}'", s))
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
