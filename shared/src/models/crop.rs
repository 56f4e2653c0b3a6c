//! Crop and livestock models

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Crop lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CropStatus {
    #[default]
    Planted,
    Growing,
    Harvested,
    Failed,
}

impl CropStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CropStatus::Planted => "planted",
            CropStatus::Growing => "growing",
            CropStatus::Harvested => "harvested",
            CropStatus::Failed => "failed",
        }
    }

    /// Still in the field (counted as an active crop on the dashboard)
    pub fn is_in_field(&self) -> bool {
        matches!(self, CropStatus::Planted | CropStatus::Growing)
    }
}

impl FromStr for CropStatus {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "planted" => Ok(CropStatus::Planted),
            "growing" => Ok(CropStatus::Growing),
            "harvested" => Ok(CropStatus::Harvested),
            "failed" => Ok(CropStatus::Failed),
            _ => Err("Crop status must be one of planted, growing, harvested, failed"),
        }
    }
}

impl std::fmt::Display for CropStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default livestock health status
pub const DEFAULT_HEALTH_STATUS: &str = "healthy";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_status_case_insensitively() {
        assert_eq!("Growing".parse::<CropStatus>(), Ok(CropStatus::Growing));
        assert!("sprouting".parse::<CropStatus>().is_err());
    }

    #[test]
    fn only_planted_and_growing_are_in_field() {
        assert!(CropStatus::Planted.is_in_field());
        assert!(CropStatus::Growing.is_in_field());
        assert!(!CropStatus::Harvested.is_in_field());
        assert!(!CropStatus::Failed.is_in_field());
    }
}
