//! Advisory models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryType {
    Weather,
    Pest,
    Disease,
    #[default]
    General,
}

impl AdvisoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdvisoryType::Weather => "weather",
            AdvisoryType::Pest => "pest",
            AdvisoryType::Disease => "disease",
            AdvisoryType::General => "general",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl AdvisoryPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdvisoryPriority::Low => "low",
            AdvisoryPriority::Medium => "medium",
            AdvisoryPriority::High => "high",
            AdvisoryPriority::Urgent => "urgent",
        }
    }
}
