//! Farming activity models

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::types::Bilingual;

/// Who created an activity record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActivitySource {
    #[default]
    Manual,
    Chat,
    Advisory,
}

impl ActivitySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivitySource::Manual => "manual",
            ActivitySource::Chat => "chat",
            ActivitySource::Advisory => "advisory",
        }
    }
}

impl FromStr for ActivitySource {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(ActivitySource::Manual),
            "chat" => Ok(ActivitySource::Chat),
            "advisory" => Ok(ActivitySource::Advisory),
            _ => Err("Unknown activity source"),
        }
    }
}

/// Completion state as presented to clients
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    Completed,
    Pending,
}

impl ActivityStatus {
    pub fn from_completed(is_completed: bool) -> Self {
        if is_completed {
            ActivityStatus::Completed
        } else {
            ActivityStatus::Pending
        }
    }

    /// Only the literal `completed` marks an activity as done
    pub fn is_completed_str(status: &str) -> bool {
        status == "completed"
    }
}

/// Bilingual display name for an activity type.
///
/// Unknown types are echoed unchanged in both languages.
pub fn activity_label(activity_type: &str) -> Bilingual {
    let (en, ml) = match activity_type {
        "Planting" => ("Planting", "നടൽ"),
        "Fertilization" => ("Fertilizing", "വളം നൽകൽ"),
        "Irrigation" => ("Irrigation", "നനയ്ക്കൽ"),
        "Pest Control" => ("Pest Control", "കീട നിയന്ത്രണം"),
        "Weeding" => ("Weeding", "കളകൾ പിഴുത്തൽ"),
        "Harvesting" => ("Harvesting", "വിളവെടുപ്പ്"),
        "Pruning" => ("Pruning", "വെട്ടിച്ചുരുക്കൽ"),
        other => (other, other),
    };
    Bilingual::new(en, ml)
}

/// Description shown when an activity has no free-text details
pub fn activity_description(activity_type: &str, details: Option<&str>) -> Bilingual {
    match details.filter(|d| !d.is_empty()) {
        Some(details) => Bilingual::new(details, details),
        None => Bilingual::new(
            format!("{} activity", activity_type),
            format!("{} പ്രവർത്തനം", activity_type),
        ),
    }
}

/// Chat keywords that indicate a loggable farming action, with the
/// activity type recorded for each.
pub const CHAT_ACTIVITY_KEYWORDS: &[(&str, &str)] = &[
    ("sowing", "Planting"),
    ("irrigation", "Irrigation"),
    ("pest control", "Pest Control"),
    ("fertilizer", "Fertilization"),
    ("harvesting", "Harvesting"),
    ("planting", "Planting"),
    ("watering", "Irrigation"),
    ("വിതയൽ", "Planting"),
    ("ജലസേചനം", "Irrigation"),
];

/// First activity type whose keyword appears in the message
pub fn detect_chat_activity(message: &str) -> Option<&'static str> {
    let lowered = message.to_lowercase();
    CHAT_ACTIVITY_KEYWORDS
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, activity_type)| *activity_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_types_are_translated() {
        let label = activity_label("Fertilization");
        assert_eq!(label.en, "Fertilizing");
        assert_eq!(label.ml, "വളം നൽകൽ");
    }

    #[test]
    fn unknown_types_echo() {
        let label = activity_label("Mulching");
        assert_eq!(label.en, "Mulching");
        assert_eq!(label.ml, "Mulching");
    }

    #[test]
    fn description_defaults_per_language() {
        let desc = activity_description("Weeding", None);
        assert_eq!(desc.en, "Weeding activity");
        assert_eq!(desc.ml, "Weeding പ്രവർത്തനം");

        let desc = activity_description("Weeding", Some("north plot"));
        assert_eq!(desc.en, "north plot");
    }

    #[test]
    fn chat_keywords_map_to_types() {
        assert_eq!(detect_chat_activity("Started IRRIGATION today"), Some("Irrigation"));
        assert_eq!(detect_chat_activity("ഇന്ന് വിതയൽ കഴിഞ്ഞു"), Some("Planting"));
        assert_eq!(detect_chat_activity("what is the price of pepper"), None);
    }

    #[test]
    fn status_from_string() {
        assert!(ActivityStatus::is_completed_str("completed"));
        assert!(!ActivityStatus::is_completed_str("Completed"));
        assert_eq!(ActivityStatus::from_completed(false), ActivityStatus::Pending);
    }
}
