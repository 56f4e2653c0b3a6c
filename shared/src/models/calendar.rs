//! Seasonal farming calendar for Kerala

use serde::{Deserialize, Serialize};

/// Farming season derived from the calendar month
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Season {
    Monsoon,
    #[serde(rename = "Post-Monsoon")]
    PostMonsoon,
    Summer,
}

impl Season {
    /// June to September is the monsoon, October to December post-monsoon,
    /// everything else summer.
    pub fn from_month(month: u32) -> Self {
        match month {
            6..=9 => Season::Monsoon,
            10..=12 => Season::PostMonsoon,
            _ => Season::Summer,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Season::Monsoon => "Monsoon",
            Season::PostMonsoon => "Post-Monsoon",
            Season::Summer => "Summer",
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

const SEASONAL_CALENDAR: [[&str; 3]; 12] = [
    ["Harvest winter crops", "Prepare land for summer crops", "Prune fruit trees"],
    ["Plant summer vegetables", "Water management", "Pest control measures"],
    ["Pre-monsoon preparations", "Seed treatment", "Equipment maintenance"],
    ["Summer crop care", "Irrigation management", "Soil testing"],
    ["Monsoon preparations", "Drainage systems check", "Crop protection"],
    ["Kharif sowing", "Monsoon crop planting", "Weed management"],
    ["Monsoon crop care", "Disease prevention", "Water logging prevention"],
    ["Mid-season crop care", "Fertilizer application", "Pest monitoring"],
    ["Crop protection", "Harvest preparations", "Post-monsoon care"],
    ["Kharif harvest", "Rabi preparations", "Land preparation"],
    ["Rabi sowing", "Winter crop planting", "Irrigation setup"],
    ["Winter crop care", "Harvest planning", "Year-end preparations"],
];

const GENERAL_ACTIVITIES: [&str; 3] = [
    "General farm maintenance",
    "Crop monitoring",
    "Equipment care",
];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Activities recommended for a month (1-12). Out-of-range months get
/// general maintenance tasks.
pub fn seasonal_activities(month: u32) -> Vec<&'static str> {
    match month {
        1..=12 => SEASONAL_CALENDAR[(month - 1) as usize].to_vec(),
        _ => GENERAL_ACTIVITIES.to_vec(),
    }
}

/// One month of the crop calendar
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CalendarMonth {
    pub month: u32,
    pub name: &'static str,
    pub season: Season,
    pub activities: Vec<&'static str>,
}

/// The whole year, January first
pub fn crop_calendar() -> Vec<CalendarMonth> {
    (1..=12)
        .map(|month| CalendarMonth {
            month,
            name: MONTH_NAMES[(month - 1) as usize],
            season: Season::from_month(month),
            activities: seasonal_activities(month),
        })
        .collect()
}

/// Static tips served when the tip generator is unavailable
pub fn static_farming_tips(season: Season) -> Vec<&'static str> {
    let seasonal = match season {
        Season::Monsoon => [
            "Clear field drains so water does not stand around roots",
            "Watch paddy and banana for fungal spots after continuous rain",
            "Delay fertilizer application until a dry spell of two days",
        ],
        Season::PostMonsoon => [
            "Harvest kharif paddy once 80% of grains turn golden",
            "Mulch coconut basins to hold the last of the soil moisture",
            "Test soil before planning the next crop",
        ],
        Season::Summer => [
            "Irrigate early in the morning or late in the evening",
            "Provide shade for young pepper and cardamom plants",
            "Check drip lines and pump sets before the monsoon",
        ],
    };
    let mut tips = seasonal.to_vec();
    tips.push("Keep records of every farming activity");
    tips
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_month_ranges() {
        assert_eq!(Season::from_month(6), Season::Monsoon);
        assert_eq!(Season::from_month(9), Season::Monsoon);
        assert_eq!(Season::from_month(10), Season::PostMonsoon);
        assert_eq!(Season::from_month(12), Season::PostMonsoon);
        assert_eq!(Season::from_month(1), Season::Summer);
        assert_eq!(Season::from_month(5), Season::Summer);
    }

    #[test]
    fn calendar_covers_every_month() {
        let calendar = crop_calendar();
        assert_eq!(calendar.len(), 12);
        assert_eq!(calendar[5].activities[0], "Kharif sowing");
        assert_eq!(calendar[11].name, "December");
        assert!(calendar.iter().all(|m| m.activities.len() == 3));
    }

    #[test]
    fn out_of_range_month_is_general() {
        assert_eq!(seasonal_activities(13)[0], "General farm maintenance");
        assert_eq!(seasonal_activities(0)[2], "Equipment care");
    }

    #[test]
    fn season_serializes_with_hyphen() {
        assert_eq!(
            serde_json::to_value(Season::PostMonsoon).unwrap(),
            serde_json::json!("Post-Monsoon")
        );
    }
}
