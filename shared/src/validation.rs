//! Validation utilities for Krishi Sakhi
//!
//! Includes the Kerala crop and livestock allow-lists and the `DD/MM/YYYY`
//! date convention used by the activity log.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

// ============================================================================
// Kerala Allow-lists
// ============================================================================

/// Crops grown in Kerala that a farm profile may list
pub const KERALA_CROPS: &[&str] = &[
    "rice",
    "paddy",
    "coconut",
    "rubber",
    "pepper",
    "black pepper",
    "cardamom",
    "coffee",
    "tea",
    "arecanut",
    "cashew",
    "banana",
    "plantain",
    "tapioca",
    "cassava",
    "ginger",
    "turmeric",
    "nutmeg",
    "clove",
    "cinnamon",
    "vanilla",
    "cocoa",
    "jackfruit",
    "mango",
    "pineapple",
    "papaya",
    "sugarcane",
    "sesame",
    "yam",
    "colocasia",
    "sweet potato",
    "brinjal",
    "okra",
    "bitter gourd",
    "snake gourd",
    "ash gourd",
    "pumpkin",
    "cucumber",
    "amaranthus",
    "cowpea",
    "chilli",
    "tomato",
    "drumstick",
    "vegetables",
];

/// Livestock commonly kept on Kerala farms
pub const KERALA_LIVESTOCK: &[&str] = &[
    "cow",
    "cows",
    "cattle",
    "buffalo",
    "buffaloes",
    "goat",
    "goats",
    "chicken",
    "chickens",
    "poultry",
    "duck",
    "ducks",
    "quail",
    "pig",
    "pigs",
    "rabbit",
    "rabbits",
    "fish",
    "bees",
    "honey bees",
];

fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Names not in the allow-list, in input order. Comparison ignores case and
/// repeated whitespace.
pub fn disallowed_names(names: &[String], allow_list: &[&str]) -> Vec<String> {
    names
        .iter()
        .filter(|name| !allow_list.contains(&normalize_name(name).as_str()))
        .cloned()
        .collect()
}

pub fn invalid_crops(crops: &[String]) -> Vec<String> {
    disallowed_names(crops, KERALA_CROPS)
}

pub fn invalid_livestock(livestock: &[String]) -> Vec<String> {
    disallowed_names(livestock, KERALA_LIVESTOCK)
}

// ============================================================================
// Activity Validations
// ============================================================================

/// Date format used by the activity endpoints
pub const ACTIVITY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Parse a `DD/MM/YYYY` activity date
pub fn parse_activity_date(value: &str) -> Result<NaiveDate, &'static str> {
    NaiveDate::parse_from_str(value.trim(), ACTIVITY_DATE_FORMAT)
        .map_err(|_| "Date must be in DD/MM/YYYY format")
}

/// Parse a `DD/MM/YYYY` activity date as midnight of that day
pub fn parse_activity_datetime(value: &str) -> Result<NaiveDateTime, &'static str> {
    parse_activity_date(value).map(|date| date.and_time(NaiveTime::MIN))
}

/// Format a timestamp as `DD/MM/YYYY`
pub fn format_activity_date(date: NaiveDateTime) -> String {
    date.format(ACTIVITY_DATE_FORMAT).to_string()
}

/// Success ratings are 1 (poor) to 5 (excellent)
pub fn validate_success_rating(rating: i32) -> Result<(), &'static str> {
    if !(1..=5).contains(&rating) {
        return Err("Success rating must be between 1 and 5");
    }
    Ok(())
}

/// Amounts such as cost and labor hours cannot be negative
pub fn validate_non_negative(value: Decimal) -> Result<(), &'static str> {
    if value < Decimal::ZERO {
        return Err("Value cannot be negative");
    }
    Ok(())
}

// ============================================================================
// Profile Validations
// ============================================================================

/// Farm size in acres must be positive
pub fn validate_farm_size(size: Decimal) -> Result<(), &'static str> {
    if size <= Decimal::ZERO {
        return Err("Farm size must be greater than zero");
    }
    Ok(())
}

/// Indian phone numbers: 10 digits, optionally prefixed with +91 or 0
pub fn validate_phone_number(phone: &str) -> Result<(), &'static str> {
    let digits: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect();
    let local = digits
        .strip_prefix("+91")
        .or_else(|| digits.strip_prefix('0'))
        .unwrap_or(&digits);

    if local.len() != 10 || !local.chars().all(|c| c.is_ascii_digit()) {
        return Err("Phone number must have 10 digits");
    }
    Ok(())
}

/// Latitude and longitude bounds
pub fn validate_coordinates(latitude: Decimal, longitude: Decimal) -> Result<(), &'static str> {
    if latitude < Decimal::from(-90) || latitude > Decimal::from(90) {
        return Err("Latitude must be between -90 and 90");
    }
    if longitude < Decimal::from(-180) || longitude > Decimal::from(180) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn kiwi_is_not_a_kerala_crop() {
        let crops = vec!["Rice".to_string(), "Kiwi".to_string(), "Black  Pepper".to_string()];
        assert_eq!(invalid_crops(&crops), vec!["Kiwi".to_string()]);
    }

    #[test]
    fn livestock_allow_list() {
        let animals = vec!["Cows".to_string(), "Goats".to_string(), "Camel".to_string()];
        assert_eq!(invalid_livestock(&animals), vec!["Camel".to_string()]);
    }

    #[test]
    fn activity_date_example() {
        let date = parse_activity_datetime("25/03/2024").unwrap();
        assert_eq!(date.date(), NaiveDate::from_ymd_opt(2024, 3, 25).unwrap());
        assert_eq!(format_activity_date(date), "25/03/2024");
    }

    #[test]
    fn rejects_iso_dates() {
        assert!(parse_activity_date("2024-03-25").is_err());
        assert!(parse_activity_date("31/02/2024").is_err());
    }

    #[test]
    fn phone_numbers() {
        assert!(validate_phone_number("9876543210").is_ok());
        assert!(validate_phone_number("+91 98765-43210").is_ok());
        assert!(validate_phone_number("09876543210").is_ok());
        assert!(validate_phone_number("12345").is_err());
        assert!(validate_phone_number("98765abcde").is_err());
    }

    #[test]
    fn rating_bounds() {
        assert!(validate_success_rating(1).is_ok());
        assert!(validate_success_rating(5).is_ok());
        assert!(validate_success_rating(0).is_err());
        assert!(validate_success_rating(6).is_err());
    }

    proptest! {
        #[test]
        fn activity_dates_round_trip(days in 0i64..(365 * 200)) {
            let base = NaiveDate::from_ymd_opt(1950, 1, 1).unwrap();
            let date = base + chrono::Duration::days(days);
            let formatted = format_activity_date(date.and_time(NaiveTime::MIN));
            let parsed = parse_activity_datetime(&formatted).unwrap();
            prop_assert_eq!(parsed.date(), date);
            prop_assert_eq!(format_activity_date(parsed), formatted);
        }

        #[test]
        fn allow_listed_crops_pass_in_any_case(idx in 0..KERALA_CROPS.len(), upper in any::<bool>()) {
            let name = if upper {
                KERALA_CROPS[idx].to_uppercase()
            } else {
                KERALA_CROPS[idx].to_string()
            };
            prop_assert!(invalid_crops(&[name]).is_empty());
        }
    }
}
