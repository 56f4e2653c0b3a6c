//! Market price models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Price quote for one crop
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketPrice {
    pub name: String,
    /// Price in INR
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Recent change in percent
    #[serde(with = "rust_decimal::serde::float")]
    pub change: Decimal,
}

impl MarketPrice {
    fn fixed(name: &str, price: i64, change_tenths: i64) -> Self {
        Self {
            name: name.to_string(),
            price: Decimal::from(price),
            change: Decimal::new(change_tenths, 1),
        }
    }
}

/// Fixed reference table for Kerala's four major cash crops
pub fn static_market_prices() -> Vec<MarketPrice> {
    vec![
        MarketPrice::fixed("Rice", 2200, 25),
        MarketPrice::fixed("Coconut", 30, -12),
        MarketPrice::fixed("Pepper", 500, 83),
        MarketPrice::fixed("Cardamom", 1500, -31),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_table_is_fixed() {
        let prices = static_market_prices();
        let names: Vec<_> = prices.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Rice", "Coconut", "Pepper", "Cardamom"]);
        assert_eq!(prices[1].change, Decimal::new(-12, 1));

        let json = serde_json::to_value(&prices[0]).unwrap();
        assert_eq!(json["price"], serde_json::json!(2200.0));
        assert_eq!(json["change"], serde_json::json!(2.5));
    }
}
