//! Dashboard tests
//!
//! Tests for home page data including:
//! - Fallback statistics stay inside their documented ranges
//! - Live market replies are parsed and rounded
//! - Rain alerts only count forecast points inside the window

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use rust_decimal::Decimal;
use std::str::FromStr;

use krishi_sakhi_backend::external::ai::AiError;
use krishi_sakhi_backend::external::weather::{rain_alert_count, ForecastItem, WeatherForecast};
use krishi_sakhi_backend::external::{GenerationOptions, ImageInput, LanguageModel};
use krishi_sakhi_backend::services::dashboard::{
    fallback_stats, market_prices, parse_live_market, MarketMode,
};
use shared::static_market_prices;

/// Model that answers in prose instead of JSON
struct ChattyModel;

#[async_trait]
impl LanguageModel for ChattyModel {
    async fn generate(&self, _prompt: &str, _options: &GenerationOptions) -> Result<String, AiError> {
        Ok("Prices are stable this week.".to_string())
    }

    async fn generate_from_image(
        &self,
        _prompt: &str,
        _image: &ImageInput,
        _options: &GenerationOptions,
    ) -> Result<String, AiError> {
        Err(AiError::ImageUnsupported("test"))
    }
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn forecast_point(hours_ahead: i64, rain_mm: Option<&str>, pop: &str) -> ForecastItem {
    let base = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
    ForecastItem {
        timestamp: base + Duration::hours(hours_ahead),
        temperature_celsius: dec("27.0"),
        feels_like_celsius: dec("30.0"),
        humidity_percent: 85,
        weather_condition: "Rain".to_string(),
        weather_description: "moderate rain".to_string(),
        weather_icon: "10d".to_string(),
        pop: dec(pop),
        rain_3h_mm: rain_mm.map(dec),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_live_market_accepts_fenced_reply() {
        let reply = "```json\n{\"prices\": [{\"name\": \"Rice\", \"price\": 2212.456, \
                     \"change_percentage\": 2.46}], \"insights\": \"Prices firm.\"}\n```";
        let market = parse_live_market(reply).unwrap();

        assert_eq!(market.prices.len(), 1);
        assert_eq!(market.insights, "Prices firm.");
    }

    #[test]
    fn test_live_market_rejects_empty_prices() {
        assert!(parse_live_market("{\"prices\": []}").is_err());
        assert!(parse_live_market("Prices are stable this week.").is_err());
    }

    #[test]
    fn test_static_mode_uses_reference_table_tagged_fallback() {
        let prices = tokio_test::block_on(market_prices(&ChattyModel, MarketMode::Static));
        assert!(prices.is_fallback());
        assert_eq!(prices.into_data(), static_market_prices());
    }

    #[test]
    fn test_unparseable_live_reply_falls_back_to_reference_table() {
        let prices = tokio_test::block_on(market_prices(&ChattyModel, MarketMode::Live));
        assert!(prices.is_fallback());
        assert_eq!(prices.into_data(), static_market_prices());
    }

    #[test]
    fn test_rain_alerts_inside_window_only() {
        let now = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let forecast = WeatherForecast {
            location_name: "Kochi".to_string(),
            timezone_offset_seconds: 19800,
            forecasts: vec![
                forecast_point(3, Some("4.2"), "0.9"),
                forecast_point(12, None, "0.2"),
                forecast_point(18, None, "0.6"),
                forecast_point(30, Some("8.0"), "1.0"),
            ],
        };

        assert_eq!(rain_alert_count(&forecast, now, Duration::hours(24), dec("1")), 2);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_fallback_stats_within_bounds(seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let stats = fallback_stats(&mut rng);

            prop_assert!((1..=5).contains(&stats.total_farmers));
            prop_assert!((1..=8).contains(&stats.total_farms));
            prop_assert!((3..=8).contains(&stats.total_crops));
            prop_assert!((2..=6).contains(&stats.active_tasks));
            prop_assert!((1..=4).contains(&stats.upcoming_activities));
            prop_assert!((0..=2).contains(&stats.weather_alerts));
            prop_assert!((5..=12).contains(&stats.recent_activities_count));
        }
    }
}
