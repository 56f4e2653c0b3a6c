//! Home page dashboard composition
//!
//! Combines current weather, an optional daily advisory, farm statistics,
//! market prices and the month's seasonal activities into one payload.
//! Every enrichment degrades on its own; a failing upstream never fails
//! the dashboard.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    seasonal_activities, static_market_prices, MarketPrice, ModelRole, Season, Sourced, Tagged,
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::external::weather::{rain_alert_count, WeatherClient, WeatherForecast};
use crate::external::{GenerationOptions, LanguageModel};
use crate::services::advisory::AdvisoryService;
use crate::services::clock::ist_month;
use crate::services::formatting::extract_json_block;
use crate::services::weather::{summarize, WeatherSummary};

/// Rain at or above this many millimetres in a 3-hour step raises an alert
const RAIN_ALERT_MM: i64 = 1;

/// Window inspected for weather alerts
const ALERT_WINDOW_HOURS: i64 = 24;

/// Activities newer than this count as recent
const RECENT_DAYS: i64 = 7;

#[derive(Clone)]
pub struct DashboardService {
    db: PgPool,
    ai: Arc<dyn LanguageModel>,
    weather: WeatherClient,
}

/// How market prices are produced
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MarketMode {
    #[default]
    Static,
    Live,
}

/// Dashboard query parameters
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default)]
    pub include_advisory: bool,
    #[serde(default)]
    pub market_mode: MarketMode,
}

fn default_location() -> String {
    "Kochi".to_string()
}

impl Default for DashboardQuery {
    fn default() -> Self {
        Self {
            location: default_location(),
            include_advisory: false,
            market_mode: MarketMode::Static,
        }
    }
}

/// Quick statistics shown on the home page
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_farmers: i64,
    pub total_farms: i64,
    pub total_crops: i64,
    pub active_tasks: i64,
    pub upcoming_activities: i64,
    pub weather_alerts: i64,
    pub recent_activities_count: i64,
}

/// Dashboard payload
#[derive(Debug, Serialize)]
pub struct DashboardData {
    pub weather: Option<WeatherSummary>,
    pub advisory: Option<Tagged<String>>,
    pub stats: Tagged<DashboardStats>,
    pub market_prices: Tagged<Vec<MarketPrice>>,
    pub seasonal_activities: Vec<&'static str>,
    pub season: Season,
    pub last_updated: DateTime<Utc>,
}

/// Model-estimated prices with a short market reading
#[derive(Debug, Clone, Serialize)]
pub struct LiveMarket {
    pub prices: Vec<MarketPrice>,
    pub insights: String,
}

#[derive(Debug, Deserialize)]
struct LiveMarketReply {
    prices: Vec<LivePriceRow>,
    #[serde(default)]
    insights: String,
}

#[derive(Debug, Deserialize)]
struct LivePriceRow {
    name: String,
    price: f64,
    #[serde(alias = "change_percentage", default)]
    change: f64,
}

pub const LIVE_MARKET_PROMPT: &str = "Provide current market price information for major crops \
     in Kerala, India:\n\
     - Rice (per quintal)\n\
     - Coconut (per 100 nuts)\n\
     - Black Pepper (per kg)\n\
     - Cardamom (per kg)\n\n\
     Respond with only a JSON object of the form \
     {\"prices\": [{\"name\": \"Rice\", \"price\": 2200, \"change\": 2.5}], \
     \"insights\": \"two sentences on the market trend\"}. \
     Prices are in INR and change is the recent percentage trend. \
     Keep it realistic for Kerala markets.";

/// Randomized statistics used when the store cannot be read
pub fn fallback_stats<R: Rng + ?Sized>(rng: &mut R) -> DashboardStats {
    DashboardStats {
        total_farmers: rng.gen_range(1..=5),
        total_farms: rng.gen_range(1..=8),
        total_crops: rng.gen_range(3..=8),
        active_tasks: rng.gen_range(2..=6),
        upcoming_activities: rng.gen_range(1..=4),
        weather_alerts: rng.gen_range(0..=2),
        recent_activities_count: rng.gen_range(5..=12),
    }
}

/// Parse the live market reply; prices must be present and sane
pub fn parse_live_market(reply: &str) -> Result<LiveMarket, String> {
    let parsed: LiveMarketReply =
        serde_json::from_str(extract_json_block(reply)).map_err(|e| e.to_string())?;

    let prices: Vec<MarketPrice> = parsed
        .prices
        .into_iter()
        .filter(|row| row.price.is_finite() && row.price > 0.0 && row.change.is_finite())
        .filter_map(|row| {
            Some(MarketPrice {
                name: row.name,
                price: Decimal::from_f64_retain(row.price)?.round_dp(2),
                change: Decimal::from_f64_retain(row.change)?.round_dp(1),
            })
        })
        .collect();

    if prices.is_empty() {
        return Err("no prices in reply".to_string());
    }

    Ok(LiveMarket {
        prices,
        insights: parsed.insights.trim().to_string(),
    })
}

/// Ask the utility model for a price table
pub async fn live_market(ai: &dyn LanguageModel) -> Result<LiveMarket, String> {
    let options = GenerationOptions::new(ModelRole::LightUtility)
        .with_temperature(0.3)
        .with_max_tokens(800);
    let reply = ai
        .generate(LIVE_MARKET_PROMPT, &options)
        .await
        .map_err(|e| e.to_string())?;
    parse_live_market(&reply)
}

/// Market prices for the requested mode. The reference table is never
/// tagged live, whether chosen or fallen back to.
pub async fn market_prices(ai: &dyn LanguageModel, mode: MarketMode) -> Sourced<Vec<MarketPrice>> {
    match mode {
        MarketMode::Static => Sourced::fallback("static reference prices", static_market_prices()),
        MarketMode::Live => match live_market(ai).await {
            Ok(market) => Sourced::Live(market.prices),
            Err(reason) => {
                tracing::warn!("Live market prices unavailable: {}", reason);
                Sourced::fallback(reason, static_market_prices())
            }
        },
    }
}

impl DashboardService {
    pub fn new(db: PgPool, ai: Arc<dyn LanguageModel>, weather: WeatherClient) -> Self {
        Self { db, ai, weather }
    }

    async fn count(&self, sql: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(sql).fetch_one(&self.db).await
    }

    async fn store_stats(&self, forecast: Option<&WeatherForecast>) -> AppResult<DashboardStats> {
        let total_farmers = self
            .count("SELECT COUNT(*) FROM farmers WHERE is_active")
            .await?;
        let total_farms = self.count("SELECT COUNT(*) FROM farms").await?;
        let total_crops = self
            .count("SELECT COUNT(*) FROM crops WHERE status IN ('planted', 'growing')")
            .await?;
        let active_tasks = self
            .count("SELECT COUNT(*) FROM activities WHERE NOT is_completed")
            .await?;
        let upcoming_activities = self
            .count("SELECT COUNT(*) FROM activities WHERE NOT is_completed AND date >= NOW()")
            .await?;

        let recent_activities_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM activities WHERE date >= $1",
        )
        .bind((Utc::now() - Duration::days(RECENT_DAYS)).naive_utc())
        .fetch_one(&self.db)
        .await?;

        let weather_alerts = forecast
            .map(|f| {
                rain_alert_count(
                    f,
                    Utc::now(),
                    Duration::hours(ALERT_WINDOW_HOURS),
                    Decimal::from(RAIN_ALERT_MM),
                ) as i64
            })
            .unwrap_or(0);

        Ok(DashboardStats {
            total_farmers,
            total_farms,
            total_crops,
            active_tasks,
            upcoming_activities,
            weather_alerts,
            recent_activities_count,
        })
    }

    /// Statistics from the store, randomized placeholders if it fails
    pub async fn stats(&self, forecast: Option<&WeatherForecast>) -> Sourced<DashboardStats> {
        match self.store_stats(forecast).await {
            Ok(stats) => Sourced::Live(stats),
            Err(e) => {
                tracing::warn!("Dashboard statistics unavailable: {}", e);
                Sourced::fallback(e.to_string(), fallback_stats(&mut rand::thread_rng()))
            }
        }
    }

    /// Assemble the dashboard
    pub async fn dashboard(&self, query: &DashboardQuery) -> AppResult<DashboardData> {
        let location = query.location.trim();
        if location.is_empty() {
            return Err(AppError::invalid(
                "location",
                "Location cannot be empty",
                "സ്ഥലം ശൂന്യമാകരുത്",
            ));
        }

        let now = Utc::now();
        let month = ist_month(now);
        let season = Season::from_month(month);

        let bundle = self.weather.fetch(location).await;

        let advisory_service = AdvisoryService::new(self.db.clone(), self.ai.clone());
        let advisory = async {
            if query.include_advisory {
                let current = bundle.as_ref().map(|b| &b.current);
                Some(advisory_service.daily_advisory(current, location, season).await)
            } else {
                None
            }
        };
        let stats = self.stats(bundle.as_ref().map(|b| &b.forecast));
        let prices = market_prices(self.ai.as_ref(), query.market_mode);

        let (advisory, stats, prices) = tokio::join!(advisory, stats, prices);

        Ok(DashboardData {
            weather: bundle.as_ref().map(|b| summarize(&b.current)),
            advisory: advisory.map(Tagged::from),
            stats: stats.into(),
            market_prices: prices.into(),
            seasonal_activities: seasonal_activities(month),
            season,
            last_updated: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_live_market() {
        let reply = "```json\n{\"prices\": [{\"name\": \"Rice\", \"price\": 2310.456, \"change_percentage\": 1.27}], \"insights\": \" Paddy is firm. \"}\n```";
        let market = parse_live_market(reply).unwrap();
        assert_eq!(market.prices.len(), 1);
        assert_eq!(market.prices[0].price, Decimal::new(231046, 2));
        assert_eq!(market.prices[0].change, Decimal::new(13, 1));
        assert_eq!(market.insights, "Paddy is firm.");
    }

    #[test]
    fn rejects_reply_without_prices() {
        assert!(parse_live_market("{\"prices\": []}").is_err());
        assert!(parse_live_market("prices are stable").is_err());
    }

    #[test]
    fn query_defaults() {
        let query: DashboardQuery = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(query.location, "Kochi");
        assert!(!query.include_advisory);
        assert_eq!(query.market_mode, MarketMode::Static);
    }
}
