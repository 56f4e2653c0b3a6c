//! Weather presentation service
//!
//! Shapes OpenWeatherMap data for the home page, asks the utility model for
//! short forecast insights and keeps a daily log of observed conditions.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{ModelRole, Sourced};
use sqlx::PgPool;
use std::sync::Arc;

use crate::error::AppResult;
use crate::external::weather::{CurrentWeather, ForecastItem, WeatherBundle, WeatherForecast};
use crate::external::{GenerationOptions, LanguageModel};

/// Forecast points covering the next 24 hours (3-hour steps)
pub const NEXT_DAY_POINTS: usize = 8;

pub const INSIGHTS_UNAVAILABLE: &str = "Weather forecast insights unavailable at this time.";
pub const INSIGHTS_FAILED: &str = "Unable to generate weather insights at this time.";

#[derive(Clone)]
pub struct WeatherService {
    db: PgPool,
    ai: Arc<dyn LanguageModel>,
}

/// Current conditions as shown on the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct WeatherSummary {
    pub temperature: i64,
    pub description: String,
    pub humidity: i32,
    pub wind_speed: f64,
    pub icon: String,
    pub feels_like: i64,
    pub location: String,
}

/// Current conditions with pressure and visibility
#[derive(Debug, Clone, Serialize)]
pub struct WeatherDetail {
    #[serde(flatten)]
    pub summary: WeatherSummary,
    pub pressure: i32,
    /// Kilometres
    pub visibility: f64,
}

/// One 3-hour forecast step
#[derive(Debug, Clone, Serialize)]
pub struct ForecastPoint {
    pub datetime: String,
    pub time: String,
    pub temperature: i64,
    pub description: String,
    pub icon: String,
    pub humidity: i32,
    pub feels_like: i64,
}

/// Forecast page payload
#[derive(Debug, Clone, Serialize)]
pub struct ForecastReport {
    pub current: WeatherDetail,
    pub forecast: Vec<ForecastPoint>,
    pub insights: String,
    pub insights_source: shared::DataSource,
    pub last_updated: DateTime<Utc>,
}

#[derive(Serialize)]
struct InsightPoint<'a> {
    time: String,
    temp: f64,
    description: &'a str,
    humidity: i32,
}

fn whole(value: Decimal) -> i64 {
    value.round().to_i64().unwrap_or_default()
}

fn one_decimal(value: Decimal) -> f64 {
    value.round_dp(1).to_f64().unwrap_or_default()
}

/// "broken clouds" -> "Broken Clouds"
pub fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn summarize(current: &CurrentWeather) -> WeatherSummary {
    WeatherSummary {
        temperature: whole(current.temperature_celsius),
        description: title_case(&current.weather_description),
        humidity: current.humidity_percent,
        wind_speed: one_decimal(current.wind_speed_mps),
        icon: current.weather_icon.clone(),
        feels_like: whole(current.feels_like_celsius),
        location: current.location_name.clone(),
    }
}

pub fn detail(current: &CurrentWeather) -> WeatherDetail {
    WeatherDetail {
        summary: summarize(current),
        pressure: current.pressure_hpa,
        visibility: f64::from(current.visibility_meters) / 1000.0,
    }
}

fn city_offset(forecast: &WeatherForecast) -> FixedOffset {
    FixedOffset::east_opt(forecast.timezone_offset_seconds)
        .unwrap_or_else(|| Utc.fix())
}

/// Next-day forecast points in the city's local time
pub fn next_day_points(forecast: &WeatherForecast) -> Vec<ForecastPoint> {
    let offset = city_offset(forecast);
    forecast
        .forecasts
        .iter()
        .take(NEXT_DAY_POINTS)
        .map(|item| {
            let local = item.timestamp.with_timezone(&offset);
            ForecastPoint {
                datetime: local.format("%Y-%m-%d %H:%M:%S").to_string(),
                time: local.format("%I:%M %p").to_string(),
                temperature: whole(item.temperature_celsius),
                description: title_case(&item.weather_description),
                icon: item.weather_icon.clone(),
                humidity: item.humidity_percent,
                feels_like: whole(item.feels_like_celsius),
            }
        })
        .collect()
}

fn insights_prompt(items: &[ForecastItem], offset: FixedOffset, location: &str) -> String {
    let summary: Vec<InsightPoint> = items
        .iter()
        .take(NEXT_DAY_POINTS)
        .map(|item| InsightPoint {
            time: item
                .timestamp
                .with_timezone(&offset)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            temp: item.temperature_celsius.to_f64().unwrap_or_default(),
            description: &item.weather_description,
            humidity: item.humidity_percent,
        })
        .collect();
    let data = serde_json::to_string(&summary).unwrap_or_default();

    format!(
        "As a weather expert for farmers in {location}, India, provide a concise weather \
         forecast analysis based on this data:\n\n\
         Forecast Data: {data}\n\n\
         Please provide:\n\
         1. A brief weather summary for the next 24 hours\n\
         2. Best farming time windows for today\n\
         3. Any weather warnings or recommendations\n\
         4. Irrigation advice based on expected conditions\n\n\
         Keep the response concise and farmer-friendly, max 3-4 sentences."
    )
}

impl WeatherService {
    pub fn new(db: PgPool, ai: Arc<dyn LanguageModel>) -> Self {
        Self { db, ai }
    }

    /// Short model-written reading of the next 24 hours
    pub async fn forecast_insights(&self, forecast: &WeatherForecast, location: &str) -> Sourced<String> {
        if forecast.forecasts.is_empty() {
            return Sourced::fallback("empty forecast", INSIGHTS_UNAVAILABLE.to_string());
        }

        let prompt = insights_prompt(&forecast.forecasts, city_offset(forecast), location);
        let options = GenerationOptions::new(ModelRole::LightUtility)
            .with_temperature(0.7)
            .with_max_tokens(400);

        match self.ai.generate(&prompt, &options).await {
            Ok(text) => Sourced::Live(text.trim().to_string()),
            Err(e) => {
                tracing::warn!("Weather insights unavailable: {}", e);
                Sourced::fallback(e.to_string(), INSIGHTS_FAILED.to_string())
            }
        }
    }

    /// Forecast page payload for an already fetched bundle
    pub async fn forecast_report(&self, bundle: &WeatherBundle, location: &str) -> ForecastReport {
        let insights = self.forecast_insights(&bundle.forecast, location).await;
        self.record_daily_log(location, &bundle.current).await;

        ForecastReport {
            current: detail(&bundle.current),
            forecast: next_day_points(&bundle.forecast),
            insights_source: insights.source(),
            insights: insights.into_data(),
            last_updated: Utc::now(),
        }
    }

    /// Upsert today's reading for the location; failures are only logged.
    /// Rainfall is a trailing one-hour reading, so a day keeps its peak.
    pub async fn record_daily_log(&self, location: &str, current: &CurrentWeather) {
        if let Err(e) = self.store_daily_log(location, current).await {
            tracing::warn!("Could not record weather log for {}: {}", location, e);
        }
    }

    async fn store_daily_log(&self, location: &str, current: &CurrentWeather) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO weather_logs (location, date, temperature_max, temperature_min, humidity,
                                      rainfall, wind_speed, weather_condition)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (location, date) DO UPDATE
            SET temperature_max = GREATEST(weather_logs.temperature_max, EXCLUDED.temperature_max),
                temperature_min = LEAST(weather_logs.temperature_min, EXCLUDED.temperature_min),
                humidity = EXCLUDED.humidity,
                rainfall = GREATEST(weather_logs.rainfall, EXCLUDED.rainfall),
                wind_speed = EXCLUDED.wind_speed,
                weather_condition = EXCLUDED.weather_condition
            "#,
        )
        .bind(location)
        .bind(current.timestamp.date_naive())
        .bind(current.temp_max_celsius)
        .bind(current.temp_min_celsius)
        .bind(Decimal::from(current.humidity_percent))
        .bind(current.rain_1h_mm.unwrap_or(Decimal::ZERO))
        .bind(current.wind_speed_mps)
        .bind(&current.weather_condition)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}
