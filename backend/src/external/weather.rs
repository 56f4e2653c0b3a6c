//! Weather API client for fetching weather data
//!
//! Integrates with OpenWeatherMap API for current conditions and the
//! 5-day / 3-hour forecast of an Indian city.

use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Country code appended to every city query
const COUNTRY_CODE: &str = "IN";

/// Weather API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// Current weather conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub timestamp: DateTime<Utc>,
    pub location_name: String,
    pub temperature_celsius: Decimal,
    pub feels_like_celsius: Decimal,
    pub temp_min_celsius: Decimal,
    pub temp_max_celsius: Decimal,
    pub humidity_percent: i32,
    pub pressure_hpa: i32,
    pub wind_speed_mps: Decimal,
    pub visibility_meters: i32,
    pub weather_condition: String,
    pub weather_description: String,
    pub weather_icon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rain_1h_mm: Option<Decimal>,
}

/// Weather forecast for a specific time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastItem {
    pub timestamp: DateTime<Utc>,
    pub temperature_celsius: Decimal,
    pub feels_like_celsius: Decimal,
    pub humidity_percent: i32,
    pub weather_condition: String,
    pub weather_description: String,
    pub weather_icon: String,
    pub pop: Decimal, // Probability of precipitation (0-1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rain_3h_mm: Option<Decimal>,
}

/// 5-day forecast in 3-hour steps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherForecast {
    pub location_name: String,
    pub timezone_offset_seconds: i32,
    pub forecasts: Vec<ForecastItem>,
}

/// Current conditions together with the forecast for the same city
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherBundle {
    pub current: CurrentWeather,
    pub forecast: WeatherForecast,
}

/// OpenWeatherMap API response for current weather
#[derive(Debug, Deserialize)]
struct OWMCurrentResponse {
    weather: Vec<OWMWeather>,
    main: OWMMain,
    visibility: Option<i32>,
    wind: OWMWind,
    rain: Option<OWMRain>,
    dt: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct OWMWeather {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OWMMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: i32,
    humidity: i32,
}

#[derive(Debug, Deserialize)]
struct OWMWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OWMRain {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
}

/// OpenWeatherMap API response for forecast
#[derive(Debug, Deserialize)]
struct OWMForecastResponse {
    city: OWMCity,
    list: Vec<OWMForecastItem>,
}

#[derive(Debug, Deserialize)]
struct OWMCity {
    name: String,
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OWMForecastItem {
    dt: i64,
    main: OWMMain,
    weather: Vec<OWMWeather>,
    #[serde(default)]
    pop: f64,
    rain: Option<OWMForecastRain>,
}

#[derive(Debug, Deserialize)]
struct OWMForecastRain {
    #[serde(rename = "3h")]
    three_hour: Option<f64>,
}

fn decimal(value: f64) -> Decimal {
    Decimal::from_f64_retain(value).unwrap_or_default()
}

impl WeatherClient {
    /// Create a new WeatherClient
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, endpoint: &str, city: &str) -> AppResult<T> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", format!("{},{}", city, COUNTRY_CODE)),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                AppError::Internal(format!("Weather API request failed: {}", e.without_url()))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Internal(format!(
                "Weather API error: {} - {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| {
                AppError::Internal(format!("Failed to parse weather response: {}", e.without_url()))
            })
    }

    /// Fetch current weather conditions for a city
    pub async fn get_current_weather(&self, city: &str) -> AppResult<CurrentWeather> {
        let data: OWMCurrentResponse = self.get_json("weather", city).await?;
        Ok(convert_current_response(data))
    }

    /// Fetch the 5-day forecast for a city
    pub async fn get_forecast(&self, city: &str) -> AppResult<WeatherForecast> {
        let data: OWMForecastResponse = self.get_json("forecast", city).await?;
        Ok(convert_forecast_response(data))
    }

    /// Current conditions and forecast, or `None` if either call fails
    pub async fn fetch(&self, city: &str) -> Option<WeatherBundle> {
        let (current, forecast) =
            tokio::join!(self.get_current_weather(city), self.get_forecast(city));

        match (current, forecast) {
            (Ok(current), Ok(forecast)) => Some(WeatherBundle { current, forecast }),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!("Weather unavailable for {}: {}", city, e);
                None
            }
        }
    }
}

/// Convert OpenWeatherMap current response to our format
fn convert_current_response(data: OWMCurrentResponse) -> CurrentWeather {
    let weather = data.weather.first();

    CurrentWeather {
        timestamp: DateTime::from_timestamp(data.dt, 0).unwrap_or_else(Utc::now),
        location_name: data.name,
        temperature_celsius: decimal(data.main.temp),
        feels_like_celsius: decimal(data.main.feels_like),
        temp_min_celsius: decimal(data.main.temp_min),
        temp_max_celsius: decimal(data.main.temp_max),
        humidity_percent: data.main.humidity,
        pressure_hpa: data.main.pressure,
        wind_speed_mps: decimal(data.wind.speed),
        visibility_meters: data.visibility.unwrap_or(0),
        weather_condition: weather.map(|w| w.main.clone()).unwrap_or_default(),
        weather_description: weather.map(|w| w.description.clone()).unwrap_or_default(),
        weather_icon: weather.map(|w| w.icon.clone()).unwrap_or_default(),
        rain_1h_mm: data.rain.and_then(|r| r.one_hour).map(decimal),
    }
}

/// Convert OpenWeatherMap forecast response to our format
fn convert_forecast_response(data: OWMForecastResponse) -> WeatherForecast {
    let forecasts = data
        .list
        .into_iter()
        .map(|item| {
            let weather = item.weather.first();
            ForecastItem {
                timestamp: DateTime::from_timestamp(item.dt, 0).unwrap_or_else(Utc::now),
                temperature_celsius: decimal(item.main.temp),
                feels_like_celsius: decimal(item.main.feels_like),
                humidity_percent: item.main.humidity,
                weather_condition: weather.map(|w| w.main.clone()).unwrap_or_default(),
                weather_description: weather.map(|w| w.description.clone()).unwrap_or_default(),
                weather_icon: weather.map(|w| w.icon.clone()).unwrap_or_default(),
                pop: decimal(item.pop),
                rain_3h_mm: item.rain.and_then(|r| r.three_hour).map(decimal),
            }
        })
        .collect();

    WeatherForecast {
        location_name: data.city.name,
        timezone_offset_seconds: data.city.timezone,
        forecasts,
    }
}

fn is_rain_point(item: &ForecastItem, threshold_mm: Decimal) -> bool {
    item.rain_3h_mm.map(|r| r >= threshold_mm).unwrap_or(false) || item.pop >= Decimal::new(5, 1)
}

/// Forecast points within the window that expect rain
pub fn rain_alert_count(
    forecast: &WeatherForecast,
    now: DateTime<Utc>,
    window: chrono::Duration,
    threshold_mm: Decimal,
) -> usize {
    forecast
        .forecasts
        .iter()
        .filter(|f| f.timestamp >= now && f.timestamp <= now + window)
        .filter(|f| is_rain_point(f, threshold_mm))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_forecast() -> OWMForecastResponse {
        serde_json::from_value(serde_json::json!({
            "city": {"name": "Kochi", "timezone": 19800},
            "list": [
                {
                    "dt": 1_711_357_200,
                    "main": {"temp": 31.2, "feels_like": 36.0, "temp_min": 30.0, "temp_max": 32.0, "pressure": 1008, "humidity": 70},
                    "weather": [{"main": "Clouds", "description": "broken clouds", "icon": "04d"}],
                    "pop": 0.1
                },
                {
                    "dt": 1_711_368_000,
                    "main": {"temp": 28.4, "feels_like": 32.0, "temp_min": 28.0, "temp_max": 29.0, "pressure": 1009, "humidity": 85},
                    "weather": [{"main": "Rain", "description": "light rain", "icon": "10n"}],
                    "pop": 0.3,
                    "rain": {"3h": 2.4}
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn converts_forecast() {
        let forecast = convert_forecast_response(sample_forecast());
        assert_eq!(forecast.location_name, "Kochi");
        assert_eq!(forecast.forecasts.len(), 2);
        assert_eq!(forecast.forecasts[1].weather_description, "light rain");
        assert!(forecast.forecasts[0].rain_3h_mm.is_none());
    }

    #[test]
    fn rain_alerts_respect_window() {
        let forecast = convert_forecast_response(sample_forecast());
        let start = DateTime::from_timestamp(1_711_350_000, 0).unwrap();
        let alerts = rain_alert_count(&forecast, start, chrono::Duration::hours(24), Decimal::ONE);
        assert_eq!(alerts, 1);

        let later = DateTime::from_timestamp(1_711_400_000, 0).unwrap();
        assert_eq!(
            rain_alert_count(&forecast, later, chrono::Duration::hours(24), Decimal::ONE),
            0
        );
    }

    #[tokio::test]
    async fn unreachable_service_yields_none() {
        let client = WeatherClient::new(
            "test".into(),
            "http://127.0.0.1:9".into(),
            Duration::from_secs(2),
        );
        assert!(client.fetch("Kochi").await.is_none());
    }

    #[tokio::test]
    async fn request_errors_do_not_reveal_key() {
        let client = WeatherClient::new(
            "OWMSECRETKEY".into(),
            "http://127.0.0.1:9".into(),
            Duration::from_secs(2),
        );
        let err = client.get_current_weather("Kochi").await.unwrap_err();
        assert!(!format!("{}", err).contains("OWMSECRETKEY"));
        assert!(!format!("{:?}", err).contains("OWMSECRETKEY"));
    }
}
