//! Knowledge hub: free-form farming content, market prices, the crop
//! calendar, seasonal tips and a weather analysis for farmers.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use shared::{
    crop_calendar, static_farming_tips, static_market_prices, CalendarMonth, MarketPrice,
    ModelRole, Season, Sourced, Tagged,
};
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::external::weather::CurrentWeather;
use crate::external::{GenerationOptions, LanguageModel, WeatherClient};
use crate::services::clock::ist_month;
use crate::services::dashboard::{live_market, MarketMode};
use crate::services::weather::{summarize, WeatherSummary};

/// Categories whose content is conditioned on current weather
const WEATHER_CATEGORIES: [i64; 2] = [1, 3];

const CONTENT_CONTEXT: &str = "You are an expert agricultural advisor for Kerala, India. Provide \
detailed, practical, and location-specific advice. Format your response in a clear, readable \
manner with proper paragraphs and bullet points where appropriate. Include specific examples \
relevant to Kerala's climate, soil, and farming conditions.";

pub const CONTENT_UNAVAILABLE: &str = "Unable to generate content at this moment.";
pub const ANALYSIS_UNAVAILABLE: &str = "Weather analysis unavailable";

static TIP_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[-*•]|\d+[.)])\s*").expect("tip prefix pattern"));

#[derive(Clone)]
pub struct KnowledgeService {
    ai: Arc<dyn LanguageModel>,
    weather: WeatherClient,
    weather_location: String,
}

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default = "default_category")]
    pub category_id: i64,
}

fn default_category() -> i64 {
    1
}

#[derive(Debug, Serialize)]
pub struct KnowledgeContent {
    pub content: String,
    pub category_id: i64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MarketQuery {
    #[serde(default)]
    pub mode: MarketMode,
}

#[derive(Debug, Serialize)]
pub struct MarketReport {
    pub mode: MarketMode,
    pub prices: Vec<MarketPrice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub month: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct CropCalendar {
    pub calendar: Vec<CalendarMonth>,
    pub current: CalendarMonth,
}

#[derive(Debug, Default, Deserialize)]
pub struct TipsQuery {
    pub season: Option<Season>,
}

#[derive(Debug, Serialize)]
pub struct FarmingTips {
    pub season: Season,
    pub tips: Tagged<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct WeatherAnalysis {
    pub weather_data: WeatherSummary,
    pub analysis: Tagged<String>,
    pub timestamp: DateTime<Utc>,
}

fn content_weather_context(current: &CurrentWeather) -> String {
    format!(
        "\n\nCurrent weather in Kerala: Temperature: {}°C, Condition: {}, Humidity: {}%",
        current.temperature_celsius.round_dp(2),
        current.weather_description,
        current.humidity_percent
    )
}

fn tips_prompt(season: Season) -> String {
    format!(
        "You are an agricultural extension officer in Kerala, India. Give 5 short, practical \
         farming tips for the {season} season covering Kerala crops such as paddy, coconut, \
         banana, pepper and vegetables. Put each tip on its own line with no headings and no \
         extra commentary."
    )
}

/// One tip per non-empty line, list markers removed
pub fn parse_tips(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(|line| TIP_PREFIX.replace(line, "").replace("**", "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

pub fn analysis_prompt(current: &CurrentWeather) -> String {
    format!(
        "Based on the current weather conditions in Kerala:\n\
         - Temperature: {}°C\n\
         - Condition: {}\n\
         - Humidity: {}%\n\
         - Wind Speed: {} m/s\n\n\
         Provide detailed analysis for farmers including:\n\
         1. Impact on current crops\n\
         2. Farming activities recommended for today\n\
         3. Irrigation needs\n\
         4. Pest and disease risks\n\
         5. Harvesting considerations\n\
         6. Short-term weather preparation advice\n\n\
         Format the response in clear sections with actionable advice.",
        current.temperature_celsius.round_dp(2),
        current.weather_description,
        current.humidity_percent,
        current.wind_speed_mps.round_dp(2),
    )
}

/// Calendar for the whole year plus the requested (or current) month
pub fn calendar_for(month: Option<u32>, now: DateTime<Utc>) -> AppResult<CropCalendar> {
    let month = month.unwrap_or_else(|| ist_month(now));
    if !(1..=12).contains(&month) {
        return Err(AppError::invalid(
            "month",
            "Month must be between 1 and 12",
            "മാസം 1 മുതൽ 12 വരെ ആയിരിക്കണം",
        ));
    }

    let calendar = crop_calendar();
    let current = calendar[(month - 1) as usize].clone();
    Ok(CropCalendar { calendar, current })
}

impl KnowledgeService {
    pub fn new(ai: Arc<dyn LanguageModel>, weather: WeatherClient, weather_location: impl Into<String>) -> Self {
        Self {
            ai,
            weather,
            weather_location: weather_location.into(),
        }
    }

    /// Free-form knowledge article. Provider errors surface as 500.
    pub async fn content(&self, request: ContentRequest) -> AppResult<KnowledgeContent> {
        let prompt = request
            .prompt
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| AppError::invalid("prompt", "Prompt is required", "പ്രോംപ്റ്റ് ആവശ്യമാണ്"))?;

        let mut enhanced = prompt;
        if WEATHER_CATEGORIES.contains(&request.category_id) {
            match self.weather.get_current_weather(&self.weather_location).await {
                Ok(current) => enhanced.push_str(&content_weather_context(&current)),
                Err(e) => tracing::debug!("Knowledge content without weather context: {}", e),
            }
        }

        let options = GenerationOptions::new(ModelRole::LightUtility);
        let reply = self
            .ai
            .generate(&format!("{}\n\n{}", CONTENT_CONTEXT, enhanced), &options)
            .await?;
        let content = if reply.trim().is_empty() {
            CONTENT_UNAVAILABLE.to_string()
        } else {
            reply.trim().to_string()
        };

        Ok(KnowledgeContent {
            content,
            category_id: request.category_id,
            timestamp: Utc::now(),
        })
    }

    /// Market prices; the live mode fails loudly rather than substituting
    pub async fn market_prices(&self, mode: MarketMode) -> AppResult<MarketReport> {
        let (prices, insights) = match mode {
            MarketMode::Static => (static_market_prices(), None),
            MarketMode::Live => {
                let market = live_market(self.ai.as_ref()).await.map_err(|reason| {
                    tracing::warn!("Live market prices unavailable: {}", reason);
                    AppError::AiUnavailable {
                        message: "Market price data unavailable".to_string(),
                        fallback: Some("Use mode=static for reference prices".to_string()),
                    }
                })?;
                let insights = Some(market.insights).filter(|i| !i.is_empty());
                (market.prices, insights)
            }
        };

        Ok(MarketReport {
            mode,
            prices,
            insights,
            timestamp: Utc::now(),
        })
    }

    /// Seasonal tips from the model, or the static list
    pub async fn farming_tips(&self, season: Option<Season>) -> FarmingTips {
        let season = season.unwrap_or_else(|| Season::from_month(ist_month(Utc::now())));
        let fallback = || static_farming_tips(season).into_iter().map(String::from).collect();
        let options = GenerationOptions::new(ModelRole::LightUtility)
            .with_temperature(0.7)
            .with_max_tokens(500);

        let tips = match self.ai.generate(&tips_prompt(season), &options).await {
            Ok(reply) => {
                let tips = parse_tips(&reply);
                if tips.is_empty() {
                    Sourced::fallback("empty tips reply", fallback())
                } else {
                    Sourced::Live(tips)
                }
            }
            Err(e) => {
                tracing::warn!("Farming tips unavailable: {}", e);
                Sourced::fallback(e.to_string(), fallback())
            }
        };

        FarmingTips {
            season,
            tips: tips.into(),
        }
    }

    /// Farming reading of current conditions; requires live weather
    pub async fn weather_analysis(&self) -> AppResult<WeatherAnalysis> {
        let current = self
            .weather
            .get_current_weather(&self.weather_location)
            .await
            .map_err(|e| {
                tracing::warn!("Weather analysis without weather: {}", e);
                AppError::WeatherServiceUnavailable
            })?;

        let options = GenerationOptions::new(ModelRole::LightUtility);
        let analysis = match self.ai.generate(&analysis_prompt(&current), &options).await {
            Ok(text) if !text.trim().is_empty() => Sourced::Live(text.trim().to_string()),
            Ok(_) => Sourced::fallback("empty analysis", ANALYSIS_UNAVAILABLE.to_string()),
            Err(e) => {
                tracing::warn!("Weather analysis generation failed: {}", e);
                Sourced::fallback(e.to_string(), ANALYSIS_UNAVAILABLE.to_string())
            }
        };

        Ok(WeatherAnalysis {
            weather_data: summarize(&current),
            analysis: analysis.into(),
            timestamp: Utc::now(),
        })
    }
}
