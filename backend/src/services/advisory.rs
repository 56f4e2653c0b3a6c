//! Farming advisories
//!
//! Daily advisories conditioned on current weather (or the season when no
//! weather is available), personalized advisories built from a farmer's
//! farms, crops and activity history, and persisted advisories.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{AdvisoryPriority, AdvisoryType, ModelRole, Season, Sourced};
use sqlx::PgPool;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::external::weather::CurrentWeather;
use crate::external::{GenerationOptions, LanguageModel};
use crate::services::farmer::FarmerService;
use crate::services::formatting::strip_markdown;

pub const ADVISORY_FALLBACK: &str =
    "Unable to generate advisory at this time. Please check back later.";

pub const FARMER_ADVISORY_FALLBACK: &str = "Personalized advice is unavailable right now. \
     Keep recording your farm activities, check your fields for pests after rain and \
     water crops early in the morning. Please check back later.";

/// Activities per farm included in a personalized prompt
const HISTORY_PER_FARM: i64 = 10;

/// Lifetime of a regenerated advisory
const ADVISORY_TTL_HOURS: i64 = 24;

#[derive(Clone)]
pub struct AdvisoryService {
    db: PgPool,
    ai: Arc<dyn LanguageModel>,
}

/// Persisted advisory
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Advisory {
    pub id: i64,
    pub farmer_id: Option<i64>,
    pub title: String,
    pub content: String,
    pub advisory_type: String,
    pub priority: String,
    pub location: Option<String>,
    pub crop_type: Option<String>,
    pub is_active: bool,
    pub expiry_date: Option<DateTime<Utc>>,
    pub created_by: String,
    pub date_created: DateTime<Utc>,
}

/// Filters for the active advisory list
#[derive(Debug, Default, Deserialize)]
pub struct AdvisoryFilter {
    pub location: Option<String>,
    pub crop_type: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct CropLine {
    name: String,
    planting_date: Option<NaiveDate>,
}

#[derive(Debug, sqlx::FromRow)]
struct ActivityLine {
    date: NaiveDateTime,
    activity_type: String,
    details: Option<String>,
}

/// Daily advisory prompt, weather-conditioned when a reading is available
pub fn daily_advisory_prompt(weather: Option<&CurrentWeather>, location: &str, season: Season) -> String {
    match weather {
        Some(current) => format!(
            "As an expert agricultural advisor for farmers in {location}, India, write today's \
             farming advisory for these conditions:\n\
             1. Temperature: {temp}°C\n\
             2. Humidity: {humidity}%\n\
             3. Condition: {condition}\n\
             Wind speed is {wind} m/s and it is the {season} season.\n\n\
             Reply in exactly 3-4 short plain sentences covering the most important task for \
             today, a weather precaution and irrigation advice. Do not use markdown, headings, \
             bullet points or bold text.",
            temp = current.temperature_celsius.round_dp(1),
            humidity = current.humidity_percent,
            condition = current.weather_description,
            wind = current.wind_speed_mps.round_dp(1),
            season = season,
        ),
        None => format!(
            "As an expert agricultural advisor for farmers in {location}, India, write a general \
             farming advisory for today during the {season} season.\n\n\
             Reply in exactly 3-4 short plain sentences covering seasonal tasks, crop care and \
             pest or disease precautions. Do not use markdown, headings, bullet points or bold \
             text.",
            season = season,
        ),
    }
}

impl AdvisoryService {
    pub fn new(db: PgPool, ai: Arc<dyn LanguageModel>) -> Self {
        Self { db, ai }
    }

    /// Plain-text advisory for today, or the canned text if the model fails
    pub async fn daily_advisory(
        &self,
        weather: Option<&CurrentWeather>,
        location: &str,
        season: Season,
    ) -> Sourced<String> {
        let prompt = daily_advisory_prompt(weather, location, season);
        let options = GenerationOptions::new(ModelRole::HeavyChat)
            .with_temperature(0.7)
            .with_max_tokens(400);

        match self.ai.generate(&prompt, &options).await {
            Ok(text) => {
                let cleaned = strip_markdown(&text);
                if cleaned.is_empty() {
                    Sourced::fallback("empty advisory", ADVISORY_FALLBACK.to_string())
                } else {
                    Sourced::Live(cleaned)
                }
            }
            Err(e) => {
                tracing::warn!("Advisory generation failed: {}", e);
                Sourced::fallback(e.to_string(), ADVISORY_FALLBACK.to_string())
            }
        }
    }

    /// Generate a fresh advisory and keep it for a day. Persisting is best-effort.
    pub async fn regenerate(
        &self,
        weather: Option<&CurrentWeather>,
        location: &str,
        season: Season,
    ) -> Sourced<String> {
        let advisory = self.daily_advisory(weather, location, season).await;

        if !advisory.is_fallback() {
            let advisory_type = if weather.is_some() {
                AdvisoryType::Weather
            } else {
                AdvisoryType::General
            };
            if let Err(e) = self
                .persist(location, advisory.data(), advisory_type)
                .await
            {
                tracing::warn!("Could not store regenerated advisory: {}", e);
            }
        }

        advisory
    }

    async fn persist(&self, location: &str, content: &str, advisory_type: AdvisoryType) -> AppResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO advisories (title, content, advisory_type, priority, location,
                                    is_active, expiry_date, created_by)
            VALUES ($1, $2, $3, $4, $5, TRUE, $6, 'ai')
            RETURNING id
            "#,
        )
        .bind(format!("Daily advisory for {}", location))
        .bind(content)
        .bind(advisory_type.as_str())
        .bind(AdvisoryPriority::Medium.as_str())
        .bind(location)
        .bind(Utc::now() + Duration::hours(ADVISORY_TTL_HOURS))
        .fetch_one(&self.db)
        .await?;

        Ok(id)
    }

    /// Active advisories that have not expired, newest first
    pub async fn list_active(&self, filter: AdvisoryFilter) -> AppResult<Vec<Advisory>> {
        let advisories = sqlx::query_as::<_, Advisory>(
            r#"
            SELECT id, farmer_id, title, content, advisory_type, priority, location, crop_type,
                   is_active, expiry_date, created_by, date_created
            FROM advisories
            WHERE is_active
              AND (expiry_date IS NULL OR expiry_date > NOW())
              AND ($1::TEXT IS NULL OR LOWER(location) = LOWER($1))
              AND ($2::TEXT IS NULL OR LOWER(crop_type) = LOWER($2))
            ORDER BY date_created DESC, id DESC
            "#,
        )
        .bind(&filter.location)
        .bind(&filter.crop_type)
        .fetch_all(&self.db)
        .await?;

        Ok(advisories)
    }

    /// Prompt describing the farmer's farms, crops and recent activities
    async fn farmer_prompt(&self, farmer_id: i64) -> AppResult<String> {
        let farmer_service = FarmerService::new(self.db.clone());
        let profile = farmer_service.get_profile(farmer_id).await?;

        if profile.farms.is_empty() {
            return Err(AppError::NotFound("Farms for this farmer".to_string()));
        }

        let farmer = &profile.farmer;
        let mut prompt = format!(
            "Provide personalized farming advice for {}.\nFarmer Information: {}, Phone: {}\n",
            farmer.name, farmer.name, farmer.phone_number
        );

        for entry in &profile.farms {
            let farm = &entry.farm;
            let _ = write!(
                prompt,
                "\nFarm Information: Location - {}, Size - {} acres\n",
                farm.location,
                farm.size.normalize()
            );

            let crops = sqlx::query_as::<_, CropLine>(
                "SELECT name, planting_date FROM crops WHERE farm_id = $1 ORDER BY id ASC",
            )
            .bind(farm.id)
            .fetch_all(&self.db)
            .await?;

            if !crops.is_empty() {
                prompt.push_str("Crops:\n");
                for crop in crops {
                    match crop.planting_date {
                        Some(date) => {
                            let _ = writeln!(prompt, "- {}, Planted on {}", crop.name, date);
                        }
                        None => {
                            let _ = writeln!(prompt, "- {}", crop.name);
                        }
                    }
                }
            }

            let activities = sqlx::query_as::<_, ActivityLine>(
                r#"
                SELECT date, activity_type, details
                FROM activities
                WHERE farm_id = $1
                ORDER BY date DESC, id DESC
                LIMIT $2
                "#,
            )
            .bind(farm.id)
            .bind(HISTORY_PER_FARM)
            .fetch_all(&self.db)
            .await?;

            if !activities.is_empty() {
                prompt.push_str("Recent Activities:\n");
                for activity in activities {
                    let _ = write!(
                        prompt,
                        "- {}: {}",
                        activity.date.format("%Y-%m-%d"),
                        activity.activity_type
                    );
                    if let Some(details) = activity.details.filter(|d| !d.is_empty()) {
                        let _ = write!(prompt, " - {}", details);
                    }
                    prompt.push('\n');
                }
            }
        }

        Ok(prompt)
    }

    /// Advisory for one farmer. Missing farmer or farms are errors; a model
    /// failure degrades to canned advice.
    pub async fn farmer_advisory(&self, farmer_id: i64) -> AppResult<Sourced<String>> {
        let prompt = self.farmer_prompt(farmer_id).await?;
        let options = GenerationOptions::new(ModelRole::HeavyChat).with_temperature(0.7);

        Ok(match self.ai.generate(&prompt, &options).await {
            Ok(text) => Sourced::Live(text.trim().to_string()),
            Err(e) => {
                tracing::warn!("Farmer advisory for {} failed: {}", farmer_id, e);
                Sourced::fallback(e.to_string(), FARMER_ADVISORY_FALLBACK.to_string())
            }
        })
    }
}
