//! Government scheme advisor
//!
//! Serves the static catalog and uses the language models to rank schemes
//! for a season or a farmer profile, judge eligibility and match free-text
//! needs. Default seasonal recommendations are cached process-wide.

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shared::{find_scheme, search_schemes, Language, ModelRole, Scheme, Season, SCHEMES};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{AppError, AppResult};
use crate::external::{GenerationOptions, LanguageModel};
use crate::services::clock::{ist, Clock};
use crate::services::formatting::extract_json_block;

/// Schemes returned by quick match
const QUICK_MATCH_LIMIT: usize = 2;

pub const POWERED_BY_FALLBACK: &str = "FALLBACK";

/// A model's case for one scheme
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub scheme_id: i64,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasonal_benefit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potential_benefit: Option<String>,
}

/// Catalog entry joined with the reason it was recommended
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecommendedScheme {
    #[serde(flatten)]
    pub scheme: Scheme,
    pub recommendation: Recommendation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Catalog entry stamped with the time it was served
#[derive(Debug, Clone, Serialize)]
pub struct TimestampedScheme {
    #[serde(flatten)]
    pub scheme: Scheme,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SchemeListing {
    pub data: Vec<TimestampedScheme>,
    pub total: usize,
    pub last_fetched: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SchemeSearchQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Seasonal recommendations shared by every caller until they expire
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DefaultRecommendations {
    pub recommended_schemes: Vec<RecommendedScheme>,
    pub season: String,
    pub general_advice: String,
    pub last_updated: DateTime<Utc>,
    pub total_recommendations: usize,
}

#[derive(Debug, Deserialize)]
struct SeasonalReply {
    #[serde(default)]
    season: Option<String>,
    #[serde(default)]
    recommendations: Vec<Recommendation>,
    #[serde(default)]
    general_advice: String,
}

#[derive(Debug, Deserialize)]
struct ProfileReply {
    #[serde(default)]
    recommendations: Vec<Recommendation>,
    #[serde(default)]
    additional_advice: String,
}

/// Farmer profile for ranked recommendations
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    #[serde(default)]
    pub farm_size: Value,
    #[serde(default)]
    pub crops: Vec<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub farming_type: String,
    #[serde(default)]
    pub annual_income: Value,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileRecommendations {
    pub recommended_schemes: Vec<RecommendedScheme>,
    pub additional_advice: String,
    pub total_recommendations: usize,
}

#[derive(Debug, Deserialize)]
pub struct EligibilityRequest {
    pub scheme_id: i64,
    #[serde(default)]
    pub farmer_details: Map<String, Value>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Eligibility {
    pub eligible: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub missing_requirements: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EligibilityReport {
    pub scheme: Scheme,
    pub eligibility: Eligibility,
}

#[derive(Debug, Deserialize)]
pub struct QuickMatchRequest {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuickMatch {
    pub matched_schemes: Vec<Scheme>,
    pub query: String,
    pub powered_by: String,
}

struct CachedRecommendations {
    computed_at: DateTime<Utc>,
    value: DefaultRecommendations,
}

/// Single-slot TTL cache for the default recommendations.
///
/// The lock is held while a value is recomputed, so concurrent callers wait
/// for the first computation instead of repeating it. Failed computations
/// leave the slot untouched.
pub struct RecommendationCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    slot: Mutex<Option<CachedRecommendations>>,
}

impl RecommendationCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            slot: Mutex::new(None),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Cached value if still fresh, otherwise the result of `compute`.
    /// On error the stale value, if any, is returned instead.
    pub async fn get_or_refresh<F, Fut>(&self, compute: F) -> AppResult<DefaultRecommendations>
    where
        F: FnOnce(DateTime<Utc>) -> Fut,
        Fut: Future<Output = AppResult<DefaultRecommendations>>,
    {
        let mut slot = self.slot.lock().await;
        let now = self.clock.now();

        if let Some(cached) = slot.as_ref() {
            if now - cached.computed_at <= self.ttl {
                return Ok(cached.value.clone());
            }
        }

        match compute(now).await {
            Ok(value) => {
                *slot = Some(CachedRecommendations {
                    computed_at: now,
                    value: value.clone(),
                });
                Ok(value)
            }
            Err(e) => match slot.as_ref() {
                Some(stale) => {
                    tracing::warn!("Serving stale scheme recommendations: {}", e);
                    Ok(stale.value.clone())
                }
                None => Err(e),
            },
        }
    }
}

/// Join recommendations with the catalog, dropping unknown ids
pub fn attach_schemes(
    recommendations: Vec<Recommendation>,
    last_updated: Option<DateTime<Utc>>,
) -> Vec<RecommendedScheme> {
    recommendations
        .into_iter()
        .filter_map(|recommendation| {
            find_scheme(recommendation.scheme_id).map(|scheme| RecommendedScheme {
                scheme: *scheme,
                recommendation,
                last_updated,
            })
        })
        .collect()
}

/// Hardcoded seasonal picks used when the model reply cannot be parsed
pub fn fallback_seasonal_recommendations(season: Season) -> Vec<Recommendation> {
    vec![
        Recommendation {
            scheme_id: 1,
            priority: "High".to_string(),
            reason: "Universal income support helps during any season".to_string(),
            seasonal_benefit: Some(format!("Additional income during {} season", season)),
            urgency: Some("Apply if not already enrolled".to_string()),
            potential_benefit: None,
        },
        Recommendation {
            scheme_id: 2,
            priority: if season == Season::Monsoon { "High" } else { "Medium" }.to_string(),
            reason: "Crop insurance is crucial for weather-dependent farming".to_string(),
            seasonal_benefit: Some("Protection against seasonal crop losses".to_string()),
            urgency: Some("High during monsoon season".to_string()),
            potential_benefit: None,
        },
    ]
}

fn seasonal_prompt(season: Season, year: i32) -> String {
    let catalog = SCHEMES
        .iter()
        .map(|s| format!("{}. {} - {}", s.id, s.name.en, s.tag.en))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are an expert agricultural advisor for Indian farmers. Generate top 3 government \
         scheme recommendations for the current {season} season in {year}.\n\n\
         Available schemes (by ID):\n{catalog}\n\n\
         Consider:\n\
         - Current season: {season}\n\
         - General Indian farming patterns\n\
         - Most beneficial schemes for this time of year\n\
         - Mix of immediate and long-term benefits\n\n\
         Respond in JSON format:\n\
         {{\n  \"season\": \"{season}\",\n  \"recommendations\": [\n    {{\n      \
         \"scheme_id\": 1,\n      \"priority\": \"High/Medium/Low\",\n      \
         \"reason\": \"Why this scheme is recommended for this season\",\n      \
         \"seasonal_benefit\": \"Specific benefit for current season\",\n      \
         \"urgency\": \"How urgent this application is\"\n    }}\n  ],\n  \
         \"general_advice\": \"General farming advice for this season\"\n}}"
    )
}

/// Parse a seasonal reply, or fall back to the hardcoded picks
pub fn seasonal_recommendations(reply: &str, season: Season, now: DateTime<Utc>) -> DefaultRecommendations {
    let (season_name, recommendations, general_advice) =
        match serde_json::from_str::<SeasonalReply>(extract_json_block(reply)) {
            Ok(parsed) => (
                parsed.season.unwrap_or_else(|| season.to_string()),
                parsed.recommendations,
                parsed.general_advice,
            ),
            Err(e) => {
                tracing::debug!("Seasonal recommendation reply not JSON: {}", e);
                (
                    season.to_string(),
                    fallback_seasonal_recommendations(season),
                    format!("Focus on {} appropriate farming practices", season.name().to_lowercase()),
                )
            }
        };

    let recommended_schemes = attach_schemes(recommendations, Some(now));
    DefaultRecommendations {
        total_recommendations: recommended_schemes.len(),
        recommended_schemes,
        season: season_name,
        general_advice,
        last_updated: now,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn profile_prompt(request: &RecommendRequest, language: Language) -> String {
    let catalog = SCHEMES
        .iter()
        .map(|s| {
            format!(
                "Scheme {}: {} - {} (Category: {})",
                s.id,
                s.name.get(language),
                s.description.get(language),
                s.category
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let crops = if request.crops.is_empty() {
        "Not specified".to_string()
    } else {
        request.crops.join(", ")
    };

    format!(
        "You are an expert agricultural advisor. Based on the farmer's profile below, recommend \
         the most suitable government schemes from the available options.\n\n\
         Farmer Profile:\n\
         - Farm Size: {farm_size}\n\
         - Crops: {crops}\n\
         - Location: {location}\n\
         - Farming Type: {farming_type}\n\
         - Annual Income: {income}\n\n\
         Available Schemes:\n{catalog}\n\n\
         Please provide:\n\
         1. Top 3 most suitable schemes (by ID) with reasons\n\
         2. Priority ranking (High/Medium/Low) for each\n\
         3. Brief explanation of why each scheme is suitable\n\
         4. Any additional advice\n\n\
         Respond in {language} language.\n\n\
         Format your response as JSON with this structure:\n\
         {{\n  \"recommendations\": [\n    {{\n      \"scheme_id\": 1,\n      \
         \"priority\": \"High\",\n      \"reason\": \"explanation here\",\n      \
         \"potential_benefit\": \"benefit amount or description\"\n    }}\n  ],\n  \
         \"additional_advice\": \"general advice here\"\n}}",
        farm_size = display_value(&request.farm_size),
        location = request.location,
        farming_type = request.farming_type,
        income = display_value(&request.annual_income),
        language = language.name(),
    )
}

/// Parse a profile reply; unparseable text becomes advice under PM-KISAN
pub fn profile_recommendations(reply: &str) -> ProfileRecommendations {
    let parsed = serde_json::from_str::<ProfileReply>(extract_json_block(reply)).unwrap_or_else(|e| {
        tracing::debug!("Profile recommendation reply not JSON: {}", e);
        ProfileReply {
            recommendations: vec![Recommendation {
                scheme_id: 1,
                priority: "High".to_string(),
                reason: "Universal income support suitable for all farmers".to_string(),
                seasonal_benefit: None,
                urgency: None,
                potential_benefit: Some("₹6,000 per year".to_string()),
            }],
            additional_advice: reply.trim().to_string(),
        }
    });

    let recommended_schemes = attach_schemes(parsed.recommendations, None);
    ProfileRecommendations {
        total_recommendations: recommended_schemes.len(),
        recommended_schemes,
        additional_advice: parsed.additional_advice,
    }
}

fn eligibility_prompt(scheme: &Scheme, details: &Map<String, Value>, language: Language) -> String {
    let details = details
        .iter()
        .map(|(k, v)| format!("{}: {}", k, display_value(v)))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are an expert on Indian government agricultural schemes.\n\n\
         Scheme: {name}\n\
         Eligibility Criteria: {criteria}\n\
         Required Documents: {documents}\n\n\
         Farmer Details:\n{details}\n\n\
         Please analyze if this farmer is eligible for this scheme and provide:\n\
         1. Eligibility status (Eligible/Not Eligible/Partially Eligible)\n\
         2. Reasons for the decision\n\
         3. Missing documents or requirements (if any)\n\
         4. Next steps for application\n\n\
         Respond in {language}.\n\n\
         Format as JSON:\n\
         {{\n  \"eligible\": true/false,\n  \"status\": \"Eligible/Not Eligible/Partially Eligible\",\n  \
         \"reasons\": [\"reason1\", \"reason2\"],\n  \"missing_requirements\": [\"req1\", \"req2\"],\n  \
         \"next_steps\": [\"step1\", \"step2\"]\n}}",
        name = scheme.name.get(language),
        criteria = scheme.eligibility.get(language),
        documents = scheme.documents.get(language).join(", "),
        language = language.name(),
    )
}

/// Parse an eligibility reply, assuming eligibility when it cannot be read
pub fn eligibility_result(reply: &str, scheme: &Scheme, language: Language) -> Eligibility {
    serde_json::from_str(extract_json_block(reply)).unwrap_or_else(|e| {
        tracing::debug!("Eligibility reply not JSON: {}", e);
        Eligibility {
            eligible: true,
            status: "Eligible".to_string(),
            reasons: vec!["Based on provided information".to_string()],
            missing_requirements: Vec::new(),
            next_steps: vec![scheme.application_process.get(language).to_string()],
        }
    })
}

/// Comma-separated ids such as `1,3`; any non-numeric entry fails the parse
pub fn parse_scheme_ids(reply: &str) -> Option<Vec<i64>> {
    let cleaned = reply.trim().trim_matches(|c| c == '\'' || c == '"' || c == '`');
    if cleaned.is_empty() {
        return None;
    }
    cleaned
        .split(',')
        .map(|id| id.trim().parse::<i64>().ok())
        .collect()
}

fn quick_match_system_prompt() -> String {
    let schemes = SCHEMES
        .iter()
        .map(|s| format!("ID:{} - {} ({})", s.id, s.name.en, s.category))
        .collect::<Vec<_>>()
        .join("; ");
    format!(
        "You are a quick scheme matcher. Given farmer needs, return only the top 2 most relevant \
         scheme IDs from this list: {}. Respond with just comma-separated IDs, e.g., '1,3'",
        schemes
    )
}

fn language_of(code: Option<&str>) -> Language {
    code.map(Language::from_code).unwrap_or_default()
}

#[derive(Clone)]
pub struct SchemeService {
    ai: Arc<dyn LanguageModel>,
    cache: Arc<RecommendationCache>,
}

impl SchemeService {
    pub fn new(ai: Arc<dyn LanguageModel>, cache: Arc<RecommendationCache>) -> Self {
        Self { ai, cache }
    }

    /// Whole catalog, stamped with the serving time
    pub fn list(&self) -> SchemeListing {
        let now = self.cache.now();
        let data: Vec<TimestampedScheme> = SCHEMES
            .iter()
            .map(|scheme| TimestampedScheme {
                scheme: *scheme,
                last_updated: now,
            })
            .collect();
        SchemeListing {
            total: data.len(),
            data,
            last_fetched: now,
        }
    }

    pub fn get(&self, scheme_id: i64) -> AppResult<&'static Scheme> {
        find_scheme(scheme_id).ok_or_else(|| AppError::NotFound("Scheme".to_string()))
    }

    pub fn search(&self, query: &SchemeSearchQuery) -> Vec<&'static Scheme> {
        search_schemes(
            query.q.as_deref(),
            query.category.as_deref(),
            language_of(query.language.as_deref()),
        )
    }

    /// Seasonal recommendations, recomputed at most once per cache window
    pub async fn default_recommendations(&self) -> AppResult<DefaultRecommendations> {
        let ai = self.ai.clone();
        self.cache
            .get_or_refresh(|now| async move {
                let local = now.with_timezone(&ist());
                let season = Season::from_month(local.month());
                let prompt = seasonal_prompt(season, local.year());
                let options = GenerationOptions::new(ModelRole::LightUtility);

                let reply = ai.generate(&prompt, &options).await?;
                tracing::info!("Refreshed default scheme recommendations for {}", season);
                Ok(seasonal_recommendations(&reply, season, now))
            })
            .await
    }

    /// Schemes ranked for one farmer. Provider errors surface as 500.
    pub async fn recommend(&self, request: RecommendRequest) -> AppResult<ProfileRecommendations> {
        let language = language_of(request.language.as_deref());
        let prompt = profile_prompt(&request, language);
        let options = GenerationOptions::new(ModelRole::LightUtility);

        let reply = self.ai.generate(&prompt, &options).await?;
        Ok(profile_recommendations(&reply))
    }

    pub async fn check_eligibility(&self, request: EligibilityRequest) -> AppResult<EligibilityReport> {
        let scheme = self.get(request.scheme_id)?;
        let language = language_of(request.language.as_deref());
        let prompt = eligibility_prompt(scheme, &request.farmer_details, language);
        let options = GenerationOptions::new(ModelRole::LightUtility);

        let reply = self.ai.generate(&prompt, &options).await?;
        Ok(EligibilityReport {
            scheme: *scheme,
            eligibility: eligibility_result(&reply, scheme, language),
        })
    }

    /// Up to two schemes for a free-text need; never fails once a query is given
    pub async fn quick_match(&self, request: QuickMatchRequest, powered_by: &str) -> AppResult<QuickMatch> {
        let query = request
            .query
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| AppError::invalid("query", "Query is required", "ചോദ്യം ആവശ്യമാണ്"))?;

        let options = GenerationOptions::new(ModelRole::FastInference)
            .with_system(quick_match_system_prompt())
            .with_max_tokens(20)
            .with_temperature(0.3);

        let ids = match self.ai.generate(&format!("Farmer needs: {}", query), &options).await {
            Ok(reply) => parse_scheme_ids(&reply),
            Err(e) => {
                tracing::warn!("Quick scheme match failed: {}", e);
                None
            }
        };

        let (matched_schemes, powered_by) = match ids {
            Some(ids) => (
                SCHEMES
                    .iter()
                    .filter(|s| ids.contains(&s.id))
                    .take(QUICK_MATCH_LIMIT)
                    .copied()
                    .collect(),
                powered_by.to_uppercase(),
            ),
            None => (
                SCHEMES.iter().take(QUICK_MATCH_LIMIT).copied().collect(),
                POWERED_BY_FALLBACK.to_string(),
            ),
        };

        Ok(QuickMatch {
            matched_schemes,
            query,
            powered_by,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn seasonal_fallback_depends_on_season() {
        let now = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let recs = seasonal_recommendations("not json", Season::Monsoon, now);
        assert_eq!(recs.total_recommendations, 2);
        assert_eq!(recs.recommended_schemes[1].recommendation.priority, "High");
        assert_eq!(recs.general_advice, "Focus on monsoon appropriate farming practices");

        let recs = seasonal_recommendations("", Season::Summer, now);
        assert_eq!(recs.recommended_schemes[1].recommendation.priority, "Medium");
    }

    #[test]
    fn fenced_seasonal_reply_is_parsed() {
        let now = Utc.with_ymd_and_hms(2024, 11, 1, 0, 0, 0).unwrap();
        let reply = "```json\n{\"season\": \"Post-Monsoon\", \"recommendations\": [{\"scheme_id\": 3, \"priority\": \"High\", \"reason\": \"Test soil\"}, {\"scheme_id\": 42, \"priority\": \"Low\", \"reason\": \"?\"}], \"general_advice\": \"Plan rabi\"}\n```";
        let recs = seasonal_recommendations(reply, Season::PostMonsoon, now);
        assert_eq!(recs.total_recommendations, 1);
        assert_eq!(recs.recommended_schemes[0].scheme.id, 3);
        assert_eq!(recs.recommended_schemes[0].last_updated, Some(now));
    }

    #[test]
    fn unparseable_profile_reply_becomes_advice() {
        let recs = profile_recommendations("Apply for PM-KISAN first.");
        assert_eq!(recs.recommended_schemes[0].scheme.id, 1);
        assert_eq!(recs.additional_advice, "Apply for PM-KISAN first.");
    }

    #[test]
    fn eligibility_defaults_to_application_process() {
        let scheme = find_scheme(4).unwrap();
        let result = eligibility_result("maybe", scheme, Language::English);
        assert!(result.eligible);
        assert_eq!(result.next_steps, vec![scheme.application_process.en.to_string()]);
    }

    #[test]
    fn scheme_ids_parse_strictly() {
        assert_eq!(parse_scheme_ids("1,3"), Some(vec![1, 3]));
        assert_eq!(parse_scheme_ids(" '2, 5' "), Some(vec![2, 5]));
        assert_eq!(parse_scheme_ids("1 and 3"), None);
        assert_eq!(parse_scheme_ids(""), None);
    }

    #[test]
    fn recommended_scheme_flattens_catalog_fields() {
        let recs = attach_schemes(fallback_seasonal_recommendations(Season::Summer), None);
        let json = serde_json::to_value(&recs[0]).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["officialLink"], "https://pmkisan.gov.in");
        assert_eq!(json["recommendation"]["scheme_id"], 1);
        assert!(json.get("last_updated").is_none());
    }
}
