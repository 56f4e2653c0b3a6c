//! Home page HTTP handlers: dashboard, forecast, advisory regeneration and
//! recent activities

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use shared::{Season, Tagged};

use crate::error::AppError;
use crate::services::activity::ActivityService;
use crate::services::advisory::AdvisoryService;
use crate::services::clock::ist_month;
use crate::services::dashboard::{DashboardQuery, DashboardService};
use crate::services::weather::WeatherService;
use crate::AppState;

/// Composed home dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> impl IntoResponse {
    let service = DashboardService::new(state.db.clone(), state.ai.clone(), state.weather.clone());

    match service.dashboard(&query).await {
        Ok(data) => (StatusCode::OK, Json(json!({ "success": true, "data": data }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Current conditions, next-day forecast and model insights for a city
pub async fn weather_forecast(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> impl IntoResponse {
    let Some(bundle) = state.weather.fetch(&city).await else {
        return AppError::NotFound("Weather data".to_string()).into_response();
    };

    let service = WeatherService::new(state.db.clone(), state.ai.clone());
    let report = service.forecast_report(&bundle, &city).await;
    (StatusCode::OK, Json(json!({ "success": true, "data": report }))).into_response()
}

#[derive(Debug, Deserialize)]
pub struct RegenerateRequest {
    #[serde(default = "default_region")]
    pub location: String,
}

fn default_region() -> String {
    "Kerala".to_string()
}

/// Fresh advisory for a location, stored for a day
pub async fn regenerate_advisory(
    State(state): State<AppState>,
    body: Option<Json<RegenerateRequest>>,
) -> impl IntoResponse {
    let location = body
        .map(|Json(request)| request.location)
        .unwrap_or_else(default_region);

    let current = match state.weather.get_current_weather(&location).await {
        Ok(current) => Some(current),
        Err(e) => {
            tracing::debug!("Regenerating advisory without weather for {}: {}", location, e);
            None
        }
    };
    let season = Season::from_month(ist_month(Utc::now()));

    let service = AdvisoryService::new(state.db.clone(), state.ai.clone());
    let advisory = service.regenerate(current.as_ref(), &location, season).await;

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": {
                "advisory": Tagged::from(advisory),
                "generated_at": Utc::now(),
            },
        })),
    )
        .into_response()
}

/// Ten most recent activities with crop and area
pub async fn recent_activities(State(state): State<AppState>) -> impl IntoResponse {
    let service = ActivityService::new(state.db.clone());

    match service.recent_activities().await {
        Ok(activities) => {
            (StatusCode::OK, Json(json!({ "success": true, "data": activities }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}
