//! Knowledge hub HTTP handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::json;

use crate::services::knowledge::{
    calendar_for, CalendarQuery, ContentRequest, KnowledgeService, MarketQuery, TipsQuery,
};
use crate::AppState;

fn knowledge_service(state: &AppState) -> KnowledgeService {
    KnowledgeService::new(
        state.ai.clone(),
        state.weather.clone(),
        state.config.weather.default_location.clone(),
    )
}

/// Free-form knowledge article
pub async fn content(
    State(state): State<AppState>,
    Json(request): Json<ContentRequest>,
) -> impl IntoResponse {
    match knowledge_service(&state).content(request).await {
        Ok(content) => {
            (StatusCode::OK, Json(json!({ "success": true, "data": content }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Market prices (`mode=static|live`)
pub async fn market_prices(
    State(state): State<AppState>,
    Query(query): Query<MarketQuery>,
) -> impl IntoResponse {
    match knowledge_service(&state).market_prices(query.mode).await {
        Ok(report) => (StatusCode::OK, Json(json!({ "success": true, "data": report }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Twelve-month crop calendar
pub async fn crop_calendar(Query(query): Query<CalendarQuery>) -> impl IntoResponse {
    match calendar_for(query.month, Utc::now()) {
        Ok(calendar) => {
            (StatusCode::OK, Json(json!({ "success": true, "data": calendar }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Seasonal farming tips
pub async fn farming_tips(
    State(state): State<AppState>,
    Query(query): Query<TipsQuery>,
) -> impl IntoResponse {
    let tips = knowledge_service(&state).farming_tips(query.season).await;
    (StatusCode::OK, Json(json!({ "success": true, "data": tips }))).into_response()
}

/// Farming reading of current weather
pub async fn weather_analysis(State(state): State<AppState>) -> impl IntoResponse {
    match knowledge_service(&state).weather_analysis().await {
        Ok(analysis) => {
            (StatusCode::OK, Json(json!({ "success": true, "data": analysis }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}
