//! Government scheme HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use shared::ModelRole;

use crate::services::scheme::{
    EligibilityRequest, QuickMatchRequest, RecommendRequest, SchemeSearchQuery, SchemeService,
};
use crate::AppState;

fn scheme_service(state: &AppState) -> SchemeService {
    SchemeService::new(state.ai.clone(), state.scheme_cache.clone())
}

/// Whole catalog
pub async fn list_schemes(State(state): State<AppState>) -> impl IntoResponse {
    let listing = scheme_service(&state).list();
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": listing.data,
            "total": listing.total,
            "last_fetched": listing.last_fetched,
        })),
    )
        .into_response()
}

/// One scheme
pub async fn get_scheme(
    State(state): State<AppState>,
    Path(scheme_id): Path<i64>,
) -> impl IntoResponse {
    match scheme_service(&state).get(scheme_id) {
        Ok(scheme) => (StatusCode::OK, Json(json!({ "success": true, "data": scheme }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Catalog search by text or category
pub async fn search_schemes(
    State(state): State<AppState>,
    Query(query): Query<SchemeSearchQuery>,
) -> impl IntoResponse {
    let found = scheme_service(&state).search(&query);
    (
        StatusCode::OK,
        Json(json!({ "success": true, "total": found.len(), "data": found })),
    )
        .into_response()
}

/// Seasonal picks, cached for a day
pub async fn default_recommendations(State(state): State<AppState>) -> impl IntoResponse {
    match scheme_service(&state).default_recommendations().await {
        Ok(recommendations) => (
            StatusCode::OK,
            Json(json!({ "success": true, "data": recommendations })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Schemes ranked for a farmer profile
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> impl IntoResponse {
    match scheme_service(&state).recommend(request).await {
        Ok(recommendations) => (
            StatusCode::OK,
            Json(json!({ "success": true, "data": recommendations })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Eligibility judgement for one scheme
pub async fn eligibility_check(
    State(state): State<AppState>,
    Json(request): Json<EligibilityRequest>,
) -> impl IntoResponse {
    match scheme_service(&state).check_eligibility(request).await {
        Ok(report) => (StatusCode::OK, Json(json!({ "success": true, "data": report }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Two schemes for a free-text need
pub async fn quick_match(
    State(state): State<AppState>,
    Json(request): Json<QuickMatchRequest>,
) -> impl IntoResponse {
    let powered_by = state
        .config
        .ai
        .route(ModelRole::FastInference)
        .provider
        .as_str();

    match scheme_service(&state).quick_match(request, powered_by).await {
        Ok(matched) => (StatusCode::OK, Json(json!({ "success": true, "data": matched }))).into_response(),
        Err(e) => e.into_response(),
    }
}
