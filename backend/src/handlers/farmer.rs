//! Farmer and profile HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::services::farmer::{CreateFarmerInput, FarmerService, UpdateProfileInput};
use crate::AppState;

/// List all farmers
pub async fn list_farmers(State(state): State<AppState>) -> impl IntoResponse {
    let service = FarmerService::new(state.db.clone());

    match service.list_farmers().await {
        Ok(farmers) => (StatusCode::OK, Json(farmers)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a single farmer
pub async fn get_farmer(
    State(state): State<AppState>,
    Path(farmer_id): Path<i64>,
) -> impl IntoResponse {
    let service = FarmerService::new(state.db.clone());

    match service.get_farmer(farmer_id).await {
        Ok(farmer) => (StatusCode::OK, Json(farmer)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Register a farmer
pub async fn create_farmer(
    State(state): State<AppState>,
    Json(input): Json<CreateFarmerInput>,
) -> impl IntoResponse {
    let service = FarmerService::new(state.db.clone());

    match service.create_farmer(input).await {
        Ok(farmer) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "message": "Farmer created successfully",
                "farmer": farmer,
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a farmer with all farms and their records
pub async fn delete_farmer(
    State(state): State<AppState>,
    Path(farmer_id): Path<i64>,
) -> impl IntoResponse {
    let service = FarmerService::new(state.db.clone());

    match service.delete_farmer(farmer_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Farmer with farms, crop names and livestock species
pub async fn get_profile(
    State(state): State<AppState>,
    Path(farmer_id): Path<i64>,
) -> impl IntoResponse {
    let service = FarmerService::new(state.db.clone());

    match service.get_profile(farmer_id).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Partial update of the farmer record
pub async fn update_profile(
    State(state): State<AppState>,
    Path(farmer_id): Path<i64>,
    Json(input): Json<UpdateProfileInput>,
) -> impl IntoResponse {
    let service = FarmerService::new(state.db.clone());

    match service.update_profile(farmer_id, input).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => e.into_response(),
    }
}
