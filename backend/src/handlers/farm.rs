//! Farm, crop and livestock HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::services::farm::{
    CreateCropInput, CreateFarmInput, CreateLivestockInput, FarmService, UpdateCropInput,
    UpdateFarmInput, UpdateLivestockInput,
};
use crate::AppState;

/// List all farms with crop and livestock names
pub async fn list_farms(State(state): State<AppState>) -> impl IntoResponse {
    let service = FarmService::new(state.db.clone());

    match service.list_farms().await {
        Ok(farms) => (StatusCode::OK, Json(farms)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a single farm
pub async fn get_farm(State(state): State<AppState>, Path(farm_id): Path<i64>) -> impl IntoResponse {
    let service = FarmService::new(state.db.clone());

    match service.get_farm(farm_id).await {
        Ok(farm) => (StatusCode::OK, Json(farm)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a farm; crop and livestock names are checked first
pub async fn create_farm(
    State(state): State<AppState>,
    Json(input): Json<CreateFarmInput>,
) -> impl IntoResponse {
    let service = FarmService::new(state.db.clone());

    match service.create_farm(input).await {
        Ok(farm) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "message": "Farm created successfully",
                "farm": farm,
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a farm
pub async fn update_farm(
    State(state): State<AppState>,
    Path(farm_id): Path<i64>,
    Json(input): Json<UpdateFarmInput>,
) -> impl IntoResponse {
    let service = FarmService::new(state.db.clone());

    match service.update_farm(farm_id, input).await {
        Ok(farm) => (StatusCode::OK, Json(farm)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a farm
pub async fn delete_farm(
    State(state): State<AppState>,
    Path(farm_id): Path<i64>,
) -> impl IntoResponse {
    let service = FarmService::new(state.db.clone());

    match service.delete_farm(farm_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Add a crop to a farm
pub async fn add_crop(
    State(state): State<AppState>,
    Path(farm_id): Path<i64>,
    Json(input): Json<CreateCropInput>,
) -> impl IntoResponse {
    let service = FarmService::new(state.db.clone());

    match service.add_crop(farm_id, input).await {
        Ok(crop) => (StatusCode::CREATED, Json(crop)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a crop
pub async fn update_crop(
    State(state): State<AppState>,
    Path(crop_id): Path<i64>,
    Json(input): Json<UpdateCropInput>,
) -> impl IntoResponse {
    let service = FarmService::new(state.db.clone());

    match service.update_crop(crop_id, input).await {
        Ok(crop) => (StatusCode::OK, Json(crop)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a crop
pub async fn delete_crop(
    State(state): State<AppState>,
    Path(crop_id): Path<i64>,
) -> impl IntoResponse {
    let service = FarmService::new(state.db.clone());

    match service.delete_crop(crop_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Add livestock to a farm
pub async fn add_livestock(
    State(state): State<AppState>,
    Path(farm_id): Path<i64>,
    Json(input): Json<CreateLivestockInput>,
) -> impl IntoResponse {
    let service = FarmService::new(state.db.clone());

    match service.add_livestock(farm_id, input).await {
        Ok(livestock) => (StatusCode::CREATED, Json(livestock)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a livestock record
pub async fn update_livestock(
    State(state): State<AppState>,
    Path(livestock_id): Path<i64>,
    Json(input): Json<UpdateLivestockInput>,
) -> impl IntoResponse {
    let service = FarmService::new(state.db.clone());

    match service.update_livestock(livestock_id, input).await {
        Ok(livestock) => (StatusCode::OK, Json(livestock)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a livestock record
pub async fn delete_livestock(
    State(state): State<AppState>,
    Path(livestock_id): Path<i64>,
) -> impl IntoResponse {
    let service = FarmService::new(state.db.clone());

    match service.delete_livestock(livestock_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
