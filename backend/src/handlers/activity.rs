//! Activity log HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::services::activity::{ActivityService, CreateActivityInput, UpdateActivityInput};
use crate::AppState;

/// All activities, newest first, with bilingual labels
pub async fn list_activities(State(state): State<AppState>) -> impl IntoResponse {
    let service = ActivityService::new(state.db.clone());

    match service.list_activities().await {
        Ok(activities) => {
            (StatusCode::OK, Json(json!({ "success": true, "data": activities }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Record an activity
pub async fn create_activity(
    State(state): State<AppState>,
    Json(input): Json<CreateActivityInput>,
) -> impl IntoResponse {
    let service = ActivityService::new(state.db.clone());

    match service.create_activity(input).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "message": "Activity created successfully",
                "id": id,
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Partial update of an activity
pub async fn update_activity(
    State(state): State<AppState>,
    Path(activity_id): Path<i64>,
    Json(input): Json<UpdateActivityInput>,
) -> impl IntoResponse {
    let service = ActivityService::new(state.db.clone());

    match service.update_activity(activity_id, input).await {
        Ok(activity) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Activity updated successfully",
                "data": activity,
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete an activity
pub async fn delete_activity(
    State(state): State<AppState>,
    Path(activity_id): Path<i64>,
) -> impl IntoResponse {
    let service = ActivityService::new(state.db.clone());

    match service.delete_activity(activity_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "success": true, "message": "Activity deleted successfully" })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Raw activity records for one farm
pub async fn farm_activities(
    State(state): State<AppState>,
    Path(farm_id): Path<i64>,
) -> impl IntoResponse {
    let service = ActivityService::new(state.db.clone());

    match service.activities_for_farm(farm_id).await {
        Ok(activities) => {
            (StatusCode::OK, Json(json!({ "success": true, "data": activities }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}
