//! Advisory HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use shared::Tagged;

use crate::services::advisory::{AdvisoryFilter, AdvisoryService};
use crate::AppState;

/// Personalized advisory for one farmer
pub async fn farmer_advisory(
    State(state): State<AppState>,
    Path(farmer_id): Path<i64>,
) -> impl IntoResponse {
    let service = AdvisoryService::new(state.db.clone(), state.ai.clone());

    match service.farmer_advisory(farmer_id).await {
        Ok(advisory) => {
            let advisory = Tagged::from(advisory);
            (
                StatusCode::OK,
                Json(json!({
                    "advisory": advisory.data,
                    "source": advisory.source,
                })),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Stored advisories that are active and unexpired
pub async fn list_advisories(
    State(state): State<AppState>,
    Query(filter): Query<AdvisoryFilter>,
) -> impl IntoResponse {
    let service = AdvisoryService::new(state.db.clone(), state.ai.clone());

    match service.list_active(filter).await {
        Ok(advisories) => {
            (StatusCode::OK, Json(json!({ "success": true, "data": advisories }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}
