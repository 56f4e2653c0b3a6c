//! Error handling for Krishi Sakhi
//!
//! Provides consistent error responses in English and Malayalam

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::external::ai::AiError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_ml: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Names outside the Kerala allow-list: crops {crops:?}, livestock {livestock:?}")]
    DisallowedFarmEntries {
        crops: Vec<String>,
        livestock: Vec<String>,
    },

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    // External service errors
    #[error("Weather service unavailable")]
    WeatherServiceUnavailable,

    #[error("AI service error: {message}")]
    AiUnavailable {
        message: String,
        fallback: Option<String>,
    },

    #[error("AI provider error: {0}")]
    Ai(#[from] AiError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for a single-field validation failure
    pub fn invalid(field: &str, message: &str, message_ml: &str) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.to_string(),
            message_ml: message_ml.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<&str> = errors.field_errors().keys().copied().collect();
        fields.sort_unstable();
        let field = fields.first().copied().unwrap_or("input");

        AppError::Validation {
            field: field.to_string(),
            message: format!("Invalid value for {}", field),
            message_ml: format!("{} എന്നതിന് അസാധുവായ മൂല്യം", field),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_ml: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<FarmValidationErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

/// Offending crop and livestock names
#[derive(Serialize)]
pub struct FarmValidationErrors {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub crops: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub livestock: Vec<String>,
}

struct ErrorDetail {
    code: &'static str,
    message_en: String,
    message_ml: String,
    field: Option<String>,
}

impl ErrorDetail {
    fn new(code: &'static str, message_en: impl Into<String>, message_ml: impl Into<String>) -> Self {
        Self {
            code,
            message_en: message_en.into(),
            message_ml: message_ml.into(),
            field: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut validation_errors = None;
        let mut fallback = None;

        let (status, detail) = match &self {
            AppError::Validation { field, message, message_ml } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    field: Some(field.clone()),
                    ..ErrorDetail::new("VALIDATION_ERROR", message.clone(), message_ml.clone())
                },
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new(
                    "VALIDATION_ERROR",
                    msg.clone(),
                    format!("അസാധുവായ വിവരങ്ങൾ: {}", msg),
                ),
            ),
            AppError::DisallowedFarmEntries { crops, livestock } => {
                validation_errors = Some(FarmValidationErrors {
                    crops: crops.clone(),
                    livestock: livestock.clone(),
                });
                (
                    StatusCode::BAD_REQUEST,
                    ErrorDetail::new(
                        "VALIDATION_ERROR",
                        "Some crops or livestock are not grown in Kerala",
                        "ചില വിളകളോ കന്നുകാലികളോ കേരളത്തിൽ അനുവദനീയമല്ല",
                    ),
                )
            }
            AppError::DuplicateEntry(field) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    field: Some(field.clone()),
                    ..ErrorDetail::new(
                        "DUPLICATE_ENTRY",
                        format!("A record with this {} already exists", field),
                        format!("ഈ {} ഉള്ള ഒരു രേഖ നിലവിലുണ്ട്", field),
                    )
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new(
                    "NOT_FOUND",
                    format!("{} not found", resource),
                    format!("{} കണ്ടെത്തിയില്ല", resource),
                ),
            ),
            AppError::PayloadTooLarge(detail) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorDetail::new(
                    "PAYLOAD_TOO_LARGE",
                    format!("Upload is too large: {}", detail),
                    "അപ്‌ലോഡ് ചെയ്ത ഫയൽ വളരെ വലുതാണ്",
                ),
            ),
            AppError::WeatherServiceUnavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "WEATHER_SERVICE_UNAVAILABLE",
                    "Weather data unavailable",
                    "കാലാവസ്ഥാ വിവരങ്ങൾ ലഭ്യമല്ല",
                ),
            ),
            AppError::AiUnavailable { message, fallback: hint } => {
                fallback = hint.clone();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorDetail::new(
                        "AI_SERVICE_ERROR",
                        message.clone(),
                        "AI സേവനം ഇപ്പോൾ ലഭ്യമല്ല",
                    ),
                )
            }
            AppError::Ai(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "AI_SERVICE_ERROR",
                    "The AI service is unavailable right now",
                    "AI സേവനം ഇപ്പോൾ ലഭ്യമല്ല",
                ),
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "CONFIGURATION_ERROR",
                    format!("Configuration error: {}", msg),
                    "ക്രമീകരണ പിശക്",
                ),
            ),
            AppError::DatabaseError(sqlx::Error::Database(db)) if db.is_unique_violation() => (
                StatusCode::CONFLICT,
                ErrorDetail::new(
                    "DUPLICATE_ENTRY",
                    "A record with these details already exists",
                    "ഈ വിവരങ്ങളുള്ള ഒരു രേഖ നിലവിലുണ്ട്",
                ),
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "DATABASE_ERROR",
                    "A database error occurred",
                    "ഡാറ്റാബേസ് പിശക് സംഭവിച്ചു",
                ),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", msg.clone(), "സെർവറിൽ ആന്തരിക പിശക്"),
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        let body = ErrorResponse {
            success: false,
            error: detail.message_en,
            error_ml: detail.message_ml,
            code: detail.code.to_string(),
            field: detail.field,
            validation_errors,
            fallback,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_upload_is_413() {
        let response = AppError::PayloadTooLarge("image exceeds 10485760 bytes".into()).into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn internal_error_is_500_with_message() {
        let error = AppError::Internal("AI router not configured".into());
        assert_eq!(error.to_string(), "Internal server error: AI router not configured");
        assert_eq!(error.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
