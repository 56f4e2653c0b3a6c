//! HTTP API tests
//!
//! Drives the router in-process with stub language models and an
//! unreachable database, covering the paths that answer without storage:
//! - Request validation (400 with bilingual messages)
//! - Fallback replies when the model provider fails
//! - Static reference data (market prices, crop calendar, schemes)

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tower::ServiceExt;

use krishi_sakhi_backend::{
    create_app,
    external::{ai::AiError, GenerationOptions, ImageInput, LanguageModel},
    services::clock::SystemClock,
    AppState, Config,
};

/// Provider that is always down
struct FailingModel;

#[async_trait]
impl LanguageModel for FailingModel {
    async fn generate(&self, _prompt: &str, _options: &GenerationOptions) -> Result<String, AiError> {
        Err(AiError::EmptyResponse)
    }

    async fn generate_from_image(
        &self,
        _prompt: &str,
        _image: &ImageInput,
        _options: &GenerationOptions,
    ) -> Result<String, AiError> {
        Err(AiError::EmptyResponse)
    }
}

/// Provider that answers every prompt with the same text
struct CannedModel(&'static str);

#[async_trait]
impl LanguageModel for CannedModel {
    async fn generate(&self, _prompt: &str, _options: &GenerationOptions) -> Result<String, AiError> {
        Ok(self.0.to_string())
    }

    async fn generate_from_image(
        &self,
        _prompt: &str,
        _image: &ImageInput,
        _options: &GenerationOptions,
    ) -> Result<String, AiError> {
        Ok(self.0.to_string())
    }
}

fn test_config() -> Config {
    let mut config = Config::load().expect("default configuration");
    // Nothing listens on these ports; every call fails fast
    config.weather.api_endpoint = "http://127.0.0.1:9".to_string();
    config.weather.timeout_secs = 1;
    config
}

fn test_app(ai: Arc<dyn LanguageModel>) -> Router {
    app_with_config(test_config(), ai)
}

fn app_with_config(config: Config, ai: Arc<dyn LanguageModel>) -> Router {
    let db = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(200))
        .connect_lazy("postgresql://postgres@127.0.0.1:9/krishi_sakhi_test")
        .expect("lazy pool");

    create_app(AppState::new(db, config, ai, Arc::new(SystemClock)))
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

const BOUNDARY: &str = "krishi-upload-boundary";

fn image_upload(image: &[u8], message: &str) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"message\"\r\n\r\n{m}\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"leaf.jpg\"\r\n\
             Content-Type: image/jpeg\r\n\r\n",
            b = BOUNDARY,
            m = message
        )
        .as_bytes(),
    );
    body.extend_from_slice(image);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/chat/image")
        .header("content-type", format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap()
}

async fn read_json(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

// ============================================================================
// Health
// ============================================================================

#[cfg(test)]
mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_disconnected_database() {
        let app = test_app(Arc::new(FailingModel));
        let (status, body) = send(app, "GET", "/api/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["message"], "Krishi Sakhi API is running");
        assert_eq!(body["database"], "disconnected");
    }
}

// ============================================================================
// Chat and Translation
// ============================================================================

#[cfg(test)]
mod chat_tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_message_is_rejected() {
        let app = test_app(Arc::new(FailingModel));
        let (status, body) = send(app, "POST", "/api/chat", Some(json!({ "message": "   " }))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["error_ml"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_chat_falls_back_when_provider_fails() {
        let app = test_app(Arc::new(FailingModel));
        let (status, body) = send(
            app,
            "POST",
            "/api/chat",
            Some(json!({ "message": "How do I grow paddy?" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let reply = body["response"].as_str().unwrap();
        assert!(!reply.is_empty());
    }

    #[tokio::test]
    async fn test_malayalam_chat_falls_back_in_malayalam() {
        let app = test_app(Arc::new(FailingModel));
        let (status, body) = send(
            app,
            "POST",
            "/api/chat",
            Some(json!({ "message": "നെല്ല് എങ്ങനെ കൃഷി ചെയ്യാം?" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let reply = body["response"].as_str().unwrap();
        assert!(reply.chars().any(shared::is_malayalam_char));
    }

    #[tokio::test]
    async fn test_translation_fallback_names_the_failure() {
        let app = test_app(Arc::new(FailingModel));
        let (status, body) = send(
            app,
            "POST",
            "/api/translate",
            Some(json!({ "text": "Water the coconut palms", "to": "ml" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["translatedText"]
            .as_str()
            .unwrap()
            .starts_with("Sorry, translation service is currently unavailable"));
    }

    #[tokio::test]
    async fn test_translation_requires_text() {
        let app = test_app(Arc::new(FailingModel));
        let (status, _) = send(app, "POST", "/api/chat/translate", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_translation_returns_model_text() {
        let app = test_app(Arc::new(CannedModel("  തെങ്ങിന് വെള്ളം ഒഴിക്കുക  ")));
        let (status, body) = send(
            app,
            "POST",
            "/api/translate",
            Some(json!({ "text": "Water the coconut palms" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["translatedText"], "തെങ്ങിന് വെള്ളം ഒഴിക്കുക");
    }

    #[tokio::test]
    async fn test_quick_query_failure_carries_fallback_hint() {
        let app = test_app(Arc::new(FailingModel));
        let (status, body) = send(
            app,
            "POST",
            "/api/quick-query",
            Some(json!({ "query": "When to sow paddy?" })),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Unable to process quick query at this time");
        assert_eq!(body["fallback"], "Please try the main chat for detailed assistance");
    }

    #[tokio::test]
    async fn test_chat_reply_is_polished() {
        let app = test_app(Arc::new(CannedModel("Hello! Plant rice now.\n\n\n\nWater well.")));
        let (status, body) = send(
            app,
            "POST",
            "/api/chat",
            Some(json!({ "message": "When should I plant rice?" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let reply = body["response"].as_str().unwrap();
        assert!(reply.starts_with("🙏 Hello!"));
        assert!(reply.contains("🌾 rice"));
        assert!(reply.contains("💧 Water"));
        assert!(!reply.contains("\n\n\n"));
    }

    #[tokio::test]
    async fn test_chat_reply_survives_failed_activity_logging() {
        // Irrigation is logged as an activity; storage is down here
        let app = test_app(Arc::new(CannedModel("Irrigate the coconut basins twice a week.")));
        let (status, body) = send(
            app,
            "POST",
            "/api/chat",
            Some(json!({ "message": "I finished irrigation of the coconut grove" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["response"].as_str().unwrap().contains("🥥 coconut"));
    }

    #[tokio::test]
    async fn test_image_within_limit_is_analyzed() {
        let app = test_app(Arc::new(CannedModel("The leaf shows early blight.")));
        let (status, body) = read_json(app, image_upload(&[0xFF; 4096], "What is wrong?")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["response"].as_str().unwrap().contains("blight"));
    }

    #[tokio::test]
    async fn test_image_over_limit_is_rejected_with_413() {
        let mut config = test_config();
        config.server.max_upload_bytes = 1024;
        let app = app_with_config(config, Arc::new(CannedModel("unused")));
        let (status, body) = read_json(app, image_upload(&[0xFF; 8192], "What is wrong?")).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
        assert!(body["error_ml"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_quick_query_classifies_into_given_categories() {
        let app = test_app(Arc::new(CannedModel("weather")));
        let (status, body) = send(
            app,
            "POST",
            "/api/quick-query",
            Some(json!({
                "query": "Leaves have holes and small insects",
                "type": "classify",
                "categories": ["pest", "weather"]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["classification"], "weather");
    }
}

// ============================================================================
// Farms
// ============================================================================

#[cfg(test)]
mod farm_tests {
    use super::*;

    #[tokio::test]
    async fn test_farm_with_foreign_crop_is_rejected_before_storage() {
        let app = test_app(Arc::new(FailingModel));
        let (status, body) = send(
            app,
            "POST",
            "/api/farm",
            Some(json!({
                "farmer_id": 1,
                "size": "2.5",
                "location": "Thrissur",
                "crops": ["Rice", "Kiwi"],
                "livestock": ["Cow"]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["validation_errors"]["crops"], json!(["Kiwi"]));
        assert!(body["validation_errors"].get("livestock").is_none());
    }
}

// ============================================================================
// Knowledge Hub and Schemes
// ============================================================================

#[cfg(test)]
mod reference_data_tests {
    use super::*;

    #[tokio::test]
    async fn test_dashboard_tags_reference_data_as_fallback() {
        let app = test_app(Arc::new(CannedModel("Mulch the banana beds.")));
        let (status, body) = send(app, "GET", "/api/home/dashboard?location=Thrissur", None).await;

        assert_eq!(status, StatusCode::OK);
        let data = &body["data"];
        assert_eq!(data["market_prices"]["source"], "fallback");
        assert!(!data["market_prices"]["data"].as_array().unwrap().is_empty());
        assert_eq!(data["stats"]["source"], "fallback");
        assert!(data["weather"].is_null());
        assert!(data["advisory"].is_null());
    }

    #[tokio::test]
    async fn test_static_market_prices() {
        let app = test_app(Arc::new(FailingModel));
        let (status, body) = send(app, "GET", "/api/knowledge/market-prices", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["mode"], "static");
        assert!(!body["data"]["prices"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_live_market_prices_fail_loudly() {
        let app = test_app(Arc::new(FailingModel));
        let (status, body) =
            send(app, "GET", "/api/knowledge/market-prices?mode=live", None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Market price data unavailable");
    }

    #[tokio::test]
    async fn test_crop_calendar_for_month() {
        let app = test_app(Arc::new(FailingModel));
        let (status, body) = send(app, "GET", "/api/knowledge/crop-calendar?month=7", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["calendar"].as_array().unwrap().len(), 12);
        assert_eq!(body["data"]["current"]["month"], 7);
    }

    #[tokio::test]
    async fn test_farming_tips_fall_back_to_static_list() {
        let app = test_app(Arc::new(FailingModel));
        let (status, body) =
            send(app, "GET", "/api/knowledge/farming-tips?season=Monsoon", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["tips"]["source"], "fallback");
        assert!(!body["data"]["tips"]["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_scheme_is_not_found() {
        let app = test_app(Arc::new(FailingModel));
        let (status, body) = send(app, "GET", "/api/schemes/9999", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_quick_match_falls_back_to_first_schemes() {
        let app = test_app(Arc::new(FailingModel));
        let (status, body) = send(
            app,
            "POST",
            "/api/schemes/quick-match",
            Some(json!({ "query": "loan for buying a pump set" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["powered_by"], "FALLBACK");
        assert_eq!(body["data"]["matched_schemes"].as_array().unwrap().len(), 2);
    }
}
