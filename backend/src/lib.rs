//! Krishi Sakhi backend
//!
//! Farm-management API for smallholder farmers in Kerala: farmer, farm and
//! activity bookkeeping enriched with weather data and model-written
//! advisories, translations, market prices and scheme recommendations.

use axum::{http::HeaderValue, routing::get, Router};
use sqlx::PgPool;
use std::{sync::Arc, time::Duration};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;

pub use config::Config;

use external::{AiGateway, LanguageModel, WeatherClient};
use services::clock::{Clock, SystemClock};
use services::RecommendationCache;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub ai: Arc<dyn LanguageModel>,
    pub weather: WeatherClient,
    pub scheme_cache: Arc<RecommendationCache>,
}

impl AppState {
    /// Wire the state from configuration with an explicit model backend and
    /// clock
    pub fn new(
        db: PgPool,
        config: Config,
        ai: Arc<dyn LanguageModel>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let weather = WeatherClient::new(
            config.weather.api_key.clone(),
            config.weather.api_endpoint.clone(),
            Duration::from_secs(config.weather.timeout_secs),
        );
        let scheme_cache = Arc::new(RecommendationCache::new(
            chrono::Duration::hours(config.schemes.cache_ttl_hours),
            clock,
        ));

        Self {
            db,
            config: Arc::new(config),
            ai,
            weather,
            scheme_cache,
        }
    }

    /// Production wiring: hosted providers and the wall clock
    pub fn from_config(db: PgPool, config: Config) -> Result<Self, error::AppError> {
        let gateway = AiGateway::from_config(&config.ai)?;
        Ok(Self::new(db, config, Arc::new(gateway), Arc::new(SystemClock)))
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origin = match config.server.origins() {
        Some(origins) => AllowOrigin::list(
            origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok())
                .collect::<Vec<_>>(),
        ),
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(root))
        .nest("/api", routes::api_routes(state.config.server.max_upload_bytes))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Krishi Sakhi API"
}
