//! Route definitions for Krishi Sakhi

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes (mounted under `/api`)
pub fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Chat, translation and quick AI utilities
        .route("/chat", post(handlers::send_message))
        .route("/chat/translate", post(handlers::translate))
        .route("/translate", post(handlers::translate))
        .route(
            "/chat/image",
            post(handlers::analyze_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/quick-query", post(handlers::quick_query))
        // Farmer profile
        .nest("/farmer", farmer_routes())
        .route(
            "/profile/:farmer_id",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        // Farms, crops and livestock
        .nest("/farm", farm_routes())
        .route(
            "/crop/:crop_id",
            put(handlers::update_crop).delete(handlers::delete_crop),
        )
        .route(
            "/livestock/:livestock_id",
            put(handlers::update_livestock).delete(handlers::delete_livestock),
        )
        // Activity log
        .nest("/activity", activity_routes())
        // Advisories
        .route("/advisory/farmer/:farmer_id", get(handlers::farmer_advisory))
        .route("/advisories", get(handlers::list_advisories))
        // Government schemes
        .nest("/schemes", scheme_routes())
        // Home page and knowledge hub
        .nest("/home", home_routes())
        .nest("/knowledge", knowledge_routes())
}

fn farmer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_farmers).post(handlers::create_farmer))
        .route(
            "/:farmer_id",
            get(handlers::get_farmer).delete(handlers::delete_farmer),
        )
}

fn farm_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_farms).post(handlers::create_farm))
        .route(
            "/:farm_id",
            get(handlers::get_farm)
                .put(handlers::update_farm)
                .delete(handlers::delete_farm),
        )
        .route("/:farm_id/crops", post(handlers::add_crop))
        .route("/:farm_id/livestock", post(handlers::add_livestock))
}

fn activity_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_activities).post(handlers::create_activity),
        )
        .route(
            "/:activity_id",
            put(handlers::update_activity).delete(handlers::delete_activity),
        )
        .route("/farm/:farm_id", get(handlers::farm_activities))
}

fn scheme_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_schemes))
        .route("/search", get(handlers::search_schemes))
        .route(
            "/default-recommendations",
            get(handlers::default_recommendations),
        )
        .route("/recommend", post(handlers::recommend))
        .route("/eligibility-check", post(handlers::eligibility_check))
        .route("/quick-match", post(handlers::quick_match))
        .route("/:scheme_id", get(handlers::get_scheme))
}

fn home_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::dashboard))
        .route("/weather-forecast/:city", get(handlers::weather_forecast))
        .route("/advisory/regenerate", post(handlers::regenerate_advisory))
        .route("/activities/recent", get(handlers::recent_activities))
}

fn knowledge_routes() -> Router<AppState> {
    Router::new()
        .route("/content", post(handlers::content))
        .route("/market-prices", get(handlers::market_prices))
        .route("/crop-calendar", get(handlers::crop_calendar))
        .route("/farming-tips", get(handlers::farming_tips))
        .route("/weather-analysis", get(handlers::weather_analysis))
}
