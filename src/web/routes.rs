//! Route definitions

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

/// Create the router with all API routes, request tracing and optional CORS.
pub fn create_router(state: AppState) -> Router {
    let enable_cors = state.config.web_server.enable_cors;

    let router = Router::new()
        .route("/", get(handlers::index))
        .route("/api/health", get(handlers::health_check))
        .route("/api/regions", get(handlers::regions))
        .route("/api/weather-data", get(handlers::weather_data))
        .route("/api/stats", get(handlers::stats))
        // Attachments
        .route("/api/export/data", get(handlers::export_data))
        .route("/api/export/chart", get(handlers::export_chart))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}
