/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Route Order
 *
 * 1. Service routes (`/health`, `/ws`)
 * 2. API routes (`/api/...`)
 * 3. Static files under `/static`
 * 4. Fallback handler (404 JSON)
 *
 * # Layers
 *
 * Request bodies are capped a little above the image limit. CORS allows the
 * configured frontend origin with credentials. Every request is traced. In
 * development mode 5xx bodies also carry the internal error detail.
 */
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware::map_response,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::backend::error::{expose_error_detail, BackendError};
use crate::backend::listings::images::MAX_IMAGE_BYTES;
use crate::backend::realtime::ws_handler;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;
use crate::shared::AppConfig;

/// Largest accepted request body, leaves room for the form fields around an image
pub const MAX_BODY_BYTES: usize = MAX_IMAGE_BYTES + 1024 * 1024;

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Application state with the store and real-time services
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new()
        .route("/health", get(health))
        .route("/ws", get(ws_handler));

    // Add API routes
    let router = configure_api_routes(router, &app_state);

    // Add static file serving
    let router = router.nest_service("/static", ServeDir::new(&app_state.config.static_dir));

    // Fallback handler for 404
    let router = router.fallback(not_found);

    let mut router = router
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_layer(&app_state.config))
        .layer(TraceLayer::new_for_http());

    if app_state.config.development {
        tracing::info!("Development mode: server error details are exposed");
        router = router.layer(map_response(expose_error_detail));
    }

    // Use AppState as router state
    router.with_state(app_state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true);

    match HeaderValue::from_str(&config.frontend_url) {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            tracing::warn!("Invalid FRONTEND_URL {:?}, CORS disabled: {}", config.frontend_url, e);
            layer
        }
    }
}

/// GET /health
async fn health(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "status": "ok",
        "store": app_state.store.backend_name(),
        "online": app_state.presence.online_count(),
    }))
}

async fn not_found() -> Response {
    BackendError::not_found("Route not found").into_response()
}
