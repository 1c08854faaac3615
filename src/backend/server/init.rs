/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server,
 * including state creation, store loading, and route configuration.
 *
 * # Initialization Process
 *
 * The server initialization follows these steps:
 * 1. Open the configured store (PostgreSQL or in-memory)
 * 2. Create the token service, real-time hub and presence registry
 * 3. Create and configure the router
 * 4. Start the periodic room cleanup task
 */
use std::time::Duration;

use axum::Router;

use crate::backend::routes::router::create_router;
use crate::backend::server::config::load_store;
use crate::backend::server::state::AppState;
use crate::backend::store::StoreError;
use crate::shared::AppConfig;

/// How often room channels without subscribers are dropped
pub const ROOM_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Create and configure the Axum application
///
/// # Errors
///
/// Fails only when a database was configured and could not be opened.
pub async fn create_app(config: AppConfig) -> Result<Router<()>, StoreError> {
    tracing::info!("Initializing EcoFinds backend server");

    let store = load_store(&config).await?;
    tracing::info!("[Store] Using the {} store", store.backend_name());

    let app_state = AppState::new(config, store);
    spawn_room_cleanup(&app_state);

    Ok(create_app_with(app_state))
}

/// Build the router around an existing state
///
/// Tests use this with a `MemoryStore` so they can reach into the state.
pub fn create_app_with(app_state: AppState) -> Router<()> {
    let app = create_router(app_state);
    tracing::info!("Router configured");
    app
}

fn spawn_room_cleanup(app_state: &AppState) {
    let hub = app_state.hub.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(ROOM_CLEANUP_INTERVAL);
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = hub.cleanup_inactive_rooms();
            tracing::debug!("[Realtime] Cleaned up {} inactive rooms", removed);
        }
    });
}
