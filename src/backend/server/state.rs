/**
 * Application State Management
 *
 * This module defines the application state structure and the `FromRef`
 * implementation that lets store-only handlers extract `State<DynStore>`.
 *
 * # Architecture
 *
 * The `AppState` struct serves as the central state container for the
 * application, holding:
 * - The loaded configuration
 * - The marketplace store (PostgreSQL or in-memory)
 * - The token service used to issue and verify sessions
 * - The real-time hub and presence registry
 * - The optional image service client
 *
 * # Thread Safety
 *
 * Every field is cheap to clone and shares its contents across clones:
 * - `Arc<dyn MarketStore>` for the store
 * - `DashMap`-backed hub and presence registry
 * - `Option<T>` for services that may not be configured
 *
 * # State Extraction
 *
 * Handlers that only touch persistence take `State<DynStore>`. Everything
 * else takes the whole `State<AppState>`.
 */
use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::auth::TokenService;
use crate::backend::listings::ImageUploader;
use crate::backend::realtime::{PresenceRegistry, RealtimeHub};
use crate::backend::store::DynStore;
use crate::shared::AppConfig;

/// Application state shared by every handler and socket session
///
/// # Fields
///
/// * `config` - Loaded configuration
/// * `store` - Marketplace persistence
/// * `tokens` - JWT issue/verify
/// * `hub` - Room broadcast channels
/// * `presence` - Online accounts, one active session each
/// * `images` - Image service client, `None` when not configured
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: DynStore,
    pub tokens: TokenService,
    pub hub: RealtimeHub,
    pub presence: PresenceRegistry,
    pub images: Option<ImageUploader>,
}

impl AppState {
    /// Build the state around an already opened store
    pub fn new(config: AppConfig, store: DynStore) -> Self {
        let tokens = TokenService::from_config(&config);
        let images = config.image_service.clone().map(ImageUploader::new);
        if images.is_none() {
            tracing::warn!("[Images] IMAGE_SERVICE_URL not set. Image uploads will be rejected.");
        }

        Self {
            config: Arc::new(config),
            store,
            tokens,
            hub: RealtimeHub::new(),
            presence: PresenceRegistry::new(),
            images,
        }
    }
}

impl FromRef<AppState> for DynStore {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}
