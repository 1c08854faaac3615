/**
 * Store Selection
 *
 * This module opens the marketplace store described by the configuration.
 *
 * # Behaviour
 *
 * - `database_url` unset: an in-memory store is used and a warning is
 *   logged. Data does not survive a restart.
 * - `database_url` set: a PostgreSQL pool is opened and migrations are
 *   applied. Failure is fatal; the server never falls back to memory once
 *   a database was asked for.
 */
use std::sync::Arc;

use crate::backend::store::{DynStore, MemoryStore, PgStore, StoreError};
use crate::shared::AppConfig;

/// Open the configured store
///
/// # Example
///
/// ```rust,no_run
/// use ecofinds::backend::server::config::load_store;
/// use ecofinds::shared::AppConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = load_store(&AppConfig::default()).await?;
/// println!("using {}", store.backend_name());
/// # Ok(())
/// # }
/// ```
pub async fn load_store(config: &AppConfig) -> Result<DynStore, StoreError> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("[Store] DATABASE_URL not set. Using the in-memory store.");
        return Ok(Arc::new(MemoryStore::new()));
    };

    tracing::info!("[Store] Connecting to database...");
    let store = PgStore::connect(database_url).await.map_err(|e| {
        tracing::error!("[Store] Failed to open database: {}", e);
        e
    })?;
    tracing::info!("[Store] Database ready, migrations applied");

    Ok(Arc::new(store))
}
