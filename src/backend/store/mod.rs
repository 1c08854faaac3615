//! Persistent Store
//!
//! All marketplace state lives behind the [`MarketStore`] trait so that
//! handlers never know which backend they talk to:
//!
//! - [`PgStore`] - PostgreSQL via `sqlx`, schema under `migrations/`
//! - [`MemoryStore`] - process-local maps, used when no database is configured
//!   and by the test suite
//!
//! # Consistency
//!
//! `purchase` is the only multi-record write that is atomic (one transaction,
//! or one write lock). `find_or_create_conversation` is idempotent per
//! `(listing, unordered pair)`. Everything else is last-write-wins.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::shared::marketplace::{
    Account, CartEntry, ChatMessage, Conversation, Listing, ListingQuery, MessageState,
    PurchaseEntry,
};
use crate::shared::SharedError;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Shared handle to whichever store the server runs with
pub type DynStore = Arc<dyn MarketStore>;

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// A referenced record does not exist, message is user-facing
    #[error("{0}")]
    NotFound(String),

    /// A uniqueness rule was violated, message is user-facing
    #[error("{0}")]
    Conflict(String),

    /// A domain rule rejected the write
    #[error(transparent)]
    Rejected(#[from] SharedError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}

/// Storage operations used by the API and real-time layers
#[async_trait]
pub trait MarketStore: Send + Sync {
    /// Short backend name for logs and `/health`
    fn backend_name(&self) -> &'static str;

    // Accounts

    /// Insert a new account. Fails with `Conflict` when the email is taken.
    async fn create_account(&self, account: Account) -> StoreResult<Account>;
    async fn account_by_id(&self, id: Uuid) -> StoreResult<Option<Account>>;
    async fn account_by_email(&self, email: &str) -> StoreResult<Option<Account>>;
    async fn accounts_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Account>>;
    /// Fails with `Conflict` when another account already uses `email`
    async fn update_profile(&self, id: Uuid, name: &str, email: &str) -> StoreResult<Account>;

    // Listings

    async fn insert_listing(&self, listing: Listing) -> StoreResult<Listing>;
    async fn listing_by_id(&self, id: Uuid) -> StoreResult<Option<Listing>>;
    async fn listings_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Listing>>;
    /// Available listings matching `query`, newest first, one page
    async fn search_listings(&self, query: &ListingQuery) -> StoreResult<Vec<Listing>>;
    /// Every listing owned by `owner`, newest first
    async fn listings_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Listing>>;
    async fn save_listing(&self, listing: &Listing) -> StoreResult<()>;
    /// Returns `false` when nothing was deleted
    async fn delete_listing(&self, id: Uuid) -> StoreResult<bool>;

    // Cart and purchases

    async fn cart_entries(&self, account: Uuid) -> StoreResult<Vec<CartEntry>>;
    /// Fails with `Conflict` when the listing is already in the cart
    async fn add_cart_entry(&self, account: Uuid, entry: CartEntry) -> StoreResult<()>;
    /// Returns `false` when the listing was not in the cart
    async fn remove_cart_entry(&self, account: Uuid, listing: Uuid) -> StoreResult<bool>;
    /// Drop the given listings from the cart, ignoring those not present
    async fn prune_cart(&self, account: Uuid, listings: &[Uuid]) -> StoreResult<()>;

    /// Buy every listing in `listings` at once.
    ///
    /// Each listing must exist, be available, and not belong to `buyer`.
    /// On success the listings become unavailable, leave the buyer's cart,
    /// and one purchase entry per listing is recorded. On failure nothing
    /// changes.
    async fn purchase(&self, buyer: Uuid, listings: &[Uuid]) -> StoreResult<Vec<PurchaseEntry>>;
    /// Purchase history, newest first
    async fn purchases(&self, account: Uuid) -> StoreResult<Vec<PurchaseEntry>>;

    // Conversations

    /// Conversation keyed by `(listing, {buyer, owner})`, created if absent
    async fn find_or_create_conversation(
        &self,
        listing: Uuid,
        buyer: Uuid,
        owner: Uuid,
    ) -> StoreResult<Conversation>;
    /// Conversation with its full message history
    async fn conversation(&self, id: Uuid) -> StoreResult<Option<Conversation>>;
    /// Conversations `account` takes part in, most recently updated first.
    /// Messages are not loaded.
    async fn conversations_for(&self, account: Uuid) -> StoreResult<Vec<Conversation>>;
    /// Append a message and refresh the last-message summary
    async fn append_message(&self, conversation: Uuid, message: &ChatMessage) -> StoreResult<()>;
    /// Advance every message not sent by `viewer` to `target` in one batch.
    /// Returns the ids of the messages that changed.
    async fn advance_inbound(
        &self,
        conversation: Uuid,
        viewer: Uuid,
        target: MessageState,
    ) -> StoreResult<Vec<Uuid>>;
}
