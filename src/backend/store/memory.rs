//! In-memory store
//!
//! Every collection sits behind one `tokio::sync::RwLock`, so each trait
//! method is atomic with respect to the others. State is lost on restart.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{MarketStore, StoreError, StoreResult};
use crate::shared::marketplace::{
    check_purchasable, Account, CartEntry, ChatMessage, Conversation, Listing, ListingQuery,
    MessageState, PurchaseEntry,
};

#[derive(Debug, Default)]
struct MemoryState {
    accounts: HashMap<Uuid, Account>,
    carts: HashMap<Uuid, Vec<CartEntry>>,
    purchases: HashMap<Uuid, Vec<PurchaseEntry>>,
    listings: HashMap<Uuid, Listing>,
    conversations: HashMap<Uuid, Conversation>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(listings: &mut [Listing]) {
    listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

fn unique(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[async_trait]
impl MarketStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create_account(&self, account: Account) -> StoreResult<Account> {
        let mut state = self.state.write().await;
        if state.accounts.values().any(|a| a.email == account.email) {
            return Err(StoreError::conflict("User already exists with this email"));
        }
        state.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn account_by_id(&self, id: Uuid) -> StoreResult<Option<Account>> {
        Ok(self.state.read().await.accounts.get(&id).cloned())
    }

    async fn account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let state = self.state.read().await;
        Ok(state.accounts.values().find(|a| a.email == email).cloned())
    }

    async fn accounts_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Account>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.accounts.get(id).cloned())
            .collect())
    }

    async fn update_profile(&self, id: Uuid, name: &str, email: &str) -> StoreResult<Account> {
        let mut state = self.state.write().await;
        if state
            .accounts
            .values()
            .any(|a| a.id != id && a.email == email)
        {
            return Err(StoreError::conflict("Email is already taken by another user"));
        }
        let account = state
            .accounts
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("User not found"))?;
        account.name = name.to_string();
        account.email = email.to_string();
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn insert_listing(&self, listing: Listing) -> StoreResult<Listing> {
        let mut state = self.state.write().await;
        state.listings.insert(listing.id, listing.clone());
        Ok(listing)
    }

    async fn listing_by_id(&self, id: Uuid) -> StoreResult<Option<Listing>> {
        Ok(self.state.read().await.listings.get(&id).cloned())
    }

    async fn listings_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Listing>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.listings.get(id).cloned())
            .collect())
    }

    async fn search_listings(&self, query: &ListingQuery) -> StoreResult<Vec<Listing>> {
        let state = self.state.read().await;
        let mut matches: Vec<Listing> = state
            .listings
            .values()
            .filter(|l| query.matches(l))
            .cloned()
            .collect();
        newest_first(&mut matches);
        Ok(matches
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit as usize)
            .collect())
    }

    async fn listings_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Listing>> {
        let state = self.state.read().await;
        let mut owned: Vec<Listing> = state
            .listings
            .values()
            .filter(|l| l.is_owned_by(owner))
            .cloned()
            .collect();
        newest_first(&mut owned);
        Ok(owned)
    }

    async fn save_listing(&self, listing: &Listing) -> StoreResult<()> {
        let mut state = self.state.write().await;
        match state.listings.get_mut(&listing.id) {
            Some(existing) => {
                *existing = listing.clone();
                Ok(())
            }
            None => Err(StoreError::not_found("Product not found")),
        }
    }

    async fn delete_listing(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.state.write().await.listings.remove(&id).is_some())
    }

    async fn cart_entries(&self, account: Uuid) -> StoreResult<Vec<CartEntry>> {
        let state = self.state.read().await;
        Ok(state.carts.get(&account).cloned().unwrap_or_default())
    }

    async fn add_cart_entry(&self, account: Uuid, entry: CartEntry) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let cart = state.carts.entry(account).or_default();
        if cart.iter().any(|e| e.listing_id == entry.listing_id) {
            return Err(StoreError::conflict("Product is already in your cart"));
        }
        cart.push(entry);
        Ok(())
    }

    async fn remove_cart_entry(&self, account: Uuid, listing: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let Some(cart) = state.carts.get_mut(&account) else {
            return Ok(false);
        };
        let before = cart.len();
        cart.retain(|e| e.listing_id != listing);
        Ok(cart.len() != before)
    }

    async fn prune_cart(&self, account: Uuid, listings: &[Uuid]) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if let Some(cart) = state.carts.get_mut(&account) {
            cart.retain(|e| !listings.contains(&e.listing_id));
        }
        Ok(())
    }

    async fn purchase(&self, buyer: Uuid, listings: &[Uuid]) -> StoreResult<Vec<PurchaseEntry>> {
        let ids = unique(listings);
        let mut state = self.state.write().await;

        // Validate everything before touching anything
        for id in &ids {
            let listing = state
                .listings
                .get(id)
                .ok_or_else(|| StoreError::not_found(format!("Product {} not found", id)))?;
            check_purchasable(listing, buyer)?;
        }

        let now = Utc::now();
        let mut recorded = Vec::with_capacity(ids.len());
        for id in &ids {
            if let Some(listing) = state.listings.get_mut(id) {
                listing.is_available = false;
                listing.updated_at = now;
                recorded.push(PurchaseEntry::of(listing, now));
            }
        }

        if let Some(cart) = state.carts.get_mut(&buyer) {
            cart.retain(|e| !ids.contains(&e.listing_id));
        }
        state
            .purchases
            .entry(buyer)
            .or_default()
            .extend(recorded.iter().cloned());

        Ok(recorded)
    }

    async fn purchases(&self, account: Uuid) -> StoreResult<Vec<PurchaseEntry>> {
        let state = self.state.read().await;
        let mut history = state.purchases.get(&account).cloned().unwrap_or_default();
        history.reverse();
        Ok(history)
    }

    async fn find_or_create_conversation(
        &self,
        listing: Uuid,
        buyer: Uuid,
        owner: Uuid,
    ) -> StoreResult<Conversation> {
        let mut state = self.state.write().await;
        if let Some(existing) = state
            .conversations
            .values()
            .find(|c| c.is_keyed_by(listing, buyer, owner))
        {
            return Ok(existing.clone());
        }
        let conversation = Conversation::new(listing, buyer, owner);
        state
            .conversations
            .insert(conversation.id, conversation.clone());
        Ok(conversation)
    }

    async fn conversation(&self, id: Uuid) -> StoreResult<Option<Conversation>> {
        Ok(self.state.read().await.conversations.get(&id).cloned())
    }

    async fn conversations_for(&self, account: Uuid) -> StoreResult<Vec<Conversation>> {
        let state = self.state.read().await;
        let mut mine: Vec<Conversation> = state
            .conversations
            .values()
            .filter(|c| c.has_participant(account))
            .map(|c| Conversation {
                messages: Vec::new(),
                ..c.clone()
            })
            .collect();
        mine.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(mine)
    }

    async fn append_message(&self, conversation: Uuid, message: &ChatMessage) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let conversation = state
            .conversations
            .get_mut(&conversation)
            .ok_or_else(|| StoreError::not_found("Chat not found"))?;
        conversation.push(message.clone());
        Ok(())
    }

    async fn advance_inbound(
        &self,
        conversation: Uuid,
        viewer: Uuid,
        target: MessageState,
    ) -> StoreResult<Vec<Uuid>> {
        let mut state = self.state.write().await;
        let conversation = state
            .conversations
            .get_mut(&conversation)
            .ok_or_else(|| StoreError::not_found("Chat not found"))?;
        Ok(conversation.advance_inbound(viewer, target))
    }
}
