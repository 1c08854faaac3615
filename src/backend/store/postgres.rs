//! PostgreSQL store
//!
//! Rows are mapped by hand with `Row::try_get`, and enum columns are
//! stored as their lowercase wire names. The schema lives in
//! `migrations/`.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{MarketStore, StoreError, StoreResult};
use crate::shared::marketplace::{
    check_purchasable, Account, CartEntry, Category, ChatMessage, Conversation, LastMessage,
    Listing, ListingQuery, MessageState, PurchaseEntry,
};

const ACCOUNT_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";
const LISTING_COLUMNS: &str =
    "id, title, description, category, price, owner_id, is_available, image_url, created_at, updated_at";
const CONVERSATION_COLUMNS: &str = "id, listing_id, buyer_id, owner_id, last_message_content, \
     last_message_at, last_message_sender, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and bring the schema up to date
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        tracing::info!("[Store] Database connection pool created");

        sqlx::migrate!().run(&pool).await?;
        tracing::info!("[Store] Database migrations completed");

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn decode_error(err: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn account_from_row(row: &PgRow) -> Result<Account, sqlx::Error> {
    Ok(Account {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn listing_from_row(row: &PgRow) -> Result<Listing, sqlx::Error> {
    let category: String = row.try_get("category")?;
    Ok(Listing {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        category: category.parse::<Category>().map_err(decode_error)?,
        price: row.try_get("price")?,
        owner_id: row.try_get("owner_id")?,
        is_available: row.try_get("is_available")?,
        image_url: row.try_get("image_url")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn conversation_from_row(row: &PgRow) -> Result<Conversation, sqlx::Error> {
    let content: Option<String> = row.try_get("last_message_content")?;
    let at: Option<DateTime<Utc>> = row.try_get("last_message_at")?;
    let sender: Option<Uuid> = row.try_get("last_message_sender")?;
    let last_message = match (content, at, sender) {
        (Some(content), Some(timestamp), Some(sender_id)) => Some(LastMessage {
            content,
            timestamp,
            sender_id,
        }),
        _ => None,
    };

    Ok(Conversation {
        id: row.try_get("id")?,
        participants: [row.try_get("buyer_id")?, row.try_get("owner_id")?],
        listing_id: row.try_get("listing_id")?,
        messages: Vec::new(),
        last_message,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn message_from_row(row: &PgRow) -> Result<ChatMessage, sqlx::Error> {
    let status: String = row.try_get("status")?;
    Ok(ChatMessage {
        id: row.try_get("id")?,
        sender_id: row.try_get("sender_id")?,
        content: row.try_get("content")?,
        timestamp: row.try_get("sent_at")?,
        status: status.parse::<MessageState>().map_err(decode_error)?,
    })
}

/// `%needle%` with LIKE metacharacters escaped
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn unique(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

impl PgStore {
    async fn load_messages(&self, conversation: Uuid) -> Result<Vec<ChatMessage>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, sender_id, content, status, sent_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY seq
            "#,
        )
        .bind(conversation)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(message_from_row).collect()
    }
}

#[async_trait]
impl MarketStore for PgStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn create_account(&self, account: Account) -> StoreResult<Account> {
        let result = sqlx::query(
            r#"
            INSERT INTO accounts (id, name, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(account.id)
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(account),
            Err(e) if is_unique_violation(&e) => {
                Err(StoreError::conflict("User already exists with this email"))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn account_by_id(&self, id: Uuid) -> StoreResult<Option<Account>> {
        let row = sqlx::query(&format!("SELECT {} FROM accounts WHERE id = $1", ACCOUNT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(account_from_row).transpose()?)
    }

    async fn account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM accounts WHERE email = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(account_from_row).transpose()?)
    }

    async fn accounts_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Account>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM accounts WHERE id = ANY($1)",
            ACCOUNT_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        let found: HashMap<Uuid, Account> = rows
            .iter()
            .map(|row| account_from_row(row).map(|a| (a.id, a)))
            .collect::<Result<_, _>>()?;
        Ok(ids.iter().filter_map(|id| found.get(id).cloned()).collect())
    }

    async fn update_profile(&self, id: Uuid, name: &str, email: &str) -> StoreResult<Account> {
        let result = sqlx::query(&format!(
            r#"
            UPDATE accounts SET name = $2, email = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .bind(name)
        .bind(email)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(Some(row)) => Ok(account_from_row(&row)?),
            Ok(None) => Err(StoreError::not_found("User not found")),
            Err(e) if is_unique_violation(&e) => {
                Err(StoreError::conflict("Email is already taken by another user"))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn insert_listing(&self, listing: Listing) -> StoreResult<Listing> {
        sqlx::query(
            r#"
            INSERT INTO listings
                (id, title, description, category, price, owner_id, is_available, image_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(listing.id)
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(listing.category.as_str())
        .bind(listing.price)
        .bind(listing.owner_id)
        .bind(listing.is_available)
        .bind(&listing.image_url)
        .bind(listing.created_at)
        .bind(listing.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(listing)
    }

    async fn listing_by_id(&self, id: Uuid) -> StoreResult<Option<Listing>> {
        let row = sqlx::query(&format!("SELECT {} FROM listings WHERE id = $1", LISTING_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(listing_from_row).transpose()?)
    }

    async fn listings_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Listing>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM listings WHERE id = ANY($1)",
            LISTING_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        let found: HashMap<Uuid, Listing> = rows
            .iter()
            .map(|row| listing_from_row(row).map(|l| (l.id, l)))
            .collect::<Result<_, _>>()?;
        Ok(ids.iter().filter_map(|id| found.get(id).cloned()).collect())
    }

    async fn search_listings(&self, query: &ListingQuery) -> StoreResult<Vec<Listing>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM listings
            WHERE is_available = TRUE
              AND ($1::TEXT IS NULL OR category = $1)
              AND ($2::TEXT IS NULL OR title ILIKE $2 OR description ILIKE $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
            LISTING_COLUMNS
        ))
        .bind(query.category.map(|c| c.as_str()))
        .bind(query.search.as_deref().map(like_pattern))
        .bind(i64::from(query.limit))
        .bind(query.offset() as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(listing_from_row).collect::<Result<_, _>>()?)
    }

    async fn listings_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Listing>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM listings WHERE owner_id = $1 ORDER BY created_at DESC",
            LISTING_COLUMNS
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(listing_from_row).collect::<Result<_, _>>()?)
    }

    async fn save_listing(&self, listing: &Listing) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE listings
            SET title = $2, description = $3, category = $4, price = $5,
                is_available = $6, image_url = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(listing.id)
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(listing.category.as_str())
        .bind(listing.price)
        .bind(listing.is_available)
        .bind(&listing.image_url)
        .bind(listing.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product not found"));
        }
        Ok(())
    }

    async fn delete_listing(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn cart_entries(&self, account: Uuid) -> StoreResult<Vec<CartEntry>> {
        let rows = sqlx::query(
            "SELECT listing_id, added_at FROM cart_entries WHERE account_id = $1 ORDER BY added_at",
        )
        .bind(account)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|row| -> Result<CartEntry, sqlx::Error> {
                Ok(CartEntry {
                    listing_id: row.try_get("listing_id")?,
                    added_at: row.try_get("added_at")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn add_cart_entry(&self, account: Uuid, entry: CartEntry) -> StoreResult<()> {
        let result = sqlx::query(
            "INSERT INTO cart_entries (account_id, listing_id, added_at) VALUES ($1, $2, $3)",
        )
        .bind(account)
        .bind(entry.listing_id)
        .bind(entry.added_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                Err(StoreError::conflict("Product is already in your cart"))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn remove_cart_entry(&self, account: Uuid, listing: Uuid) -> StoreResult<bool> {
        let result =
            sqlx::query("DELETE FROM cart_entries WHERE account_id = $1 AND listing_id = $2")
                .bind(account)
                .bind(listing)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn prune_cart(&self, account: Uuid, listings: &[Uuid]) -> StoreResult<()> {
        sqlx::query("DELETE FROM cart_entries WHERE account_id = $1 AND listing_id = ANY($2)")
            .bind(account)
            .bind(listings)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn purchase(&self, buyer: Uuid, listings: &[Uuid]) -> StoreResult<Vec<PurchaseEntry>> {
        let ids = unique(listings);
        let mut tx = self.pool.begin().await?;

        // Lock the rows so a concurrent buyer waits for this transaction
        let rows = sqlx::query(&format!(
            "SELECT {} FROM listings WHERE id = ANY($1) FOR UPDATE",
            LISTING_COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await?;
        let found: HashMap<Uuid, Listing> = rows
            .iter()
            .map(|row| listing_from_row(row).map(|l| (l.id, l)))
            .collect::<Result<_, _>>()?;

        let mut bought = Vec::with_capacity(ids.len());
        for id in &ids {
            let listing = found
                .get(id)
                .ok_or_else(|| StoreError::not_found(format!("Product {} not found", id)))?;
            check_purchasable(listing, buyer)?;
            bought.push(listing);
        }

        let now = Utc::now();
        sqlx::query("UPDATE listings SET is_available = FALSE, updated_at = $2 WHERE id = ANY($1)")
            .bind(&ids)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        let mut recorded = Vec::with_capacity(bought.len());
        for listing in bought {
            let entry = PurchaseEntry::of(listing, now);
            sqlx::query(
                r#"
                INSERT INTO purchases (id, account_id, listing_id, price, purchased_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(entry.id)
            .bind(buyer)
            .bind(entry.listing_id)
            .bind(entry.price)
            .bind(entry.purchased_at)
            .execute(&mut *tx)
            .await?;
            recorded.push(entry);
        }

        sqlx::query("DELETE FROM cart_entries WHERE account_id = $1 AND listing_id = ANY($2)")
            .bind(buyer)
            .bind(&ids)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(recorded)
    }

    async fn purchases(&self, account: Uuid) -> StoreResult<Vec<PurchaseEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, listing_id, price, purchased_at
            FROM purchases
            WHERE account_id = $1
            ORDER BY purchased_at DESC
            "#,
        )
        .bind(account)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|row| -> Result<PurchaseEntry, sqlx::Error> {
                Ok(PurchaseEntry {
                    id: row.try_get("id")?,
                    listing_id: row.try_get("listing_id")?,
                    price: row.try_get("price")?,
                    purchased_at: row.try_get("purchased_at")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn find_or_create_conversation(
        &self,
        listing: Uuid,
        buyer: Uuid,
        owner: Uuid,
    ) -> StoreResult<Conversation> {
        let now = Utc::now();
        // The unique index on (listing, least, greatest) turns a racing
        // second insert into a no-op
        sqlx::query(
            r#"
            INSERT INTO conversations (id, listing_id, buyer_id, owner_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(listing)
        .bind(buyer)
        .bind(owner)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM conversations
            WHERE listing_id = $1
              AND ((buyer_id = $2 AND owner_id = $3) OR (buyer_id = $3 AND owner_id = $2))
            "#,
            CONVERSATION_COLUMNS
        ))
        .bind(listing)
        .bind(buyer)
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;

        let mut conversation = conversation_from_row(&row)?;
        conversation.messages = self.load_messages(conversation.id).await?;
        Ok(conversation)
    }

    async fn conversation(&self, id: Uuid) -> StoreResult<Option<Conversation>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM conversations WHERE id = $1",
            CONVERSATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut conversation = conversation_from_row(&row)?;
        conversation.messages = self.load_messages(id).await?;
        Ok(Some(conversation))
    }

    async fn conversations_for(&self, account: Uuid) -> StoreResult<Vec<Conversation>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM conversations
            WHERE buyer_id = $1 OR owner_id = $1
            ORDER BY updated_at DESC
            "#,
            CONVERSATION_COLUMNS
        ))
        .bind(account)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(conversation_from_row)
            .collect::<Result<_, _>>()?)
    }

    async fn append_message(&self, conversation: Uuid, message: &ChatMessage) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE conversations
            SET last_message_content = $2, last_message_at = $3, last_message_sender = $4,
                updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(conversation)
        .bind(&message.content)
        .bind(message.timestamp)
        .bind(message.sender_id)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::not_found("Chat not found"));
        }

        sqlx::query(
            r#"
            INSERT INTO messages (id, conversation_id, sender_id, content, status, sent_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(message.id)
        .bind(conversation)
        .bind(message.sender_id)
        .bind(&message.content)
        .bind(message.status.as_str())
        .bind(message.timestamp)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn advance_inbound(
        &self,
        conversation: Uuid,
        viewer: Uuid,
        target: MessageState,
    ) -> StoreResult<Vec<Uuid>> {
        let behind: Vec<String> = [MessageState::Sent, MessageState::Delivered]
            .into_iter()
            .filter(|state| *state < target)
            .map(|state| state.as_str().to_string())
            .collect();
        if behind.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r#"
            UPDATE messages
            SET status = $3
            WHERE conversation_id = $1 AND sender_id <> $2 AND status = ANY($4)
            RETURNING id
            "#,
        )
        .bind(conversation)
        .bind(viewer)
        .bind(target.as_str())
        .bind(&behind)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|row| row.try_get::<Uuid, _>("id"))
            .collect::<Result<Vec<_>, _>>()?)
    }
}
