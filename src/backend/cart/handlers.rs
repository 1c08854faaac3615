/**
 * Cart and Purchase Handlers
 *
 * The cart only stores listing ids. Reading the cart resolves them, and
 * entries whose listing is gone or no longer available are dropped from the
 * stored cart at that moment.
 *
 * A purchase buys a set of listings at once: each must exist, be available
 * and belong to someone else. On success the listings are marked
 * unavailable and leave the buyer's cart.
 */
use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::error::{path_id, ApiJson, ApiResult, BackendError};
use crate::backend::middleware::AuthUser;
use crate::backend::store::{DynStore, StoreError};
use crate::shared::marketplace::{
    check_cart_addition, AddToCartRequest, CartEntry, CartItem, Listing, PurchaseEntry,
    PurchaseItem, PurchaseRequest,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartResponse {
    pub success: bool,
    pub items: Vec<CartItem>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartChangeResponse {
    pub success: bool,
    pub message: String,
    /// Number of entries left in the cart
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseResponse {
    pub success: bool,
    pub message: String,
    pub purchases: Vec<PurchaseItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseHistoryResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<PurchaseItem>,
}

async fn listings_by_id(store: &DynStore, ids: &[Uuid]) -> ApiResult<HashMap<Uuid, Listing>> {
    Ok(store
        .listings_by_ids(ids)
        .await?
        .into_iter()
        .map(|listing| (listing.id, listing))
        .collect())
}

async fn resolve_purchases(
    store: &DynStore,
    entries: Vec<PurchaseEntry>,
) -> ApiResult<Vec<PurchaseItem>> {
    let ids: Vec<Uuid> = entries.iter().map(|e| e.listing_id).collect();
    let listings = listings_by_id(store, &ids).await?;

    Ok(entries
        .into_iter()
        .map(|entry| PurchaseItem {
            id: entry.id,
            product: listings.get(&entry.listing_id).cloned(),
            price: entry.price,
            purchased_at: entry.purchased_at,
        })
        .collect())
}

/// POST /api/cart/add
///
/// # Errors
///
/// * `400 Bad Request` - Missing id, unavailable listing, own listing, or
///   already in the cart
/// * `404 Not Found` - No such listing
pub async fn add_to_cart(
    State(store): State<DynStore>,
    AuthUser(user): AuthUser,
    ApiJson(request): ApiJson<AddToCartRequest>,
) -> ApiResult<Json<CartChangeResponse>> {
    let listing_id = request
        .product_id
        .ok_or_else(|| BackendError::bad_request("Product ID is required"))?;

    let listing = store
        .listing_by_id(listing_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Product not found"))?;

    let cart = store.cart_entries(user.user_id).await?;
    check_cart_addition(&listing, user.user_id, &cart)?;

    let entry = CartEntry {
        listing_id,
        added_at: Utc::now(),
    };
    match store.add_cart_entry(user.user_id, entry).await {
        Ok(()) => {}
        // Lost a race with a concurrent add of the same listing
        Err(StoreError::Conflict(message)) => return Err(BackendError::bad_request(message)),
        Err(e) => return Err(e.into()),
    }
    tracing::info!("[Cart] {} added {}", user.user_id, listing_id);

    Ok(Json(CartChangeResponse {
        success: true,
        message: "Product added to cart successfully".to_string(),
        count: cart.len() + 1,
    }))
}

/// GET /api/cart
pub async fn get_cart(
    State(store): State<DynStore>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<CartResponse>> {
    let entries = store.cart_entries(user.user_id).await?;
    let ids: Vec<Uuid> = entries.iter().map(|e| e.listing_id).collect();
    let mut listings = listings_by_id(&store, &ids).await?;

    let mut items = Vec::with_capacity(entries.len());
    let mut stale = Vec::new();
    for entry in entries {
        match listings.remove(&entry.listing_id) {
            Some(product) if product.is_available => items.push(CartItem {
                product,
                added_at: entry.added_at,
            }),
            _ => stale.push(entry.listing_id),
        }
    }

    if !stale.is_empty() {
        tracing::info!("[Cart] Dropping {} stale entries for {}", stale.len(), user.user_id);
        store.prune_cart(user.user_id, &stale).await?;
    }

    Ok(Json(CartResponse {
        success: true,
        count: items.len(),
        items,
    }))
}

/// DELETE /api/cart/remove/{productId}
pub async fn remove_from_cart(
    State(store): State<DynStore>,
    AuthUser(user): AuthUser,
    Path(product_id): Path<String>,
) -> ApiResult<Json<CartChangeResponse>> {
    let listing_id = path_id(&product_id, "Product not found in cart")?;

    if !store.remove_cart_entry(user.user_id, listing_id).await? {
        return Err(BackendError::not_found("Product not found in cart"));
    }
    let count = store.cart_entries(user.user_id).await?.len();
    tracing::info!("[Cart] {} removed {}", user.user_id, listing_id);

    Ok(Json(CartChangeResponse {
        success: true,
        message: "Product removed from cart successfully".to_string(),
        count,
    }))
}

/// POST /api/user/purchase
///
/// # Errors
///
/// * `400 Bad Request` - Empty request, unavailable or own listing
/// * `404 Not Found` - One of the listings does not exist
pub async fn purchase(
    State(store): State<DynStore>,
    AuthUser(user): AuthUser,
    ApiJson(request): ApiJson<PurchaseRequest>,
) -> ApiResult<Json<PurchaseResponse>> {
    let ids = request.listing_ids()?;
    let recorded = store.purchase(user.user_id, &ids).await?;
    tracing::info!("[Cart] {} purchased {} listings", user.user_id, recorded.len());

    let purchases = resolve_purchases(&store, recorded).await?;
    Ok(Json(PurchaseResponse {
        success: true,
        message: "Purchase completed successfully".to_string(),
        purchases,
    }))
}

/// GET /api/user/purchases
///
/// Newest first. Deleted listings show up with `product: null`.
pub async fn purchases(
    State(store): State<DynStore>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<PurchaseHistoryResponse>> {
    let history = store.purchases(user.user_id).await?;
    let data = resolve_purchases(&store, history).await?;
    Ok(Json(PurchaseHistoryResponse {
        success: true,
        count: data.len(),
        data,
    }))
}
