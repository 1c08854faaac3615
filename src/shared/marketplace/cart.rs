//! Cart and Purchase Data Structures
//!
//! The cart and the purchase history are embedded in the account. Entries
//! only reference listings, so they are validated lazily against the
//! listings they point at.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::listing::Listing;
use crate::shared::error::SharedError;

/// One cart entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    pub listing_id: Uuid,
    pub added_at: DateTime<Utc>,
}

/// One purchase-history entry. `price` is the price paid at purchase time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseEntry {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub price: f64,
    pub purchased_at: DateTime<Utc>,
}

impl PurchaseEntry {
    pub fn of(listing: &Listing, purchased_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            listing_id: listing.id,
            price: listing.price,
            purchased_at,
        }
    }
}

/// Cart entry resolved against its listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product: Listing,
    pub added_at: DateTime<Utc>,
}

/// Purchase entry resolved against its listing. The listing may be gone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItem {
    pub id: Uuid,
    pub product: Option<Listing>,
    pub price: f64,
    pub purchased_at: DateTime<Utc>,
}

/// `POST /api/cart/add`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: Option<Uuid>,
}

/// `POST /api/user/purchase`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    #[serde(default)]
    pub product_ids: Vec<Uuid>,
}

impl PurchaseRequest {
    /// Deduplicated ids in request order; an empty request is rejected
    pub fn listing_ids(&self) -> Result<Vec<Uuid>, SharedError> {
        let mut seen = HashSet::new();
        let ids: Vec<Uuid> = self
            .product_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();
        if ids.is_empty() {
            return Err(SharedError::validation(
                "productIds",
                "At least one product is required",
            ));
        }
        Ok(ids)
    }
}

/// Rules for putting `listing` into `buyer`'s cart
pub fn check_cart_addition(
    listing: &Listing,
    buyer: Uuid,
    cart: &[CartEntry],
) -> Result<(), SharedError> {
    if !listing.is_available {
        return Err(SharedError::rule("Product is not available for purchase"));
    }
    if listing.is_owned_by(buyer) {
        return Err(SharedError::rule("You cannot add your own product to cart"));
    }
    if cart.iter().any(|entry| entry.listing_id == listing.id) {
        return Err(SharedError::rule("Product is already in your cart"));
    }
    Ok(())
}

/// Rules for `buyer` purchasing `listing`
pub fn check_purchasable(listing: &Listing, buyer: Uuid) -> Result<(), SharedError> {
    if !listing.is_available {
        return Err(SharedError::rule(format!(
            "Product '{}' is no longer available",
            listing.title
        )));
    }
    if listing.is_owned_by(buyer) {
        return Err(SharedError::rule("You cannot purchase your own product"));
    }
    Ok(())
}
