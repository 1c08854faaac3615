//! Listing fixtures
//!
//! Listings are inserted straight into the store so tests that are not
//! about uploads stay free of multipart plumbing.

use ecofinds::backend::AppState;
use ecofinds::shared::marketplace::{Category, Listing, NewListing};
use uuid::Uuid;

/// Insert an available listing owned by `owner`
pub async fn create_listing(state: &AppState, owner: Uuid, title: &str, price: f64) -> Listing {
    create_listing_in(state, owner, title, Category::Other, price).await
}

/// Insert an available listing in a given category
pub async fn create_listing_in(
    state: &AppState,
    owner: Uuid,
    title: &str,
    category: Category,
    price: f64,
) -> Listing {
    let listing = Listing::new(
        owner,
        NewListing {
            title: title.to_string(),
            description: format!("{} in good condition", title),
            category,
            price,
            image_url: None,
        },
    );
    state
        .store
        .insert_listing(listing)
        .await
        .expect("Failed to insert listing")
}
