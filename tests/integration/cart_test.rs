//! Cart and purchase API integration tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::common::{create_listing, register_user, spawn_app, TestApp, TestUser};

async fn add_to_cart(app: &TestApp, user: &TestUser, listing: Uuid) -> axum_test::TestResponse {
    app.server
        .post("/api/cart/add")
        .authorization_bearer(&user.token)
        .json(&json!({ "productId": listing }))
        .await
}

async fn cart(app: &TestApp, user: &TestUser) -> Value {
    app.server
        .get("/api/cart")
        .authorization_bearer(&user.token)
        .await
        .json()
}

#[tokio::test]
async fn test_add_and_remove() {
    let app = spawn_app();
    let seller = register_user(&app.server, "Seller").await;
    let buyer = register_user(&app.server, "Buyer").await;
    let listing = create_listing(&app.state, seller.id, "Kettle", 15.0).await;

    let added = add_to_cart(&app, &buyer, listing.id).await;
    assert_eq!(added.status_code(), StatusCode::OK);
    let body: Value = added.json();
    assert_eq!(body["message"], "Product added to cart successfully");
    assert_eq!(body["count"], 1);

    let contents = cart(&app, &buyer).await;
    assert_eq!(contents["count"], 1);
    assert_eq!(contents["items"][0]["product"]["id"], listing.id.to_string());

    let removed = app
        .server
        .delete(&format!("/api/cart/remove/{}", listing.id))
        .authorization_bearer(&buyer.token)
        .await;
    assert_eq!(removed.status_code(), StatusCode::OK);
    let body: Value = removed.json();
    assert_eq!(body["count"], 0);

    let again = app
        .server
        .delete(&format!("/api/cart/remove/{}", listing.id))
        .authorization_bearer(&buyer.token)
        .await;
    assert_eq!(again.status_code(), StatusCode::NOT_FOUND);
    let body: Value = again.json();
    assert_eq!(body["message"], "Product not found in cart");
}

#[tokio::test]
async fn test_add_rules() {
    let app = spawn_app();
    let seller = register_user(&app.server, "Seller").await;
    let buyer = register_user(&app.server, "Buyer").await;
    let listing = create_listing(&app.state, seller.id, "Kettle", 15.0).await;

    let own = add_to_cart(&app, &seller, listing.id).await;
    assert_eq!(own.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = own.json();
    assert_eq!(body["message"], "You cannot add your own product to cart");

    assert_eq!(add_to_cart(&app, &buyer, listing.id).await.status_code(), StatusCode::OK);
    let duplicate = add_to_cart(&app, &buyer, listing.id).await;
    assert_eq!(duplicate.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = duplicate.json();
    assert_eq!(body["message"], "Product is already in your cart");

    let missing = add_to_cart(&app, &buyer, Uuid::new_v4()).await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

    let no_id = app
        .server
        .post("/api/cart/add")
        .authorization_bearer(&buyer.token)
        .json(&json!({}))
        .await;
    assert_eq!(no_id.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = no_id.json();
    assert_eq!(body["message"], "Product ID is required");
}

#[tokio::test]
async fn test_cart_drops_stale_entries() {
    let app = spawn_app();
    let seller = register_user(&app.server, "Seller").await;
    let buyer = register_user(&app.server, "Buyer").await;
    let kept = create_listing(&app.state, seller.id, "Kettle", 15.0).await;
    let deleted = create_listing(&app.state, seller.id, "Toaster", 20.0).await;
    let mut sold = create_listing(&app.state, seller.id, "Blender", 30.0).await;

    for id in [kept.id, deleted.id, sold.id] {
        assert_eq!(add_to_cart(&app, &buyer, id).await.status_code(), StatusCode::OK);
    }

    app.state.store.delete_listing(deleted.id).await.unwrap();
    sold.is_available = false;
    app.state.store.save_listing(&sold).await.unwrap();

    let contents = cart(&app, &buyer).await;
    assert_eq!(contents["count"], 1);
    assert_eq!(contents["items"][0]["product"]["id"], kept.id.to_string());

    // The stale entries are gone from storage, not just hidden
    let entries = app.state.store.cart_entries(buyer.id).await.unwrap();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn test_purchase_marks_listings_sold() {
    let app = spawn_app();
    let seller = register_user(&app.server, "Seller").await;
    let buyer = register_user(&app.server, "Buyer").await;
    let first = create_listing(&app.state, seller.id, "Kettle", 15.0).await;
    let second = create_listing(&app.state, seller.id, "Toaster", 20.0).await;
    add_to_cart(&app, &buyer, first.id).await;
    add_to_cart(&app, &buyer, second.id).await;

    let response = app
        .server
        .post("/api/user/purchase")
        .authorization_bearer(&buyer.token)
        .json(&json!({ "productIds": [first.id, second.id] }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["message"], "Purchase completed successfully");
    assert_eq!(body["purchases"].as_array().map(Vec::len), Some(2));

    // Sold listings leave the catalogue and the cart
    let browse: Value = app.server.get("/api/products").await.json();
    assert_eq!(browse["count"], 0);
    assert_eq!(cart(&app, &buyer).await["count"], 0);

    let history: Value = app
        .server
        .get("/api/user/purchases")
        .authorization_bearer(&buyer.token)
        .await
        .json();
    assert_eq!(history["count"], 2);
    let mut prices: Vec<f64> = history["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["price"].as_f64())
        .collect();
    prices.sort_by(f64::total_cmp);
    assert_eq!(prices, vec![15.0, 20.0]);
}

#[tokio::test]
async fn test_purchase_is_all_or_nothing() {
    let app = spawn_app();
    let seller = register_user(&app.server, "Seller").await;
    let buyer = register_user(&app.server, "Buyer").await;
    let available = create_listing(&app.state, seller.id, "Kettle", 15.0).await;
    let mut sold = create_listing(&app.state, seller.id, "Toaster", 20.0).await;
    sold.is_available = false;
    app.state.store.save_listing(&sold).await.unwrap();

    let response = app
        .server
        .post("/api/user/purchase")
        .authorization_bearer(&buyer.token)
        .json(&json!({ "productIds": [available.id, sold.id] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let still_there = app.state.store.listing_by_id(available.id).await.unwrap();
    assert!(still_there.is_some_and(|l| l.is_available));
    assert!(app.state.store.purchases(buyer.id).await.unwrap().is_empty());

    let own = app
        .server
        .post("/api/user/purchase")
        .authorization_bearer(&seller.token)
        .json(&json!({ "productIds": [available.id] }))
        .await;
    assert_eq!(own.status_code(), StatusCode::BAD_REQUEST);

    let empty = app
        .server
        .post("/api/user/purchase")
        .authorization_bearer(&buyer.token)
        .json(&json!({ "productIds": [] }))
        .await;
    assert_eq!(empty.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_purchase_history_survives_deleted_listing() {
    let app = spawn_app();
    let seller = register_user(&app.server, "Seller").await;
    let buyer = register_user(&app.server, "Buyer").await;
    let listing = create_listing(&app.state, seller.id, "Kettle", 15.0).await;

    let response = app
        .server
        .post("/api/user/purchase")
        .authorization_bearer(&buyer.token)
        .json(&json!({ "productIds": [listing.id] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    app.state.store.delete_listing(listing.id).await.unwrap();

    let history: Value = app
        .server
        .get("/api/user/purchases")
        .authorization_bearer(&buyer.token)
        .await
        .json();
    assert_eq!(history["count"], 1);
    assert!(history["data"][0]["product"].is_null());
    assert_eq!(history["data"][0]["price"], 15.0);
}
