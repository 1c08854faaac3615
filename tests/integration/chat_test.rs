//! Chat API integration tests
//!
//! Conversations are keyed by listing and participant pair. Opening a
//! conversation marks the caller's inbound messages as seen.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::common::{create_listing, register_user, spawn_app, TestApp, TestUser};

async fn start_chat(app: &TestApp, user: &TestUser, listing: Uuid) -> axum_test::TestResponse {
    app.server
        .post("/api/chat/start")
        .authorization_bearer(&user.token)
        .json(&json!({ "productId": listing }))
        .await
}

async fn send(app: &TestApp, user: &TestUser, chat_id: &str, content: &str) -> axum_test::TestResponse {
    app.server
        .post("/api/chat/message")
        .authorization_bearer(&user.token)
        .json(&json!({ "chatId": chat_id, "content": content }))
        .await
}

#[tokio::test]
async fn test_start_chat_is_idempotent() {
    let app = spawn_app();
    let seller = register_user(&app.server, "Seller").await;
    let buyer = register_user(&app.server, "Buyer").await;
    let listing = create_listing(&app.state, seller.id, "Camera", 120.0).await;

    let first = start_chat(&app, &buyer, listing.id).await;
    assert_eq!(first.status_code(), StatusCode::OK);
    let first: Value = first.json();
    let second: Value = start_chat(&app, &buyer, listing.id).await.json();

    assert_eq!(first["chat"]["id"], second["chat"]["id"]);
    assert_eq!(first["chat"]["product"]["title"], "Camera");
    assert_eq!(first["chat"]["participants"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_start_chat_rules() {
    let app = spawn_app();
    let seller = register_user(&app.server, "Seller").await;
    let listing = create_listing(&app.state, seller.id, "Camera", 120.0).await;

    let with_self = start_chat(&app, &seller, listing.id).await;
    assert_eq!(with_self.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = with_self.json();
    assert_eq!(body["message"], "You cannot chat with yourself");

    let missing = start_chat(&app, &seller, Uuid::new_v4()).await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    let body: Value = missing.json();
    assert_eq!(body["message"], "Product not found");

    let no_id = app
        .server
        .post("/api/chat/start")
        .authorization_bearer(&seller.token)
        .json(&json!({}))
        .await;
    assert_eq!(no_id.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_outsider_cannot_read_or_write() {
    let app = spawn_app();
    let seller = register_user(&app.server, "Seller").await;
    let buyer = register_user(&app.server, "Buyer").await;
    let outsider = register_user(&app.server, "Outsider").await;
    let listing = create_listing(&app.state, seller.id, "Camera", 120.0).await;

    let chat: Value = start_chat(&app, &buyer, listing.id).await.json();
    let chat_id = chat["chat"]["id"].as_str().unwrap().to_string();

    let read = app
        .server
        .get(&format!("/api/chat/{}", chat_id))
        .authorization_bearer(&outsider.token)
        .await;
    assert_eq!(read.status_code(), StatusCode::FORBIDDEN);
    let body: Value = read.json();
    assert_eq!(body["message"], "Access denied");

    let write = send(&app, &outsider, &chat_id, "hello?").await;
    assert_eq!(write.status_code(), StatusCode::FORBIDDEN);

    let unknown = app
        .server
        .get(&format!("/api/chat/{}", Uuid::new_v4()))
        .authorization_bearer(&buyer.token)
        .await;
    assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);
    let body: Value = unknown.json();
    assert_eq!(body["message"], "Chat not found");
}

#[tokio::test]
async fn test_send_rejects_blank_content() {
    let app = spawn_app();
    let seller = register_user(&app.server, "Seller").await;
    let buyer = register_user(&app.server, "Buyer").await;
    let listing = create_listing(&app.state, seller.id, "Camera", 120.0).await;
    let chat: Value = start_chat(&app, &buyer, listing.id).await.json();
    let chat_id = chat["chat"]["id"].as_str().unwrap().to_string();

    let response = send(&app, &buyer, &chat_id, "   ").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_opening_chat_marks_only_inbound_seen() {
    let app = spawn_app();
    let seller = register_user(&app.server, "Seller").await;
    let buyer = register_user(&app.server, "Buyer").await;
    let listing = create_listing(&app.state, seller.id, "Camera", 120.0).await;
    let chat: Value = start_chat(&app, &buyer, listing.id).await.json();
    let chat_id = chat["chat"]["id"].as_str().unwrap().to_string();

    let sent = send(&app, &buyer, &chat_id, "Is it still available?").await;
    assert_eq!(sent.status_code(), StatusCode::OK);
    let sent: Value = sent.json();
    // Nobody is connected, so the message stays `sent`
    assert_eq!(sent["message"]["status"], "sent");
    assert_eq!(sent["message"]["content"], "Is it still available?");

    // The sender opening the chat changes nothing
    let own_view: Value = app
        .server
        .get(&format!("/api/chat/{}", chat_id))
        .authorization_bearer(&buyer.token)
        .await
        .json();
    assert_eq!(own_view["chat"]["messages"][0]["status"], "sent");

    let seller_view: Value = app
        .server
        .get(&format!("/api/chat/{}", chat_id))
        .authorization_bearer(&seller.token)
        .await
        .json();
    assert_eq!(seller_view["chat"]["messages"][0]["status"], "seen");

    send(&app, &seller, &chat_id, "Yes it is").await;
    let buyer_view: Value = app
        .server
        .get(&format!("/api/chat/{}", chat_id))
        .authorization_bearer(&buyer.token)
        .await
        .json();
    let statuses: Vec<&str> = buyer_view["chat"]["messages"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["status"].as_str())
        .collect();
    assert_eq!(statuses, vec!["seen", "seen"]);
}

#[tokio::test]
async fn test_my_chats_lists_recent_first() {
    let app = spawn_app();
    let seller = register_user(&app.server, "Seller").await;
    let buyer = register_user(&app.server, "Buyer").await;
    let camera = create_listing(&app.state, seller.id, "Camera", 120.0).await;
    let tripod = create_listing(&app.state, seller.id, "Tripod", 25.0).await;

    let camera_chat: Value = start_chat(&app, &buyer, camera.id).await.json();
    let tripod_chat: Value = start_chat(&app, &buyer, tripod.id).await.json();
    let camera_id = camera_chat["chat"]["id"].as_str().unwrap().to_string();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    send(&app, &buyer, &camera_id, "Lens included?").await;

    let chats: Value = app
        .server
        .get("/api/chat/my-chats")
        .authorization_bearer(&seller.token)
        .await
        .json();
    let listed = chats["chats"].as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["id"], camera_chat["chat"]["id"]);
    assert_eq!(listed[0]["lastMessage"]["content"], "Lens included?");
    assert_eq!(listed[1]["id"], tripod_chat["chat"]["id"]);
    // History is only returned when a single chat is opened
    assert!(listed[0].get("messages").is_none());
}
