//! Authentication API integration tests
//!
//! Tests for registration, login, the current-user endpoint and profile
//! updates.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{register_user, register_with_email, spawn_app, unique_email, TEST_PASSWORD};

#[tokio::test]
async fn test_register_success() {
    let app = spawn_app();
    let email = unique_email("Ada");

    let response = app
        .server
        .post("/api/auth/register")
        .json(&json!({
            "name": "Ada",
            "email": email.to_uppercase(),
            "password": "secret1"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    // Emails are stored normalized
    assert_eq!(body["user"]["email"], email);
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = spawn_app();
    let email = unique_email("Ada");
    register_with_email(&app.server, "Ada", &email).await;

    let response = app
        .server
        .post("/api/auth/register")
        .json(&json!({
            "name": "Someone Else",
            "email": email,
            "password": TEST_PASSWORD
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "User already exists with this email");
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let app = spawn_app();

    let response = app
        .server
        .post("/api/auth/register")
        .json(&json!({
            "name": "Ada",
            "email": unique_email("Ada"),
            "password": "123"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_rejects_malformed_body() {
    let app = spawn_app();

    let response = app
        .server
        .post("/api/auth/register")
        .content_type("application/json")
        .bytes("{not json".into())
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_login_success() {
    let app = spawn_app();
    let user = register_user(&app.server, "Grace").await;

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({
            "email": user.email,
            "password": TEST_PASSWORD
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["user"]["id"], user.id.to_string());
    assert!(body["token"].as_str().is_some());
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let app = spawn_app();
    let user = register_user(&app.server, "Grace").await;

    let wrong_password = app
        .server
        .post("/api/auth/login")
        .json(&json!({
            "email": user.email,
            "password": "not-the-password"
        }))
        .await;
    assert_eq!(wrong_password.status_code(), StatusCode::UNAUTHORIZED);

    let unknown_email = app
        .server
        .post("/api/auth/login")
        .json(&json!({
            "email": unique_email("nobody"),
            "password": TEST_PASSWORD
        }))
        .await;
    assert_eq!(unknown_email.status_code(), StatusCode::UNAUTHORIZED);

    // Both failures look the same to the caller
    let a: Value = wrong_password.json();
    let b: Value = unknown_email.json();
    assert_eq!(a["message"], b["message"]);
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = spawn_app();

    let missing = app.server.get("/api/auth/me").await;
    assert_eq!(missing.status_code(), StatusCode::UNAUTHORIZED);

    let garbage = app
        .server
        .get("/api/auth/me")
        .authorization_bearer("not-a-jwt")
        .await;
    assert_eq!(garbage.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_profile() {
    let app = spawn_app();
    let user = register_user(&app.server, "Linus").await;

    let response = app
        .server
        .get("/api/auth/me")
        .authorization_bearer(&user.token)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["user"]["id"], user.id.to_string());
    assert_eq!(body["user"]["name"], user.name);
}

#[tokio::test]
async fn test_update_profile() {
    let app = spawn_app();
    let user = register_user(&app.server, "Linus").await;
    let new_email = unique_email("Torvalds");

    let response = app
        .server
        .put("/api/user/profile")
        .authorization_bearer(&user.token)
        .json(&json!({ "name": "Linus T", "email": new_email }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["message"], "Profile updated successfully");
    assert_eq!(body["user"]["name"], "Linus T");
    assert_eq!(body["user"]["email"], new_email);

    // The old token still identifies the same account
    let profile: Value = app
        .server
        .get("/api/user/profile")
        .authorization_bearer(&user.token)
        .await
        .json();
    assert_eq!(profile["user"]["email"], new_email);
}

#[tokio::test]
async fn test_update_profile_email_taken() {
    let app = spawn_app();
    let first = register_user(&app.server, "First").await;
    let second = register_user(&app.server, "Second").await;

    let response = app
        .server
        .put("/api/user/profile")
        .authorization_bearer(&second.token)
        .json(&json!({ "name": second.name, "email": first.email }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = spawn_app();

    let response = app.server.get("/api/does-not-exist").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["message"], "Route not found");
}
