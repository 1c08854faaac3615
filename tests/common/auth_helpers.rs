//! Authentication test helpers
//!
//! Provides utilities for registering test users through the API.

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use uuid::Uuid;

/// Password used for every test account
pub const TEST_PASSWORD: &str = "test_password_123";

/// Test user credentials
pub struct TestUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub token: String,
}

/// Unique email for `name`
pub fn unique_email(name: &str) -> String {
    format!("{}_{}@example.com", name.to_lowercase(), Uuid::new_v4().simple())
}

/// Register a user with a unique email
pub async fn register_user(server: &TestServer, name: &str) -> TestUser {
    register_with_email(server, name, &unique_email(name)).await
}

/// Register a user with a fixed email
pub async fn register_with_email(server: &TestServer, name: &str, email: &str) -> TestUser {
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "name": name,
            "email": email,
            "password": TEST_PASSWORD,
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let body: Value = response.json();
    TestUser {
        id: body["user"]["id"]
            .as_str()
            .and_then(|id| id.parse().ok())
            .expect("register response has no user id"),
        name: name.to_string(),
        email: body["user"]["email"]
            .as_str()
            .expect("register response has no email")
            .to_string(),
        token: body["token"]
            .as_str()
            .expect("register response has no token")
            .to_string(),
    }
}
