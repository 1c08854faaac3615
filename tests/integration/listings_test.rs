//! Listing API integration tests
//!
//! Browse filters, owner-only edits, multipart creation and image uploads
//! through a mocked image service.

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use ecofinds::shared::marketplace::Category;
use ecofinds::shared::ImageServiceConfig;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{
    create_listing, create_listing_in, register_user, spawn_app, spawn_app_with, test_config,
};

fn listing_form(title: &str, category: &str, price: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("title", title)
        .add_text("description", "Works fine, minor scratches")
        .add_text("category", category)
        .add_text("price", price)
}

fn png_part() -> Part {
    Part::bytes(vec![0x89, b'P', b'N', b'G', 0, 1, 2, 3])
        .file_name("lamp.png")
        .mime_type("image/png")
}

fn titles(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .expect("data is not an array")
        .iter()
        .filter_map(|l| l["title"].as_str().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn test_browse_filters_and_hides_unavailable() {
    let app = spawn_app();
    let seller = register_user(&app.server, "Seller").await;

    create_listing_in(&app.state, seller.id, "Desk Lamp", Category::Home, 12.0).await;
    create_listing_in(&app.state, seller.id, "Road Bike", Category::Sports, 150.0).await;
    let mut sold = create_listing_in(&app.state, seller.id, "Table Lamp", Category::Home, 8.0).await;
    sold.is_available = false;
    app.state.store.save_listing(&sold).await.unwrap();

    let all: Value = app.server.get("/api/products").await.json();
    assert_eq!(all["count"], 2);

    let lamps: Value = app
        .server
        .get("/api/products")
        .add_query_param("search", "LAMP")
        .await
        .json();
    assert_eq!(titles(&lamps), vec!["Desk Lamp".to_string()]);

    let sports: Value = app
        .server
        .get("/api/products")
        .add_query_param("category", "Sports")
        .await
        .json();
    assert_eq!(titles(&sports), vec!["Road Bike".to_string()]);
    assert_eq!(sports["data"][0]["owner"]["name"], "Seller");
}

#[tokio::test]
async fn test_browse_rejects_unknown_category() {
    let app = spawn_app();

    let response = app
        .server
        .get("/api/products")
        .add_query_param("category", "spaceships")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_browse_paginates() {
    let app = spawn_app();
    let seller = register_user(&app.server, "Seller").await;
    for i in 0..5 {
        create_listing(&app.state, seller.id, &format!("Book {}", i), 3.0).await;
    }

    let page: Value = app
        .server
        .get("/api/products")
        .add_query_param("page", 2)
        .add_query_param("limit", 2)
        .await
        .json();
    assert_eq!(page["count"], 2);

    let last: Value = app
        .server
        .get("/api/products")
        .add_query_param("page", 3)
        .add_query_param("limit", 2)
        .await
        .json();
    assert_eq!(last["count"], 1);
}

#[tokio::test]
async fn test_get_listing_not_found() {
    let app = spawn_app();

    let missing = app.server.get(&format!("/api/products/{}", Uuid::new_v4())).await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

    // Malformed ids are treated like unknown ones
    let malformed = app.server.get("/api/products/not-a-uuid").await;
    assert_eq!(malformed.status_code(), StatusCode::NOT_FOUND);
    let body: Value = malformed.json();
    assert_eq!(body["message"], "Product not found");
}

#[tokio::test]
async fn test_create_listing_without_image() {
    let app = spawn_app();
    let seller = register_user(&app.server, "Seller").await;

    let response = app
        .server
        .post("/api/products")
        .authorization_bearer(&seller.token)
        .multipart(listing_form("Free Chair", "furniture", "0"))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["message"], "Product created successfully");
    assert_eq!(body["data"]["title"], "Free Chair");
    assert_eq!(body["data"]["category"], "furniture");
    assert_eq!(body["data"]["price"], 0.0);
    assert_eq!(body["data"]["isAvailable"], true);
    assert_eq!(body["data"]["ownerId"], seller.id.to_string());

    let mine: Value = app
        .server
        .get("/api/products/user/my-products")
        .authorization_bearer(&seller.token)
        .await
        .json();
    assert_eq!(mine["count"], 1);
}

#[tokio::test]
async fn test_create_listing_validation() {
    let app = spawn_app();
    let seller = register_user(&app.server, "Seller").await;

    let negative = app
        .server
        .post("/api/products")
        .authorization_bearer(&seller.token)
        .multipart(listing_form("Chair", "furniture", "-5"))
        .await;
    assert_eq!(negative.status_code(), StatusCode::BAD_REQUEST);

    let missing_title = app
        .server
        .post("/api/products")
        .authorization_bearer(&seller.token)
        .multipart(
            MultipartForm::new()
                .add_text("description", "No title")
                .add_text("category", "other")
                .add_text("price", "3"),
        )
        .await;
    assert_eq!(missing_title.status_code(), StatusCode::BAD_REQUEST);

    let anonymous = app
        .server
        .post("/api/products")
        .multipart(listing_form("Chair", "furniture", "5"))
        .await;
    assert_eq!(anonymous.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_image_upload_without_service() {
    let app = spawn_app();
    let seller = register_user(&app.server, "Seller").await;

    let response = app
        .server
        .post("/api/products")
        .authorization_bearer(&seller.token)
        .multipart(listing_form("Lamp", "home", "10").add_part("image", png_part()))
        .await;

    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["message"], "Image uploads are not configured");
}

#[tokio::test]
async fn test_invalid_image_without_service_is_bad_request() {
    let app = spawn_app();
    let seller = register_user(&app.server, "Seller").await;

    let executable = Part::bytes(vec![0x4d, 0x5a, 0x90, 0x00])
        .file_name("virus.exe")
        .mime_type("application/octet-stream");
    let response = app
        .server
        .post("/api/products")
        .authorization_bearer(&seller.token)
        .multipart(listing_form("Totally a lamp", "home", "10").add_part("image", executable))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "Only image files are allowed");
    assert_eq!(app.server.get("/api/products").await.json::<Value>()["count"], 0);
}

#[tokio::test]
async fn test_image_upload_through_service() {
    let image_service = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(header("authorization", "Bearer image-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "secure_url": "https://cdn.example.com/ecofinds/lamp.png"
        })))
        .expect(1)
        .mount(&image_service)
        .await;

    let mut config = test_config();
    config.image_service = Some(ImageServiceConfig {
        url: format!("{}/upload", image_service.uri()),
        api_key: Some("image-key".to_string()),
        folder: "ecofinds".to_string(),
    });
    let app = spawn_app_with(config);
    let seller = register_user(&app.server, "Seller").await;

    let response = app
        .server
        .post("/api/products")
        .authorization_bearer(&seller.token)
        .multipart(listing_form("Lamp", "home", "10").add_part("image", png_part()))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["data"]["imageUrl"], "https://cdn.example.com/ecofinds/lamp.png");
}

#[tokio::test]
async fn test_image_upload_rejects_non_images() {
    let image_service = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&image_service)
        .await;

    let mut config = test_config();
    config.image_service = Some(ImageServiceConfig {
        url: image_service.uri(),
        api_key: None,
        folder: "ecofinds".to_string(),
    });
    let app = spawn_app_with(config);
    let seller = register_user(&app.server, "Seller").await;

    let text_file = Part::bytes(b"hello".to_vec())
        .file_name("notes.txt")
        .mime_type("text/plain");
    let response = app
        .server
        .post("/api/products")
        .authorization_bearer(&seller.token)
        .multipart(listing_form("Notes", "books", "1").add_part("image", text_file))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_only_owner_can_modify() {
    let app = spawn_app();
    let seller = register_user(&app.server, "Seller").await;
    let stranger = register_user(&app.server, "Stranger").await;
    let listing = create_listing(&app.state, seller.id, "Guitar", 80.0).await;
    let url = format!("/api/products/{}", listing.id);

    let update = app
        .server
        .put(&url)
        .authorization_bearer(&stranger.token)
        .multipart(MultipartForm::new().add_text("price", "1"))
        .await;
    assert_eq!(update.status_code(), StatusCode::FORBIDDEN);

    let delete = app
        .server
        .delete(&url)
        .authorization_bearer(&stranger.token)
        .await;
    assert_eq!(delete.status_code(), StatusCode::FORBIDDEN);

    let own_update = app
        .server
        .put(&url)
        .authorization_bearer(&seller.token)
        .multipart(MultipartForm::new().add_text("price", "75.5"))
        .await;
    assert_eq!(own_update.status_code(), StatusCode::OK);
    let body: Value = own_update.json();
    assert_eq!(body["data"]["price"], 75.5);
    // Untouched fields keep their values
    assert_eq!(body["data"]["title"], "Guitar");

    let own_delete = app
        .server
        .delete(&url)
        .authorization_bearer(&seller.token)
        .await;
    assert_eq!(own_delete.status_code(), StatusCode::OK);
    assert_eq!(app.server.get(&url).await.status_code(), StatusCode::NOT_FOUND);
}
