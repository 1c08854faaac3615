/**
 * Listing Handlers
 *
 * Browse and read routes are public. Create, update, delete and
 * "my products" require a bearer token, and update/delete are restricted to
 * the listing's owner.
 *
 * Create and update take `multipart/form-data` with the text fields
 * `title`, `description`, `category`, `price` and an optional `image` file.
 * Every listing in a response carries its owner's name and email.
 */
use std::collections::HashMap;

use axum::{
    extract::{
        multipart::MultipartRejection, rejection::QueryRejection, Multipart, Path, Query, State,
    },
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::error::{path_id, ApiResult, BackendError};
use crate::backend::listings::images::ImageUpload;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::backend::store::DynStore;
use crate::shared::marketplace::{Listing, ListingForm, ListingParams, ListingQuery, Participant};

/// A listing with its owner resolved
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingView {
    #[serde(flatten)]
    pub listing: Listing,
    pub owner: Option<Participant>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<ListingView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: ListingView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub success: bool,
    pub message: String,
}

async fn with_owners(store: &DynStore, listings: Vec<Listing>) -> ApiResult<Vec<ListingView>> {
    let mut owner_ids: Vec<Uuid> = listings.iter().map(|l| l.owner_id).collect();
    owner_ids.sort_unstable();
    owner_ids.dedup();

    let owners: HashMap<Uuid, Participant> = store
        .accounts_by_ids(&owner_ids)
        .await?
        .into_iter()
        .map(|account| (account.id, account.participant()))
        .collect();

    Ok(listings
        .into_iter()
        .map(|listing| ListingView {
            owner: owners.get(&listing.owner_id).cloned(),
            listing,
        })
        .collect())
}

async fn with_owner(store: &DynStore, listing: Listing) -> ApiResult<ListingView> {
    let owner = store
        .account_by_id(listing.owner_id)
        .await?
        .map(|account| account.participant());
    Ok(ListingView { listing, owner })
}

fn field_error(e: axum::extract::multipart::MultipartError) -> BackendError {
    BackendError::handler(e.status(), e.body_text())
}

/// Split a multipart body into the text fields and the optional image
async fn read_listing_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(ListingForm, Option<ImageUpload>)> {
    let mut multipart = multipart.map_err(|e| BackendError::bad_request(e.body_text()))?;
    let mut form = ListingForm::default();
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(field_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(field_error)?;
                // Browsers send an empty part when no file was picked
                if !(file_name.is_empty() && bytes.is_empty()) {
                    image = Some(ImageUpload {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
            }
            "title" | "description" | "category" | "price" => {
                let value = Some(field.text().await.map_err(field_error)?);
                match name.as_str() {
                    "title" => form.title = value,
                    "description" => form.description = value,
                    "category" => form.category = value,
                    _ => form.price = value,
                }
            }
            other => tracing::debug!("[Listings] Ignoring form field {}", other),
        }
    }

    Ok((form, image))
}

async fn store_image(state: &AppState, image: Option<ImageUpload>) -> ApiResult<Option<String>> {
    let Some(image) = image else {
        return Ok(None);
    };
    // Bad files are the client's fault whether or not uploads are configured
    image.validate()?;
    let uploader = state.images.as_ref().ok_or_else(|| {
        tracing::warn!("[Listings] Image upload attempted without an image service");
        BackendError::unavailable("Image uploads are not configured")
    })?;
    Ok(Some(uploader.upload(image).await?))
}

async fn owned_listing(state: &AppState, raw_id: &str, account: Uuid) -> ApiResult<Listing> {
    let id = path_id(raw_id, "Product not found")?;
    let listing = state
        .store
        .listing_by_id(id)
        .await?
        .ok_or_else(|| BackendError::not_found("Product not found"))?;

    if !listing.is_owned_by(account) {
        tracing::warn!("[Listings] {} tried to modify listing {} it does not own", account, id);
        return Err(BackendError::forbidden("Not authorized"));
    }
    Ok(listing)
}

/// GET /api/products
///
/// Available listings only, newest first. Query: `search`, `category`,
/// `page` (default 1), `limit` (default 20, max 100).
pub async fn browse_listings(
    State(store): State<DynStore>,
    params: Result<Query<ListingParams>, QueryRejection>,
) -> ApiResult<Json<ListingListResponse>> {
    let Query(params) = params?;
    let query = ListingQuery::from_params(params)?;
    let listings = store.search_listings(&query).await?;
    tracing::debug!("[Listings] Browse {:?} matched {}", query, listings.len());

    let data = with_owners(&store, listings).await?;
    Ok(Json(ListingListResponse {
        success: true,
        count: data.len(),
        data,
    }))
}

/// GET /api/products/{id}
pub async fn get_listing(
    State(store): State<DynStore>,
    Path(id): Path<String>,
) -> ApiResult<Json<ListingResponse>> {
    let id = path_id(&id, "Product not found")?;
    let listing = store
        .listing_by_id(id)
        .await?
        .ok_or_else(|| BackendError::not_found("Product not found"))?;

    Ok(Json(ListingResponse {
        success: true,
        message: None,
        data: with_owner(&store, listing).await?,
    }))
}

/// POST /api/products
pub async fn create_listing(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<ListingResponse>)> {
    let (form, image) = read_listing_form(multipart).await?;
    let mut input = form.into_new_listing()?;
    input.image_url = store_image(&state, image).await?;

    let listing = state
        .store
        .insert_listing(Listing::new(user.user_id, input))
        .await?;
    tracing::info!("[Listings] Listing {} created by {}", listing.id, user.user_id);

    Ok((
        StatusCode::CREATED,
        Json(ListingResponse {
            success: true,
            message: Some("Product created successfully".to_string()),
            data: with_owner(&state.store, listing).await?,
        }),
    ))
}

/// GET /api/products/user/my-products
pub async fn my_listings(
    State(store): State<DynStore>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<ListingListResponse>> {
    let listings = store.listings_by_owner(user.user_id).await?;
    let data = with_owners(&store, listings).await?;
    Ok(Json(ListingListResponse {
        success: true,
        count: data.len(),
        data,
    }))
}

/// PUT /api/products/{id}
///
/// Only the supplied fields change. A new image replaces the old URL.
pub async fn update_listing(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ListingResponse>> {
    let mut listing = owned_listing(&state, &id, user.user_id).await?;

    let (form, image) = read_listing_form(multipart).await?;
    let mut update = form.into_update()?;
    update.image_url = store_image(&state, image).await?;

    listing.apply(update);
    state.store.save_listing(&listing).await?;
    tracing::info!("[Listings] Listing {} updated", listing.id);

    Ok(Json(ListingResponse {
        success: true,
        message: Some("Product updated successfully".to_string()),
        data: with_owner(&state.store, listing).await?,
    }))
}

/// DELETE /api/products/{id}
pub async fn delete_listing(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<DeletedResponse>> {
    let listing = owned_listing(&state, &id, user.user_id).await?;

    if !state.store.delete_listing(listing.id).await? {
        return Err(BackendError::not_found("Product not found"));
    }
    tracing::info!("[Listings] Listing {} deleted", listing.id);

    Ok(Json(DeletedResponse {
        success: true,
        message: "Product deleted successfully".to_string(),
    }))
}
