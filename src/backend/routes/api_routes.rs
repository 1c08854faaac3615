/**
 * API Route Configuration
 *
 * This module defines the `/api` routes:
 *
 * ## Authentication
 * - `POST /api/auth/register` - Account registration
 * - `POST /api/auth/login` - Login
 * - `GET /api/auth/me` - Current account (requires authentication)
 *
 * ## Account
 * - `GET|PUT /api/user/profile` - Profile read/update
 * - `POST /api/user/purchase` - Purchase listings
 * - `GET /api/user/purchases` - Purchase history
 *
 * ## Listings
 * - `GET /api/products` - Browse (public)
 * - `GET /api/products/{id}` - One listing (public)
 * - `POST /api/products` - Create
 * - `GET /api/products/user/my-products` - Caller's listings
 * - `PUT|DELETE /api/products/{id}` - Owner update/delete
 *
 * ## Cart
 * - `POST /api/cart/add`, `GET /api/cart`, `DELETE /api/cart/remove/{productId}`
 *
 * ## Chat
 * - `POST /api/chat/start`, `GET /api/chat/my-chats`,
 *   `GET /api/chat/{chatId}`, `POST /api/chat/message`
 */
use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};

use crate::backend::auth::{get_me, get_profile, login, register, update_profile};
use crate::backend::cart::{add_to_cart, get_cart, purchase, purchases, remove_from_cart};
use crate::backend::chat::{get_chat, my_chats, send_chat_message, start_chat};
use crate::backend::listings::{
    browse_listings, create_listing, delete_listing, get_listing, my_listings, update_listing,
};
use crate::backend::middleware::auth_middleware;
use crate::backend::server::state::AppState;

/// Configure API routes
///
/// Protected method routes carry `auth_middleware` as a route layer, so a
/// path can mix public and protected methods (`/api/products/{id}`).
pub fn configure_api_routes(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
    let auth = from_fn_with_state(app_state.clone(), auth_middleware);

    router
        // Authentication endpoints
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(get_me).route_layer(auth.clone()))
        // Account endpoints
        .route(
            "/api/user/profile",
            get(get_profile)
                .put(update_profile)
                .route_layer(auth.clone()),
        )
        .route("/api/user/purchase", post(purchase).route_layer(auth.clone()))
        .route("/api/user/purchases", get(purchases).route_layer(auth.clone()))
        // Listing endpoints
        .route(
            "/api/products",
            get(browse_listings).merge(post(create_listing).route_layer(auth.clone())),
        )
        .route(
            "/api/products/user/my-products",
            get(my_listings).route_layer(auth.clone()),
        )
        .route(
            "/api/products/{id}",
            get(get_listing).merge(
                axum::routing::put(update_listing)
                    .delete(delete_listing)
                    .route_layer(auth.clone()),
            ),
        )
        // Cart endpoints
        .route("/api/cart", get(get_cart).route_layer(auth.clone()))
        .route("/api/cart/add", post(add_to_cart).route_layer(auth.clone()))
        .route(
            "/api/cart/remove/{product_id}",
            delete(remove_from_cart).route_layer(auth.clone()),
        )
        // Chat endpoints
        .route("/api/chat/start", post(start_chat).route_layer(auth.clone()))
        .route("/api/chat/my-chats", get(my_chats).route_layer(auth.clone()))
        .route(
            "/api/chat/message",
            post(send_chat_message).route_layer(auth.clone()),
        )
        .route("/api/chat/{chat_id}", get(get_chat).route_layer(auth))
}
