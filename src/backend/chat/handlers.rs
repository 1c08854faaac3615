//! Chat REST handlers
//!
//! Every route here sits behind the auth middleware. The real-time socket
//! uses the same operations from [`super::service`].

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::backend::chat::service;
use crate::backend::error::{path_id, ApiJson, ApiResult, BackendError};
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::marketplace::{ChatMessage, ConversationView, SendMessageRequest, StartChatRequest};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    pub chat: ConversationView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatListResponse {
    pub success: bool,
    pub chats: Vec<ConversationView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: ChatMessage,
}

/// POST /api/chat/start
pub async fn start_chat(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(request): ApiJson<StartChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let listing_id = request
        .product_id
        .ok_or_else(|| BackendError::bad_request("Product ID is required"))?;

    let chat = service::start_conversation(&state, user.user_id, listing_id).await?;
    Ok(Json(ChatResponse { success: true, chat }))
}

/// GET /api/chat/my-chats
pub async fn my_chats(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<ChatListResponse>> {
    let chats = service::list_conversations(&state, user.user_id).await?;
    Ok(Json(ChatListResponse {
        success: true,
        chats,
    }))
}

/// GET /api/chat/{chatId}
///
/// Returns the full history and marks the caller's inbound messages seen.
pub async fn get_chat(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(chat_id): Path<String>,
) -> ApiResult<Json<ChatResponse>> {
    let chat_id = path_id(&chat_id, "Chat not found")?;
    let chat = service::open_conversation(&state, user.user_id, chat_id).await?;
    Ok(Json(ChatResponse { success: true, chat }))
}

/// POST /api/chat/message
pub async fn send_chat_message(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(request): ApiJson<SendMessageRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let message =
        service::send_message(&state, user.user_id, request.chat_id, &request.content, None).await?;
    Ok(Json(MessageResponse {
        success: true,
        message,
    }))
}
