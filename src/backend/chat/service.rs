/**
 * Chat Operations
 *
 * Conversation and message operations shared by the REST handlers and the
 * real-time session. Each operation writes to the store first, then
 * publishes to the hub on a best-effort basis.
 *
 * `origin` names the socket session that triggered an operation. Its own
 * echo is suppressed; REST callers pass `None`.
 */
use std::collections::HashMap;

use uuid::Uuid;

use crate::backend::error::{ApiResult, BackendError};
use crate::backend::realtime::{Room, SessionId};
use crate::backend::server::state::AppState;
use crate::backend::store::DynStore;
use crate::shared::marketplace::{
    validate_content, ChatMessage, Conversation, ConversationView, ListingSummary, MessageState,
};
use crate::shared::{ServerEvent, SharedError};

/// Load a conversation the caller takes part in
///
/// * `404` - no such conversation
/// * `403` - caller is not a participant
pub async fn load_participant_conversation(
    store: &DynStore,
    chat_id: Uuid,
    account: Uuid,
) -> ApiResult<Conversation> {
    let conversation = store
        .conversation(chat_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Chat not found"))?;

    if !conversation.has_participant(account) {
        tracing::warn!("[Chat] {} denied access to chat {}", account, chat_id);
        return Err(BackendError::forbidden("Access denied"));
    }
    Ok(conversation)
}

/// Resolve participants and listing summaries for a batch of conversations
pub async fn build_views(
    store: &DynStore,
    conversations: Vec<Conversation>,
    with_messages: bool,
) -> ApiResult<Vec<ConversationView>> {
    let mut account_ids: Vec<Uuid> = conversations
        .iter()
        .flat_map(|c| c.participants)
        .collect();
    account_ids.sort_unstable();
    account_ids.dedup();

    let mut listing_ids: Vec<Uuid> = conversations.iter().map(|c| c.listing_id).collect();
    listing_ids.sort_unstable();
    listing_ids.dedup();

    let accounts: HashMap<Uuid, _> = store
        .accounts_by_ids(&account_ids)
        .await?
        .into_iter()
        .map(|account| (account.id, account.participant()))
        .collect();
    let listings: HashMap<Uuid, ListingSummary> = store
        .listings_by_ids(&listing_ids)
        .await?
        .iter()
        .map(|listing| (listing.id, ListingSummary::from(listing)))
        .collect();

    Ok(conversations
        .into_iter()
        .map(|conversation| ConversationView {
            id: conversation.id,
            participants: conversation
                .participants
                .iter()
                .filter_map(|id| accounts.get(id).cloned())
                .collect(),
            product: listings.get(&conversation.listing_id).cloned(),
            messages: with_messages.then_some(conversation.messages),
            last_message: conversation.last_message,
            updated_at: conversation.updated_at,
        })
        .collect())
}

async fn build_view(store: &DynStore, conversation: Conversation) -> ApiResult<ConversationView> {
    build_views(store, vec![conversation], true)
        .await?
        .pop()
        .ok_or_else(|| BackendError::internal("conversation view was not built"))
}

/// Find or create the conversation between the requester and the owner
/// of `listing_id`
pub async fn start_conversation(
    state: &AppState,
    requester: Uuid,
    listing_id: Uuid,
) -> ApiResult<ConversationView> {
    let listing = state
        .store
        .listing_by_id(listing_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Product not found"))?;

    if listing.is_owned_by(requester) {
        return Err(SharedError::rule("You cannot chat with yourself").into());
    }

    let conversation = state
        .store
        .find_or_create_conversation(listing.id, requester, listing.owner_id)
        .await?;
    tracing::info!(
        "[Chat] Conversation {} for listing {} between {} and {}",
        conversation.id,
        listing.id,
        requester,
        listing.owner_id
    );

    build_view(&state.store, conversation).await
}

/// Conversations of `account`, most recently updated first, without history
pub async fn list_conversations(state: &AppState, account: Uuid) -> ApiResult<Vec<ConversationView>> {
    let conversations = state.store.conversations_for(account).await?;
    build_views(&state.store, conversations, false).await
}

/// Full history of a conversation. Inbound messages become `seen`.
pub async fn open_conversation(
    state: &AppState,
    viewer: Uuid,
    chat_id: Uuid,
) -> ApiResult<ConversationView> {
    let mut conversation = load_participant_conversation(&state.store, chat_id, viewer).await?;

    let changed = state
        .store
        .advance_inbound(chat_id, viewer, MessageState::Seen)
        .await?;
    if !changed.is_empty() {
        conversation.advance_inbound(viewer, MessageState::Seen);
        publish_seen(state, &conversation, viewer, changed, None);
    }

    build_view(&state.store, conversation).await
}

/// Mark inbound messages as seen. Returns the ids that changed.
pub async fn mark_seen(
    state: &AppState,
    viewer: Uuid,
    chat_id: Uuid,
    origin: Option<SessionId>,
) -> ApiResult<Vec<Uuid>> {
    let conversation = load_participant_conversation(&state.store, chat_id, viewer).await?;
    let changed = state
        .store
        .advance_inbound(chat_id, viewer, MessageState::Seen)
        .await?;
    if !changed.is_empty() {
        publish_seen(state, &conversation, viewer, changed.clone(), origin);
    }
    Ok(changed)
}

fn publish_seen(
    state: &AppState,
    conversation: &Conversation,
    viewer: Uuid,
    message_ids: Vec<Uuid>,
    origin: Option<SessionId>,
) {
    let mut rooms = vec![Room::Conversation(conversation.id)];
    if let Some(other) = conversation.other_participant(viewer) {
        rooms.push(Room::Personal(other));
    }
    tracing::debug!("[Chat] {} saw {} messages in {}", viewer, message_ids.len(), conversation.id);
    state.hub.publish_many(
        &rooms,
        origin,
        ServerEvent::MessagesSeen {
            chat_id: conversation.id,
            user_id: viewer,
            message_ids,
        },
    );
}

/// Persist a message and relay it to the conversation
///
/// The message is stored as `sent`. When the recipient is online its
/// inbound messages advance to `delivered` right away.
pub async fn send_message(
    state: &AppState,
    sender: Uuid,
    chat_id: Uuid,
    raw_content: &str,
    origin: Option<SessionId>,
) -> ApiResult<ChatMessage> {
    let content = validate_content(raw_content)?;
    let conversation = load_participant_conversation(&state.store, chat_id, sender).await?;

    let mut message = ChatMessage::new(sender, content);
    state.store.append_message(chat_id, &message).await?;
    tracing::info!("[Chat] Message {} stored in {}", message.id, chat_id);

    let recipient = conversation.other_participant(sender);
    let mut delivered = Vec::new();

    if let Some(recipient) = recipient.filter(|r| state.presence.is_online(*r)) {
        match state
            .store
            .advance_inbound(chat_id, recipient, MessageState::Delivered)
            .await
        {
            Ok(ids) => delivered = ids,
            Err(e) => tracing::warn!("[Chat] Delivery update failed for {}: {}", chat_id, e),
        }
    }
    if delivered.contains(&message.id) {
        message.status.advance_to(MessageState::Delivered);
    }

    let mut rooms = vec![Room::Conversation(chat_id)];
    rooms.extend(recipient.map(Room::Personal));
    state.hub.publish_many(
        &rooms,
        origin,
        ServerEvent::NewMessage {
            chat_id,
            message: message.clone(),
        },
    );

    if let (Some(recipient), false) = (recipient, delivered.is_empty()) {
        state.hub.publish_many(
            &[Room::Conversation(chat_id), Room::Personal(sender)],
            None,
            ServerEvent::MessagesDelivered {
                chat_id,
                user_id: recipient,
                message_ids: delivered,
            },
        );
    }

    Ok(message)
}
