/**
 * WebSocket Endpoint
 *
 * This module implements `GET /ws`, the real-time channel for chat,
 * presence and typing.
 *
 * # Authentication
 *
 * The upgrade request carries the JWT as `?token=` (browsers cannot set
 * headers on a WebSocket handshake), or as a bearer header. A missing or
 * invalid token is rejected with 401 before the upgrade.
 *
 * # Framing
 *
 * Every text frame is one JSON event, `{"event": ..., "data": {...}}`, in
 * both directions. Unknown or malformed frames are logged and ignored.
 * Errors from event handlers are logged and swallowed; the socket stays
 * open.
 */
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::HeaderMap,
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use uuid::Uuid;

use crate::backend::error::{ApiResult, BackendError};
use crate::backend::middleware::{authenticate, bearer_token};
use crate::backend::realtime::session::RealtimeSession;
use crate::backend::server::state::AppState;
use crate::shared::ClientEvent;

#[derive(Debug, Default, Deserialize)]
pub struct SocketParams {
    #[serde(default)]
    pub token: Option<String>,
}

/// Handle a WebSocket upgrade (GET /ws)
///
/// # Errors
///
/// * `401 Unauthorized` - Missing or invalid token
///
/// # Example Request
///
/// ```http
/// GET /ws?token=eyJhbGciOi... HTTP/1.1
/// Connection: Upgrade
/// Upgrade: websocket
/// ```
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<SocketParams>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let token = params
        .token
        .as_deref()
        .filter(|token| !token.is_empty())
        .or_else(|| bearer_token(&headers))
        .ok_or_else(|| BackendError::unauthorized("Not authorized, no token"))?;

    let user = authenticate(&state, token).await?;
    tracing::info!("[Realtime] Upgrade accepted for {}", user.user_id);

    Ok(ws.on_upgrade(move |socket| run_session(socket, state, user.user_id)))
}

async fn run_session(socket: WebSocket, state: AppState, user_id: Uuid) {
    let (mut session, mut events) = RealtimeSession::open(state, user_id);
    let session_id = session.id();
    let (mut sink, mut stream) = socket.split();

    tracing::info!("[Realtime] Session {} connected for {}", session_id, user_id);

    let writer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("[Realtime] Failed to serialize {}: {}", event.name(), e);
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!("[Realtime] Session {} read error: {}", session_id, e);
                break;
            }
        };

        match frame {
            Message::Text(text) => match serde_json::from_str::<ClientEvent>(text.as_str()) {
                Ok(event) => {
                    if let Err(e) = session.handle(event).await {
                        tracing::warn!("[Realtime] Session {} event failed: {}", session_id, e.detail());
                    }
                }
                Err(e) => {
                    tracing::warn!("[Realtime] Session {} sent an invalid frame: {}", session_id, e);
                }
            },
            Message::Close(_) => break,
            // Pings are answered by axum
            _ => {}
        }
    }

    session.close();
    writer.abort();
    tracing::info!("[Realtime] Session {} disconnected", session_id);
}
