//! The relay channel WebSocket endpoint.
//!
//! Clients connect once, then join and leave per-conversation broadcast
//! groups. New-message and read-receipt events published by the REST
//! handlers are mirrored to every socket joined to the conversation.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::HeaderMap,
    response::Response,
    routing::get,
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::GatewayError;
use crate::middleware::{bearer_token, cookie_token};
use crate::state::GatewayState;
use saferoof_auth::AuthUser;
use saferoof_chat::{ClientEvent, ServerEvent};

const OUTBOUND_QUEUE: usize = 64;

#[derive(Debug, Deserialize)]
pub struct WebSocketQuery {
    token: Option<String>,
}

/// Create the relay WebSocket routes
pub fn create_websocket_routes() -> Router<Arc<GatewayState>> {
    Router::new().route("/ws", get(relay_websocket_handler))
}

/// Relay WebSocket connection handler
pub async fn relay_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<WebSocketQuery>,
    headers: HeaderMap,
) -> Result<Response, GatewayError> {
    let token = query
        .token
        .or_else(|| bearer_token(&headers))
        .or_else(|| cookie_token(&headers))
        .ok_or_else(|| {
            GatewayError::AuthenticationFailed("Missing authentication token".to_string())
        })?;

    let user = state
        .authenticator
        .verify_token(&token)
        .map_err(|e| GatewayError::AuthenticationFailed(format!("Invalid token: {}", e)))?;

    Ok(ws.on_upgrade(move |socket| handle_relay_socket(socket, state, user)))
}

/// Drive one relay connection until the client goes away
async fn handle_relay_socket(socket: WebSocket, state: Arc<GatewayState>, user: AuthUser) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Outbound queue: subscription forwarders and the event handler both
    // feed it, a single task drains it onto the socket.
    let (out_tx, mut out_rx) = mpsc::channel::<ServerEvent>(OUTBOUND_QUEUE);

    let send_task = tokio::spawn(async move {
        while let Some(event) = out_rx.recv().await {
            let Ok(text) = serde_json::to_string(&event) else {
                continue;
            };
            if ws_sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let _ = out_tx.send(ServerEvent::Hello { user_id: user.id }).await;
    debug!(user_id = user.id, "relay socket connected");

    // One forwarder task per joined conversation
    let mut subscriptions: HashMap<i64, JoinHandle<()>> = HashMap::new();

    while let Some(message) = ws_receiver.next().await {
        let Ok(message) = message else {
            break;
        };

        match message {
            Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => {
                    handle_client_event(event, &state, &user, &out_tx, &mut subscriptions).await;
                }
                Err(error) => {
                    let _ = out_tx
                        .send(ServerEvent::Error {
                            error: "BAD_EVENT".to_string(),
                            message: format!("unrecognized event: {error}"),
                        })
                        .await;
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    // Tear down: stop forwarders, prune idle channels, stop the sender
    for (conversation_id, handle) in subscriptions {
        handle.abort();
        state.hub.prune(conversation_id).await;
    }
    drop(out_tx);
    let _ = send_task.await;

    debug!(user_id = user.id, "relay socket disconnected");
}

/// Handle one parsed client event
async fn handle_client_event(
    event: ClientEvent,
    state: &Arc<GatewayState>,
    user: &AuthUser,
    out_tx: &mpsc::Sender<ServerEvent>,
    subscriptions: &mut HashMap<i64, JoinHandle<()>>,
) {
    match event {
        ClientEvent::Ping => {
            let _ = out_tx.send(ServerEvent::Pong).await;
        }
        ClientEvent::Subscribe { conversation_id } => {
            // membership gate, same rule as the REST endpoints
            if state
                .conversations
                .require_participant(conversation_id, user.id)
                .await
                .is_err()
            {
                let _ = out_tx
                    .send(ServerEvent::Error {
                        error: "ACCESS_DENIED".to_string(),
                        message: "You are not a participant of this conversation".to_string(),
                    })
                    .await;
                return;
            }

            if subscriptions.contains_key(&conversation_id) {
                let _ = out_tx.send(ServerEvent::Subscribed { conversation_id }).await;
                return;
            }

            let receiver = state.hub.subscribe(conversation_id).await;
            let forwarder = spawn_forwarder(receiver, out_tx.clone(), conversation_id);
            subscriptions.insert(conversation_id, forwarder);

            let _ = out_tx.send(ServerEvent::Subscribed { conversation_id }).await;
        }
        ClientEvent::Unsubscribe { conversation_id } => {
            if let Some(handle) = subscriptions.remove(&conversation_id) {
                handle.abort();
                state.hub.prune(conversation_id).await;
            }
            let _ = out_tx
                .send(ServerEvent::Unsubscribed { conversation_id })
                .await;
        }
    }
}

/// Forward relay events for one conversation onto the connection's
/// outbound queue until the subscription ends.
fn spawn_forwarder(
    mut receiver: broadcast::Receiver<ServerEvent>,
    out_tx: mpsc::Sender<ServerEvent>,
    conversation_id: i64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if out_tx.send(event).await.is_err() {
                        break;
                    }
                }
                // at-most-once semantics: a lagging receiver just loses
                // the dropped events and keeps going
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(conversation_id, missed, "relay subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
