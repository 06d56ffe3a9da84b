//! Conversation and message REST endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::GatewayResult;
use crate::rest::auth::ErrorResponse;
use crate::state::GatewayState;
use saferoof_auth::AuthUser;
use saferoof_chat::ServerEvent;
use saferoof_database::{Conversation, ConversationSummary, Message};

#[derive(Debug, Deserialize, ToSchema)]
pub struct OpenConversationRequest {
    pub property_id: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub body: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationResponse {
    pub id: i64,
    pub property_id: i64,
    pub owner_id: i64,
    pub buyer_id: i64,
    pub created_at: String,
}

impl From<Conversation> for ConversationResponse {
    fn from(conversation: Conversation) -> Self {
        Self {
            id: conversation.id,
            property_id: conversation.property_id,
            owner_id: conversation.owner_id,
            buyer_id: conversation.buyer_id,
            created_at: conversation.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub id: i64,
    pub conversation_id: i64,
    pub sender_id: i64,
    pub body: String,
    pub is_read: bool,
    pub created_at: String,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            conversation_id: message.conversation_id,
            sender_id: message.sender_id,
            body: message.body,
            is_read: message.is_read,
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationSummaryResponse {
    #[serde(flatten)]
    pub conversation: ConversationResponse,
    pub property_title: String,
    pub owner_name: String,
    pub buyer_name: String,
    pub last_message: Option<MessageResponse>,
    pub unread_count: i64,
}

impl From<ConversationSummary> for ConversationSummaryResponse {
    fn from(summary: ConversationSummary) -> Self {
        Self {
            conversation: summary.conversation.into(),
            property_title: summary.property_title,
            owner_name: summary.owner_name,
            buyer_name: summary.buyer_name,
            last_message: summary.last_message.map(Into::into),
            unread_count: summary.unread_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadReceiptResponse {
    pub updated: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UnreadCountResponse {
    pub unread: i64,
}

/// Guarded conversation routes
pub fn create_chat_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route(
            "/chat/conversations",
            post(open_conversation).get(list_conversations),
        )
        .route("/chat/conversations/:id", delete(delete_conversation))
        .route("/chat/unread-count", get(unread_count))
        .route(
            "/chat/:conversation_id/messages",
            get(list_messages).post(send_message),
        )
        .route("/chat/:conversation_id/read", put(mark_read))
}

#[utoipa::path(
    post,
    path = "/api/chat/conversations",
    tag = "Chat",
    request_body = OpenConversationRequest,
    responses(
        (status = 200, description = "The conversation, created if absent", body = ConversationResponse),
        (status = 400, description = "Own property", body = ErrorResponse),
        (status = 404, description = "Property not found", body = ErrorResponse)
    )
)]
pub async fn open_conversation(
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<OpenConversationRequest>,
) -> GatewayResult<Json<ConversationResponse>> {
    let conversation = state
        .conversations
        .open(payload.property_id, user.id)
        .await?;
    Ok(Json(conversation.into()))
}

#[utoipa::path(
    get,
    path = "/api/chat/conversations",
    tag = "Chat",
    responses(
        (status = 200, description = "The caller's inbox", body = Vec<ConversationSummaryResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn list_conversations(
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<AuthUser>,
) -> GatewayResult<Json<Vec<ConversationSummaryResponse>>> {
    let summaries = state.conversations.list(user.id).await?;
    Ok(Json(summaries.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    delete,
    path = "/api/chat/conversations/{id}",
    tag = "Chat",
    params(("id" = i64, Path, description = "Conversation ID")),
    responses(
        (status = 204, description = "Conversation deleted"),
        (status = 403, description = "Not a participant", body = ErrorResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse)
    )
)]
pub async fn delete_conversation(
    Path(id): Path<i64>,
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<AuthUser>,
) -> GatewayResult<impl IntoResponse> {
    state.conversations.delete(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/chat/{conversation_id}/messages",
    tag = "Chat",
    params(("conversation_id" = i64, Path, description = "Conversation ID")),
    responses(
        (status = 200, description = "Messages, oldest first", body = Vec<MessageResponse>),
        (status = 403, description = "Not a participant", body = ErrorResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse)
    )
)]
pub async fn list_messages(
    Path(conversation_id): Path<i64>,
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<AuthUser>,
) -> GatewayResult<Json<Vec<MessageResponse>>> {
    let messages = state.conversations.messages(conversation_id, user.id).await?;
    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/chat/{conversation_id}/messages",
    tag = "Chat",
    params(("conversation_id" = i64, Path, description = "Conversation ID")),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message persisted and relayed", body = MessageResponse),
        (status = 400, description = "Empty message", body = ErrorResponse),
        (status = 403, description = "Not a participant", body = ErrorResponse)
    )
)]
pub async fn send_message(
    Path(conversation_id): Path<i64>,
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<SendMessageRequest>,
) -> GatewayResult<impl IntoResponse> {
    let message = state
        .conversations
        .send(conversation_id, user.id, &payload.body)
        .await?;

    // mirror the persisted message to connected participants
    state
        .hub
        .publish(
            conversation_id,
            ServerEvent::Message {
                conversation_id,
                message: message.clone(),
            },
        )
        .await;

    Ok((StatusCode::CREATED, Json(MessageResponse::from(message))))
}

#[utoipa::path(
    put,
    path = "/api/chat/{conversation_id}/read",
    tag = "Chat",
    params(("conversation_id" = i64, Path, description = "Conversation ID")),
    responses(
        (status = 200, description = "Counterpart messages marked read", body = ReadReceiptResponse),
        (status = 403, description = "Not a participant", body = ErrorResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse)
    )
)]
pub async fn mark_read(
    Path(conversation_id): Path<i64>,
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<AuthUser>,
) -> GatewayResult<Json<ReadReceiptResponse>> {
    let updated = state.conversations.mark_read(conversation_id, user.id).await?;

    if updated > 0 {
        state
            .hub
            .publish(
                conversation_id,
                ServerEvent::MessagesRead {
                    conversation_id,
                    reader_id: user.id,
                    updated,
                },
            )
            .await;
    }

    Ok(Json(ReadReceiptResponse { updated }))
}

#[utoipa::path(
    get,
    path = "/api/chat/unread-count",
    tag = "Chat",
    responses(
        (status = 200, description = "Total unread messages for the caller", body = UnreadCountResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn unread_count(
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<AuthUser>,
) -> GatewayResult<Json<UnreadCountResponse>> {
    let unread = state.conversations.unread_total(user.id).await?;
    Ok(Json(UnreadCountResponse { unread }))
}
