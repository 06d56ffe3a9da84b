//! Relay channel event definitions

use saferoof_database::Message;
use serde::{Deserialize, Serialize};

/// Client events received over the relay WebSocket
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Heartbeat to keep the connection alive
    Ping,
    /// Join a conversation's broadcast group
    Subscribe { conversation_id: i64 },
    /// Leave a conversation's broadcast group
    Unsubscribe { conversation_id: i64 },
}

/// Server events sent to relay subscribers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Welcome message after successful connection
    Hello { user_id: i64 },
    /// Heartbeat response
    Pong,
    /// Subscription confirmation
    Subscribed { conversation_id: i64 },
    /// Unsubscription confirmation
    Unsubscribed { conversation_id: i64 },
    /// A new message was persisted in the conversation
    Message {
        conversation_id: i64,
        message: Message,
    },
    /// A participant marked the counterpart's messages as read
    MessagesRead {
        conversation_id: i64,
        reader_id: i64,
        updated: u64,
    },
    /// Error response
    Error { error: String, message: String },
}
