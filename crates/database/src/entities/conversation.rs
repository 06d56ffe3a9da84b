//! Conversation and message entity definitions

use serde::{Deserialize, Serialize};

/// A conversation between a property owner and a prospective buyer.
/// Uniqueness is keyed by (property, owner, buyer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub property_id: i64,
    pub owner_id: i64,
    pub buyer_id: i64,
    pub created_at: String,
}

impl Conversation {
    /// Whether the given user is one of the two parties.
    pub fn has_participant(&self, user_id: i64) -> bool {
        self.owner_id == user_id || self.buyer_id == user_id
    }

    /// The other party from the given user's point of view.
    pub fn counterpart(&self, user_id: i64) -> i64 {
        if self.owner_id == user_id {
            self.buyer_id
        } else {
            self.owner_id
        }
    }
}

/// A persisted chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub sender_id: i64,
    pub body: String,
    pub is_read: bool,
    pub created_at: String,
}

/// One row of the inbox view: a conversation plus the context the
/// client renders it with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub property_title: String,
    pub owner_name: String,
    pub buyer_name: String,
    pub last_message: Option<Message>,
    /// Unread messages addressed to the user the summary was built for.
    pub unread_count: i64,
}
