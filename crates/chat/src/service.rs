//! Conversation service: membership rules over the repositories.

use sqlx::SqlitePool;
use tracing::info;

use saferoof_database::{
    ChatError, ChatResult, Conversation, ConversationRepository, ConversationSummary, Message,
    MessageRepository, PropertyRepository,
};

const MAX_MESSAGE_LENGTH: usize = 10_000;

/// Service for conversations and their messages
#[derive(Clone)]
pub struct ConversationService {
    conversations: ConversationRepository,
    messages: MessageRepository,
    properties: PropertyRepository,
}

impl ConversationService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            conversations: ConversationRepository::new(pool.clone()),
            messages: MessageRepository::new(pool.clone()),
            properties: PropertyRepository::new(pool),
        }
    }

    /// Find or create the conversation between a property's owner and a
    /// prospective buyer. The owner side always comes from the property
    /// row; buyers cannot open a conversation about their own listing.
    pub async fn open(&self, property_id: i64, buyer_id: i64) -> ChatResult<Conversation> {
        let property = self
            .properties
            .find_property(property_id)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?
            .ok_or(ChatError::PropertyNotFound)?;

        if property.owner_id == buyer_id {
            return Err(ChatError::SelfConversation);
        }

        if let Some(existing) = self
            .conversations
            .find_by_key(property_id, property.owner_id, buyer_id)
            .await?
        {
            return Ok(existing);
        }

        let conversation = self
            .conversations
            .create(property_id, property.owner_id, buyer_id)
            .await?;
        info!(
            conversation_id = conversation.id,
            property_id, buyer_id, "opened conversation"
        );
        Ok(conversation)
    }

    /// The user's inbox, most recent activity first
    pub async fn list(&self, user_id: i64) -> ChatResult<Vec<ConversationSummary>> {
        self.conversations.list_for_user(user_id).await
    }

    /// Load a conversation, requiring the user to be one of its parties
    pub async fn require_participant(
        &self,
        conversation_id: i64,
        user_id: i64,
    ) -> ChatResult<Conversation> {
        let conversation = self
            .conversations
            .find_by_id(conversation_id)
            .await?
            .ok_or(ChatError::ConversationNotFound)?;

        if !conversation.has_participant(user_id) {
            return Err(ChatError::AccessDenied);
        }

        Ok(conversation)
    }

    /// Delete a conversation. Participants only.
    pub async fn delete(&self, conversation_id: i64, user_id: i64) -> ChatResult<()> {
        self.require_participant(conversation_id, user_id).await?;
        self.conversations.delete(conversation_id).await?;
        info!(conversation_id, user_id, "deleted conversation");
        Ok(())
    }

    /// The conversation's messages, oldest first. Participants only.
    pub async fn messages(
        &self,
        conversation_id: i64,
        user_id: i64,
    ) -> ChatResult<Vec<Message>> {
        self.require_participant(conversation_id, user_id).await?;
        self.messages.list_by_conversation(conversation_id).await
    }

    /// Persist a message from one of the conversation's parties
    pub async fn send(
        &self,
        conversation_id: i64,
        sender_id: i64,
        body: &str,
    ) -> ChatResult<Message> {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Err(ChatError::InvalidInput("message must not be empty".to_string()));
        }
        if trimmed.len() > MAX_MESSAGE_LENGTH {
            return Err(ChatError::InvalidInput(format!(
                "message too long (max {MAX_MESSAGE_LENGTH} characters)"
            )));
        }

        self.require_participant(conversation_id, sender_id).await?;
        self.messages.create(conversation_id, sender_id, trimmed).await
    }

    /// Mark the counterpart's messages as read, returning how many changed
    pub async fn mark_read(&self, conversation_id: i64, reader_id: i64) -> ChatResult<u64> {
        self.require_participant(conversation_id, reader_id).await?;
        self.messages.mark_read(conversation_id, reader_id).await
    }

    /// Total unread messages addressed to the user
    pub async fn unread_total(&self, user_id: i64) -> ChatResult<i64> {
        self.messages.unread_total(user_id).await
    }
}
