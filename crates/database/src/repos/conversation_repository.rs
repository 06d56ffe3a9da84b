//! Repository for conversation data access operations.

use crate::entities::{Conversation, ConversationSummary, Message};
use crate::types::{ChatError, ChatResult};
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::info;

/// Repository for conversation database operations
#[derive(Clone)]
pub struct ConversationRepository {
    pool: SqlitePool,
}

impl ConversationRepository {
    /// Create a new conversation repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_conversation(row: &sqlx::sqlite::SqliteRow) -> Conversation {
        Conversation {
            id: row.get("id"),
            property_id: row.get("property_id"),
            owner_id: row.get("owner_id"),
            buyer_id: row.get("buyer_id"),
            created_at: row.get("created_at"),
        }
    }

    /// Find a conversation by its unique (property, owner, buyer) key
    pub async fn find_by_key(
        &self,
        property_id: i64,
        owner_id: i64,
        buyer_id: i64,
    ) -> ChatResult<Option<Conversation>> {
        let row = sqlx::query(
            "SELECT * FROM conversations WHERE property_id = ? AND owner_id = ? AND buyer_id = ?",
        )
        .bind(property_id)
        .bind(owner_id)
        .bind(buyer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        Ok(row.as_ref().map(Self::row_to_conversation))
    }

    /// Find a conversation by ID
    pub async fn find_by_id(&self, id: i64) -> ChatResult<Option<Conversation>> {
        let row = sqlx::query("SELECT * FROM conversations WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        Ok(row.as_ref().map(Self::row_to_conversation))
    }

    /// Create a new conversation
    pub async fn create(
        &self,
        property_id: i64,
        owner_id: i64,
        buyer_id: i64,
    ) -> ChatResult<Conversation> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO conversations (property_id, owner_id, buyer_id, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(property_id)
        .bind(owner_id)
        .bind(buyer_id)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        let id = result.last_insert_rowid();
        info!(conversation_id = id, property_id, owner_id, buyer_id, "created conversation");

        Ok(Conversation {
            id,
            property_id,
            owner_id,
            buyer_id,
            created_at: now,
        })
    }

    /// The user's inbox: conversations with property title, party names,
    /// last message, and the user's unread count, most recent activity first.
    pub async fn list_for_user(&self, user_id: i64) -> ChatResult<Vec<ConversationSummary>> {
        let rows = sqlx::query(
            "SELECT c.id, c.property_id, c.owner_id, c.buyer_id, c.created_at,
                    p.title AS property_title,
                    uo.first_name || ' ' || uo.last_name AS owner_name,
                    ub.first_name || ' ' || ub.last_name AS buyer_name,
                    (SELECT COUNT(*) FROM messages m
                      WHERE m.conversation_id = c.id AND m.sender_id != ?1 AND m.is_read = 0
                    ) AS unread_count
             FROM conversations c
             JOIN properties p ON p.id = c.property_id
             JOIN users uo ON uo.id = c.owner_id
             JOIN users ub ON ub.id = c.buyer_id
             WHERE c.owner_id = ?1 OR c.buyer_id = ?1
             ORDER BY (SELECT COALESCE(MAX(m.id), 0) FROM messages m WHERE m.conversation_id = c.id) DESC,
                      c.id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        let mut summaries = Vec::with_capacity(rows.len());
        for row in &rows {
            let conversation = Self::row_to_conversation(row);
            let last_message = self.last_message(conversation.id).await?;

            summaries.push(ConversationSummary {
                conversation,
                property_title: row.get("property_title"),
                owner_name: row.get("owner_name"),
                buyer_name: row.get("buyer_name"),
                last_message,
                unread_count: row.get("unread_count"),
            });
        }

        Ok(summaries)
    }

    /// Delete a conversation. Its messages cascade away.
    pub async fn delete(&self, id: i64) -> ChatResult<()> {
        let result = sqlx::query("DELETE FROM conversations WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(ChatError::ConversationNotFound);
        }

        Ok(())
    }

    async fn last_message(&self, conversation_id: i64) -> ChatResult<Option<Message>> {
        let row = sqlx::query(
            "SELECT * FROM messages WHERE conversation_id = ? ORDER BY id DESC LIMIT 1",
        )
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        Ok(row.map(|row| Message {
            id: row.get("id"),
            conversation_id: row.get("conversation_id"),
            sender_id: row.get("sender_id"),
            body: row.get("body"),
            is_read: row.get::<i64, _>("is_read") != 0,
            created_at: row.get("created_at"),
        }))
    }
}
