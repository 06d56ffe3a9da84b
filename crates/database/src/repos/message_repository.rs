//! Repository for message data access operations.

use crate::entities::Message;
use crate::types::{ChatError, ChatResult};
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::info;

/// Repository for message database operations
#[derive(Clone)]
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    /// Create a new message repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_message(row: &sqlx::sqlite::SqliteRow) -> Message {
        Message {
            id: row.get("id"),
            conversation_id: row.get("conversation_id"),
            sender_id: row.get("sender_id"),
            body: row.get("body"),
            is_read: row.get::<i64, _>("is_read") != 0,
            created_at: row.get("created_at"),
        }
    }

    /// Messages of a conversation, oldest first
    pub async fn list_by_conversation(&self, conversation_id: i64) -> ChatResult<Vec<Message>> {
        let rows = sqlx::query("SELECT * FROM messages WHERE conversation_id = ? ORDER BY id")
            .bind(conversation_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        Ok(rows.iter().map(Self::row_to_message).collect())
    }

    /// Persist a new message
    pub async fn create(
        &self,
        conversation_id: i64,
        sender_id: i64,
        body: &str,
    ) -> ChatResult<Message> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO messages (conversation_id, sender_id, body, is_read, created_at) VALUES (?, ?, ?, 0, ?)",
        )
        .bind(conversation_id)
        .bind(sender_id)
        .bind(body)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        let id = result.last_insert_rowid();
        info!(message_id = id, conversation_id, sender_id, "created message");

        Ok(Message {
            id,
            conversation_id,
            sender_id,
            body: body.to_string(),
            is_read: false,
            created_at: now,
        })
    }

    /// Mark every message the counterpart sent in the conversation as read.
    /// Returns the number of rows updated.
    pub async fn mark_read(&self, conversation_id: i64, reader_id: i64) -> ChatResult<u64> {
        let result = sqlx::query(
            "UPDATE messages SET is_read = 1 WHERE conversation_id = ? AND sender_id != ? AND is_read = 0",
        )
        .bind(conversation_id)
        .bind(reader_id)
        .execute(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected())
    }

    /// Total unread messages addressed to the user across all conversations
    pub async fn unread_total(&self, user_id: i64) -> ChatResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages m
             JOIN conversations c ON c.id = m.conversation_id
             WHERE (c.owner_id = ?1 OR c.buyer_id = ?1)
               AND m.sender_id != ?1 AND m.is_read = 0",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        Ok(count)
    }
}
