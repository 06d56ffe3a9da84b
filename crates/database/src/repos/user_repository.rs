//! User repository for database operations.

use crate::entities::{CreateUserRequest, UpdateUserRequest, User};
use crate::types::{UserError, UserResult};
use chrono::Utc;
use sqlx::{Row, SqlitePool};

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, password_hash, created_at, updated_at";

/// Repository for user database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> User {
        User {
            id: row.get("id"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(row.as_ref().map(Self::row_to_user))
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(row.as_ref().map(Self::row_to_user))
    }

    /// Create new user
    pub async fn create(&self, request: &CreateUserRequest) -> UserResult<User> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO users (first_name, last_name, email, password_hash, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)"
        )
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(&request.email)
        .bind(&request.password_hash)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint failed") {
                UserError::EmailAlreadyExists
            } else {
                UserError::DatabaseError(e.to_string())
            }
        })?;

        let user_id = result.last_insert_rowid();

        self.find_by_id(user_id)
            .await?
            .ok_or_else(|| UserError::DatabaseError("Failed to retrieve created user".to_string()))
    }

    /// Update user
    pub async fn update(&self, user_id: i64, request: &UpdateUserRequest) -> UserResult<User> {
        let now = Utc::now().to_rfc3339();

        // Build dynamic update query based on provided fields
        let mut query_parts = Vec::new();
        let mut values = Vec::new();

        if let Some(ref first_name) = request.first_name {
            query_parts.push("first_name = ?");
            values.push(first_name.clone());
        }

        if let Some(ref last_name) = request.last_name {
            query_parts.push("last_name = ?");
            values.push(last_name.clone());
        }

        if let Some(ref email) = request.email {
            query_parts.push("email = ?");
            values.push(email.clone());
        }

        if let Some(ref password_hash) = request.password_hash {
            query_parts.push("password_hash = ?");
            values.push(password_hash.clone());
        }

        if query_parts.is_empty() {
            return self.find_by_id(user_id).await?.ok_or(UserError::UserNotFound);
        }

        query_parts.push("updated_at = ?");
        values.push(now);

        let set_clause = query_parts.join(", ");
        let query_str = format!("UPDATE users SET {} WHERE id = ?", set_clause);

        let mut query = sqlx::query(&query_str);
        for value in values {
            query = query.bind(value);
        }
        query = query.bind(user_id);

        query.execute(&self.pool).await.map_err(|e| {
            if e.to_string().contains("UNIQUE constraint failed") {
                UserError::EmailAlreadyExists
            } else {
                UserError::DatabaseError(e.to_string())
            }
        })?;

        self.find_by_id(user_id).await?.ok_or(UserError::UserNotFound)
    }

    /// Delete a user. Listings, conversations, messages, and the review
    /// cascade away with the row.
    pub async fn delete(&self, id: i64) -> UserResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(UserError::UserNotFound);
        }

        Ok(())
    }

    /// Check if email exists
    pub async fn email_exists(&self, email: &str) -> UserResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::create_test_pool;

    fn request(email: &str) -> CreateUserRequest {
        CreateUserRequest {
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
        }
    }

    #[tokio::test]
    async fn test_user_creation_and_retrieval() {
        let pool = create_test_pool().await;
        let repo = UserRepository::new(pool);

        let created = repo.create(&request("test@example.com")).await.unwrap();
        assert_eq!(created.email, "test@example.com");
        assert_eq!(created.full_name(), "Test User");

        let found = repo.find_by_id(created.id).await.unwrap();
        assert_eq!(found.unwrap().email, "test@example.com");

        let by_email = repo.find_by_email("test@example.com").await.unwrap();
        assert_eq!(by_email.unwrap().id, created.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let pool = create_test_pool().await;
        let repo = UserRepository::new(pool);

        repo.create(&request("dup@example.com")).await.unwrap();
        let err = repo.create(&request("dup@example.com")).await.unwrap_err();
        assert!(matches!(err, UserError::EmailAlreadyExists));
    }

    #[tokio::test]
    async fn test_partial_update() {
        let pool = create_test_pool().await;
        let repo = UserRepository::new(pool);

        let user = repo.create(&request("update@example.com")).await.unwrap();

        let updated = repo
            .update(
                user.id,
                &UpdateUserRequest {
                    first_name: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.first_name, "Renamed");
        assert_eq!(updated.last_name, "User");
        assert_eq!(updated.email, "update@example.com");
    }

    #[tokio::test]
    async fn test_update_to_taken_email_fails() {
        let pool = create_test_pool().await;
        let repo = UserRepository::new(pool);

        repo.create(&request("first@example.com")).await.unwrap();
        let second = repo.create(&request("second@example.com")).await.unwrap();

        let err = repo
            .update(
                second.id,
                &UpdateUserRequest {
                    email: Some("first@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::EmailAlreadyExists));
    }

    #[tokio::test]
    async fn test_delete_removes_user() {
        let pool = create_test_pool().await;
        let repo = UserRepository::new(pool);

        let user = repo.create(&request("gone@example.com")).await.unwrap();
        repo.delete(user.id).await.unwrap();

        assert!(repo.find_by_id(user.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(user.id).await.unwrap_err(),
            UserError::UserNotFound
        ));
    }

    #[tokio::test]
    async fn test_email_exists() {
        let pool = create_test_pool().await;
        let repo = UserRepository::new(pool);

        assert!(!repo.email_exists("x@example.com").await.unwrap());
        repo.create(&request("x@example.com")).await.unwrap();
        assert!(repo.email_exists("x@example.com").await.unwrap());
    }
}
