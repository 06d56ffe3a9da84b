//! Repository for review data access operations.

use crate::entities::{Review, ReviewSummary};
use crate::types::{ReviewError, ReviewResult};
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::info;

const REVIEW_SELECT: &str = "SELECT r.id, r.user_id, r.rating, r.comment, r.created_at,
            u.first_name AS author_first_name, u.last_name AS author_last_name
     FROM reviews r JOIN users u ON u.id = r.user_id";

/// Repository for review database operations
#[derive(Clone)]
pub struct ReviewRepository {
    pool: SqlitePool,
}

impl ReviewRepository {
    /// Create a new review repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_review(row: &sqlx::sqlite::SqliteRow) -> Review {
        Review {
            id: row.get("id"),
            user_id: row.get("user_id"),
            rating: row.get("rating"),
            comment: row.get("comment"),
            created_at: row.get("created_at"),
            author_first_name: row.get("author_first_name"),
            author_last_name: row.get("author_last_name"),
        }
    }

    /// All reviews, newest first
    pub async fn list(&self) -> ReviewResult<Vec<Review>> {
        let rows = sqlx::query(&format!("{REVIEW_SELECT} ORDER BY r.id DESC"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ReviewError::DatabaseError(e.to_string()))?;

        Ok(rows.iter().map(Self::row_to_review).collect())
    }

    /// Count and mean rating over all reviews
    pub async fn summary(&self) -> ReviewResult<ReviewSummary> {
        let row = sqlx::query("SELECT COUNT(*) AS total, AVG(rating) AS average FROM reviews")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ReviewError::DatabaseError(e.to_string()))?;

        let total: i64 = row.get("total");
        let average: Option<f64> = row.get("average");
        let average = average.map(|a| (a * 100.0).round() / 100.0).unwrap_or(0.0);

        Ok(ReviewSummary { total, average })
    }

    /// Find a review by ID
    pub async fn find_by_id(&self, id: i64) -> ReviewResult<Option<Review>> {
        let row = sqlx::query(&format!("{REVIEW_SELECT} WHERE r.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ReviewError::DatabaseError(e.to_string()))?;

        Ok(row.as_ref().map(Self::row_to_review))
    }

    /// Find the review a user has left, if any
    pub async fn find_by_user(&self, user_id: i64) -> ReviewResult<Option<Review>> {
        let row = sqlx::query(&format!("{REVIEW_SELECT} WHERE r.user_id = ?"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ReviewError::DatabaseError(e.to_string()))?;

        Ok(row.as_ref().map(Self::row_to_review))
    }

    /// Create a review. Each user may have only one.
    pub async fn create(
        &self,
        user_id: i64,
        rating: i64,
        comment: Option<&str>,
    ) -> ReviewResult<Review> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO reviews (user_id, rating, comment, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(rating)
        .bind(comment)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint failed") {
                ReviewError::AlreadyReviewed
            } else {
                ReviewError::DatabaseError(e.to_string())
            }
        })?;

        let id = result.last_insert_rowid();
        info!(review_id = id, user_id, rating, "created review");

        self.find_by_id(id)
            .await?
            .ok_or_else(|| ReviewError::DatabaseError("Failed to retrieve created review".to_string()))
    }

    /// Delete a review
    pub async fn delete(&self, id: i64) -> ReviewResult<()> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| ReviewError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(ReviewError::ReviewNotFound);
        }

        Ok(())
    }
}
