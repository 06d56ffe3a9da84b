//! Review service: one review per user, author-only deletion.

use sqlx::SqlitePool;
use tracing::info;

use saferoof_database::{Review, ReviewError, ReviewRepository, ReviewResult, ReviewSummary};

const MAX_COMMENT_LENGTH: usize = 2_000;

/// Service for site reviews
#[derive(Clone)]
pub struct ReviewService {
    reviews: ReviewRepository,
}

impl ReviewService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            reviews: ReviewRepository::new(pool),
        }
    }

    /// All reviews, newest first
    pub async fn list(&self) -> ReviewResult<Vec<Review>> {
        self.reviews.list().await
    }

    /// Count and mean rating
    pub async fn summary(&self) -> ReviewResult<ReviewSummary> {
        self.reviews.summary().await
    }

    /// Create the user's review; each user may leave exactly one
    pub async fn create(
        &self,
        user_id: i64,
        rating: i64,
        comment: Option<String>,
    ) -> ReviewResult<Review> {
        if !(1..=5).contains(&rating) {
            return Err(ReviewError::InvalidRating);
        }

        let comment = match comment.as_deref().map(str::trim) {
            Some("") | None => None,
            Some(text) if text.len() > MAX_COMMENT_LENGTH => {
                return Err(ReviewError::InvalidInput(format!(
                    "comment too long (max {MAX_COMMENT_LENGTH} characters)"
                )))
            }
            Some(text) => Some(text.to_string()),
        };

        if self.reviews.find_by_user(user_id).await?.is_some() {
            return Err(ReviewError::AlreadyReviewed);
        }

        let review = self.reviews.create(user_id, rating, comment.as_deref()).await?;
        info!(review_id = review.id, user_id, "created review");
        Ok(review)
    }

    /// Delete a review. Authors only.
    pub async fn delete(&self, id: i64, user_id: i64) -> ReviewResult<()> {
        let review = self
            .reviews
            .find_by_id(id)
            .await?
            .ok_or(ReviewError::ReviewNotFound)?;

        if review.user_id != user_id {
            return Err(ReviewError::AccessDenied);
        }

        self.reviews.delete(id).await?;
        info!(review_id = id, user_id, "deleted review");
        Ok(())
    }
}
