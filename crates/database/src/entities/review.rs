//! Review entity definitions

use serde::{Deserialize, Serialize};

/// A site review. Each user may leave at most one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
    pub created_at: String,
    /// Author names, joined in for display.
    pub author_first_name: String,
    pub author_last_name: String,
}

/// Aggregate over all reviews
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub total: i64,
    /// Mean rating rounded to two decimal places, 0 when there are no reviews.
    pub average: f64,
}
