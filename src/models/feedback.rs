use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const MAX_COMMENT_CHARS: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: Uuid,
    pub user_id: Uuid,
    pub meal_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Feedback joined with the submitter and meal fields shown in listings.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEntry {
    pub id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub meal_id: Uuid,
    pub meal_name: String,
    pub meal_type: String,
    pub meal_date: Option<NaiveDate>,
}

/// Body for POST /api/feedback/{meal_id}.
#[derive(Debug, Deserialize)]
pub struct SubmitFeedbackRequest {
    pub rating: i64,
    pub comment: Option<String>,
}
