use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db,
    error::AppError,
    models::feedback::{Feedback, FeedbackEntry, SubmitFeedbackRequest, MAX_COMMENT_CHARS},
    services::meals::MealService,
};

const FEEDBACK_COLUMNS: &str = "id, user_id, meal_id, rating, comment, created_at, updated_at";

const ENTRY_SELECT: &str = r#"SELECT f.id, f.rating, f.comment, f.created_at,
            u.id AS user_id, u.name AS user_name, u.email AS user_email,
            m.id AS meal_id, m.name AS meal_name, m.meal_type, m.date AS meal_date
       FROM feedback f
       JOIN users u ON u.id = f.user_id
       JOIN meals m ON m.id = f.meal_id"#;

pub struct FeedbackService;

impl FeedbackService {
    /// Create or overwrite the caller's feedback on a meal.
    pub async fn submit(
        pool: &PgPool,
        user_id: Uuid,
        meal_id: Uuid,
        req: &SubmitFeedbackRequest,
    ) -> Result<Feedback, AppError> {
        let (rating, comment) = validate_feedback(req.rating, req.comment.as_deref())?;

        if !MealService::exists(pool, meal_id).await? {
            return Err(AppError::NotFound("Meal"));
        }

        if let Some(updated) = Self::update(pool, user_id, meal_id, rating, comment).await? {
            return Ok(updated);
        }

        let inserted = sqlx::query_as::<_, Feedback>(&format!(
            "INSERT INTO feedback (user_id, meal_id, rating, comment)
             VALUES ($1, $2, $3, $4)
             RETURNING {FEEDBACK_COLUMNS}"
        ))
        .bind(user_id)
        .bind(meal_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(pool)
        .await;

        match inserted {
            Ok(feedback) => Ok(feedback),
            Err(e) if db::is_unique_violation(&e) => {
                tracing::debug!("feedback insert raced for {user_id} on meal {meal_id}, updating instead");
                Self::update(pool, user_id, meal_id, rating, comment)
                    .await?
                    .ok_or_else(|| AppError::Conflict("Feedback for this meal already exists".into()))
            }
            // meal deleted between the existence check and the insert
            Err(e) if db::is_foreign_key_violation(&e) => Err(AppError::NotFound("Meal")),
            Err(e) => Err(e.into()),
        }
    }

    /// All feedback, newest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<FeedbackEntry>, AppError> {
        let entries = sqlx::query_as::<_, FeedbackEntry>(&format!(
            "{ENTRY_SELECT} ORDER BY f.created_at DESC"
        ))
        .fetch_all(pool)
        .await?;
        Ok(entries)
    }

    pub async fn list_for_meal(pool: &PgPool, meal_id: Uuid) -> Result<Vec<FeedbackEntry>, AppError> {
        let entries = sqlx::query_as::<_, FeedbackEntry>(&format!(
            "{ENTRY_SELECT} WHERE f.meal_id = $1 ORDER BY f.created_at DESC"
        ))
        .bind(meal_id)
        .fetch_all(pool)
        .await?;
        Ok(entries)
    }

    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<FeedbackEntry>, AppError> {
        let entries = sqlx::query_as::<_, FeedbackEntry>(&format!(
            "{ENTRY_SELECT} WHERE f.user_id = $1 ORDER BY f.created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(entries)
    }

    async fn update(
        pool: &PgPool,
        user_id: Uuid,
        meal_id: Uuid,
        rating: i16,
        comment: Option<&str>,
    ) -> Result<Option<Feedback>, AppError> {
        let feedback = sqlx::query_as::<_, Feedback>(&format!(
            "UPDATE feedback
             SET rating = $3, comment = $4, updated_at = NOW()
             WHERE user_id = $1 AND meal_id = $2
             RETURNING {FEEDBACK_COLUMNS}"
        ))
        .bind(user_id)
        .bind(meal_id)
        .bind(rating)
        .bind(comment)
        .fetch_optional(pool)
        .await?;
        Ok(feedback)
    }
}

/// Rating must be 1..=5; comment at most 500 characters.
pub fn validate_feedback(rating: i64, comment: Option<&str>) -> Result<(i16, Option<&str>), AppError> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::validation("Rating must be between 1 and 5"));
    }
    if let Some(c) = comment {
        if c.chars().count() > MAX_COMMENT_CHARS {
            return Err(AppError::validation(format!(
                "Comment cannot exceed {MAX_COMMENT_CHARS} characters"
            )));
        }
    }
    Ok((rating as i16, comment))
}
