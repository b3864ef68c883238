use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::admin::AdminUser,
    models::{
        auth::AuthenticatedUser,
        feedback::{Feedback, FeedbackEntry, SubmitFeedbackRequest},
    },
    services::feedback::FeedbackService,
    AppState,
};

/// POST /api/feedback/{meal_id}: create or replace the caller's feedback
pub async fn submit_feedback(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(meal_id): Path<Uuid>,
    payload: Result<Json<SubmitFeedbackRequest>, JsonRejection>,
) -> Result<Json<Feedback>, AppError> {
    let Json(body) = payload?;
    FeedbackService::submit(&state.db, user.user_id, meal_id, &body)
        .await
        .map(Json)
}

/// GET /api/feedback: admin only
pub async fn list_all(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<FeedbackEntry>>, AppError> {
    FeedbackService::list_all(&state.db).await.map(Json)
}

/// GET /api/feedback/meal/{meal_id}: admin only
pub async fn list_for_meal(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(meal_id): Path<Uuid>,
) -> Result<Json<Vec<FeedbackEntry>>, AppError> {
    FeedbackService::list_for_meal(&state.db, meal_id).await.map(Json)
}

/// GET /api/feedback/user
pub async fn list_mine(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<FeedbackEntry>>, AppError> {
    FeedbackService::list_for_user(&state.db, user.user_id)
        .await
        .map(Json)
}
