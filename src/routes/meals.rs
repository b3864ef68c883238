use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::admin::AdminUser,
    models::{
        meal::{CreateMealRequest, Meal, UpdateMealRequest},
        stats::{TypeCounts, WeeklyStats},
    },
    services::{meals::MealService, stats::StatsService},
    AppState,
};

/// GET /api/meals: public
pub async fn list_meals(State(state): State<AppState>) -> Result<Json<Vec<Meal>>, AppError> {
    MealService::list(&state.db).await.map(Json)
}

/// POST /api/meals: admin only
pub async fn create_meal(
    State(state): State<AppState>,
    _admin: AdminUser,
    payload: Result<Json<CreateMealRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Meal>), AppError> {
    let Json(body) = payload?;
    let meal = MealService::create(&state.db, &body).await?;
    Ok((StatusCode::CREATED, Json(meal)))
}

/// PUT /api/meals/{id}: admin only
pub async fn update_meal(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateMealRequest>, JsonRejection>,
) -> Result<Json<Meal>, AppError> {
    let Json(body) = payload?;
    MealService::update(&state.db, id, &body).await.map(Json)
}

/// DELETE /api/meals/{id}: admin only
pub async fn delete_meal(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    MealService::delete(&state.db, id).await?;
    Ok(Json(json!({ "msg": "Meal removed" })))
}

/// GET /api/meals/selections/stats: today's per-type counts, admin only
pub async fn daily_stats(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<TypeCounts>, AppError> {
    let today = Local::now().date_naive();
    StatsService::daily(&state.db, today).await.map(Json)
}

/// GET /api/meals/selections/weekly-stats: admin only
pub async fn weekly_stats(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<WeeklyStats>, AppError> {
    let today = Local::now().date_naive();
    StatsService::weekly(&state.db, today).await.map(Json)
}
