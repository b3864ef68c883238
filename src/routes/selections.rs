use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use chrono::Local;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        auth::AuthenticatedUser,
        selection::{MealSelection, SelectTypesRequest, SelectedTypesResponse},
    },
    services::selections::{target_date, SelectionService},
    AppState,
};

/// POST /api/meal-selections/select-type: choose tomorrow's meal types
pub async fn select_types(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<SelectTypesRequest>, JsonRejection>,
) -> Result<Json<MealSelection>, AppError> {
    let Json(body) = payload?;
    let now = Local::now().naive_local();
    SelectionService::submit(
        &state.db,
        &state.admin_broadcast,
        user.user_id,
        target_date(now),
        &body.meal_types,
        now,
        state.config.selection_cutoff_hour,
    )
    .await
    .map(Json)
}

/// GET /api/meal-selections/selected-types: tomorrow's meal types, empty if unset
pub async fn selected_types(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<SelectedTypesResponse>, AppError> {
    let date = target_date(Local::now().naive_local());
    let meal_types = SelectionService::get(&state.db, user.user_id, date).await?;
    Ok(Json(SelectedTypesResponse { meal_types, date }))
}

/// GET /api/meal-selections: the caller's selection history
pub async fn list_selections(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<MealSelection>>, AppError> {
    SelectionService::list_for_user(&state.db, user.user_id)
        .await
        .map(Json)
}

/// DELETE /api/meal-selections/{id}: withdraw one of the caller's own selections
pub async fn withdraw_selection(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    SelectionService::withdraw(
        &state.db,
        &state.admin_broadcast,
        user.user_id,
        id,
        Local::now().naive_local(),
        state.config.selection_cutoff_hour,
    )
    .await?;
    Ok(Json(json!({ "msg": "Meal selection removed" })))
}
