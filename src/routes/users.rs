use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::admin::AdminUser,
    models::user::{CreateUserRequest, UserProfile, UserRole},
    services::users::UserService,
    AppState,
};

/// GET /api/users: admin only
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    UserService::list(&state.db).await.map(Json)
}

/// POST /api/users: admin only, role defaults to `user`
pub async fn create_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    let Json(body) = payload?;
    let role = body.role.unwrap_or(UserRole::User);
    let user = UserService::create(&state.db, &body.name, &body.email, &body.password, role).await?;
    tracing::info!("Admin {} created user {}", admin.user_id, user.id);
    Ok((StatusCode::CREATED, Json(UserProfile::from(user))))
}

/// DELETE /api/users/{id}: admin only, admins themselves cannot be removed
pub async fn delete_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    UserService::delete(&state.db, id).await?;
    Ok(Json(json!({ "msg": "User removed" })))
}
