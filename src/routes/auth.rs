use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppError,
    middleware::rate_limit::check_rate_limit,
    models::{
        auth::AuthenticatedUser,
        user::{AuthResponse, LoginRequest, RegisterRequest, UserProfile},
    },
    services::{auth::AuthService, users::normalize_email},
    AppState,
};

fn jwt_secret(state: &AppState) -> Result<&str, AppError> {
    state
        .config
        .jwt_secret
        .as_deref()
        .ok_or(AppError::ServerMisconfigured)
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let Json(body) = payload?;
    let secret = jwt_secret(&state)?;
    let res = AuthService::register(&state.db, &body, secret, state.config.jwt_expiry_seconds).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(body) = payload?;
    // Rate limit: 5 attempts per 15 min per email
    let rate_key = format!("rate:login:{}", normalize_email(&body.email));
    check_rate_limit(&state.redis_client, &rate_key, 5, 900).await?;

    let secret = jwt_secret(&state)?;
    AuthService::login(&state.db, &body, secret, state.config.jwt_expiry_seconds)
        .await
        .map(Json)
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserProfile>, AppError> {
    AuthService::me(&state.db, user.user_id).await.map(Json)
}
