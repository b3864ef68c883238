pub mod auth;
pub mod feedback;
pub mod health;
pub mod meals;
pub mod selections;
pub mod users;
pub mod websocket;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    routing::{delete, get, post, put},
    Extension, Router,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{
    middleware::auth::{JwtSecret, TOKEN_HEADER},
    AppState,
};

/// Build the full API router around `state`.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(state.config.cors_origin.clone());

    let app = Router::new()
        .route("/api/health", get(health::health_check))
        // Auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        // Meal catalog + admin statistics
        .route("/api/meals", get(meals::list_meals).post(meals::create_meal))
        .route("/api/meals/{id}", put(meals::update_meal).delete(meals::delete_meal))
        .route("/api/meals/selections/stats", get(meals::daily_stats))
        .route("/api/meals/selections/weekly-stats", get(meals::weekly_stats))
        // Daily selections
        .route("/api/meal-selections", get(selections::list_selections))
        .route("/api/meal-selections/select-type", post(selections::select_types))
        .route("/api/meal-selections/selected-types", get(selections::selected_types))
        .route("/api/meal-selections/{id}", delete(selections::withdraw_selection))
        // Feedback
        .route("/api/feedback", get(feedback::list_all))
        .route("/api/feedback/user", get(feedback::list_mine))
        .route("/api/feedback/meal/{meal_id}", get(feedback::list_for_meal))
        .route("/api/feedback/{meal_id}", post(feedback::submit_feedback))
        // Users (admin)
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route("/api/users/{id}", delete(users::delete_user))
        // Realtime
        .route("/ws", get(websocket::ws_handler));

    let app = match state.config.jwt_secret.clone() {
        Some(secret) => app.layer(Extension(JwtSecret(secret))),
        None => {
            tracing::warn!("JWT_SECRET is not set; authenticated routes will fail");
            app
        }
    };

    app.layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .with_state(state)
}

/// Allow `origin` when configured; otherwise any localhost origin (development).
fn cors_layer(origin: Option<String>) -> CorsLayer {
    let allow_origin = AllowOrigin::predicate(move |candidate: &HeaderValue, _| {
        let o = match candidate.to_str() {
            Ok(s) => s,
            Err(_) => return false,
        };
        match &origin {
            Some(allowed) => o == allowed,
            None => o.starts_with("http://localhost") || o.starts_with("http://127.0.0.1"),
        }
    });

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(TOKEN_HEADER),
        ]))
        .allow_origin(allow_origin)
}
