//! Router-level tests. None of these requests reach the database: they are
//! rejected by the auth gate, the admin check or input validation first.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

use mealplan_api::{
    config::Config,
    models::{
        auth::{Claims, TokenUser},
        user::UserRole,
    },
    routes,
    services::{auth::AuthService, realtime::AdminBroadcast},
    AppState,
};

const SECRET: &str = "integration-secret";

fn app(secret: Option<&str>) -> Router {
    let config = Config {
        database_url: "postgres://postgres@127.0.0.1:1/unused".into(),
        redis_url: "redis://127.0.0.1:1".into(),
        jwt_secret: secret.map(str::to_string),
        jwt_expiry_seconds: 3600,
        host: "127.0.0.1".into(),
        port: 0,
        app_env: "test".into(),
        cors_origin: None,
        selection_cutoff_hour: 22,
    };
    let db = PgPoolOptions::new()
        .connect_lazy(&config.database_url)
        .unwrap();
    let state = AppState {
        db,
        redis_client: redis::Client::open(config.redis_url.as_str()).unwrap(),
        config: Arc::new(config),
        admin_broadcast: AdminBroadcast::new(),
    };
    routes::router(state)
}

fn token(role: UserRole) -> String {
    AuthService::generate_access_token(Uuid::new_v4(), role, SECRET, 600).unwrap()
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header("x-auth-token", t);
    }
    match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health_reports_ok() {
    let (status, body) = send(app(Some(SECRET)), request("GET", "/api/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_select_type_without_token_is_unauthorized() {
    let body = json!({ "mealTypes": ["lunch"] });
    let (status, body) = send(
        app(Some(SECRET)),
        request("POST", "/api/meal-selections/select-type", None, Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("missing"));
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let meal_id = Uuid::new_v4();
    let cases = [
        ("GET", "/api/meal-selections/selected-types".to_string(), None),
        ("GET", "/api/meal-selections".to_string(), None),
        ("GET", "/api/meals/selections/stats".to_string(), None),
        ("GET", "/api/meals/selections/weekly-stats".to_string(), None),
        ("GET", "/api/feedback/user".to_string(), None),
        ("GET", "/api/users".to_string(), None),
        ("GET", "/api/auth/me".to_string(), None),
        ("POST", format!("/api/feedback/{meal_id}"), Some(json!({ "rating": 4 }))),
        ("POST", "/api/meals".to_string(), Some(json!({ "name": "x" }))),
    ];

    for (method, uri, body) in cases {
        let (status, _) = send(app(Some(SECRET)), request(method, &uri, None, body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
    }
}

#[tokio::test]
async fn test_invalid_and_expired_tokens_are_distinguished() {
    let (status, body) = send(
        app(Some(SECRET)),
        request("GET", "/api/meal-selections/selected-types", Some("garbage"), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");

    let now = chrono::Utc::now().timestamp() as usize;
    let expired = encode(
        &Header::new(Algorithm::HS256),
        &Claims {
            user: TokenUser { id: Uuid::new_v4(), role: UserRole::User },
            iat: now - 7200,
            exp: now - 3600,
        },
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();
    let (status, body) = send(
        app(Some(SECRET)),
        request("GET", "/api/meal-selections/selected-types", Some(&expired), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token has expired");
}

#[tokio::test]
async fn test_missing_secret_is_server_error() {
    let (status, _) = send(
        app(None),
        request(
            "GET",
            "/api/meal-selections/selected-types",
            Some(&token(UserRole::User)),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_admin_routes_reject_regular_users() {
    let user = token(UserRole::User);
    let meal_id = Uuid::new_v4();
    let cases = [
        ("GET", "/api/meals/selections/stats".to_string(), None),
        ("GET", "/api/meals/selections/weekly-stats".to_string(), None),
        ("GET", "/api/feedback".to_string(), None),
        ("GET", format!("/api/feedback/meal/{meal_id}"), None),
        ("GET", "/api/users".to_string(), None),
        ("DELETE", format!("/api/users/{}", Uuid::new_v4()), None),
        ("DELETE", format!("/api/meals/{meal_id}"), None),
        (
            "POST",
            "/api/meals".to_string(),
            Some(json!({ "name": "Soup", "description": "Hot", "type": "lunch" })),
        ),
    ];

    for (method, uri, body) in cases {
        let (status, _) = send(app(Some(SECRET)), request(method, &uri, Some(&user), body)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{method} {uri}");
    }
}

#[tokio::test]
async fn test_bad_selection_is_rejected_before_store() {
    // Either the cutoff or the unknown type rejects this; both are 400 and
    // neither needs the (unreachable) database.
    let (status, body) = send(
        app(Some(SECRET)),
        request(
            "POST",
            "/api/meal-selections/select-type",
            Some(&token(UserRole::User)),
            Some(json!({ "mealTypes": ["brunch"] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_malformed_selection_bodies_are_bad_requests() {
    let user = token(UserRole::User);
    let bodies = [
        json!({ "mealTypes": "lunch" }),
        json!({}),
        json!({ "mealTypes": [1, 2] }),
        json!({ "mealTypes": null }),
    ];

    for body in bodies {
        let (status, resp) = send(
            app(Some(SECRET)),
            request("POST", "/api/meal-selections/select-type", Some(&user), Some(body.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(resp["error"].is_string(), "{body}");
    }
}

#[tokio::test]
async fn test_unparseable_json_is_bad_request() {
    let req = Request::builder()
        .method("POST")
        .uri("/api/meal-selections/select-type")
        .header("x-auth-token", token(UserRole::User))
        .header("content-type", "application/json")
        .body(Body::from("{\"mealTypes\": ["))
        .unwrap();
    let (status, body) = send(app(Some(SECRET)), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_malformed_feedback_bodies_are_bad_requests() {
    let user = token(UserRole::User);
    let uri = format!("/api/feedback/{}", Uuid::new_v4());
    let bodies = [
        json!({ "rating": "five" }),
        json!({ "rating": 4.5 }),
        json!({ "comment": "no rating" }),
    ];

    for body in bodies {
        let (status, resp) = send(
            app(Some(SECRET)),
            request("POST", &uri, Some(&user), Some(body.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(resp["error"].is_string(), "{body}");
    }
}

#[tokio::test]
async fn test_withdraw_selection_requires_token() {
    let (status, _) = send(
        app(Some(SECRET)),
        request("DELETE", &format!("/api/meal-selections/{}", Uuid::new_v4()), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
