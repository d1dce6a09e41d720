mod common;

use std::time::Duration;

use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use hr_portal::{
    middleware::auth::Bearer,
    routes,
    services::{
        api_client::ApiClient,
        auth_service::{AuthService, LoginPayload},
        job_service::JobService,
    },
    AppState,
};
use serde_json::{json, Value as JsonValue};

fn seen_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn list_jobs(headers: HeaderMap) -> (StatusCode, Json<JsonValue>) {
    match seen_token(&headers).as_deref() {
        Some("Bearer tok-123") => (
            StatusCode::OK,
            Json(json!([{ "id": "7", "title": "Payroll Specialist", "unknownField": 1 }])),
        ),
        _ => (StatusCode::FORBIDDEN, Json(json!({ "error": "no token" }))),
    }
}

async fn login(Json(body): Json<JsonValue>) -> Json<JsonValue> {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let name = email.split('@').next().unwrap_or_default().to_string();
    Json(json!({ "token": format!("tok-{}", name), "user": { "id": name, "email": email } }))
}

/// Reports back whichever token reached it, so tests can tell callers apart.
async fn profile(Path(id): Path<String>, headers: HeaderMap) -> Json<JsonValue> {
    Json(json!({
        "id": id,
        "full_name": seen_token(&headers).unwrap_or_else(|| "anonymous".to_string()),
        "email": "someone@example.com",
    }))
}

async fn logout(headers: HeaderMap) -> StatusCode {
    match seen_token(&headers) {
        Some(_) => StatusCode::SERVICE_UNAVAILABLE,
        None => StatusCode::UNAUTHORIZED,
    }
}

fn upstream() -> Router {
    Router::new()
        .route("/jobs", get(list_jobs))
        .route(
            "/jobs/closed",
            get(|| async { (StatusCode::NOT_FOUND, Json(json!({ "message": "Job closed" }))) }),
        )
        .route(
            "/auth/verify",
            get(|| async { (StatusCode::UNAUTHORIZED, Json(json!({}))) }),
        )
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/users/:id/profile", get(profile))
}

fn client(base: &str) -> ApiClient {
    ApiClient::new(base, Duration::from_secs(5)).expect("client")
}

async fn portal(base: &str) -> (Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = common::config(base, dir.path());
    let app = routes::app(AppState::new(&config).await.unwrap(), &config);
    (app, dir)
}

#[tokio::test]
async fn bearer_token_is_attached_when_present() {
    let base = common::spawn_upstream(upstream()).await;
    let jobs = JobService::new(client(&base));

    let err = jobs.list(&Bearer::anonymous()).await.unwrap_err();
    assert_eq!(err.status, 403);
    assert_eq!(err.message, "no token");

    let list = jobs.list(&Bearer::new("tok-123")).await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].title, "Payroll Specialist");
}

#[tokio::test]
async fn unauthorized_response_asks_for_a_new_login() {
    let base = common::spawn_upstream(upstream()).await;
    let auth = AuthService::new(client(&base));

    let err = auth.verify(&Bearer::new("stale")).await.unwrap_err();
    assert_eq!(err.status, 401);
    assert!(err.requires_login());
    assert_eq!(err.message, "Session expired. Please sign in again.");
}

#[tokio::test]
async fn login_hands_the_token_back_without_keeping_it() {
    let base = common::spawn_upstream(upstream()).await;
    let auth = AuthService::new(client(&base));
    let users = hr_portal::services::user_service::UserService::new(client(&base));

    let session = auth
        .login(&LoginPayload {
            email: "amal@example.com".into(),
            password: "secret".into(),
        })
        .await
        .unwrap();
    assert_eq!(session.token, "tok-amal");

    let profile = users.profile("amal", &Bearer::anonymous()).await.unwrap();
    assert_eq!(profile.full_name, "anonymous");

    let err = auth.logout(&Bearer::new(session.token)).await.unwrap_err();
    assert_eq!(err.status, 503);
}

#[tokio::test]
async fn each_caller_is_forwarded_with_its_own_token() {
    let base = common::spawn_upstream(upstream()).await;
    let (app, _dir) = portal(&base).await;

    let (status, amal) = common::send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": "amal@example.com", "password": "secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, omar) = common::send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": "omar@example.com", "password": "secret" })),
    )
    .await;
    let amal_token = amal["token"].as_str().unwrap();
    let omar_token = omar["token"].as_str().unwrap();
    assert_ne!(amal_token, omar_token);

    let (status, body) = common::send_as(&app, "GET", "/api/users/amal/profile", Some(amal_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["full_name"], "Bearer tok-amal");

    let (_, body) = common::send_as(&app, "GET", "/api/users/omar/profile", Some(omar_token), None).await;
    assert_eq!(body["full_name"], "Bearer tok-omar");

    // A later sign-in must not leak into anyone else's requests.
    let (_, body) = common::send_as(&app, "GET", "/api/users/amal/profile", None, None).await;
    assert_eq!(body["full_name"], "anonymous");
}

#[tokio::test]
async fn logout_always_tells_the_caller_to_forget_its_token() {
    let base = common::spawn_upstream(upstream()).await;
    let (app, _dir) = portal(&base).await;

    let (status, body) = common::send(&app, "POST", "/api/auth/logout", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["loggedOut"], true);
}

#[tokio::test]
async fn unreachable_upstream_is_a_network_error() {
    let jobs = JobService::new(client("http://127.0.0.1:1"));
    let err = jobs.list(&Bearer::anonymous()).await.unwrap_err();
    assert_eq!(err.status, 0);
    assert_eq!(err.message, "Network error");
}

#[tokio::test]
async fn portal_relays_upstream_errors_as_json() {
    let base = common::spawn_upstream(upstream()).await;
    let (app, _dir) = portal(&base).await;

    let (status, body) = common::send(&app, "GET", "/api/jobs/closed", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Job closed");

    let (status, body) = common::send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = common::send(&app, "GET", "/api/countries", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c["dial_code"] == "+992"));
}
