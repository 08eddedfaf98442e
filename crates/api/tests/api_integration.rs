//! API integration tests.
//!
//! Drive the router end to end against a mock database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    middleware::from_fn_with_state,
    response::Response,
};
use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::Value;
use tower::ServiceExt;
use whisper_api::{ApiRateLimiter, AppState, middleware::auth_middleware, router as api_router};
use whisper_common::LocalStorage;
use whisper_core::{
    CompanyService, DashboardService, IdentityService, ReportService, SubmissionService,
};
use whisper_db::{
    entities::{UserRole, profile},
    repositories::{
        CompanyRepository, ProfileRepository, ReportCommentRepository, ReportRepository,
    },
};

/// Create test app state over `db`.
fn create_test_state(db: MockDatabase) -> AppState {
    let db = Arc::new(db.into_connection());

    let company_repo = CompanyRepository::new(Arc::clone(&db));
    let profile_repo = ProfileRepository::new(Arc::clone(&db));
    let report_repo = ReportRepository::new(Arc::clone(&db));
    let comment_repo = ReportCommentRepository::new(Arc::clone(&db));

    let storage = Arc::new(LocalStorage::new(
        std::env::temp_dir().join("whisper-api-tests"),
    ));

    let company_service = CompanyService::new(company_repo.clone(), false);
    let report_service = ReportService::new(
        report_repo.clone(),
        company_repo.clone(),
        comment_repo.clone(),
        storage,
    );
    let submission_service = SubmissionService::new(
        company_service.clone(),
        report_service.clone(),
        Duration::from_secs(3600),
    );

    AppState {
        identity_service: IdentityService::new(profile_repo.clone()),
        company_service,
        submission_service,
        report_service,
        dashboard_service: DashboardService::new(
            report_repo,
            company_repo,
            profile_repo,
            comment_repo,
        ),
        attempt_limiter: ApiRateLimiter::new(),
        trust_proxy_headers: false,
    }
}

/// Create the test router with authentication wired in.
fn create_test_router(db: MockDatabase) -> Router {
    let state = create_test_state(db);
    api_router()
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

fn empty_db() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
}

fn staff_profile(role: UserRole) -> profile::Model {
    profile::Model {
        id: "staff1".to_string(),
        email: "staff@example.com".to_string(),
        password_hash: String::new(),
        role,
        display_user_id: "12345678".to_string(),
        department: None,
        token: Some("staff_token".to_string()),
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header("Content-Type", "application/json")
        .header("X-Forwarded-For", "203.0.113.7")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent/endpoint")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_signup_with_invalid_json_returns_error() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(post_json("/signup", "invalid json"))
        .await
        .unwrap();

    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn test_signup_password_mismatch() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(post_json(
            "/signup",
            r#"{"email":"new@example.com","password":"secret1","passwordConfirm":"secret2"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "PASSWORD_MISMATCH");
}

#[tokio::test]
async fn test_status_lookup_unknown_reference() {
    let db = empty_db().append_query_results([Vec::<whisper_db::entities::report::Model>::new()]);
    let app = create_test_router(db);

    let response = app
        .oneshot(post_json(
            "/status/lookup",
            r#"{"referenceId":"REF-424242","password":"secret1"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
    assert_eq!(body["error"]["message"], "invalid reference id or password");
}

#[tokio::test]
async fn test_status_lookup_is_throttled_per_address() {
    let app = create_test_router(empty_db());

    // Malformed ids fail without touching the store.
    for _ in 0..10 {
        let response = app
            .clone()
            .oneshot(post_json(
                "/status/lookup",
                r#"{"referenceId":"guess","password":"secret1"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = app
        .oneshot(post_json(
            "/status/lookup",
            r#"{"referenceId":"guess","password":"secret1"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));
    let body = json_body(response).await;
    assert_eq!(body["error"]["retryable"], true);
}

#[tokio::test]
async fn test_rotating_forwarded_for_shares_one_budget() {
    let app = create_test_router(empty_db());

    let lookup = |n: usize| {
        Request::builder()
            .uri("/status/lookup")
            .method("POST")
            .header("Content-Type", "application/json")
            .header("X-Forwarded-For", format!("198.51.100.{n}"))
            .header("X-Real-IP", format!("198.51.101.{n}"))
            .body(Body::from(
                r#"{"referenceId":"guess","password":"secret1"}"#.to_string(),
            ))
            .unwrap()
    };

    for n in 0..10 {
        let response = app.clone().oneshot(lookup(n)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = app.oneshot(lookup(10)).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_dashboard_requires_sign_in() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(post_json("/admin/overview", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/login"
    );
}

#[tokio::test]
async fn test_moderator_turned_away_from_admin_dashboard() {
    let db = empty_db().append_query_results([[staff_profile(UserRole::Moderator)]]);
    let app = create_test_router(db);

    let request = Request::builder()
        .uri("/admin/overview")
        .method("POST")
        .header("Authorization", "Bearer staff_token")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
    let body = json_body(response).await;
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_route_check_for_signed_out_caller() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(post_json("/i/route", r#"{"path":"/moderator"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["decision"], "redirect");
    assert_eq!(body["data"]["to"], "/login");
    assert_eq!(body["data"]["replace"], true);
}

#[tokio::test]
async fn test_route_check_normalizes_path() {
    let app = create_test_router(empty_db());

    for path in ["/Admin/", "/admin/reports?page=2"] {
        let response = app
            .clone()
            .oneshot(post_json("/i/route", &format!(r#"{{"path":"{path}"}}"#)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["decision"], "redirect");
        assert_eq!(body["data"]["to"], "/login");
    }
}

#[tokio::test]
async fn test_submission_steps_are_ordered() {
    let app = create_test_router(empty_db());

    let response = app
        .clone()
        .oneshot(post_json("/submissions/start", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["step"], "company_verify");
    let submission_id = body["data"]["submissionId"].as_str().unwrap().to_string();

    let response = app
        .oneshot(post_json(
            "/submissions/report",
            &format!(
                r#"{{"submissionId":"{submission_id}","subject":"s","department":"HR","description":"d"}}"#
            ),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_unknown_submission_is_not_found() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(post_json(
            "/submissions/show",
            r#"{"submissionId":"does-not-exist"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_organization_roster_hidden_by_default() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(post_json("/companies/list", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
