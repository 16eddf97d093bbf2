//! End-to-end requests through the full router.

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use tower::ServiceExt;

use campus::{create_api_router, AppState};

use common::create_test_services;

async fn test_router() -> Router {
    let services = create_test_services().await;
    let handle = PrometheusBuilder::new().build_recorder().handle();
    create_api_router(AppState::new(services, handle))
}

async fn send(router: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let req = match body {
        Some(json) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register_and_login(router: &Router, name: &str, role: &str) -> String {
    let (status, _) = send(
        router,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({
            "email": format!("{}@campus.test", name),
            "username": name,
            "password": "password123",
            "role": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        router,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "login": name, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_ok() {
    let router = test_router().await;
    let (status, _) = send(&router, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn teacher_creates_course_and_public_listing_hides_drafts() {
    let router = test_router().await;
    let token = register_and_login(&router, "teacher", "TEACHER").await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/v1/courses",
        Some(&token),
        Some(json!({ "title": "Rust for Beginners", "category": "programming" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let course_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(&router, Method::GET, &format!("/api/v1/courses/{}", course_id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Rust for Beginners");

    let (status, body) = send(&router, Method::GET, "/api/v1/courses", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let router = test_router().await;
    let (status, body) = send(
        &router,
        Method::POST,
        "/api/v1/courses",
        None,
        Some(json!({ "title": "Sneaky" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn students_cannot_author_courses() {
    let router = test_router().await;
    let token = register_and_login(&router, "student", "STUDENT").await;
    let (status, _) = send(
        &router,
        Method::POST,
        "/api/v1/courses",
        Some(&token),
        Some(json!({ "title": "Not mine" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn invalid_body_is_unprocessable() {
    let router = test_router().await;
    let (status, body) = send(
        &router,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "email": "not-an-email", "username": "ab", "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("email"));
}
