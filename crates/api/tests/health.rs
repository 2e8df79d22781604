//! Health check, API document and general HTTP behaviour.

mod common;

use axum::http::StatusCode;
use common::{body_json, get};
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn health_check_reports_database_and_storage(pool: PgPool) {
    let test = common::build_test_app(pool);
    let response = get(test.app(), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
    assert_eq!(json["storage_backend"], "local");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn openapi_document_is_served_at_root() {
    let test = common::build_test_app(common::lazy_pool());
    let response = get(test.app(), "/api-docs/openapi.json").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["paths"]["/api/v1/products"].is_object());
    assert!(json["components"]["securitySchemes"]["bearer_auth"].is_object());
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let test = common::build_test_app(common::lazy_pool());
    let response = get(test.app(), "/this-route-does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let test = common::build_test_app(common::lazy_pool());
    let response = get(test.app(), "/api-docs/openapi.json").await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn protected_routes_reject_missing_token() {
    let test = common::build_test_app(common::lazy_pool());
    let response = get(test.app(), "/api/v1/cart").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn malformed_bearer_token_is_rejected() {
    let test = common::build_test_app(common::lazy_pool());
    let response = common::get_auth(test.app(), "/api/v1/auth/me", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
