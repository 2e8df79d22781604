//! `AppError` to HTTP response mapping, checked without a server.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use storefront_api::error::AppError;
use storefront_core::error::CoreError;
use storefront_core::import::ImportError;
use storefront_storage::StorageError;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_returns_404() {
    let (status, json) = error_to_response(AppError::Core(CoreError::NotFound {
        entity: "Product",
        id: 42,
    }))
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Product with id 42 not found");
}

#[tokio::test]
async fn not_found_by_slug_names_the_field() {
    let (status, json) = error_to_response(AppError::Core(CoreError::NotFoundBy {
        entity: "Category",
        field: "slug",
        value: "shoes".into(),
    }))
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Category with slug 'shoes' not found");
}

#[tokio::test]
async fn domain_errors_map_to_their_status() {
    let cases = [
        (CoreError::Validation("bad".into()), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        (CoreError::Conflict("dup".into()), StatusCode::CONFLICT, "CONFLICT"),
        (CoreError::Unauthorized("who".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        (CoreError::Forbidden("no".into()), StatusCode::FORBIDDEN, "FORBIDDEN"),
    ];
    for (err, expected_status, expected_code) in cases {
        let (status, json) = error_to_response(AppError::Core(err)).await;
        assert_eq!(status, expected_status);
        assert_eq!(json["code"], expected_code);
    }
}

#[tokio::test]
async fn internal_errors_hide_the_cause_in_the_message() {
    let (status, json) =
        error_to_response(AppError::InternalError("disk on fire".into())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn row_not_found_returns_404() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn validation_carries_field_details() {
    let (status, json) = error_to_response(AppError::Validation {
        message: "email: invalid".into(),
        details: serde_json::json!({ "email": ["email"] }),
    })
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["details"]["email"][0], "email");
}

#[tokio::test]
async fn invalid_storage_key_is_a_bad_request() {
    let (status, _) =
        error_to_response(AppError::Storage(StorageError::InvalidKey("../x".into()))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_csv_is_a_bad_request() {
    let (status, json) =
        error_to_response(AppError::Import(ImportError::Empty)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_CSV");
}
