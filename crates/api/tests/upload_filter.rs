//! The `ImageUpload` extractor rejects non-images before any handler runs.

mod common;

use axum::extract::FromRequest;
use axum::http::StatusCode;
use common::{body_json, multipart_request};
use sqlx::PgPool;
use storefront_api::error::AppError;
use storefront_api::extractors::ImageUpload;
use tower::ServiceExt;

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0];

#[tokio::test]
async fn text_file_is_rejected() {
    let test = common::build_test_app(common::lazy_pool());
    let req = multipart_request(
        "/upload",
        None,
        &[("file", Some("notes.txt"), Some("text/plain"), b"hello")],
    );

    let result = ImageUpload::from_request(req, &test.state).await;
    match result {
        Err(AppError::BadRequest(msg)) => assert!(msg.contains("text/plain"), "{msg}"),
        other => panic!("expected BadRequest, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_file_field_is_rejected() {
    let test = common::build_test_app(common::lazy_pool());
    let req = multipart_request("/upload", None, &[("alt_text", None, None, b"a picture")]);

    let result = ImageUpload::from_request(req, &test.state).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn oversized_file_is_rejected() {
    let test = common::build_test_app(common::lazy_pool());
    let big = vec![0u8; test.state.config.max_upload_bytes + 1];
    let req = multipart_request(
        "/upload",
        None,
        &[("file", Some("big.png"), Some("image/png"), &big)],
    );

    let result = ImageUpload::from_request(req, &test.state).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn image_with_alt_text_is_accepted() {
    let test = common::build_test_app(common::lazy_pool());
    let req = multipart_request(
        "/upload",
        None,
        &[
            ("file", Some("a.png"), Some("image/png"), PNG_MAGIC),
            ("alt_text", None, None, b"  Front view  "),
        ],
    );

    let upload = ImageUpload::from_request(req, &test.state).await.unwrap();
    assert_eq!(upload.files.len(), 1);
    assert_eq!(upload.files[0].content_type, "image/png");
    assert_eq!(upload.alt_text.as_deref(), Some("Front view"));
}

/// Through the router: an admin uploading a PDF to a category gets a 400 and
/// nothing is written to storage.
#[sqlx::test(migrations = "../db/migrations")]
async fn category_image_endpoint_rejects_non_image(pool: PgPool) {
    let token = common::create_admin(&pool).await;
    let test = common::build_test_app(pool);
    let category_id = common::create_category(test.app(), &token, "Dresses", None).await;

    let req = multipart_request(
        &format!("/api/v1/categories/{category_id}/image"),
        Some(&token),
        &[("file", Some("spec.pdf"), Some("application/pdf"), b"%PDF-1.4")],
    );
    let response = test.app().oneshot(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
    assert!(!test.uploads_root().join("categories").exists());
}
