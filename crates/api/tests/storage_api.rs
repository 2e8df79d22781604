//! Category images land in storage, and the orphan sweep only touches
//! objects no row references.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, multipart_request, post_json_auth};
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

const FAKE_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 1, 2, 3, 4];

#[sqlx::test(migrations = "../db/migrations")]
async fn category_image_upload_sets_path_and_url(pool: PgPool) {
    let token = common::create_admin(&pool).await;
    let test = common::build_test_app(pool);
    let id = common::create_category(test.app(), &token, "Coats", None).await;

    let req = multipart_request(
        &format!("/api/v1/categories/{id}/image"),
        Some(&token),
        &[("file", Some("coat.png"), Some("image/png"), FAKE_PNG)],
    );
    let response = test.app().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let path = json["data"]["image_path"].as_str().unwrap().to_string();
    assert!(path.starts_with(&format!("categories/{id}/")), "{path}");
    assert_eq!(json["data"]["image_url"], format!("/uploads/{path}"));
    assert!(test.uploads_root().join(&path).is_file());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn orphan_sweep_removes_only_unreferenced_objects(pool: PgPool) {
    let token = common::create_admin(&pool).await;
    let test = common::build_test_app(pool);
    let id = common::create_category(test.app(), &token, "Boots", None).await;

    let req = multipart_request(
        &format!("/api/v1/categories/{id}/image"),
        Some(&token),
        &[("file", Some("boot.png"), Some("image/png"), FAKE_PNG)],
    );
    let json = body_json(test.app().oneshot(req).await.unwrap()).await;
    let kept = json["data"]["image_path"].as_str().unwrap().to_string();

    let orphan = "products/999/stale.jpg";
    test.state
        .storage
        .put(orphan, vec![1, 2, 3], "image/jpeg")
        .await
        .unwrap();

    let response = get_auth(test.app(), "/api/v1/admin/storage/orphans", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["count"], 1);
    assert_eq!(json["data"]["orphans"][0], orphan);

    let response =
        post_json_auth(test.app(), "/api/v1/admin/storage/cleanup", &token, json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["deleted"], 1);
    assert_eq!(json["data"]["failed"], 0);

    assert!(!test.uploads_root().join(orphan).exists());
    assert!(test.uploads_root().join(&kept).is_file());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn orphan_preview_requires_admin(pool: PgPool) {
    let token = common::create_customer(&pool).await;
    let test = common::build_test_app(pool);

    let response = get_auth(test.app(), "/api/v1/admin/storage/orphans", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
