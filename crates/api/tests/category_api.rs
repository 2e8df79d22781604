//! Category hierarchy rules enforced over HTTP.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_category, delete_auth, get, put_json_auth};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn category_cannot_be_its_own_parent(pool: PgPool) {
    let token = common::create_admin(&pool).await;
    let test = common::build_test_app(pool);
    let id = create_category(test.app(), &token, "Women", None).await;

    let response = put_json_auth(
        test.app(),
        &format!("/api/v1/categories/{id}"),
        &token,
        json!({ "parent_id": id }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn reparenting_under_a_descendant_is_rejected(pool: PgPool) {
    let token = common::create_admin(&pool).await;
    let test = common::build_test_app(pool);
    let root = create_category(test.app(), &token, "Women", None).await;
    let child = create_category(test.app(), &token, "Dresses", Some(root)).await;

    let response = put_json_auth(
        test.app(),
        &format!("/api/v1/categories/{root}"),
        &token,
        json!({ "parent_id": child }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Moving the child back to the root is fine.
    let response = put_json_auth(
        test.app(),
        &format!("/api/v1/categories/{child}"),
        &token,
        json!({ "parent_id": null }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"]["parent_id"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn category_with_children_or_products_cannot_be_deleted(pool: PgPool) {
    let token = common::create_admin(&pool).await;
    let test = common::build_test_app(pool);
    let root = create_category(test.app(), &token, "Men", None).await;
    let child = create_category(test.app(), &token, "Shirts", Some(root)).await;
    common::create_product(test.app(), &token, child, "Oxford shirt", "OX-M", 3).await;

    let response = delete_auth(test.app(), &format!("/api/v1/categories/{root}"), &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = delete_auth(test.app(), &format!("/api/v1/categories/{child}"), &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let empty = create_category(test.app(), &token, "Socks", Some(root)).await;
    let response = delete_auth(test.app(), &format!("/api/v1/categories/{empty}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn slug_is_derived_and_resolvable(pool: PgPool) {
    let token = common::create_admin(&pool).await;
    let test = common::build_test_app(pool);
    let id = create_category(test.app(), &token, "Summer Dresses", None).await;

    let response = get(test.app(), "/api/v1/categories/slug/summer-dresses").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["id"], id);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn tree_nests_children_under_parents(pool: PgPool) {
    let token = common::create_admin(&pool).await;
    let test = common::build_test_app(pool);
    let root = create_category(test.app(), &token, "Kids", None).await;
    create_category(test.app(), &token, "Shoes", Some(root)).await;

    let response = get(test.app(), "/api/v1/categories/tree").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let roots = json["data"].as_array().unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0]["children"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn non_admin_cannot_create_categories(pool: PgPool) {
    let token = common::create_customer(&pool).await;
    let test = common::build_test_app(pool);

    let response = common::post_json_auth(
        test.app(),
        "/api/v1/categories",
        &token,
        json!({ "name": "Hats" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
