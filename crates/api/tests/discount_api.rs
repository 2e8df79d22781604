mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get_auth, post_json_auth, put_json_auth};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn fixed_discount_is_capped_at_the_subtotal(pool: PgPool) {
    let admin = common::create_admin(&pool).await;
    let customer = common::create_customer(&pool).await;
    let test = common::build_test_app(pool);

    let response = post_json_auth(
        test.app(),
        "/api/v1/admin/discounts",
        &admin,
        json!({ "code": "bigoff", "kind": "fixed", "value": 3000 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let quote = body_json(
        post_json_auth(
            test.app(),
            "/api/v1/discounts/validate",
            &customer,
            json!({ "code": "BIGOFF", "subtotal_cents": 1000 }),
        )
        .await,
    )
    .await;
    assert_eq!(quote["data"]["discount_cents"], 1000);
    assert_eq!(quote["data"]["subtotal_cents"], 1000);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn minimum_order_is_enforced(pool: PgPool) {
    let admin = common::create_admin(&pool).await;
    let customer = common::create_customer(&pool).await;
    let test = common::build_test_app(pool);

    post_json_auth(
        test.app(),
        "/api/v1/admin/discounts",
        &admin,
        json!({ "code": "BULK15", "kind": "percentage", "value": 15, "min_order_cents": 10000 }),
    )
    .await;

    let response = post_json_auth(
        test.app(),
        "/api/v1/discounts/validate",
        &customer,
        json!({ "code": "bulk15", "subtotal_cents": 9999 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let quote = body_json(
        post_json_auth(
            test.app(),
            "/api/v1/discounts/validate",
            &customer,
            json!({ "code": "bulk15", "subtotal_cents": 10000 }),
        )
        .await,
    )
    .await;
    assert_eq!(quote["data"]["discount_cents"], 1500);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_definitions_are_rejected(pool: PgPool) {
    let admin = common::create_admin(&pool).await;
    let test = common::build_test_app(pool);

    let response = post_json_auth(
        test.app(),
        "/api/v1/admin/discounts",
        &admin,
        json!({ "code": "TOOMUCH", "kind": "percentage", "value": 150 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        test.app(),
        "/api/v1/admin/discounts",
        &admin,
        json!({ "code": "FREEBIE", "kind": "bogo", "value": 1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json!({ "code": "ONCE", "kind": "fixed", "value": 100 });
    let first = post_json_auth(test.app(), "/api/v1/admin/discounts", &admin, body.clone()).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let second = post_json_auth(test.app(), "/api/v1/admin/discounts", &admin, body).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deactivated_code_stops_applying(pool: PgPool) {
    let admin = common::create_admin(&pool).await;
    let customer = common::create_customer(&pool).await;
    let test = common::build_test_app(pool);

    let created = body_json(
        post_json_auth(
            test.app(),
            "/api/v1/admin/discounts",
            &admin,
            json!({ "code": "FLASH", "kind": "fixed", "value": 200 }),
        )
        .await,
    )
    .await;
    let id = created["data"]["id"].as_i64().unwrap();

    let response = put_json_auth(
        test.app(),
        &format!("/api/v1/admin/discounts/{id}"),
        &admin,
        json!({ "is_active": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json_auth(
        test.app(),
        "/api/v1/discounts/validate",
        &customer,
        json!({ "code": "FLASH", "subtotal_cents": 5000 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = delete_auth(test.app(), &format!("/api/v1/admin/discounts/{id}"), &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = get_auth(test.app(), &format!("/api/v1/admin/discounts/{id}"), &admin).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn customers_cannot_manage_discounts(pool: PgPool) {
    let customer = common::create_customer(&pool).await;
    let test = common::build_test_app(pool);

    let response = get_auth(test.app(), "/api/v1/admin/discounts", &customer).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
