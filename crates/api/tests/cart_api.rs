//! Cart quantities never exceed the variant's stock.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json_auth, put_json_auth};
use serde_json::json;
use sqlx::PgPool;

/// Seed a category and a product with `stock` units; return the variant id.
async fn seed_variant(test: &common::TestApp, admin: &str, stock: i32) -> i64 {
    let category = common::create_category(test.app(), admin, "Tops", None).await;
    common::create_product(test.app(), admin, category, "Linen top", "LT-M", stock)
        .await
        .1
}

#[sqlx::test(migrations = "../db/migrations")]
async fn adding_the_same_variant_merges_lines(pool: PgPool) {
    let admin = common::create_admin(&pool).await;
    let customer = common::create_customer(&pool).await;
    let test = common::build_test_app(pool);
    let variant = seed_variant(&test, &admin, 10).await;

    for _ in 0..2 {
        let response = post_json_auth(
            test.app(),
            "/api/v1/cart/items",
            &customer,
            json!({ "variant_id": variant, "quantity": 2 }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let json = body_json(get_auth(test.app(), "/api/v1/cart", &customer).await).await;
    let items = json["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 4);
    assert_eq!(json["data"]["subtotal_cents"], 4 * 2500);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn add_beyond_stock_is_rejected_and_cart_unchanged(pool: PgPool) {
    let admin = common::create_admin(&pool).await;
    let customer = common::create_customer(&pool).await;
    let test = common::build_test_app(pool);
    let variant = seed_variant(&test, &admin, 3).await;

    let response = post_json_auth(
        test.app(),
        "/api/v1/cart/items",
        &customer,
        json!({ "variant_id": variant, "quantity": 2 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json_auth(
        test.app(),
        "/api/v1/cart/items",
        &customer,
        json!({ "variant_id": variant, "quantity": 2 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let json = body_json(get_auth(test.app(), "/api/v1/cart", &customer).await).await;
    assert_eq!(json["data"]["items"][0]["quantity"], 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn setting_quantity_is_capped_by_stock(pool: PgPool) {
    let admin = common::create_admin(&pool).await;
    let customer = common::create_customer(&pool).await;
    let test = common::build_test_app(pool);
    let variant = seed_variant(&test, &admin, 3).await;

    let json = body_json(
        post_json_auth(
            test.app(),
            "/api/v1/cart/items",
            &customer,
            json!({ "variant_id": variant, "quantity": 1 }),
        )
        .await,
    )
    .await;
    let item_id = json["data"]["items"][0]["id"].as_i64().unwrap();

    let response = put_json_auth(
        test.app(),
        &format!("/api/v1/cart/items/{item_id}"),
        &customer,
        json!({ "quantity": 4 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = put_json_auth(
        test.app(),
        &format!("/api/v1/cart/items/{item_id}"),
        &customer,
        json!({ "quantity": 3 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["items"][0]["quantity"], 3);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_variant_is_not_found(pool: PgPool) {
    let customer = common::create_customer(&pool).await;
    let test = common::build_test_app(pool);

    let response = post_json_auth(
        test.app(),
        "/api/v1/cart/items",
        &customer,
        json!({ "variant_id": 999_999, "quantity": 1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
