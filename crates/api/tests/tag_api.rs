//! Product tags: CRUD, a product's tag set and the `?tag=` listing filter.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get, post_json_auth, put_json_auth};
use serde_json::{json, Value};
use sqlx::PgPool;

async fn create_tag(test: &common::TestApp, token: &str, name: &str) -> i64 {
    let response = post_json_auth(test.app(), "/api/v1/product-tags", token, json!({ "name": name })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

fn field(json: &Value, key: &str) -> Vec<String> {
    json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item[key].as_str().unwrap().to_string())
        .collect()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn tag_lifecycle(pool: PgPool) {
    let admin = common::create_admin(&pool).await;
    let test = common::build_test_app(pool);

    let response = post_json_auth(
        test.app(),
        "/api/v1/product-tags",
        &admin,
        json!({ "name": "Summer Sale" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let tag = body_json(response).await;
    assert_eq!(tag["data"]["slug"], "summer-sale");
    let id = tag["data"]["id"].as_i64().unwrap();

    let response = post_json_auth(
        test.app(),
        "/api/v1/product-tags",
        &admin,
        json!({ "name": "Summer Sale" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = put_json_auth(
        test.app(),
        &format!("/api/v1/product-tags/{id}"),
        &admin,
        json!({ "name": "Winter Sale", "slug": "Winter Sale" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["data"]["name"], "Winter Sale");
    assert_eq!(updated["data"]["slug"], "winter-sale");

    let listed = body_json(get(test.app(), "/api/v1/product-tags").await).await;
    assert_eq!(field(&listed, "slug"), vec!["winter-sale"]);

    let response = delete_auth(test.app(), &format!("/api/v1/product-tags/{id}"), &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = delete_auth(test.app(), &format!("/api/v1/product-tags/{id}"), &admin).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn customers_cannot_create_tags(pool: PgPool) {
    let customer = common::create_customer(&pool).await;
    let test = common::build_test_app(pool);

    let response = post_json_auth(
        test.app(),
        "/api/v1/product-tags",
        &customer,
        json!({ "name": "Clearance" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn product_tag_set_is_replaced_and_filters_the_listing(pool: PgPool) {
    let admin = common::create_admin(&pool).await;
    let test = common::build_test_app(pool);
    let category = common::create_category(test.app(), &admin, "Outerwear", None).await;
    let (parka, _) = common::create_product(test.app(), &admin, category, "Parka", "PK-1", 3).await;
    let (vest, _) = common::create_product(test.app(), &admin, category, "Vest", "VS-1", 3).await;

    let waterproof = create_tag(&test, &admin, "Waterproof").await;
    let organic = create_tag(&test, &admin, "Organic").await;
    let sale = create_tag(&test, &admin, "Sale").await;

    let response = put_json_auth(
        test.app(),
        &format!("/api/v1/products/{parka}/tags"),
        &admin,
        json!({ "tag_ids": [waterproof, sale] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(field(&body_json(response).await, "slug"), vec!["sale", "waterproof"]);

    put_json_auth(
        test.app(),
        &format!("/api/v1/products/{vest}/tags"),
        &admin,
        json!({ "tag_ids": [organic, sale] }),
    )
    .await;

    let on_sale = body_json(get(test.app(), "/api/v1/products?tag=sale&sort=name_asc").await).await;
    assert_eq!(field(&on_sale, "name"), vec!["Parka", "Vest"]);

    // Replacing drops tags not in the new set.
    let response = put_json_auth(
        test.app(),
        &format!("/api/v1/products/{parka}/tags"),
        &admin,
        json!({ "tag_ids": [waterproof] }),
    )
    .await;
    assert_eq!(field(&body_json(response).await, "slug"), vec!["waterproof"]);

    let on_sale = body_json(get(test.app(), "/api/v1/products?tag=sale").await).await;
    assert_eq!(field(&on_sale, "name"), vec!["Vest"]);

    let detail = body_json(get(test.app(), &format!("/api/v1/products/{parka}")).await).await;
    assert_eq!(detail["data"]["tags"][0]["slug"], "waterproof");
    assert_eq!(detail["data"]["tags"].as_array().unwrap().len(), 1);

    let none = body_json(get(test.app(), "/api/v1/products?tag=unknown").await).await;
    assert!(none["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_tag_id_is_rejected(pool: PgPool) {
    let admin = common::create_admin(&pool).await;
    let test = common::build_test_app(pool);
    let category = common::create_category(test.app(), &admin, "Socks", None).await;
    let (product, _) = common::create_product(test.app(), &admin, category, "Crew", "CR-1", 1).await;

    let response = put_json_auth(
        test.app(),
        &format!("/api/v1/products/{product}/tags"),
        &admin,
        json!({ "tag_ids": [424242] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "FOREIGN_KEY_VIOLATION");
}
