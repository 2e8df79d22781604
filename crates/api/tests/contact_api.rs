mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get_auth, post_json, put_json_auth};
use serde_json::json;
use sqlx::PgPool;

async fn wait_for_mail(test: &common::TestApp) {
    for _ in 0..50 {
        if test.mailer.sent_count().await > 0 {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn public_message_is_stored_and_forwarded(pool: PgPool) {
    let test = common::build_test_app(pool);

    let response = post_json(
        test.app(),
        "/api/v1/contact-messages",
        json!({
            "name": "Ada",
            "email": "ada@example.com",
            "subject": "Sizing",
            "message": "Do the linen shirts run small?",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_read"], false);

    wait_for_mail(&test).await;
    let sent = test.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "owner@shop.test");
    assert!(sent[0].subject.contains("Sizing"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_email_is_rejected(pool: PgPool) {
    let test = common::build_test_app(pool);

    let response = post_json(
        test.app(),
        "/api/v1/contact-messages",
        json!({ "name": "Ada", "email": "not-an-email", "message": "Hi" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_triages_messages(pool: PgPool) {
    let admin = common::create_admin(&pool).await;
    let test = common::build_test_app(pool);

    let mut ids = Vec::new();
    for n in 0..2 {
        let json = body_json(
            post_json(
                test.app(),
                "/api/v1/contact-messages",
                json!({ "name": "Guest", "email": "guest@example.com", "message": format!("Note {n}") }),
            )
            .await,
        )
        .await;
        ids.push(json["data"]["id"].as_i64().unwrap());
    }

    let response = put_json_auth(
        test.app(),
        &format!("/api/v1/admin/contact-messages/{}/read", ids[0]),
        &admin,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["is_read"], true);

    let unread = body_json(
        get_auth(test.app(), "/api/v1/admin/contact-messages?unread=true", &admin).await,
    )
    .await;
    let unread_ids: Vec<i64> = unread["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_i64().unwrap())
        .collect();
    assert_eq!(unread_ids, vec![ids[1]]);

    let response = delete_auth(
        test.app(),
        &format!("/api/v1/admin/contact-messages/{}", ids[0]),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let all = body_json(get_auth(test.app(), "/api/v1/admin/contact-messages", &admin).await).await;
    assert_eq!(all["data"].as_array().unwrap().len(), 1);
}
