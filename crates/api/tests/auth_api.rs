//! Sign-up, sign-in, lockout, refresh rotation and password change.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json, post_json_auth, TEST_PASSWORD};
use serde_json::json;
use sqlx::PgPool;
use storefront_db::repositories::UserRepo;

async fn sign_in(app: axum::Router, email: &str, password: &str) -> axum::response::Response {
    post_json(
        app,
        "/api/v1/auth/sign-in",
        json!({ "email": email, "password": password }),
    )
    .await
}

#[sqlx::test(migrations = "../db/migrations")]
async fn sign_up_creates_customer_and_sends_welcome(pool: PgPool) {
    let test = common::build_test_app(pool);

    let response = post_json(
        test.app(),
        "/api/v1/auth/sign-up",
        json!({ "email": "New@Shop.test", "password": "hunter2hunter2", "full_name": "Ada" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["user"]["email"], "new@shop.test");
    assert_eq!(json["data"]["user"]["role"], "customer");
    assert_eq!(json["data"]["token_type"], "Bearer");
    assert!(json["data"]["refresh_token"].is_string());

    // The welcome email goes out on a spawned task.
    for _ in 0..50 {
        if test.mailer.sent_count().await > 0 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    let sent = test.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "new@shop.test");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_email_is_a_conflict(pool: PgPool) {
    common::create_user(&pool, "taken@shop.test", "customer").await;
    let test = common::build_test_app(pool);

    let response = post_json(
        test.app(),
        "/api/v1/auth/sign-up",
        json!({ "email": "TAKEN@shop.test", "password": "hunter2hunter2" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn weak_password_is_rejected(pool: PgPool) {
    let test = common::build_test_app(pool);
    let response = post_json(
        test.app(),
        "/api/v1/auth/sign-up",
        json!({ "email": "weak@shop.test", "password": "abcdefghij" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn sign_in_returns_tokens_usable_for_me(pool: PgPool) {
    let (user, _) = common::create_user(&pool, "me@shop.test", "customer").await;
    let test = common::build_test_app(pool);

    let response = sign_in(test.app(), "me@shop.test", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = body_json(response).await["data"]["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let me = get_auth(test.app(), "/api/v1/auth/me", &token).await;
    assert_eq!(me.status(), StatusCode::OK);
    let json = body_json(me).await;
    assert_eq!(json["data"]["id"], user.id);
    assert!(json["data"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn wrong_password_is_unauthorized(pool: PgPool) {
    common::create_user(&pool, "wrong@shop.test", "customer").await;
    let test = common::build_test_app(pool);

    let response = sign_in(test.app(), "wrong@shop.test", "not-the-password-1").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = sign_in(test.app(), "ghost@shop.test", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn five_failures_lock_the_account(pool: PgPool) {
    common::create_user(&pool, "locked@shop.test", "customer").await;
    let test = common::build_test_app(pool);

    for _ in 0..5 {
        let response = sign_in(test.app(), "locked@shop.test", "bad-password-1").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Even the right password is refused while locked.
    let response = sign_in(test.app(), "locked@shop.test", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deactivated_account_cannot_sign_in(pool: PgPool) {
    let (user, _) = common::create_user(&pool, "gone@shop.test", "customer").await;
    UserRepo::deactivate(&pool, user.id).await.unwrap();
    let test = common::build_test_app(pool);

    let response = sign_in(test.app(), "gone@shop.test", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn refresh_token_rotates_and_cannot_be_reused(pool: PgPool) {
    common::create_user(&pool, "rotate@shop.test", "customer").await;
    let test = common::build_test_app(pool);

    let json = body_json(sign_in(test.app(), "rotate@shop.test", TEST_PASSWORD).await).await;
    let first = json["data"]["refresh_token"].as_str().unwrap().to_string();

    let response = post_json(
        test.app(),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": first }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let second = body_json(response).await["data"]["refresh_token"]
        .as_str()
        .unwrap()
        .to_string();
    assert_ne!(first, second);

    let reused = post_json(
        test.app(),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": first }),
    )
    .await;
    assert_eq!(reused.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn sign_out_revokes_refresh_tokens(pool: PgPool) {
    common::create_user(&pool, "out@shop.test", "customer").await;
    let test = common::build_test_app(pool);

    let json = body_json(sign_in(test.app(), "out@shop.test", TEST_PASSWORD).await).await;
    let access = json["data"]["access_token"].as_str().unwrap().to_string();
    let refresh = json["data"]["refresh_token"].as_str().unwrap().to_string();

    let response = post_json_auth(test.app(), "/api/v1/auth/sign-out", &access, json!({})).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(
        test.app(),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn change_password_requires_current_password(pool: PgPool) {
    let (_, token) = common::create_user(&pool, "pw@shop.test", "customer").await;
    let test = common::build_test_app(pool);

    let response = post_json_auth(
        test.app(),
        "/api/v1/auth/change-password",
        &token,
        json!({ "current_password": "nope-nope-1", "new_password": "brand-new-pass-9" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json_auth(
        test.app(),
        "/api/v1/auth/change-password",
        &token,
        json!({ "current_password": TEST_PASSWORD, "new_password": "brand-new-pass-9" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = sign_in(test.app(), "pw@shop.test", "brand-new-pass-9").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn customers_cannot_reach_admin_routes(pool: PgPool) {
    let token = common::create_customer(&pool).await;
    let test = common::build_test_app(pool);

    let response = get_auth(test.app(), "/api/v1/admin/users", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
