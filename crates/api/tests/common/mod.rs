//! Shared helpers for the API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use storefront_api::auth::jwt::{generate_access_token, JwtConfig};
use storefront_api::auth::password::hash_password;
use storefront_api::config::{ServerConfig, ShopConfig};
use storefront_api::router::build_app_router;
use storefront_api::state::AppState;
use storefront_db::models::user::{CreateUser, User};
use storefront_db::repositories::UserRepo;
use storefront_mail::RecordingMailer;
use storefront_storage::LocalStorage;

pub const TEST_PASSWORD: &str = "correct-horse-42";

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret".to_string(),
        access_token_expiry_mins: 15,
        refresh_token_expiry_days: 30,
    }
}

/// A `ServerConfig` with development defaults, staging uploads under `tmp`.
pub fn test_config(tmp: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        app_env: "test".to_string(),
        upload_tmp_dir: tmp.join("staging"),
        max_upload_bytes: 1024 * 1024,
        jwt: test_jwt_config(),
        shop: ShopConfig::default(),
    }
}

/// The router plus the handles a test may want to inspect afterwards.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
    /// Root of the local storage backend. Dropped with the app.
    pub dir: TempDir,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    pub fn uploads_root(&self) -> std::path::PathBuf {
        self.dir.path().join("uploads")
    }
}

/// Build the full application router (same middleware stack as `main.rs`)
/// with local storage in a temp dir and a recording mailer.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(dir.path());
    let uploads = dir.path().join("uploads");
    let mailer = Arc::new(RecordingMailer::new());

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        storage: Arc::new(LocalStorage::new(uploads.clone(), "/uploads")),
        mailer: mailer.clone(),
        admin_email: Some("owner@shop.test".to_string()),
    };

    let router = build_app_router(state.clone(), &config, Some(uploads));
    TestApp {
        router,
        state,
        mailer,
        dir,
    }
}

/// A pool that never connects. For tests that must not reach the database.
pub fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .connect_lazy("postgres://localhost/unused")
        .expect("lazy pool")
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`] and return it with a valid access token.
pub async fn create_user(pool: &PgPool, email: &str, role: &str) -> (User, String) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            password_hash: hash_password(TEST_PASSWORD).expect("hash"),
            full_name: Some("Test User".to_string()),
            role: role.to_string(),
        },
    )
    .await
    .expect("user creation should succeed");
    let token = generate_access_token(user.id, role, &test_jwt_config()).expect("token");
    (user, token)
}

pub async fn create_admin(pool: &PgPool) -> String {
    create_user(pool, "admin@shop.test", "admin").await.1
}

pub async fn create_customer(pool: &PgPool) -> String {
    create_user(pool, "customer@shop.test", "customer").await.1
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Multipart
// ---------------------------------------------------------------------------

pub const BOUNDARY: &str = "storefront-test-boundary";

/// One part of a multipart body: `(field name, file name, content type, bytes)`.
pub type Part<'a> = (&'a str, Option<&'a str>, Option<&'a str>, &'a [u8]);

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, file_name, content_type, bytes) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n").as_bytes(),
            ),
        }
        if let Some(content_type) = content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_request(uri: &str, token: Option<&str>, parts: &[Part<'_>]) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(multipart_body(parts))).unwrap()
}

// ---------------------------------------------------------------------------
// Catalog seeding (through the API, as an admin)
// ---------------------------------------------------------------------------

pub async fn create_category(
    app: Router,
    token: &str,
    name: &str,
    parent_id: Option<i64>,
) -> i64 {
    let response = post_json_auth(
        app,
        "/api/v1/categories",
        token,
        serde_json::json!({ "name": name, "parent_id": parent_id }),
    )
    .await;
    assert_eq!(response.status(), 201, "category creation should succeed");
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Create a product with one variant and return `(product_id, variant_id)`.
pub async fn create_product(
    app: Router,
    token: &str,
    category_id: i64,
    name: &str,
    sku: &str,
    stock: i32,
) -> (i64, i64) {
    let response = post_json_auth(
        app,
        "/api/v1/products",
        token,
        serde_json::json!({
            "category_id": category_id,
            "name": name,
            "variants": [{ "sku": sku, "size": "M", "price_cents": 2500, "stock": stock }],
        }),
    )
    .await;
    assert_eq!(response.status(), 201, "product creation should succeed");
    let json = body_json(response).await;
    (
        json["data"]["id"].as_i64().unwrap(),
        json["data"]["variants"][0]["id"].as_i64().unwrap(),
    )
}
