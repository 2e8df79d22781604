use std::path::PathBuf;

use storefront_core::order::ShippingPolicy;

use crate::auth::jwt::JwtConfig;

/// Default cap on a single uploaded file (5 MiB).
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Deployment environment (`development`, `production`, ...).
    pub app_env: String,
    /// Directory where CSV uploads are staged while they are parsed.
    pub upload_tmp_dir: PathBuf,
    /// Largest accepted file in a multipart upload.
    pub max_upload_bytes: usize,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    pub shop: ShopConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `APP_ENV`              | `development`              |
    /// | `UPLOAD_TMP_DIR`       | `<system tmp>/storefront-uploads` |
    /// | `MAX_UPLOAD_BYTES`     | `5242880`                  |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());

        let upload_tmp_dir = std::env::var("UPLOAD_TMP_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir().join("storefront-uploads"));

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            app_env,
            upload_tmp_dir,
            max_upload_bytes,
            jwt: JwtConfig::from_env(),
            shop: ShopConfig::from_env(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }
}

/// Pricing knobs applied at checkout.
#[derive(Debug, Clone)]
pub struct ShopConfig {
    pub shipping: ShippingPolicy,
}

/// Default flat shipping fee in cents.
const DEFAULT_SHIPPING_FLAT_CENTS: i64 = 500;

/// Default subtotal in cents from which shipping is free.
const DEFAULT_FREE_SHIPPING_THRESHOLD_CENTS: i64 = 5000;

impl ShopConfig {
    /// | Env Var                         | Default |
    /// |---------------------------------|---------|
    /// | `SHIPPING_FLAT_CENTS`           | `500`   |
    /// | `FREE_SHIPPING_THRESHOLD_CENTS` | `5000` (`0` disables free shipping) |
    pub fn from_env() -> Self {
        let flat_cents: i64 = std::env::var("SHIPPING_FLAT_CENTS")
            .unwrap_or_else(|_| DEFAULT_SHIPPING_FLAT_CENTS.to_string())
            .parse()
            .expect("SHIPPING_FLAT_CENTS must be a valid i64");

        let threshold: i64 = std::env::var("FREE_SHIPPING_THRESHOLD_CENTS")
            .unwrap_or_else(|_| DEFAULT_FREE_SHIPPING_THRESHOLD_CENTS.to_string())
            .parse()
            .expect("FREE_SHIPPING_THRESHOLD_CENTS must be a valid i64");

        Self {
            shipping: ShippingPolicy {
                flat_cents,
                free_threshold_cents: (threshold > 0).then_some(threshold),
            },
        }
    }
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            shipping: ShippingPolicy {
                flat_cents: DEFAULT_SHIPPING_FLAT_CENTS,
                free_threshold_cents: Some(DEFAULT_FREE_SHIPPING_THRESHOLD_CENTS),
            },
        }
    }
}
