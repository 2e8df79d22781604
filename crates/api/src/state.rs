use std::sync::Arc;

use storefront_mail::Mailer;
use storefront_storage::ObjectStorage;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: storefront_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Image storage backend (local disk or S3).
    pub storage: Arc<dyn ObjectStorage>,
    /// Outbound email provider.
    pub mailer: Arc<dyn Mailer>,
    /// Recipient of contact-form notifications, if configured.
    pub admin_email: Option<String>,
}
