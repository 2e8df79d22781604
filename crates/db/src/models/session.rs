//! Refresh-token session model and DTOs.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A row from the `user_sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserSession {
    pub id: i64,
    pub user_id: i64,
    pub refresh_token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub is_revoked: bool,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new session.
pub struct CreateSession {
    pub user_id: i64,
    pub refresh_token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}
