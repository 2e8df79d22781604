//! Object storage for uploaded images.
//!
//! [`ObjectStorage`] is the seam the API talks to. Two backends exist:
//! [`LocalStorage`] writes under a directory that the API serves statically,
//! and [`S3Storage`] talks to any S3-compatible endpoint (AWS, MinIO,
//! Supabase storage).

use std::sync::Arc;

use async_trait::async_trait;

mod config;
mod local;
mod s3;

pub use config::{StorageBackend, StorageConfig};
pub use local::LocalStorage;
pub use s3::S3Storage;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid object key '{0}'")]
    InvalidKey(String),

    #[error("S3 error: {0}")]
    S3(String),

    #[error("Storage configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A flat key/value object store addressed by `/`-separated keys.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` under `key`, replacing any existing object.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing object is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Every key that starts with `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// URL clients use to fetch `key`.
    fn public_url(&self, key: &str) -> String;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}

/// Reject keys that could escape the storage root or are otherwise malformed.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.contains('\0')
        || key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if bad {
        Err(StorageError::InvalidKey(key.to_string()))
    } else {
        Ok(())
    }
}

pub(crate) fn join_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}

/// Build the backend selected by `config`.
pub async fn build_storage(config: &StorageConfig) -> Result<Arc<dyn ObjectStorage>, StorageError> {
    match &config.backend {
        StorageBackend::Local { root } => {
            tokio::fs::create_dir_all(root).await?;
            Ok(Arc::new(LocalStorage::new(root.clone(), &config.public_base_url)))
        }
        StorageBackend::S3 { .. } => Ok(Arc::new(S3Storage::from_config(config).await?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn keys_are_validated() {
        assert!(validate_key("products/1/a.jpg").is_ok());
        for bad in ["", "/abs.jpg", "products/../etc", "a//b", "a\\b", "./a", "a/"] {
            assert_matches!(validate_key(bad), Err(StorageError::InvalidKey(_)), "{bad:?}");
        }
    }

    #[test]
    fn urls_join_without_double_slash() {
        assert_eq!(join_url("/uploads/", "products/1/a.jpg"), "/uploads/products/1/a.jpg");
        assert_eq!(
            join_url("https://cdn.example.com", "categories/2/b.png"),
            "https://cdn.example.com/categories/2/b.png"
        );
    }
}
