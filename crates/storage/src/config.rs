use std::path::PathBuf;

use crate::StorageError;

/// Default directory for the local backend.
const DEFAULT_LOCAL_DIR: &str = "./uploads";

/// Route the API serves the local directory under.
pub const LOCAL_PUBLIC_PATH: &str = "/uploads";

const DEFAULT_S3_REGION: &str = "us-east-1";

#[derive(Debug, Clone)]
pub enum StorageBackend {
    Local {
        root: PathBuf,
    },
    S3 {
        bucket: String,
        region: String,
        /// Custom endpoint (MinIO, Supabase). Enables path-style addressing.
        endpoint: Option<String>,
        /// Explicit credentials; the default AWS chain is used when absent.
        access_key_id: Option<String>,
        secret_access_key: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Prefix joined with object keys to form public URLs.
    pub public_base_url: String,
}

impl StorageConfig {
    /// Load storage configuration from environment variables.
    ///
    /// | Variable               | Default                     |
    /// |------------------------|-----------------------------|
    /// | `STORAGE_BACKEND`      | `local` (`local` or `s3`)   |
    /// | `STORAGE_LOCAL_DIR`    | `./uploads`                 |
    /// | `STORAGE_PUBLIC_URL`   | `/uploads` or bucket URL    |
    /// | `S3_BUCKET`            | required for `s3`           |
    /// | `S3_REGION`            | `us-east-1`                 |
    /// | `S3_ENDPOINT`          | none                        |
    /// | `S3_ACCESS_KEY_ID`     | none (AWS default chain)    |
    /// | `S3_SECRET_ACCESS_KEY` | none (AWS default chain)    |
    pub fn from_env() -> Result<Self, StorageError> {
        let backend_name = std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "local".into());
        let public_override = std::env::var("STORAGE_PUBLIC_URL").ok();

        match backend_name.as_str() {
            "local" => {
                let root = std::env::var("STORAGE_LOCAL_DIR")
                    .unwrap_or_else(|_| DEFAULT_LOCAL_DIR.into());
                Ok(Self::local(root, public_override))
            }
            "s3" => {
                let bucket = std::env::var("S3_BUCKET")
                    .map_err(|_| StorageError::Config("S3_BUCKET must be set".into()))?;
                let region =
                    std::env::var("S3_REGION").unwrap_or_else(|_| DEFAULT_S3_REGION.into());
                let endpoint = std::env::var("S3_ENDPOINT").ok();
                let public_base_url = public_override.unwrap_or_else(|| match &endpoint {
                    Some(ep) => format!("{}/{bucket}", ep.trim_end_matches('/')),
                    None => format!("https://{bucket}.s3.{region}.amazonaws.com"),
                });
                Ok(Self {
                    backend: StorageBackend::S3 {
                        bucket,
                        region,
                        endpoint,
                        access_key_id: std::env::var("S3_ACCESS_KEY_ID").ok(),
                        secret_access_key: std::env::var("S3_SECRET_ACCESS_KEY").ok(),
                    },
                    public_base_url,
                })
            }
            other => Err(StorageError::Config(format!(
                "Unknown STORAGE_BACKEND '{other}'. Must be one of: local, s3"
            ))),
        }
    }

    /// Local backend rooted at `root`.
    pub fn local(root: impl Into<PathBuf>, public_base_url: Option<String>) -> Self {
        Self {
            backend: StorageBackend::Local { root: root.into() },
            public_base_url: public_base_url.unwrap_or_else(|| LOCAL_PUBLIC_PATH.into()),
        }
    }

    /// Directory to serve statically, if the backend is local.
    pub fn local_root(&self) -> Option<&PathBuf> {
        match &self.backend {
            StorageBackend::Local { root } => Some(root),
            StorageBackend::S3 { .. } => None,
        }
    }
}
