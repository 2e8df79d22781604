//! Image optimization and storage glue used by the category and product handlers.

use std::sync::Arc;

use storefront_core::image::optimize_image;
use storefront_core::storage::object_key;
use storefront_core::types::DbId;
use storefront_storage::ObjectStorage;

use crate::error::{AppError, AppResult};
use crate::extractors::UploadedImage;

/// An object written to storage.
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub key: String,
    pub url: String,
}

/// Optimize `image` off the async runtime and store it under
/// `{prefix}/{owner_id}/{uuid}.{ext}`.
pub async fn store_image(
    storage: &Arc<dyn ObjectStorage>,
    prefix: &str,
    owner_id: DbId,
    image: UploadedImage,
) -> AppResult<StoredImage> {
    let original_len = image.bytes.len();
    let content_type = image.content_type;
    let processed = tokio::task::spawn_blocking(move || optimize_image(image.bytes, &content_type))
        .await
        .map_err(|e| AppError::InternalError(format!("Image task failed: {e}")))?;

    let key = object_key(prefix, owner_id, processed.extension);
    let stored_len = processed.bytes.len();
    storage
        .put(&key, processed.bytes, &processed.content_type)
        .await?;

    tracing::info!(
        key = %key,
        original_len,
        stored_len,
        optimized = processed.optimized,
        "Image stored",
    );

    Ok(StoredImage {
        url: storage.public_url(&key),
        key,
    })
}

/// Delete stored objects, logging failures instead of returning them.
pub async fn delete_objects_best_effort<I>(storage: &Arc<dyn ObjectStorage>, keys: I)
where
    I: IntoIterator<Item = String>,
{
    for key in keys {
        if let Err(e) = storage.delete(&key).await {
            tracing::warn!(error = %e, key = %key, "Failed to delete stored object");
        }
    }
}
