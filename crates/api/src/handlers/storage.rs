//! Handlers for the `/admin/storage` resource.
//!
//! Stored images whose row has gone (a failed upload half-way through, a
//! crash between deleting a row and its object) are never referenced again.
//! These endpoints find them and remove them.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use storefront_core::storage::{find_orphans, MANAGED_PREFIXES};
use storefront_db::repositories::{CategoryRepo, ProductImageRepo};
use storefront_db::DbPool;
use storefront_storage::ObjectStorage;
use utoipa::ToSchema;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Keys in storage that no row references.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrphanReport {
    pub orphans: Vec<String>,
    pub count: usize,
}

/// Outcome of a cleanup run.
#[derive(Debug, Serialize, ToSchema)]
pub struct CleanupResult {
    pub deleted: usize,
    pub failed: usize,
}

/// Every stored key under the managed prefixes minus every referenced key.
async fn collect_orphans(
    pool: &DbPool,
    storage: &Arc<dyn ObjectStorage>,
) -> AppResult<Vec<String>> {
    let mut stored = Vec::new();
    for prefix in MANAGED_PREFIXES {
        stored.extend(storage.list(&format!("{prefix}/")).await?);
    }

    let mut referenced = ProductImageRepo::storage_paths(pool).await?;
    referenced.extend(CategoryRepo::image_paths(pool).await?);

    Ok(find_orphans(stored, referenced))
}

/// GET /admin/storage/orphans
///
/// Preview only. Nothing is deleted.
#[utoipa::path(
    get,
    path = "/api/v1/admin/storage/orphans",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Unreferenced keys, sorted", body = OrphanReport))
)]
pub async fn list_orphans(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<OrphanReport>>> {
    let orphans = collect_orphans(&state.pool, &state.storage).await?;
    Ok(Json(DataResponse {
        data: OrphanReport {
            count: orphans.len(),
            orphans,
        },
    }))
}

/// POST /admin/storage/cleanup
///
/// Deletes every orphan. Individual failures are counted and logged; the
/// run carries on with the remaining keys.
#[utoipa::path(
    post,
    path = "/api/v1/admin/storage/cleanup",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Deleted and failed counts", body = CleanupResult))
)]
pub async fn cleanup_orphans(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<CleanupResult>>> {
    let orphans = collect_orphans(&state.pool, &state.storage).await?;

    let mut deleted = 0;
    let mut failed = 0;
    for key in &orphans {
        match state.storage.delete(key).await {
            Ok(()) => deleted += 1,
            Err(e) => {
                failed += 1;
                tracing::warn!(error = %e, key = %key, "Failed to delete orphaned object");
            }
        }
    }

    tracing::info!(
        deleted,
        failed,
        backend = state.storage.name(),
        user_id = admin.user_id,
        "Storage orphan cleanup finished",
    );

    Ok(Json(DataResponse {
        data: CleanupResult { deleted, failed },
    }))
}
