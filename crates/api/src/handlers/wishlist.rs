//! Handlers for the signed-in user's `/wishlist`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use storefront_core::error::CoreError;
use storefront_core::types::DbId;
use storefront_db::models::wishlist::{AddWishlistItem, WishlistAddResult, WishlistEntry};
use storefront_db::repositories::{VariantRepo, WishlistRepo};

use crate::error::{AppError, AppResult};
use crate::extractors::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /wishlist
#[utoipa::path(
    get,
    path = "/api/v1/wishlist",
    tag = "wishlist",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Saved variants, newest first", body = [WishlistEntry]))
)]
pub async fn list_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<WishlistEntry>>>> {
    let entries = WishlistRepo::list(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: entries }))
}

/// POST /wishlist
///
/// Idempotent: saving a variant twice answers `200` with `created: false`
/// and leaves a single row.
#[utoipa::path(
    post,
    path = "/api/v1/wishlist",
    tag = "wishlist",
    security(("bearer_auth" = [])),
    request_body = AddWishlistItem,
    responses(
        (status = 201, description = "Variant saved", body = WishlistAddResult),
        (status = 200, description = "Variant was already saved", body = WishlistAddResult),
        (status = 404, description = "No such variant"),
    )
)]
pub async fn add_to_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(input): ValidatedJson<AddWishlistItem>,
) -> AppResult<(StatusCode, Json<DataResponse<WishlistAddResult>>)> {
    VariantRepo::find_by_id(&state.pool, input.variant_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ProductVariant",
            id: input.variant_id,
        }))?;

    let created = WishlistRepo::add(&state.pool, user.user_id, input.variant_id).await?;
    let status = if created {
        tracing::info!(user_id = user.user_id, variant_id = input.variant_id, "Wishlist item added");
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(DataResponse {
            data: WishlistAddResult {
                variant_id: input.variant_id,
                created,
            },
        }),
    ))
}

/// DELETE /wishlist/{variant_id}
#[utoipa::path(
    delete,
    path = "/api/v1/wishlist/{variant_id}",
    tag = "wishlist",
    security(("bearer_auth" = [])),
    params(("variant_id" = i64, Path, description = "Saved variant id")),
    responses((status = 204, description = "Removed"))
)]
pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(variant_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !WishlistRepo::remove(&state.pool, user.user_id, variant_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "WishlistItem",
            id: variant_id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /wishlist
#[utoipa::path(
    delete,
    path = "/api/v1/wishlist",
    tag = "wishlist",
    security(("bearer_auth" = [])),
    responses((status = 204, description = "Wishlist emptied"))
)]
pub async fn clear_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<StatusCode> {
    let removed = WishlistRepo::clear(&state.pool, user.user_id).await?;
    tracing::info!(user_id = user.user_id, removed, "Wishlist cleared");
    Ok(StatusCode::NO_CONTENT)
}
