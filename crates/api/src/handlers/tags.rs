//! Handlers for the `/product-tags` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use storefront_core::error::CoreError;
use storefront_core::slug::{slug_or_derive, slugify};
use storefront_core::types::DbId;
use storefront_db::models::tag::{CreateTag, ProductTag, UpdateTag};
use storefront_db::repositories::TagRepo;

use super::require_slug;
use crate::error::{AppError, AppResult};
use crate::extractors::ValidatedJson;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

fn tag_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "ProductTag",
        id,
    })
}

/// GET /product-tags
#[utoipa::path(
    get,
    path = "/api/v1/product-tags",
    tag = "tags",
    responses((status = 200, description = "All tags by name", body = [ProductTag]))
)]
pub async fn list_tags(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ProductTag>>>> {
    let tags = TagRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: tags }))
}

/// POST /product-tags
#[utoipa::path(
    post,
    path = "/api/v1/product-tags",
    tag = "tags",
    security(("bearer_auth" = [])),
    request_body = CreateTag,
    responses(
        (status = 201, description = "Tag created", body = ProductTag),
        (status = 409, description = "Slug already in use"),
    )
)]
pub async fn create_tag(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateTag>,
) -> AppResult<(StatusCode, Json<DataResponse<ProductTag>>)> {
    let slug = require_slug(slug_or_derive(input.slug.as_deref(), &input.name))?;
    let tag = TagRepo::create(&state.pool, input.name.trim(), &slug).await?;

    tracing::info!(tag_id = tag.id, user_id = admin.user_id, "Tag created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: tag })))
}

/// PUT /product-tags/{id}
#[utoipa::path(
    put,
    path = "/api/v1/product-tags/{id}",
    tag = "tags",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Tag id")),
    request_body = UpdateTag,
    responses((status = 200, description = "Updated tag", body = ProductTag))
)]
pub async fn update_tag(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateTag>,
) -> AppResult<Json<DataResponse<ProductTag>>> {
    let slug = input
        .slug
        .as_deref()
        .map(|s| require_slug(slugify(s)))
        .transpose()?;
    let tag = TagRepo::update(&state.pool, id, &input, slug.as_deref())
        .await?
        .ok_or_else(|| tag_not_found(id))?;

    tracing::info!(tag_id = id, user_id = admin.user_id, "Tag updated");
    Ok(Json(DataResponse { data: tag }))
}

/// DELETE /product-tags/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/product-tags/{id}",
    tag = "tags",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Tag id")),
    responses((status = 204, description = "Tag deleted"))
)]
pub async fn delete_tag(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !TagRepo::delete(&state.pool, id).await? {
        return Err(tag_not_found(id));
    }
    tracing::info!(tag_id = id, user_id = admin.user_id, "Tag deleted");
    Ok(StatusCode::NO_CONTENT)
}
