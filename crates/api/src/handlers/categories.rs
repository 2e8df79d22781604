//! Handlers for the `/categories` resource.
//!
//! Hierarchy rules are evaluated by `storefront_core::category_tree` against
//! the `(id, parent_id)` projection loaded for each write.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use storefront_core::category_tree::{
    build_tree, check_depth, check_reparent, ensure_deletable, TreeNode,
};
use storefront_core::error::CoreError;
use storefront_core::slug::{slug_or_derive, slugify};
use storefront_core::storage::CATEGORY_PREFIX;
use storefront_core::types::DbId;
use storefront_db::models::category::{Category, CreateCategory, UpdateCategory};
use storefront_db::repositories::CategoryRepo;
use utoipa::IntoParams;

use super::require_slug;
use crate::error::{AppError, AppResult};
use crate::extractors::{ImageUpload, ValidatedJson};
use crate::media::{delete_objects_best_effort, store_image};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{is_admin, RequireAdmin};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CategoryListParams {
    /// Include inactive categories. Honoured for admins only.
    #[serde(default)]
    pub include_inactive: bool,
}

fn category_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Category",
        id,
    })
}

/// Only admins asking for inactive rows get them.
async fn active_only(
    state: &AppState,
    user: Option<&AuthUser>,
    include_inactive: bool,
) -> AppResult<bool> {
    Ok(!(include_inactive && is_admin(state, user).await?))
}

/// Hide inactive categories from everyone but admins.
async fn visible_category(
    state: &AppState,
    user: Option<&AuthUser>,
    category: Option<Category>,
    not_found: impl FnOnce() -> AppError,
) -> AppResult<Category> {
    let category = category.ok_or_else(not_found)?;
    if !category.is_active && !is_admin(state, user).await? {
        return Err(category_not_found(category.id));
    }
    Ok(category)
}

/// GET /categories
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    tag = "categories",
    params(CategoryListParams),
    responses((status = 200, description = "Flat category list", body = [Category]))
)]
pub async fn list_categories(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Query(params): Query<CategoryListParams>,
) -> AppResult<Json<DataResponse<Vec<Category>>>> {
    let active_only = active_only(&state, user.as_ref(), params.include_inactive).await?;
    let categories = CategoryRepo::list(&state.pool, active_only).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// GET /categories/tree
#[utoipa::path(
    get,
    path = "/api/v1/categories/tree",
    tag = "categories",
    params(CategoryListParams),
    responses((status = 200, description = "Nested categories; each node carries `children`", body = [Category]))
)]
pub async fn category_tree(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Query(params): Query<CategoryListParams>,
) -> AppResult<Json<DataResponse<Vec<TreeNode<Category>>>>> {
    let active_only = active_only(&state, user.as_ref(), params.include_inactive).await?;
    let categories = CategoryRepo::list(&state.pool, active_only).await?;
    Ok(Json(DataResponse {
        data: build_tree(categories),
    }))
}

/// GET /categories/slug/{slug}
#[utoipa::path(
    get,
    path = "/api/v1/categories/slug/{slug}",
    tag = "categories",
    params(("slug" = String, Path, description = "Category slug")),
    responses(
        (status = 200, description = "Category", body = Category),
        (status = 404, description = "No such category"),
    )
)]
pub async fn get_category_by_slug(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<Category>>> {
    let row = CategoryRepo::find_by_slug(&state.pool, &slug).await?;
    let category = visible_category(&state, user.as_ref(), row, || {
        AppError::Core(CoreError::NotFoundBy {
            entity: "Category",
            field: "slug",
            value: slug.clone(),
        })
    })
    .await?;
    Ok(Json(DataResponse { data: category }))
}

/// GET /categories/{id}
#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    tag = "categories",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category", body = Category),
        (status = 404, description = "No such category"),
    )
)]
pub async fn get_category(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Category>>> {
    let row = CategoryRepo::find_by_id(&state.pool, id).await?;
    let category = visible_category(&state, user.as_ref(), row, || category_not_found(id)).await?;
    Ok(Json(DataResponse { data: category }))
}

/// GET /categories/{id}/subcategories
#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}/subcategories",
    tag = "categories",
    params(("id" = i64, Path, description = "Parent category id"), CategoryListParams),
    responses((status = 200, description = "Direct children", body = [Category]))
)]
pub async fn list_subcategories(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(id): Path<DbId>,
    Query(params): Query<CategoryListParams>,
) -> AppResult<Json<DataResponse<Vec<Category>>>> {
    CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| category_not_found(id))?;
    let active_only = active_only(&state, user.as_ref(), params.include_inactive).await?;
    let children = CategoryRepo::list_children(&state.pool, id, active_only).await?;
    Ok(Json(DataResponse { data: children }))
}

/// POST /categories
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    tag = "categories",
    security(("bearer_auth" = [])),
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Parent missing or tree too deep"),
        (status = 409, description = "Slug already in use"),
    )
)]
pub async fn create_category(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateCategory>,
) -> AppResult<(StatusCode, Json<DataResponse<Category>>)> {
    if let Some(parent_id) = input.parent_id {
        if CategoryRepo::find_by_id(&state.pool, parent_id).await?.is_none() {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Parent category {parent_id} does not exist"
            ))));
        }
        let links = CategoryRepo::links(&state.pool).await?;
        check_depth(&links, Some(parent_id), 1)?;
    }

    let slug = require_slug(slug_or_derive(input.slug.as_deref(), &input.name))?;
    let category = CategoryRepo::create(&state.pool, &input, &slug).await?;

    tracing::info!(
        category_id = category.id,
        user_id = admin.user_id,
        "Category created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// PUT /categories/{id}
#[utoipa::path(
    put,
    path = "/api/v1/categories/{id}",
    tag = "categories",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Category id")),
    request_body = UpdateCategory,
    responses(
        (status = 200, description = "Updated category", body = Category),
        (status = 400, description = "Cycle or depth violation"),
    )
)]
pub async fn update_category(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateCategory>,
) -> AppResult<Json<DataResponse<Category>>> {
    CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| category_not_found(id))?;

    if let Some(new_parent) = input.parent_id {
        if let Some(parent_id) = new_parent {
            if parent_id != id && CategoryRepo::find_by_id(&state.pool, parent_id).await?.is_none()
            {
                return Err(AppError::Core(CoreError::Validation(format!(
                    "Parent category {parent_id} does not exist"
                ))));
            }
        }
        let links = CategoryRepo::links(&state.pool).await?;
        check_reparent(&links, id, new_parent)?;
    }

    let slug = input
        .slug
        .as_deref()
        .map(|s| require_slug(slugify(s)))
        .transpose()?;
    let category = CategoryRepo::update(&state.pool, id, &input, slug.as_deref())
        .await?
        .ok_or_else(|| category_not_found(id))?;

    tracing::info!(category_id = id, user_id = admin.user_id, "Category updated");
    Ok(Json(DataResponse { data: category }))
}

/// DELETE /categories/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    tag = "categories",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 409, description = "Category still has subcategories or products"),
    )
)]
pub async fn delete_category(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| category_not_found(id))?;

    let children = CategoryRepo::count_children(&state.pool, id).await?;
    let products = CategoryRepo::count_products(&state.pool, id).await?;
    ensure_deletable(children, products)?;

    let deleted = CategoryRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(|| category_not_found(id))?;

    delete_objects_best_effort(&state.storage, deleted.image_path).await;

    tracing::info!(category_id = id, user_id = admin.user_id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /categories/{id}/image
///
/// Multipart with a single `file` field. Replaces any existing image.
#[utoipa::path(
    post,
    path = "/api/v1/categories/{id}/image",
    tag = "categories",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Category id")),
    request_body(content_type = "multipart/form-data", description = "Single `file` field"),
    responses(
        (status = 200, description = "Category with its new image", body = Category),
        (status = 400, description = "Missing file or not an accepted image type"),
    )
)]
pub async fn upload_category_image(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    upload: ImageUpload,
) -> AppResult<Json<DataResponse<Category>>> {
    CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| category_not_found(id))?;

    let file = upload.single()?;
    let stored = store_image(&state.storage, CATEGORY_PREFIX, id, file).await?;

    let updated =
        match CategoryRepo::set_image(&state.pool, id, Some(&stored.key), Some(&stored.url)).await
        {
            Ok(Some(updated)) => updated,
            Ok(None) => {
                delete_objects_best_effort(&state.storage, [stored.key]).await;
                return Err(category_not_found(id));
            }
            Err(e) => {
                delete_objects_best_effort(&state.storage, [stored.key]).await;
                return Err(e.into());
            }
        };
    let (category, previous) = updated;

    delete_objects_best_effort(&state.storage, previous).await;

    tracing::info!(
        category_id = id,
        user_id = admin.user_id,
        key = %stored.key,
        "Category image uploaded",
    );
    Ok(Json(DataResponse { data: category }))
}

/// DELETE /categories/{id}/image
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}/image",
    tag = "categories",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Category id")),
    responses((status = 200, description = "Category without image", body = Category))
)]
pub async fn delete_category_image(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Category>>> {
    let (category, previous) = CategoryRepo::set_image(&state.pool, id, None, None)
        .await?
        .ok_or_else(|| category_not_found(id))?;

    delete_objects_best_effort(&state.storage, previous).await;

    tracing::info!(category_id = id, user_id = admin.user_id, "Category image removed");
    Ok(Json(DataResponse { data: category }))
}
