//! Admin user management.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use storefront_core::error::CoreError;
use storefront_core::roles::validate_role;
use storefront_core::types::DbId;
use storefront_db::models::user::{UpdateUserRole, UserResponse};
use storefront_db::repositories::{SessionRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::extractors::ValidatedJson;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn user_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "User", id })
}

/// GET /admin/users
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses((status = 200, description = "Users, newest first", body = [UserResponse]))
)]
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let (limit, offset) = params.clamped();
    let users = UserRepo::list(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// GET /admin/users/{id}
#[utoipa::path(
    get,
    path = "/api/v1/admin/users/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "No such user"),
    )
)]
pub async fn get_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| user_not_found(id))?;
    Ok(Json(DataResponse { data: user.into() }))
}

/// PUT /admin/users/{id}/role
///
/// Admins cannot change their own role, so the last admin cannot demote
/// themselves by accident.
#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}/role",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateUserRole,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Unknown role or own account"),
    )
)]
pub async fn update_role(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateUserRole>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if admin.user_id == id {
        return Err(AppError::Core(CoreError::Validation(
            "You cannot change your own role".into(),
        )));
    }
    validate_role(&input.role)?;

    let user = UserRepo::set_role(&state.pool, id, &input.role)
        .await?
        .ok_or_else(|| user_not_found(id))?;

    tracing::info!(user_id = id, role = %user.role, by = admin.user_id, "User role changed");
    Ok(Json(DataResponse { data: user.into() }))
}

/// DELETE /admin/users/{id}
///
/// Soft delete: the account is deactivated and its sessions revoked.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User id")),
    responses((status = 204, description = "User deactivated"))
)]
pub async fn deactivate_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if admin.user_id == id {
        return Err(AppError::Core(CoreError::Validation(
            "You cannot deactivate your own account".into(),
        )));
    }

    if !UserRepo::deactivate(&state.pool, id).await? {
        // Either missing or already inactive.
        UserRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or_else(|| user_not_found(id))?;
    }
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;

    tracing::info!(user_id = id, by = admin.user_id, "User deactivated");
    Ok(StatusCode::NO_CONTENT)
}
