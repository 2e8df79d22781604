//! Self-service handlers for the signed-in user: profile and saved addresses.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use storefront_core::error::CoreError;
use storefront_core::types::DbId;
use storefront_db::models::address::{Address, CreateAddress, UpdateAddress};
use storefront_db::models::user::{UpdateProfile, UserResponse};
use storefront_db::repositories::{AddressRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::extractors::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

fn address_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Address",
        id,
    })
}

/// GET /users/me
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "users",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Profile", body = UserResponse))
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let row = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user.user_id,
        }))?;
    Ok(Json(DataResponse { data: row.into() }))
}

/// PUT /users/me
#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = UpdateProfile,
    responses((status = 200, description = "Updated profile", body = UserResponse))
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(input): ValidatedJson<UpdateProfile>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let row = UserRepo::update_profile(&state.pool, user.user_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user.user_id,
        }))?;
    Ok(Json(DataResponse { data: row.into() }))
}

/// GET /users/me/addresses
#[utoipa::path(
    get,
    path = "/api/v1/users/me/addresses",
    tag = "users",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Saved addresses, default first", body = [Address]))
)]
pub async fn list_addresses(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Address>>>> {
    let addresses = AddressRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: addresses }))
}

/// POST /users/me/addresses
#[utoipa::path(
    post,
    path = "/api/v1/users/me/addresses",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = CreateAddress,
    responses((status = 201, description = "Address saved", body = Address))
)]
pub async fn create_address(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(input): ValidatedJson<CreateAddress>,
) -> AppResult<(StatusCode, Json<DataResponse<Address>>)> {
    let address = AddressRepo::create(&state.pool, user.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: address })))
}

/// PUT /users/me/addresses/{id}
#[utoipa::path(
    put,
    path = "/api/v1/users/me/addresses/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Address id")),
    request_body = UpdateAddress,
    responses(
        (status = 200, description = "Updated address", body = Address),
        (status = 404, description = "Not one of the caller's addresses"),
    )
)]
pub async fn update_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateAddress>,
) -> AppResult<Json<DataResponse<Address>>> {
    let address = AddressRepo::update(&state.pool, id, user.user_id, &input)
        .await?
        .ok_or_else(|| address_not_found(id))?;
    Ok(Json(DataResponse { data: address }))
}

/// POST /users/me/addresses/{id}/default
#[utoipa::path(
    post,
    path = "/api/v1/users/me/addresses/{id}/default",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Address id")),
    responses((status = 200, description = "New default address", body = Address))
)]
pub async fn set_default_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Address>>> {
    let address = AddressRepo::set_default(&state.pool, id, user.user_id)
        .await?
        .ok_or_else(|| address_not_found(id))?;
    Ok(Json(DataResponse { data: address }))
}

/// DELETE /users/me/addresses/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/users/me/addresses/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Address id")),
    responses((status = 204, description = "Address deleted"))
)]
pub async fn delete_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if AddressRepo::delete(&state.pool, id, user.user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(address_not_found(id))
    }
}
