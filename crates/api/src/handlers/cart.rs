//! Handlers for the signed-in user's `/cart`.
//!
//! Quantities never exceed the variant's stock at the time of the request;
//! stock is re-checked (and decremented) at checkout.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use storefront_core::cart::{resolve_add_quantity, validate_set_quantity};
use storefront_core::error::CoreError;
use storefront_core::types::DbId;
use storefront_db::is_unique_violation;
use storefront_db::models::cart::{AddCartItem, CartView, UpdateCartItem};
use storefront_db::models::product::VariantWithProduct;
use storefront_db::repositories::{CartRepo, VariantRepo};

use crate::error::{AppError, AppResult};
use crate::extractors::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

fn item_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "CartItem",
        id,
    })
}

async fn load_cart(state: &AppState, cart_id: DbId) -> AppResult<CartView> {
    let lines = CartRepo::lines(&state.pool, cart_id).await?;
    Ok(CartView::new(cart_id, lines))
}

/// A variant that can currently be bought.
async fn purchasable_variant(state: &AppState, variant_id: DbId) -> AppResult<VariantWithProduct> {
    let variant = VariantRepo::find_with_product(&state.pool, variant_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ProductVariant",
            id: variant_id,
        }))?;
    if !variant.is_active || !variant.product_is_active {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Variant {variant_id} is not available"
        ))));
    }
    Ok(variant)
}

/// GET /cart
#[utoipa::path(
    get,
    path = "/api/v1/cart",
    tag = "cart",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Cart with line totals", body = CartView))
)]
pub async fn get_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<CartView>>> {
    let cart = CartRepo::get_or_create(&state.pool, user.user_id).await?;
    let view = load_cart(&state, cart.id).await?;
    Ok(Json(DataResponse { data: view }))
}

/// POST /cart/items
///
/// Adding a variant already in the cart increases its quantity. A request
/// racing with another add for the same variant loses the insert with a
/// unique violation and falls back to updating the row that won.
#[utoipa::path(
    post,
    path = "/api/v1/cart/items",
    tag = "cart",
    security(("bearer_auth" = [])),
    request_body = AddCartItem,
    responses(
        (status = 200, description = "Updated cart", body = CartView),
        (status = 409, description = "Not enough stock"),
    )
)]
pub async fn add_item(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(input): ValidatedJson<AddCartItem>,
) -> AppResult<Json<DataResponse<CartView>>> {
    let variant = purchasable_variant(&state, input.variant_id).await?;
    let cart = CartRepo::get_or_create(&state.pool, user.user_id).await?;

    match CartRepo::find_item(&state.pool, cart.id, variant.id).await? {
        Some(existing) => {
            let quantity = resolve_add_quantity(existing.quantity, input.quantity, variant.stock)?;
            CartRepo::set_quantity(&state.pool, existing.id, quantity).await?;
        }
        None => {
            let quantity = resolve_add_quantity(0, input.quantity, variant.stock)?;
            match CartRepo::insert_item(&state.pool, cart.id, variant.id, quantity).await {
                Ok(_) => {}
                Err(e) if is_unique_violation(&e) => {
                    tracing::debug!(
                        cart_id = cart.id,
                        variant_id = variant.id,
                        "Concurrent cart add, merging into existing line",
                    );
                    let existing = CartRepo::find_item(&state.pool, cart.id, variant.id)
                        .await?
                        .ok_or_else(|| {
                            AppError::InternalError("Cart line vanished after conflict".into())
                        })?;
                    let quantity =
                        resolve_add_quantity(existing.quantity, input.quantity, variant.stock)?;
                    CartRepo::set_quantity(&state.pool, existing.id, quantity).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    tracing::info!(
        user_id = user.user_id,
        variant_id = variant.id,
        quantity = input.quantity,
        "Cart item added",
    );

    let view = load_cart(&state, cart.id).await?;
    Ok(Json(DataResponse { data: view }))
}

/// PUT /cart/items/{id}
#[utoipa::path(
    put,
    path = "/api/v1/cart/items/{id}",
    tag = "cart",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Cart item id")),
    request_body = UpdateCartItem,
    responses(
        (status = 200, description = "Updated cart", body = CartView),
        (status = 409, description = "Not enough stock"),
    )
)]
pub async fn update_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(item_id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateCartItem>,
) -> AppResult<Json<DataResponse<CartView>>> {
    let item = CartRepo::find_item_for_user(&state.pool, item_id, user.user_id)
        .await?
        .ok_or_else(|| item_not_found(item_id))?;
    let variant = purchasable_variant(&state, item.variant_id).await?;

    let quantity = validate_set_quantity(input.quantity, variant.stock)?;
    CartRepo::set_quantity(&state.pool, item.id, quantity)
        .await?
        .ok_or_else(|| item_not_found(item_id))?;

    let view = load_cart(&state, item.cart_id).await?;
    Ok(Json(DataResponse { data: view }))
}

/// DELETE /cart/items/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/cart/items/{id}",
    tag = "cart",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Cart item id")),
    responses((status = 204, description = "Item removed"))
)]
pub async fn remove_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(item_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !CartRepo::delete_item(&state.pool, item_id, user.user_id).await? {
        return Err(item_not_found(item_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /cart
#[utoipa::path(
    delete,
    path = "/api/v1/cart",
    tag = "cart",
    security(("bearer_auth" = [])),
    responses((status = 204, description = "Cart emptied"))
)]
pub async fn clear_cart(State(state): State<AppState>, user: AuthUser) -> AppResult<StatusCode> {
    let cart = CartRepo::get_or_create(&state.pool, user.user_id).await?;
    let removed = CartRepo::clear(&state.pool, cart.id).await?;
    tracing::info!(user_id = user.user_id, removed, "Cart cleared");
    Ok(StatusCode::NO_CONTENT)
}
