//! Checkout and order handlers, for customers and admins.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use storefront_core::error::CoreError;
use storefront_core::order::{check_transition, compute_totals, OrderStatus, STATUS_CANCELLED};
use storefront_core::types::DbId;
use storefront_db::models::order::{
    CheckoutOutcome, CheckoutRequest, NewOrder, NewOrderItem, Order, OrderDetail, OrderItem,
    OrderListParams, ShippingAddressInput, UpdateOrderStatus,
};
use storefront_db::repositories::{AddressRepo, CartRepo, OrderRepo, UserRepo, VariantRepo};
use storefront_mail::templates::{self, OrderEmail, OrderEmailLine};
use storefront_mail::send_in_background;

use super::discounts::quote_discount;
use crate::error::{AppError, AppResult};
use crate::extractors::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::page;
use crate::response::DataResponse;
use crate::state::AppState;

fn order_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Order", id })
}

/// Parse an optional `?status=` filter.
fn status_filter(status: Option<&str>) -> AppResult<Option<&'static str>> {
    Ok(status
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(OrderStatus::from_name)
        .transpose()?
        .map(OrderStatus::name))
}

fn variant_label(item: &OrderItem) -> String {
    let parts: Vec<&str> = [item.size.as_deref(), item.color.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if parts.is_empty() {
        item.sku.clone()
    } else {
        parts.join(" / ")
    }
}

fn confirmation_email(detail: &OrderDetail) -> OrderEmail {
    let order = &detail.order;
    OrderEmail {
        order_id: order.id,
        lines: detail
            .items
            .iter()
            .map(|item| OrderEmailLine {
                product_name: item.product_name.clone(),
                variant_label: variant_label(item),
                quantity: item.quantity,
                line_total_cents: item.line_total_cents,
            })
            .collect(),
        subtotal_cents: order.subtotal_cents,
        discount_cents: order.discount_cents,
        shipping_cents: order.shipping_cents,
        total_cents: order.total_cents,
    }
}

async fn load_detail(state: &AppState, order: Order) -> AppResult<OrderDetail> {
    let items = OrderRepo::items(&state.pool, order.id).await?;
    Ok(OrderDetail { order, items })
}

// ---------------------------------------------------------------------------
// Customer endpoints
// ---------------------------------------------------------------------------

/// POST /orders
///
/// Turns the caller's cart into an order. Prices are taken from the
/// variants at checkout time; stock, the discount use and the emptied cart
/// are committed in one transaction.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    tag = "orders",
    security(("bearer_auth" = [])),
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderDetail),
        (status = 400, description = "Empty cart, bad address or unusable discount"),
        (status = 409, description = "Not enough stock"),
    )
)]
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(input): ValidatedJson<CheckoutRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<OrderDetail>>)> {
    let address: ShippingAddressInput = match (input.shipping_address_id, input.shipping_address) {
        (Some(address_id), None) => AddressRepo::find_for_user(&state.pool, address_id, user.user_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Address",
                id: address_id,
            }))?
            .into(),
        (None, Some(inline)) => inline,
        _ => {
            return Err(AppError::Core(CoreError::Validation(
                "Provide exactly one of shipping_address_id or shipping_address".into(),
            )))
        }
    };

    let cart = CartRepo::get_or_create(&state.pool, user.user_id).await?;
    let lines = CartRepo::lines(&state.pool, cart.id).await?;
    if lines.is_empty() {
        return Err(AppError::Core(CoreError::Validation("Cart is empty".into())));
    }

    let mut items = Vec::with_capacity(lines.len());
    for line in &lines {
        let variant = VariantRepo::find_with_product(&state.pool, line.variant_id)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Validation(format!(
                    "SKU '{}' is no longer available",
                    line.sku
                )))
            })?;
        if !variant.is_active || !variant.product_is_active {
            return Err(AppError::Core(CoreError::Validation(format!(
                "SKU '{}' is no longer available",
                variant.sku
            ))));
        }
        if variant.stock < line.quantity {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Insufficient stock for SKU '{}': {} available",
                variant.sku, variant.stock
            ))));
        }
        items.push(NewOrderItem {
            variant_id: variant.id,
            product_id: variant.product_id,
            product_name: variant.product_name,
            sku: variant.sku,
            size: variant.size,
            color: variant.color,
            unit_price_cents: variant.price_cents,
            quantity: line.quantity,
        });
    }

    let subtotal_cents: i64 = items.iter().map(NewOrderItem::line_total_cents).sum();
    let discount = match input.discount_code.as_deref() {
        Some(code) => Some(quote_discount(&state, code, subtotal_cents).await?),
        None => None,
    };
    let discount_cents = discount.as_ref().map(|(_, cents)| *cents).unwrap_or(0);

    let totals = compute_totals(
        items.iter().map(NewOrderItem::line_total_cents),
        discount_cents,
        state.config.shop.shipping,
    );

    let new_order = NewOrder {
        user_id: user.user_id,
        cart_id: cart.id,
        subtotal_cents: totals.subtotal_cents,
        discount_cents: totals.discount_cents,
        shipping_cents: totals.shipping_cents,
        total_cents: totals.total_cents,
        discount_id: discount.as_ref().map(|(d, _)| d.id),
        discount_code: discount.map(|(d, _)| d.code),
        address,
        notes: input.notes,
        items,
    };

    let detail = match OrderRepo::checkout(&state.pool, &new_order).await? {
        CheckoutOutcome::Placed(detail) => detail,
        CheckoutOutcome::InsufficientStock { sku } => {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Insufficient stock for SKU '{sku}'"
            ))))
        }
        CheckoutOutcome::DiscountExhausted => {
            return Err(AppError::Core(CoreError::Validation(
                "Discount code has reached its usage limit".into(),
            )))
        }
    };

    tracing::info!(
        order_id = detail.order.id,
        user_id = user.user_id,
        total_cents = detail.order.total_cents,
        items = detail.items.len(),
        "Order placed",
    );

    match UserRepo::find_by_id(&state.pool, user.user_id).await {
        Ok(Some(customer)) => send_in_background(
            state.mailer.clone(),
            templates::order_confirmation(&customer.email, &confirmation_email(&detail)),
        ),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, order_id = detail.order.id, "Skipping order email"),
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: detail })))
}

/// GET /orders
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    tag = "orders",
    security(("bearer_auth" = [])),
    params(OrderListParams),
    responses((status = 200, description = "The caller's orders, newest first", body = [Order]))
)]
pub async fn list_my_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<OrderListParams>,
) -> AppResult<Json<DataResponse<Vec<Order>>>> {
    let status = status_filter(params.status.as_deref())?;
    let (limit, offset) = page(params.limit, params.offset);
    let orders = OrderRepo::list(&state.pool, Some(user.user_id), status, limit, offset).await?;
    Ok(Json(DataResponse { data: orders }))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    tag = "orders",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order with items", body = OrderDetail),
        (status = 404, description = "Not one of the caller's orders"),
    )
)]
pub async fn get_my_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<OrderDetail>>> {
    let order = OrderRepo::find_for_user(&state.pool, id, user.user_id)
        .await?
        .ok_or_else(|| order_not_found(id))?;
    let detail = load_detail(&state, order).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// POST /orders/{id}/cancel
///
/// Allowed while the order is `pending` or `paid`. Stock is restored.
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/cancel",
    tag = "orders",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Cancelled order", body = Order),
        (status = 409, description = "Order can no longer be cancelled"),
    )
)]
pub async fn cancel_my_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Order>>> {
    let order = OrderRepo::find_for_user(&state.pool, id, user.user_id)
        .await?
        .ok_or_else(|| order_not_found(id))?;

    let current = OrderStatus::from_name(&order.status)?;
    if !current.is_cancellable() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "An order that is '{}' can no longer be cancelled",
            current.name()
        ))));
    }

    let cancelled = OrderRepo::transition(&state.pool, id, current.name(), STATUS_CANCELLED)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Order status changed, please reload".into(),
            ))
        })?;

    tracing::info!(order_id = id, user_id = user.user_id, "Order cancelled by customer");
    Ok(Json(DataResponse { data: cancelled }))
}

// ---------------------------------------------------------------------------
// Admin endpoints
// ---------------------------------------------------------------------------

/// GET /admin/orders
#[utoipa::path(
    get,
    path = "/api/v1/admin/orders",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(OrderListParams),
    responses((status = 200, description = "All orders, newest first", body = [Order]))
)]
pub async fn list_all_orders(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<OrderListParams>,
) -> AppResult<Json<DataResponse<Vec<Order>>>> {
    let status = status_filter(params.status.as_deref())?;
    let (limit, offset) = page(params.limit, params.offset);
    let orders = OrderRepo::list(&state.pool, None, status, limit, offset).await?;
    Ok(Json(DataResponse { data: orders }))
}

/// PUT /admin/orders/{id}/status
#[utoipa::path(
    put,
    path = "/api/v1/admin/orders/{id}/status",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Order id")),
    request_body = UpdateOrderStatus,
    responses(
        (status = 200, description = "Updated order", body = Order),
        (status = 409, description = "Transition not allowed"),
    )
)]
pub async fn update_order_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateOrderStatus>,
) -> AppResult<Json<DataResponse<Order>>> {
    let order = OrderRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| order_not_found(id))?;

    let current = OrderStatus::from_name(&order.status)?;
    let next = OrderStatus::from_name(input.status.trim())?;
    check_transition(current, next)?;

    let updated = OrderRepo::transition(&state.pool, id, current.name(), next.name())
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Order status changed, please reload".into(),
            ))
        })?;

    tracing::info!(
        order_id = id,
        from = current.name(),
        to = next.name(),
        user_id = admin.user_id,
        "Order status updated",
    );
    Ok(Json(DataResponse { data: updated }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn status_filter_accepts_known_and_blank() {
        assert_eq!(status_filter(None).unwrap(), None);
        assert_eq!(status_filter(Some("  ")).unwrap(), None);
        assert_eq!(status_filter(Some("paid")).unwrap(), Some("paid"));
    }

    #[test]
    fn status_filter_rejects_unknown() {
        assert_matches!(
            status_filter(Some("lost")),
            Err(AppError::Core(CoreError::Validation(_)))
        );
    }
}
