//! Discount code validation and admin management.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use storefront_core::discount::{
    check_applicable, compute_discount_cents, normalize_code, validate_window, DiscountKind,
};
use storefront_core::error::CoreError;
use storefront_core::types::DbId;
use storefront_db::models::cart::CartView;
use storefront_db::models::discount::{
    CreateDiscount, Discount, DiscountQuote, UpdateDiscount, ValidateDiscount,
};
use storefront_db::repositories::{CartRepo, DiscountRepo};

use crate::error::{AppError, AppResult};
use crate::extractors::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn discount_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Discount",
        id,
    })
}

/// Resolve `code` and compute what it takes off `subtotal_cents` right now.
///
/// Unknown codes are reported as validation failures, the same as expired
/// or exhausted ones.
pub(crate) async fn quote_discount(
    state: &AppState,
    code: &str,
    subtotal_cents: i64,
) -> AppResult<(Discount, i64)> {
    let code = normalize_code(code);
    let discount = DiscountRepo::find_by_code(&state.pool, &code)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Discount code '{code}' is not valid"
            )))
        })?;

    check_applicable(&discount.terms(), subtotal_cents, Utc::now())?;
    let kind = DiscountKind::from_name(&discount.kind)?;
    let amount = compute_discount_cents(kind, discount.value, subtotal_cents);
    Ok((discount, amount))
}

/// POST /discounts/validate
#[utoipa::path(
    post,
    path = "/api/v1/discounts/validate",
    tag = "discounts",
    security(("bearer_auth" = [])),
    request_body = ValidateDiscount,
    responses(
        (status = 200, description = "Amount the code takes off", body = DiscountQuote),
        (status = 400, description = "Unknown, inactive, expired or exhausted code"),
    )
)]
pub async fn validate_discount(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(input): ValidatedJson<ValidateDiscount>,
) -> AppResult<Json<DataResponse<DiscountQuote>>> {
    let subtotal_cents = match input.subtotal_cents {
        Some(subtotal) => subtotal,
        None => {
            let cart = CartRepo::get_or_create(&state.pool, user.user_id).await?;
            let lines = CartRepo::lines(&state.pool, cart.id).await?;
            CartView::new(cart.id, lines).subtotal_cents
        }
    };

    let (discount, discount_cents) = quote_discount(&state, &input.code, subtotal_cents).await?;

    Ok(Json(DataResponse {
        data: DiscountQuote {
            code: discount.code,
            kind: discount.kind,
            value: discount.value,
            subtotal_cents,
            discount_cents,
        },
    }))
}

/// GET /admin/discounts
#[utoipa::path(
    get,
    path = "/api/v1/admin/discounts",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses((status = 200, description = "Discount codes, newest first", body = [Discount]))
)]
pub async fn list_discounts(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Discount>>>> {
    let (limit, offset) = params.clamped();
    let discounts = DiscountRepo::list(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data: discounts }))
}

/// GET /admin/discounts/{id}
#[utoipa::path(
    get,
    path = "/api/v1/admin/discounts/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Discount id")),
    responses((status = 200, description = "Discount", body = Discount))
)]
pub async fn get_discount(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Discount>>> {
    let discount = DiscountRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| discount_not_found(id))?;
    Ok(Json(DataResponse { data: discount }))
}

/// POST /admin/discounts
#[utoipa::path(
    post,
    path = "/api/v1/admin/discounts",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = CreateDiscount,
    responses(
        (status = 201, description = "Discount created", body = Discount),
        (status = 409, description = "Code already exists"),
    )
)]
pub async fn create_discount(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(mut input): ValidatedJson<CreateDiscount>,
) -> AppResult<(StatusCode, Json<DataResponse<Discount>>)> {
    let kind = DiscountKind::from_name(&input.kind)?;
    kind.validate_value(input.value)?;
    validate_window(input.starts_at, input.ends_at)?;
    input.kind = kind.name().to_string();

    let code = normalize_code(&input.code);
    if code.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Discount code must not be blank".into(),
        )));
    }

    let discount = DiscountRepo::create(&state.pool, &code, &input).await?;

    tracing::info!(
        discount_id = discount.id,
        code = %discount.code,
        user_id = admin.user_id,
        "Discount created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: discount })))
}

/// PUT /admin/discounts/{id}
///
/// Kind, value and window are validated against the merged result so a
/// partial update cannot leave an inconsistent row.
#[utoipa::path(
    put,
    path = "/api/v1/admin/discounts/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Discount id")),
    request_body = UpdateDiscount,
    responses((status = 200, description = "Updated discount", body = Discount))
)]
pub async fn update_discount(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(mut input): ValidatedJson<UpdateDiscount>,
) -> AppResult<Json<DataResponse<Discount>>> {
    let current = DiscountRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| discount_not_found(id))?;

    let kind = DiscountKind::from_name(input.kind.as_deref().unwrap_or(&current.kind))?;
    kind.validate_value(input.value.unwrap_or(current.value))?;
    validate_window(
        input.starts_at.or(current.starts_at),
        input.ends_at.or(current.ends_at),
    )?;
    if input.kind.is_some() {
        input.kind = Some(kind.name().to_string());
    }

    let discount = DiscountRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| discount_not_found(id))?;

    tracing::info!(discount_id = id, user_id = admin.user_id, "Discount updated");
    Ok(Json(DataResponse { data: discount }))
}

/// DELETE /admin/discounts/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/admin/discounts/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Discount id")),
    responses((status = 204, description = "Discount deleted"))
)]
pub async fn delete_discount(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !DiscountRepo::delete(&state.pool, id).await? {
        return Err(discount_not_found(id));
    }
    tracing::info!(discount_id = id, user_id = admin.user_id, "Discount deleted");
    Ok(StatusCode::NO_CONTENT)
}
