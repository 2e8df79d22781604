//! Contact form submissions and their admin inbox.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use storefront_core::error::CoreError;
use storefront_core::types::DbId;
use storefront_db::models::contact::{ContactListParams, ContactMessage, CreateContactMessage};
use storefront_db::repositories::ContactMessageRepo;
use storefront_mail::{send_in_background, templates};

use crate::error::{AppError, AppResult};
use crate::extractors::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::page;
use crate::response::DataResponse;
use crate::state::AppState;

fn message_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "ContactMessage",
        id,
    })
}

/// POST /contact-messages
///
/// Open to anonymous visitors. Signed-in senders are linked to their account.
#[utoipa::path(
    post,
    path = "/api/v1/contact-messages",
    tag = "contact",
    request_body = CreateContactMessage,
    responses((status = 201, description = "Message stored", body = ContactMessage))
)]
pub async fn create_message(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    ValidatedJson(input): ValidatedJson<CreateContactMessage>,
) -> AppResult<(StatusCode, Json<DataResponse<ContactMessage>>)> {
    let message =
        ContactMessageRepo::create(&state.pool, &input, user.as_ref().map(|u| u.user_id)).await?;

    tracing::info!(message_id = message.id, "Contact message received");

    if let Some(admin_address) = state.admin_email.as_deref() {
        send_in_background(
            state.mailer.clone(),
            templates::contact_notification(
                admin_address,
                &message.name,
                &message.email,
                message.subject.as_deref().unwrap_or("(no subject)"),
                &message.message,
            ),
        );
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: message })))
}

/// GET /admin/contact-messages
#[utoipa::path(
    get,
    path = "/api/v1/admin/contact-messages",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(ContactListParams),
    responses((status = 200, description = "Messages, newest first", body = [ContactMessage]))
)]
pub async fn list_messages(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ContactListParams>,
) -> AppResult<Json<DataResponse<Vec<ContactMessage>>>> {
    let (limit, offset) = page(params.limit, params.offset);
    let messages = ContactMessageRepo::list(
        &state.pool,
        params.unread.unwrap_or(false),
        limit,
        offset,
    )
    .await?;
    Ok(Json(DataResponse { data: messages }))
}

/// PUT /admin/contact-messages/{id}/read
#[utoipa::path(
    put,
    path = "/api/v1/admin/contact-messages/{id}/read",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Message id")),
    responses((status = 200, description = "Message marked read", body = ContactMessage))
)]
pub async fn mark_read(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ContactMessage>>> {
    let message = ContactMessageRepo::mark_read(&state.pool, id)
        .await?
        .ok_or_else(|| message_not_found(id))?;
    Ok(Json(DataResponse { data: message }))
}

/// DELETE /admin/contact-messages/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/admin/contact-messages/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Message id")),
    responses((status = 204, description = "Message deleted"))
)]
pub async fn delete_message(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ContactMessageRepo::delete(&state.pool, id).await? {
        return Err(message_not_found(id));
    }
    tracing::info!(message_id = id, user_id = admin.user_id, "Contact message deleted");
    Ok(StatusCode::NO_CONTENT)
}
