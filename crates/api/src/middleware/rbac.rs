//! Role checks against the database.
//!
//! Token claims can be stale after a role change or deactivation, so these
//! guards always read the user's current `role` and `is_active` columns.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use storefront_core::error::CoreError;
use storefront_core::roles::{has_any_role, ROLE_ADMIN};
use storefront_db::repositories::UserRepo;

use super::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Fail unless `user` is active and currently holds one of `roles`.
pub async fn require_role(state: &AppState, user: &AuthUser, roles: &[&str]) -> AppResult<()> {
    let access = UserRepo::access(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    if !access.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }
    if !has_any_role(&access.role, roles) {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Requires one of the roles: {}",
            roles.join(", ")
        ))));
    }
    Ok(())
}

/// Whether the optional caller is an active admin. Never fails on a
/// non-admin; use it to widen what a public endpoint shows.
pub async fn is_admin(state: &AppState, user: Option<&AuthUser>) -> AppResult<bool> {
    let Some(user) = user else {
        return Ok(false);
    };
    let access = UserRepo::access(&state.pool, user.user_id).await?;
    Ok(access.is_some_and(|a| a.is_active && has_any_role(&a.role, &[ROLE_ADMIN])))
}

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(admin): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        require_role(state, &user, &[ROLE_ADMIN]).await?;
        Ok(RequireAdmin(user))
    }
}
