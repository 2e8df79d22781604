//! Route definitions for the `/admin` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{admin_users, contact, discounts, orders, storage};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /users                      -> list_users
/// GET    /users/{id}                 -> get_user
/// DELETE /users/{id}                 -> deactivate_user
/// PUT    /users/{id}/role            -> update_role
///
/// GET    /orders                     -> list_all_orders
/// PUT    /orders/{id}/status         -> update_order_status
///
/// GET    /discounts                  -> list_discounts
/// POST   /discounts                  -> create_discount
/// GET    /discounts/{id}             -> get_discount
/// PUT    /discounts/{id}             -> update_discount
/// DELETE /discounts/{id}             -> delete_discount
///
/// GET    /contact-messages           -> list_messages
/// PUT    /contact-messages/{id}/read -> mark_read
/// DELETE /contact-messages/{id}      -> delete_message
///
/// GET    /storage/orphans            -> list_orphans
/// POST   /storage/cleanup            -> cleanup_orphans
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin_users::list_users))
        .route(
            "/users/{id}",
            get(admin_users::get_user).delete(admin_users::deactivate_user),
        )
        .route("/users/{id}/role", put(admin_users::update_role))
        .route("/orders", get(orders::list_all_orders))
        .route("/orders/{id}/status", put(orders::update_order_status))
        .route(
            "/discounts",
            get(discounts::list_discounts).post(discounts::create_discount),
        )
        .route(
            "/discounts/{id}",
            get(discounts::get_discount)
                .put(discounts::update_discount)
                .delete(discounts::delete_discount),
        )
        .route("/contact-messages", get(contact::list_messages))
        .route("/contact-messages/{id}/read", put(contact::mark_read))
        .route(
            "/contact-messages/{id}",
            axum::routing::delete(contact::delete_message),
        )
        .route("/storage/orphans", get(storage::list_orphans))
        .route("/storage/cleanup", post(storage::cleanup_orphans))
}
