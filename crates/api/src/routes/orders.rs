//! Route definitions for the customer-facing `/orders` resource.
//!
//! Admin order management lives under `/admin/orders` (see [`super::admin`]).

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::orders;
use crate::state::AppState;

/// Routes mounted at `/orders`. All require auth.
///
/// ```text
/// GET  /             -> list_my_orders
/// POST /             -> checkout
/// GET  /{id}         -> get_my_order
/// POST /{id}/cancel  -> cancel_my_order
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list_my_orders).post(orders::checkout))
        .route("/{id}", get(orders::get_my_order))
        .route("/{id}/cancel", post(orders::cancel_my_order))
}
