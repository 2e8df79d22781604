//! Route definitions for the `/wishlist` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::wishlist;
use crate::state::AppState;

/// Routes mounted at `/wishlist`. All require auth.
///
/// ```text
/// GET    /              -> list_wishlist
/// POST   /              -> add_to_wishlist
/// DELETE /              -> clear_wishlist
/// DELETE /{variant_id}  -> remove_from_wishlist
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(wishlist::list_wishlist)
                .post(wishlist::add_to_wishlist)
                .delete(wishlist::clear_wishlist),
        )
        .route("/{variant_id}", delete(wishlist::remove_from_wishlist))
}
