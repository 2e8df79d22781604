//! Route definitions for the `/product-tags` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::tags;
use crate::state::AppState;

/// Routes mounted at `/product-tags`.
///
/// ```text
/// GET    /      -> list_tags
/// POST   /      -> create_tag (admin)
/// PUT    /{id}  -> update_tag (admin)
/// DELETE /{id}  -> delete_tag (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tags::list_tags).post(tags::create_tag))
        .route("/{id}", put(tags::update_tag).delete(tags::delete_tag))
}
