//! Route definitions for the `/categories` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::categories;
use crate::state::AppState;

/// Routes mounted at `/categories`.
///
/// Reads are public; writes require the `admin` role.
///
/// ```text
/// GET    /                     -> list_categories
/// POST   /                     -> create_category
/// GET    /tree                 -> category_tree
/// GET    /slug/{slug}          -> get_category_by_slug
/// GET    /{id}                 -> get_category
/// PUT    /{id}                 -> update_category
/// DELETE /{id}                 -> delete_category
/// GET    /{id}/subcategories   -> list_subcategories
/// POST   /{id}/image           -> upload_category_image
/// DELETE /{id}/image           -> delete_category_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(categories::list_categories).post(categories::create_category),
        )
        .route("/tree", get(categories::category_tree))
        .route("/slug/{slug}", get(categories::get_category_by_slug))
        .route(
            "/{id}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .route("/{id}/subcategories", get(categories::list_subcategories))
        .route(
            "/{id}/image",
            post(categories::upload_category_image).delete(categories::delete_category_image),
        )
}
