//! Route definitions for the `/products` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::products;
use crate::state::AppState;

/// Routes mounted at `/products`.
///
/// Reads are public; writes require the `admin` role.
///
/// ```text
/// GET    /                   -> list_products
/// POST   /                   -> create_product
/// POST   /import             -> import_products (multipart CSV)
/// GET    /slug/{slug}        -> get_product_by_slug
/// GET    /{id}               -> get_product
/// PUT    /{id}               -> update_product
/// DELETE /{id}               -> delete_product
/// PUT    /{id}/tags          -> set_product_tags
/// POST   /{id}/variants      -> create_variant
/// POST   /{id}/images        -> upload_product_images (multipart)
/// PUT    /variants/{id}      -> update_variant
/// DELETE /variants/{id}      -> delete_variant
/// DELETE /images/{id}        -> delete_product_image
/// PUT    /images/{id}/main   -> set_main_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(products::list_products).post(products::create_product),
        )
        .route("/import", post(products::import_products))
        .route("/slug/{slug}", get(products::get_product_by_slug))
        .route(
            "/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/{id}/tags", put(products::set_product_tags))
        .route("/{id}/variants", post(products::create_variant))
        .route("/{id}/images", post(products::upload_product_images))
        .route(
            "/variants/{id}",
            put(products::update_variant).delete(products::delete_variant),
        )
        .route("/images/{id}", delete(products::delete_product_image))
        .route("/images/{id}/main", put(products::set_main_image))
}
