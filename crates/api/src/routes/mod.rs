pub mod admin;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod health;
pub mod orders;
pub mod products;
pub mod tags;
pub mod users;
pub mod wishlist;

use axum::routing::post;
use axum::Router;

use crate::handlers::{contact, discounts};
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/sign-up, /auth/sign-in, /auth/refresh      public
/// /auth/sign-out, /auth/me, /auth/change-password  requires auth
///
/// /users/me                                        profile (auth)
/// /users/me/addresses[/{id}[/default]]             address book (auth)
///
/// /categories[/tree|/slug/{slug}|/{id}[/...]]      public reads, admin writes
/// /product-tags[/{id}]                             public reads, admin writes
/// /products[/import|/slug/{slug}|/{id}[/...]]      public reads, admin writes
/// /products/variants/{id}, /products/images/{id}   admin
///
/// /cart[/items[/{id}]]                             auth
/// /wishlist[/{variant_id}]                         auth
/// /orders[/{id}[/cancel]]                          auth
/// /discounts/validate                              auth
/// /contact-messages                                public (POST)
///
/// /admin/users, /admin/orders, /admin/discounts,
/// /admin/contact-messages, /admin/storage          admin only
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication: sign-up, sign-in, token refresh, sign-out.
        .nest("/auth", auth::router())
        // The caller's own profile and address book.
        .nest("/users/me", users::router())
        // Catalog.
        .nest("/categories", categories::router())
        .nest("/product-tags", tags::router())
        .nest("/products", products::router())
        // Shopping.
        .nest("/cart", cart::router())
        .nest("/wishlist", wishlist::router())
        .nest("/orders", orders::router())
        .route("/discounts/validate", post(discounts::validate_discount))
        .route("/contact-messages", post(contact::create_message))
        // Back office.
        .nest("/admin", admin::router())
}
