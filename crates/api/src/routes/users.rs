//! Route definitions for the signed-in user's profile at `/users/me`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users/me`. All require auth.
///
/// ```text
/// GET    /                        -> get_profile
/// PUT    /                        -> update_profile
/// GET    /addresses               -> list_addresses
/// POST   /addresses               -> create_address
/// PUT    /addresses/{id}          -> update_address
/// DELETE /addresses/{id}          -> delete_address
/// POST   /addresses/{id}/default  -> set_default_address
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::get_profile).put(users::update_profile))
        .route(
            "/addresses",
            get(users::list_addresses).post(users::create_address),
        )
        .route(
            "/addresses/{id}",
            put(users::update_address).delete(users::delete_address),
        )
        .route("/addresses/{id}/default", post(users::set_default_address))
}
