//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the bearer-token user; `Option<AuthUser>` for optional auth.
//! - [`rbac::RequireAdmin`] -- requires the `admin` role as stored in the database.

pub mod auth;
pub mod rbac;
