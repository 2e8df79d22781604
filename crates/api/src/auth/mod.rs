//! Token and password primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- access-token signing/validation and refresh-token hashing.

pub mod jwt;
pub mod password;
