//! Storefront domain logic.
//!
//! Pure functions and types shared by the database and HTTP crates. Nothing
//! in here performs I/O; the only seam to the outside world is the
//! [`import::ImportSink`] trait, which the database crate implements.

pub mod cart;
pub mod catalog;
pub mod category_tree;
pub mod discount;
pub mod error;
pub mod image;
pub mod import;
pub mod money;
pub mod order;
pub mod pagination;
pub mod roles;
pub mod slug;
pub mod storage;
pub mod types;
