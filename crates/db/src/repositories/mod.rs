//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod address_repo;
pub mod cart_repo;
pub mod category_repo;
pub mod contact_message_repo;
pub mod discount_repo;
pub mod order_repo;
pub mod product_image_repo;
pub mod product_repo;
pub mod session_repo;
pub mod tag_repo;
pub mod user_repo;
pub mod variant_repo;
pub mod wishlist_repo;

pub use address_repo::AddressRepo;
pub use cart_repo::CartRepo;
pub use category_repo::CategoryRepo;
pub use contact_message_repo::ContactMessageRepo;
pub use discount_repo::DiscountRepo;
pub use order_repo::OrderRepo;
pub use product_image_repo::ProductImageRepo;
pub use product_repo::ProductRepo;
pub use session_repo::SessionRepo;
pub use tag_repo::TagRepo;
pub use user_repo::UserRepo;
pub use variant_repo::VariantRepo;
pub use wishlist_repo::WishlistRepo;
