//! OpenAPI document for the `/api/v1` surface, served at `/api-docs/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use storefront_db::models::address::{Address, CreateAddress, UpdateAddress};
use storefront_db::models::cart::{AddCartItem, Cart, CartItem, CartLine, CartView, UpdateCartItem};
use storefront_db::models::category::{Category, CreateCategory, UpdateCategory};
use storefront_db::models::contact::{ContactMessage, CreateContactMessage};
use storefront_db::models::discount::{
    CreateDiscount, Discount, DiscountQuote, UpdateDiscount, ValidateDiscount,
};
use storefront_db::models::order::{
    CheckoutRequest, Order, OrderDetail, OrderItem, ShippingAddressInput, UpdateOrderStatus,
};
use storefront_db::models::product::{
    CreateProduct, CreateVariant, Product, ProductDetail, ProductImage, ProductSummary,
    ProductVariant, UpdateProduct, UpdateVariant,
};
use storefront_db::models::tag::{CreateTag, ProductTag, SetProductTags, UpdateTag};
use storefront_db::models::user::{UpdateProfile, UpdateUserRole, UserResponse};
use storefront_db::models::wishlist::{AddWishlistItem, WishlistAddResult, WishlistEntry};

use crate::handlers::auth::{
    AuthResponse, ChangePasswordRequest, RefreshRequest, SignInRequest, SignUpRequest,
};
use crate::handlers::storage::{CleanupResult, OrphanReport};
use crate::handlers::{
    admin_users, auth, cart, categories, contact, discounts, orders, products, storage, tags,
    users, wishlist,
};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(title = "Storefront API", description = "Catalog, cart, checkout and back office"),
    paths(
        auth::sign_up,
        auth::sign_in,
        auth::refresh,
        auth::sign_out,
        auth::me,
        auth::change_password,
        users::get_profile,
        users::update_profile,
        users::list_addresses,
        users::create_address,
        users::update_address,
        users::set_default_address,
        users::delete_address,
        admin_users::list_users,
        admin_users::get_user,
        admin_users::update_role,
        admin_users::deactivate_user,
        categories::list_categories,
        categories::category_tree,
        categories::get_category_by_slug,
        categories::get_category,
        categories::list_subcategories,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        categories::upload_category_image,
        categories::delete_category_image,
        tags::list_tags,
        tags::create_tag,
        tags::update_tag,
        tags::delete_tag,
        products::list_products,
        products::get_product,
        products::get_product_by_slug,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::set_product_tags,
        products::create_variant,
        products::update_variant,
        products::delete_variant,
        products::upload_product_images,
        products::delete_product_image,
        products::set_main_image,
        products::import_products,
        cart::get_cart,
        cart::add_item,
        cart::update_item,
        cart::remove_item,
        cart::clear_cart,
        wishlist::list_wishlist,
        wishlist::add_to_wishlist,
        wishlist::remove_from_wishlist,
        wishlist::clear_wishlist,
        orders::checkout,
        orders::list_my_orders,
        orders::get_my_order,
        orders::cancel_my_order,
        orders::list_all_orders,
        orders::update_order_status,
        discounts::validate_discount,
        discounts::list_discounts,
        discounts::get_discount,
        discounts::create_discount,
        discounts::update_discount,
        discounts::delete_discount,
        contact::create_message,
        contact::list_messages,
        contact::mark_read,
        contact::delete_message,
        storage::list_orphans,
        storage::cleanup_orphans,
    ),
    components(schemas(
        SignUpRequest, SignInRequest, RefreshRequest, ChangePasswordRequest, AuthResponse,
        UserResponse, UpdateProfile, UpdateUserRole,
        Address, CreateAddress, UpdateAddress,
        Category, CreateCategory, UpdateCategory,
        ProductTag, CreateTag, UpdateTag, SetProductTags,
        Product, ProductSummary, ProductDetail, CreateProduct, UpdateProduct,
        ProductVariant, CreateVariant, UpdateVariant, ProductImage,
        Cart, CartItem, CartLine, CartView, AddCartItem, UpdateCartItem,
        WishlistEntry, AddWishlistItem, WishlistAddResult,
        Order, OrderItem, OrderDetail, ShippingAddressInput, CheckoutRequest, UpdateOrderStatus,
        Discount, CreateDiscount, UpdateDiscount, ValidateDiscount, DiscountQuote,
        ContactMessage, CreateContactMessage,
        OrphanReport, CleanupResult,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Sign-up, sign-in and token refresh"),
        (name = "users", description = "The caller's profile and address book"),
        (name = "categories", description = "Category hierarchy"),
        (name = "tags", description = "Product tags"),
        (name = "products", description = "Products, variants, images and CSV import"),
        (name = "cart", description = "Shopping cart"),
        (name = "wishlist", description = "Saved variants"),
        (name = "orders", description = "Checkout and order history"),
        (name = "discounts", description = "Discount codes"),
        (name = "contact", description = "Contact form"),
        (name = "admin", description = "Back office"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by `security(...)` on handlers.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Mount the document at the root, next to `/health`.
pub fn router() -> Router<AppState> {
    Router::new().route("/api-docs/openapi.json", get(openapi_json))
}
