//! Handlers for the `/products` resource: catalog listing, product CRUD,
//! variants, images, tags and the CSV import.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use storefront_core::catalog::{filter_variants, price_range, ProductSort, VariantFilter};
use storefront_core::category_tree::descendant_ids;
use storefront_core::error::CoreError;
use storefront_core::import::{import_rows, parse_csv_file, ImportReport, ParsedRow};
use storefront_core::slug::{slug_or_derive, slugify};
use storefront_core::storage::PRODUCT_PREFIX;
use storefront_core::types::DbId;
use storefront_db::import_sink::PgImportSink;
use storefront_db::models::product::{
    CreateProduct, CreateProductImage, CreateVariant, Product, ProductDetail, ProductFilter,
    ProductImage, ProductListParams, ProductSummary, ProductVariant, UpdateProduct,
    UpdateVariant,
};
use storefront_db::models::tag::{ProductTag, SetProductTags};
use storefront_db::repositories::{
    CategoryRepo, ProductImageRepo, ProductRepo, TagRepo, VariantRepo,
};
use tokio::io::AsyncWriteExt;

use super::require_slug;
use crate::error::{AppError, AppResult};
use crate::extractors::{ImageUpload, ValidatedJson};
use crate::media::{delete_objects_best_effort, store_image};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{is_admin, RequireAdmin};
use crate::query::{page, ImportParams};
use crate::response::DataResponse;
use crate::state::AppState;

fn product_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Product",
        id,
    })
}

fn variant_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "ProductVariant",
        id,
    })
}

fn image_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "ProductImage",
        id,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

async fn ensure_category_exists(state: &AppState, category_id: DbId) -> AppResult<()> {
    if CategoryRepo::find_by_id(&state.pool, category_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Category {category_id} does not exist"
        ))));
    }
    Ok(())
}

async fn ensure_sku_free(state: &AppState, sku: &str) -> AppResult<()> {
    if VariantRepo::sku_exists(&state.pool, sku).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "SKU '{sku}' is already in use"
        ))));
    }
    Ok(())
}

/// Order two effective prices; products without a price always sort last.
fn price_order(a: Option<i64>, b: Option<i64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) if descending => y.cmp(&x),
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// GET /products
///
/// Product-level filters run in SQL. Size and price filters apply to
/// variants after a single batched variant query; products left without a
/// matching variant are dropped. When a variant filter or a price sort is
/// present the whole match set is fetched and paginated in process.
#[utoipa::path(
    get,
    path = "/api/v1/products",
    tag = "products",
    params(ProductListParams),
    responses(
        (status = 200, description = "Product summaries", body = [ProductSummary]),
        (status = 400, description = "Invalid sort or price range"),
    )
)]
pub async fn list_products(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Query(params): Query<ProductListParams>,
) -> AppResult<Json<DataResponse<Vec<ProductSummary>>>> {
    let sort = ProductSort::parse(params.sort.as_deref())?;
    let variant_filter = VariantFilter::new(params.size, params.min_price, params.max_price)?;
    let (limit, offset) = page(params.limit, params.offset);
    let show_inactive = is_admin(&state, user.as_ref()).await?;

    let category_ids = match params.category_id {
        Some(root) => {
            let links = CategoryRepo::links(&state.pool).await?;
            if !links.iter().any(|l| l.id == root) {
                return Err(AppError::Core(CoreError::NotFound {
                    entity: "Category",
                    id: root,
                }));
            }
            Some(descendant_ids(&links, root))
        }
        None => None,
    };

    let filter = ProductFilter {
        category_ids,
        tag_slug: non_blank(params.tag),
        material: non_blank(params.material),
        search: non_blank(params.search),
        featured: params.featured,
        active_only: !show_inactive,
    };

    let paginate_in_process = variant_filter.is_active() || sort.sorts_by_price();
    let sql_page = (!paginate_in_process).then_some((limit, offset));
    let products = ProductRepo::list(&state.pool, &filter, sort.order_by_sql(), sql_page).await?;

    let ids: Vec<DbId> = products.iter().map(|p| p.id).collect();
    let mut variants_by_product: HashMap<DbId, Vec<ProductVariant>> = HashMap::new();
    for variant in VariantRepo::list_for_products(&state.pool, &ids, !show_inactive).await? {
        variants_by_product
            .entry(variant.product_id)
            .or_default()
            .push(variant);
    }

    let mut summaries: Vec<ProductSummary> = Vec::with_capacity(products.len());
    for product in products {
        let variants = filter_variants(
            variants_by_product.remove(&product.id).unwrap_or_default(),
            &variant_filter,
        );
        if variant_filter.is_active() && variants.is_empty() {
            continue;
        }
        let range = price_range(&variants);
        summaries.push(ProductSummary {
            product,
            main_image_url: None,
            min_price_cents: range.map(|(lo, _)| lo),
            max_price_cents: range.map(|(_, hi)| hi),
            variants,
        });
    }

    if sort.sorts_by_price() {
        let descending = sort == ProductSort::PriceDesc;
        summaries.sort_by(|a, b| price_order(a.min_price_cents, b.min_price_cents, descending));
    }

    if paginate_in_process {
        summaries = summaries
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
    }

    let page_ids: Vec<DbId> = summaries.iter().map(|s| s.product.id).collect();
    let main_urls: HashMap<DbId, String> = ProductImageRepo::main_urls(&state.pool, &page_ids)
        .await?
        .into_iter()
        .collect();
    for summary in &mut summaries {
        summary.main_image_url = main_urls.get(&summary.product.id).cloned();
    }

    Ok(Json(DataResponse { data: summaries }))
}

/// Assemble the product page payload. Non-admins only see active variants.
async fn load_detail(
    state: &AppState,
    product: Product,
    show_inactive: bool,
) -> AppResult<ProductDetail> {
    let mut variants = VariantRepo::list_for_product(&state.pool, product.id).await?;
    if !show_inactive {
        variants.retain(|v| v.is_active);
    }
    let images = ProductImageRepo::list_for_product(&state.pool, product.id).await?;
    let tags = TagRepo::list_for_product(&state.pool, product.id).await?;
    Ok(ProductDetail {
        product,
        variants,
        images,
        tags,
    })
}

async fn visible_detail(
    state: &AppState,
    user: Option<&AuthUser>,
    product: Product,
) -> AppResult<ProductDetail> {
    let show_inactive = is_admin(state, user).await?;
    if !product.is_active && !show_inactive {
        return Err(product_not_found(product.id));
    }
    load_detail(state, product, show_inactive).await
}

/// GET /products/{id}
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    tag = "products",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product with variants, images and tags", body = ProductDetail),
        (status = 404, description = "No such product"),
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProductDetail>>> {
    let product = ProductRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| product_not_found(id))?;
    let detail = visible_detail(&state, user.as_ref(), product).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// GET /products/slug/{slug}
#[utoipa::path(
    get,
    path = "/api/v1/products/slug/{slug}",
    tag = "products",
    params(("slug" = String, Path, description = "Product slug")),
    responses(
        (status = 200, description = "Product with variants, images and tags", body = ProductDetail),
        (status = 404, description = "No such product"),
    )
)]
pub async fn get_product_by_slug(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<ProductDetail>>> {
    let product = ProductRepo::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFoundBy {
                entity: "Product",
                field: "slug",
                value: slug.clone(),
            })
        })?;
    let detail = visible_detail(&state, user.as_ref(), product).await?;
    Ok(Json(DataResponse { data: detail }))
}

// ---------------------------------------------------------------------------
// Product CRUD (admin)
// ---------------------------------------------------------------------------

/// POST /products
#[utoipa::path(
    post,
    path = "/api/v1/products",
    tag = "products",
    security(("bearer_auth" = [])),
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created", body = ProductDetail),
        (status = 409, description = "Slug or SKU already in use"),
    )
)]
pub async fn create_product(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(mut input): ValidatedJson<CreateProduct>,
) -> AppResult<(StatusCode, Json<DataResponse<ProductDetail>>)> {
    ensure_category_exists(&state, input.category_id).await?;

    let mut seen = HashSet::new();
    for variant in input.variants.iter_mut().flatten() {
        variant.sku = variant.sku.trim().to_string();
        if !seen.insert(variant.sku.clone()) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "SKU '{}' appears more than once",
                variant.sku
            ))));
        }
        ensure_sku_free(&state, &variant.sku).await?;
    }

    let slug = require_slug(slug_or_derive(input.slug.as_deref(), &input.name))?;
    let product = ProductRepo::create(&state.pool, &input, &slug).await?;

    tracing::info!(
        product_id = product.id,
        user_id = admin.user_id,
        variants = seen.len(),
        "Product created",
    );

    let detail = load_detail(&state, product, true).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: detail })))
}

/// PUT /products/{id}
#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    tag = "products",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Product id")),
    request_body = UpdateProduct,
    responses((status = 200, description = "Updated product", body = Product))
)]
pub async fn update_product(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> AppResult<Json<DataResponse<Product>>> {
    if let Some(category_id) = input.category_id {
        ensure_category_exists(&state, category_id).await?;
    }
    let slug = input
        .slug
        .as_deref()
        .map(|s| require_slug(slugify(s)))
        .transpose()?;

    let product = ProductRepo::update(&state.pool, id, &input, slug.as_deref())
        .await?
        .ok_or_else(|| product_not_found(id))?;

    tracing::info!(product_id = id, user_id = admin.user_id, "Product updated");
    Ok(Json(DataResponse { data: product }))
}

/// DELETE /products/{id}
///
/// Variants, images and tag links go with the product; stored image objects
/// are removed best-effort afterwards.
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    tag = "products",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 409, description = "Product is referenced by orders"),
    )
)]
pub async fn delete_product(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let keys = ProductRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(|| product_not_found(id))?;
    let image_count = keys.len();

    delete_objects_best_effort(&state.storage, keys).await;

    tracing::info!(
        product_id = id,
        user_id = admin.user_id,
        image_count,
        "Product deleted",
    );
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /products/{id}/tags
#[utoipa::path(
    put,
    path = "/api/v1/products/{id}/tags",
    tag = "products",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Product id")),
    request_body = SetProductTags,
    responses(
        (status = 200, description = "The product's new tag set", body = [ProductTag]),
        (status = 409, description = "Unknown tag id"),
    )
)]
pub async fn set_product_tags(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<SetProductTags>,
) -> AppResult<Json<DataResponse<Vec<ProductTag>>>> {
    ProductRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| product_not_found(id))?;

    ProductRepo::set_tags(&state.pool, id, &input.tag_ids).await?;
    let tags = TagRepo::list_for_product(&state.pool, id).await?;

    tracing::info!(product_id = id, user_id = admin.user_id, tags = tags.len(), "Product tags set");
    Ok(Json(DataResponse { data: tags }))
}

// ---------------------------------------------------------------------------
// Variants (admin)
// ---------------------------------------------------------------------------

/// POST /products/{id}/variants
#[utoipa::path(
    post,
    path = "/api/v1/products/{id}/variants",
    tag = "products",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Product id")),
    request_body = CreateVariant,
    responses(
        (status = 201, description = "Variant created", body = ProductVariant),
        (status = 409, description = "SKU already in use"),
    )
)]
pub async fn create_variant(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(product_id): Path<DbId>,
    ValidatedJson(mut input): ValidatedJson<CreateVariant>,
) -> AppResult<(StatusCode, Json<DataResponse<ProductVariant>>)> {
    ProductRepo::find_by_id(&state.pool, product_id)
        .await?
        .ok_or_else(|| product_not_found(product_id))?;

    input.sku = input.sku.trim().to_string();
    ensure_sku_free(&state, &input.sku).await?;

    let variant = VariantRepo::create(&state.pool, product_id, &input).await?;

    tracing::info!(
        product_id,
        variant_id = variant.id,
        user_id = admin.user_id,
        "Variant created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: variant })))
}

/// PUT /products/variants/{id}
#[utoipa::path(
    put,
    path = "/api/v1/products/variants/{id}",
    tag = "products",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Variant id")),
    request_body = UpdateVariant,
    responses((status = 200, description = "Updated variant", body = ProductVariant))
)]
pub async fn update_variant(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(mut input): ValidatedJson<UpdateVariant>,
) -> AppResult<Json<DataResponse<ProductVariant>>> {
    let current = VariantRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| variant_not_found(id))?;

    if let Some(sku) = input.sku.as_mut() {
        *sku = sku.trim().to_string();
        if *sku != current.sku {
            ensure_sku_free(&state, sku).await?;
        }
    }

    let variant = VariantRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| variant_not_found(id))?;

    tracing::info!(variant_id = id, user_id = admin.user_id, "Variant updated");
    Ok(Json(DataResponse { data: variant }))
}

/// DELETE /products/variants/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/products/variants/{id}",
    tag = "products",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Variant id")),
    responses((status = 204, description = "Variant deleted"))
)]
pub async fn delete_variant(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !VariantRepo::delete(&state.pool, id).await? {
        return Err(variant_not_found(id));
    }
    tracing::info!(variant_id = id, user_id = admin.user_id, "Variant deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Images (admin)
// ---------------------------------------------------------------------------

/// POST /products/{id}/images
///
/// Multipart with one or more `file` fields and an optional `alt_text`.
/// The product's first image becomes its main image.
#[utoipa::path(
    post,
    path = "/api/v1/products/{id}/images",
    tag = "products",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Product id")),
    request_body(content_type = "multipart/form-data", description = "One or more `file` fields"),
    responses(
        (status = 201, description = "Stored images", body = [ProductImage]),
        (status = 400, description = "Missing file or not an accepted image type"),
    )
)]
pub async fn upload_product_images(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(product_id): Path<DbId>,
    upload: ImageUpload,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<ProductImage>>>)> {
    ProductRepo::find_by_id(&state.pool, product_id)
        .await?
        .ok_or_else(|| product_not_found(product_id))?;

    let mut created = Vec::with_capacity(upload.files.len());
    for file in upload.files {
        let stored = store_image(&state.storage, PRODUCT_PREFIX, product_id, file).await?;
        let row = ProductImageRepo::create(
            &state.pool,
            &CreateProductImage {
                product_id,
                storage_path: stored.key.clone(),
                url: stored.url,
                alt_text: upload.alt_text.clone(),
            },
        )
        .await;
        match row {
            Ok(image) => created.push(image),
            Err(e) => {
                delete_objects_best_effort(&state.storage, [stored.key]).await;
                return Err(e.into());
            }
        }
    }

    tracing::info!(
        product_id,
        user_id = admin.user_id,
        count = created.len(),
        "Product images uploaded",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// DELETE /products/images/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/products/images/{id}",
    tag = "products",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Image id")),
    responses((status = 204, description = "Image deleted"))
)]
pub async fn delete_product_image(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let image = ProductImageRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(|| image_not_found(id))?;

    delete_objects_best_effort(&state.storage, [image.storage_path]).await;

    tracing::info!(
        image_id = id,
        product_id = image.product_id,
        user_id = admin.user_id,
        "Product image deleted",
    );
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /products/images/{id}/main
#[utoipa::path(
    put,
    path = "/api/v1/products/images/{id}/main",
    tag = "products",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Image id")),
    responses((status = 200, description = "New main image", body = ProductImage))
)]
pub async fn set_main_image(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProductImage>>> {
    let image = ProductImageRepo::set_main(&state.pool, id)
        .await?
        .ok_or_else(|| image_not_found(id))?;

    tracing::info!(
        image_id = id,
        product_id = image.product_id,
        user_id = admin.user_id,
        "Main image set",
    );
    Ok(Json(DataResponse { data: image }))
}

// ---------------------------------------------------------------------------
// CSV import (admin)
// ---------------------------------------------------------------------------

/// POST /products/import?skip_errors=
///
/// Multipart with the CSV in a `file` field. The field is streamed to a
/// file under `UPLOAD_TMP_DIR`, parsed from disk on a blocking thread and
/// removed. Rows imported before an abort stay imported.
#[utoipa::path(
    post,
    path = "/api/v1/products/import",
    tag = "products",
    security(("bearer_auth" = [])),
    params(ImportParams),
    request_body(content_type = "multipart/form-data", description = "CSV in a `file` field"),
    responses(
        (status = 200, description = "Import report: total_rows, imported, failed, aborted, errors"),
        (status = 400, description = "Missing file or unreadable CSV"),
    )
)]
pub async fn import_products(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ImportParams>,
    mut multipart: Multipart,
) -> AppResult<Json<DataResponse<ImportReport>>> {
    let staging_dir = &state.config.upload_tmp_dir;
    tokio::fs::create_dir_all(staging_dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to create staging dir: {e}")))?;
    let staged = staging_dir.join(format!("{}.csv", uuid::Uuid::new_v4()));

    let outcome = stage_and_parse(&mut multipart, &staged).await;
    if let Err(e) = tokio::fs::remove_file(&staged).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(error = %e, path = %staged.display(), "Failed to remove staged upload");
        }
    }
    let rows = outcome?;

    let mut sink = PgImportSink::new(state.pool.clone());
    let report = import_rows(rows, &mut sink, params.skip_errors).await;

    tracing::info!(
        user_id = admin.user_id,
        total_rows = report.total_rows,
        imported = report.imported,
        failed = report.failed,
        aborted = report.aborted,
        "Product import finished",
    );
    Ok(Json(DataResponse { data: report }))
}

/// Write the `file` field to `staged` chunk by chunk, then parse it.
async fn stage_and_parse(
    multipart: &mut Multipart,
    staged: &std::path::Path,
) -> AppResult<Vec<ParsedRow>> {
    let mut written: Option<usize> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") || written.is_some() {
            continue;
        }
        let mut file = tokio::fs::File::create(staged)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to stage upload: {e}")))?;
        let mut total = 0;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            total += chunk.len();
            file.write_all(&chunk)
                .await
                .map_err(|e| AppError::InternalError(format!("Failed to stage upload: {e}")))?;
        }
        file.flush()
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to stage upload: {e}")))?;
        written = Some(total);
    }

    match written {
        None => return Err(AppError::BadRequest("Missing required 'file' field".into())),
        Some(0) => return Err(AppError::BadRequest("Uploaded CSV is empty".into())),
        Some(_) => {}
    }

    let path = staged.to_path_buf();
    let rows = tokio::task::spawn_blocking(move || parse_csv_file(&path))
        .await
        .map_err(|e| AppError::InternalError(format!("CSV parser task failed: {e}")))??;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_order_ascending_puts_missing_last() {
        let mut prices = vec![Some(500), None, Some(100), Some(300)];
        prices.sort_by(|a, b| price_order(*a, *b, false));
        assert_eq!(prices, vec![Some(100), Some(300), Some(500), None]);
    }

    #[test]
    fn price_order_descending_puts_missing_last() {
        let mut prices = vec![None, Some(100), Some(500), Some(300)];
        prices.sort_by(|a, b| price_order(*a, *b, true));
        assert_eq!(prices, vec![Some(500), Some(300), Some(100), None]);
    }

    #[test]
    fn non_blank_trims_and_drops_empty() {
        assert_eq!(non_blank(Some("  shoes ".into())), Some("shoes".into()));
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(None), None);
    }
}
