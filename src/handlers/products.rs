use axum::extract::{Extension, Path, State};

use crate::database::{NewProduct, Product, ProductFields, ProductOrder};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, ValidatedBody};
use crate::state::AppState;

pub const NOT_FOUND_MESSAGE: &str = "Product not found";
pub const DELETED_MESSAGE: &str = "Product Deleted";

fn not_found() -> ApiError {
    ApiError::not_found(NOT_FOUND_MESSAGE)
}

/// The gate has already checked the literal shape; one that overflows `i64`
/// cannot name a stored row.
fn product_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| not_found())
}

/// GET /api/products - every product, newest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    let products = state.products().list_all(ProductOrder::newest_first()).await?;
    Ok(ApiResponse::success(products))
}

/// GET /api/products/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Product> {
    let product = state.products().get_by_id(product_id(&id)?).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::success(product))
}

/// POST /api/products - create from `name` and `price`
pub async fn create(
    State(state): State<AppState>,
    Extension(ValidatedBody(body)): Extension<ValidatedBody>,
) -> ApiResult<Product> {
    let fields = NewProduct::from_payload(&body)
        .ok_or_else(|| ApiError::malformed_body("Missing product fields"))?;

    let product = state.products().insert(fields).await?;
    tracing::info!("Created product {}", product.id);
    Ok(ApiResponse::created(product))
}

/// PUT /api/products/:id - overwrite name, price and availability
pub async fn replace(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(ValidatedBody(body)): Extension<ValidatedBody>,
) -> ApiResult<Product> {
    let fields = ProductFields::from_payload(&body)
        .ok_or_else(|| ApiError::malformed_body("Missing product fields"))?;

    let product = state.products().replace(product_id(&id)?, fields).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::success(product))
}

/// PATCH /api/products/:id - flip availability.
///
/// The request body is never read: the new value is always the negation of
/// the stored one.
pub async fn toggle_availability(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Product> {
    let product = state.products().patch_availability(product_id(&id)?).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::success(product))
}

/// DELETE /api/products/:id - permanent removal
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<&'static str> {
    let removed = state.products().remove(product_id(&id)?).await?.ok_or_else(not_found)?;
    tracing::info!("Deleted product {}", removed.id);
    Ok(ApiResponse::success(DELETED_MESSAGE))
}
