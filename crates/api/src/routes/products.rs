//! Product routes: public catalogue reads, admin mutations.
//!
//! Create and update accept `multipart/form-data` so the admin form can send
//! an image file alongside the text fields; a field named `image` may carry
//! either a file or an external URL.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use ambre_core::ProductId;

use crate::db::products::{
    DEFAULT_SORT, NewProduct, ProductFilter, ProductPatch, ProductRepository, SORTABLE_COLUMNS,
};
use crate::db::{PageRequest, parse_sort_or_default};
use crate::error::{ApiError, Result};
use crate::middleware::RequireAdmin;
use crate::models::product::SHORT_DESCRIPTION_MAX;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/featured", get(featured))
        .route("/{id}", get(get_one).put(update).delete(delete_one))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    category: Option<String>,
    featured: Option<bool>,
    in_stock: Option<bool>,
    sort: Option<String>,
    page: Option<i64>,
    limit: Option<i64>,
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>> {
    let sort = parse_sort_or_default(query.sort.as_deref(), DEFAULT_SORT, SORTABLE_COLUMNS)
        .map_err(|e| ApiError::InvalidInput(e.to_string()))?;

    let filter = ProductFilter {
        category: query.category,
        featured: query.featured,
        in_stock: query.in_stock,
    };
    let page = PageRequest::new(query.page, query.limit);

    let result = ProductRepository::new(state.pool())
        .list(&filter, &sort, page)
        .await?;

    Ok(Json(json!({
        "success": true,
        "count": result.items.len(),
        "total": result.total,
        "pages": result.page_count(),
        "currentPage": result.page,
        "data": result.items,
    })))
}

#[derive(Debug, Deserialize)]
struct FeaturedQuery {
    limit: Option<i64>,
}

async fn featured(
    State(state): State<AppState>,
    Query(query): Query<FeaturedQuery>,
) -> Result<Json<serde_json::Value>> {
    let limit = query.limit.unwrap_or(6).max(1);
    let products = ProductRepository::new(state.pool()).featured(limit).await?;

    Ok(Json(json!({
        "success": true,
        "count": products.len(),
        "data": products,
    })))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let id = parse_product_id(&id)?;
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(product_not_found)?;

    Ok(Json(json!({ "success": true, "data": product })))
}

async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    multipart: Multipart,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let form = ProductForm::read(multipart).await?;

    let name = form.name.clone().ok_or_else(|| required("name"))?;
    let price = form.price.ok_or_else(|| required("price"))?;
    let description = form.description.clone().ok_or_else(|| required("description"))?;
    let short_description = form
        .short_description
        .clone()
        .ok_or_else(|| required("shortDescription"))?;
    let category = form.category.clone().ok_or_else(|| required("category"))?;

    validate_price(price)?;
    validate_short_description(&short_description)?;

    let featured = form.featured.unwrap_or(false);
    let in_stock = form.in_stock.unwrap_or(true);

    let image = match form.into_image(&state).await? {
        Some(url) => url,
        None => return Err(required("image")),
    };

    let product = ProductRepository::new(state.pool())
        .insert(NewProduct {
            name,
            price,
            description,
            short_description,
            image,
            category,
            featured,
            in_stock,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": product })),
    ))
}

async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>> {
    let id = parse_product_id(&id)?;
    let form = ProductForm::read(multipart).await?;

    if let Some(price) = form.price {
        validate_price(price)?;
    }
    if let Some(short_description) = &form.short_description {
        validate_short_description(short_description)?;
    }

    let mut patch = ProductPatch {
        name: form.name.clone(),
        price: form.price,
        description: form.description.clone(),
        short_description: form.short_description.clone(),
        image: None,
        category: form.category.clone(),
        featured: form.featured,
        in_stock: form.in_stock,
    };
    // A freshly uploaded file wins over an explicit URL; neither leaves the
    // stored reference untouched
    patch.image = form.into_image(&state).await?;

    let product = ProductRepository::new(state.pool())
        .update(id, patch)
        .await?
        .ok_or_else(product_not_found)?;

    Ok(Json(json!({ "success": true, "data": product })))
}

async fn delete_one(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let id = parse_product_id(&id)?;
    let deleted = ProductRepository::new(state.pool()).delete(id).await?;

    if !deleted {
        return Err(product_not_found());
    }

    Ok(Json(json!({
        "success": true,
        "message": "Product deleted successfully",
    })))
}

// =============================================================================
// Multipart form
// =============================================================================

/// An uploaded image file: client file name, content type, raw bytes.
struct ImageUpload {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: axum::body::Bytes,
}

/// Fields collected from a create/update form; everything optional so
/// create and update can share the parser.
#[derive(Default)]
struct ProductForm {
    name: Option<String>,
    price: Option<Decimal>,
    description: Option<String>,
    short_description: Option<String>,
    category: Option<String>,
    featured: Option<bool>,
    in_stock: Option<bool>,
    image_url: Option<String>,
    image_upload: Option<ImageUpload>,
}

impl ProductForm {
    /// Drain the multipart body into a form.
    async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::InvalidInput(format!("invalid multipart body: {e}")))?
        {
            let Some(name) = field.name().map(ToOwned::to_owned) else {
                continue;
            };

            match name.as_str() {
                "image" => {
                    // The same field carries either the uploaded file or an
                    // external URL typed into the form
                    if field.file_name().is_some() {
                        let file_name = field.file_name().map(ToOwned::to_owned);
                        let content_type = field.content_type().map(ToOwned::to_owned);
                        let bytes = field
                            .bytes()
                            .await
                            .map_err(|e| ApiError::InvalidInput(format!("invalid upload: {e}")))?;
                        if !bytes.is_empty() {
                            form.image_upload = Some(ImageUpload {
                                file_name,
                                content_type,
                                bytes,
                            });
                        }
                    } else {
                        let url = read_text(field, "image").await?;
                        if !url.is_empty() {
                            form.image_url = Some(url);
                        }
                    }
                }
                "imageUrl" => {
                    let url = read_text(field, "imageUrl").await?;
                    if !url.is_empty() {
                        form.image_url = Some(url);
                    }
                }
                "name" => form.name = Some(read_text(field, "name").await?),
                "price" => {
                    let raw = read_text(field, "price").await?;
                    let price = raw.parse::<Decimal>().map_err(|_| {
                        ApiError::InvalidInput("price must be a number".to_string())
                    })?;
                    form.price = Some(price);
                }
                "description" => form.description = Some(read_text(field, "description").await?),
                "shortDescription" => {
                    form.short_description = Some(read_text(field, "shortDescription").await?);
                }
                "category" => form.category = Some(read_text(field, "category").await?),
                "featured" => form.featured = Some(read_bool(field, "featured").await?),
                "inStock" => form.in_stock = Some(read_bool(field, "inStock").await?),
                _ => {}
            }
        }

        Ok(form)
    }

    /// Resolve the image reference: a new upload wins over an explicit URL.
    ///
    /// Returns `None` when the form carried neither.
    async fn into_image(self, state: &AppState) -> Result<Option<String>> {
        if let Some(upload) = self.image_upload {
            let url = state
                .images()
                .save(
                    upload.file_name.as_deref(),
                    upload.content_type.as_deref(),
                    &upload.bytes,
                )
                .await
                .map_err(|e| match e {
                    crate::services::images::ImageError::UnsupportedType => {
                        ApiError::InvalidInput("image must be a JPEG, PNG, WebP, GIF, or AVIF file".to_string())
                    }
                    crate::services::images::ImageError::Io(e) => {
                        ApiError::Internal(format!("failed to store image: {e}"))
                    }
                })?;
            return Ok(Some(url));
        }

        Ok(self.image_url)
    }
}

async fn read_text(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<String> {
    field
        .text()
        .await
        .map(|value| value.trim().to_string())
        .map_err(|e| ApiError::InvalidInput(format!("invalid value for {name}: {e}")))
}

async fn read_bool(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<bool> {
    match read_text(field, name).await?.as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(ApiError::InvalidInput(format!(
            "{name} must be true or false (got '{other}')"
        ))),
    }
}

// =============================================================================
// Validation helpers
// =============================================================================

fn parse_product_id(raw: &str) -> Result<ProductId> {
    raw.parse::<ProductId>().map_err(|_| product_not_found())
}

fn product_not_found() -> ApiError {
    ApiError::NotFound("Product not found".to_string())
}

fn required(field: &str) -> ApiError {
    ApiError::InvalidInput(format!("{field} is required"))
}

fn validate_price(price: Decimal) -> Result<()> {
    if price <= Decimal::ZERO {
        return Err(ApiError::InvalidInput(
            "price must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn validate_short_description(short_description: &str) -> Result<()> {
    if short_description.chars().count() > SHORT_DESCRIPTION_MAX {
        return Err(ApiError::InvalidInput(format!(
            "shortDescription must be at most {SHORT_DESCRIPTION_MAX} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_price_rejects_zero_and_negative() {
        assert!(validate_price(Decimal::ZERO).is_err());
        assert!(validate_price(Decimal::new(-100, 2)).is_err());
        assert!(validate_price(Decimal::new(18_500, 2)).is_ok());
    }

    #[test]
    fn test_validate_short_description_length() {
        assert!(validate_short_description("Opulent rose with amber undertones").is_ok());
        assert!(validate_short_description(&"x".repeat(50)).is_ok());
        assert!(validate_short_description(&"x".repeat(51)).is_err());
    }
}
