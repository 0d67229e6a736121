//! Order routes: public creation, admin reads and status transitions.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use ambre_core::{Email, OrderId, OrderStatus};

use crate::db::orders::{DEFAULT_SORT, NewOrder, OrderRepository, SORTABLE_COLUMNS};
use crate::db::products::ProductRepository;
use crate::db::{PageRequest, parse_sort_or_default};
use crate::error::{ApiError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(list))
        .route("/recent", get(recent))
        .route("/{id}", get(get_one))
        .route("/{id}/status", put(update_status))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderRequest {
    product_id: Option<i32>,
    quantity: Option<i32>,
    customer_name: Option<String>,
    customer_email: Option<String>,
    customer_phone: Option<String>,
    shipping_address: Option<String>,
}

async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let product_id = body.product_id.ok_or_else(|| required("productId"))?;
    let quantity = body.quantity.ok_or_else(|| required("quantity"))?;
    if quantity < 1 {
        return Err(ApiError::InvalidInput(
            "quantity must be at least 1".to_string(),
        ));
    }

    let customer_name = required_text(body.customer_name, "customerName")?;
    let customer_email = required_text(body.customer_email, "customerEmail")?;
    let customer_phone = required_text(body.customer_phone, "customerPhone")?;
    let shipping_address = required_text(body.shipping_address, "shippingAddress")?;

    let customer_email = Email::parse(&customer_email)
        .map_err(|e| ApiError::InvalidInput(format!("invalid customerEmail: {e}")))?;

    let product = ProductRepository::new(state.pool())
        .get(product_id.into())
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    if !product.in_stock {
        return Err(ApiError::OutOfStock);
    }

    // Snapshot name and price now; later catalogue edits must not move this
    // order's total
    let total_amount = product.price * Decimal::from(quantity);

    let order = OrderRepository::new(state.pool())
        .insert(NewOrder {
            product_id: product.id,
            product_name: product.name,
            product_price: product.price,
            quantity,
            customer_name,
            customer_email: customer_email.into_inner(),
            customer_phone,
            shipping_address,
            total_amount,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": order })),
    ))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    status: Option<String>,
    sort: Option<String>,
    page: Option<i64>,
    limit: Option<i64>,
}

async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<OrderStatus>)
        .transpose()
        .map_err(|e| ApiError::InvalidInput(e.to_string()))?;

    let sort = parse_sort_or_default(query.sort.as_deref(), DEFAULT_SORT, SORTABLE_COLUMNS)
        .map_err(|e| ApiError::InvalidInput(e.to_string()))?;

    let page = PageRequest::new(query.page, query.limit);

    let result = OrderRepository::new(state.pool())
        .list(status, &sort, page)
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
struct RecentQuery {
    limit: Option<i64>,
}

async fn recent(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<RecentQuery>,
) -> Result<Json<serde_json::Value>> {
    let limit = query.limit.unwrap_or(5).max(1);
    let orders = OrderRepository::new(state.pool()).recent(limit).await?;

    Ok(Json(json!({
        "success": true,
        "count": orders.len(),
        "data": orders,
    })))
}

async fn get_one(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let id = parse_order_id(&id)?;
    let order = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(order_not_found)?;

    Ok(Json(json!({ "success": true, "data": order })))
}

#[derive(Debug, Deserialize)]
struct UpdateStatusRequest {
    status: Option<String>,
}

async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<serde_json::Value>> {
    let id = parse_order_id(&id)?;

    let target = body
        .status
        .as_deref()
        .unwrap_or_default()
        .parse::<OrderStatus>()
        .map_err(|e| ApiError::InvalidInput(e.to_string()))?;

    let repo = OrderRepository::new(state.pool());
    let order = repo.get(id).await?.ok_or_else(order_not_found)?;

    if !order.status.can_transition_to(target) {
        return Err(ApiError::InvalidInput(format!(
            "Cannot transition order from {} to {}",
            order.status, target
        )));
    }

    // A concurrent delete between the read and the write surfaces as 404
    let order = repo
        .update_status(id, target)
        .await?
        .ok_or_else(order_not_found)?;

    Ok(Json(json!({ "success": true, "data": order })))
}

fn parse_order_id(raw: &str) -> Result<OrderId> {
    raw.parse::<OrderId>().map_err(|_| order_not_found())
}

fn order_not_found() -> ApiError {
    ApiError::NotFound("Order not found".to_string())
}

fn required(field: &str) -> ApiError {
    ApiError::InvalidInput(format!("{field} is required"))
}

fn required_text(value: Option<String>, field: &str) -> Result<String> {
    let value = value.unwrap_or_default().trim().to_string();
    if value.is_empty() {
        return Err(required(field));
    }
    Ok(value)
}
