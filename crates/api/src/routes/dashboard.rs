//! Dashboard routes: read-only aggregates for the admin home screen.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::db::orders::OrderRepository;
use crate::db::products::ProductRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/recent-orders", get(recent_orders))
        .route("/sales-by-status", get(sales_by_status))
        .route("/low-stock", get(low_stock))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductStats {
    total: i64,
    in_stock: i64,
}

#[derive(Debug, Serialize)]
struct OrderStats {
    total: i64,
    pending: i64,
    processing: i64,
}

#[derive(Debug, Serialize)]
struct RevenueStats {
    #[serde(with = "rust_decimal::serde::float")]
    total: Decimal,
}

#[derive(Debug, Serialize)]
struct DashboardStats {
    products: ProductStats,
    orders: OrderStats,
    revenue: RevenueStats,
}

async fn stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<serde_json::Value>> {
    let (product_total, in_stock) = ProductRepository::new(state.pool()).stock_counts().await?;
    let totals = OrderRepository::new(state.pool()).totals().await?;

    let data = DashboardStats {
        products: ProductStats {
            total: product_total,
            in_stock,
        },
        orders: OrderStats {
            total: totals.total,
            pending: totals.pending,
            processing: totals.processing,
        },
        revenue: RevenueStats {
            total: totals.revenue,
        },
    };

    Ok(Json(json!({ "success": true, "data": data })))
}

#[derive(Debug, Deserialize)]
struct RecentQuery {
    limit: Option<i64>,
}

async fn recent_orders(
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

async fn sales_by_status(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<serde_json::Value>> {
    let rows = OrderRepository::new(state.pool()).sales_by_status().await?;

    Ok(Json(json!({ "success": true, "data": rows })))
}

async fn low_stock(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<serde_json::Value>> {
    let products = ProductRepository::new(state.pool()).out_of_stock().await?;

    Ok(Json(json!({
        "success": true,
        "count": products.len(),
        "data": products,
    })))
}
