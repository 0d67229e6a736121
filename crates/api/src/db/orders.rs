//! Order repository for database operations.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use ambre_core::{OrderId, OrderStatus, ProductId};

use super::{Page, PageRequest, RepositoryError, SortTerm, order_by_clause};
use crate::models::Order;

/// Wire-name to column mapping for the fields a listing may sort by.
pub const SORTABLE_COLUMNS: &[(&str, &str)] = &[
    ("orderDate", "order_date"),
    ("totalAmount", "total_amount"),
    ("status", "status"),
    ("quantity", "quantity"),
    ("customerName", "customer_name"),
];

/// Default sort for listings: newest first.
pub const DEFAULT_SORT: &str = "-orderDate";

const SELECT_COLUMNS: &str = "id, product_id, product_name, product_price, quantity, \
                              customer_name, customer_email, customer_phone, shipping_address, \
                              status, total_amount, order_date";

/// Fields for a new order; the snapshot fields come from the product row
/// read at creation time.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub product_id: ProductId,
    pub product_name: String,
    pub product_price: Decimal,
    pub quantity: i32,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: String,
    pub total_amount: Decimal,
}

/// One row of the sales-by-status aggregation.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StatusSales {
    pub status: OrderStatus,
    pub count: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// Headline order counts and revenue for the dashboard.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderTotals {
    pub total: i64,
    pub pending: i64,
    pub processing: i64,
    pub revenue: Decimal,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch one page of orders, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        status: Option<OrderStatus>,
        sort: &[SortTerm],
        page: PageRequest,
    ) -> Result<Page<Order>, RepositoryError> {
        let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM store.customer_order");
        push_status_filter(&mut count_query, status);
        let (total,): (i64,) = count_query
            .build_query_as()
            .fetch_one(self.pool)
            .await?;

        let mut query = QueryBuilder::new(format!(
            "SELECT {SELECT_COLUMNS} FROM store.customer_order"
        ));
        push_status_filter(&mut query, status);
        query
            .push(" ORDER BY ")
            .push(order_by_clause(sort))
            .push(" LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let items = query
            .build_query_as::<Order>()
            .fetch_all(self.pool)
            .await?;

        Ok(Page {
            items,
            total,
            page: page.page,
            limit: page.limit,
        })
    }

    /// Get an order by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            "SELECT id, product_id, product_name, product_price, quantity, \
             customer_name, customer_email, customer_phone, shipping_address, \
             status, total_amount, order_date \
             FROM store.customer_order WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// Insert a new order as `pending` and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, new: NewOrder) -> Result<Order, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            "INSERT INTO store.customer_order \
             (product_id, product_name, product_price, quantity, customer_name, \
              customer_email, customer_phone, shipping_address, total_amount) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING id, product_id, product_name, product_price, quantity, \
             customer_name, customer_email, customer_phone, shipping_address, \
             status, total_amount, order_date",
        )
        .bind(new.product_id)
        .bind(new.product_name)
        .bind(new.product_price)
        .bind(new.quantity)
        .bind(new.customer_name)
        .bind(new.customer_email)
        .bind(new.customer_phone)
        .bind(new.shipping_address)
        .bind(new.total_amount)
        .fetch_one(self.pool)
        .await?;

        Ok(order)
    }

    /// Persist a new status. Returns `None` when no order has this ID.
    ///
    /// No inventory side effects; the snapshot and total are untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            "UPDATE store.customer_order SET status = $2 WHERE id = $1 \
             RETURNING id, product_id, product_name, product_price, quantity, \
             customer_name, customer_email, customer_phone, shipping_address, \
             status, total_amount, order_date",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// The `limit` most recent orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT id, product_id, product_name, product_price, quantity, \
             customer_name, customer_email, customer_phone, shipping_address, \
             status, total_amount, order_date \
             FROM store.customer_order \
             ORDER BY order_date DESC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Headline counts and revenue for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn totals(&self) -> Result<OrderTotals, RepositoryError> {
        let totals = sqlx::query_as::<_, OrderTotals>(
            "SELECT COUNT(*) AS total, \
             COUNT(*) FILTER (WHERE status = 'pending') AS pending, \
             COUNT(*) FILTER (WHERE status = 'processing') AS processing, \
             COALESCE(SUM(total_amount), 0) AS revenue \
             FROM store.customer_order",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(totals)
    }

    /// Per-status order count and revenue subtotal, busiest status first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn sales_by_status(&self) -> Result<Vec<StatusSales>, RepositoryError> {
        let rows = sqlx::query_as::<_, StatusSales>(
            "SELECT status, COUNT(*) AS count, COALESCE(SUM(total_amount), 0) AS total \
             FROM store.customer_order \
             GROUP BY status \
             ORDER BY COUNT(*) DESC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}

/// Append the optional status filter to a listing or count query.
fn push_status_filter(query: &mut QueryBuilder<'_, Postgres>, status: Option<OrderStatus>) {
    if let Some(status) = status {
        query.push(" WHERE status = ").push_bind(status);
    }
}
