//! Product repository for database operations.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use ambre_core::ProductId;

use super::{Page, PageRequest, RepositoryError, SortTerm, order_by_clause};
use crate::models::Product;

/// Wire-name to column mapping for the fields a listing may sort by.
pub const SORTABLE_COLUMNS: &[(&str, &str)] = &[
    ("name", "name"),
    ("price", "price"),
    ("category", "category"),
    ("featured", "featured"),
    ("inStock", "in_stock"),
    ("createdAt", "created_at"),
    ("updatedAt", "updated_at"),
];

/// Default sort for listings: newest first.
pub const DEFAULT_SORT: &str = "-createdAt";

const SELECT_COLUMNS: &str = "id, name, price, description, short_description, image, category, \
                              featured, in_stock, created_at, updated_at";

/// Listing filter; `None` fields are not constrained.
#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub in_stock: Option<bool>,
}

/// Fields for a new catalogue entry.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub short_description: String,
    pub image: String,
    pub category: String,
    pub featured: bool,
    pub in_stock: bool,
}

/// Partial update; `None` fields keep their stored value.
#[derive(Debug, Default, Clone)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub in_stock: Option<bool>,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch one page of products matching `filter`, ordered by `sort`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        sort: &[SortTerm],
        page: PageRequest,
    ) -> Result<Page<Product>, RepositoryError> {
        let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM store.product");
        push_filters(&mut count_query, filter);
        let (total,): (i64,) = count_query
            .build_query_as()
            .fetch_one(self.pool)
            .await?;

        let mut query = QueryBuilder::new(format!(
            "SELECT {SELECT_COLUMNS} FROM store.product"
        ));
        push_filters(&mut query, filter);
        query
            .push(" ORDER BY ")
            .push(order_by_clause(sort))
            .push(" LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let items = query
            .build_query_as::<Product>()
            .fetch_all(self.pool)
            .await?;

        Ok(Page {
            items,
            total,
            page: page.page,
            limit: page.limit,
        })
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, price, description, short_description, image, category, \
             featured, in_stock, created_at, updated_at \
             FROM store.product WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Insert a new product and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, new: NewProduct) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            "INSERT INTO store.product \
             (name, price, description, short_description, image, category, featured, in_stock) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id, name, price, description, short_description, image, category, \
             featured, in_stock, created_at, updated_at",
        )
        .bind(new.name)
        .bind(new.price)
        .bind(new.description)
        .bind(new.short_description)
        .bind(new.image)
        .bind(new.category)
        .bind(new.featured)
        .bind(new.in_stock)
        .fetch_one(self.pool)
        .await?;

        Ok(product)
    }

    /// Apply a partial update, bumping `updated_at`.
    ///
    /// Returns `None` when no product has this ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut query: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("UPDATE store.product SET updated_at = NOW()");

        if let Some(name) = patch.name {
            query.push(", name = ").push_bind(name);
        }
        if let Some(price) = patch.price {
            query.push(", price = ").push_bind(price);
        }
        if let Some(description) = patch.description {
            query.push(", description = ").push_bind(description);
        }
        if let Some(short_description) = patch.short_description {
            query.push(", short_description = ").push_bind(short_description);
        }
        if let Some(image) = patch.image {
            query.push(", image = ").push_bind(image);
        }
        if let Some(category) = patch.category {
            query.push(", category = ").push_bind(category);
        }
        if let Some(featured) = patch.featured {
            query.push(", featured = ").push_bind(featured);
        }
        if let Some(in_stock) = patch.in_stock {
            query.push(", in_stock = ").push_bind(in_stock);
        }

        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {SELECT_COLUMNS}"));

        let product = query
            .build_query_as::<Product>()
            .fetch_optional(self.pool)
            .await?;

        Ok(product)
    }

    /// Delete a product. Returns `false` when no row matched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let deleted: Option<(i32,)> =
            sqlx::query_as("DELETE FROM store.product WHERE id = $1 RETURNING id")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(deleted.is_some())
    }

    /// Up to `limit` featured, in-stock products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn featured(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, price, description, short_description, image, category, \
             featured, in_stock, created_at, updated_at \
             FROM store.product \
             WHERE featured AND in_stock \
             ORDER BY created_at DESC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// `(total, in_stock)` counts for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stock_counts(&self) -> Result<(i64, i64), RepositoryError> {
        let counts: (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE in_stock) FROM store.product",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(counts)
    }

    /// All out-of-stock products, most recently updated first.
    ///
    /// The dashboard's "low stock" view: availability here is a flag, not a
    /// quantity, so out-of-stock is the whole story.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn out_of_stock(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, price, description, short_description, image, category, \
             featured, in_stock, created_at, updated_at \
             FROM store.product \
             WHERE NOT in_stock \
             ORDER BY updated_at DESC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }
}

/// Append the filter's WHERE clause to a listing or count query.
fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    let mut prefix = " WHERE ";

    if let Some(category) = &filter.category {
        query.push(prefix).push("category = ").push_bind(category.clone());
        prefix = " AND ";
    }
    if let Some(featured) = filter.featured {
        query.push(prefix).push("featured = ").push_bind(featured);
        prefix = " AND ";
    }
    if let Some(in_stock) = filter.in_stock {
        query.push(prefix).push("in_stock = ").push_bind(in_stock);
    }
}
