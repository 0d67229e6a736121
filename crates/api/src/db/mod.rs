//! Database operations for the Ambre `PostgreSQL` store.
//!
//! ## Tables (schema `store`)
//!
//! - `product` - Catalogue entries, publicly readable
//! - `customer_order` - Orders with an embedded product snapshot
//! - `admin_account` - Back-office accounts (Argon2id password hashes)
//!
//! Repositories own every SQL statement; queries use the sqlx runtime API so
//! the workspace builds without a live database. Row structs derive
//! `sqlx::FromRow` and convert into domain models.
//!
//! # Migrations
//!
//! Migrations live in `crates/api/migrations/` and are run explicitly via:
//! ```bash
//! cargo run -p ambre-cli -- migrate
//! ```

pub mod admins;
pub mod orders;
pub mod products;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use admins::AdminRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Constraint violation (e.g., unique username or email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

// =============================================================================
// Pagination
// =============================================================================

/// One page of a filtered listing, with enough context to report pagination.
#[derive(Debug)]
pub struct Page<T> {
    /// Rows on this page.
    pub items: Vec<T>,
    /// Total rows matching the filter across all pages.
    pub total: i64,
    /// 1-based page number that was fetched.
    pub page: i64,
    /// Requested page size.
    pub limit: i64,
}

impl<T> Page<T> {
    /// Total number of pages (`ceil(total / limit)`).
    #[must_use]
    pub const fn page_count(&self) -> i64 {
        if self.total == 0 {
            0
        } else {
            (self.total + self.limit - 1) / self.limit
        }
    }
}

/// Normalised pagination input: `page >= 1`, `limit >= 1`.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Clamp raw query parameters into a usable request.
    #[must_use]
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(10).max(1),
        }
    }

    /// Rows to skip before this page.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

// =============================================================================
// Sorting
// =============================================================================

/// A validated ORDER BY term: column name plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortTerm {
    pub column: &'static str,
    pub descending: bool,
}

/// Error for a sort field that is not in the sortable whitelist.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot sort by '{0}'")]
pub struct UnknownSortField(pub String);

/// Parse a comma-separated sort spec (`-` prefix = descending) against a
/// whitelist of `(wire name, column name)` pairs.
///
/// Column names come from the whitelist, never from the request, so the
/// result is safe to splice into ORDER BY.
///
/// # Errors
///
/// Returns [`UnknownSortField`] for any field outside the whitelist.
pub fn parse_sort(
    spec: &str,
    columns: &'static [(&'static str, &'static str)],
) -> Result<Vec<SortTerm>, UnknownSortField> {
    spec.split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(|field| {
            let (name, descending) = field
                .strip_prefix('-')
                .map_or((field, false), |stripped| (stripped, true));

            columns
                .iter()
                .find(|(wire, _)| *wire == name)
                .map(|&(_, column)| SortTerm { column, descending })
                .ok_or_else(|| UnknownSortField(name.to_string()))
        })
        .collect()
}

/// Parse the caller's sort spec, falling back to `default_spec` when the
/// spec is absent or degenerate (e.g. `sort=`), so listings always have a
/// deterministic order.
///
/// # Errors
///
/// Returns [`UnknownSortField`] for any field outside the whitelist.
pub fn parse_sort_or_default(
    spec: Option<&str>,
    default_spec: &str,
    columns: &'static [(&'static str, &'static str)],
) -> Result<Vec<SortTerm>, UnknownSortField> {
    let terms = parse_sort(spec.unwrap_or(default_spec), columns)?;
    if terms.is_empty() {
        return parse_sort(default_spec, columns);
    }
    Ok(terms)
}

/// Render sort terms as an ORDER BY clause body.
#[must_use]
pub fn order_by_clause(terms: &[SortTerm]) -> String {
    terms
        .iter()
        .map(|term| {
            let direction = if term.descending { "DESC" } else { "ASC" };
            format!("{} {direction}", term.column)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const COLUMNS: &[(&str, &str)] = &[
        ("name", "name"),
        ("price", "price"),
        ("createdAt", "created_at"),
    ];

    #[test]
    fn test_parse_sort_single_ascending() {
        let terms = parse_sort("name", COLUMNS).unwrap();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].column, "name");
        assert!(!terms[0].descending);
    }

    #[test]
    fn test_parse_sort_descending_prefix() {
        let terms = parse_sort("-createdAt", COLUMNS).unwrap();
        assert_eq!(terms[0].column, "created_at");
        assert!(terms[0].descending);
    }

    #[test]
    fn test_parse_sort_multiple_fields() {
        let terms = parse_sort("price,-name", COLUMNS).unwrap();
        assert_eq!(order_by_clause(&terms), "price ASC, name DESC");
    }

    #[test]
    fn test_parse_sort_rejects_unknown_field() {
        let err = parse_sort("price;DROP TABLE store.product", COLUMNS).unwrap_err();
        assert_eq!(err, UnknownSortField("price;DROP TABLE store.product".to_string()));
    }

    #[test]
    fn test_parse_sort_skips_empty_segments() {
        let terms = parse_sort("name,,", COLUMNS).unwrap();
        assert_eq!(terms.len(), 1);
    }

    #[test]
    fn test_parse_sort_or_default_falls_back() {
        let terms = parse_sort_or_default(None, "-createdAt", COLUMNS).unwrap();
        assert_eq!(order_by_clause(&terms), "created_at DESC");

        // A present-but-empty spec still gets a deterministic order
        let terms = parse_sort_or_default(Some(""), "-createdAt", COLUMNS).unwrap();
        assert_eq!(order_by_clause(&terms), "created_at DESC");

        let terms = parse_sort_or_default(Some("price"), "-createdAt", COLUMNS).unwrap();
        assert_eq!(order_by_clause(&terms), "price ASC");
    }

    #[test]
    fn test_page_count_rounds_up() {
        let page = Page::<()> {
            items: Vec::new(),
            total: 5,
            page: 2,
            limit: 2,
        };
        assert_eq!(page.page_count(), 3);
    }

    #[test]
    fn test_page_count_empty() {
        let page = Page::<()> {
            items: Vec::new(),
            total: 0,
            page: 1,
            limit: 10,
        };
        assert_eq!(page.page_count(), 0);
    }

    #[test]
    fn test_page_request_clamps() {
        let req = PageRequest::new(Some(0), Some(-5));
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, 1);

        let req = PageRequest::new(None, None);
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, 10);
        assert_eq!(req.offset(), 0);

        let req = PageRequest::new(Some(3), Some(10));
        assert_eq!(req.offset(), 20);
    }
}
