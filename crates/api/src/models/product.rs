//! Catalogue product.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use ambre_core::ProductId;

/// Maximum length of the short marketing blurb.
pub const SHORT_DESCRIPTION_MAX: usize = 50;

/// A perfume in the catalogue.
///
/// Publicly readable; created, updated, and deleted by admins only. The
/// `image` field holds the public URL of the product photo, either an
/// uploaded file under `/uploads` or an external URL supplied by the admin.
///
/// `in_stock` is an availability flag, not a quantity counter.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub description: String,
    pub short_description: String,
    pub image: String,
    pub category: String,
    pub featured: bool,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case_with_numeric_price() {
        let product = Product {
            id: ProductId::new(1),
            name: "Amber Noir".to_string(),
            price: Decimal::new(21_000, 2),
            description: "An intoxicating oriental fragrance.".to_string(),
            short_description: "Mysterious amber with spicy undertones".to_string(),
            image: "http://localhost:5000/uploads/amber-noir.jpg".to_string(),
            category: "oriental".to_string(),
            featured: true,
            in_stock: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["shortDescription"], "Mysterious amber with spicy undertones");
        assert_eq!(json["inStock"], true);
        assert_eq!(json["price"], 210.0);
        assert!(json.get("short_description").is_none());
    }
}
