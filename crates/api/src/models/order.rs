//! Customer order with its product snapshot.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use ambre_core::{OrderId, OrderStatus, ProductId};

/// A customer order.
///
/// `product_name` and `product_price` are an immutable snapshot taken at
/// order time; `total_amount` is `product_price * quantity`, fixed at
/// creation and never recomputed even if the catalogue price changes later.
/// `product_id` is kept for cross-reference only and is not a live foreign
/// key, so the order survives deletion of the product.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub product_id: ProductId,
    pub product_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub product_price: Decimal,
    pub quantity: i32,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: String,
    pub status: OrderStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub order_date: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case_with_lowercase_status() {
        let order = Order {
            id: OrderId::new(12),
            product_id: ProductId::new(3),
            product_name: "Oud Royale".to_string(),
            product_price: Decimal::new(10_000, 2),
            quantity: 3,
            customer_name: "Ada Lovelace".to_string(),
            customer_email: "ada@example.com".to_string(),
            customer_phone: "+44 20 7946 0000".to_string(),
            shipping_address: "12 Analytical Row, London".to_string(),
            status: OrderStatus::Pending,
            total_amount: Decimal::new(30_000, 2),
            order_date: Utc::now(),
        };

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["productId"], 3);
        assert_eq!(json["status"], "pending");
        assert_eq!(json["totalAmount"], 300.0);
        assert_eq!(json["productPrice"], 100.0);
    }
}
