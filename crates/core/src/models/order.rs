//! Order records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::cart::FALLBACK_ITEM_NAME;
use crate::models::catalog::Product;
use crate::types::{OrderId, OrderItemId, OrderStatus, Price, ProductId};

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub status: OrderStatus,
    pub total_price: Decimal,
    #[serde(default, alias = "orderitems")]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Order total in the shop currency.
    #[must_use]
    pub const fn total(&self) -> Price {
        Price::shop(self.total_price)
    }
}

/// One line of a placed order, with its price frozen at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    #[serde(default)]
    pub product: Option<Product>,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default = "one")]
    pub quantity: u32,
}

impl OrderItem {
    /// Display name with the same fallback order as cart lines.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.product
            .as_ref()
            .map(|p| p.name.as_str())
            .or(self.product_name.as_deref())
            .unwrap_or(FALLBACK_ITEM_NAME)
    }

    /// Unit price frozen at checkout, falling back to the current product price.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.price
            .or_else(|| self.product.as_ref().map(|p| p.price))
            .unwrap_or(Decimal::ZERO)
    }
}

const fn one() -> u32 {
    1
}

/// Request body for placing an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    /// Whether there is nothing to order.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// One requested order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_deserialize() {
        let order: Order = serde_json::from_str(
            r#"{"id": 7, "status": "paid", "total_price": 350.0, "items": [
                {"id": 1, "product": {"id": 2, "name": "Tea", "price": 100}, "price": 150, "quantity": 2},
                {"id": 2, "product_name": "Cup"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.total().to_string(), "350.00 ₽");
        let first = order.items.first().unwrap();
        assert_eq!(first.display_name(), "Tea");
        assert_eq!(first.unit_price(), Decimal::from(150));
        let second = order.items.get(1).unwrap();
        assert_eq!(second.display_name(), "Cup");
        assert_eq!(second.quantity, 1);
    }

    #[test]
    fn test_order_accepts_orderitems_alias() {
        let order: Order = serde_json::from_str(
            r#"{"id": 1, "total_price": 0, "orderitems": [{"id": 3, "quantity": 4}]}"#,
        )
        .unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items.len(), 1);
    }

    #[test]
    fn test_new_order_serialize() {
        let order = NewOrder {
            items: vec![NewOrderItem {
                product_id: ProductId::new(3),
                quantity: 2,
            }],
        };
        assert_eq!(
            serde_json::to_string(&order).unwrap(),
            r#"{"items":[{"product_id":3,"quantity":2}]}"#
        );
        assert!(NewOrder::default().is_empty());
    }
}
