//! Cart records and the display fallbacks applied to them.
//!
//! The backend's cart payload is loosely shaped: the nested product can be
//! missing (deactivated products are filtered out server-side), and older
//! responses carry flat `product_name` / `price` fields instead. The
//! accessors on [`CartItem`] resolve those variants into one display value.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::catalog::Product;
use crate::models::order::{NewOrder, NewOrderItem};
use crate::types::{CartId, CartItemId, CurrencyCode, Price, ProductId};

/// Name shown for a line whose product could not be resolved.
pub const FALLBACK_ITEM_NAME: &str = "Item";

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    #[serde(default)]
    pub product: Option<Product>,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub total_price_product: Option<Decimal>,
}

impl CartItem {
    /// Display name: product name, then the flat `product_name`, then
    /// [`FALLBACK_ITEM_NAME`].
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.product
            .as_ref()
            .map(|p| p.name.as_str())
            .or(self.product_name.as_deref())
            .unwrap_or(FALLBACK_ITEM_NAME)
    }

    /// Unit price: product price, then the flat `price`, then zero.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.product
            .as_ref()
            .map(|p| p.price)
            .or(self.price)
            .unwrap_or(Decimal::ZERO)
    }

    /// Quantity, treating a missing or zero quantity as one.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        match self.quantity {
            Some(0) | None => 1,
            Some(quantity) => quantity,
        }
    }

    /// Line total: the backend's `total_price_product` when present,
    /// otherwise unit price times quantity.
    ///
    /// Saturates at `Decimal::MAX` instead of overflowing.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.total_price_product.unwrap_or_else(|| {
            self.unit_price().saturating_mul(Decimal::from(self.quantity()))
        })
    }

    /// Product this line refers to, if the payload identifies one.
    #[must_use]
    pub fn product_id(&self) -> Option<ProductId> {
        self.product.as_ref().map(|p| p.id).or(self.product_id)
    }
}

/// The signed-in user's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub id: Option<CartId>,
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of line quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .map(CartItem::quantity)
            .fold(0, u32::saturating_add)
    }

    /// Sum of line totals, saturating at `Decimal::MAX`.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(CartItem::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Build the order request for the current cart contents.
    ///
    /// Lines that do not identify a product are skipped.
    #[must_use]
    pub fn order_request(&self) -> NewOrder {
        NewOrder {
            items: self
                .items
                .iter()
                .filter_map(|item| {
                    item.product_id().map(|product_id| NewOrderItem {
                        product_id,
                        quantity: item.quantity(),
                    })
                })
                .collect(),
        }
    }
}

/// Request body for adding a product to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddCartItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl AddCartItem {
    /// Add a single unit of a product.
    #[must_use]
    pub const fn one(product_id: ProductId) -> Self {
        Self {
            product_id,
            quantity: 1,
        }
    }
}

/// Cart totals computed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummary {
    pub total_items: u32,
    pub total_price: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl CartSummary {
    /// Total price with the reported currency.
    #[must_use]
    pub fn total(&self) -> Price {
        Price::new(self.total_price, CurrencyCode::from_code(&self.currency))
    }
}

fn default_currency() -> String {
    "RUB".to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(json: &str) -> CartItem {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_nested_product_wins() {
        let line = item(
            r#"{"id": 1, "product": {"id": 9, "name": "Tea", "price": 100}, "product_name": "Old", "price": 5, "quantity": 2}"#,
        );
        assert_eq!(line.display_name(), "Tea");
        assert_eq!(line.unit_price(), Decimal::from(100));
        assert_eq!(line.line_total(), Decimal::from(200));
        assert_eq!(line.product_id(), Some(ProductId::new(9)));
    }

    #[test]
    fn test_flat_fields_fallback() {
        let line = item(r#"{"id": 1, "product_name": "Mug", "price": 40.5, "quantity": 2}"#);
        assert_eq!(line.display_name(), "Mug");
        assert_eq!(line.unit_price(), Decimal::new(405, 1));
        assert_eq!(line.line_total(), Decimal::from(81));
        assert_eq!(line.product_id(), None);
    }

    #[test]
    fn test_missing_everything() {
        let line = item(r#"{"id": 1}"#);
        assert_eq!(line.display_name(), FALLBACK_ITEM_NAME);
        assert_eq!(line.unit_price(), Decimal::ZERO);
        assert_eq!(line.quantity(), 1);
        assert_eq!(line.line_total(), Decimal::ZERO);
    }

    #[test]
    fn test_zero_quantity_counts_as_one() {
        let line = item(r#"{"id": 1, "price": 10, "quantity": 0}"#);
        assert_eq!(line.quantity(), 1);
        assert_eq!(line.line_total(), Decimal::from(10));
    }

    #[test]
    fn test_backend_line_total_preferred() {
        let line = item(r#"{"id": 1, "price": 10, "quantity": 3, "total_price_product": 25}"#);
        assert_eq!(line.line_total(), Decimal::from(25));
    }

    #[test]
    fn test_cart_totals() {
        let cart: Cart = serde_json::from_str(
            r#"{"id": 4, "items": [
                {"id": 1, "product": {"id": 1, "name": "A", "price": 10}, "quantity": 2},
                {"id": 2, "product": {"id": 2, "name": "B", "price": 2.5}, "quantity": 4}
            ]}"#,
        )
        .unwrap();
        assert!(!cart.is_empty());
        assert_eq!(cart.item_count(), 6);
        assert_eq!(cart.total(), Decimal::from(30));
    }

    #[test]
    fn test_huge_prices_saturate() {
        let cart: Cart = serde_json::from_str(
            r#"{"items": [
                {"id": 1, "price": "1000000000000000000000000000", "quantity": 100},
                {"id": 2, "price": "70000000000000000000000000000", "quantity": 1}
            ]}"#,
        )
        .unwrap();
        let first = cart.items.first().unwrap();
        assert_eq!(first.line_total(), Decimal::MAX);
        assert_eq!(cart.total(), Decimal::MAX);
    }

    #[test]
    fn test_cart_without_items_field() {
        let cart: Cart = serde_json::from_str(r#"{"id": 4}"#).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_order_request_uses_product_ids() {
        let cart: Cart = serde_json::from_str(
            r#"{"items": [
                {"id": 11, "product": {"id": 1, "name": "A", "price": 10}, "quantity": 2},
                {"id": 12, "product_id": 5, "quantity": 1},
                {"id": 13, "product_name": "Ghost"}
            ]}"#,
        )
        .unwrap();
        let order = cart.order_request();
        assert_eq!(
            order.items,
            vec![
                NewOrderItem {
                    product_id: ProductId::new(1),
                    quantity: 2
                },
                NewOrderItem {
                    product_id: ProductId::new(5),
                    quantity: 1
                },
            ]
        );
    }

    #[test]
    fn test_summary_currency_default() {
        let summary: CartSummary =
            serde_json::from_str(r#"{"total_items": 3, "total_price": 99.9}"#).unwrap();
        assert_eq!(summary.currency, "RUB");
        assert_eq!(summary.total().to_string(), "99.90 ₽");
    }
}
