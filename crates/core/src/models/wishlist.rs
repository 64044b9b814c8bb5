//! Wishlist records.

use serde::{Deserialize, Serialize};

use crate::models::catalog::Product;
use crate::types::{ProductId, WishlistId, WishlistItemId};

/// The signed-in user's wishlist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wishlist {
    #[serde(default)]
    pub id: Option<WishlistId>,
    #[serde(default)]
    pub items: Vec<WishlistItem>,
}

impl Wishlist {
    /// Whether the product is already on the wishlist.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|item| item.product_id == product_id)
    }
}

/// A product saved for later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub id: WishlistItemId,
    pub product_id: ProductId,
    #[serde(default)]
    pub product: Option<Product>,
}
