//! Records exchanged with the shop backend.
//!
//! These are the backend's JSON shapes, decoded as-is. Invariants are the
//! backend's business; the only logic here is the display fallbacks the
//! storefront and CLI share.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod wishlist;

pub use auth::{RegisteredUser, TokenResponse};
pub use cart::{AddCartItem, Cart, CartItem, CartSummary, FALLBACK_ITEM_NAME};
pub use catalog::{Category, Product, Review, average_grade};
pub use order::{NewOrder, NewOrderItem, Order, OrderItem};
pub use wishlist::{Wishlist, WishlistItem};
