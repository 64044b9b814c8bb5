//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                            - Landing page (guests) or catalog
//! GET  /health                      - Health check
//! GET  /health/ready                - Backend readiness check
//!
//! # Catalog
//! GET  /catalog                     - Category bar and product grid
//! GET  /catalog?category=:id        - Products of one category
//! GET  /products/:id                - Product detail with reviews
//!
//! # Cart (requires auth for mutations)
//! GET  /cart                        - Cart page with statistics chart
//! POST /cart/items                  - Add product (redirects to return_to)
//! POST /cart/items/:id/quantity     - Change quantity by delta
//! POST /cart/items/:id/remove       - Remove line
//! POST /cart/clear                  - Remove all lines
//!
//! # Orders (requires auth)
//! GET  /orders                      - Order history
//! POST /orders                      - Place order from cart
//! GET  /orders/:id                  - Order detail
//!
//! # Wishlist (requires auth)
//! GET  /wishlist                    - Saved products
//! POST /wishlist/:product_id        - Save product
//! POST /wishlist/items/:id/remove   - Remove entry
//!
//! # Auth
//! GET  /auth/login                  - Login page
//! POST /auth/login                  - Login action (rate limited)
//! GET  /auth/register               - Register page
//! POST /auth/register               - Register action (rate limited)
//! POST /auth/logout                 - Logout action
//! ```

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod products;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::config::StorefrontConfig;
use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
///
/// Only the credential POSTs sit behind the rate limiter.
pub fn auth_routes(trust_proxy_headers: bool) -> Router<AppState> {
    let limited = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .layer(auth_rate_limiter(trust_proxy_headers));

    Router::new()
        .route("/login", get(auth::login_page))
        .route("/register", get(auth::register_page))
        .route("/logout", post(auth::logout))
        .merge(limited)
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/items", post(cart::add))
        .route("/items/{id}/quantity", post(cart::change_quantity))
        .route("/items/{id}/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::place))
        .route("/{id}", get(orders::show))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/{product_id}", post(wishlist::add))
        .route("/items/{id}/remove", post(wishlist::remove))
}

/// Create all routes for the storefront.
pub fn routes(config: &StorefrontConfig) -> Router<AppState> {
    Router::new()
        // Landing page
        .route("/", get(catalog::home))
        // Catalog
        .route("/catalog", get(catalog::index))
        .route("/products/{id}", get(products::show))
        // Cart
        .nest("/cart", cart_routes())
        // Orders
        .nest("/orders", order_routes())
        // Wishlist
        .nest("/wishlist", wishlist_routes())
        // Auth routes
        .nest("/auth", auth_routes(config.trust_proxy_headers))
}
