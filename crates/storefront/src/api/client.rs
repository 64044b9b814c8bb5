//! Backend REST client implementation.
//!
//! Caches catalog reads (categories and products) using `moka`.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use shopfront_core::{
    AddCartItem, Cart, CartItem, CartItemId, CartSummary, Category, CategoryId, NewOrder, Order,
    OrderId, Product, ProductId, RegisteredUser, Review, TokenResponse, Wishlist, WishlistItem,
    WishlistItemId,
};

use super::cache::{CacheKey, CacheValue};
use super::{ApiError, Credentials, extract_detail};

/// Maximum number of characters of a response body written to logs.
const MAX_LOGGED_BODY_CHARS: usize = 500;

/// Connection settings for the backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the backend, e.g. `http://localhost:8000/`.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// How long catalog responses are cached. Zero disables the cache.
    pub catalog_cache_ttl: Duration,
}

impl BackendConfig {
    /// Settings with default timeout (10s) and cache TTL (60s).
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(10),
            catalog_cache_ttl: Duration::from_secs(60),
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the shop backend.
///
/// Cheap to clone; clones share the connection pool and catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Option<Cache<CacheKey, CacheValue>>,
}

impl ApiClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("shopfront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = (!config.catalog_cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(1000)
                .time_to_live(config.catalog_cache_ttl)
                .build()
        });

        // Url::join drops the last path segment unless the base ends in '/'
        let mut base_url = config.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url,
                cache,
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.inner.client.request(method, url)
    }

    fn authed(&self, method: Method, url: Url, token: &SecretString) -> RequestBuilder {
        self.request(method, url).bearer_auth(token.expose_secret())
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %body.chars().take(MAX_LOGGED_BODY_CHARS).collect::<String>(),
                "Backend returned non-success status"
            );
            let detail = extract_detail(&body);
            return Err(match status {
                reqwest::StatusCode::UNAUTHORIZED => ApiError::Unauthorized(detail),
                reqwest::StatusCode::NOT_FOUND => ApiError::NotFound(detail),
                _ => ApiError::Status {
                    status: status.as_u16(),
                    detail,
                },
            });
        }

        Ok(body)
    }

    /// Send a request and decode the JSON body.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(MAX_LOGGED_BODY_CHARS).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    async fn cached(&self, key: &CacheKey) -> Option<CacheValue> {
        match &self.inner.cache {
            Some(cache) => cache.get(key).await,
            None => None,
        }
    }

    async fn store(&self, key: CacheKey, value: CacheValue) {
        if let Some(cache) = &self.inner.cache {
            cache.insert(key, value).await;
        }
    }

    /// Readiness probe: the backend answers on its root path.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or answers with an error status.
    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<(), ApiError> {
        let url = self.url("")?;
        self.send(self.request(Method::GET, url)).await?;
        Ok(())
    }

    // =========================================================================
    // Auth Methods
    // =========================================================================

    /// Exchange a username and password for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for bad credentials, or another
    /// error if the request fails.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &Credentials) -> Result<TokenResponse, ApiError> {
        let url = self.url("api/users/token")?;
        let form = [
            ("username", credentials.username.as_str()),
            ("password", credentials.password.expose_secret()),
            ("grant_type", "password"),
        ];
        self.execute(self.request(Method::POST, url).form(&form)).await
    }

    /// Create an account.
    ///
    /// Succeeds only if the backend answers 2xx and the body identifies the
    /// new user by `id` or `username`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] if the body does not acknowledge the
    /// account, or another error if the request fails.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn register(&self, credentials: &Credentials) -> Result<RegisteredUser, ApiError> {
        let url = self.url("api/users/register")?;
        let body = serde_json::json!({
            "username": credentials.username.as_str(),
            "password": credentials.password.expose_secret(),
        });
        let text = self.send(self.request(Method::POST, url).json(&body)).await?;

        match serde_json::from_str::<RegisteredUser>(&text) {
            Ok(user) if user.is_acknowledged() => Ok(user),
            _ => Err(ApiError::Rejected(extract_detail(&text))),
        }
    }

    // =========================================================================
    // Catalog Methods (cached)
    // =========================================================================

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let key = CacheKey::Categories;
        if let Some(CacheValue::Categories(categories)) = self.cached(&key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let url = self.url("api/categories")?;
        let categories: Vec<Category> = self.execute(self.request(Method::GET, url)).await?;
        self.store(key, CacheValue::Categories(categories.clone())).await;
        Ok(categories)
    }

    /// List products, optionally restricted to one category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, category: Option<CategoryId>) -> Result<Vec<Product>, ApiError> {
        let key = CacheKey::Products { category };
        if let Some(CacheValue::Products(products)) = self.cached(&key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let url = match category {
            Some(id) => self.url(&format!("api/products/category/{id}"))?,
            None => self.url("api/products")?,
        };
        let products: Vec<Product> = self.execute(self.request(Method::GET, url)).await?;
        self.store(key, CacheValue::Products(products.clone())).await;
        Ok(products)
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown products, or another error
    /// if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.cached(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.url(&format!("api/products/{id}"))?;
        let product: Product = self.execute(self.request(Method::GET, url)).await?;
        self.store(key, CacheValue::Product(Box::new(product.clone()))).await;
        Ok(product)
    }

    /// List reviews of a product. Not cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product_reviews(&self, id: ProductId) -> Result<Vec<Review>, ApiError> {
        let url = self.url(&format!("api/products/{id}/reviews"))?;
        self.execute(self.request(Method::GET, url)).await
    }

    // =========================================================================
    // Cart Methods (not cached - per-user state)
    // =========================================================================

    /// Get the signed-in user's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn cart(&self, token: &SecretString) -> Result<Cart, ApiError> {
        let url = self.url("api/carts")?;
        self.execute(self.authed(Method::GET, url, token)).await
    }

    /// Get the backend's cart totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn cart_summary(&self, token: &SecretString) -> Result<CartSummary, ApiError> {
        let url = self.url("api/carts/summary")?;
        self.execute(self.authed(Method::GET, url, token)).await
    }

    /// Add a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn add_to_cart(
        &self,
        token: &SecretString,
        item: &AddCartItem,
    ) -> Result<CartItem, ApiError> {
        let url = self.url("api/carts/items")?;
        self.execute(self.authed(Method::POST, url, token).json(item)).await
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(item_id = %id))]
    pub async fn remove_cart_item(
        &self,
        token: &SecretString,
        id: CartItemId,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("api/carts/items/{id}"))?;
        self.send(self.authed(Method::DELETE, url, token)).await?;
        Ok(())
    }

    /// Change a line's quantity by `delta` and return the updated cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(item_id = %id))]
    pub async fn change_cart_item_quantity(
        &self,
        token: &SecretString,
        id: CartItemId,
        delta: i32,
    ) -> Result<Cart, ApiError> {
        let mut url = self.url(&format!("api/carts/items/{id}"))?;
        url.query_pairs_mut().append_pair("count", &delta.to_string());
        self.execute(self.authed(Method::PATCH, url, token)).await
    }

    /// Remove every line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn clear_cart(&self, token: &SecretString) -> Result<(), ApiError> {
        let url = self.url("api/carts/all_items")?;
        self.send(self.authed(Method::DELETE, url, token)).await?;
        Ok(())
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, order), fields(lines = order.items.len()))]
    pub async fn place_order(
        &self,
        token: &SecretString,
        order: &NewOrder,
    ) -> Result<Order, ApiError> {
        let url = self.url("api/orders")?;
        self.execute(self.authed(Method::POST, url, token).json(order)).await
    }

    /// List the signed-in user's orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn orders(&self, token: &SecretString) -> Result<Vec<Order>, ApiError> {
        let url = self.url("api/orders")?;
        self.execute(self.authed(Method::GET, url, token)).await
    }

    /// Get one order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(order_id = %id))]
    pub async fn order(&self, token: &SecretString, id: OrderId) -> Result<Order, ApiError> {
        let url = self.url(&format!("api/orders/{id}"))?;
        self.execute(self.authed(Method::GET, url, token)).await
    }

    // =========================================================================
    // Wishlist Methods
    // =========================================================================

    /// Get the signed-in user's wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn wishlist(&self, token: &SecretString) -> Result<Wishlist, ApiError> {
        let url = self.url("api/wishlist")?;
        self.execute(self.authed(Method::GET, url, token)).await
    }

    /// Save a product to the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn add_to_wishlist(
        &self,
        token: &SecretString,
        product_id: ProductId,
    ) -> Result<WishlistItem, ApiError> {
        let url = self.url(&format!("api/wishlist/{product_id}"))?;
        self.execute(self.authed(Method::POST, url, token)).await
    }

    /// Remove an entry from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(item_id = %id))]
    pub async fn remove_from_wishlist(
        &self,
        token: &SecretString,
        id: WishlistItemId,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("api/wishlist/{id}"))?;
        self.send(self.authed(Method::DELETE, url, token)).await?;
        Ok(())
    }

    /// Drop all cached catalog data.
    pub fn invalidate_catalog(&self) {
        if let Some(cache) = &self.inner.cache {
            cache.invalidate_all();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&BackendConfig::new(Url::parse(base).unwrap())).unwrap()
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let api = client("http://localhost:8000/backend");
        assert_eq!(api.base_url().as_str(), "http://localhost:8000/backend/");
        assert_eq!(
            api.url("api/products").unwrap().as_str(),
            "http://localhost:8000/backend/api/products"
        );
    }

    #[test]
    fn test_root_base_url() {
        let api = client("http://localhost:8000");
        assert_eq!(
            api.url("api/carts/items/4").unwrap().as_str(),
            "http://localhost:8000/api/carts/items/4"
        );
    }

    #[test]
    fn test_zero_ttl_disables_cache() {
        let mut config = BackendConfig::new(Url::parse("http://localhost:8000").unwrap());
        config.catalog_cache_ttl = Duration::ZERO;
        let api = ApiClient::new(&config).unwrap();
        assert!(api.inner.cache.is_none());
    }
}
