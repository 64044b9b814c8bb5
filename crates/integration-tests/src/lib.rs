//! Integration test support for Shopfront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! Nothing external is needed: [`FakeBackend`] serves a small in-memory
//! shop on `127.0.0.1:0` that speaks the backend's REST dialect, and
//! [`spawn_storefront`] serves the real storefront router against it.
//!
//! # Test Categories
//!
//! - `api_client` - `ApiClient` against the fake backend
//! - `storefront_pages` - rendered pages and form flows through a browser-like client

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    Form, Json, Router,
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::{Next, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

use shopfront_storefront::app;
use shopfront_storefront::config::StorefrontConfig;
use shopfront_storefront::state::AppState;

/// Categories served by the fake backend: (id, name).
pub const CATEGORIES: &[(i32, &str)] = &[(1, "Tea"), (2, "Mugs")];

/// Products served by the fake backend: (id, name, description, price, category).
pub const PRODUCTS: &[(i32, &str, &str, f64, i32)] = &[
    (1, "Green tea", "Sencha from Shizuoka", 250.0, 1),
    (2, "Black tea", "Strong Assam", 199.5, 1),
    (3, "Mug", "Stoneware, 350 ml", 450.0, 2),
];

/// Bearer token the fake backend issues for a user.
#[must_use]
pub fn token_for(username: &str) -> String {
    format!("token-{username}")
}

// =============================================================================
// Fake Backend
// =============================================================================

/// A request as seen by the fake backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Debug, Clone)]
struct CartLine {
    id: i32,
    product_id: i32,
    quantity: u32,
}

#[derive(Debug, Clone)]
struct WishEntry {
    id: i32,
    product_id: i32,
}

#[derive(Debug)]
struct BackendState {
    users: HashMap<String, String>,
    register_acknowledges: bool,
    reject_cart: bool,
    carts: HashMap<String, Vec<CartLine>>,
    orders: HashMap<String, Vec<Value>>,
    wishlists: HashMap<String, Vec<WishEntry>>,
    next_id: i32,
    requests: Vec<RecordedRequest>,
}

impl Default for BackendState {
    fn default() -> Self {
        Self {
            users: HashMap::new(),
            register_acknowledges: true,
            reject_cart: false,
            carts: HashMap::new(),
            orders: HashMap::new(),
            wishlists: HashMap::new(),
            next_id: 100,
            requests: Vec::new(),
        }
    }
}

impl BackendState {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

type Shared = Arc<Mutex<BackendState>>;

fn lock(state: &Shared) -> MutexGuard<'_, BackendState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory shop backend bound to an ephemeral local port.
pub struct FakeBackend {
    url: Url,
    state: Shared,
}

impl FakeBackend {
    /// Start the backend on `127.0.0.1:0`.
    ///
    /// # Panics
    ///
    /// Panics if the listener can't be bound.
    pub async fn start() -> Self {
        let state: Shared = Arc::default();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Failed to read local address");

        let app = backend_router(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let url = Url::parse(&format!("http://{addr}/")).expect("Failed to build backend URL");
        Self { url, state }
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Register a user directly.
    pub fn add_user(&self, username: &str, password: &str) {
        lock(&self.state)
            .users
            .insert(username.to_string(), password.to_string());
    }

    /// When false, registration answers 2xx without identifying the user.
    pub fn set_register_acknowledges(&self, acknowledges: bool) {
        lock(&self.state).register_acknowledges = acknowledges;
    }

    /// When true, `GET /api/carts` answers 401.
    pub fn set_reject_cart(&self, reject: bool) {
        lock(&self.state).reject_cart = reject;
    }

    /// Put a product in a user's cart.
    pub fn add_cart_line(&self, username: &str, product_id: i32, quantity: u32) {
        let mut state = lock(&self.state);
        let id = state.next_id();
        state
            .carts
            .entry(username.to_string())
            .or_default()
            .push(CartLine {
                id,
                product_id,
                quantity,
            });
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state).requests.clone()
    }

    /// How many requests hit `method path`.
    #[must_use]
    pub fn count(&self, method: &str, path: &str) -> usize {
        lock(&self.state)
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Number of orders a user has placed.
    #[must_use]
    pub fn order_count(&self, username: &str) -> usize {
        lock(&self.state).orders.get(username).map_or(0, Vec::len)
    }
}

fn backend_router(state: Shared) -> Router {
    Router::new()
        .route("/", get(|| async { Json(json!({"message": "shop api"})) }))
        .route("/api/users/token", post(login))
        .route("/api/users/register", post(register))
        .route("/api/categories", get(categories))
        .route("/api/products", get(products))
        .route("/api/products/category/{id}", get(products_in_category))
        .route("/api/products/{id}", get(product))
        .route("/api/products/{id}/reviews", get(reviews))
        .route("/api/carts", get(cart))
        .route("/api/carts/summary", get(cart_summary))
        .route("/api/carts/items", post(add_cart_item))
        .route(
            "/api/carts/items/{id}",
            delete(remove_cart_item).patch(change_quantity),
        )
        .route("/api/carts/all_items", delete(clear_cart))
        .route("/api/orders", get(orders).post(place_order))
        .route("/api/orders/{id}", get(order))
        .route("/api/wishlist", get(wishlist))
        .route(
            "/api/wishlist/{id}",
            post(add_to_wishlist).delete(remove_from_wishlist),
        )
        .layer(from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let recorded = RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(String::from),
        authorization: request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from),
    };
    lock(&state).requests.push(recorded);
    next.run(request).await
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

/// Resolve the bearer token to a known username.
fn user(state: &BackendState, headers: &HeaderMap) -> Result<String, Response> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(|token| token.strip_prefix("token-"))
        .filter(|username| state.users.contains_key(*username))
        .map(String::from)
        .ok_or_else(|| detail(StatusCode::UNAUTHORIZED, "Could not validate credentials"))
}

fn product_json(id: i32) -> Option<Value> {
    PRODUCTS
        .iter()
        .find(|(pid, ..)| *pid == id)
        .map(|(id, name, description, price, category)| {
            json!({
                "id": id,
                "name": name,
                "description": description,
                "price": price,
                "category_id": category,
            })
        })
}

fn product_price(id: i32) -> f64 {
    PRODUCTS
        .iter()
        .find(|(pid, ..)| *pid == id)
        .map_or(0.0, |(.., price, _)| *price)
}

fn cart_json(lines: &[CartLine]) -> Value {
    let items: Vec<Value> = lines
        .iter()
        .map(|line| {
            json!({
                "id": line.id,
                "product": product_json(line.product_id),
                "quantity": line.quantity,
                "total_price_product": product_price(line.product_id) * f64::from(line.quantity),
            })
        })
        .collect();
    json!({ "id": 1, "items": items })
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

async fn login(State(state): State<Shared>, Form(form): Form<LoginForm>) -> Response {
    let state = lock(&state);
    match state.users.get(&form.username) {
        Some(password) if *password == form.password => Json(json!({
            "access_token": token_for(&form.username),
            "token_type": "bearer",
        }))
        .into_response(),
        _ => detail(StatusCode::UNAUTHORIZED, "Incorrect username or password"),
    }
}

#[derive(Deserialize)]
struct RegisterBody {
    username: String,
    password: String,
}

async fn register(State(state): State<Shared>, Json(body): Json<RegisterBody>) -> Response {
    let mut state = lock(&state);
    if state.users.contains_key(&body.username) {
        return detail(StatusCode::BAD_REQUEST, "Username already registered");
    }
    if !state.register_acknowledges {
        return Json(json!({ "message": "accepted" })).into_response();
    }
    let id = state.next_id();
    state.users.insert(body.username.clone(), body.password);
    Json(json!({ "id": id, "username": body.username })).into_response()
}

async fn categories() -> Json<Value> {
    let categories: Vec<Value> = CATEGORIES
        .iter()
        .map(|(id, name)| json!({ "id": id, "name": name }))
        .collect();
    Json(Value::Array(categories))
}

async fn products() -> Json<Value> {
    Json(Value::Array(
        PRODUCTS.iter().filter_map(|(id, ..)| product_json(*id)).collect(),
    ))
}

async fn products_in_category(Path(category): Path<i32>) -> Json<Value> {
    Json(Value::Array(
        PRODUCTS
            .iter()
            .filter(|(.., c)| *c == category)
            .filter_map(|(id, ..)| product_json(*id))
            .collect(),
    ))
}

async fn product(Path(id): Path<i32>) -> Response {
    product_json(id).map_or_else(
        || detail(StatusCode::NOT_FOUND, "Product not found"),
        |p| Json(p).into_response(),
    )
}

async fn reviews(Path(id): Path<i32>) -> Json<Value> {
    if id != 1 {
        return Json(json!([]));
    }
    Json(json!([
        {"id": 1, "product_id": 1, "comment": "Lovely aroma", "grade": 5, "comment_date": "2024-03-01T10:00:00"},
        {"id": 2, "product_id": 1, "comment": null, "grade": 4, "comment_date": null},
    ]))
}

async fn cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    if state.reject_cart {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }
    let username = match user(&state, &headers) {
        Ok(username) => username,
        Err(response) => return response,
    };
    let lines = state.carts.get(&username).cloned().unwrap_or_default();
    Json(cart_json(&lines)).into_response()
}

async fn cart_summary(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    let username = match user(&state, &headers) {
        Ok(username) => username,
        Err(response) => return response,
    };
    let lines = state.carts.get(&username).cloned().unwrap_or_default();
    let total_items: u32 = lines.iter().map(|l| l.quantity).sum();
    let total_price: f64 = lines
        .iter()
        .map(|l| product_price(l.product_id) * f64::from(l.quantity))
        .sum();
    Json(json!({ "total_items": total_items, "total_price": total_price })).into_response()
}

#[derive(Deserialize)]
struct AddItemBody {
    product_id: i32,
    quantity: u32,
}

async fn add_cart_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<AddItemBody>,
) -> Response {
    let mut state = lock(&state);
    let username = match user(&state, &headers) {
        Ok(username) => username,
        Err(response) => return response,
    };
    if product_json(body.product_id).is_none() {
        return detail(StatusCode::NOT_FOUND, "Product not found");
    }

    let id = state.next_id();
    let lines = state.carts.entry(username).or_default();
    let line = if let Some(line) = lines.iter_mut().find(|l| l.product_id == body.product_id) {
        line.quantity += body.quantity;
        line.clone()
    } else {
        let line = CartLine {
            id,
            product_id: body.product_id,
            quantity: body.quantity,
        };
        lines.push(line.clone());
        line
    };

    Json(json!({
        "id": line.id,
        "product": product_json(line.product_id),
        "quantity": line.quantity,
    }))
    .into_response()
}

async fn remove_cart_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Response {
    let mut state = lock(&state);
    let username = match user(&state, &headers) {
        Ok(username) => username,
        Err(response) => return response,
    };
    let lines = state.carts.entry(username).or_default();
    let before = lines.len();
    lines.retain(|l| l.id != id);
    if lines.len() == before {
        return detail(StatusCode::NOT_FOUND, "Item not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

#[derive(Deserialize)]
struct CountQuery {
    count: i32,
}

async fn change_quantity(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i32>,
    Query(query): Query<CountQuery>,
) -> Response {
    let mut state = lock(&state);
    let username = match user(&state, &headers) {
        Ok(username) => username,
        Err(response) => return response,
    };
    let lines = state.carts.entry(username).or_default();
    let Some(line) = lines.iter_mut().find(|l| l.id == id) else {
        return detail(StatusCode::NOT_FOUND, "Item not found");
    };
    let quantity = i64::from(line.quantity) + i64::from(query.count);
    let Ok(quantity) = u32::try_from(quantity) else {
        return detail(StatusCode::BAD_REQUEST, "Quantity must be at least 1");
    };
    if quantity == 0 {
        return detail(StatusCode::BAD_REQUEST, "Quantity must be at least 1");
    }
    line.quantity = quantity;
    Json(cart_json(lines)).into_response()
}

async fn clear_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = lock(&state);
    let username = match user(&state, &headers) {
        Ok(username) => username,
        Err(response) => return response,
    };
    state.carts.remove(&username);
    StatusCode::NO_CONTENT.into_response()
}

#[derive(Deserialize)]
struct OrderBody {
    items: Vec<AddItemBody>,
}

async fn place_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<OrderBody>,
) -> Response {
    let mut state = lock(&state);
    let username = match user(&state, &headers) {
        Ok(username) => username,
        Err(response) => return response,
    };
    if body.items.is_empty() {
        return detail(StatusCode::BAD_REQUEST, "Order has no items");
    }

    let order_id = state.next_id();
    let mut total = 0.0;
    let mut items = Vec::new();
    for item in &body.items {
        let Some((_, name, _, price, _)) = PRODUCTS.iter().find(|(id, ..)| *id == item.product_id)
        else {
            return detail(StatusCode::NOT_FOUND, "Product not found");
        };
        total += price * f64::from(item.quantity);
        items.push(json!({
            "id": state.next_id(),
            "product_id": item.product_id,
            "product_name": name,
            "price": price,
            "quantity": item.quantity,
        }));
    }

    let order = json!({
        "id": order_id,
        "status": "pending",
        "total_price": total,
        "items": items,
    });
    state.carts.remove(&username);
    state
        .orders
        .entry(username)
        .or_default()
        .push(order.clone());
    (StatusCode::CREATED, Json(order)).into_response()
}

async fn orders(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    let username = match user(&state, &headers) {
        Ok(username) => username,
        Err(response) => return response,
    };
    let orders = state.orders.get(&username).cloned().unwrap_or_default();
    Json(Value::Array(orders)).into_response()
}

async fn order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let state = lock(&state);
    let username = match user(&state, &headers) {
        Ok(username) => username,
        Err(response) => return response,
    };
    state
        .orders
        .get(&username)
        .and_then(|orders| orders.iter().find(|o| o["id"].as_i64() == Some(id)))
        .map_or_else(
            || detail(StatusCode::NOT_FOUND, "Order not found"),
            |order| Json(order.clone()).into_response(),
        )
}

async fn wishlist(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    let username = match user(&state, &headers) {
        Ok(username) => username,
        Err(response) => return response,
    };
    let items: Vec<Value> = state
        .wishlists
        .get(&username)
        .map(|entries| {
            entries
                .iter()
                .map(|e| {
                    json!({
                        "id": e.id,
                        "product_id": e.product_id,
                        "product": product_json(e.product_id),
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    Json(json!({ "id": 1, "items": items })).into_response()
}

async fn add_to_wishlist(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(product_id): Path<i32>,
) -> Response {
    let mut state = lock(&state);
    let username = match user(&state, &headers) {
        Ok(username) => username,
        Err(response) => return response,
    };
    if product_json(product_id).is_none() {
        return detail(StatusCode::NOT_FOUND, "Product not found");
    }
    let id = state.next_id();
    let entries = state.wishlists.entry(username).or_default();
    if entries.iter().any(|e| e.product_id == product_id) {
        return detail(StatusCode::BAD_REQUEST, "Product already in wishlist");
    }
    entries.push(WishEntry { id, product_id });
    Json(json!({ "id": id, "product_id": product_id })).into_response()
}

async fn remove_from_wishlist(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Response {
    let mut state = lock(&state);
    let username = match user(&state, &headers) {
        Ok(username) => username,
        Err(response) => return response,
    };
    let entries = state.wishlists.entry(username).or_default();
    let before = entries.len();
    entries.retain(|e| e.id != id);
    if entries.len() == before {
        return detail(StatusCode::NOT_FOUND, "Item not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

// =============================================================================
// Storefront Harness
// =============================================================================

/// Storefront configuration pointing at a backend, with caching disabled.
///
/// # Panics
///
/// Panics if the configuration is rejected.
#[must_use]
pub fn storefront_config(backend: &Url) -> StorefrontConfig {
    let backend = backend.to_string();
    StorefrontConfig::from_source(move |key| match key {
        "SHOPFRONT_API_URL" => Some(backend.clone()),
        "SHOPFRONT_BASE_URL" => Some("http://127.0.0.1:3000".to_string()),
        "SHOPFRONT_CATALOG_CACHE_TTL_SECS" => Some("0".to_string()),
        "SHOPFRONT_STATIC_DIR" => Some(
            concat!(env!("CARGO_MANIFEST_DIR"), "/../storefront/static").to_string(),
        ),
        _ => None,
    })
    .expect("Failed to build storefront config")
}

/// Serve the storefront against `backend` on `127.0.0.1:0` and return its base URL.
///
/// # Panics
///
/// Panics if the server can't be started.
pub async fn spawn_storefront(backend: &Url) -> String {
    spawn_storefront_with(storefront_config(backend)).await
}

/// Serve the storefront with a custom configuration and return its base URL.
///
/// # Panics
///
/// Panics if the server can't be started.
pub async fn spawn_storefront_with(config: StorefrontConfig) -> String {
    let state = AppState::new(config).expect("Failed to build app state");
    let app = app::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind storefront");
    let addr = listener.local_addr().expect("Failed to read local address");

    tokio::spawn(async move {
        let _ = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await;
    });

    format!("http://{addr}")
}

/// A local URL with nothing listening on it.
///
/// # Panics
///
/// Panics if no port can be reserved.
pub async fn unreachable_url() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to reserve a port");
    let addr = listener.local_addr().expect("Failed to read local address");
    drop(listener);
    Url::parse(&format!("http://{addr}")).expect("valid URL")
}

/// A browser-like client: keeps cookies, does not follow redirects.
///
/// # Panics
///
/// Panics if the client can't be built.
#[must_use]
pub fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}
