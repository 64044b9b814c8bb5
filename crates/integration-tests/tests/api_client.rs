//! Integration tests for the backend API client.
//!
//! Each test starts its own in-memory backend; nothing external is needed.

use secrecy::SecretString;
use shopfront_core::{AddCartItem, CategoryId, OrderId, OrderStatus, ProductId, Username};
use shopfront_integration_tests::{FakeBackend, token_for};
use shopfront_storefront::api::{ApiClient, ApiError, BackendConfig, Credentials};

fn client(backend: &FakeBackend) -> ApiClient {
    ApiClient::new(&BackendConfig::new(backend.url().clone())).expect("Failed to build client")
}

fn credentials(username: &str, password: &str) -> Credentials {
    Credentials::new(
        Username::parse(username).expect("valid username"),
        password.to_string(),
    )
}

fn token(username: &str) -> SecretString {
    SecretString::from(token_for(username))
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_login_returns_token() {
    let backend = FakeBackend::start().await;
    backend.add_user("alice", "pw");
    let api = client(&backend);

    let token = api
        .login(&credentials("alice", "pw"))
        .await
        .expect("login should succeed");
    assert_eq!(token.access_token, token_for("alice"));
    assert_eq!(token.token_type, "bearer");
}

#[tokio::test]
async fn test_login_with_bad_password_is_unauthorized() {
    let backend = FakeBackend::start().await;
    backend.add_user("alice", "pw");
    let api = client(&backend);

    let err = api
        .login(&credentials("alice", "wrong"))
        .await
        .expect_err("login should fail");
    assert!(err.is_unauthorized());
    assert_eq!(err.detail(), "Incorrect username or password");
}

#[tokio::test]
async fn test_register_requires_acknowledgement() {
    let backend = FakeBackend::start().await;
    let api = client(&backend);

    let user = api
        .register(&credentials("bob", "pw"))
        .await
        .expect("registration should succeed");
    assert!(user.is_acknowledged());

    backend.set_register_acknowledges(false);
    let err = api
        .register(&credentials("carol", "pw"))
        .await
        .expect_err("unacknowledged registration should fail");
    assert!(matches!(err, ApiError::Rejected(_)));
}

#[tokio::test]
async fn test_register_duplicate_reports_detail() {
    let backend = FakeBackend::start().await;
    backend.add_user("alice", "pw");
    let api = client(&backend);

    let err = api
        .register(&credentials("alice", "pw"))
        .await
        .expect_err("duplicate registration should fail");
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.detail(), "Username already registered");
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn test_category_filter_uses_category_endpoint() {
    let backend = FakeBackend::start().await;
    let api = client(&backend);

    let all = api.products(None).await.expect("products");
    assert_eq!(all.len(), 3);

    let mugs = api.products(Some(CategoryId::new(2))).await.expect("products");
    assert_eq!(mugs.len(), 1);
    assert_eq!(mugs[0].name, "Mug");

    assert_eq!(backend.count("GET", "/api/products"), 1);
    assert_eq!(backend.count("GET", "/api/products/category/2"), 1);
}

#[tokio::test]
async fn test_catalog_is_cached() {
    let backend = FakeBackend::start().await;
    let api = client(&backend);

    api.categories().await.expect("categories");
    api.categories().await.expect("categories");
    assert_eq!(backend.count("GET", "/api/categories"), 1);

    api.invalidate_catalog();
    api.categories().await.expect("categories");
    assert_eq!(backend.count("GET", "/api/categories"), 2);
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let backend = FakeBackend::start().await;
    let api = client(&backend);

    let err = api
        .product(ProductId::new(999))
        .await
        .expect_err("product should be missing");
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_reviews() {
    let backend = FakeBackend::start().await;
    let api = client(&backend);

    let reviews = api.product_reviews(ProductId::new(1)).await.expect("reviews");
    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[0].stars(), "★★★★★");
}

// ============================================================================
// Cart and Orders
// ============================================================================

#[tokio::test]
async fn test_cart_requests_carry_bearer_token() {
    let backend = FakeBackend::start().await;
    backend.add_user("alice", "pw");
    let api = client(&backend);

    api.add_to_cart(&token("alice"), &AddCartItem::one(ProductId::new(1)))
        .await
        .expect("add to cart");
    let cart = api.cart(&token("alice")).await.expect("cart");
    assert_eq!(cart.items.len(), 1);

    let expected = format!("Bearer {}", token_for("alice"));
    let authed: Vec<_> = backend
        .requests()
        .into_iter()
        .filter(|r| r.path.starts_with("/api/carts"))
        .collect();
    assert_eq!(authed.len(), 2);
    assert!(
        authed
            .iter()
            .all(|r| r.authorization.as_deref() == Some(expected.as_str()))
    );
}

#[tokio::test]
async fn test_cart_with_bad_token_is_unauthorized() {
    let backend = FakeBackend::start().await;
    let api = client(&backend);

    let err = api
        .cart(&token("nobody"))
        .await
        .expect_err("cart should be rejected");
    assert!(err.is_unauthorized());
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn test_remove_cart_item() {
    let backend = FakeBackend::start().await;
    backend.add_user("alice", "pw");
    backend.add_cart_line("alice", 1, 1);
    backend.add_cart_line("alice", 3, 2);
    let api = client(&backend);

    let cart = api.cart(&token("alice")).await.expect("cart");
    let item = cart.items[0].id;

    api.remove_cart_item(&token("alice"), item)
        .await
        .expect("remove cart item");
    assert_eq!(
        backend.count("DELETE", &format!("/api/carts/items/{item}")),
        1
    );

    let cart = api.cart(&token("alice")).await.expect("cart");
    assert_eq!(cart.items.len(), 1);
    assert!(cart.items.iter().all(|line| line.id != item));

    let err = api
        .remove_cart_item(&token("alice"), item)
        .await
        .expect_err("line is already gone");
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_change_quantity_sends_delta() {
    let backend = FakeBackend::start().await;
    backend.add_user("alice", "pw");
    backend.add_cart_line("alice", 2, 1);
    let api = client(&backend);

    let cart = api.cart(&token("alice")).await.expect("cart");
    let item = cart.items[0].id;

    let cart = api
        .change_cart_item_quantity(&token("alice"), item, 2)
        .await
        .expect("change quantity");
    assert_eq!(cart.items[0].quantity(), 3);

    let patch = backend
        .requests()
        .into_iter()
        .find(|r| r.method == "PATCH")
        .expect("PATCH request");
    assert_eq!(patch.query.as_deref(), Some("count=2"));

    let err = api
        .change_cart_item_quantity(&token("alice"), item, -5)
        .await
        .expect_err("quantity below 1 is refused");
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_place_order_sends_product_ids() {
    let backend = FakeBackend::start().await;
    backend.add_user("alice", "pw");
    backend.add_cart_line("alice", 1, 2);
    backend.add_cart_line("alice", 3, 1);
    let api = client(&backend);

    let cart = api.cart(&token("alice")).await.expect("cart");
    let request = cart.order_request();
    assert_eq!(
        request
            .items
            .iter()
            .map(|i| i.product_id)
            .collect::<Vec<_>>(),
        vec![ProductId::new(1), ProductId::new(3)]
    );

    let order = api
        .place_order(&token("alice"), &request)
        .await
        .expect("order");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total().to_string(), "950.00 ₽");
    assert_eq!(order.items.len(), 2);

    let orders = api.orders(&token("alice")).await.expect("orders");
    assert_eq!(orders.len(), 1);
    assert!(api.cart(&token("alice")).await.expect("cart").is_empty());
}

#[tokio::test]
async fn test_order_by_id() {
    let backend = FakeBackend::start().await;
    backend.add_user("alice", "pw");
    backend.add_cart_line("alice", 2, 1);
    let api = client(&backend);

    let cart = api.cart(&token("alice")).await.expect("cart");
    let placed = api
        .place_order(&token("alice"), &cart.order_request())
        .await
        .expect("order");

    let order = api.order(&token("alice"), placed.id).await.expect("order");
    assert_eq!(order, placed);

    let err = api
        .order(&token("alice"), OrderId::new(999))
        .await
        .expect_err("order should be missing");
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_wishlist_roundtrip() {
    let backend = FakeBackend::start().await;
    backend.add_user("alice", "pw");
    let api = client(&backend);

    let entry = api
        .add_to_wishlist(&token("alice"), ProductId::new(3))
        .await
        .expect("add to wishlist");
    let wishlist = api.wishlist(&token("alice")).await.expect("wishlist");
    assert!(wishlist.contains(ProductId::new(3)));

    api.remove_from_wishlist(&token("alice"), entry.id)
        .await
        .expect("remove from wishlist");
    let wishlist = api.wishlist(&token("alice")).await.expect("wishlist");
    assert!(wishlist.items.is_empty());
}

#[tokio::test]
async fn test_ping() {
    let backend = FakeBackend::start().await;
    client(&backend).ping().await.expect("backend should answer");
}
