//! Command implementations.
//!
//! Every command writes its human-readable output to the given writer so
//! tests can capture it.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod wishlist;

use secrecy::SecretString;
use shopfront_storefront::api::ApiClient;

use crate::error::CliError;
use crate::token::TokenStore;

/// Shared command context: backend client and token file.
pub struct Context {
    pub api: ApiClient,
    pub tokens: TokenStore,
}

impl Context {
    #[must_use]
    pub const fn new(api: ApiClient, tokens: TokenStore) -> Self {
        Self { api, tokens }
    }

    /// The stored bearer token.
    ///
    /// # Errors
    ///
    /// Returns `CliError::NotSignedIn` if nobody is signed in.
    pub fn token(&self) -> Result<SecretString, CliError> {
        self.tokens.load().map(|(_, token)| token)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopfront_core::ProductId;
    use shopfront_integration_tests::FakeBackend;
    use shopfront_storefront::api::BackendConfig;

    use super::*;

    struct Harness {
        backend: FakeBackend,
        ctx: Context,
        _dir: tempfile::TempDir,
    }

    async fn harness() -> Harness {
        let backend = FakeBackend::start().await;
        backend.add_user("alice", "pw");
        let api = ApiClient::new(&BackendConfig::new(backend.url().clone())).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let tokens = TokenStore::new(dir.path().join("token"));
        Harness {
            backend,
            ctx: Context::new(api, tokens),
            _dir: dir,
        }
    }

    fn output(out: Vec<u8>) -> String {
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_login_cart_and_order() {
        let h = harness().await;
        let mut out = Vec::new();

        auth::login(&h.ctx, &mut out, "alice", "pw".to_string())
            .await
            .unwrap();
        cart::add(&h.ctx, &mut out, ProductId::new(3), 2).await.unwrap();
        orders::place(&h.ctx, &mut out).await.unwrap();
        orders::list(&h.ctx, &mut out, None).await.unwrap();

        let out = output(out);
        assert!(out.contains("Signed in as alice"));
        assert!(out.contains("Added to cart!"));
        assert!(out.contains("Order placed! Order #"));
        assert!(out.contains("Mug ×2"));
        assert!(out.contains("900.00 ₽"));
        assert_eq!(h.backend.order_count("alice"), 1);
    }

    #[tokio::test]
    async fn test_bad_password_is_not_stored() {
        let h = harness().await;
        let mut out = Vec::new();

        let err = auth::login(&h.ctx, &mut out, "alice", "nope".to_string())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid username or password");
        assert!(matches!(h.ctx.token(), Err(CliError::NotSignedIn)));
    }

    #[tokio::test]
    async fn test_empty_cart_is_not_ordered() {
        let h = harness().await;
        let mut out = Vec::new();
        auth::login(&h.ctx, &mut out, "alice", "pw".to_string())
            .await
            .unwrap();

        let err = orders::place(&h.ctx, &mut out).await.unwrap_err();
        assert_eq!(err.to_string(), "Your cart is empty");
        assert_eq!(h.backend.count("POST", "/api/orders"), 0);
    }

    #[tokio::test]
    async fn test_commands_need_a_token() {
        let h = harness().await;
        let mut out = Vec::new();

        let err = cart::show(&h.ctx, &mut out).await.unwrap_err();
        assert!(matches!(err, CliError::NotSignedIn));
        assert_eq!(h.backend.count("GET", "/api/carts"), 0);
    }

    #[tokio::test]
    async fn test_rejected_token_asks_to_sign_in_again() {
        let h = harness().await;
        let mut out = Vec::new();
        auth::login(&h.ctx, &mut out, "alice", "pw".to_string())
            .await
            .unwrap();
        h.backend.set_reject_cart(true);

        let err = cart::show(&h.ctx, &mut out).await.unwrap_err();
        assert!(matches!(err, CliError::SessionExpired));
    }
}
