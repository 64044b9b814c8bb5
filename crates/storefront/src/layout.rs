//! Data every rendered page needs for the shared layout.
//!
//! Handlers take a [`Page`] extractor and build the [`Layout`] alongside
//! their own backend calls:
//!
//! ```rust,ignore
//! let (layout, cart) = tokio::join!(page.layout(state.api()), state.api().cart(&token));
//! ```

use axum::extract::{FromRequestParts, OriginalUri};
use axum::http::request::Parts;
use secrecy::SecretString;
use tower_sessions::Session;

use crate::api::ApiClient;
use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::middleware::CspNonce;
use crate::middleware::auth::current_user;
use crate::models::CurrentUser;

/// Per-request page context pulled from the session and middleware.
pub struct Page {
    session: Session,
    user: Option<CurrentUser>,
    nonce: String,
    path: String,
}

impl<S> FromRequestParts<S> for Page
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let user = current_user(&session).await;

        let nonce = parts
            .extensions
            .get::<CspNonce>()
            .map(|nonce| nonce.value().to_string())
            .unwrap_or_default();

        let path = parts
            .extensions
            .get::<OriginalUri>()
            .map_or_else(|| parts.uri.path().to_string(), |uri| uri.path().to_string());

        Ok(Self {
            session,
            user,
            nonce,
            path,
        })
    }
}

impl Page {
    /// The signed-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    /// Bearer token of the signed-in user, if any.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.user.as_ref().map(CurrentUser::token)
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Build the layout: takes the pending toast and fetches the cart badge.
    ///
    /// The badge is omitted when the summary can't be loaded.
    pub async fn layout(&self, api: &ApiClient) -> Layout {
        let flash = flash::take(&self.session).await;

        let cart_count = match &self.user {
            Some(user) => match api.cart_summary(&user.token()).await {
                Ok(summary) => Some(summary.total_items),
                Err(e) => {
                    tracing::debug!("Cart badge unavailable: {e}");
                    None
                }
            },
            None => None,
        };

        Layout {
            username: self.user.as_ref().map(|u| u.username.to_string()),
            flash,
            nonce: self.nonce.clone(),
            cart_count,
            path: self.path.clone(),
        }
    }
}

/// Shared layout data rendered by `base.html`.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub username: Option<String>,
    pub flash: Option<Flash>,
    pub nonce: String,
    pub cart_count: Option<u32>,
    pub path: String,
}

impl Layout {
    /// Item count for the nav badge; hidden when the cart is empty.
    #[must_use]
    pub fn cart_badge(&self) -> Option<u32> {
        self.cart_count.filter(|count| *count > 0)
    }

    /// Whether a nav section should be highlighted.
    #[must_use]
    pub fn is_active(&self, prefix: &str) -> bool {
        if prefix == "/" {
            return self.path == "/";
        }
        self.path == prefix || self.path.starts_with(&format!("{prefix}/"))
    }

    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.username.is_some()
    }
}
