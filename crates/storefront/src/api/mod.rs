//! Client for the shop's REST backend.
//!
//! # Architecture
//!
//! - The backend is the source of truth for catalog, carts, orders and
//!   wishlists. Nothing is stored locally apart from the bearer token.
//! - Plain JSON over `reqwest`. The token endpoint is form-encoded.
//! - Catalog reads are cached in memory via `moka`. Anything that needs a
//!   bearer token is always fetched fresh.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_storefront::api::{ApiClient, BackendConfig, Credentials};
//!
//! let client = ApiClient::new(&config.backend)?;
//!
//! let token = client.login(&credentials).await?;
//! let cart = client.cart(&token.access_token.into()).await?;
//! ```

mod cache;
mod client;

pub use client::{ApiClient, BackendConfig};

use secrecy::SecretString;
use shopfront_core::Username;
use thiserror::Error;

/// Maximum number of characters of a raw response body kept as error detail.
const MAX_DETAIL_CHARS: usize = 200;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Missing, invalid or expired bearer token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status.
    #[error("Backend returned {status}: {detail}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Detail extracted from the response body.
        detail: String,
    },

    /// Request succeeded at the HTTP level but the backend did not accept it.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// HTTP status code of the backend response, if there was one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::NotFound(_) => Some(404),
            Self::RateLimited(_) => Some(429),
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Parse(_) | Self::Rejected(_) | Self::InvalidUrl(_) => None,
        }
    }

    /// Human-readable detail suitable for showing to a shopper.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Unauthorized(detail)
            | Self::NotFound(detail)
            | Self::Rejected(detail)
            | Self::Status { detail, .. } => detail.clone(),
            Self::RateLimited(secs) => format!("Too many requests, retry in {secs}s"),
            Self::Http(e) if e.is_timeout() => "Backend timed out".to_string(),
            Self::Http(_) => "Backend unreachable".to_string(),
            Self::Parse(_) => "Unexpected response from backend".to_string(),
            Self::InvalidUrl(e) => e.to_string(),
        }
    }

    /// Whether the error means the stored token is no longer accepted.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

/// Extract a readable detail from an error response body.
///
/// The backend answers errors with `{"detail": ...}`, where `detail` is a
/// string or, for validation errors, a JSON array. Other bodies are returned
/// truncated.
#[must_use]
pub fn extract_detail(body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(detail) = map.get("detail")
    {
        return match detail {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "no details".to_string();
    }
    trimmed.chars().take(MAX_DETAIL_CHARS).collect()
}

/// Username and password submitted to the login and register endpoints.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct Credentials {
    pub username: Username,
    pub password: SecretString,
}

impl Credentials {
    /// Create credentials from an already validated username.
    #[must_use]
    pub fn new(username: Username, password: impl Into<String>) -> Self {
        Self {
            username,
            password: SecretString::from(password.into()),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_detail_string() {
        assert_eq!(
            extract_detail(r#"{"detail": "Cart not found"}"#),
            "Cart not found"
        );
    }

    #[test]
    fn test_extract_detail_validation_array() {
        let detail = extract_detail(r#"{"detail": [{"msg": "field required"}]}"#);
        assert!(detail.contains("field required"));
    }

    #[test]
    fn test_extract_detail_plain_body_truncated() {
        let body = "x".repeat(500);
        assert_eq!(extract_detail(&body).len(), MAX_DETAIL_CHARS);
        assert_eq!(extract_detail("Bad Gateway"), "Bad Gateway");
        assert_eq!(extract_detail("   "), "no details");
    }

    #[test]
    fn test_extract_detail_json_without_detail() {
        assert_eq!(extract_detail(r#"{"error": "x"}"#), r#"{"error": "x"}"#);
    }

    #[test]
    fn test_api_error_status() {
        assert_eq!(ApiError::Unauthorized(String::new()).status(), Some(401));
        assert_eq!(
            ApiError::Status {
                status: 500,
                detail: "boom".to_string()
            }
            .status(),
            Some(500)
        );
        assert_eq!(ApiError::Rejected("no".to_string()).status(), None);
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new(Username::parse("alice").unwrap(), "hunter2-secret");
        let debug = format!("{creds:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
