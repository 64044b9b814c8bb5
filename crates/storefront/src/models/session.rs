//! Session-related types.
//!
//! Types stored in the session for authentication state.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use shopfront_core::Username;

/// Session-stored user identity.
///
/// Holds the bearer token issued by the backend at login. The token is
/// opaque to us: there is no expiry check or refresh.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Name the user signed in with.
    pub username: Username,
    /// Bearer token for authenticated backend calls.
    access_token: String,
}

impl CurrentUser {
    /// Create a session identity from a fresh login.
    #[must_use]
    pub fn new(username: Username, access_token: impl Into<String>) -> Self {
        Self {
            username,
            access_token: access_token.into(),
        }
    }

    /// Bearer token for backend requests.
    #[must_use]
    pub fn token(&self) -> SecretString {
        SecretString::from(self.access_token.clone())
    }
}

impl std::fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUser")
            .field("username", &self.username)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the one-shot toast shown on the next page.
    pub const FLASH: &str = "flash";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_current_user_debug_redacts_token() {
        let user = CurrentUser::new(Username::parse("alice").unwrap(), "tok-123-secret");
        let debug = format!("{user:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("tok-123-secret"));
    }

    #[test]
    fn test_current_user_session_roundtrip() {
        let user = CurrentUser::new(Username::parse("alice").unwrap(), "tok");
        let json = serde_json::to_value(&user).unwrap();
        let back: CurrentUser = serde_json::from_value(json).unwrap();
        assert_eq!(back.token().expose_secret(), "tok");
        assert_eq!(back.username.as_str(), "alice");
    }
}
