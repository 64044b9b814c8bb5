//! Authentication payloads exchanged with the backend.

use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// Response of the token endpoint.
#[derive(Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "bearer")]
    pub token_type: String,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("token_type", &self.token_type)
            .finish()
    }
}

fn bearer() -> String {
    "bearer".to_string()
}

/// Body returned by the registration endpoint.
///
/// A registration only counts as successful when at least one of the
/// identifying fields is present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RegisteredUser {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl RegisteredUser {
    /// Whether the backend acknowledged the new account.
    #[must_use]
    pub const fn is_acknowledged(&self) -> bool {
        self.id.is_some() || self.username.is_some()
    }
}
