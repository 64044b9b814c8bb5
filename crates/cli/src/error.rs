//! CLI error type.

use shopfront_core::UsernameError;
use shopfront_storefront::api::ApiError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// No stored token.
    #[error("not signed in, run `shop login`")]
    NotSignedIn,

    /// Backend request failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The backend rejected the stored token.
    #[error("session expired, run `shop login`")]
    SessionExpired,

    /// Invalid username.
    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    /// Invalid backend URL.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Neither `SHOPFRONT_TOKEN_FILE` nor `HOME` is set.
    #[error("cannot locate token file: set SHOPFRONT_TOKEN_FILE or HOME")]
    NoTokenLocation,

    /// Token file is unreadable or corrupt.
    #[error("Token file {path}: {message}")]
    TokenFile { path: String, message: String },

    /// Terminal or filesystem I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Nothing to do, e.g. ordering from an empty cart.
    #[error("{0}")]
    Nothing(String),
}

impl CliError {
    /// Map a backend 401 to a re-login hint; other errors pass through.
    #[must_use]
    pub fn from_authed(error: ApiError) -> Self {
        if error.is_unauthorized() {
            Self::SessionExpired
        } else {
            Self::Api(error)
        }
    }
}
