//! One-shot toast messages.
//!
//! A handler that redirects stores a [`Flash`] in the session; the next
//! rendered page takes it out and shows it as a toast. The toast is removed
//! by an inline script after [`FlashKind::dismiss_after_ms`].

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::models::session_keys;

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashKind {
    Success,
    Error,
}

impl FlashKind {
    /// Milliseconds before the toast dismisses itself.
    #[must_use]
    pub const fn dismiss_after_ms(self) -> u32 {
        match self {
            Self::Success => 2500,
            Self::Error => 3000,
        }
    }

    /// CSS modifier class.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "toast--success",
            Self::Error => "toast--error",
        }
    }
}

/// A message shown once on the next page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    /// Milliseconds before the toast dismisses itself.
    #[must_use]
    pub const fn dismiss_after_ms(&self) -> u32 {
        self.kind.dismiss_after_ms()
    }
}

/// Store a toast for the next page.
///
/// A session failure only loses the toast, so it is logged and swallowed.
pub async fn push(session: &Session, flash: Flash) {
    if let Err(e) = session.insert(session_keys::FLASH, flash).await {
        tracing::error!("Failed to store flash message: {e}");
    }
}

/// Take the pending toast, if any.
pub async fn take(session: &Session) -> Option<Flash> {
    session
        .remove::<Flash>(session_keys::FLASH)
        .await
        .ok()
        .flatten()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[test]
    fn test_dismiss_durations() {
        assert_eq!(Flash::success("ok").dismiss_after_ms(), 2500);
        assert_eq!(Flash::error("no").dismiss_after_ms(), 3000);
    }

    #[tokio::test]
    async fn test_flash_is_taken_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        push(&session, Flash::success("Added to cart!")).await;

        let flash = take(&session).await.unwrap();
        assert_eq!(flash.kind, FlashKind::Success);
        assert_eq!(flash.message, "Added to cart!");
        assert!(take(&session).await.is_none());
    }

    #[tokio::test]
    async fn test_newer_flash_replaces_older() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        push(&session, Flash::success("first")).await;
        push(&session, Flash::error("second")).await;
        assert_eq!(take(&session).await.unwrap().message, "second");
    }
}
