//! Storefront-side models.
//!
//! Backend records live in `shopfront_core`; this module only holds what
//! the storefront keeps in its own session.

pub mod session;

pub use session::{CurrentUser, keys as session_keys};
