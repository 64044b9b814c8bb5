//! Shopfront storefront library.
//!
//! Server-rendered shop front for a REST shop backend: catalog, cart,
//! orders, wishlist and sign-in. The [`api`] module holds the typed
//! backend client shared with the `shop` CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod app;
pub mod chart;
pub mod config;
pub mod error;
pub mod filters;
pub mod flash;
pub mod layout;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
