//! HustleStack storefront library.
//!
//! Canonical variant URLs, the product page variant selection, the cart view
//! reconciler and a thin axum router over them. Shopify access is supplied
//! by the host through the traits in [`shopify`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod error;
pub mod product;
pub mod routes;
pub mod shopify;
pub mod state;
pub mod variant;

pub use routes::app;
pub use state::AppState;
