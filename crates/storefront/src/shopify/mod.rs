//! Boundary with the Shopify Storefront API.
//!
//! # Architecture
//!
//! - The GraphQL transport is not part of this crate. Whatever client the
//!   host application uses plugs in through the traits below.
//! - Shopify is the source of truth for carts - there is no local cart
//!   state. Reads return a [`CartSnapshot`]; writes are described as
//!   [`CartIntent`] values and handed to a [`CartMutationExecutor`].
//!
//! # Example
//!
//! ```rust,ignore
//! use hustlestack_storefront::shopify::{CartSource, CartMutationExecutor};
//!
//! let snapshot = client.fetch_cart().await?;
//! let outcome = client.execute(CartIntent::remove_lines(vec![line_id])?).await?;
//! ```

pub mod types;

use std::future::Future;

use hustlestack_core::SelectedOption;
use thiserror::Error;

use crate::cart::{CartIntent, CartSnapshot};

pub use types::*;

/// Errors reported by a Shopify collaborator.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<String>),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

fn format_graphql_errors(errors: &[String]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }
    errors.join("; ")
}

/// Result of executing one cart intent.
#[derive(Debug, Clone, Default)]
pub struct CartMutationOutcome {
    /// The cart after the mutation; `None` if the platform returned no cart.
    pub cart: Option<CartSnapshot>,
    /// Validation errors reported by the platform.
    pub user_errors: Vec<CartUserError>,
}

/// Yields the current cart snapshot.
pub trait CartSource: Send + Sync + 'static {
    /// Fetch the current cart. `Ok(None)` means there is no cart yet.
    fn fetch_cart(
        &self,
    ) -> impl Future<Output = Result<Option<CartSnapshot>, ShopifyError>> + Send;
}

/// Executes cart mutation intents against the platform.
pub trait CartMutationExecutor: Send + Sync + 'static {
    /// Execute one intent and return the resulting cart.
    fn execute(
        &self,
        intent: CartIntent,
    ) -> impl Future<Output = Result<CartMutationOutcome, ShopifyError>> + Send;
}

/// Read access to the product catalog.
pub trait ProductCatalog: Send + Sync + 'static {
    /// Look up a product by handle, resolving `selected_options` to
    /// [`Product::selected_variant`]. `Ok(None)` means no such product.
    fn product(
        &self,
        handle: &str,
        selected_options: &[SelectedOption],
    ) -> impl Future<Output = Result<Option<Product>, ShopifyError>> + Send;

    /// All variants of a product (the deferred variants query).
    fn variants(
        &self,
        handle: &str,
    ) -> impl Future<Output = Result<Vec<ProductVariant>, ShopifyError>> + Send;
}

/// Everything the storefront routes need from Shopify.
pub trait StorefrontBackend: CartSource + CartMutationExecutor + ProductCatalog {}

impl<T> StorefrontBackend for T where T: CartSource + CartMutationExecutor + ProductCatalog {}
