//! Application state shared across handlers.

use std::sync::Arc;

use crate::cart::CartViewOptions;
use crate::config::StorefrontConfig;
use crate::shopify::StorefrontBackend;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the configuration and the Shopify backend. No cart state is held here;
/// every cart response is derived from the snapshot its request fetched.
pub struct AppState<B> {
    inner: Arc<AppStateInner<B>>,
}

struct AppStateInner<B> {
    config: StorefrontConfig,
    backend: B,
    cart_view: CartViewOptions,
}

// Derived Clone would require `B: Clone`.
impl<B> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: StorefrontBackend> AppState<B> {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `backend` - Shopify cart and catalog collaborator
    #[must_use]
    pub fn new(config: StorefrontConfig, backend: B) -> Self {
        let cart_view = config.cart_view_options();
        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                cart_view,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the Shopify backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    /// Paths the cart view links to.
    #[must_use]
    pub fn cart_view_options(&self) -> &CartViewOptions {
        &self.inner.cart_view
    }
}
