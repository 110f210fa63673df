//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /products/{handle}      - Product detail (JSON), 302 to the first variant
//!
//! # Cart (route configurable, default /cart)
//! GET  /cart                   - Cart view (JSON)
//! POST /cart                   - Execute cartFormInput, returns view, triggers cart-updated
//! ```

pub mod cart;
pub mod products;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::shopify::StorefrontBackend;
use crate::state::AppState;

/// Liveness route.
pub const HEALTH_ROUTE: &str = "/health";

/// Prefix the product routes are nested under.
pub const PRODUCTS_ROUTE: &str = "/products";

/// Liveness check.
pub async fn health() -> &'static str {
    "ok"
}

/// Create the product routes router.
pub fn product_routes<B: StorefrontBackend>() -> Router<AppState<B>> {
    Router::new().route("/{handle}", get(products::show::<B>))
}

/// Create all routes for the storefront.
///
/// `cart_route` must not collide with the fixed routes; configuration
/// loaded through `StorefrontConfig` is checked for that.
pub fn routes<B: StorefrontBackend>(cart_route: &str) -> Router<AppState<B>> {
    Router::new()
        .route(HEALTH_ROUTE, get(health))
        // Product routes
        .nest(PRODUCTS_ROUTE, product_routes())
        // Cart
        .route(cart_route, get(cart::show::<B>).post(cart::action::<B>))
}

/// Build the application with state and middleware.
pub fn app<B: StorefrontBackend>(state: AppState<B>) -> Router {
    let cart_route = state.config().cart_route.clone();

    routes(&cart_route)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
