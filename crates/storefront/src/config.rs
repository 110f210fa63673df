//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STOREFRONT_STORE_NAME` - Store name used in page titles (default: `HustleStack`)
//! - `STOREFRONT_CART_ROUTE` - Route cart forms post to (default: /cart); must
//!   not collide with `/health` or `/products/...`
//! - `STOREFRONT_COLLECTIONS_PATH` - Empty-cart link target (default: /collections)
//! - `STOREFRONT_RESERVED_PARAMS` - Comma-separated query parameter names that
//!   are never product options; a trailing `*` matches a prefix
//!   (default: `ref,page,cursor,direction,q,sort,_data,variant,selling_plan,utm_*`)

use thiserror::Error;

use crate::cart::CartViewOptions;
use crate::routes::{HEALTH_ROUTE, PRODUCTS_ROUTE};
use crate::variant::{DEFAULT_RESERVED_PARAMS, ReservedParams};

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Store name shown in page titles
    pub store_name: String,
    /// Route cart forms post to
    pub cart_route: String,
    /// Where the empty cart sends shoppers
    pub collections_path: String,
    /// Query parameters that are never product options
    pub reserved_params: ReservedParams,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            store_name: "HustleStack".to_string(),
            cart_route: "/cart".to_string(),
            collections_path: "/collections".to_string(),
            reserved_params: ReservedParams::default(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(lookup);

        let store_name = env.or_default("STOREFRONT_STORE_NAME", "HustleStack");
        let cart_route = cart_route(env.path_or_default("STOREFRONT_CART_ROUTE", "/cart")?)?;
        let collections_path = env.path_or_default("STOREFRONT_COLLECTIONS_PATH", "/collections")?;
        let reserved_params = ReservedParams::new(
            env.or_default(
                "STOREFRONT_RESERVED_PARAMS",
                &DEFAULT_RESERVED_PARAMS.join(","),
            )
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty()),
        );

        Ok(Self {
            store_name,
            cart_route,
            collections_path,
            reserved_params,
        })
    }

    /// Paths the cart view links to, as seen from the cart route.
    #[must_use]
    pub fn cart_view_options(&self) -> CartViewOptions {
        CartViewOptions {
            cart_route: self.cart_route.clone(),
            collections_path: self.collections_path.clone(),
            current_pathname: self.cart_route.clone(),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Check that the cart route can be mounted next to the fixed routes.
fn cart_route(route: String) -> Result<String, ConfigError> {
    let invalid = |reason: &str| {
        Err(ConfigError::InvalidEnvVar(
            "STOREFRONT_CART_ROUTE".to_string(),
            format!("{reason} (got '{route}')"),
        ))
    };

    if route == HEALTH_ROUTE
        || route == PRODUCTS_ROUTE
        || route
            .strip_prefix(PRODUCTS_ROUTE)
            .is_some_and(|rest| rest.starts_with('/'))
    {
        return invalid("collides with a storefront route");
    }
    if route.contains(['{', '}', '?', '#'])
        || route
            .split('/')
            .any(|segment| segment.starts_with([':', '*']))
    {
        return invalid("must be a literal path");
    }
    Ok(route)
}

struct Lookup<F>(F);

impl<F> Lookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable; blank counts as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get an absolute path, without a trailing slash.
    fn path_or_default(&self, key: &str, default: &str) -> Result<String, ConfigError> {
        let value = self.or_default(key, default);
        let value = value.trim();
        if !value.starts_with('/') {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("must be an absolute path (got '{value}')"),
            ));
        }
        let trimmed = value.trim_end_matches('/');
        Ok(if trimmed.is_empty() { "/" } else { trimmed }.to_string())
    }
}
