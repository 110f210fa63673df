//! Domain types for the Shopify Storefront API catalog.
//!
//! These mirror the product fragments the storefront queries, in the JSON
//! shape the API returns them (camelCase keys).

use hustlestack_core::{MerchandiseId, Money, ProductId, SelectedOption};
use serde::{Deserialize, Serialize};

// =============================================================================
// Image Types
// =============================================================================

/// Product or variant image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    #[serde(default)]
    pub alt_text: Option<String>,
    /// Image width in pixels.
    #[serde(default)]
    pub width: Option<i64>,
    /// Image height in pixels.
    #[serde(default)]
    pub height: Option<i64>,
}

// =============================================================================
// SEO Types
// =============================================================================

/// SEO metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seo {
    /// Page title for search engines.
    pub title: Option<String>,
    /// Meta description.
    pub description: Option<String>,
}

// =============================================================================
// Product Types
// =============================================================================

/// Product option definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    /// Option name (e.g., "Size").
    pub name: String,
    /// Available values (e.g., `["Small", "Medium", "Large"]`).
    pub values: Vec<String>,
}

/// A product variant (specific combination of options).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    /// Variant ID (the cart's merchandise ID).
    pub id: MerchandiseId,
    /// Variant title (combination of option values).
    pub title: String,
    /// Whether this variant is available for sale.
    pub available_for_sale: bool,
    /// Current price.
    pub price: Money,
    /// Compare-at price (original price if on sale).
    #[serde(default)]
    pub compare_at_price: Option<Money>,
    /// Selected options for this variant.
    pub selected_options: Vec<SelectedOption>,
    /// Variant image.
    #[serde(default)]
    pub image: Option<Image>,
    /// SKU code.
    #[serde(default)]
    pub sku: Option<String>,
}

impl ProductVariant {
    /// Whether this is the implicit variant of a product without options.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.selected_options
            .iter()
            .any(SelectedOption::is_default_title)
    }

    /// Whether every option of this variant agrees with `selection`.
    #[must_use]
    pub fn matches(&self, selection: &[SelectedOption]) -> bool {
        self.selected_options.iter().all(|own| {
            selection
                .iter()
                .rev()
                .find(|candidate| candidate.name == own.name)
                .is_some_and(|candidate| candidate.value == own.value)
        })
    }
}

/// Connection wrapper around product variants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariantConnection {
    /// Variants in this page.
    #[serde(default)]
    pub nodes: Vec<ProductVariant>,
}

impl From<Vec<ProductVariant>> for ProductVariantConnection {
    fn from(nodes: Vec<ProductVariant>) -> Self {
        Self { nodes }
    }
}

/// A product as returned by the product-by-handle query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// URL handle.
    pub handle: String,
    /// Product title.
    pub title: String,
    /// Vendor name.
    #[serde(default)]
    pub vendor: String,
    /// HTML description.
    #[serde(default)]
    pub description_html: String,
    /// Product options.
    pub options: Vec<ProductOption>,
    /// Variant matching the requested selected options, if any.
    #[serde(default)]
    pub selected_variant: Option<ProductVariant>,
    /// First page of variants (the query asks for one).
    #[serde(default)]
    pub variants: ProductVariantConnection,
    /// SEO metadata.
    #[serde(default)]
    pub seo: Option<Seo>,
}

impl Product {
    /// The first variant, used as the redirect target.
    #[must_use]
    pub fn first_variant(&self) -> Option<&ProductVariant> {
        self.variants.nodes.first()
    }
}

// =============================================================================
// Cart Mutation Types
// =============================================================================

/// User error from cart mutations (e.g. an unknown discount code).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartUserError {
    /// Error code.
    #[serde(default)]
    pub code: Option<String>,
    /// Field path that caused the error.
    #[serde(default)]
    pub field: Option<Vec<String>>,
    /// Human-readable error message.
    pub message: String,
}
