//! Cart display state.
//!
//! [`derive_view`] is a pure projection from a [`CartResolution`] to what the
//! cart drawer/page shows and which intents its controls carry. It is called
//! afresh for every snapshot; nothing is remembered between calls.

use hustlestack_core::{CartLineId, MerchandiseId, SelectedOption};
use serde::Serialize;
use tracing::warn;

use super::intent::{CartIntent, IntentError};
use super::snapshot::{CartResolution, CartSnapshot, ValidatedLine};
use crate::variant::{self, SearchParams};

/// Shown in place of a missing subtotal.
const MISSING_AMOUNT: &str = "-";

/// Paths the cart view links to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartViewOptions {
    /// Route cart forms post to.
    pub cart_route: String,
    /// Empty-cart call-to-action target.
    pub collections_path: String,
    /// Pathname of the page showing the cart. Line links keep its locale
    /// prefix (`/en-ca/...`).
    pub current_pathname: String,
}

impl Default for CartViewOptions {
    fn default() -> Self {
        Self {
            cart_route: "/cart".to_string(),
            collections_path: "/collections".to_string(),
            current_pathname: "/cart".to_string(),
        }
    }
}

impl CartViewOptions {
    /// The same paths, shown on `pathname`.
    #[must_use]
    pub fn on_page(&self, pathname: impl Into<String>) -> Self {
        Self {
            current_pathname: pathname.into(),
            ..self.clone()
        }
    }
}

/// What the cart shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum CartViewState {
    /// Snapshot not yet received: loading placeholder, no controls.
    Pending,
    /// No cart or no items.
    Empty(EmptyCartView),
    /// At least one item.
    Populated(PopulatedCartView),
}

impl CartViewState {
    /// Short name of the state, for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Empty(_) => "empty",
            Self::Populated(_) => "populated",
        }
    }
}

/// Empty-cart call to action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmptyCartView {
    /// Where "Continue shopping" leads.
    pub continue_shopping_path: String,
}

/// A quantity button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityControl {
    /// Quantity the button would set.
    pub target: u32,
    /// Intent to submit; `None` renders the button disabled.
    pub intent: Option<CartIntent>,
}

/// One displayable cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    /// Line ID.
    pub id: CartLineId,
    /// Variant ID.
    pub merchandise_id: MerchandiseId,
    /// Product title (falls back to the variant title).
    pub title: String,
    /// Variant title, omitted for single-variant products.
    pub variant_title: Option<String>,
    /// Link to the product page with this variant selected.
    pub url: Option<String>,
    /// Option name/value pairs to list under the title.
    pub options: Vec<SelectedOption>,
    /// Image URL.
    pub image_url: Option<String>,
    /// Quantity, at least 1.
    pub quantity: u32,
    /// Unit price display.
    pub unit_price: String,
    /// Line total display.
    pub line_price: String,
    /// Compare-at unit price display, if any.
    pub compare_at_price: Option<String>,
    /// Decrease button; never targets 0 with an intent.
    pub decrement: QuantityControl,
    /// Increase button.
    pub increment: QuantityControl,
    /// Remove button.
    pub remove: CartIntent,
}

/// Discount section of the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountView {
    /// Applicable codes, in entry order.
    pub applied_codes: Vec<String>,
    /// Clears every code; present only when codes are applied.
    pub remove_all: Option<CartIntent>,
    /// Base intent of the apply form; the typed code is added on submit.
    pub apply: CartIntent,
}

/// Checkout hand-off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutAction {
    /// Platform checkout URL.
    pub url: String,
}

/// A cart with items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedCartView {
    /// Route every intent in this view is posted to.
    pub cart_route: String,
    /// Total item quantity as reported by the platform.
    pub total_quantity: u32,
    /// Displayable lines.
    pub lines: Vec<CartLineView>,
    /// Number of malformed lines left out.
    pub omitted_lines: usize,
    /// Subtotal display, `-` when unknown.
    pub subtotal: String,
    /// Toggles the discounted styling only; totals are not recomputed.
    pub has_applicable_discount: bool,
    /// Discount controls.
    pub discounts: DiscountView,
    /// Checkout button; absent when the cart has no checkout URL.
    pub checkout: Option<CheckoutAction>,
}

/// Derive the view with default paths.
#[must_use]
pub fn derive_view(resolution: &CartResolution) -> CartViewState {
    derive_view_with(resolution, &CartViewOptions::default())
}

/// Derive the view for one snapshot.
#[must_use]
pub fn derive_view_with(resolution: &CartResolution, options: &CartViewOptions) -> CartViewState {
    match resolution {
        CartResolution::Pending => CartViewState::Pending,
        CartResolution::Resolved(None) => empty(options),
        CartResolution::Resolved(Some(snapshot)) if snapshot.is_empty() => empty(options),
        CartResolution::Resolved(Some(snapshot)) => {
            CartViewState::Populated(populated(snapshot, options))
        }
    }
}

fn empty(options: &CartViewOptions) -> CartViewState {
    CartViewState::Empty(EmptyCartView {
        continue_shopping_path: options.collections_path.clone(),
    })
}

fn populated(snapshot: &CartSnapshot, options: &CartViewOptions) -> PopulatedCartView {
    let mut lines = Vec::with_capacity(snapshot.lines.nodes.len());
    let mut omitted_lines = snapshot.lines.malformed;

    for (index, line) in snapshot.lines.nodes.iter().enumerate() {
        let view = line
            .validate()
            .map_err(|err| err.to_string())
            .and_then(|valid| line_view(valid, options).map_err(|err| err.to_string()));
        match view {
            Ok(view) => lines.push(view),
            Err(reason) => {
                omitted_lines += 1;
                warn!(
                    line_index = index,
                    line_id = ?line.id,
                    %reason,
                    "Omitting malformed cart line"
                );
            }
        }
    }

    let applied_codes = snapshot.applicable_codes();
    let discounts = DiscountView {
        remove_all: (!applied_codes.is_empty())
            .then(|| CartIntent::update_discount_codes(Vec::<String>::new())),
        apply: CartIntent::update_discount_codes(&applied_codes),
        applied_codes,
    };

    PopulatedCartView {
        cart_route: options.cart_route.clone(),
        total_quantity: u32::try_from(snapshot.total_quantity).unwrap_or(u32::MAX),
        lines,
        omitted_lines,
        subtotal: snapshot
            .subtotal()
            .map_or_else(|| MISSING_AMOUNT.to_string(), |money| money.to_string()),
        has_applicable_discount: snapshot.has_applicable_discount(),
        discounts,
        checkout: snapshot.checkout_url().map(|url| CheckoutAction {
            url: url.to_owned(),
        }),
    }
}

fn line_view(line: ValidatedLine, options: &CartViewOptions) -> Result<CartLineView, IntentError> {
    let ValidatedLine {
        id,
        merchandise_id,
        quantity,
        cost_per_quantity,
        total_cost,
        compare_at_per_quantity,
        merchandise,
    } = line;

    let selected: Vec<SelectedOption> = merchandise
        .selected_options
        .iter()
        .filter(|option| !option.is_default_title())
        .cloned()
        .collect();

    // No link rather than a broken one.
    let url = merchandise
        .product
        .as_ref()
        .and_then(|product| product.handle.as_deref())
        .and_then(|handle| variant::product_path(handle, &options.current_pathname).ok())
        .and_then(|path| variant::resolve(&path, &selected, &SearchParams::new()).ok());

    let variant_title = merchandise
        .title
        .clone()
        .filter(|title| title != "Default Title");
    let title = merchandise
        .product
        .as_ref()
        .and_then(|product| product.title.clone())
        .or_else(|| variant_title.clone())
        .unwrap_or_default();

    let decrement_target = quantity.saturating_sub(1);
    let increment_target = quantity.saturating_add(1);

    Ok(CartLineView {
        decrement: QuantityControl {
            target: decrement_target,
            intent: (quantity > 1)
                .then(|| CartIntent::update_line(id.clone(), decrement_target).ok())
                .flatten(),
        },
        increment: QuantityControl {
            target: increment_target,
            intent: CartIntent::update_line(id.clone(), increment_target).ok(),
        },
        remove: CartIntent::remove_lines(vec![id.clone()])?,
        id,
        merchandise_id,
        title,
        variant_title,
        url,
        options: selected,
        image_url: merchandise.image.map(|image| image.url),
        quantity,
        unit_price: cost_per_quantity.to_string(),
        line_price: total_cost.display_without_trailing_zeros(),
        compare_at_price: compare_at_per_quantity.map(|money| money.to_string()),
    })
}
