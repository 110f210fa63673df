//! Product page variant selection.
//!
//! The product page always shows a concrete variant. Single-variant products
//! use their implicit default variant; otherwise the URL's query string must
//! name a variant, and a request that does not is redirected to the first
//! variant's canonical URL.

use hustlestack_core::SelectedOption;
use serde::Serialize;
use thiserror::Error;

use crate::cart::CartIntent;
use crate::shopify::{Image, Product, ProductOption, ProductVariant};
use crate::variant::{self, ReservedParams, SearchParams, VariantUrlError};

/// Shown instead of option links when the variants query fails.
pub const VARIANTS_ERROR_MESSAGE: &str = "There was a problem loading product variants";

/// Errors resolving a product page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    /// No product (or no variant) exists for the handle.
    #[error("product not found: {0}")]
    NotFound(String),

    /// The request could not be turned into a product URL.
    #[error(transparent)]
    Url(#[from] VariantUrlError),
}

/// A product page request, decoded from its URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRequest {
    /// Product handle.
    pub handle: String,
    /// Locale-aware product path (`/en-ca/products/shirt`).
    pub product_path: String,
    /// Options requested in the query string.
    pub selected_options: Vec<SelectedOption>,
    /// Every query parameter, options included.
    pub search_params: SearchParams,
}

impl ProductRequest {
    /// Decode a request for `handle` from the path+query `uri`.
    ///
    /// # Errors
    ///
    /// Returns [`VariantUrlError`] if the handle is empty.
    pub fn new(handle: &str, uri: &str, reserved: &ReservedParams) -> Result<Self, VariantUrlError> {
        let pathname = uri.split(['?', '#']).next().unwrap_or_default();
        Ok(Self {
            handle: handle.to_owned(),
            product_path: variant::product_path(handle, pathname)?,
            selected_options: variant::parse_with(uri, reserved),
            search_params: variant::search_params(uri),
        })
    }
}

/// Outcome of resolving the requested variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantSelection<'a> {
    /// Render the page for this variant.
    Selected(&'a ProductVariant),
    /// Redirect (HTTP 302) to the first variant's canonical URL.
    Redirect(String),
}

/// Decide which variant the page shows.
///
/// # Errors
///
/// Returns [`ProductError::NotFound`] when the product is absent or has no
/// variants.
pub fn select_variant<'a>(
    product: Option<&'a Product>,
    request: &ProductRequest,
) -> Result<VariantSelection<'a>, ProductError> {
    let not_found = || ProductError::NotFound(request.handle.clone());

    let product = product.ok_or_else(not_found)?;
    let first = product.first_variant().ok_or_else(not_found)?;

    if first.is_default() {
        return Ok(VariantSelection::Selected(first));
    }
    if let Some(selected) = &product.selected_variant {
        return Ok(VariantSelection::Selected(selected));
    }

    let url = variant::resolve(
        &request.product_path,
        &first.selected_options,
        &request.search_params,
    )?;
    Ok(VariantSelection::Redirect(url))
}

/// One selectable option value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionValueView {
    /// Option value.
    pub value: String,
    /// Link selecting this value; `None` if no valid URL can be built.
    pub to: Option<String>,
    /// The current selection already has this value.
    pub is_active: bool,
    /// A variant with this value (and the rest of the selection) is for sale.
    pub is_available: bool,
}

/// One product option with its value links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    /// Option name.
    pub name: String,
    /// Values in catalog order.
    pub values: Vec<OptionValueView>,
}

/// Build the option selector.
///
/// Options with a single value offer no choice and are left out. An empty
/// `variants` list (not loaded yet, or failed) marks every value
/// unavailable.
#[must_use]
pub fn option_views(
    product_path: &str,
    options: &[ProductOption],
    variants: &[ProductVariant],
    selected: &[SelectedOption],
    search_params: &SearchParams,
) -> Vec<OptionView> {
    options
        .iter()
        .filter(|option| option.values.len() > 1)
        .map(|option| OptionView {
            name: option.name.clone(),
            values: option
                .values
                .iter()
                .map(|value| option_value(product_path, option, value, variants, selected, search_params))
                .collect(),
        })
        .collect()
}

fn option_value(
    product_path: &str,
    option: &ProductOption,
    value: &str,
    variants: &[ProductVariant],
    selected: &[SelectedOption],
    search_params: &SearchParams,
) -> OptionValueView {
    let choice = SelectedOption::new(option.name.clone(), value);

    let mut candidate: Vec<SelectedOption> = selected
        .iter()
        .filter(|current| current.name != option.name)
        .cloned()
        .collect();
    candidate.push(choice.clone());

    let is_active = selected
        .iter()
        .rev()
        .find(|current| current.name == option.name)
        .is_some_and(|current| current.value == value);

    let is_available = variants
        .iter()
        .any(|variant| variant.available_for_sale && variant.matches(&candidate));

    OptionValueView {
        value: value.to_owned(),
        to: variant::resolve(product_path, &[choice], search_params).ok(),
        is_active,
        is_available,
    }
}

/// The add-to-cart button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartView {
    /// Whether the button can be pressed.
    pub enabled: bool,
    /// Button label.
    pub label: &'static str,
    /// Intent the button submits, present only when enabled.
    pub intent: Option<CartIntent>,
}

impl AddToCartView {
    /// Button state for the selected variant.
    #[must_use]
    pub fn for_variant(selected: Option<&ProductVariant>) -> Self {
        let intent = selected
            .filter(|variant| variant.available_for_sale)
            .and_then(|variant| CartIntent::add_line(variant.id.clone(), 1).ok());

        Self {
            enabled: intent.is_some(),
            label: if intent.is_some() { "Add to cart" } else { "Sold out" },
            intent,
        }
    }
}

/// Price block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceView {
    /// Current price.
    pub price: String,
    /// Struck-through original price.
    pub compare_at_price: Option<String>,
}

/// Everything the product page renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub handle: String,
    pub title: String,
    /// `<title>` of the page.
    pub page_title: String,
    pub vendor: String,
    pub description_html: String,
    pub selected_variant_id: String,
    pub price: PriceView,
    pub image: Option<Image>,
    pub options: Vec<OptionView>,
    /// Set when the variants could not be loaded.
    pub variants_error: Option<&'static str>,
    pub add_to_cart: AddToCartView,
}

impl ProductView {
    /// Assemble the page for a selected variant.
    ///
    /// `variants` is the result of the deferred variants query; `None` means
    /// it failed.
    #[must_use]
    pub fn new(
        product: &Product,
        selected: &ProductVariant,
        variants: Option<&[ProductVariant]>,
        request: &ProductRequest,
        store_name: &str,
    ) -> Self {
        Self {
            handle: product.handle.clone(),
            title: product.title.clone(),
            page_title: format!("{} | {store_name}", product.title),
            vendor: product.vendor.clone(),
            description_html: product.description_html.clone(),
            selected_variant_id: selected.id.to_string(),
            price: PriceView {
                price: selected.price.to_string(),
                compare_at_price: selected.compare_at_price.as_ref().map(ToString::to_string),
            },
            image: selected.image.clone(),
            options: option_views(
                &request.product_path,
                &product.options,
                variants.unwrap_or_default(),
                &request.selected_options,
                &request.search_params,
            ),
            variants_error: variants.is_none().then_some(VARIANTS_ERROR_MESSAGE),
            add_to_cart: AddToCartView::for_variant(Some(selected)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hustlestack_core::{MerchandiseId, Money, ProductId};

    use super::*;

    fn variant(n: u32, options: &[(&str, &str)], available: bool) -> ProductVariant {
        ProductVariant {
            id: MerchandiseId::new(format!("gid://shopify/ProductVariant/{n}")),
            title: options.iter().map(|(_, v)| *v).collect::<Vec<_>>().join(" / "),
            available_for_sale: available,
            price: Money::parse("25.00", "USD").unwrap(),
            compare_at_price: None,
            selected_options: options
                .iter()
                .map(|(n, v)| SelectedOption::new(*n, *v))
                .collect(),
            image: None,
            sku: None,
        }
    }

    fn shirt() -> Product {
        Product {
            id: ProductId::new("gid://shopify/Product/1"),
            handle: "shirt".to_string(),
            title: "Shirt".to_string(),
            vendor: "HustleStack".to_string(),
            description_html: "<p>Soft.</p>".to_string(),
            options: vec![
                ProductOption {
                    name: "Size".to_string(),
                    values: vec!["S".to_string(), "M".to_string()],
                },
                ProductOption {
                    name: "Color".to_string(),
                    values: vec!["Red".to_string(), "Blue".to_string()],
                },
                ProductOption {
                    name: "Material".to_string(),
                    values: vec!["Cotton".to_string()],
                },
            ],
            selected_variant: None,
            variants: vec![variant(
                1,
                &[("Size", "S"), ("Color", "Red"), ("Material", "Cotton")],
                true,
            )]
            .into(),
            seo: None,
        }
    }

    fn all_variants() -> Vec<ProductVariant> {
        vec![
            variant(1, &[("Size", "S"), ("Color", "Red"), ("Material", "Cotton")], true),
            variant(2, &[("Size", "M"), ("Color", "Red"), ("Material", "Cotton")], false),
            variant(3, &[("Size", "S"), ("Color", "Blue"), ("Material", "Cotton")], true),
            variant(4, &[("Size", "M"), ("Color", "Blue"), ("Material", "Cotton")], true),
        ]
    }

    fn request(uri: &str) -> ProductRequest {
        ProductRequest::new("shirt", uri, &ReservedParams::default()).unwrap()
    }

    #[test]
    fn test_request_decoding() {
        let req = request("/en-ca/products/shirt?Size=M&utm_source=mail&page=2");
        assert_eq!(req.product_path, "/en-ca/products/shirt");
        assert_eq!(req.selected_options, vec![SelectedOption::new("Size", "M")]);
        assert_eq!(req.search_params.len(), 3);
    }

    #[test]
    fn test_missing_product_is_not_found() {
        assert_eq!(
            select_variant(None, &request("/products/shirt")),
            Err(ProductError::NotFound("shirt".to_string()))
        );
    }

    #[test]
    fn test_product_without_variants_is_not_found() {
        let mut product = shirt();
        product.variants.nodes.clear();
        assert!(matches!(
            select_variant(Some(&product), &request("/products/shirt")),
            Err(ProductError::NotFound(_))
        ));
    }

    #[test]
    fn test_default_variant_is_selected() {
        let mut product = shirt();
        product.options = vec![ProductOption {
            name: "Title".to_string(),
            values: vec!["Default Title".to_string()],
        }];
        product.variants = vec![variant(9, &[("Title", "Default Title")], true)].into();

        let selection = select_variant(Some(&product), &request("/products/shirt")).unwrap();
        assert!(matches!(selection, VariantSelection::Selected(v) if v.id.as_str().ends_with("/9")));
    }

    #[test]
    fn test_requested_variant_is_selected() {
        let mut product = shirt();
        product.selected_variant = all_variants().into_iter().nth(3);

        let selection = select_variant(
            Some(&product),
            &request("/products/shirt?Color=Blue&Material=Cotton&Size=M"),
        )
        .unwrap();
        assert!(matches!(selection, VariantSelection::Selected(v) if v.title == "M / Blue / Cotton"));
    }

    #[test]
    fn test_redirect_to_first_variant() {
        let product = shirt();
        let selection =
            select_variant(Some(&product), &request("/en-ca/products/shirt?ref=home&Size=XL")).unwrap();

        assert_eq!(
            selection,
            VariantSelection::Redirect(
                "/en-ca/products/shirt?Color=Red&Material=Cotton&Size=S&ref=home".to_string()
            )
        );
    }

    #[test]
    fn test_redirect_encodes_handle() {
        let mut product = shirt();
        product.handle = "summer tee?".to_string();
        let req = ProductRequest::new(
            "summer tee?",
            "/products/summer%20tee%3F",
            &ReservedParams::default(),
        )
        .unwrap();

        assert_eq!(req.product_path, "/products/summer%20tee%3F");
        assert_eq!(
            select_variant(Some(&product), &req).unwrap(),
            VariantSelection::Redirect(
                "/products/summer%20tee%3F?Color=Red&Material=Cotton&Size=S".to_string()
            )
        );
    }

    #[test]
    fn test_option_views_links_and_flags() {
        let req = request("/products/shirt?Color=Red&Material=Cotton&Size=S");
        let views = option_views(
            &req.product_path,
            &shirt().options,
            &all_variants(),
            &req.selected_options,
            &req.search_params,
        );

        // Material has a single value and is not offered.
        let names: Vec<&str> = views.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Size", "Color"]);

        let size = views.first().unwrap();
        let small = size.values.first().unwrap();
        let medium = size.values.get(1).unwrap();

        assert!(small.is_active);
        assert!(small.is_available);
        assert!(!medium.is_active);
        // M / Red is sold out.
        assert!(!medium.is_available);
        assert_eq!(
            medium.to.as_deref(),
            Some("/products/shirt?Color=Red&Material=Cotton&Size=M")
        );

        let blue = views.get(1).unwrap().values.get(1).unwrap();
        assert!(blue.is_available);
        assert!(!blue.is_active);
    }

    #[test]
    fn test_option_views_preserve_passthrough_params() {
        let req = request("/products/shirt?Size=S&ref=email");
        let views = option_views(
            &req.product_path,
            &shirt().options,
            &all_variants(),
            &req.selected_options,
            &req.search_params,
        );
        let medium = views.first().unwrap().values.get(1).unwrap();
        assert_eq!(medium.to.as_deref(), Some("/products/shirt?Size=M&ref=email"));
    }

    #[test]
    fn test_option_views_without_variants_are_unavailable() {
        let req = request("/products/shirt?Color=Red&Material=Cotton&Size=S");
        let views = option_views(
            &req.product_path,
            &shirt().options,
            &[],
            &req.selected_options,
            &req.search_params,
        );
        assert!(
            views
                .iter()
                .flat_map(|view| &view.values)
                .all(|value| !value.is_available)
        );
    }

    #[test]
    fn test_malformed_option_has_no_link() {
        let options = vec![ProductOption {
            name: String::new(),
            values: vec!["A".to_string(), "B".to_string()],
        }];
        let views = option_views("/products/x", &options, &[], &[], &SearchParams::new());
        assert!(views.first().unwrap().values.iter().all(|v| v.to.is_none()));
    }

    #[test]
    fn test_add_to_cart_states() {
        let available = variant(1, &[("Size", "S")], true);
        let button = AddToCartView::for_variant(Some(&available));
        assert!(button.enabled);
        assert_eq!(button.label, "Add to cart");
        assert_eq!(
            button.intent,
            Some(CartIntent::add_line(available.id.clone(), 1).unwrap())
        );

        let sold_out = variant(2, &[("Size", "M")], false);
        let button = AddToCartView::for_variant(Some(&sold_out));
        assert!(!button.enabled);
        assert_eq!(button.label, "Sold out");
        assert!(button.intent.is_none());

        assert!(!AddToCartView::for_variant(None).enabled);
    }

    #[test]
    fn test_product_view() {
        let mut product = shirt();
        let mut selected = all_variants().into_iter().next().unwrap();
        selected.compare_at_price = Some(Money::parse("30.00", "USD").unwrap());
        product.selected_variant = Some(selected.clone());
        let req = request("/products/shirt?Color=Red&Material=Cotton&Size=S");

        let variants = all_variants();
        let view = ProductView::new(&product, &selected, Some(&variants), &req, "HustleStack");
        assert_eq!(view.page_title, "Shirt | HustleStack");
        assert_eq!(view.price.price, "$25.00");
        assert_eq!(view.price.compare_at_price.as_deref(), Some("$30.00"));
        assert!(view.variants_error.is_none());
        assert!(view.add_to_cart.enabled);

        let view = ProductView::new(&product, &selected, None, &req, "HustleStack");
        assert_eq!(view.variants_error, Some(VARIANTS_ERROR_MESSAGE));
        assert!(
            view.options
                .iter()
                .flat_map(|o| &o.values)
                .all(|v| !v.is_available)
        );
    }
}
