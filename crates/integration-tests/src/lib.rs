//! Integration tests for the HustleStack storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p hustlestack-integration-tests
//! ```
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`
//! against [`MemoryBackend`], an in-memory stand-in for Shopify.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode},
};
use hustlestack_core::{CartId, CartLineId, MerchandiseId, Money, ProductId, SelectedOption};
use hustlestack_storefront::{
    AppState,
    cart::{CartIntent, CartLine, CartSnapshot},
    cart::snapshot::{CartCost, CartDiscountCode, CartMerchandise, MerchandiseProduct, MoneyFields},
    config::StorefrontConfig,
    shopify::{
        CartMutationExecutor, CartMutationOutcome, CartSource, CartUserError, Product,
        ProductCatalog, ProductOption, ProductVariant, ProductVariantConnection, ShopifyError,
    },
};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, Semaphore};
use tower::ServiceExt;
use url::form_urlencoded;

/// Discount code the backend accepts.
pub const VALID_DISCOUNT_CODE: &str = "SAVE10";

/// In-memory Shopify cart and catalog.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    cart: Mutex<Option<CartSnapshot>>,
    products: HashMap<String, Vec<ProductVariant>>,
    catalog: HashMap<String, Product>,
    executed: Mutex<Vec<CartIntent>>,
    next_line: AtomicU32,
    fail_cart: AtomicBool,
    fail_variants: AtomicBool,
    cart_reads: Option<Arc<Semaphore>>,
}

impl MemoryBackend {
    /// A backend with an empty catalog and no cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product together with all of its variants.
    #[must_use]
    pub fn with_product(mut self, product: Product, variants: Vec<ProductVariant>) -> Self {
        self.products.insert(product.handle.clone(), variants);
        self.catalog.insert(product.handle.clone(), product);
        self
    }

    /// Start with an existing cart.
    #[must_use]
    pub fn with_cart(self, cart: CartSnapshot) -> Self {
        Self {
            cart: Mutex::new(Some(cart)),
            ..self
        }
    }

    /// Hold every cart read until `gate` hands it a permit.
    #[must_use]
    pub fn with_cart_read_gate(self, gate: Arc<Semaphore>) -> Self {
        Self {
            cart_reads: Some(gate),
            ..self
        }
    }

    /// Make cart reads fail.
    pub fn fail_cart(&self, fail: bool) {
        self.fail_cart.store(fail, Ordering::SeqCst);
    }

    /// Make the deferred variants query fail.
    pub fn fail_variants(&self, fail: bool) {
        self.fail_variants.store(fail, Ordering::SeqCst);
    }

    /// Intents executed so far.
    pub async fn executed(&self) -> Vec<CartIntent> {
        self.executed.lock().await.clone()
    }

    fn variant(&self, id: &MerchandiseId) -> Option<&ProductVariant> {
        self.products
            .values()
            .flatten()
            .find(|variant| &variant.id == id)
    }

    fn line_for(&self, id: CartLineId, variant: &ProductVariant, quantity: u32) -> CartLine {
        let mut line = CartLine::new(
            id,
            variant.id.clone(),
            quantity,
            &variant.price,
            &line_total(&variant.price, quantity),
        );
        let product = self
            .catalog
            .values()
            .find(|product| self.products.get(&product.handle).is_some_and(|v| v.contains(variant)));
        line.merchandise = Some(CartMerchandise {
            id: Some(variant.id.clone()),
            title: Some(variant.title.clone()),
            product: product.map(|product| MerchandiseProduct {
                handle: Some(product.handle.clone()),
                title: Some(product.title.clone()),
            }),
            selected_options: variant.selected_options.clone(),
            image: variant.image.clone(),
        });
        line
    }
}

fn line_total(unit: &Money, quantity: u32) -> Money {
    let total = unit.decimal() * Decimal::from(quantity);
    Money::parse(&format!("{total:.2}"), unit.currency_code().as_str()).unwrap_or_else(|_| unit.clone())
}

fn recompute(cart: &mut CartSnapshot) {
    cart.total_quantity = cart
        .lines
        .nodes
        .iter()
        .filter_map(|line| line.quantity)
        .sum();

    let subtotal = cart
        .lines
        .nodes
        .iter()
        .filter_map(|line| line.validate().ok())
        .map(|line| line.total_cost)
        .reduce(|acc, money| {
            let sum = acc.decimal() + money.decimal();
            Money::parse(&format!("{sum:.2}"), acc.currency_code().as_str()).unwrap_or(acc)
        });
    cart.cost = CartCost {
        subtotal_amount: subtotal.as_ref().map(MoneyFields::from),
        total_amount: subtotal.as_ref().map(MoneyFields::from),
    };
}

impl CartSource for MemoryBackend {
    async fn fetch_cart(&self) -> Result<Option<CartSnapshot>, ShopifyError> {
        if let Some(gate) = &self.cart_reads {
            gate.acquire()
                .await
                .map_err(|e| ShopifyError::Transport(e.to_string()))?
                .forget();
        }
        if self.fail_cart.load(Ordering::SeqCst) {
            return Err(ShopifyError::Transport("connection refused".to_string()));
        }
        Ok(self.cart.lock().await.clone())
    }
}

impl CartMutationExecutor for MemoryBackend {
    async fn execute(&self, intent: CartIntent) -> Result<CartMutationOutcome, ShopifyError> {
        self.executed.lock().await.push(intent.clone());

        let mut guard = self.cart.lock().await;
        let cart = guard.get_or_insert_with(|| CartSnapshot {
            id: Some(CartId::new("gid://shopify/Cart/memory")),
            checkout_url: Some("https://shop.example.com/cart/c/memory".to_string()),
            ..CartSnapshot::default()
        });
        let mut user_errors = Vec::new();

        match intent {
            CartIntent::AddLines { lines } => {
                for input in lines {
                    let Some(variant) = self.variant(&input.merchandise_id) else {
                        user_errors.push(CartUserError {
                            code: Some("INVALID".to_string()),
                            field: Some(vec!["lines".to_string()]),
                            message: "The merchandise with id does not exist.".to_string(),
                        });
                        continue;
                    };
                    if let Some(line) = cart.lines.nodes.iter_mut().find(|line| {
                        line.merchandise.as_ref().and_then(|m| m.id.as_ref())
                            == Some(&input.merchandise_id)
                    }) {
                        let quantity = u32::try_from(line.quantity.unwrap_or_default())
                            .unwrap_or_default()
                            + input.quantity;
                        let id = line.id.clone().unwrap_or_else(|| CartLineId::new(""));
                        *line = self.line_for(id, variant, quantity);
                        continue;
                    }
                    let next = self.next_line.fetch_add(1, Ordering::SeqCst) + 1;
                    let id = CartLineId::new(format!("gid://shopify/CartLine/{next}"));
                    cart.lines.nodes.push(self.line_for(id, variant, input.quantity));
                }
            }
            CartIntent::UpdateLines { lines } => {
                for update in lines {
                    let variant = cart
                        .lines
                        .nodes
                        .iter()
                        .find(|line| line.id.as_ref() == Some(&update.id))
                        .and_then(|line| line.merchandise.as_ref()?.id.clone())
                        .and_then(|id| self.variant(&id).cloned());
                    if let (Some(line), Some(variant)) = (
                        cart.lines
                            .nodes
                            .iter_mut()
                            .find(|line| line.id.as_ref() == Some(&update.id)),
                        variant,
                    ) {
                        *line = self.line_for(update.id.clone(), &variant, update.quantity);
                    }
                }
            }
            CartIntent::RemoveLines { line_ids } => {
                cart.lines
                    .nodes
                    .retain(|line| line.id.as_ref().is_none_or(|id| !line_ids.contains(id)));
            }
            CartIntent::UpdateDiscountCodes { discount_codes } => {
                cart.discount_codes = discount_codes
                    .into_iter()
                    .map(|code| CartDiscountCode {
                        applicable: code == VALID_DISCOUNT_CODE,
                        code,
                    })
                    .collect();
            }
        }

        recompute(cart);
        Ok(CartMutationOutcome {
            cart: Some(cart.clone()),
            user_errors,
        })
    }
}

impl ProductCatalog for MemoryBackend {
    async fn product(
        &self,
        handle: &str,
        selected_options: &[SelectedOption],
    ) -> Result<Option<Product>, ShopifyError> {
        let Some(product) = self.catalog.get(handle) else {
            return Ok(None);
        };
        let variants = self.products.get(handle).map(Vec::as_slice).unwrap_or_default();

        let mut product = product.clone();
        product.variants = ProductVariantConnection::from(
            variants.first().cloned().into_iter().collect::<Vec<_>>(),
        );
        product.selected_variant = if selected_options.is_empty() {
            None
        } else {
            variants
                .iter()
                .find(|variant| variant.matches(selected_options))
                .cloned()
        };
        Ok(Some(product))
    }

    async fn variants(&self, handle: &str) -> Result<Vec<ProductVariant>, ShopifyError> {
        if self.fail_variants.load(Ordering::SeqCst) {
            return Err(ShopifyError::GraphQL(vec!["Throttled".to_string()]));
        }
        Ok(self.products.get(handle).cloned().unwrap_or_default())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// A USD amount.
///
/// # Panics
///
/// Panics if `amount` is not a decimal.
#[must_use]
pub fn usd(amount: &str) -> Money {
    Money::parse(amount, "USD").unwrap_or_else(|e| panic!("bad fixture amount {amount}: {e}"))
}

/// A variant with the given options.
#[must_use]
pub fn variant(n: u32, options: &[(&str, &str)], available: bool, price: &str) -> ProductVariant {
    ProductVariant {
        id: MerchandiseId::new(format!("gid://shopify/ProductVariant/{n}")),
        title: options
            .iter()
            .map(|(_, value)| *value)
            .collect::<Vec<_>>()
            .join(" / "),
        available_for_sale: available,
        price: usd(price),
        compare_at_price: None,
        selected_options: options
            .iter()
            .map(|(name, value)| SelectedOption::new(*name, *value))
            .collect(),
        image: None,
        sku: None,
    }
}

/// A product shell; `variants` is filled in by the backend.
#[must_use]
pub fn product(handle: &str, title: &str, options: &[(&str, &[&str])]) -> Product {
    Product {
        id: ProductId::new(format!("gid://shopify/Product/{handle}")),
        handle: handle.to_string(),
        title: title.to_string(),
        vendor: "HustleStack".to_string(),
        description_html: String::new(),
        options: options
            .iter()
            .map(|(name, values)| ProductOption {
                name: (*name).to_string(),
                values: values.iter().map(|v| (*v).to_string()).collect(),
            })
            .collect(),
        selected_variant: None,
        variants: ProductVariantConnection::default(),
        seo: None,
    }
}

/// A shirt in two sizes and two colors; M / Red is sold out.
#[must_use]
pub fn shirt_backend() -> MemoryBackend {
    MemoryBackend::new()
        .with_product(
            product("shirt", "Shirt", &[("Size", &["S", "M"]), ("Color", &["Red", "Blue"])]),
            vec![
                variant(1, &[("Size", "S"), ("Color", "Red")], true, "20.00"),
                variant(2, &[("Size", "M"), ("Color", "Red")], false, "20.00"),
                variant(3, &[("Size", "S"), ("Color", "Blue")], true, "22.50"),
                variant(4, &[("Size", "M"), ("Color", "Blue")], true, "22.50"),
            ],
        )
        .with_product(
            product("mug", "Mug", &[("Title", &["Default Title"])]),
            vec![variant(10, &[("Title", "Default Title")], true, "12.00")],
        )
}

// ============================================================================
// Router Helpers
// ============================================================================

/// Build the storefront router over `backend` with default configuration.
pub fn app(backend: MemoryBackend) -> Router {
    hustlestack_storefront::app(AppState::new(StorefrontConfig::default(), backend))
}

/// Response parts the tests look at.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Parse the body as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON.
    #[must_use]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body)
            .unwrap_or_else(|e| panic!("response is not JSON ({e}): {}", self.body))
    }

    /// A header value as text.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// Send one request through the router.
///
/// # Panics
///
/// Panics if the router fails or the body cannot be read.
pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .unwrap_or_else(|e| match e {});
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_else(|e| panic!("failed to read body: {e}"));
    TestResponse {
        status,
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

/// `GET uri`.
///
/// # Panics
///
/// Panics if `uri` is invalid.
pub async fn get(app: &Router, uri: &str) -> TestResponse {
    let request = Request::get(uri)
        .body(Body::empty())
        .unwrap_or_else(|e| panic!("bad request {uri}: {e}"));
    send(app, request).await
}

/// `POST uri` with form-encoded `fields`.
///
/// # Panics
///
/// Panics if `uri` is invalid.
pub async fn post_form(app: &Router, uri: &str, fields: &[(String, String)]) -> TestResponse {
    let body = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish();
    let request = Request::post(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap_or_else(|e| panic!("bad request {uri}: {e}"));
    send(app, request).await
}
