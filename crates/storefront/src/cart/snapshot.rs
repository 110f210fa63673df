//! Cart snapshots as returned by the platform.
//!
//! Deserializes the Storefront API cart fragment (`lines.nodes[]`, camelCase
//! keys). Line fields are all optional on the wire and `null` lists read as
//! empty: a malformed line must be dropped by the view, not fail the whole
//! snapshot. A node that does not even deserialize is counted in
//! [`CartLines::malformed`]; [`CartLine::validate`] turns the rest into a
//! [`ValidatedLine`] or a [`LineError`].

use hustlestack_core::{CartId, CartLineId, MerchandiseId, Money, MoneyError, SelectedOption};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::shopify::Image;

/// A cart snapshot that may not have arrived yet.
///
/// `Pending` (still loading) and `Resolved(None)` (no cart) are different
/// states and render differently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CartResolution {
    /// The snapshot has been requested but not received.
    #[default]
    Pending,
    /// The snapshot arrived; `None` means there is no cart.
    Resolved(Option<CartSnapshot>),
}

impl From<Option<CartSnapshot>> for CartResolution {
    fn from(snapshot: Option<CartSnapshot>) -> Self {
        Self::Resolved(snapshot)
    }
}

/// `MoneyV2` as it appears on the wire, validated lazily.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyFields {
    /// Decimal amount string.
    #[serde(default)]
    pub amount: Option<String>,
    /// ISO 4217 currency code.
    #[serde(default)]
    pub currency_code: Option<String>,
}

impl MoneyFields {
    /// Validate into a [`Money`].
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if either field is missing or malformed.
    pub fn to_money(&self) -> Result<Money, MoneyError> {
        let amount = self.amount.as_deref().ok_or(MoneyError::EmptyAmount)?;
        let currency = self.currency_code.as_deref().unwrap_or_default();
        Money::parse(amount, currency)
    }
}

impl From<&Money> for MoneyFields {
    fn from(money: &Money) -> Self {
        Self {
            amount: Some(money.amount().to_owned()),
            currency_code: Some(money.currency_code().to_string()),
        }
    }
}

/// Read `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let value: Option<T> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

/// Cart-level cost summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartCost {
    /// Subtotal before tax/shipping.
    #[serde(default)]
    pub subtotal_amount: Option<MoneyFields>,
    /// Total amount.
    #[serde(default)]
    pub total_amount: Option<MoneyFields>,
}

/// Discount code applied to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartDiscountCode {
    /// The discount code.
    pub code: String,
    /// Whether the code applies to the current cart contents.
    #[serde(default)]
    pub applicable: bool,
}

/// Parent product of a line's merchandise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchandiseProduct {
    /// Product handle.
    #[serde(default)]
    pub handle: Option<String>,
    /// Product title.
    #[serde(default)]
    pub title: Option<String>,
}

/// The variant a line refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartMerchandise {
    /// Variant ID.
    #[serde(default)]
    pub id: Option<MerchandiseId>,
    /// Variant title.
    #[serde(default)]
    pub title: Option<String>,
    /// Parent product.
    #[serde(default)]
    pub product: Option<MerchandiseProduct>,
    /// Selected options of the variant.
    #[serde(default, deserialize_with = "null_as_default")]
    pub selected_options: Vec<SelectedOption>,
    /// Variant image.
    #[serde(default)]
    pub image: Option<Image>,
}

/// Cost of one line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineCost {
    /// Price per unit.
    #[serde(default)]
    pub amount_per_quantity: Option<MoneyFields>,
    /// Compare-at price per unit.
    #[serde(default)]
    pub compare_at_amount_per_quantity: Option<MoneyFields>,
    /// Line total (after line-level discounts).
    #[serde(default)]
    pub total_amount: Option<MoneyFields>,
}

/// A cart line exactly as received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Opaque line ID, stable for the line's lifetime.
    #[serde(default)]
    pub id: Option<CartLineId>,
    /// Quantity (at least 1 for a well-formed line).
    #[serde(default)]
    pub quantity: Option<i64>,
    /// Line cost.
    #[serde(default)]
    pub cost: Option<CartLineCost>,
    /// The variant this line holds.
    #[serde(default)]
    pub merchandise: Option<CartMerchandise>,
}

/// Connection wrapper around cart lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawCartLines")]
pub struct CartLines {
    /// Lines in cart order.
    pub nodes: Vec<CartLine>,
    /// Nodes dropped because they did not have the shape of a line.
    #[serde(skip)]
    pub malformed: usize,
}

impl CartLines {
    /// Wrap lines that are already in shape.
    #[must_use]
    pub const fn new(nodes: Vec<CartLine>) -> Self {
        Self {
            nodes,
            malformed: 0,
        }
    }
}

/// Lines as they arrive, each node decoded on its own.
#[derive(Deserialize)]
struct RawCartLines {
    #[serde(default, deserialize_with = "null_as_default")]
    nodes: Vec<serde_json::Value>,
}

impl From<RawCartLines> for CartLines {
    fn from(raw: RawCartLines) -> Self {
        let mut lines = Self::default();
        for (index, node) in raw.nodes.into_iter().enumerate() {
            match CartLine::deserialize(node) {
                Ok(line) => lines.nodes.push(line),
                Err(err) => {
                    lines.malformed += 1;
                    warn!(line_index = index, reason = %err, "Dropping undecodable cart line");
                }
            }
        }
        lines
    }
}

/// A read-only, point-in-time copy of the platform's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    /// Cart ID.
    #[serde(default)]
    pub id: Option<CartId>,
    /// Checkout URL; empty or absent while no checkout session exists.
    #[serde(default)]
    pub checkout_url: Option<String>,
    /// Total item quantity across lines.
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_quantity: i64,
    /// Cart cost summary.
    #[serde(default, deserialize_with = "null_as_default")]
    pub cost: CartCost,
    /// Discount codes entered on the cart.
    #[serde(default, deserialize_with = "null_as_default")]
    pub discount_codes: Vec<CartDiscountCode>,
    /// Cart lines.
    #[serde(default, deserialize_with = "null_as_default")]
    pub lines: CartLines,
}

impl CartSnapshot {
    /// Whether the cart holds no items.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total_quantity <= 0
    }

    /// The checkout URL, if a checkout session exists.
    #[must_use]
    pub fn checkout_url(&self) -> Option<&str> {
        self.checkout_url.as_deref().filter(|url| !url.is_empty())
    }

    /// Whether any entered discount code applies.
    #[must_use]
    pub fn has_applicable_discount(&self) -> bool {
        self.discount_codes.iter().any(|code| code.applicable)
    }

    /// Codes that currently apply, in entry order.
    #[must_use]
    pub fn applicable_codes(&self) -> Vec<String> {
        self.discount_codes
            .iter()
            .filter(|code| code.applicable)
            .map(|code| code.code.clone())
            .collect()
    }

    /// The subtotal, if present and well-formed.
    #[must_use]
    pub fn subtotal(&self) -> Option<Money> {
        self.cost
            .subtotal_amount
            .as_ref()
            .and_then(|fields| fields.to_money().ok())
    }
}

/// Why a cart line cannot be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    /// The line has no ID.
    #[error("line is missing its id")]
    MissingId,
    /// The line has no merchandise ID.
    #[error("line is missing its merchandise id")]
    MissingMerchandise,
    /// Quantity is absent or below 1.
    #[error("line quantity {0:?} is not a positive integer")]
    InvalidQuantity(Option<i64>),
    /// A required cost amount is absent.
    #[error("line is missing {0}")]
    MissingCost(&'static str),
    /// A cost amount is present but malformed.
    #[error("line {field} is invalid: {source}")]
    InvalidMoney {
        /// Which cost field failed.
        field: &'static str,
        /// The validation failure.
        source: MoneyError,
    },
}

/// A cart line whose required fields are present and valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLine {
    /// Line ID.
    pub id: CartLineId,
    /// Variant ID.
    pub merchandise_id: MerchandiseId,
    /// Quantity, at least 1.
    pub quantity: u32,
    /// Price per unit.
    pub cost_per_quantity: Money,
    /// Line total.
    pub total_cost: Money,
    /// Compare-at price per unit, if well-formed.
    pub compare_at_per_quantity: Option<Money>,
    /// Merchandise display details.
    pub merchandise: CartMerchandise,
}

fn required_money(fields: Option<&MoneyFields>, field: &'static str) -> Result<Money, LineError> {
    fields
        .ok_or(LineError::MissingCost(field))?
        .to_money()
        .map_err(|source| LineError::InvalidMoney { field, source })
}

impl CartLine {
    /// Build a well-formed line (used by collaborators and tests).
    #[must_use]
    pub fn new(
        id: CartLineId,
        merchandise_id: MerchandiseId,
        quantity: u32,
        cost_per_quantity: &Money,
        total_cost: &Money,
    ) -> Self {
        Self {
            id: Some(id),
            quantity: Some(i64::from(quantity)),
            cost: Some(CartLineCost {
                amount_per_quantity: Some(cost_per_quantity.into()),
                compare_at_amount_per_quantity: None,
                total_amount: Some(total_cost.into()),
            }),
            merchandise: Some(CartMerchandise {
                id: Some(merchandise_id),
                ..CartMerchandise::default()
            }),
        }
    }

    /// Check the fields the view depends on.
    ///
    /// # Errors
    ///
    /// Returns the first [`LineError`] found.
    pub fn validate(&self) -> Result<ValidatedLine, LineError> {
        let id = self
            .id
            .clone()
            .filter(|id| !id.as_str().is_empty())
            .ok_or(LineError::MissingId)?;

        let merchandise = self.merchandise.clone().unwrap_or_default();
        let merchandise_id = merchandise
            .id
            .clone()
            .filter(|id| !id.as_str().is_empty())
            .ok_or(LineError::MissingMerchandise)?;

        let quantity = self
            .quantity
            .filter(|q| *q >= 1)
            .and_then(|q| u32::try_from(q).ok())
            .ok_or(LineError::InvalidQuantity(self.quantity))?;

        let cost = self.cost.as_ref();
        let cost_per_quantity = required_money(
            cost.and_then(|c| c.amount_per_quantity.as_ref()),
            "amountPerQuantity",
        )?;
        let total_cost = required_money(cost.and_then(|c| c.total_amount.as_ref()), "totalAmount")?;
        let compare_at_per_quantity = cost
            .and_then(|c| c.compare_at_amount_per_quantity.as_ref())
            .and_then(|fields| fields.to_money().ok());

        Ok(ValidatedLine {
            id,
            merchandise_id,
            quantity,
            cost_per_quantity,
            total_cost,
            compare_at_per_quantity,
            merchandise,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn usd(amount: &str) -> Money {
        Money::parse(amount, "USD").unwrap()
    }

    fn line(quantity: u32) -> CartLine {
        CartLine::new(
            CartLineId::new("gid://shopify/CartLine/1"),
            MerchandiseId::new("gid://shopify/ProductVariant/1"),
            quantity,
            &usd("5.00"),
            &usd("10.00"),
        )
    }

    #[test]
    fn test_validate_well_formed_line() {
        let validated = line(2).validate().unwrap();
        assert_eq!(validated.quantity, 2);
        assert_eq!(validated.cost_per_quantity.amount(), "5.00");
        assert_eq!(validated.total_cost.amount(), "10.00");
    }

    #[test]
    fn test_validate_missing_cost() {
        let mut l = line(1);
        l.cost.as_mut().unwrap().total_amount = None;
        assert_eq!(l.validate(), Err(LineError::MissingCost("totalAmount")));

        l.cost = None;
        assert_eq!(l.validate(), Err(LineError::MissingCost("amountPerQuantity")));
    }

    #[test]
    fn test_validate_invalid_money() {
        let mut l = line(1);
        l.cost.as_mut().unwrap().amount_per_quantity = Some(MoneyFields {
            amount: Some("free".to_string()),
            currency_code: Some("USD".to_string()),
        });
        assert!(matches!(
            l.validate(),
            Err(LineError::InvalidMoney {
                field: "amountPerQuantity",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_quantity() {
        let mut l = line(1);
        l.quantity = Some(0);
        assert_eq!(l.validate(), Err(LineError::InvalidQuantity(Some(0))));
        l.quantity = None;
        assert_eq!(l.validate(), Err(LineError::InvalidQuantity(None)));
    }

    #[test]
    fn test_validate_missing_ids() {
        let mut l = line(1);
        l.id = None;
        assert_eq!(l.validate(), Err(LineError::MissingId));

        let mut l = line(1);
        l.id = Some(CartLineId::new(""));
        assert_eq!(l.validate(), Err(LineError::MissingId));

        let mut l = line(1);
        l.merchandise = None;
        assert_eq!(l.validate(), Err(LineError::MissingMerchandise));
    }

    #[test]
    fn test_deserialize_cart_fragment() {
        let json = serde_json::json!({
            "id": "gid://shopify/Cart/abc",
            "checkoutUrl": "https://shop.example.com/cart/c/abc",
            "totalQuantity": 3,
            "cost": {
                "subtotalAmount": {"amount": "30.00", "currencyCode": "USD"},
                "totalAmount": {"amount": "33.00", "currencyCode": "USD"}
            },
            "discountCodes": [{"code": "SAVE10", "applicable": false}],
            "lines": {"nodes": [{
                "id": "gid://shopify/CartLine/1",
                "quantity": 3,
                "cost": {
                    "amountPerQuantity": {"amount": "10.00", "currencyCode": "USD"},
                    "totalAmount": {"amount": "30.00", "currencyCode": "USD"},
                    "compareAtAmountPerQuantity": null
                },
                "merchandise": {
                    "id": "gid://shopify/ProductVariant/9",
                    "title": "M / Red",
                    "product": {"handle": "shirt", "title": "Shirt"},
                    "selectedOptions": [
                        {"name": "Size", "value": "M"},
                        {"name": "Color", "value": "Red"}
                    ],
                    "image": null
                }
            }]}
        });

        let snapshot: CartSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(snapshot.total_quantity, 3);
        assert_eq!(snapshot.subtotal().unwrap().amount(), "30.00");
        assert!(!snapshot.has_applicable_discount());
        assert_eq!(snapshot.lines.nodes.len(), 1);
        assert!(snapshot.lines.nodes.first().unwrap().validate().is_ok());
    }

    #[test]
    fn test_deserialize_tolerates_malformed_line() {
        let json = serde_json::json!({
            "totalQuantity": 1,
            "lines": {"nodes": [{"id": "gid://shopify/CartLine/1", "quantity": 1}]}
        });

        let snapshot: CartSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(snapshot.lines.nodes.len(), 1);
        assert!(snapshot.lines.nodes.first().unwrap().validate().is_err());
        assert!(snapshot.checkout_url().is_none());
    }

    #[test]
    fn test_deserialize_drops_wrongly_typed_line() {
        let good = serde_json::json!({
            "id": "gid://shopify/CartLine/1",
            "quantity": 1,
            "cost": {
                "amountPerQuantity": {"amount": "10.00", "currencyCode": "USD"},
                "totalAmount": {"amount": "10.00", "currencyCode": "USD"}
            },
            "merchandise": {"id": "gid://shopify/ProductVariant/1", "selectedOptions": null}
        });
        let json = serde_json::json!({
            "totalQuantity": 3,
            "discountCodes": null,
            "lines": {"nodes": [
                good,
                {"id": "gid://shopify/CartLine/2", "quantity": "2"},
                null
            ]}
        });

        let snapshot: CartSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(snapshot.lines.nodes.len(), 1);
        assert_eq!(snapshot.lines.malformed, 2);
        assert!(snapshot.discount_codes.is_empty());

        let first = snapshot.lines.nodes.first().unwrap().validate().unwrap();
        assert!(first.merchandise.selected_options.is_empty());
    }

    #[test]
    fn test_deserialize_null_lines() {
        let json = serde_json::json!({"totalQuantity": 0, "lines": null, "cost": null});
        let snapshot: CartSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(snapshot.lines, CartLines::default());
        assert!(snapshot.subtotal().is_none());
    }

    #[test]
    fn test_checkout_url_empty_is_absent() {
        let snapshot = CartSnapshot {
            checkout_url: Some(String::new()),
            ..CartSnapshot::default()
        };
        assert!(snapshot.checkout_url().is_none());
    }
}
