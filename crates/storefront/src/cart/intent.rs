//! Cart mutation intents.
//!
//! An intent describes a cart change without performing it. Views embed
//! intents in their controls; the cart route decodes a submitted intent and
//! hands it to a [`CartMutationExecutor`](crate::shopify::CartMutationExecutor).
//!
//! # Form encoding
//!
//! A cart form posts a single field, `cartFormInput`, holding JSON:
//!
//! ```text
//! {"action": "LinesUpdate", "inputs": {"lines": [{"id": "...", "quantity": 2}]}}
//! ```
//!
//! The discount "apply" form additionally posts the typed code as
//! `discountCode`; it is prepended to the codes already on the cart.

use hustlestack_core::{CartLineId, MerchandiseId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Form field carrying the JSON-encoded intent.
pub const CART_FORM_INPUT: &str = "cartFormInput";

/// Form field carrying a newly typed discount code.
pub const DISCOUNT_CODE_FIELD: &str = "discountCode";

/// Errors building or decoding an intent.
#[derive(Debug, Error)]
pub enum IntentError {
    /// A quantity below 1 was requested.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// The intent carries no lines or line IDs.
    #[error("intent must reference at least one line")]
    NoLines,

    /// A merchandise or line ID is empty.
    #[error("intent references an empty id")]
    EmptyId,

    /// The form did not include `cartFormInput`.
    #[error("missing form field: {CART_FORM_INPUT}")]
    MissingInput,

    /// The `cartFormInput` value is not a valid intent.
    #[error("malformed cart form input: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Action kind understood by the cart mutation executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CartAction {
    LinesAdd,
    LinesUpdate,
    LinesRemove,
    DiscountCodesUpdate,
}

impl CartAction {
    /// Wire name of the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LinesAdd => "LinesAdd",
            Self::LinesUpdate => "LinesUpdate",
            Self::LinesRemove => "LinesRemove",
            Self::DiscountCodesUpdate => "DiscountCodesUpdate",
        }
    }
}

/// A line to add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    /// Product variant ID.
    pub merchandise_id: MerchandiseId,
    /// Quantity to add.
    pub quantity: u32,
}

/// A new quantity for an existing line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineUpdate {
    /// Cart line ID.
    pub id: CartLineId,
    /// New quantity; never 0 (use [`CartIntent::RemoveLines`]).
    pub quantity: u32,
}

/// A serializable description of a desired cart mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "inputs", rename_all_fields = "camelCase")]
pub enum CartIntent {
    /// Add merchandise to the cart.
    #[serde(rename = "LinesAdd")]
    AddLines {
        /// Lines to add.
        lines: Vec<CartLineInput>,
    },
    /// Change quantities of existing lines.
    #[serde(rename = "LinesUpdate")]
    UpdateLines {
        /// Line updates.
        lines: Vec<CartLineUpdate>,
    },
    /// Remove lines.
    #[serde(rename = "LinesRemove")]
    RemoveLines {
        /// Lines to remove.
        line_ids: Vec<CartLineId>,
    },
    /// Replace the cart's discount codes.
    #[serde(rename = "DiscountCodesUpdate")]
    UpdateDiscountCodes {
        /// The full new list; empty removes all codes.
        discount_codes: Vec<String>,
    },
}

impl CartIntent {
    /// Add `quantity` of one variant.
    ///
    /// # Errors
    ///
    /// Returns an error if `quantity` is 0 or the ID is empty.
    pub fn add_line(merchandise_id: MerchandiseId, quantity: u32) -> Result<Self, IntentError> {
        let intent = Self::AddLines {
            lines: vec![CartLineInput {
                merchandise_id,
                quantity,
            }],
        };
        intent.validate()?;
        Ok(intent)
    }

    /// Set one line's quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if `quantity` is 0 or the ID is empty.
    pub fn update_line(id: CartLineId, quantity: u32) -> Result<Self, IntentError> {
        let intent = Self::UpdateLines {
            lines: vec![CartLineUpdate { id, quantity }],
        };
        intent.validate()?;
        Ok(intent)
    }

    /// Remove lines.
    ///
    /// # Errors
    ///
    /// Returns an error if `line_ids` is empty or contains an empty ID.
    pub fn remove_lines(line_ids: Vec<CartLineId>) -> Result<Self, IntentError> {
        let intent = Self::RemoveLines { line_ids };
        intent.validate()?;
        Ok(intent)
    }

    /// Replace the discount codes. Codes are trimmed, blanks dropped and
    /// duplicates removed keeping the first occurrence.
    pub fn update_discount_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut discount_codes: Vec<String> = Vec::new();
        for code in codes {
            let code = code.as_ref().trim();
            if !code.is_empty() && !discount_codes.iter().any(|c| c == code) {
                discount_codes.push(code.to_owned());
            }
        }
        Self::UpdateDiscountCodes { discount_codes }
    }

    /// The executor action this intent maps to.
    #[must_use]
    pub const fn action(&self) -> CartAction {
        match self {
            Self::AddLines { .. } => CartAction::LinesAdd,
            Self::UpdateLines { .. } => CartAction::LinesUpdate,
            Self::RemoveLines { .. } => CartAction::LinesRemove,
            Self::UpdateDiscountCodes { .. } => CartAction::DiscountCodesUpdate,
        }
    }

    /// Check the intent's invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), IntentError> {
        match self {
            Self::AddLines { lines } => {
                if lines.is_empty() {
                    return Err(IntentError::NoLines);
                }
                for line in lines {
                    if line.merchandise_id.as_str().is_empty() {
                        return Err(IntentError::EmptyId);
                    }
                    if line.quantity == 0 {
                        return Err(IntentError::InvalidQuantity);
                    }
                }
            }
            Self::UpdateLines { lines } => {
                if lines.is_empty() {
                    return Err(IntentError::NoLines);
                }
                for line in lines {
                    if line.id.as_str().is_empty() {
                        return Err(IntentError::EmptyId);
                    }
                    if line.quantity == 0 {
                        return Err(IntentError::InvalidQuantity);
                    }
                }
            }
            Self::RemoveLines { line_ids } => {
                if line_ids.is_empty() {
                    return Err(IntentError::NoLines);
                }
                if line_ids.iter().any(|id| id.as_str().is_empty()) {
                    return Err(IntentError::EmptyId);
                }
            }
            Self::UpdateDiscountCodes { .. } => {}
        }
        Ok(())
    }

    /// Encode as the `cartFormInput` field value.
    ///
    /// # Errors
    ///
    /// Returns [`IntentError::Malformed`] if JSON encoding fails.
    pub fn to_form_input(&self) -> Result<String, IntentError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Encode as form fields.
    ///
    /// # Errors
    ///
    /// See [`CartIntent::to_form_input`].
    pub fn to_form_fields(&self) -> Result<Vec<(String, String)>, IntentError> {
        Ok(vec![(CART_FORM_INPUT.to_string(), self.to_form_input()?)])
    }

    /// Decode a submitted cart form.
    ///
    /// The last `cartFormInput` field wins. For a discount update, a
    /// non-blank `discountCode` field is put in front of the carried codes.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is missing, the JSON is not an intent, or
    /// the decoded intent violates its invariants.
    pub fn from_form_fields(fields: &[(String, String)]) -> Result<Self, IntentError> {
        let input = last_field(fields, CART_FORM_INPUT).ok_or(IntentError::MissingInput)?;
        let intent: Self = serde_json::from_str(input)?;

        let intent = match intent {
            Self::UpdateDiscountCodes { discount_codes } => {
                let typed = last_field(fields, DISCOUNT_CODE_FIELD);
                Self::update_discount_codes(typed.into_iter().map(str::to_owned).chain(discount_codes))
            }
            other => other,
        };

        intent.validate()?;
        Ok(intent)
    }
}

fn last_field<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .rev()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}
