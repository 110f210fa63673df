//! Monetary amounts as received from the storefront platform.
//!
//! Amounts are decimal strings. They are validated with `rust_decimal` but
//! the original string is kept verbatim, so a value like `"19.90"` is
//! displayed as `19.90` and never round-trips through a binary float.

use core::fmt;
use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Money`] or [`CurrencyCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The amount string is empty.
    #[error("amount cannot be empty")]
    EmptyAmount,
    /// The amount string is not an exact decimal number.
    #[error("amount is not a decimal number: {0}")]
    InvalidAmount(String),
    /// The currency code is not a three-letter ISO 4217 code.
    #[error("invalid ISO 4217 currency code: {0}")]
    InvalidCurrency(String),
}

/// An ISO 4217 currency code (e.g. `USD`).
///
/// Only the shape is validated (three ASCII uppercase letters); the platform
/// is trusted for the list of currencies it actually supports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parse a currency code.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::InvalidCurrency`] unless the input is exactly
    /// three ASCII uppercase letters.
    pub fn parse(code: &str) -> Result<Self, MoneyError> {
        if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(Self(code.to_owned()))
        } else {
            Err(MoneyError::InvalidCurrency(code.to_owned()))
        }
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the display symbol for common currencies.
    #[must_use]
    pub fn symbol(&self) -> Option<&'static str> {
        match self.0.as_str() {
            "USD" | "CAD" | "AUD" | "NZD" => Some("$"),
            "EUR" => Some("€"),
            "GBP" => Some("£"),
            "JPY" => Some("¥"),
            _ => None,
        }
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wire shape of a `MoneyV2` object.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMoney {
    amount: String,
    currency_code: String,
}

/// A monetary amount with its currency.
///
/// ## Examples
///
/// ```
/// use hustlestack_core::Money;
///
/// let price = Money::parse("19.00", "USD").unwrap();
/// assert_eq!(price.amount(), "19.00");
/// assert_eq!(price.to_string(), "$19.00");
/// assert_eq!(price.display_without_trailing_zeros(), "$19");
///
/// assert!(Money::parse("19.99", "usd").is_err());
/// assert!(Money::parse("nineteen", "USD").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawMoney")]
pub struct Money {
    amount: String,
    currency_code: CurrencyCode,
}

impl Money {
    /// Parse a money value from its amount string and currency code.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is empty or not an exact decimal, or
    /// if the currency code is malformed.
    pub fn parse(amount: &str, currency_code: &str) -> Result<Self, MoneyError> {
        let amount = amount.trim();
        if amount.is_empty() {
            return Err(MoneyError::EmptyAmount);
        }
        Decimal::from_str_exact(amount)
            .map_err(|_| MoneyError::InvalidAmount(amount.to_owned()))?;

        Ok(Self {
            amount: amount.to_owned(),
            currency_code: CurrencyCode::parse(currency_code)?,
        })
    }

    /// The amount exactly as received.
    #[must_use]
    pub fn amount(&self) -> &str {
        &self.amount
    }

    /// The currency code.
    #[must_use]
    pub const fn currency_code(&self) -> &CurrencyCode {
        &self.currency_code
    }

    /// The amount as an exact decimal.
    #[must_use]
    pub fn decimal(&self) -> Decimal {
        // Validated in `parse`.
        Decimal::from_str_exact(&self.amount).unwrap_or_default()
    }

    /// Compare two amounts numerically.
    ///
    /// Returns `None` when the currencies differ.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        (self.currency_code == other.currency_code).then(|| self.decimal().cmp(&other.decimal()))
    }

    /// Format without a fractional part made only of zeros.
    ///
    /// `19.00` becomes `$19`; `19.50` stays `$19.50`.
    #[must_use]
    pub fn display_without_trailing_zeros(&self) -> String {
        let amount = match self.amount.split_once('.') {
            Some((whole, fraction)) if fraction.bytes().all(|b| b == b'0') => whole,
            _ => self.amount.as_str(),
        };
        self.format_amount(amount)
    }

    fn format_amount(&self, amount: &str) -> String {
        let (sign, digits) = amount
            .strip_prefix('-')
            .map_or(("", amount), |rest| ("-", rest));
        match self.currency_code.symbol() {
            Some(symbol) => format!("{sign}{symbol}{digits}"),
            None => format!("{sign}{digits} {}", self.currency_code),
        }
    }
}

impl TryFrom<RawMoney> for Money {
    type Error = MoneyError;

    fn try_from(raw: RawMoney) -> Result<Self, Self::Error> {
        Self::parse(&raw.amount, &raw.currency_code)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_amount(&self.amount))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_money_preserves_amount_string() {
        let money = Money::parse("10.10", "USD").unwrap();
        assert_eq!(money.amount(), "10.10");
        assert_eq!(money.to_string(), "$10.10");
    }

    #[test]
    fn test_money_high_precision_is_exact() {
        let money = Money::parse("0.1000000000000000000000000001", "EUR").unwrap();
        assert_eq!(money.amount(), "0.1000000000000000000000000001");
        assert_eq!(money.to_string(), "€0.1000000000000000000000000001");
    }

    #[test]
    fn test_money_rejects_invalid_amounts() {
        assert_eq!(Money::parse("", "USD"), Err(MoneyError::EmptyAmount));
        assert!(matches!(
            Money::parse("1,000.00", "USD"),
            Err(MoneyError::InvalidAmount(_))
        ));
        assert!(matches!(
            Money::parse("NaN", "USD"),
            Err(MoneyError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_currency_code_validation() {
        assert!(CurrencyCode::parse("CAD").is_ok());
        assert!(CurrencyCode::parse("US").is_err());
        assert!(CurrencyCode::parse("usd").is_err());
        assert!(CurrencyCode::parse("US1").is_err());
    }

    #[test]
    fn test_display_unknown_currency_uses_code() {
        let money = Money::parse("250", "SEK").unwrap();
        assert_eq!(money.to_string(), "250 SEK");
    }

    #[test]
    fn test_display_negative_amount() {
        let money = Money::parse("-5.00", "GBP").unwrap();
        assert_eq!(money.to_string(), "-£5.00");
    }

    #[test]
    fn test_without_trailing_zeros() {
        let whole = Money::parse("42.000", "USD").unwrap();
        assert_eq!(whole.display_without_trailing_zeros(), "$42");

        let fractional = Money::parse("42.50", "USD").unwrap();
        assert_eq!(fractional.display_without_trailing_zeros(), "$42.50");

        let integer = Money::parse("42", "USD").unwrap();
        assert_eq!(integer.display_without_trailing_zeros(), "$42");
    }

    #[test]
    fn test_compare_same_currency() {
        let a = Money::parse("9.5", "USD").unwrap();
        let b = Money::parse("9.50", "USD").unwrap();
        let c = Money::parse("10", "USD").unwrap();
        assert_eq!(a.compare(&b), Some(Ordering::Equal));
        assert_eq!(a.compare(&c), Some(Ordering::Less));
        // String equality is still exact.
        assert_ne!(a, b);
    }

    #[test]
    fn test_compare_different_currency() {
        let usd = Money::parse("1", "USD").unwrap();
        let eur = Money::parse("1", "EUR").unwrap();
        assert_eq!(usd.compare(&eur), None);
    }

    #[test]
    fn test_deserialize_money_v2() {
        let money: Money =
            serde_json::from_str(r#"{"amount":"12.30","currencyCode":"USD"}"#).unwrap();
        assert_eq!(money.amount(), "12.30");
        assert_eq!(money.currency_code().as_str(), "USD");

        let bad = serde_json::from_str::<Money>(r#"{"amount":"abc","currencyCode":"USD"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_serialize_money_v2() {
        let money = Money::parse("3.00", "AUD").unwrap();
        let json = serde_json::to_value(&money).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"amount": "3.00", "currencyCode": "AUD"})
        );
    }
}
