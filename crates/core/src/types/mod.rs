//! Core types for HustleStack.
//!
//! This module provides type-safe wrappers for common storefront concepts.

pub mod id;
pub mod money;
pub mod option;

pub use id::*;
pub use money::{CurrencyCode, Money, MoneyError};
pub use option::SelectedOption;
