//! HustleStack Core - Shared storefront types.
//!
//! This crate provides the plain value types used by the storefront:
//! money amounts as received from the platform, variant option pairs and
//! opaque Shopify global IDs.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no
//! rendering. Everything here is an immutable snapshot value.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for GIDs, money and selected options

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
