//! Cart view reconciliation.
//!
//! The platform owns the cart. This module turns whatever snapshot it last
//! returned into a display state, and describes every control in that state
//! as a [`CartIntent`] to hand back to the platform.

pub mod intent;
pub mod latest;
pub mod snapshot;
pub mod view;

pub use intent::{CartAction, CartIntent, CartLineInput, CartLineUpdate, IntentError};
pub use latest::{LatestSnapshot, SnapshotTicket};
pub use snapshot::{CartLine, CartResolution, CartSnapshot, LineError, ValidatedLine};
pub use view::{
    CartLineView, CartViewOptions, CartViewState, derive_view, derive_view_with,
};
