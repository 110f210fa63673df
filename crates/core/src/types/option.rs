//! Product option selections.

use serde::{Deserialize, Serialize};

/// One `name = value` pair identifying part of a variant (e.g. `Size = M`).
///
/// A variant's identity is its set of selected options; names are unique
/// within one variant and compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SelectedOption {
    /// Option name (e.g., "Size", "Color").
    pub name: String,
    /// Selected value (e.g., "Large", "Blue").
    pub value: String,
}

impl SelectedOption {
    /// Create a new selected option.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Whether this is Shopify's placeholder option for products without
    /// real options (`Title = Default Title`).
    #[must_use]
    pub fn is_default_title(&self) -> bool {
        self.name == "Title" && self.value == "Default Title"
    }
}
