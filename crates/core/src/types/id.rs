//! Newtype IDs for platform-assigned global IDs.
//!
//! Shopify identifies every object with an opaque global ID string such as
//! `gid://shopify/CartLine/8c1e...`. Use the `define_gid!` macro to create
//! type-safe wrappers that prevent accidentally mixing IDs of different
//! resource types.

/// Macro to define a type-safe global ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// IDs are opaque: no structure is assumed beyond being a string.
///
/// # Example
///
/// ```rust
/// # use hustlestack_core::define_gid;
/// define_gid!(OrderGid);
/// define_gid!(CustomerGid);
///
/// let order = OrderGid::new("gid://shopify/Order/1");
/// assert_eq!(order.as_str(), "gid://shopify/Order/1");
///
/// // These are different types, so this won't compile:
/// // let _: CustomerGid = order;
/// ```
#[macro_export]
macro_rules! define_gid {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the underlying string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define storefront resource IDs
define_gid!(CartId);
define_gid!(CartLineId);
define_gid!(MerchandiseId);
define_gid!(ProductId);
