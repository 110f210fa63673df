//! Canonical product-variant URLs.
//!
//! A variant selection is carried in the product URL's query string, one
//! parameter per selected option (`/products/shirt?Color=Red&Size=M`).
//! Parameters are always serialized sorted by name so that the same
//! selection yields a byte-identical URL no matter how it was built. Views
//! rely on this to compare URLs for "is this value already selected" and
//! caches use the URL as a key.
//!
//! Parameters unrelated to the selection (pagination, referral tags) are
//! passed through untouched by [`resolve`] and ignored by [`parse`] when they
//! are listed in [`ReservedParams`].

use std::collections::{BTreeMap, BTreeSet};

use hustlestack_core::SelectedOption;
use thiserror::Error;
use url::{Url, form_urlencoded};

/// Query parameters keyed by name, iterated in sorted order.
pub type SearchParams = BTreeMap<String, String>;

/// Parameters that never denote a product option.
///
/// Entries ending in `*` are prefixes (`utm_*`).
pub const DEFAULT_RESERVED_PARAMS: &[&str] = &[
    "_data",
    "cursor",
    "direction",
    "page",
    "q",
    "ref",
    "selling_plan",
    "sort",
    "variant",
    "utm_*",
];

/// Errors raised for malformed resolver input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariantUrlError {
    /// A required argument was empty.
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),
}

/// Set of query parameter names excluded from option parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedParams {
    exact: BTreeSet<String>,
    prefixes: Vec<String>,
}

impl ReservedParams {
    /// Build from a list of names; a trailing `*` marks a prefix.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut exact = BTreeSet::new();
        let mut prefixes = Vec::new();

        for entry in entries {
            let entry = entry.as_ref().trim();
            if entry.is_empty() {
                continue;
            }
            match entry.strip_suffix('*') {
                Some(prefix) if !prefix.is_empty() => prefixes.push(prefix.to_owned()),
                Some(_) => {}
                None => {
                    exact.insert(entry.to_owned());
                }
            }
        }

        Self { exact, prefixes }
    }

    /// Returns true if `name` is reserved.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.exact.contains(name) || self.prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }
}

impl Default for ReservedParams {
    fn default() -> Self {
        Self::new(DEFAULT_RESERVED_PARAMS)
    }
}

/// Build the canonical URL for a variant selection.
///
/// Starts from `existing` (so unrelated parameters survive), sets one
/// parameter per option and serializes every parameter sorted by name with
/// `application/x-www-form-urlencoded` escaping. With no parameters at all the
/// bare path is returned.
///
/// When two options share a name the later one wins, exactly like repeated
/// assignment to a query parameter map.
///
/// # Errors
///
/// Returns [`VariantUrlError::InvalidArgument`] if `product_path` or any
/// option name is empty.
///
/// # Example
///
/// ```
/// use hustlestack_core::SelectedOption;
/// use hustlestack_storefront::variant::{SearchParams, resolve};
///
/// let options = [
///     SelectedOption::new("Size", "M"),
///     SelectedOption::new("Color", "Red"),
/// ];
/// let url = resolve("/products/shirt", &options, &SearchParams::new()).unwrap();
/// assert_eq!(url, "/products/shirt?Color=Red&Size=M");
/// ```
pub fn resolve(
    product_path: &str,
    options: &[SelectedOption],
    existing: &SearchParams,
) -> Result<String, VariantUrlError> {
    if product_path.is_empty() {
        return Err(VariantUrlError::InvalidArgument("product path must not be empty"));
    }
    if options.iter().any(|option| option.name.is_empty()) {
        return Err(VariantUrlError::InvalidArgument("option name must not be empty"));
    }

    let mut params = existing.clone();
    for option in options {
        params.insert(option.name.clone(), option.value.clone());
    }

    if params.is_empty() {
        return Ok(product_path.to_owned());
    }

    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish();

    Ok(format!("{product_path}?{query}"))
}

/// Parse the selected options out of a URL using the default reserved set.
///
/// See [`parse_with`].
#[must_use]
pub fn parse(url: &str) -> Vec<SelectedOption> {
    parse_with(url, &ReservedParams::default())
}

/// Parse the selected options out of a path+query or absolute URL.
///
/// Every non-reserved parameter with a non-empty name becomes one option.
/// The result is sorted by name. A repeated parameter keeps its last value.
#[must_use]
pub fn parse_with(url: &str, reserved: &ReservedParams) -> Vec<SelectedOption> {
    search_params(url)
        .into_iter()
        .filter(|(name, _)| !name.is_empty() && !reserved.contains(name))
        .map(|(name, value)| SelectedOption { name, value })
        .collect()
}

/// Decode all query parameters of a URL.
///
/// The fragment is ignored. A repeated parameter keeps its last value.
#[must_use]
pub fn search_params(url: &str) -> SearchParams {
    let (_, query) = split_url(url);
    query.map_or_else(SearchParams::new, |query| {
        form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    })
}

/// Split a URL into its path (or everything before `?`) and its query.
fn split_url(url: &str) -> (&str, Option<&str>) {
    let url = url.split_once('#').map_or(url, |(head, _)| head);
    match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    }
}

/// Build the product path for a handle, keeping the current locale prefix.
///
/// A pathname starting with a `/xx-yy/` segment (e.g. `/en-ca/collections`)
/// keeps that segment: `/en-ca/products/{handle}`. The handle is
/// percent-encoded as a single path segment.
///
/// # Errors
///
/// Returns [`VariantUrlError::InvalidArgument`] if `handle` is empty.
pub fn product_path(handle: &str, current_pathname: &str) -> Result<String, VariantUrlError> {
    const INVALID_HANDLE: VariantUrlError =
        VariantUrlError::InvalidArgument("product handle is not a valid path segment");

    if handle.is_empty() {
        return Err(VariantUrlError::InvalidArgument("product handle must not be empty"));
    }

    let mut url = Url::parse("http://localhost/").map_err(|_| INVALID_HANDLE)?;
    url.path_segments_mut()
        .map_err(|()| INVALID_HANDLE)?
        .clear()
        .extend(locale_prefix(current_pathname).into_iter().chain(["products", handle]));
    Ok(url.path().to_owned())
}

/// Returns the `xx-yy` locale segment if the pathname starts with one.
fn locale_prefix(pathname: &str) -> Option<&str> {
    let segment = pathname.strip_prefix('/')?.split('/').next()?;
    let rest = pathname.get(1 + segment.len()..)?;
    let (language, country) = segment.split_once('-')?;

    let is_alpha_pair = |s: &str| s.len() == 2 && s.bytes().all(|b| b.is_ascii_alphabetic());
    (is_alpha_pair(language) && is_alpha_pair(country) && rest.starts_with('/')).then_some(segment)
}

/// A product path together with a variant selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantLocator {
    /// Path of the product page (e.g. `/products/shirt`).
    pub product_path: String,
    /// Selected options, in any order.
    pub options: Vec<SelectedOption>,
}

impl VariantLocator {
    /// Create a new locator.
    #[must_use]
    pub fn new(product_path: impl Into<String>, options: Vec<SelectedOption>) -> Self {
        Self {
            product_path: product_path.into(),
            options,
        }
    }

    /// Serialize to the canonical URL.
    ///
    /// # Errors
    ///
    /// See [`resolve`].
    pub fn to_url(&self) -> Result<String, VariantUrlError> {
        resolve(&self.product_path, &self.options, &SearchParams::new())
    }

    /// Parse a locator from a path+query URL.
    #[must_use]
    pub fn from_url(url: &str, reserved: &ReservedParams) -> Self {
        let (path, _) = split_url(url);
        Self {
            product_path: path.to_owned(),
            options: parse_with(url, reserved),
        }
    }

    /// Whether both locators denote the same product and option set.
    #[must_use]
    pub fn same_selection(&self, other: &Self) -> bool {
        matches!((self.to_url(), other.to_url()), (Ok(a), Ok(b)) if a == b)
    }
}
