//! Cart route handlers.
//!
//! The cart lives on Shopify. `GET` fetches the snapshot and returns the
//! derived view; `POST` takes the `cartFormInput` field every cart control
//! submits, executes it and returns the view of the resulting cart. Each
//! response is derived from the snapshot its own request obtained.

use axum::{
    Form, Json,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Serialize;
use tracing::instrument;
use url::Url;

use crate::cart::{CartIntent, CartResolution, CartViewOptions, CartViewState, derive_view_with};
use crate::error::{Result, add_breadcrumb};
use crate::shopify::{CartUserError, StorefrontBackend};
use crate::state::AppState;

/// Header htmx sets to the URL of the page issuing the request.
const HX_CURRENT_URL: &str = "HX-Current-URL";

/// Response to a cart form submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartActionResponse {
    /// View of the cart after the mutation.
    #[serde(flatten)]
    pub view: CartViewState,
    /// Errors Shopify reported for the mutation (e.g. unknown discount code).
    pub user_errors: Vec<CartUserError>,
}

/// View options for the page the request came from.
fn view_options<B: StorefrontBackend>(
    state: &AppState<B>,
    headers: &HeaderMap,
) -> CartViewOptions {
    let options = state.cart_view_options();
    headers
        .get(HX_CURRENT_URL)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Url::parse(value).ok())
        .map_or_else(|| options.clone(), |url| options.on_page(url.path()))
}

/// Display cart.
#[instrument(skip(state, headers))]
pub async fn show<B: StorefrontBackend>(
    State(state): State<AppState<B>>,
    headers: HeaderMap,
) -> Result<Json<CartViewState>> {
    let snapshot = state.backend().fetch_cart().await?;
    let view = derive_view_with(
        &CartResolution::Resolved(snapshot),
        &view_options(&state, &headers),
    );
    tracing::debug!(state = view.kind(), "Cart view derived");
    Ok(Json(view))
}

/// Execute a cart form submission.
///
/// Returns an HTMX trigger so other cart widgets refresh.
#[instrument(skip(state, headers, form))]
pub async fn action<B: StorefrontBackend>(
    State(state): State<AppState<B>>,
    headers: HeaderMap,
    Form(form): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let intent = CartIntent::from_form_fields(&form)?;
    let action = intent.action().as_str();
    add_breadcrumb("cart", action, None);
    tracing::info!(action, "Executing cart intent");

    let outcome = state.backend().execute(intent).await?;

    if !outcome.user_errors.is_empty() {
        tracing::warn!(
            action,
            errors = outcome.user_errors.len(),
            "Cart mutation reported user errors"
        );
    }

    let view = derive_view_with(
        &CartResolution::Resolved(outcome.cart),
        &view_options(&state, &headers),
    );

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        Json(CartActionResponse {
            view,
            user_errors: outcome.user_errors,
        }),
    )
        .into_response())
}
