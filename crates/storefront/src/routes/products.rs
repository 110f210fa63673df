//! Product route handlers.

use axum::{
    Json,
    extract::{OriginalUri, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::error::Result;
use crate::product::{ProductError, ProductRequest, ProductView, VariantSelection, select_variant};
use crate::shopify::StorefrontBackend;
use crate::state::AppState;

/// Display product detail.
///
/// Redirects (302) to the first variant when the URL selects none.
#[instrument(skip(state, uri))]
pub async fn show<B: StorefrontBackend>(
    State(state): State<AppState<B>>,
    Path(handle): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> Result<Response> {
    let path_and_query = uri
        .path_and_query()
        .map_or_else(|| uri.path(), |pq| pq.as_str());
    let request = ProductRequest::new(&handle, path_and_query, &state.config().reserved_params)?;

    let product = state
        .backend()
        .product(&handle, &request.selected_options)
        .await?
        .ok_or_else(|| ProductError::NotFound(handle.clone()))?;

    let selected = match select_variant(Some(&product), &request)? {
        VariantSelection::Selected(variant) => variant,
        VariantSelection::Redirect(url) => {
            tracing::debug!(%url, "Redirecting to first variant");
            return Ok((StatusCode::FOUND, [(header::LOCATION, url)]).into_response());
        }
    };

    let variants = match state.backend().variants(&handle).await {
        Ok(variants) => Some(variants),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load product variants");
            None
        }
    };

    let view = ProductView::new(
        &product,
        selected,
        variants.as_deref(),
        &request,
        &state.config().store_name,
    );
    Ok(Json(view).into_response())
}
