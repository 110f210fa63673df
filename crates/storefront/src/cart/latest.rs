//! Latest-snapshot tracking.
//!
//! Cart reads can overlap: a slow fetch started before a mutation may finish
//! after the fetch started by it. A long-lived cart display (a drawer that
//! re-renders on every change) owns one [`LatestSnapshot`]; only the most
//! recently requested snapshot may reach its view, so each request takes a
//! [`SnapshotTicket`] and a completion carrying an older ticket is dropped.
//!
//! One-shot request handlers do not need this: they derive the view from the
//! snapshot they fetched themselves.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::debug;

use super::snapshot::{CartResolution, CartSnapshot};
use super::view::{CartViewOptions, CartViewState, derive_view_with};
use crate::shopify::{CartSource, ShopifyError};

/// Proof of a snapshot request, ordered by request time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SnapshotTicket(u64);

/// Holds the current [`CartResolution`] and notifies subscribers on change.
#[derive(Debug, Clone)]
pub struct LatestSnapshot {
    generation: Arc<AtomicU64>,
    tx: Arc<watch::Sender<CartResolution>>,
}

impl Default for LatestSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl LatestSnapshot {
    /// Start out pending.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(CartResolution::Pending);
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            tx: Arc::new(tx),
        }
    }

    /// Record a new request. The state becomes `Pending` until a snapshot
    /// for this ticket (or a later one) completes.
    pub fn begin(&self) -> SnapshotTicket {
        let mut ticket = SnapshotTicket(0);
        self.tx.send_modify(|state| {
            ticket = SnapshotTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1);
            *state = CartResolution::Pending;
        });
        ticket
    }

    /// Deliver the snapshot for `ticket`.
    ///
    /// Returns `false` (and changes nothing) if a newer request was begun
    /// since.
    pub fn complete(&self, ticket: SnapshotTicket, snapshot: Option<CartSnapshot>) -> bool {
        let applied = self.tx.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != ticket.0 {
                return false;
            }
            *state = CartResolution::Resolved(snapshot);
            true
        });
        if !applied {
            debug!(ticket = ticket.0, "Discarding superseded cart snapshot");
        }
        applied
    }

    /// Request and deliver a snapshot from `source`.
    ///
    /// # Errors
    ///
    /// Propagates the source's error; the state is left `Pending`.
    pub async fn load<S: CartSource>(&self, source: &S) -> Result<bool, ShopifyError> {
        let ticket = self.begin();
        let snapshot = source.fetch_cart().await?;
        Ok(self.complete(ticket, snapshot))
    }

    /// The current resolution.
    #[must_use]
    pub fn current(&self) -> CartResolution {
        self.tx.borrow().clone()
    }

    /// The view of the current resolution.
    #[must_use]
    pub fn view(&self, options: &CartViewOptions) -> CartViewState {
        derive_view_with(&self.tx.borrow(), options)
    }

    /// Receive every change from now on.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartResolution> {
        self.tx.subscribe()
    }
}
