//! Request lifecycle primitives: cancellation slots and search debouncing.
//!
//! Every logical selection (city, resort, query) owns a fresh
//! [`CancellationToken`]. Starting a new selection cancels the previous
//! token before the new request is dispatched, so the last *selection* wins
//! regardless of network timing.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use crate::error::FetchError;

/// Holds the cancellation token for the current in-flight request of one
/// concern (forecast, search, alerts, ...).
#[derive(Debug, Default)]
pub struct RequestSlot {
    current: RwLock<Option<Arc<CancellationToken>>>,
}

impl RequestSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel whatever is in flight and hand out a token for the next
    /// request.
    pub fn begin(&self) -> Arc<CancellationToken> {
        let token = Arc::new(CancellationToken::new());
        let previous = self.current.write().replace(token.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }
        token
    }

    /// Cancel the in-flight request without starting a new one.
    pub fn cancel(&self) {
        if let Some(token) = self.current.write().take() {
            token.cancel();
        }
    }
}

/// Run a fetch future under a cancellation token.
///
/// Resolves to `FetchError::Cancelled` as soon as the token fires, even if
/// the underlying request would eventually have succeeded. A late response
/// for a superseded selection must never surface.
pub async fn cancellable<T, F>(token: &CancellationToken, fut: F) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    tokio::select! {
        _ = token.cancelled() => Err(FetchError::Cancelled),
        res = fut => res,
    }
}

/// Fixed-delay debouncer for free-text search input.
///
/// Each call supersedes the pending one; the returned future resolves `true`
/// after the delay only if no newer call arrived in the meantime.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    slot: RequestSlot,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            slot: RequestSlot::new(),
        }
    }

    /// Wait out the debounce window. Returns the request token when this
    /// call survived, or `None` when a newer call took its place.
    pub async fn acquire(&self) -> Option<Arc<CancellationToken>> {
        let token = self.slot.begin();
        tokio::select! {
            _ = token.cancelled() => None,
            _ = tokio::time::sleep(self.delay) => Some(token),
        }
    }
}
