//! The watch loop: turns the store's single-step "something changed near
//! this path" notifications into one deduplicated, content-aware, cancelable
//! result.
//!
//! New reads are always compared against the baseline captured at watch
//! start, never against the previous iteration's read. A watch therefore
//! fires on the first revision whose content differs from what the caller
//! already knew, even when intermediate revisions oscillate back toward the
//! baseline value.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::warn;

use crate::Entry;
use crate::Error;
use crate::InvalidArgumentError;
use crate::Query;
use crate::Result;
use crate::Revision;
use crate::VersionedStore;

/// The single externally observable outcome of one watch operation.
///
/// Resolves exactly once: `Ok` with the first differing entry, `Err` with a
/// propagated store failure, or `Err(Error::Canceled)` after [`cancel`].
/// Dropping the handle without waiting also terminates the loop; no further
/// store calls are issued either way.
///
/// [`cancel`]: WatchHandle::cancel
pub struct WatchHandle {
    result_rx: oneshot::Receiver<Result<Entry>>,
    token: CancellationToken,
}

impl WatchHandle {
    /// Requests cancellation. The loop reacts within its current suspension
    /// point by dropping the in-flight store call, which releases the
    /// store-side subscription. No-op if the watch already completed.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Waits for the watch outcome.
    pub async fn wait(self) -> Result<Entry> {
        match self.result_rx.await {
            Ok(outcome) => outcome,
            // Loop gone without a result: only happens after cancellation
            // raced the final send.
            Err(_) => Err(Error::Canceled),
        }
    }
}

/// Starts watching `query` for the first content change relative to its value
/// at `last_known`.
///
/// Fails synchronously with `Error::InvalidArgument` when `last_known` is the
/// null revision; no task is spawned and no store call is issued. Must be
/// called within a Tokio runtime.
pub fn start_watch(
    store: Arc<dyn VersionedStore>,
    last_known: Revision,
    query: Query,
) -> Result<WatchHandle> {
    if !last_known.is_valid() {
        return Err(InvalidArgumentError::NullRevision(last_known).into());
    }
    let token = CancellationToken::new();
    let (result_tx, result_rx) = oneshot::channel();
    tokio::spawn(watch_loop(store, last_known, query, token.clone(), result_tx));
    Ok(WatchHandle { result_rx, token })
}

async fn watch_loop(
    store: Arc<dyn VersionedStore>,
    last_known: Revision,
    query: Query,
    token: CancellationToken,
    mut result_tx: oneshot::Sender<Result<Entry>>,
) {
    // The comparison anchor for the whole operation.
    let baseline = match race(&token, &mut result_tx, store.get(last_known, &query)).await {
        Some(Ok(value)) => value,
        Some(Err(e)) => {
            warn!("baseline read at {last_known} failed: {e}");
            let _ = result_tx.send(Err(e.into()));
            return;
        }
        None => {
            let _ = result_tx.send(Err(Error::Canceled));
            return;
        }
    };
    debug!(
        "watching {} from {last_known} (baseline {})",
        query.path(),
        if baseline.is_some() { "present" } else { "absent" }
    );

    let mut current = last_known;
    loop {
        let notified =
            match race(&token, &mut result_tx, store.await_change(current, query.path())).await {
                Some(Ok(revision)) => revision,
                Some(Err(e)) => {
                    warn!("await_change since {current} failed: {e}");
                    let _ = result_tx.send(Err(e.into()));
                    return;
                }
                None => {
                    let _ = result_tx.send(Err(Error::Canceled));
                    return;
                }
            };

        let observed = match race(&token, &mut result_tx, store.get(notified, &query)).await {
            Some(Ok(value)) => value,
            Some(Err(e)) => {
                warn!("read at notified revision {notified} failed: {e}");
                let _ = result_tx.send(Err(e.into()));
                return;
            }
            None => {
                let _ = result_tx.send(Err(Error::Canceled));
                return;
            }
        };

        match observed {
            // Path does not currently resolve; absent is never a terminal
            // "different" result.
            None => {
                debug!("{} absent at {notified}, watching again", query.path());
                current = notified;
            }
            Some(entry) => {
                let unchanged = baseline
                    .as_ref()
                    .is_some_and(|b| b.content() == entry.content());
                if unchanged {
                    debug!(
                        "{} notified at {notified} but content equals baseline",
                        query.path()
                    );
                    current = notified;
                } else {
                    debug!("{} changed at {notified}", query.path());
                    let _ = result_tx.send(Ok(entry));
                    return;
                }
            }
        }
    }
}

/// Races one store call against cancellation and against the handle being
/// dropped. `None` means the watch is over: the losing store future is
/// dropped here, which cancels it upstream, and the caller must not issue
/// further store calls.
async fn race<T>(
    token: &CancellationToken,
    result_tx: &mut oneshot::Sender<Result<Entry>>,
    call: impl Future<Output = T>,
) -> Option<T> {
    tokio::select! {
        biased;
        _ = token.cancelled() => None,
        _ = result_tx.closed() => None,
        out = call => Some(out),
    }
}
