//! Realtime report subscriptions
//!
//! Stores publish a full, ordered snapshot after every mutation on a tokio
//! broadcast channel. [`snapshot_stream`] turns a receiver into a
//! [`ReportStream`], and [`subscribe_reports`] drives that stream into a
//! callback on a background task until the returned [`Subscription`] is
//! dropped or unsubscribed.

use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::models::Report;
use crate::storage::errors::StorageError;
use crate::storage::traits::{ReportStore, ReportStream};

/// Wrap a snapshot receiver as a stream. Lag is surfaced as an `Err` item.
pub fn snapshot_stream(mut rx: broadcast::Receiver<Vec<Report>>) -> ReportStream {
    Box::pin(async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(snapshot) => yield Ok(snapshot),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    yield Err(StorageError::Other(format!(
                        "subscriber lagged behind by {} snapshots",
                        skipped
                    )));
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Handle for an active callback subscription
#[derive(Debug)]
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    /// Stop delivering snapshots
    pub fn unsubscribe(self) {
        self.handle.abort();
    }

    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Push the current snapshot to `callback`, then one snapshot per change.
///
/// Failures never end the subscription: a failed listing delivers an empty
/// collection and a lagged receiver triggers a fresh listing.
pub fn subscribe_reports<S, F>(store: Arc<S>, mut callback: F) -> Subscription
where
    S: ReportStore + ?Sized,
    F: FnMut(Vec<Report>) + Send + 'static,
{
    use futures::StreamExt;

    // Subscribe before the initial listing so no change falls in between
    let mut stream = store.subscribe();

    let handle = tokio::spawn(async move {
        callback(current_snapshot(store.as_ref()).await);

        while let Some(item) = stream.next().await {
            match item {
                Ok(snapshot) => {
                    debug!(count = snapshot.len(), "Delivering report snapshot");
                    callback(snapshot);
                }
                Err(e) => {
                    warn!("Report subscription degraded, refreshing snapshot: {}", e);
                    callback(current_snapshot(store.as_ref()).await);
                }
            }
        }

        debug!("Report subscription closed");
    });

    Subscription { handle }
}

async fn current_snapshot<S>(store: &S) -> Vec<Report>
where
    S: ReportStore + ?Sized,
{
    match store.list_reports().await {
        Ok(reports) => reports,
        Err(e) => {
            warn!("Failed to list reports for subscriber: {}", e);
            Vec::new()
        }
    }
}
