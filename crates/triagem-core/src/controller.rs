//! Sync controller
//!
//! Bridges the record cache to the remote store: initial load,
//! confirmed mutations, and push-triggered reconciliation. The
//! controller is an explicitly constructed object with `start`/`stop`
//! lifecycle so multiple independent instances can coexist (one per
//! test, one per dashboard session).
//!
//! ## Consistency model
//!
//! Writes are confirmation-first: nothing touches the cache until the
//! server has returned the row it actually stored. Every change
//! notification - whatever its origin or payload - is answered with a
//! full reload, which makes reconciliation last-write-wins at reload
//! granularity. Loads carry a generation number; a load that completes
//! after a newer one has started is discarded rather than applied.
//! Notifications arriving while a reload is in flight collapse into
//! exactly one follow-up reload.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::RecordCache;
use crate::error::SyncError;
use crate::models::{Application, ApplicationPatch, NewApplication, Status};
use crate::remote::{ChangeFeed, RemoteStore};
use crate::views::{self, RecordFilter, Stats};

struct Inner<S> {
    store: S,
    cache: RwLock<RecordCache>,
    /// Monotonic load generation; only the newest load may apply
    generation: AtomicU64,
    loading_tx: watch::Sender<bool>,
}

/// Orchestrates cache, remote store, and change feed
pub struct SyncController<S: RemoteStore> {
    inner: Arc<Inner<S>>,
    loading_rx: watch::Receiver<bool>,
    feed_task: Option<JoinHandle<()>>,
}

impl<S: RemoteStore + 'static> SyncController<S> {
    /// Create an idle controller; call [`start`](Self::start) to
    /// subscribe and load
    pub fn new(store: S) -> Self {
        let (loading_tx, loading_rx) = watch::channel(true);
        Self {
            inner: Arc::new(Inner {
                store,
                cache: RwLock::new(RecordCache::new()),
                generation: AtomicU64::new(0),
                loading_tx,
            }),
            loading_rx,
            feed_task: None,
        }
    }

    /// Subscribe to the change feed and perform the initial load
    ///
    /// The feed task starts before the load so no change slips through
    /// the gap. A failed initial load leaves the subscription active;
    /// the caller may retry with [`load`](Self::load).
    pub async fn start(&mut self) -> Result<(), SyncError> {
        if self.feed_task.is_none() {
            let feed = self
                .inner
                .store
                .subscribe()
                .await
                .map_err(SyncError::Subscribe)?;
            let inner = Arc::clone(&self.inner);
            self.feed_task = Some(tokio::spawn(feed_loop(inner, feed)));
            info!("Change feed subscribed");
        }
        self.load().await
    }

    /// Tear down the change feed
    ///
    /// Deterministic release: after this returns, no notification is
    /// delivered to this controller. Idempotent.
    pub fn stop(&mut self) {
        if let Some(task) = self.feed_task.take() {
            task.abort();
            debug!("Change feed stopped");
        }
    }

    /// Fetch the full record set and replace the cache
    ///
    /// On failure the cache retains its last-known-good contents and
    /// the error is surfaced to the caller.
    pub async fn load(&self) -> Result<(), SyncError> {
        load_full(&self.inner).await
    }

    /// Apply a review decision to a record
    ///
    /// Validates that `status` is a decision, then updates remotely
    /// (stamping `updated_at`) and applies the server-confirmed row to
    /// the cache. No optimistic pre-write: a failed update leaves the
    /// cache untouched. Whether the record is currently pending is the
    /// server's call; a server-side rejection surfaces as a write
    /// error.
    pub async fn update_status(&self, id: &str, status: Status) -> Result<Application, SyncError> {
        if !status.is_decision() {
            return Err(SyncError::InvalidStatus(status));
        }

        let patch = ApplicationPatch::status(status);
        let confirmed = self
            .inner
            .store
            .update(id, &patch)
            .await
            .map_err(SyncError::Write)?;

        info!(id, status = %confirmed.status, "Application status updated");
        self.inner.cache.write().await.upsert(confirmed.clone());
        Ok(confirmed)
    }

    /// Create a new application record
    ///
    /// The server assigns id and timestamps; the returned row lands at
    /// the front of the cache.
    pub async fn create(&self, draft: &NewApplication) -> Result<Application, SyncError> {
        let record = self
            .inner
            .store
            .insert(draft)
            .await
            .map_err(SyncError::Write)?;

        info!(id = %record.id, "Application created");
        self.inner.cache.write().await.upsert(record.clone());
        Ok(record)
    }

    /// Delete a record, removing it locally only after server
    /// confirmation
    pub async fn delete(&self, id: &str) -> Result<(), SyncError> {
        self.inner
            .store
            .delete(id)
            .await
            .map_err(SyncError::Write)?;

        info!(id, "Application deleted");
        self.inner.cache.write().await.remove(id);
        Ok(())
    }

    /// Snapshot of all cached records, in cache order
    pub async fn records(&self) -> Vec<Application> {
        self.inner.cache.read().await.records().to_vec()
    }

    /// Look up a single record by id
    pub async fn get(&self, id: &str) -> Option<Application> {
        self.inner.cache.read().await.get(id).cloned()
    }

    /// Records matching the filter
    pub async fn filtered(&self, filter: &RecordFilter) -> Vec<Application> {
        let cache = self.inner.cache.read().await;
        views::filter_records(cache.records(), filter)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Aggregate statistics over the cache
    pub async fn stats(&self) -> Stats {
        views::compute_stats(self.inner.cache.read().await.records())
    }

    /// Top `n` records by submission time
    pub async fn most_recent(&self, n: usize) -> Vec<Application> {
        let cache = self.inner.cache.read().await;
        views::most_recent(cache.records(), n)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Whether a load is currently in flight
    pub fn loading(&self) -> bool {
        *self.loading_rx.borrow()
    }

    /// Watch the loading flag
    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading_rx.clone()
    }
}

impl<S: RemoteStore> Drop for SyncController<S> {
    fn drop(&mut self) {
        if let Some(task) = self.feed_task.take() {
            task.abort();
        }
    }
}

/// One generation-tagged full load
async fn load_full<S: RemoteStore>(inner: &Inner<S>) -> Result<(), SyncError> {
    let generation = inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
    let _ = inner.loading_tx.send(true);
    debug!(generation, "Loading applications");

    let result = inner.store.fetch_all().await;

    // A newer load has started in the meantime; its result supersedes
    // this one, so drop it unapplied
    if inner.generation.load(Ordering::SeqCst) != generation {
        debug!(generation, "Discarding stale load result");
        return Ok(());
    }

    match result {
        Ok(records) => {
            info!(count = records.len(), "Loaded applications");
            inner.cache.write().await.replace_all(records);
            let _ = inner.loading_tx.send(false);
            Ok(())
        }
        Err(e) => {
            warn!("Load failed, keeping cached records: {}", e);
            let _ = inner.loading_tx.send(false);
            Err(SyncError::Fetch(e))
        }
    }
}

/// Consume change notifications, answering each burst with one reload
///
/// Events queued while a reload is in flight are drained on the next
/// iteration, so a burst triggers the in-flight reload plus at most
/// one follow-up.
async fn feed_loop<S: RemoteStore>(inner: Arc<Inner<S>>, mut feed: ChangeFeed) {
    while let Some(event) = feed.recv().await {
        let mut burst = 1usize;
        while feed.try_recv().is_some() {
            burst += 1;
        }
        debug!(kind = ?event.kind, burst, "Change notification, reloading");

        if let Err(e) = load_full(&inner).await {
            warn!("Reload after change notification failed: {}", e);
        }
    }
    debug!("Change feed closed");
}
