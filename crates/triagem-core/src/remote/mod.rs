//! Remote store collaborator
//!
//! Abstracts authenticated CRUD plus a change subscription against the
//! remote applications table. The sync controller is written against
//! the [`RemoteStore`] trait; [`RestStore`] is the production
//! implementation, tests substitute their own.
//!
//! Change notifications are best-effort signals that some row changed.
//! Their payload is never treated as authoritative - the controller
//! answers every notification with a full reload.

mod feed;
mod rest;

pub use rest::RestStore;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::RemoteError;
use crate::models::{Application, ApplicationPatch, NewApplication};

/// Kind of change reported by the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// One change notification from the remote table
///
/// `id` is advisory only; a malformed or partial event is still a
/// valid trigger for reconciliation.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub id: Option<String>,
}

/// Handle to an active change subscription
///
/// Dropping the feed releases the subscription: the producing task is
/// aborted, so no notification is ever delivered past the feed's
/// lifetime.
pub struct ChangeFeed {
    rx: mpsc::Receiver<ChangeEvent>,
    _guard: Option<FeedGuard>,
}

impl ChangeFeed {
    /// Wrap a plain receiver (no producer task to manage)
    pub fn new(rx: mpsc::Receiver<ChangeEvent>) -> Self {
        Self { rx, _guard: None }
    }

    /// Wrap a receiver fed by a background task; the task is aborted
    /// when the feed is dropped
    pub fn with_guard(rx: mpsc::Receiver<ChangeEvent>, task: JoinHandle<()>) -> Self {
        Self {
            rx,
            _guard: Some(FeedGuard(task)),
        }
    }

    /// Wait for the next notification; `None` once the feed is closed
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.rx.recv().await
    }

    /// Drain one already-queued notification without waiting
    pub fn try_recv(&mut self) -> Option<ChangeEvent> {
        self.rx.try_recv().ok()
    }
}

struct FeedGuard(JoinHandle<()>);

impl Drop for FeedGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Authenticated CRUD + subscribe against the remote applications table
///
/// The server is authoritative: writes return the full row as the
/// server stored it, and `fetch_all` returns rows already ordered by
/// `submitted_at` descending.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the full record set, ordered by `submitted_at` descending
    async fn fetch_all(&self) -> Result<Vec<Application>, RemoteError>;

    /// Insert a draft; the server assigns id, status and timestamps
    async fn insert(&self, draft: &NewApplication) -> Result<Application, RemoteError>;

    /// Apply a partial update; the server merges and returns the full row
    async fn update(&self, id: &str, patch: &ApplicationPatch)
        -> Result<Application, RemoteError>;

    /// Delete the row with the given id
    async fn delete(&self, id: &str) -> Result<(), RemoteError>;

    /// Open a change subscription for the table
    async fn subscribe(&self) -> Result<ChangeFeed, RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_kind_wire_names() {
        let kind: ChangeKind = serde_json::from_str("\"INSERT\"").unwrap();
        assert_eq!(kind, ChangeKind::Insert);
        let kind: ChangeKind = serde_json::from_str("\"DELETE\"").unwrap();
        assert_eq!(kind, ChangeKind::Delete);
    }

    #[tokio::test]
    async fn test_feed_recv_and_drain() {
        let (tx, rx) = mpsc::channel(8);
        let mut feed = ChangeFeed::new(rx);

        tx.send(ChangeEvent {
            kind: ChangeKind::Insert,
            id: Some("a".to_string()),
        })
        .await
        .unwrap();
        tx.send(ChangeEvent {
            kind: ChangeKind::Update,
            id: None,
        })
        .await
        .unwrap();

        let first = feed.recv().await.unwrap();
        assert_eq!(first.kind, ChangeKind::Insert);
        assert!(feed.try_recv().is_some());
        assert!(feed.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_feed_closes_when_sender_dropped() {
        let (tx, rx) = mpsc::channel::<ChangeEvent>(8);
        let mut feed = ChangeFeed::new(rx);
        drop(tx);
        assert!(feed.recv().await.is_none());
    }
}
