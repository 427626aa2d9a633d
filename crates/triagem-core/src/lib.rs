//! Triagem Core Library
//!
//! This crate provides the data layer for Triagem, an admin tool for
//! reviewing volunteer applications stored in a hosted backend.
//!
//! # Architecture
//!
//! An in-memory [`RecordCache`](cache::RecordCache) mirrors the remote
//! applications table and is the single local source of truth. The
//! [`SyncController`] keeps it consistent: writes are
//! confirmation-first (the server-returned row is what lands in the
//! cache), and every push notification from the change feed is
//! answered with a full reload, giving last-write-wins reconciliation
//! at reload granularity.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let store = RestStore::new(&config);
//! let mut controller = SyncController::new(store);
//! controller.start().await?;
//!
//! let stats = controller.stats().await;
//! controller.update_status(&id, Status::Approved).await?;
//! controller.stop();
//! ```
//!
//! # Modules
//!
//! - `controller`: sync controller (main entry point)
//! - `cache`: in-memory record cache
//! - `views`: pure filtering and statistics over the cache
//! - `models`: application record and write shapes
//! - `remote`: remote store contract, REST client, change feed
//! - `auth`: sign-in/sign-out and session persistence
//! - `config`: application configuration

pub mod auth;
pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod remote;
pub mod views;

pub use auth::{AuthClient, Session};
pub use cache::RecordCache;
pub use config::Config;
pub use controller::SyncController;
pub use error::{AuthError, RemoteError, SyncError};
pub use models::{region_label, Application, ApplicationPatch, Availability, NewApplication, Status};
pub use remote::{ChangeEvent, ChangeFeed, ChangeKind, RemoteStore, RestStore};
pub use views::{compute_stats, filter_records, most_recent, RecordFilter, Stats};
