//! Storage abstraction for Shop Lens.
//!
//! The [`ProductStore`] trait is the narrow interface the pipeline needs
//! from a persistent product collection: substring search, inserts, a
//! count, and an append-only search audit log. Implementations must be
//! `Send + Sync`; each call is assumed to be individually atomic.
//!
//! Connectivity is probed once at process start and captured in a
//! [`StoreHandle`]. There is no per-call reconnect or retry.

pub mod memory;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::models::{NewProduct, Product, SearchRecord};

/// Hard cap on products returned by one store search.
pub const MAX_STORE_RESULTS: usize = 15;

/// Result of [`ProductStore::seed_if_empty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "count", rename_all = "snake_case")]
pub enum SeedOutcome {
    /// The store was empty; this many products were inserted.
    Inserted(usize),
    /// The store already held this many products; nothing was inserted.
    AlreadyPopulated(i64),
}

/// Abstract product store.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`search`](ProductStore::search) | Case-insensitive substring match over title, description, category |
/// | [`insert`](ProductStore::insert) | Append one product |
/// | [`seed_if_empty`](ProductStore::seed_if_empty) | Append a batch only into an empty store, atomically |
/// | [`count`](ProductStore::count) | Number of stored products |
/// | [`audit`](ProductStore::audit) | Record a query and its result count |
/// | [`recent_searches`](ProductStore::recent_searches) | Newest audit records first |
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Products matching `query` in insertion order, at most `limit`.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Product>>;

    async fn insert(&self, product: &NewProduct) -> Result<()>;

    /// Insert all of `products` if the store holds none, else nothing.
    ///
    /// The emptiness check and the inserts form one atomic step: concurrent
    /// callers insert the batch at most once, and a failed insert leaves
    /// the store empty.
    async fn seed_if_empty(&self, products: &[NewProduct]) -> Result<SeedOutcome>;

    async fn count(&self) -> Result<i64>;

    async fn audit(&self, query: &str, results_count: i64) -> Result<()>;

    async fn recent_searches(&self, limit: usize) -> Result<Vec<SearchRecord>>;

    /// Create any lookup indexes the backend supports. Idempotent.
    async fn ensure_indexes(&self) -> Result<()> {
        Ok(())
    }
}

/// Result of the one-time connectivity probe.
#[derive(Clone)]
pub enum StoreHandle {
    Connected(Arc<dyn ProductStore>),
    Unavailable { reason: String },
}

impl StoreHandle {
    /// Capture a probe result. Failures are logged and kept as the reason.
    pub fn resolve(probe: Result<Arc<dyn ProductStore>>) -> Self {
        match probe {
            Ok(store) => {
                tracing::info!("product store connected");
                StoreHandle::Connected(store)
            }
            Err(e) => {
                let reason = format!("{:#}", e);
                tracing::warn!(%reason, "product store unavailable, using fallback catalog");
                StoreHandle::Unavailable { reason }
            }
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        StoreHandle::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, StoreHandle::Connected(_))
    }

    pub fn store(&self) -> Option<&Arc<dyn ProductStore>> {
        match self {
            StoreHandle::Connected(store) => Some(store),
            StoreHandle::Unavailable { .. } => None,
        }
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match self {
            StoreHandle::Connected(_) => None,
            StoreHandle::Unavailable { reason } => Some(reason),
        }
    }
}

impl std::fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreHandle::Connected(_) => f.write_str("StoreHandle::Connected"),
            StoreHandle::Unavailable { reason } => f
                .debug_struct("StoreHandle::Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}
