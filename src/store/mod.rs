//! Asynchronous key-value store contract.
//!
//! Every store operation may suspend, even for purely in-memory backends,
//! so callers can swap the embedded store for a networked one without
//! changing call sites.
//!
//! - [`LruStore`] - In-memory store over a [`SizeAwareLru`](crate::cache::SizeAwareLru)
//! - [`KeyedStore`] - Namespaced, serializing adapter over a string backend
//! - [`DocumentCacheFactory`] - Builds the default parsed-document store

pub mod document;
pub mod keyed;
pub mod memory;

pub use document::{
    create_document_store, DocumentCacheFactory, DEFAULT_MAX_SIZE_BYTES, DEFAULT_NAMESPACE,
};
pub use keyed::{validate_namespace, Envelope, KeyedStore};
pub use memory::LruStore;

use std::time::Duration;

use async_trait::async_trait;

use crate::DocstoreResult;

/// Trait for pluggable key-value stores.
///
/// The `ttl` argument of [`Store::set`] is part of the contract so stores
/// that support expiry can honour it; size-bounded stores may ignore it.
#[async_trait]
pub trait Store<V>: Send + Sync {
    /// Returns the value stored under `key`, or `None` on a miss.
    async fn get(&self, key: &str) -> DocstoreResult<Option<V>>;

    /// Stores `value` under `key`.
    async fn set(&self, key: &str, value: V, ttl: Option<Duration>) -> DocstoreResult<()>;

    /// Removes `key`, returning whether it was present.
    async fn delete(&self, key: &str) -> DocstoreResult<bool>;

    /// Removes every entry.
    async fn clear(&self) -> DocstoreResult<()>;

    /// Whether a live entry exists under `key`.
    async fn has(&self, key: &str) -> DocstoreResult<bool>;

    /// Total measured size of the stored entries, if the store tracks it.
    async fn total_size(&self) -> DocstoreResult<Option<u64>> {
        Ok(None)
    }

    /// Snapshot of all keys, if the store can enumerate them.
    async fn keys(&self) -> DocstoreResult<Option<Vec<String>>> {
        Ok(None)
    }
}
