//! In-memory store backed by the size-aware LRU.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::cache::{SetOutcome, SizeAwareLru};
use crate::DocstoreResult;

use super::Store;

/// [`Store`] implementation over a single [`SizeAwareLru`].
///
/// The lock is only ever held across synchronous cache calls, so every
/// operation is applied entirely or, if the caller is cancelled while
/// waiting for the lock, not at all.
pub struct LruStore<V> {
    cache: Mutex<SizeAwareLru<String, V>>,
}

impl<V: Clone + Send + Sync + 'static> LruStore<V> {
    /// Creates a store with the given size budget and size function.
    pub fn new<F>(max_size: usize, size_of: F) -> Self
    where
        F: Fn(&V) -> usize + Send + Sync + 'static,
    {
        Self {
            cache: Mutex::new(SizeAwareLru::new(max_size, size_of)),
        }
    }

    /// Stores a value and reports whether it was admitted.
    pub async fn insert(&self, key: &str, value: V) -> SetOutcome {
        self.cache.lock().await.set(key.to_string(), value)
    }

    /// Snapshot of the stored keys, most recently used first.
    pub async fn key_snapshot(&self) -> Vec<String> {
        self.cache.lock().await.keys().collect()
    }

    /// Sum of the measured sizes of all entries.
    pub async fn size(&self) -> usize {
        self.cache.lock().await.total_size()
    }

    /// Configured size budget.
    pub async fn max_size(&self) -> usize {
        self.cache.lock().await.max_size()
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.cache.lock().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.cache.lock().await.is_empty()
    }
}

#[async_trait]
impl<V: Clone + Send + Sync + 'static> Store<V> for LruStore<V> {
    async fn get(&self, key: &str) -> DocstoreResult<Option<V>> {
        Ok(self.cache.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: V, _ttl: Option<Duration>) -> DocstoreResult<()> {
        self.insert(key, value).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> DocstoreResult<bool> {
        Ok(self.cache.lock().await.delete(key))
    }

    async fn clear(&self) -> DocstoreResult<()> {
        self.cache.lock().await.clear();
        Ok(())
    }

    async fn has(&self, key: &str) -> DocstoreResult<bool> {
        Ok(self.cache.lock().await.contains(key))
    }

    async fn total_size(&self) -> DocstoreResult<Option<u64>> {
        Ok(Some(self.size().await as u64))
    }

    async fn keys(&self) -> DocstoreResult<Option<Vec<String>>> {
        Ok(Some(self.key_snapshot().await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn store(max_size: usize) -> LruStore<String> {
        LruStore::new(max_size, |v: &String| v.len())
    }

    #[tokio::test]
    async fn test_store_contract() {
        let store = store(100);

        assert_eq!(store.get("a").await.unwrap(), None);
        store.set("a", "alpha".to_string(), None).await.unwrap();

        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("alpha"));
        assert!(store.has("a").await.unwrap());
        assert_eq!(store.total_size().await.unwrap(), Some(5));

        assert!(store.delete("a").await.unwrap());
        assert!(!store.delete("a").await.unwrap());
        assert!(!store.has("a").await.unwrap());
    }

    #[tokio::test]
    async fn test_ttl_is_ignored() {
        let store = store(100);
        store
            .set("a", "alpha".to_string(), Some(Duration::from_millis(0)))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(store.has("a").await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_and_keys() {
        let store = store(100);
        store.set("a", "1".to_string(), None).await.unwrap();
        store.set("b", "2".to_string(), None).await.unwrap();

        let mut keys = store.keys().await.unwrap().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);

        store.clear().await.unwrap();
        assert!(store.is_empty().await);
        assert_eq!(store.size().await, 0);
    }

    #[tokio::test]
    async fn test_insert_reports_rejection() {
        let store = store(3);
        assert!(store.insert("a", "abc".to_string()).await.is_stored());
        assert!(!store.insert("b", "abcd".to_string()).await.is_stored());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_writers_keep_accounting_consistent() {
        let store = Arc::new(store(64));
        let mut handles = Vec::new();

        for task in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                for i in 0..100 {
                    let key = format!("k{}", (task + i) % 12);
                    store.set(&key, "v".repeat(i % 9), None).await.unwrap();
                    let _ = store.get(&key).await.unwrap();
                    if i % 7 == 0 {
                        store.delete(&key).await.unwrap();
                    }
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let mut live = 0;
        for key in store.key_snapshot().await {
            if let Some(value) = store.get(&key).await.unwrap() {
                live += value.len();
            }
        }
        assert_eq!(store.size().await, live);
        assert!(store.size().await <= store.max_size().await);
    }
}
