//! Size-aware LRU eviction engine.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use lru::LruCache;
use serde::Serialize;

/// Function measuring the size of a value, in bytes.
pub type SizeFn<V> = Arc<dyn Fn(&V) -> usize + Send + Sync>;

/// Measures a value as the UTF-8 length of its compact JSON serialization.
///
/// This approximates the memory footprint; it does not account for
/// allocator overhead. Values that fail to serialize measure as
/// `usize::MAX` and are therefore never admitted.
pub fn json_byte_len<T: Serialize + ?Sized>(value: &T) -> usize {
    serde_json::to_vec(value)
        .map(|bytes| bytes.len())
        .unwrap_or(usize::MAX)
}

/// Cached value plus its measured size.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// Stored value.
    pub value: V,

    /// Size computed when the value was stored.
    pub size: usize,
}

/// Result of a [`SizeAwareLru::set`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// Value stored; `evicted` older entries were dropped to make room.
    Stored { evicted: usize },

    /// Value larger than the whole budget; nothing stored.
    Rejected { size: usize },
}

impl SetOutcome {
    /// Whether the value ended up in the cache.
    pub fn is_stored(&self) -> bool {
        matches!(self, SetOutcome::Stored { .. })
    }
}

/// LRU cache bounded by the total size of its entries instead of their count.
///
/// The running total equals the sum of all entry sizes after every
/// mutating call, and never exceeds `max_size`.
pub struct SizeAwareLru<K: Hash + Eq, V> {
    entries: LruCache<K, CacheEntry<V>>,
    max_size: usize,
    total_size: usize,
    size_of: SizeFn<V>,
}

impl<K: Hash + Eq + Clone, V> SizeAwareLru<K, V> {
    /// Creates an empty cache.
    ///
    /// # Arguments
    /// - `max_size`: Total size budget
    /// - `size_of`: Per-entry size function
    pub fn new<F>(max_size: usize, size_of: F) -> Self
    where
        F: Fn(&V) -> usize + Send + Sync + 'static,
    {
        Self {
            entries: LruCache::unbounded(),
            max_size,
            total_size: 0,
            size_of: Arc::new(size_of),
        }
    }

    /// Looks a key up, marking it most-recently-used on a hit.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Looks a key up without touching recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.peek(key).map(|entry| &entry.value)
    }

    /// Whether the key is present. Does not touch recency.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains(key)
    }

    /// Inserts or replaces a value, then evicts until within budget.
    ///
    /// A value larger than the budget is rejected. Any entry already stored
    /// under the same key is removed in that case, as it no longer reflects
    /// the latest write.
    pub fn set(&mut self, key: K, value: V) -> SetOutcome {
        let size = (self.size_of)(&value);

        if size > self.max_size {
            self.delete(&key);
            tracing::debug!(
                size,
                max_size = self.max_size,
                "Rejecting entry larger than cache budget"
            );
            return SetOutcome::Rejected { size };
        }

        if let Some(previous) = self.entries.put(key, CacheEntry { value, size }) {
            self.total_size -= previous.size;
        }
        self.total_size += size;

        let mut evicted = 0;
        while self.total_size > self.max_size {
            // The entry just written is most recent and fits on its own,
            // so the loop stops before reaching it.
            match self.entries.pop_lru() {
                Some((_, entry)) => {
                    self.total_size -= entry.size;
                    evicted += 1;
                }
                None => break,
            }
        }

        if evicted > 0 {
            tracing::debug!(
                evicted,
                total_size = self.total_size,
                "Evicted least recently used entries"
            );
        }

        SetOutcome::Stored { evicted }
    }

    /// Removes a key. Returns whether anything was removed.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.entries.pop(key) {
            Some(entry) => {
                self.total_size -= entry.size;
                true
            }
            None => false,
        }
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.total_size = 0;
    }

    /// Snapshot of the current keys, most recently used first.
    ///
    /// The snapshot is taken when this is called; mutations made while
    /// iterating are not reflected.
    pub fn keys(&self) -> std::vec::IntoIter<K> {
        self.entries
            .iter()
            .map(|(key, _)| key.clone())
            .collect::<Vec<_>>()
            .into_iter()
    }

    /// Sum of the sizes of all entries.
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// Configured budget.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Hash + Eq, V> fmt::Debug for SizeAwareLru<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SizeAwareLru")
            .field("len", &self.entries.len())
            .field("total_size", &self.total_size)
            .field("max_size", &self.max_size)
            .finish()
    }
}
