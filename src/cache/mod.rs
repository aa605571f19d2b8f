//! Size-aware LRU cache.
//!
//! The eviction engine behind the embedded document store. Entries are
//! bounded by the sum of their measured sizes rather than their count.

mod lru;

pub use lru::{json_byte_len, CacheEntry, SetOutcome, SizeAwareLru, SizeFn};
