//! Request-side use of the document store.
//!
//! For each query the pipeline hashes the text, asks the active store for a
//! cached document and, on a miss, parses the query and writes the result
//! back. Store failures only cost the cache hit; they never fail the
//! request.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::graphql::{self, Document};
use crate::DocstoreResult;

use super::mode::OperatingMode;

/// Computes the cache key of a query.
pub type HashFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Parses (and optionally validates) a query.
pub type ParseFn = Arc<dyn Fn(&str) -> DocstoreResult<Document> + Send + Sync>;

/// How a document was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Served from the store.
    Hit,
    /// Parsed, then written to the store.
    Miss,
    /// Parsed with caching disabled.
    Bypassed,
}

/// Parsed document plus how it was obtained.
#[derive(Debug, Clone)]
pub struct ResolvedDocument {
    pub document: Document,
    pub outcome: CacheOutcome,
}

/// Pipeline counters.
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    pub hits: u64,
    pub misses: u64,
    pub bypassed: u64,
}

impl PipelineStats {
    /// Share of cached lookups that hit.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Resolves query text into parsed documents through the active store.
pub struct DocumentPipeline {
    mode: OperatingMode,
    hasher: HashFn,
    parser: ParseFn,
    hits: AtomicU64,
    misses: AtomicU64,
    bypassed: AtomicU64,
}

impl DocumentPipeline {
    /// Creates a pipeline using the built-in hasher and parser.
    pub fn new(mode: OperatingMode) -> Self {
        Self {
            mode,
            hasher: Arc::new(graphql::query_hash),
            parser: Arc::new(graphql::parse),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            bypassed: AtomicU64::new(0),
        }
    }

    /// Replaces the hash function.
    pub fn with_hasher<F>(mut self, hasher: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.hasher = Arc::new(hasher);
        self
    }

    /// Replaces the parse function.
    pub fn with_parser<F>(mut self, parser: F) -> Self
    where
        F: Fn(&str) -> DocstoreResult<Document> + Send + Sync + 'static,
    {
        self.parser = Arc::new(parser);
        self
    }

    /// Active mode.
    pub fn mode(&self) -> &OperatingMode {
        &self.mode
    }

    /// Returns the parsed document for `query`.
    ///
    /// Parse errors are returned; nothing is cached for them.
    pub async fn document(&self, query: &str) -> DocstoreResult<ResolvedDocument> {
        let Some(store) = self.mode.store() else {
            self.bypassed.fetch_add(1, Ordering::Relaxed);
            return Ok(ResolvedDocument {
                document: (self.parser)(query)?,
                outcome: CacheOutcome::Bypassed,
            });
        };

        let hash = (self.hasher)(query);

        match store.get(&hash).await {
            Ok(Some(document)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(hash = %hash, "Document cache hit");
                return Ok(ResolvedDocument {
                    document,
                    outcome: CacheOutcome::Hit,
                });
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(hash = %hash, error = %e, "Document store read failed, parsing instead");
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let document = (self.parser)(query)?;

        if let Err(e) = store.set(&hash, document.clone(), None).await {
            tracing::warn!(hash = %hash, error = %e, "Failed to cache parsed document");
        } else {
            tracing::debug!(hash = %hash, "Document cached");
        }

        Ok(ResolvedDocument {
            document,
            outcome: CacheOutcome::Miss,
        })
    }

    /// Current counters.
    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            bypassed: self.bypassed.load(Ordering::Relaxed),
        }
    }

    /// Total measured size of the active store, if it reports one.
    pub async fn store_size(&self) -> DocstoreResult<Option<u64>> {
        match self.mode.store() {
            Some(store) => store.total_size().await,
            None => Ok(None),
        }
    }
}

impl fmt::Debug for DocumentPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentPipeline")
            .field("mode", &self.mode)
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::DocumentStoreOption;
    use crate::store::Store;
    use crate::types::config::DocumentStoreConfig;
    use crate::DocstoreError;
    use async_trait::async_trait;
    use std::time::Duration;

    /// Store whose every call fails.
    struct BrokenStore;

    #[async_trait]
    impl Store<Document> for BrokenStore {
        async fn get(&self, _key: &str) -> DocstoreResult<Option<Document>> {
            Err(DocstoreError::store("connection refused"))
        }
        async fn set(&self, _key: &str, _value: Document, _ttl: Option<Duration>) -> DocstoreResult<()> {
            Err(DocstoreError::store("connection refused"))
        }
        async fn delete(&self, _key: &str) -> DocstoreResult<bool> {
            Err(DocstoreError::store("connection refused"))
        }
        async fn clear(&self) -> DocstoreResult<()> {
            Err(DocstoreError::store("connection refused"))
        }
        async fn has(&self, _key: &str) -> DocstoreResult<bool> {
            Err(DocstoreError::store("connection refused"))
        }
    }

    fn embedded_pipeline() -> DocumentPipeline {
        let mode =
            OperatingMode::resolve(DocumentStoreOption::Default, &DocumentStoreConfig::default())
                .unwrap();
        DocumentPipeline::new(mode)
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let pipeline = embedded_pipeline();

        let first = pipeline.document("query { hello }").await.unwrap();
        let second = pipeline.document("query { hello }").await.unwrap();

        assert_eq!(first.outcome, CacheOutcome::Miss);
        assert_eq!(second.outcome, CacheOutcome::Hit);
        assert_eq!(first.document, second.document);

        let stats = pipeline.stats();
        assert_eq!((stats.hits, stats.misses, stats.bypassed), (1, 1, 0));
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
        assert_eq!(pipeline.store_size().await.unwrap(), Some(508));
    }

    #[tokio::test]
    async fn test_disabled_always_parses() {
        let pipeline = DocumentPipeline::new(OperatingMode::Disabled);

        for _ in 0..3 {
            let resolved = pipeline.document("{ hello }").await.unwrap();
            assert_eq!(resolved.outcome, CacheOutcome::Bypassed);
        }
        assert_eq!(pipeline.stats().bypassed, 3);
        assert_eq!(pipeline.store_size().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_broken_store_does_not_fail_requests() {
        let pipeline = DocumentPipeline::new(OperatingMode::CustomStore(Arc::new(BrokenStore)));

        let resolved = pipeline.document("{ hello }").await.unwrap();
        assert_eq!(resolved.outcome, CacheOutcome::Miss);
        let resolved = pipeline.document("{ hello }").await.unwrap();
        assert_eq!(resolved.outcome, CacheOutcome::Miss);
    }

    #[tokio::test]
    async fn test_deepest_accepted_query_is_served_from_cache() {
        let pipeline = embedded_pipeline();
        let depth = crate::graphql::MAX_NESTING_DEPTH;
        let query = format!("{}b{}", "{ a ".repeat(depth), " }".repeat(depth));

        let first = pipeline.document(&query).await.unwrap();
        let second = pipeline.document(&query).await.unwrap();

        assert_eq!(first.outcome, CacheOutcome::Miss);
        assert_eq!(second.outcome, CacheOutcome::Hit);
        assert_eq!(first.document, second.document);
    }

    #[tokio::test]
    async fn test_too_deep_query_is_an_error() {
        let pipeline = embedded_pipeline();
        let query = format!("{}b{}", "{ a ".repeat(10_000), " }".repeat(10_000));

        assert!(pipeline.document(&query).await.is_err());
        assert_eq!(pipeline.store_size().await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_parse_error_is_not_cached() {
        let pipeline = embedded_pipeline();

        assert!(pipeline.document("query {").await.is_err());
        assert_eq!(pipeline.store_size().await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_custom_hasher_controls_keys() {
        let pipeline = embedded_pipeline().with_hasher(|_| "same".to_string());

        pipeline.document("{ a }").await.unwrap();
        let resolved = pipeline.document("{ b }").await.unwrap();

        // Both queries map to one key, so the second is served from cache
        assert_eq!(resolved.outcome, CacheOutcome::Hit);
        assert!(matches!(
            &resolved.document.operations().next().unwrap().selection_set.selections[0],
            crate::graphql::Selection::Field(field) if field.name.value == "a"
        ));
    }

    #[tokio::test]
    async fn test_custom_parser_is_used() {
        let pipeline = DocumentPipeline::new(OperatingMode::Disabled)
            .with_parser(|_| Err(DocstoreError::other("validation failed")));

        let err = pipeline.document("{ a }").await.unwrap_err();
        assert!(err.to_string().contains("validation failed"));
    }
}
