//! Factory for the default parsed-document store.
//!
//! The embedded store keeps roughly 30 MiB of documents. Sizes are measured
//! as the JSON-encoded length of each serialized envelope, which
//! approximates memory use without accounting for allocator overhead or
//! in-memory AST layout.

use std::sync::Arc;

use crate::cache::json_byte_len;
use crate::graphql::Document;
use crate::types::config::DocumentStoreConfig;
use crate::DocstoreResult;

use super::{KeyedStore, LruStore};

/// Default total byte budget (30 MiB).
pub const DEFAULT_MAX_SIZE_BYTES: usize = 30 * (1 << 20);

/// Default key namespace.
pub const DEFAULT_NAMESPACE: &str = "apollo";

/// Builds [`KeyedStore`]s for parsed documents.
#[derive(Debug, Clone)]
pub struct DocumentCacheFactory {
    max_size: usize,
    namespace: String,
}

impl Default for DocumentCacheFactory {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE_BYTES,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl DocumentCacheFactory {
    /// Factory with the default budget and namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory built from validated configuration.
    pub fn from_config(config: &DocumentStoreConfig) -> DocstoreResult<Self> {
        config.validate()?;
        // validate() guarantees the budget fits in usize
        let max_size = usize::try_from(config.max_size_bytes).unwrap_or(usize::MAX);
        Ok(Self {
            max_size,
            namespace: config.namespace.clone(),
        })
    }

    /// Overrides the byte budget.
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Overrides the namespace.
    pub fn with_namespace<S: Into<String>>(mut self, namespace: S) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Creates a fresh store with its own LRU backend.
    pub fn create(&self) -> DocstoreResult<KeyedStore<Document>> {
        let backend = Arc::new(self.create_backend());
        KeyedStore::new(self.namespace.clone(), backend)
    }

    /// Creates only the LRU backend, sized for serialized envelopes.
    pub fn create_backend(&self) -> LruStore<String> {
        LruStore::new(self.max_size, |serialized: &String| {
            json_byte_len(serialized)
        })
    }

    /// Configured byte budget.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Configured namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

/// Creates the default document store.
pub fn create_document_store() -> DocstoreResult<KeyedStore<Document>> {
    DocumentCacheFactory::new().create()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphql::parse;
    use crate::store::Store;

    #[test]
    fn test_default_budget() {
        let factory = DocumentCacheFactory::new();
        assert_eq!(factory.max_size(), 31_457_280);
        assert_eq!(factory.namespace(), "apollo");
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let config = DocumentStoreConfig {
            max_size_bytes: 0,
            ..Default::default()
        };
        assert!(DocumentCacheFactory::from_config(&config).is_err());
    }

    #[test]
    fn test_reference_document_size() {
        tokio_test::block_on(async {
            let store = create_document_store().unwrap();
            let document = parse("query { hello }").unwrap();

            store.set("h", document.clone(), None).await.unwrap();

            assert_eq!(store.total_size().await.unwrap(), Some(508));
            assert_eq!(store.get("h").await.unwrap(), Some(document));
        });
    }

    #[test]
    fn test_small_budget_evicts_documents() {
        tokio_test::block_on(async {
            let store = DocumentCacheFactory::new().with_max_size(1024).create().unwrap();

            store.set("a", parse("{ a }").unwrap(), None).await.unwrap();
            store.set("b", parse("{ b }").unwrap(), None).await.unwrap();
            store.set("c", parse("{ c }").unwrap(), None).await.unwrap();

            let total = store.total_size().await.unwrap().unwrap();
            assert!(total <= 1024);
            assert!(!store.has("a").await.unwrap());
            assert!(store.has("c").await.unwrap());
        });
    }

    #[test]
    fn test_oversize_document_not_stored() {
        tokio_test::block_on(async {
            let store = DocumentCacheFactory::new().with_max_size(100).create().unwrap();

            store.set("h", parse("query { hello }").unwrap(), None).await.unwrap();

            assert!(!store.has("h").await.unwrap());
            assert_eq!(store.total_size().await.unwrap(), Some(0));
        });
    }
}
