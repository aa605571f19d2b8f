//! Document store operating modes.

use std::fmt;
use std::sync::Arc;

use crate::graphql::Document;
use crate::store::{DocumentCacheFactory, KeyedStore, Store};
use crate::types::config::{DocumentStoreConfig, StoreMode};
use crate::DocstoreResult;

/// Document store requested by the caller of a serving instance.
#[derive(Clone, Default)]
pub enum DocumentStoreOption {
    /// Nothing specified: build the embedded store.
    #[default]
    Default,

    /// Caller-supplied store, used as given.
    Custom(Arc<dyn Store<Document>>),

    /// Caching explicitly turned off.
    Disabled,
}

impl DocumentStoreOption {
    /// Option described by the configuration file.
    ///
    /// A custom store can only be supplied programmatically.
    pub fn from_config(config: &DocumentStoreConfig) -> Self {
        match config.mode {
            StoreMode::Embedded => DocumentStoreOption::Default,
            StoreMode::Disabled => DocumentStoreOption::Disabled,
        }
    }
}

impl fmt::Debug for DocumentStoreOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentStoreOption::Default => write!(f, "Default"),
            DocumentStoreOption::Custom(_) => write!(f, "Custom(..)"),
            DocumentStoreOption::Disabled => write!(f, "Disabled"),
        }
    }
}

/// Resolved document store mode, fixed for the lifetime of a serving instance.
#[derive(Clone)]
pub enum OperatingMode {
    /// Fresh embedded LRU store.
    EmbeddedDefault(Arc<KeyedStore<Document>>),

    /// Caller-supplied store.
    CustomStore(Arc<dyn Store<Document>>),

    /// No store: every lookup misses and nothing is written.
    Disabled,
}

impl OperatingMode {
    /// Resolves the caller's option.
    ///
    /// Configuration problems surface here, at startup, never on a request.
    pub fn resolve(
        option: DocumentStoreOption,
        config: &DocumentStoreConfig,
    ) -> DocstoreResult<Self> {
        let mode = match option {
            DocumentStoreOption::Default => {
                let factory = DocumentCacheFactory::from_config(config)?;
                OperatingMode::EmbeddedDefault(Arc::new(factory.create()?))
            }
            DocumentStoreOption::Custom(store) => OperatingMode::CustomStore(store),
            DocumentStoreOption::Disabled => OperatingMode::Disabled,
        };

        tracing::info!(mode = mode.name(), "Document store mode resolved");
        Ok(mode)
    }

    /// Resolves the mode described by the configuration file.
    pub fn from_config(config: &DocumentStoreConfig) -> DocstoreResult<Self> {
        Self::resolve(DocumentStoreOption::from_config(config), config)
    }

    /// Active store, `None` when caching is disabled.
    pub fn store(&self) -> Option<Arc<dyn Store<Document>>> {
        match self {
            OperatingMode::EmbeddedDefault(store) => Some(store.clone() as Arc<dyn Store<Document>>),
            OperatingMode::CustomStore(store) => Some(Arc::clone(store)),
            OperatingMode::Disabled => None,
        }
    }

    /// Whether documents are cached.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, OperatingMode::Disabled)
    }

    /// Short label used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            OperatingMode::EmbeddedDefault(_) => "embedded",
            OperatingMode::CustomStore(_) => "custom",
            OperatingMode::Disabled => "disabled",
        }
    }
}

impl fmt::Debug for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LruStore;
    use crate::DocstoreError;

    #[test]
    fn test_default_resolves_to_embedded() {
        let mode =
            OperatingMode::resolve(DocumentStoreOption::Default, &DocumentStoreConfig::default())
                .unwrap();
        assert!(matches!(mode, OperatingMode::EmbeddedDefault(_)));
        assert!(mode.is_enabled());
        assert!(mode.store().is_some());
    }

    #[test]
    fn test_custom_is_used_as_given() {
        let backend: Arc<dyn Store<String>> =
            Arc::new(LruStore::new(1024, |v: &String| v.len()));
        let custom: Arc<dyn Store<Document>> = Arc::new(KeyedStore::new("custom", backend).unwrap());

        let mode = OperatingMode::resolve(
            DocumentStoreOption::Custom(custom.clone()),
            &DocumentStoreConfig::default(),
        )
        .unwrap();

        let store = mode.store().unwrap();
        assert!(Arc::ptr_eq(&store, &custom));
        assert_eq!(mode.name(), "custom");
    }

    #[test]
    fn test_disabled_has_no_store() {
        let mode =
            OperatingMode::resolve(DocumentStoreOption::Disabled, &DocumentStoreConfig::default())
                .unwrap();
        assert!(mode.store().is_none());
        assert!(!mode.is_enabled());
    }

    #[test]
    fn test_invalid_config_fails_at_resolution() {
        let config = DocumentStoreConfig {
            namespace: String::new(),
            ..Default::default()
        };
        let result = OperatingMode::resolve(DocumentStoreOption::Default, &config);
        assert!(matches!(result, Err(DocstoreError::Config(_))));
    }

    #[test]
    fn test_from_config() {
        let config = DocumentStoreConfig {
            mode: StoreMode::Disabled,
            ..Default::default()
        };
        assert!(matches!(
            OperatingMode::from_config(&config).unwrap(),
            OperatingMode::Disabled
        ));
        assert!(matches!(
            DocumentStoreOption::from_config(&DocumentStoreConfig::default()),
            DocumentStoreOption::Default
        ));
    }
}
