//! Namespaced, serializing store adapter.
//!
//! Values are wrapped in an [`Envelope`] and serialized to JSON before they
//! reach the backend, which only ever sees strings under
//! `namespace:key`. Several adapters with different namespaces can share
//! one backend without observing each other's entries.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};

use crate::{DocstoreError, DocstoreResult};

use super::Store;

/// Serialized form of a stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<V> {
    /// Stored value.
    pub value: V,

    /// Expiry as milliseconds since the Unix epoch, `None` for no expiry.
    pub expires: Option<i64>,
}

impl<V> Envelope<V> {
    /// Wraps a value, computing its expiry from an optional TTL.
    pub fn new(value: V, ttl: Option<Duration>) -> Self {
        let expires = ttl.map(|ttl| {
            let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
            Utc::now().timestamp_millis().saturating_add(ttl_ms)
        });
        Self { value, expires }
    }

    /// Whether the envelope has expired.
    pub fn is_expired(&self) -> bool {
        self.expires
            .is_some_and(|expires| Utc::now().timestamp_millis() > expires)
    }
}

/// Checks that `namespace` can prefix backend keys without colliding with
/// another namespace.
pub fn validate_namespace(namespace: &str) -> DocstoreResult<()> {
    if namespace.is_empty() {
        return Err(DocstoreError::config("namespace must not be empty"));
    }
    if namespace.contains(':') {
        return Err(DocstoreError::config(format!(
            "namespace '{}' must not contain ':'",
            namespace
        )));
    }
    Ok(())
}

/// [`Store`] adapter applying a namespace and JSON envelopes.
pub struct KeyedStore<V> {
    namespace: String,
    backend: Arc<dyn Store<String>>,
    _value: PhantomData<fn() -> V>,
}

impl<V> KeyedStore<V>
where
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Creates an adapter over `backend` using `namespace`.
    ///
    /// Fails when the namespace is empty or contains `:`.
    pub fn new<S: Into<String>>(
        namespace: S,
        backend: Arc<dyn Store<String>>,
    ) -> DocstoreResult<Self> {
        let namespace = namespace.into();
        validate_namespace(&namespace)?;
        Ok(Self {
            namespace,
            backend,
            _value: PhantomData,
        })
    }

    /// Namespace of this adapter.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Shared backend.
    pub fn backend(&self) -> &Arc<dyn Store<String>> {
        &self.backend
    }

    /// Backend key for a logical key.
    pub fn backend_key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    async fn read_envelope<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> DocstoreResult<Option<Envelope<T>>> {
        let backend_key = self.backend_key(key);
        let Some(raw) = self.backend.get(&backend_key).await? else {
            return Ok(None);
        };

        let envelope: Envelope<T> = serde_json::from_str(&raw)?;
        if envelope.is_expired() {
            tracing::debug!(key = %backend_key, "Dropping expired entry");
            self.backend.delete(&backend_key).await?;
            return Ok(None);
        }
        Ok(Some(envelope))
    }
}

#[async_trait]
impl<V> Store<V> for KeyedStore<V>
where
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> DocstoreResult<Option<V>> {
        Ok(self
            .read_envelope::<V>(key)
            .await?
            .map(|envelope| envelope.value))
    }

    async fn set(&self, key: &str, value: V, ttl: Option<Duration>) -> DocstoreResult<()> {
        let serialized = serde_json::to_string(&Envelope::new(value, ttl))?;
        self.backend
            .set(&self.backend_key(key), serialized, ttl)
            .await
    }

    async fn delete(&self, key: &str) -> DocstoreResult<bool> {
        self.backend.delete(&self.backend_key(key)).await
    }

    async fn clear(&self) -> DocstoreResult<()> {
        let Some(keys) = self.backend.keys().await? else {
            return self.backend.clear().await;
        };

        let prefix = format!("{}:", self.namespace);
        for key in keys.iter().filter(|k| k.starts_with(&prefix)) {
            self.backend.delete(key).await?;
        }
        Ok(())
    }

    async fn has(&self, key: &str) -> DocstoreResult<bool> {
        Ok(self.read_envelope::<IgnoredAny>(key).await?.is_some())
    }

    async fn total_size(&self) -> DocstoreResult<Option<u64>> {
        self.backend.total_size().await
    }
}
