//! Configuração do docstore.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::store::document::{DEFAULT_MAX_SIZE_BYTES, DEFAULT_NAMESPACE};
use crate::{DocstoreError, DocstoreResult};

/// Configuração principal do docstore.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Configurações gerais.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Configurações do document store.
    #[serde(default)]
    pub document_store: DocumentStoreConfig,
}

/// Configurações gerais.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Nível de log (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Formato de log (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Como o document store é fornecido à instância do servidor.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreMode {
    /// Store LRU embutido, limitado por tamanho.
    #[default]
    Embedded,
    /// Sem cache.
    Disabled,
}

/// Configurações do document store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentStoreConfig {
    /// Modo de operação.
    #[serde(default)]
    pub mode: StoreMode,

    /// Orçamento total em bytes do store embutido.
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: u64,

    /// Namespace prefixado em todas as chaves.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for DocumentStoreConfig {
    fn default() -> Self {
        Self {
            mode: StoreMode::default(),
            max_size_bytes: default_max_size_bytes(),
            namespace: default_namespace(),
        }
    }
}

fn default_max_size_bytes() -> u64 {
    DEFAULT_MAX_SIZE_BYTES as u64
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl DocumentStoreConfig {
    /// Valida as configurações usadas para construir o store embutido.
    pub fn validate(&self) -> DocstoreResult<()> {
        if self.max_size_bytes == 0 {
            return Err(DocstoreError::config(
                "document_store.max_size_bytes must be greater than zero",
            ));
        }
        if usize::try_from(self.max_size_bytes).is_err() {
            return Err(DocstoreError::config(format!(
                "document_store.max_size_bytes {} does not fit in memory on this platform",
                self.max_size_bytes
            )));
        }
        crate::store::validate_namespace(&self.namespace)
    }
}

impl Config {
    /// Carrega configuração de um arquivo TOML.
    pub fn load<P: AsRef<Path>>(path: P) -> DocstoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Salva configuração em um arquivo TOML.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> DocstoreResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
