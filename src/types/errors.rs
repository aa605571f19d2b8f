//! Tipos de erro do docstore.

use thiserror::Error;

/// Tipo de resultado padrão do docstore.
pub type DocstoreResult<T> = Result<T, DocstoreError>;

/// Erros possíveis no docstore.
#[derive(Error, Debug)]
pub enum DocstoreError {
    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Erro de IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro ao parsear TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Erro ao serializar TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Erro de JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Erro no backend do store: {0}")]
    Store(String),

    #[error("Erro de sintaxe na posição {position}: {message}")]
    Syntax { message: String, position: usize },

    #[error("{0}")]
    Other(String),
}

impl DocstoreError {
    /// Cria um erro genérico.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Cria um erro de configuração.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Cria um erro de backend do store.
    pub fn store<S: Into<String>>(msg: S) -> Self {
        Self::Store(msg.into())
    }

    /// Cria um erro de sintaxe numa posição (em bytes) do texto da query.
    pub fn syntax<S: Into<String>>(message: S, position: usize) -> Self {
        Self::Syntax {
            message: message.into(),
            position,
        }
    }
}
