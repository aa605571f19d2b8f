//! Tipos compartilhados do docstore.

pub mod config;
pub mod errors;
