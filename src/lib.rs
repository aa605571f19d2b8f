//! # docstore
//!
//! Size-aware LRU cache for parsed GraphQL documents.
//!
//! A serving process hashes each incoming query, looks the hash up in the
//! document store and only parses on a miss, writing the parsed document
//! back for the next request.
//!
//! ## Modules
//!
//! - [`cache`] - Size-bounded LRU eviction engine
//! - [`store`] - Async store contract, namespaced adapter and default factory
//! - [`server`] - Operating mode resolution and the per-request pipeline
//! - [`graphql`] - Default parser and query hash
//! - [`cli`] - Command line interface
//! - [`types`] - Shared types

pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod graphql;
pub mod server;
pub mod store;
pub mod types;

pub use types::config::Config;
pub use types::errors::{DocstoreError, DocstoreResult};
