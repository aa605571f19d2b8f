//! Serving-instance integration of the document store.
//!
//! - [`mode`] - Resolution of the caller's store option into an operating mode
//! - [`pipeline`] - Per-request hash, lookup, parse and write-through flow

pub mod mode;
pub mod pipeline;

pub use mode::{DocumentStoreOption, OperatingMode};
pub use pipeline::{
    CacheOutcome, DocumentPipeline, HashFn, ParseFn, PipelineStats, ResolvedDocument,
};
