//! Runtime — job table, artifact storage and the conversion pipeline.
//!
//! The [`Processor`] sequences validation, extraction and generation for each
//! upload and keeps every job's status in a lock-guarded [`JobStore`] with a
//! bounded lifetime.

pub mod artifacts;
pub mod jobs;
pub mod processor;
pub mod types;

pub use artifacts::{output_filename, ArtifactStore};
pub use jobs::JobStore;
pub use processor::Processor;
pub use types::*;
