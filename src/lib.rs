//! In-process ingest pipelines with fallback chains.

pub mod error;
pub mod pipeline;

pub use error::{IngestError, IngestResult};
pub use pipeline::{CompoundStage, Document, FnStage, Pipeline, PipelineStage};
