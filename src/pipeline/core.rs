use crate::error::IngestResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

use super::document::Document;

/// A single stage in a pipeline
///
/// Each stage performs one transformation on the document. Stages are run in
/// order by a [`CompoundStage`](super::CompoundStage), which is itself a stage.
///
/// # Example
/// ```
/// use ingest_pipeline::error::IngestResult;
/// use ingest_pipeline::pipeline::{Document, PipelineStage};
///
/// struct Uppercase;
///
/// impl PipelineStage for Uppercase {
///     fn execute(&self, document: &mut Document) -> IngestResult<()> {
///         let input = document.get_string("message")?;
///         document.set_string("message", input.to_uppercase());
///         Ok(())
///     }
///
///     fn type_tag(&self) -> &str {
///         "uppercase"
///     }
/// }
/// ```
pub trait PipelineStage: Send + Sync {
    /// Execute this stage
    ///
    /// The stage may mutate the document's payload. Returning an error stops the
    /// enclosing sequence and hands control to its fallback stages, if any.
    fn execute(&self, document: &mut Document) -> IngestResult<()>;

    /// Stable tag identifying the stage kind, used in failure metadata and logs
    fn type_tag(&self) -> &str;
}

/// Result of a complete pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    /// Pipeline id
    pub pipeline_id: String,

    /// Whether the pipeline succeeded
    pub success: bool,

    /// Error message if failed
    pub error: Option<String>,

    /// Tag of the last stage that failed during this run, recovered or not
    pub failed_stage: Option<String>,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Total duration
    pub duration: Duration,
}

impl PipelineResult {
    /// Create a successful pipeline result
    pub fn success(
        pipeline_id: impl Into<String>,
        failed_stage: Option<String>,
        started_at: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            success: true,
            error: None,
            failed_stage,
            started_at,
            duration,
        }
    }

    /// Create a failed pipeline result
    pub fn failure(
        pipeline_id: impl Into<String>,
        error: impl Into<String>,
        failed_stage: Option<String>,
        started_at: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            success: false,
            error: Some(error.into()),
            failed_stage,
            started_at,
            duration,
        }
    }

    /// Whether a stage failed and a fallback chain absorbed it
    pub fn recovered(&self) -> bool {
        self.success && self.failed_stage.is_some()
    }
}
