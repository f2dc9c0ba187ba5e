use super::compound::{CompoundStage, CompoundStageBuilder};
use super::core::{PipelineResult, PipelineStage};
use super::document::Document;
use crate::error::{IngestError, IngestResult};
use chrono::Utc;
use std::time::Instant;
use tracing::{info, warn};

/// Named pipeline wrapping one compound stage
///
/// # Example
/// ```
/// use ingest_pipeline::pipeline::{Document, FnStage, Pipeline};
///
/// let pipeline = Pipeline::builder("normalize")
///     .description("lowercases the name field")
///     .add_stage(FnStage::new("lowercase", |document: &mut Document| {
///         let name = document.get_string("name")?;
///         document.set_string("name", name.to_lowercase());
///         Ok(())
///     }))
///     .build()
///     .unwrap();
///
/// let mut document = Document::new();
/// document.set_string("name", "Ingest");
/// let result = pipeline.run(&mut document);
/// assert!(result.success);
/// ```
#[derive(Debug)]
pub struct Pipeline {
    id: String,
    description: Option<String>,
    compound: CompoundStage,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder(id: impl Into<String>) -> PipelineBuilder {
        PipelineBuilder::new(id)
    }

    /// Get the pipeline id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the pipeline description
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The compound stage driving this pipeline
    pub fn compound(&self) -> &CompoundStage {
        &self.compound
    }

    /// Execute the pipeline, propagating any unrecovered failure
    pub fn execute(&self, document: &mut Document) -> IngestResult<()> {
        self.compound.execute(document)
    }

    /// Execute the pipeline and report the outcome instead of returning an error
    pub fn run(&self, document: &mut Document) -> PipelineResult {
        info!(
            pipeline = %self.id,
            stages = self.compound.stage_count(),
            on_failure_stages = self.compound.on_failure_stages().len(),
            "starting pipeline"
        );

        let failures_before = document.failure_count();
        let started_at = Utc::now();
        let start = Instant::now();
        let outcome = self.execute(document);
        let duration = start.elapsed();
        let elapsed_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);

        // Metadata left by an earlier run is not this run's failure.
        let failed_stage = if document.failure_count() > failures_before {
            document.failure_tag().map(str::to_string)
        } else {
            None
        };

        match outcome {
            Ok(()) => {
                info!(
                    pipeline = %self.id,
                    elapsed_ms,
                    recovered_from = failed_stage.as_deref().unwrap_or("-"),
                    "pipeline completed"
                );
                PipelineResult::success(&self.id, failed_stage, started_at, duration)
            }
            Err(e) => {
                let error_msg = e.to_string();
                warn!(
                    pipeline = %self.id,
                    elapsed_ms,
                    stage = failed_stage.as_deref().unwrap_or("-"),
                    error = %error_msg,
                    "pipeline failed"
                );
                PipelineResult::failure(&self.id, error_msg, failed_stage, started_at, duration)
            }
        }
    }
}

/// Builder for constructing pipelines
pub struct PipelineBuilder {
    id: String,
    description: Option<String>,
    compound: CompoundStageBuilder,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: None,
            compound: CompoundStage::builder(),
        }
    }

    /// Set the pipeline description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a stage to the pipeline
    pub fn add_stage<S: PipelineStage + 'static>(mut self, stage: S) -> Self {
        self.compound = self.compound.add_stage(stage);
        self
    }

    /// Add a boxed stage to the pipeline
    pub fn add_boxed_stage(mut self, stage: Box<dyn PipelineStage>) -> Self {
        self.compound = self.compound.add_boxed_stage(stage);
        self
    }

    /// Add a pipeline-level fallback stage
    pub fn add_on_failure_stage<S: PipelineStage + 'static>(mut self, stage: S) -> Self {
        self.compound = self.compound.add_on_failure_stage(stage);
        self
    }

    /// Add a boxed pipeline-level fallback stage
    pub fn add_boxed_on_failure_stage(mut self, stage: Box<dyn PipelineStage>) -> Self {
        self.compound = self.compound.add_boxed_on_failure_stage(stage);
        self
    }

    /// Build the pipeline
    pub fn build(self) -> IngestResult<Pipeline> {
        if self.id.trim().is_empty() {
            return Err(IngestError::BuilderError(
                "pipeline id must not be empty".to_string(),
            ));
        }

        Ok(Pipeline {
            id: self.id,
            description: self.description,
            compound: self.compound.build(),
        })
    }
}
