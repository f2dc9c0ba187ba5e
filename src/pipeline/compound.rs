use super::core::PipelineStage;
use super::document::Document;
use crate::error::{IngestError, IngestResult};
use tracing::{debug, warn};

/// Type tag reported by every compound stage
pub const COMPOUND_TYPE: &str = "compound";

/// Stage that runs a sequence of stages and diverts to fallback stages on failure
///
/// Stages run in insertion order. The first failure stops the sequence, is recorded
/// in the document's failure metadata, and then either propagates (no fallback
/// stages) or hands the document to the fallback stages. A compound stage is itself
/// a [`PipelineStage`], so fallback chains nest to any depth.
///
/// # Example
/// ```
/// use ingest_pipeline::pipeline::{CompoundStage, Document, FnStage, PipelineStage};
///
/// let compound = CompoundStage::builder()
///     .add_stage(FnStage::new("parse", |_: &mut Document| Err("unparseable".into())))
///     .add_on_failure_stage(FnStage::new("flag", |document: &mut Document| {
///         document.set_bool("parse_failed", true);
///         Ok(())
///     }))
///     .build();
///
/// let mut document = Document::new();
/// compound.execute(&mut document).unwrap();
/// assert_eq!(document.failure_tag(), Some("parse"));
/// assert!(document.get_bool("parse_failed").unwrap());
/// ```
#[derive(Default)]
pub struct CompoundStage {
    stages: Vec<Box<dyn PipelineStage>>,
    on_failure_stages: Vec<Box<dyn PipelineStage>>,
}

impl CompoundStage {
    /// Create a compound stage from its primary and fallback sequences
    pub fn new(
        stages: Vec<Box<dyn PipelineStage>>,
        on_failure_stages: Vec<Box<dyn PipelineStage>>,
    ) -> Self {
        Self {
            stages,
            on_failure_stages,
        }
    }

    /// Create a new compound stage builder
    pub fn builder() -> CompoundStageBuilder {
        CompoundStageBuilder::new()
    }

    /// Get the primary stages in execution order
    pub fn stages(&self) -> &[Box<dyn PipelineStage>] {
        &self.stages
    }

    /// Get the fallback stages in execution order
    pub fn on_failure_stages(&self) -> &[Box<dyn PipelineStage>] {
        &self.on_failure_stages
    }

    /// Get the number of primary stages
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Run `stages` in order, recording the first failure on the document
    ///
    /// Returns the failed stage's error after its failure has been recorded.
    fn run_sequence(
        stages: &[Box<dyn PipelineStage>],
        document: &mut Document,
        chain: &'static str,
    ) -> IngestResult<()> {
        for (index, stage) in stages.iter().enumerate() {
            let tag = stage.type_tag();
            debug!(stage = tag, index, chain, "executing stage");

            if let Err(error) = stage.execute(document) {
                let message = error.to_string();
                warn!(stage = tag, index, chain, error = %message, "stage failed");
                document.record_failure(message, tag);
                return Err(error);
            }
        }
        Ok(())
    }

    /// Run the fallback stages after `error` was raised by a primary stage
    fn execute_on_failure(&self, document: &mut Document, error: IngestError) -> IngestResult<()> {
        debug!(
            stages = self.on_failure_stages.len(),
            "entering on_failure chain"
        );

        Self::run_sequence(&self.on_failure_stages, document, "on_failure")
            .map_err(|fallback_error| fallback_error.with_cause(error))
    }
}

impl PipelineStage for CompoundStage {
    fn execute(&self, document: &mut Document) -> IngestResult<()> {
        match Self::run_sequence(&self.stages, document, "primary") {
            Ok(()) => Ok(()),
            Err(error) if self.on_failure_stages.is_empty() => Err(error),
            Err(error) => self.execute_on_failure(document, error),
        }
    }

    fn type_tag(&self) -> &str {
        COMPOUND_TYPE
    }
}

impl std::fmt::Debug for CompoundStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tags = |stages: &[Box<dyn PipelineStage>]| {
            stages.iter().map(|s| s.type_tag().to_string()).collect::<Vec<_>>()
        };
        f.debug_struct("CompoundStage")
            .field("stages", &tags(&self.stages))
            .field("on_failure_stages", &tags(&self.on_failure_stages))
            .finish()
    }
}

/// Builder for constructing compound stages
#[derive(Default)]
pub struct CompoundStageBuilder {
    stages: Vec<Box<dyn PipelineStage>>,
    on_failure_stages: Vec<Box<dyn PipelineStage>>,
}

impl CompoundStageBuilder {
    /// Create an empty compound stage builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a primary stage
    pub fn add_stage<S: PipelineStage + 'static>(mut self, stage: S) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Add a boxed primary stage
    pub fn add_boxed_stage(mut self, stage: Box<dyn PipelineStage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Add a fallback stage
    pub fn add_on_failure_stage<S: PipelineStage + 'static>(mut self, stage: S) -> Self {
        self.on_failure_stages.push(Box::new(stage));
        self
    }

    /// Add a boxed fallback stage
    pub fn add_boxed_on_failure_stage(mut self, stage: Box<dyn PipelineStage>) -> Self {
        self.on_failure_stages.push(stage);
        self
    }

    /// Build the compound stage
    pub fn build(self) -> CompoundStage {
        CompoundStage::new(self.stages, self.on_failure_stages)
    }
}
