use crate::error::IngestResult;
use crate::pipeline::{Document, PipelineStage};

/// Stage backed by a closure
///
/// # Example
/// ```
/// use ingest_pipeline::pipeline::{Document, FnStage, PipelineStage};
///
/// let stage = FnStage::new("lowercase", |document: &mut Document| {
///     let value = document.get_string("name")?;
///     document.set_string("name", value.to_lowercase());
///     Ok(())
/// });
///
/// let mut document = Document::new();
/// document.set_string("name", "ELASTIC");
/// stage.execute(&mut document).unwrap();
/// assert_eq!(document.get_string("name").unwrap(), "elastic");
/// ```
pub struct FnStage<F> {
    tag: String,
    func: F,
}

impl<F> FnStage<F>
where
    F: Fn(&mut Document) -> IngestResult<()> + Send + Sync,
{
    pub fn new(tag: impl Into<String>, func: F) -> Self {
        Self {
            tag: tag.into(),
            func,
        }
    }
}

impl<F> PipelineStage for FnStage<F>
where
    F: Fn(&mut Document) -> IngestResult<()> + Send + Sync,
{
    fn execute(&self, document: &mut Document) -> IngestResult<()> {
        (self.func)(document)
    }

    fn type_tag(&self) -> &str {
        &self.tag
    }
}

impl<F> std::fmt::Debug for FnStage<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnStage").field("tag", &self.tag).finish()
    }
}
