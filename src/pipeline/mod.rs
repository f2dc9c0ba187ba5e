//! Stage composition for ingest pipelines
//!
//! A [`CompoundStage`] runs an ordered list of stages against a mutable
//! [`Document`]. When a stage fails, the remaining stages are skipped, the failure
//! is recorded in the document's metadata, and an ordered list of fallback stages
//! takes over. Fallback stages may themselves be compound stages, so failure
//! handling nests to any depth.
//!
//! # Example
//! ```
//! use ingest_pipeline::pipeline::{CompoundStage, Document, FnStage, PipelineStage};
//!
//! let fallback = CompoundStage::builder()
//!     .add_stage(FnStage::new("second", |_: &mut Document| Err("still broken".into())))
//!     .add_on_failure_stage(FnStage::new("last", |document: &mut Document| {
//!         document.set_bool("handled", true);
//!         Ok(())
//!     }))
//!     .build();
//!
//! let compound = CompoundStage::builder()
//!     .add_stage(FnStage::new("first", |_: &mut Document| Err("broken".into())))
//!     .add_on_failure_stage(fallback)
//!     .build();
//!
//! let mut document = Document::new();
//! compound.execute(&mut document).unwrap();
//! assert_eq!(document.failure_tag(), Some("second"));
//! ```

pub mod compound;
pub mod core;
pub mod document;
pub mod executor;
pub mod function;

// Re-export main types
pub use self::compound::{CompoundStage, CompoundStageBuilder, COMPOUND_TYPE};
pub use self::core::{PipelineResult, PipelineStage};
pub use self::document::{Document, ON_FAILURE_MESSAGE_FIELD, ON_FAILURE_PROCESSOR_FIELD};
pub use self::executor::{Pipeline, PipelineBuilder};
pub use self::function::FnStage;
