//! mentis-pipeline
//!
//! The document pipeline: instrument classification, extraction,
//! normalization into the canonical schema, batch validation, and the
//! page-parallel driver that ties the stages together.

pub mod classify;
pub mod error;
pub mod normalize;
pub mod run;
pub mod subject;
pub mod validate;

pub use crate::error::PipelineError;
pub use crate::run::{CancelFlag, PipelineConfig, run_document, run_to_sinks};
