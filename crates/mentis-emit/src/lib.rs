//! mentis-emit
//!
//! Batch hand-off to downstream collaborators. Sinks receive finished,
//! immutable batches; nothing here mutates pipeline output.

pub mod error;
pub mod sinks;

pub use crate::error::EmitError;
pub use crate::sinks::{JsonLinesSink, MemorySink, PersistenceSink, ReportingSink, dispatch};
