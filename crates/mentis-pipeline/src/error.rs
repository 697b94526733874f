use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("document contained no pages")]
    EmptyDocument,

    #[error("emit failed: {0}")]
    Emit(#[from] mentis_emit::EmitError),
}
