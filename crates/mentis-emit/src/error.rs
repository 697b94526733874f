use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("persistence sink rejected batch: {0}")]
    Persistence(String),

    #[error("reporting sink rejected summary: {0}")]
    Reporting(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("write error: {0}")]
    Io(#[from] std::io::Error),
}
