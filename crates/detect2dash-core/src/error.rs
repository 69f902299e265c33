use thiserror::Error;

/// Reasons an ingestion payload is rejected.
///
/// Both variants are client errors; neither touches the retention buffer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// Objects missing or empty, an object without a class name, or the
    /// inference time absent.
    #[error("Dados incompletos")]
    Incomplete,

    /// Body is not a JSON object.
    #[error("invalid detection payload: {0}")]
    InvalidPayload(String),
}
