use thiserror::Error;

/// Error taxonomy for the retrieval pipeline.
///
/// An empty search result is deliberately absent here: zero matching records
/// is a legitimate, reportable outcome, not a failure.
#[derive(Debug, Error)]
pub enum VerbatimError {
  /// Malformed query or row. User-correctable; never retried automatically.
  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// Transient failure of the hosted embeddings endpoint. Retried (bounded)
  /// at the ingestion boundary, surfaced unchanged at the retrieval boundary.
  #[error("embedding gateway unavailable: {0}")]
  GatewayUnavailable(String),

  /// A vector whose dimension differs from the store-wide dimension. Fatal
  /// for the offending insert only; prior records are unaffected.
  #[error("dimension mismatch: store holds {expected}-dimensional embeddings, got {actual}")]
  DimensionMismatch { expected: usize, actual: usize },

  /// I/O failure or corrupt persisted row in the feedback store.
  #[error("feedback store error: {0}")]
  Store(String),
}

pub type Result<T> = std::result::Result<T, VerbatimError>;
