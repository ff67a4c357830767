//! Ingestion pipeline: raw rows in, persisted embedded records out.
//!
//! One bad row never aborts the batch; failures are collected per row and
//! reported alongside the stored count. Re-ingesting the same rows produces
//! duplicate records; there is no dedup or id-reuse logic.

use std::sync::Arc;

use tokio::time::{sleep, Duration};

use crate::embedding::EmbeddingGateway;
use crate::error::{Result, VerbatimError};
use crate::feedback::RawFeedbackRow;
use crate::store::FeedbackStore;

/// Attempts per row against a flaky gateway, first try included.
pub const MAX_EMBED_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY_MS: u64 = 250;

/// One row that could not be stored, and why.
#[derive(Debug)]
pub struct IngestFailure {
  /// Zero-based position of the row in the input batch.
  pub row: usize,
  pub error: VerbatimError,
}

/// Outcome of one ingestion batch.
#[derive(Debug, Default)]
pub struct IngestReport {
  pub stored: usize,
  pub failures: Vec<IngestFailure>,
}

pub struct IngestPipeline {
  gateway: Arc<dyn EmbeddingGateway>,
  store: Arc<dyn FeedbackStore>,
}

impl IngestPipeline {
  pub fn new(gateway: Arc<dyn EmbeddingGateway>, store: Arc<dyn FeedbackStore>) -> Self {
    Self { gateway, store }
  }

  /// Validate, embed and store each row in order. Component-local errors
  /// are absorbed into the report; they never propagate out of the batch.
  pub async fn ingest(&self, rows: &[RawFeedbackRow]) -> IngestReport {
    let mut report = IngestReport::default();

    for (index, row) in rows.iter().enumerate() {
      match self.ingest_row(row).await {
        Ok(id) => {
          harriet::verbose!(&format!("Stored feedback #{id} (row {index})"));
          report.stored += 1;
        }
        Err(error) => {
          harriet::warn!(&format!("Row {index} failed: {error}"));
          report.failures.push(IngestFailure { row: index, error });
        }
      }
    }

    harriet::info!(&format!(
      "Ingested {} of {} rows ({} failed)",
      report.stored,
      rows.len(),
      report.failures.len()
    ));
    report
  }

  async fn ingest_row(&self, row: &RawFeedbackRow) -> Result<u64> {
    let mut feedback = row.validate()?;
    let embedding = self.embed_with_retry(&feedback.text).await?;
    feedback.set_embedding(embedding);
    self.store.insert(&feedback).await
  }

  /// Bounded retry with doubling backoff, for gateway outages only.
  /// `InvalidInput` is user-correctable and never retried.
  async fn embed_with_retry(&self, text: &str) -> Result<Vec<f32>> {
    let mut delay = Duration::from_millis(RETRY_BASE_DELAY_MS);

    for attempt in 1..=MAX_EMBED_ATTEMPTS {
      match self.gateway.embed(text).await {
        Ok(embedding) => return Ok(embedding),
        Err(VerbatimError::GatewayUnavailable(reason)) if attempt < MAX_EMBED_ATTEMPTS => {
          harriet::verbose!(&format!("Embed attempt {attempt} failed ({reason}), retrying"));
          sleep(delay).await;
          delay *= 2;
        }
        Err(error) => return Err(error),
      }
    }

    unreachable!("loop returns on the final attempt")
  }
}
