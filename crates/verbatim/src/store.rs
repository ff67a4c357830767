//! Feedback store: persists embedded records and answers filtered
//! nearest-neighbor queries.
//!
//! Ranking is exact: every stored embedding in the filtered subset is
//! scored against the query vector. An approximate index would be an
//! optimization, and only an acceptable one if it preserved the
//! filter-then-rank ordering contract.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{Result, VerbatimError};
use crate::evidence::EvidenceItem;
use crate::feedback::{Feedback, FeedbackRecord};
use crate::similarity;

/// Metadata predicates applied before ranking. An absent field matches all
/// records; there is no implicit default narrowing.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
  pub country: Option<String>,
  pub platform: Option<String>,
  pub min_rating: Option<i32>,
}

impl SearchFilters {
  pub fn matches(&self, record: &FeedbackRecord) -> bool {
    if let Some(country) = &self.country {
      if record.country.as_deref() != Some(country.as_str()) {
        return false;
      }
    }

    if let Some(platform) = &self.platform {
      if record.platform.as_deref() != Some(platform.as_str()) {
        return false;
      }
    }

    if let Some(min_rating) = self.min_rating {
      match record.rating {
        Some(rating) if rating >= min_rating => {}
        _ => return false,
      }
    }

    true
  }
}

/// Store interface for persisting embedded feedback and answering filtered
/// top-k similarity queries.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
  /// Persist one embedded feedback entry and return its assigned id.
  /// The embedding's dimension must equal the store-wide dimension; the
  /// first insert establishes it.
  async fn insert(&self, feedback: &Feedback) -> Result<u64>;

  /// Filter, then rank by cosine similarity descending (ties ascending by
  /// id), then return the first `top_k`. Fewer matches than `top_k` returns
  /// all of them; zero matches returns an empty vec. Neither is an error.
  async fn search(
    &self,
    query_embedding: &[f32],
    top_k: usize,
    filters: &SearchFilters,
  ) -> Result<Vec<EvidenceItem>>;

  /// Number of persisted records.
  async fn count(&self) -> Result<usize>;
}

#[derive(Debug)]
struct StoreState {
  records: Vec<FeedbackRecord>,
  dimension: Option<usize>,
  next_id: u64,
}

/// File-backed store: records live in memory, with one JSON line appended
/// per insert so the corpus survives process restarts.
///
/// Inserts take the write lock for the whole append-and-commit section, so
/// concurrent inserts never interleave partial records. Searches take the
/// read lock and run concurrently with each other. A search started before
/// an insert commits is not guaranteed to see it.
#[derive(Debug)]
pub struct JsonlFeedbackStore {
  state: RwLock<StoreState>,
  path: Option<PathBuf>,
}

impl JsonlFeedbackStore {
  /// A store with no persistence, for tests and ephemeral sessions.
  pub fn in_memory() -> Self {
    Self {
      state: RwLock::new(StoreState { records: Vec::new(), dimension: None, next_id: 1 }),
      path: None,
    }
  }

  /// Open (or create) a store file, loading any existing records.
  pub fn open(path: &Path) -> anyhow::Result<Self> {
    let records = load_records(path)?;
    let dimension = records.first().map(|r| r.embedding.len());

    if let Some(dimension) = dimension {
      if let Some(bad) = records.iter().find(|r| r.embedding.len() != dimension) {
        anyhow::bail!(
          "store integrity violation: record #{} has a {}-dimensional embedding, corpus uses {}",
          bad.id,
          bad.embedding.len(),
          dimension
        );
      }
    }

    let next_id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
    harriet::verbose!(&format!("Opened feedback store with {} records", records.len()));

    Ok(Self {
      state: RwLock::new(StoreState { records, dimension, next_id }),
      path: Some(path.to_path_buf()),
    })
  }
}

fn load_records(path: &Path) -> anyhow::Result<Vec<FeedbackRecord>> {
  if !path.exists() {
    return Ok(Vec::new());
  }

  let content = std::fs::read_to_string(path)?;
  let mut records = Vec::new();
  for (line_no, line) in content.lines().enumerate() {
    if line.trim().is_empty() {
      continue;
    }
    let record: FeedbackRecord = serde_json::from_str(line)
      .map_err(|e| anyhow::anyhow!("corrupt store line {}: {}", line_no + 1, e))?;
    records.push(record);
  }

  Ok(records)
}

fn append_record(path: &Path, record: &FeedbackRecord) -> Result<()> {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).map_err(|e| VerbatimError::Store(e.to_string()))?;
  }

  let line = serde_json::to_string(record).map_err(|e| VerbatimError::Store(e.to_string()))?;
  let mut file = std::fs::OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .map_err(|e| VerbatimError::Store(e.to_string()))?;
  writeln!(file, "{line}").map_err(|e| VerbatimError::Store(e.to_string()))
}

#[async_trait]
impl FeedbackStore for JsonlFeedbackStore {
  async fn insert(&self, feedback: &Feedback) -> Result<u64> {
    let embedding = feedback
      .embedding
      .clone()
      .ok_or_else(|| VerbatimError::InvalidInput("cannot insert feedback without an embedding".to_string()))?;

    let mut state = self.state.write().await;

    if let Some(expected) = state.dimension {
      if embedding.len() != expected {
        return Err(VerbatimError::DimensionMismatch { expected, actual: embedding.len() });
      }
    }

    let record = FeedbackRecord {
      id: state.next_id,
      source: feedback.source.clone(),
      country: feedback.country.clone(),
      platform: feedback.platform.clone(),
      rating: feedback.rating,
      user_type: feedback.user_type.clone(),
      created_at: feedback.created_at,
      text: feedback.text.clone(),
      embedding,
    };

    // Persist before committing to memory so a failed append changes nothing.
    if let Some(path) = &self.path {
      append_record(path, &record)?;
    }

    let id = record.id;
    state.dimension.get_or_insert(record.embedding.len());
    state.next_id += 1;
    state.records.push(record);

    Ok(id)
  }

  async fn search(
    &self,
    query_embedding: &[f32],
    top_k: usize,
    filters: &SearchFilters,
  ) -> Result<Vec<EvidenceItem>> {
    let state = self.state.read().await;

    // Filter first; ranking and limiting only ever see the filtered subset.
    let mut ranked: Vec<(f32, &FeedbackRecord)> = state
      .records
      .iter()
      .filter(|record| filters.matches(record))
      .map(|record| (similarity::cosine(query_embedding, &record.embedding), record))
      .collect();

    ranked.sort_by(|a, b| {
      b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.1.id.cmp(&b.1.id))
    });
    ranked.truncate(top_k);

    Ok(
      ranked
        .into_iter()
        .map(|(score, record)| EvidenceItem {
          id: record.id,
          content: record.text.clone(),
          country: record.country.clone(),
          platform: record.platform.clone(),
          rating: record.rating,
          similarity: score,
        })
        .collect(),
    )
  }

  async fn count(&self) -> Result<usize> {
    Ok(self.state.read().await.records.len())
  }
}
