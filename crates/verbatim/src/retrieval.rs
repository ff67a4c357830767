//! Retrieval & grounding service: the sole sanctioned path from a user
//! question to evidence. Nothing else reads the feedback store to answer a
//! question; ingestion's writes are the only other store access point.

use std::sync::Arc;

use crate::embedding::EmbeddingGateway;
use crate::error::{Result, VerbatimError};
use crate::evidence::EvidenceSet;
use crate::store::{FeedbackStore, SearchFilters};

/// A retrieval request: what to look for and how to narrow the corpus.
#[derive(Debug, Clone)]
pub struct QueryFilter {
  pub query_text: String,
  pub top_k: usize,
  pub country: Option<String>,
  pub platform: Option<String>,
  pub min_rating: Option<i32>,
}

impl QueryFilter {
  pub fn new(query_text: &str, top_k: usize) -> Self {
    Self {
      query_text: query_text.to_string(),
      top_k,
      country: None,
      platform: None,
      min_rating: None,
    }
  }
}

pub struct RetrievalService {
  gateway: Arc<dyn EmbeddingGateway>,
  store: Arc<dyn FeedbackStore>,
  max_top_k: usize,
}

impl RetrievalService {
  pub fn new(gateway: Arc<dyn EmbeddingGateway>, store: Arc<dyn FeedbackStore>, max_top_k: usize) -> Self {
    Self { gateway, store, max_top_k }
  }

  /// Validate the request, embed the query, search the store, and freeze
  /// the ranked results.
  ///
  /// A gateway outage propagates unchanged; retrieval never degrades to
  /// keyword search or stale evidence, because either would break the
  /// grounding contract silently. The embed and search steps are
  /// sequential and independently cancelable; no store lock is held while
  /// the gateway call is in flight.
  pub async fn retrieve(&self, filter: &QueryFilter) -> Result<EvidenceSet> {
    if filter.top_k == 0 {
      return Err(VerbatimError::InvalidInput("top_k must be positive".to_string()));
    }
    if filter.top_k > self.max_top_k {
      return Err(VerbatimError::InvalidInput(format!(
        "top_k {} exceeds the configured maximum of {}",
        filter.top_k, self.max_top_k
      )));
    }
    if filter.query_text.trim().is_empty() {
      return Err(VerbatimError::InvalidInput("query text must not be empty".to_string()));
    }

    let query_embedding = self.gateway.embed(&filter.query_text).await?;

    let filters = SearchFilters {
      country: filter.country.clone(),
      platform: filter.platform.clone(),
      min_rating: filter.min_rating,
    };
    let items = self.store.search(&query_embedding, filter.top_k, &filters).await?;

    harriet::verbose!(&format!("Retrieved {} evidence records", items.len()));
    Ok(EvidenceSet::new(items))
  }
}
