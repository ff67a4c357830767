//! The grounding boundary: ranked retrieval results, frozen.

use serde::Serialize;

/// One ranked retrieval result. `content` is the stored record's text,
/// never truncated or rewritten.
#[derive(Debug, Clone, Serialize)]
pub struct EvidenceItem {
  pub id: u64,
  pub content: String,
  pub country: Option<String>,
  pub platform: Option<String>,
  pub rating: Option<i32>,
  pub similarity: f32,
}

/// An immutable, ordered sequence of [`EvidenceItem`], sorted by similarity
/// descending with ties broken by ascending id.
///
/// This is the only permitted source material for any synthesis step: a
/// consumer gets [`EvidenceSet::render`] (or read access to the items) and
/// nothing else, so claims without a retrieved record behind them have no
/// way in.
#[derive(Debug, Clone, Serialize)]
pub struct EvidenceSet {
  items: Vec<EvidenceItem>,
}

impl EvidenceSet {
  /// Freeze a ranked result list. Ordering is (re)established here so the
  /// invariant holds no matter who produced the items.
  pub fn new(mut items: Vec<EvidenceItem>) -> Self {
    items.sort_by(|a, b| {
      b.similarity
        .partial_cmp(&a.similarity)
        .unwrap_or(std::cmp::Ordering::Equal)
        .then_with(|| a.id.cmp(&b.id))
    });
    Self { items }
  }

  pub fn empty() -> Self {
    Self { items: Vec::new() }
  }

  pub fn items(&self) -> &[EvidenceItem] {
    &self.items
  }

  pub fn iter(&self) -> std::slice::Iter<'_, EvidenceItem> {
    self.items.iter()
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  /// Ids of every item, in rank order. Synthesis consumers cite these.
  pub fn cited_ids(&self) -> Vec<u64> {
    self.items.iter().map(|item| item.id).collect()
  }

  /// Serialize the evidence for a synthesis consumer. This string is the
  /// consumer's entire factual input.
  pub fn render(&self) -> String {
    if self.items.is_empty() {
      return "No evidence retrieved.".to_string();
    }

    self
      .items
      .iter()
      .map(|item| {
        format!(
          "- Evidence #{} ({} {}, rating {}, sim {:.3}): {}",
          item.id,
          item.platform.as_deref().unwrap_or("?"),
          item.country.as_deref().unwrap_or("?"),
          item.rating.map(|r| r.to_string()).unwrap_or_else(|| "?".to_string()),
          item.similarity,
          item.content
        )
      })
      .collect::<Vec<_>>()
      .join("\n")
  }
}
