use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VerbatimError};

/// Source channel used when a row carries none.
pub const DEFAULT_SOURCE: &str = "app_reviews";

/// Rating bounds for Voice-of-Customer reviews.
pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// A validated unit of Voice-of-Customer input, before persistence.
///
/// The embedding is `None` until the ingestion pipeline attaches one; the
/// store refuses to persist feedback without it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
  pub source: String,
  pub country: Option<String>,
  pub platform: Option<String>,
  pub rating: Option<i32>,
  pub user_type: Option<String>,
  pub created_at: Option<NaiveDate>,
  pub text: String,
  pub embedding: Option<Vec<f32>>,
}

impl Feedback {
  /// Create feedback with only its text set; fails on empty text.
  pub fn new(text: &str) -> Result<Self> {
    let text = text.trim();
    if text.is_empty() {
      return Err(VerbatimError::InvalidInput("feedback text must not be empty".to_string()));
    }

    Ok(Self {
      source: DEFAULT_SOURCE.to_string(),
      country: None,
      platform: None,
      rating: None,
      user_type: None,
      created_at: None,
      text: text.to_string(),
      embedding: None,
    })
  }

  pub fn set_embedding(&mut self, embedding: Vec<f32>) {
    self.embedding = Some(embedding);
  }

  pub fn has_embedding(&self) -> bool {
    self.embedding.is_some()
  }
}

/// A persisted feedback record. The id is assigned exactly once by the
/// store and never reused; the record is immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
  pub id: u64,
  pub source: String,
  pub country: Option<String>,
  pub platform: Option<String>,
  pub rating: Option<i32>,
  pub user_type: Option<String>,
  pub created_at: Option<NaiveDate>,
  pub text: String,
  pub embedding: Vec<f32>,
}

/// A loosely-typed row as it arrives from an export file. Everything is an
/// optional string; `validate` converts it to a strongly-typed [`Feedback`]
/// or reports exactly what is wrong with it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFeedbackRow {
  #[serde(default)]
  pub source: Option<String>,
  #[serde(default)]
  pub country: Option<String>,
  #[serde(default)]
  pub platform: Option<String>,
  #[serde(default)]
  pub rating: Option<String>,
  #[serde(default)]
  pub user_type: Option<String>,
  #[serde(default)]
  pub created_at: Option<String>,
  #[serde(default)]
  pub text: Option<String>,
}

impl RawFeedbackRow {
  /// Validate and convert to [`Feedback`]. Empty optional fields mean
  /// "absent"; present-but-malformed fields are rejected rather than
  /// silently coerced.
  pub fn validate(&self) -> Result<Feedback> {
    let mut feedback = Feedback::new(self.text.as_deref().unwrap_or(""))?;

    if let Some(source) = non_empty(&self.source) {
      feedback.source = source;
    }
    feedback.country = non_empty(&self.country);
    feedback.platform = non_empty(&self.platform);
    feedback.user_type = non_empty(&self.user_type);
    feedback.rating = parse_rating(&self.rating)?;
    feedback.created_at = parse_date(&self.created_at)?;

    Ok(feedback)
  }
}

fn non_empty(field: &Option<String>) -> Option<String> {
  field.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn parse_rating(raw: &Option<String>) -> Result<Option<i32>> {
  let Some(raw) = non_empty(raw) else {
    return Ok(None);
  };

  let rating = raw
    .parse::<i32>()
    .map_err(|_| VerbatimError::InvalidInput(format!("rating '{raw}' is not an integer")))?;

  if !(MIN_RATING..=MAX_RATING).contains(&rating) {
    return Err(VerbatimError::InvalidInput(format!(
      "rating {rating} is outside {MIN_RATING}..={MAX_RATING}"
    )));
  }

  Ok(Some(rating))
}

fn parse_date(raw: &Option<String>) -> Result<Option<NaiveDate>> {
  let Some(raw) = non_empty(raw) else {
    return Ok(None);
  };

  NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
    .map(Some)
    .map_err(|_| VerbatimError::InvalidInput(format!("created_at '{raw}' is not a YYYY-MM-DD date")))
}
