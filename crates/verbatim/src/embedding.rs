//! Embedding gateway: turns text into a fixed-length vector via a hosted
//! OpenAI-compatible embeddings endpoint.
//!
//! The gateway is a pure function of its input text plus the configured
//! model. Vectors are stable for the same text and model version only;
//! callers must not compare vectors across model versions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::VerbatimConfig;
use crate::error::{Result, VerbatimError};

/// Character budget sent to the hosted model. Inputs beyond this are
/// truncated deterministically from the end, never rejected for length.
pub const MAX_EMBED_CHARS: usize = 8_000;

/// Boundary to the external embedding model.
#[async_trait]
pub trait EmbeddingGateway: Send + Sync {
  /// Embed one text. Empty text is `InvalidInput`; transport, auth and
  /// server failures are `GatewayUnavailable`.
  async fn embed(&self, text: &str) -> Result<Vec<f32>>;

  /// Dimension of the vectors this gateway produces.
  fn dimension(&self) -> usize;
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
  model: &'a str,
  input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
  data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
  embedding: Vec<f32>,
}

/// Production gateway over HTTP.
pub struct HttpEmbeddingGateway {
  client: reqwest::Client,
  base_url: String,
  api_key: String,
  model: String,
  dimension: usize,
}

impl HttpEmbeddingGateway {
  pub fn from_config(config: &VerbatimConfig) -> anyhow::Result<Self> {
    let api_key = config
      .api_key
      .clone()
      .ok_or_else(|| anyhow::anyhow!("VERBATIM_API_KEY is not set; the embeddings endpoint needs it"))?;

    Ok(Self {
      client: reqwest::Client::new(),
      base_url: config.embedding_base_url.trim_end_matches('/').to_string(),
      api_key,
      model: config.embedding_model.clone(),
      dimension: config.dimension,
    })
  }
}

#[async_trait]
impl EmbeddingGateway for HttpEmbeddingGateway {
  async fn embed(&self, text: &str) -> Result<Vec<f32>> {
    if text.trim().is_empty() {
      return Err(VerbatimError::InvalidInput("cannot embed empty text".to_string()));
    }

    let input = truncate_for_model(text, MAX_EMBED_CHARS);
    let request = EmbeddingRequest { model: &self.model, input };

    let response = self
      .client
      .post(format!("{}/embeddings", self.base_url))
      .bearer_auth(&self.api_key)
      .json(&request)
      .send()
      .await
      .map_err(|e| VerbatimError::GatewayUnavailable(format!("request failed: {e}")))?;

    if !response.status().is_success() {
      return Err(VerbatimError::GatewayUnavailable(format!(
        "embeddings endpoint returned {}",
        response.status()
      )));
    }

    let body: EmbeddingResponse = response
      .json()
      .await
      .map_err(|e| VerbatimError::GatewayUnavailable(format!("unreadable response: {e}")))?;

    let embedding = body
      .data
      .into_iter()
      .next()
      .map(|d| d.embedding)
      .ok_or_else(|| VerbatimError::GatewayUnavailable("response carried no embedding".to_string()))?;

    if embedding.len() != self.dimension {
      return Err(VerbatimError::GatewayUnavailable(format!(
        "model returned a {}-dimensional vector, expected {}",
        embedding.len(),
        self.dimension
      )));
    }

    Ok(embedding)
  }

  fn dimension(&self) -> usize {
    self.dimension
  }
}

/// Truncate from the end on a char boundary so the same text always maps to
/// the same model input.
fn truncate_for_model(text: &str, max_chars: usize) -> &str {
  match text.char_indices().nth(max_chars) {
    Some((byte_offset, _)) => &text[..byte_offset],
    None => text,
  }
}
