use std::path::PathBuf;

use anyhow::{anyhow, Result};

/// Runtime configuration, passed explicitly into each component's
/// constructor. No component reads ambient global state at call time.
#[derive(Debug, Clone)]
pub struct VerbatimConfig {
  /// Which hosted embedding model to call.
  pub embedding_model: String,
  /// Base URL of the OpenAI-compatible embeddings API.
  pub embedding_base_url: String,
  /// Bearer token for the embeddings API. Absent in offline/test setups.
  pub api_key: Option<String>,
  /// Expected embedding dimension for the whole corpus.
  pub dimension: usize,
  /// Upper bound for a query's top_k.
  pub max_top_k: usize,
  /// Directory holding the persisted feedback store.
  pub data_dir: PathBuf,
}

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_EMBEDDING_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_DIMENSION: usize = 1536;
pub const DEFAULT_MAX_TOP_K: usize = 25;

impl VerbatimConfig {
  /// Build a configuration from `VERBATIM_*` environment variables, with
  /// defaults matching the hosted OpenAI embeddings setup.
  pub fn from_env() -> Result<Self> {
    let embedding_model =
      std::env::var("VERBATIM_EMBED_MODEL").unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string());
    let embedding_base_url = std::env::var("VERBATIM_EMBED_BASE_URL")
      .unwrap_or_else(|_| DEFAULT_EMBEDDING_BASE_URL.to_string());
    let api_key = std::env::var("VERBATIM_API_KEY").ok().filter(|k| !k.trim().is_empty());

    let dimension = parse_env_number("VERBATIM_DIMENSION", DEFAULT_DIMENSION)?;
    let max_top_k = parse_env_number("VERBATIM_MAX_TOP_K", DEFAULT_MAX_TOP_K)?;

    Ok(Self {
      embedding_model,
      embedding_base_url,
      api_key,
      dimension,
      max_top_k,
      data_dir: default_data_dir()?,
    })
  }
}

fn parse_env_number(name: &str, default: usize) -> Result<usize> {
  match std::env::var(name) {
    Ok(raw) => raw.trim().parse::<usize>().map_err(|_| anyhow!("{name} must be a positive integer, got '{raw}'")),
    Err(_) => Ok(default),
  }
}

/// Resolve the feedback store location: `VERBATIM_DATA_DIR` wins, otherwise
/// a `verbatim` directory under the platform data dir.
pub fn default_data_dir() -> Result<PathBuf> {
  if let Ok(dir) = std::env::var("VERBATIM_DATA_DIR") {
    return Ok(PathBuf::from(dir));
  }

  dirs::data_dir()
    .map(|base| base.join("verbatim"))
    .ok_or_else(|| anyhow!("Could not determine a data directory; set VERBATIM_DATA_DIR"))
}
