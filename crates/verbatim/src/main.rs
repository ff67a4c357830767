use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;

use verbatim::config::VerbatimConfig;
use verbatim::embedding::HttpEmbeddingGateway;
use verbatim::evidence::EvidenceSet;
use verbatim::feedback::RawFeedbackRow;
use verbatim::ingest::{IngestPipeline, IngestReport};
use verbatim::retrieval::{QueryFilter, RetrievalService};
use verbatim::store::{FeedbackStore, JsonlFeedbackStore};
use verbatim::synthesis::{AnalysisGenerator, Synthesizer, WeeklyBriefGenerator};

#[derive(Parser)]
#[command(name = "verbatim")]
#[command(
  about = "Verbatim - Voice-of-Customer Retrieval\nGrounded feedback search and analysis for product teams"
)]
#[command(version)]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

/// Common retrieval arguments
#[derive(Args)]
struct QueryArgs {
  /// Free-text question to search feedback for
  question: String,
  /// How many evidence records to retrieve
  #[arg(short = 'k', long, default_value_t = 6)]
  top_k: usize,
  /// Restrict to one country (exact match)
  #[arg(long)]
  country: Option<String>,
  /// Restrict to one platform (exact match)
  #[arg(long)]
  platform: Option<String>,
  /// Keep only records rated at least this
  #[arg(long)]
  min_rating: Option<i32>,
}

#[derive(Subcommand)]
enum Commands {
  /// Ingest a JSON Lines file of raw feedback rows
  Ingest {
    /// Path to the .jsonl export
    file: PathBuf,
  },
  /// Retrieve and list the evidence for a question
  Ask {
    #[command(flatten)]
    query: QueryArgs,
  },
  /// Generate a grounded analysis for a question
  Analyze {
    #[command(flatten)]
    query: QueryArgs,
  },
  /// Generate the weekly brief for a question
  Brief {
    #[command(flatten)]
    query: QueryArgs,
  },
  /// Show how many feedback records are stored
  Count,
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  let config = VerbatimConfig::from_env()?;
  let store = Arc::new(JsonlFeedbackStore::open(&config.data_dir.join("feedback.jsonl"))?);

  match cli.command {
    Commands::Ingest { file } => {
      let report = run_ingest(&config, store, &file).await?;
      if report.stored == 0 && !report.failures.is_empty() {
        anyhow::bail!("no rows could be ingested");
      }
    }
    Commands::Ask { query } => {
      let evidence = run_retrieve(&config, store, &query).await?;
      print_evidence_listing(&evidence);
    }
    Commands::Analyze { query } => {
      let evidence = run_retrieve(&config, store, &query).await?;
      println!("{}", AnalysisGenerator.synthesize(&query.question, &evidence));
    }
    Commands::Brief { query } => {
      let evidence = run_retrieve(&config, store, &query).await?;
      println!("{}", WeeklyBriefGenerator.synthesize(&query.question, &evidence));
    }
    Commands::Count => {
      println!("{}", store.count().await?);
    }
  }

  Ok(())
}

async fn run_ingest(
  config: &VerbatimConfig,
  store: Arc<JsonlFeedbackStore>,
  file: &PathBuf,
) -> Result<IngestReport> {
  let rows = read_rows(file)?;
  harriet::info!(&format!("Ingesting {} rows from {}", rows.len(), file.display()));

  let gateway = Arc::new(HttpEmbeddingGateway::from_config(config)?);
  let pipeline = IngestPipeline::new(gateway, store);
  let report = pipeline.ingest(&rows).await;

  if report.failures.is_empty() {
    harriet::success!(&format!("Stored {} feedback records", report.stored));
  } else {
    for failure in &report.failures {
      harriet::warn!(&format!("row {}: {}", failure.row, failure.error));
    }
    harriet::warn!(&format!(
      "Stored {} records, {} rows failed",
      report.stored,
      report.failures.len()
    ));
  }

  Ok(report)
}

/// Parse a JSON Lines export into raw rows. Blank lines are ignored; a
/// line that is not valid JSON fails the whole command since that points
/// at the wrong file rather than one bad record.
fn read_rows(file: &PathBuf) -> Result<Vec<RawFeedbackRow>> {
  let content =
    std::fs::read_to_string(file).with_context(|| format!("could not read {}", file.display()))?;

  content
    .lines()
    .enumerate()
    .filter(|(_, line)| !line.trim().is_empty())
    .map(|(line_no, line)| {
      serde_json::from_str(line).with_context(|| format!("line {} is not a feedback row", line_no + 1))
    })
    .collect()
}

async fn run_retrieve(
  config: &VerbatimConfig,
  store: Arc<JsonlFeedbackStore>,
  query: &QueryArgs,
) -> Result<EvidenceSet> {
  let gateway = Arc::new(HttpEmbeddingGateway::from_config(config)?);
  let service = RetrievalService::new(gateway, store, config.max_top_k);

  let filter = QueryFilter {
    query_text: query.question.clone(),
    top_k: query.top_k,
    country: query.country.clone(),
    platform: query.platform.clone(),
    min_rating: query.min_rating,
  };

  Ok(service.retrieve(&filter).await?)
}

fn print_evidence_listing(evidence: &EvidenceSet) {
  if evidence.is_empty() {
    println!("No matching feedback found.");
    return;
  }

  for item in evidence.iter() {
    println!(
      "- [{:.3}] {} ({}, {}, rating={}) {}",
      item.similarity,
      format!("#{}", item.id).yellow().bold(),
      item.country.as_deref().unwrap_or("?"),
      item.platform.as_deref().unwrap_or("?"),
      item.rating.map(|r| r.to_string()).unwrap_or_else(|| "?".to_string()),
      item.content
    );
  }
}
