//! Synthesis consumers: markdown generators whose entire factual input is
//! one [`EvidenceSet`].
//!
//! Both generators here are template renderers. They describe, group and
//! cite the evidence they were handed; they have no other data channel, so
//! anything they say about the corpus traces to a retrieved record.

use crate::evidence::EvidenceSet;

/// A downstream consumer of retrieval results. Implementations must build
/// their output from `question` and `evidence` alone.
pub trait Synthesizer {
  fn synthesize(&self, question: &str, evidence: &EvidenceSet) -> String;
}

/// Grounded root-cause analysis of one question.
pub struct AnalysisGenerator;

impl Synthesizer for AnalysisGenerator {
  fn synthesize(&self, question: &str, evidence: &EvidenceSet) -> String {
    let mut sections = Vec::new();

    sections.push("## Summary".to_string());
    if evidence.is_empty() {
      sections.push(format!(
        "No stored feedback matched \"{question}\" under the given filters. \
         Widen the filters or ingest more data before drawing conclusions."
      ));
      return sections.join("\n\n");
    }

    sections.push(format!(
      "{} feedback record(s) retrieved for \"{}\"{}.",
      evidence.len(),
      question,
      describe_population(evidence)
    ));

    sections.push("## What the evidence says".to_string());
    sections.push(evidence.render());

    sections.push("## Recommended next steps".to_string());
    sections.push(format!(
      "- Review the cited records ({}) with the owning team.\n\
       - Quantify how widespread each reported problem is before prioritizing.\n\
       - Re-run this question after the next ingestion batch to track movement.",
      citation_list(evidence)
    ));

    sections.join("\n\n")
  }
}

/// Periodic brief: a compact digest of the same evidence for a recurring
/// report.
pub struct WeeklyBriefGenerator;

impl Synthesizer for WeeklyBriefGenerator {
  fn synthesize(&self, question: &str, evidence: &EvidenceSet) -> String {
    let mut sections = Vec::new();

    sections.push("## Weekly Brief".to_string());
    sections.push(format!("### Question under review\n{question}"));

    sections.push("### Evidence used".to_string());
    if evidence.is_empty() {
      sections.push("- Evidence IDs: None".to_string());
      sections.push(
        "No matching feedback this period. That is a finding in itself: either \
         the issue is not being reported, or the filters are too narrow."
          .to_string(),
      );
      return sections.join("\n\n");
    }

    sections.push(format!("- Evidence IDs: {}", citation_list(evidence)));

    sections.push("### Verbatims".to_string());
    sections.push(evidence.render());

    sections.push("### Suggested follow-up".to_string());
    sections.push(format!(
      "Walk the {} cited record(s) with the team{} and decide whether a ticket is warranted.",
      evidence.len(),
      describe_population(evidence)
    ));

    sections.join("\n\n")
  }
}

fn citation_list(evidence: &EvidenceSet) -> String {
  evidence.cited_ids().iter().map(|id| format!("#{id}")).collect::<Vec<_>>().join(", ")
}

/// Describe which platforms and countries actually occur in the evidence.
fn describe_population(evidence: &EvidenceSet) -> String {
  let platforms = distinct(evidence.iter().filter_map(|item| item.platform.clone()));
  let countries = distinct(evidence.iter().filter_map(|item| item.country.clone()));

  let mut parts = Vec::new();
  if !platforms.is_empty() {
    parts.push(format!("platforms: {}", platforms.join(", ")));
  }
  if !countries.is_empty() {
    parts.push(format!("countries: {}", countries.join(", ")));
  }

  if parts.is_empty() {
    String::new()
  } else {
    format!(" ({})", parts.join("; "))
  }
}

fn distinct(values: impl Iterator<Item = String>) -> Vec<String> {
  let mut seen = Vec::new();
  for value in values {
    if !seen.contains(&value) {
      seen.push(value);
    }
  }
  seen
}
