//! Verbatim - Grounded Voice-of-Customer Retrieval
//!
//! Retrieves semantically relevant customer-feedback records for a free-text
//! question and produces text artifacts (evidence listings, analysis, weekly
//! briefs) that cite only retrieved content. Synthesis consumers receive the
//! serialized [`evidence::EvidenceSet`] as their entire factual input, so a
//! claim that cannot be traced to a retrieved record has no data channel to
//! arrive through.

pub mod config;
pub mod embedding;
pub mod error;
pub mod evidence;
pub mod feedback;
pub mod ingest;
pub mod retrieval;
pub mod similarity;
pub mod store;
pub mod synthesis;
