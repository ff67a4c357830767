//! ## Features
//!
//! - Standard logging levels (verbose, debug, info, warn, error, success)
//! - Level filtering via the `HARRIET_LEVEL` environment variable
//! - Multi-line message support with consistent prefixes
//! - Timestamped event logging for long-running operations
//! - All output to stderr so stdout stays clean for piped data
//!
//! ## Usage
//!
//! Standard logging functions: `info()`, `warn()`, `error()`, `debug()`, `success()`
//!
//! Event logging: `event_info()`, `event_warn()`, `event_error()`

use chrono::Local;
use colored::*;

/// Logging levels, ordered from most to least chatty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
  Verbose,
  Debug,
  Info,
  Warn,
  Error,
}

impl Level {
  fn from_env() -> Level {
    match std::env::var("HARRIET_LEVEL").unwrap_or_default().to_lowercase().as_str() {
      "verbose" => Level::Verbose,
      "debug" => Level::Debug,
      "warn" => Level::Warn,
      "error" | "quiet" => Level::Error,
      _ => Level::Info,
    }
  }
}

/// Check whether a message at `level` would currently be emitted.
pub fn enabled(level: Level) -> bool {
  level >= Level::from_env()
}

/// Core output function; splits multi-line messages so every line is prefixed.
fn emit(prefix: &str, message: &str) {
  for line in message.lines() {
    eprintln!("{prefix} {line}");
  }
}

fn format_prefix(color: Color, tag: &str) -> String {
  format!("[{}]{:<width$}", tag.color(color).bold(), "", width = 8usize.saturating_sub(tag.len() + 2))
}

pub fn verbose(message: &str) {
  if enabled(Level::Verbose) {
    emit(&format_prefix(Color::Cyan, "verb"), message);
  }
}

/// Debug level logging - diagnostic detail
pub fn debug(message: &str) {
  if enabled(Level::Debug) {
    emit(&format_prefix(Color::Magenta, "debug"), message);
  }
}

/// Info level logging - general information
pub fn info(message: &str) {
  if enabled(Level::Info) {
    emit(&format_prefix(Color::Blue, "info"), message);
  }
}

/// Warning level logging - something needs attention
pub fn warn(message: &str) {
  if enabled(Level::Warn) {
    emit(&format_prefix(Color::Yellow, "warn"), message);
  }
}

/// Error level logging - something went wrong
pub fn error(message: &str) {
  if enabled(Level::Error) {
    emit(&format_prefix(Color::Red, "error"), message);
  }
}

/// Success level logging - something completed; shares the info gate
pub fn success(message: &str) {
  if enabled(Level::Info) {
    emit(&format_prefix(Color::Green, "sccs"), message);
  }
}

/// Timestamped info event
pub fn event_info(message: &str) {
  if enabled(Level::Info) {
    emit(&event_prefix("event".blue().bold().to_string()), message);
  }
}

/// Timestamped warning event
pub fn event_warn(message: &str) {
  if enabled(Level::Warn) {
    emit(&event_prefix("event".yellow().bold().to_string()), message);
  }
}

/// Timestamped error event
pub fn event_error(message: &str) {
  if enabled(Level::Error) {
    emit(&event_prefix("event".red().bold().to_string()), message);
  }
}

fn event_prefix(tag: String) -> String {
  let timestamp = Local::now().format("%H:%M:%S").to_string();
  format!("[{}] [{}]", tag, timestamp.cyan())
}

#[macro_export]
macro_rules! verbose {
  ($msg:expr) => {
    $crate::verbose($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! debug {
  ($msg:expr) => {
    $crate::debug($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! info {
  ($msg:expr) => {
    $crate::info($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! warn {
  ($msg:expr) => {
    $crate::warn($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! error {
  ($msg:expr) => {
    $crate::error($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! success {
  ($msg:expr) => {
    $crate::success($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! event_info {
  ($msg:expr) => {
    $crate::event_info($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! event_warn {
  ($msg:expr) => {
    $crate::event_warn($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! event_error {
  ($msg:expr) => {
    $crate::event_error($msg); // LCOV_EXCL_LINE
  };
}
