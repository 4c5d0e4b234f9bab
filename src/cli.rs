//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::{parse_date, Urgency};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// storeintel - reorder intelligence for dispensary store accounts
///
/// Pulls stores and orders from the sales API, works out which stores are
/// overdue for a reorder and prints a prioritized call list.
///
/// Examples:
///   storeintel
///   storeintel --urgency urgent --search denver
///   storeintel --store "Green Room"
///   storeintel --sync --format json --output stores.json
///   storeintel --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Base URL of the sales API
    ///
    /// Falls back to the config file, then to the production backend.
    #[arg(long, value_name = "URL", env = "STOREINTEL_API_URL")]
    pub api_url: Option<String>,

    /// Only show stores in this urgency tier
    #[arg(long, default_value = "all", value_name = "TIER")]
    pub urgency: UrgencyFilter,

    /// Only show stores whose name contains this text (case-insensitive)
    #[arg(short, long, value_name = "TEXT")]
    pub search: Option<String>,

    /// Show the detail view for the first store whose name contains this text
    #[arg(long, value_name = "NAME", conflicts_with_all = ["urgency", "search"])]
    pub store: Option<String>,

    /// Use the backend's pre-aggregated sales intelligence
    ///
    /// By default stores and orders are fetched and aggregated locally.
    #[arg(long)]
    pub server_side: bool,

    /// Attribute orders by their store_id when present
    ///
    /// Orders without a store_id still fall back to name matching.
    #[arg(long)]
    pub match_by_store_id: bool,

    /// Trigger a LeafLink sync before loading
    #[arg(long)]
    pub sync: bool,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Compute as of this date instead of now (YYYY-MM-DD or RFC 3339)
    #[arg(long, value_name = "DATE", value_parser = parse_as_of)]
    pub as_of: Option<DateTime<Utc>>,

    /// Fail if any store is at or above this urgency tier
    ///
    /// Exit code 2 when the threshold is reached. Values: warning, urgent
    #[arg(long, value_name = "TIER")]
    pub fail_on: Option<FailOnLevel>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .storeintel.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .storeintel.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Urgency tier selection for --urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum UrgencyFilter {
    #[default]
    All,
    Urgent,
    Warning,
    Good,
}

impl UrgencyFilter {
    /// The tier to keep, or `None` for all tiers.
    pub fn tier(self) -> Option<Urgency> {
        match self {
            UrgencyFilter::All => None,
            UrgencyFilter::Urgent => Some(Urgency::Urgent),
            UrgencyFilter::Warning => Some(Urgency::Warning),
            UrgencyFilter::Good => Some(Urgency::Good),
        }
    }
}

/// Threshold for --fail-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FailOnLevel {
    Warning,
    Urgent,
}

impl FailOnLevel {
    pub fn urgency(self) -> Urgency {
        match self {
            FailOnLevel::Warning => Urgency::Warning,
            FailOnLevel::Urgent => Urgency::Urgent,
        }
    }
}

fn parse_as_of(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_date(raw).ok_or_else(|| format!("invalid date '{}', expected YYYY-MM-DD or RFC 3339", raw))
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref store) = self.store {
            if store.trim().is_empty() {
                return Err("--store needs a non-empty name".to_string());
            }
        }

        if self.server_side && self.match_by_store_id {
            return Err("--match-by-store-id only applies to local aggregation".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
