//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.storeintel.toml` files.

use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".storeintel.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Sales API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Reorder intelligence thresholds.
    #[serde(default)]
    pub intelligence: IntelligenceConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Sales API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the sales backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://white-mousse-backend-production.up.railway.app".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// How orders are attributed to stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStrategy {
    /// Case-insensitive substring overlap between buyer and store names.
    #[default]
    Fuzzy,
    /// Explicit `store_id` on the order, fuzzy match when it is missing.
    StoreId,
}

/// Reorder intelligence thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntelligenceConfig {
    /// Share of revenue paid out as sales commission.
    #[serde(default = "default_commission_rate")]
    pub commission_rate: f64,

    /// Reorder cycle assumed when history is too short.
    #[serde(default = "default_cycle_days")]
    pub default_cycle_days: i64,

    /// Gaps of this many days or more are ignored when estimating the cycle.
    #[serde(default = "default_max_cycle_days")]
    pub max_cycle_days: i64,

    /// Trailing window for recent revenue.
    #[serde(default = "default_revenue_window_days")]
    pub revenue_window_days: i64,

    /// Days since last order above `cycle * warning_multiplier` is a warning.
    #[serde(default = "default_warning_multiplier")]
    pub warning_multiplier: f64,

    /// Days since last order above `cycle * urgent_multiplier` is urgent.
    #[serde(default = "default_urgent_multiplier")]
    pub urgent_multiplier: f64,

    /// Days-since-last-order reported for stores that never ordered.
    #[serde(default = "default_no_orders_days")]
    pub no_orders_days: i64,

    /// Order attribution strategy.
    #[serde(default)]
    pub matching: MatchStrategy,

    /// Keep empty or whitespace-only buyer names from matching every store.
    #[serde(default)]
    pub ignore_blank_buyer_names: bool,
}

impl Default for IntelligenceConfig {
    fn default() -> Self {
        Self {
            commission_rate: default_commission_rate(),
            default_cycle_days: default_cycle_days(),
            max_cycle_days: default_max_cycle_days(),
            revenue_window_days: default_revenue_window_days(),
            warning_multiplier: default_warning_multiplier(),
            urgent_multiplier: default_urgent_multiplier(),
            no_orders_days: default_no_orders_days(),
            matching: MatchStrategy::default(),
            ignore_blank_buyer_names: false,
        }
    }
}

fn default_commission_rate() -> f64 {
    0.08
}

fn default_cycle_days() -> i64 {
    14
}

fn default_max_cycle_days() -> i64 {
    90
}

fn default_revenue_window_days() -> i64 {
    90
}

fn default_warning_multiplier() -> f64 {
    1.2
}

fn default_urgent_multiplier() -> f64 {
    1.5
}

fn default_no_orders_days() -> i64 {
    999
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Default output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Products listed in a store detail report.
    #[serde(default = "default_top_products")]
    pub top_products: usize,

    /// Include buyer contact details in the store list.
    #[serde(default = "default_true")]
    pub include_contacts: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            top_products: default_top_products(),
            include_contacts: true,
        }
    }
}

fn default_top_products() -> usize {
    10
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.storeintel.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only explicitly provided values override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref url) = args.api_url {
            self.api.base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(timeout) = args.timeout {
            self.api.timeout_seconds = timeout;
        }

        if let Some(format) = args.format {
            self.report.format = format;
        }

        if args.match_by_store_id {
            self.intelligence.matching = MatchStrategy::StoreId;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
