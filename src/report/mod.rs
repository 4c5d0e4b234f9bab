//! Report rendering.
//!
//! Two reports exist: the prioritized store list and the single-store
//! detail view. Each renders as Markdown or JSON.

pub mod generator;

pub use generator::{
    generate_detail_json, generate_detail_markdown, generate_json_report,
    generate_markdown_report,
};

use crate::dashboard::IntelligenceSource;
use crate::intelligence::{StoreDetail, UrgencyCounts};
use crate::models::{DashboardStats, StoreIntelligence};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Metadata shared by both reports.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub api_url: String,
    pub generated_at: DateTime<Utc>,
    /// Reference time used for day counts.
    pub as_of: DateTime<Utc>,
    pub source: IntelligenceSource,
    pub duration_seconds: f64,
}

/// The prioritized call list.
#[derive(Debug, Clone, Serialize)]
pub struct StoreListReport {
    pub metadata: ReportMetadata,
    pub filter: String,
    pub stats: DashboardStats,
    /// Totals recomputed from the loaded orders, in local mode.
    pub order_totals: Option<DashboardStats>,
    /// Tier counts over all stores, before filtering.
    pub counts: UrgencyCounts,
    /// Filtered stores in display order.
    pub stores: Vec<StoreIntelligence>,
    pub warnings: Vec<String>,
    pub commission_rate: f64,
    #[serde(skip)]
    pub include_contacts: bool,
}

/// Everything known about one store.
#[derive(Debug, Clone, Serialize)]
pub struct StoreDetailReport {
    pub metadata: ReportMetadata,
    pub store: StoreIntelligence,
    pub detail: StoreDetail,
    #[serde(skip)]
    pub top_products: usize,
}
