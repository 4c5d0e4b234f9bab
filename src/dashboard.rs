//! Dashboard loading and the sync action.
//!
//! A load fetches stats, stores and orders concurrently and aggregates
//! them into a fresh [`DashboardSnapshot`]. Only the stats call is
//! required: a failed stores or orders call leaves that list empty and is
//! recorded as a warning on the snapshot.

use crate::api::{ApiError, DashboardApi};
use crate::config::IntelligenceConfig;
use crate::intelligence::{aggregate_stores, StoreMatcher, UrgencyCounts};
use crate::models::{DashboardStats, StoreIntelligence, SyncSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// Where the per-store intelligence was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntelligenceSource {
    /// Aggregated here from raw stores and orders.
    Local,
    /// Pre-aggregated by the backend.
    Server,
}

impl fmt::Display for IntelligenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntelligenceSource::Local => write!(f, "local aggregation"),
            IntelligenceSource::Server => write!(f, "server aggregation"),
        }
    }
}

/// Result of one dashboard load.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub as_of: DateTime<Utc>,
    pub source: IntelligenceSource,
    pub stats: DashboardStats,
    /// Totals over the orders that were loaded, when raw orders were fetched.
    pub order_totals: Option<DashboardStats>,
    /// Unsorted, one entry per store.
    pub stores: Vec<StoreIntelligence>,
    pub order_count: usize,
    /// Secondary calls that failed and were replaced by empty data.
    pub warnings: Vec<String>,
}

impl DashboardSnapshot {
    pub fn counts(&self) -> UrgencyCounts {
        UrgencyCounts::from_stores(&self.stores)
    }
}

/// Load stats, stores and orders and aggregate locally.
pub async fn load_dashboard(
    api: &dyn DashboardApi,
    matcher: &dyn StoreMatcher,
    config: &IntelligenceConfig,
    as_of: DateTime<Utc>,
) -> Result<DashboardSnapshot, ApiError> {
    let (stats, stores, orders) = tokio::join!(api.dashboard_stats(), api.stores(), api.orders());

    let stats = stats?;
    let mut warnings = Vec::new();

    let stores = stores.unwrap_or_else(|e| {
        warn!("Stores unavailable, showing none: {}", e);
        warnings.push(format!("Stores unavailable: {}", e));
        Vec::new()
    });
    let orders = orders.unwrap_or_else(|e| {
        warn!("Orders unavailable, showing none: {}", e);
        warnings.push(format!("Orders unavailable: {}", e));
        Vec::new()
    });

    let intelligence = aggregate_stores(&stores, &orders, matcher, config, as_of);
    let order_totals = DashboardStats::from_orders(&orders, config.commission_rate);
    info!(
        "Loaded {} stores and {} orders",
        intelligence.len(),
        orders.len()
    );

    Ok(DashboardSnapshot {
        as_of,
        source: IntelligenceSource::Local,
        stats,
        order_totals: Some(order_totals),
        stores: intelligence,
        order_count: orders.len(),
        warnings,
    })
}

/// Load the backend's pre-aggregated intelligence alongside the stats.
///
/// Both calls are required here; the intelligence list is the whole page.
pub async fn load_server_intelligence(
    api: &dyn DashboardApi,
    as_of: DateTime<Utc>,
) -> Result<DashboardSnapshot, ApiError> {
    let (stats, stores) = tokio::join!(api.dashboard_stats(), api.sales_intelligence());
    let stats = stats?;
    let stores = stores?;

    let order_count = stores.iter().map(|s| s.order_count).sum();
    info!("Loaded server intelligence for {} stores", stores.len());

    Ok(DashboardSnapshot {
        as_of,
        source: IntelligenceSource::Server,
        stats,
        order_totals: None,
        stores,
        order_count,
        warnings: Vec::new(),
    })
}

/// Trigger a LeafLink re-pull on the backend.
pub async fn run_sync(api: &dyn DashboardApi) -> Result<SyncSummary, ApiError> {
    info!("Starting LeafLink sync");
    let summary = api.sync().await?;
    info!(
        "Sync complete: {} orders, {} stores",
        summary.orders, summary.companies
    );
    Ok(summary)
}
