//! Sales API access.
//!
//! [`DashboardApi`] is the seam between the dashboard loader and the
//! backend; [`ApiClient`] is the HTTP implementation.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;

use crate::models::{DashboardStats, Order, Store, StoreIntelligence, SyncSummary};
use async_trait::async_trait;

/// Endpoints of the sales backend.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// `GET /api/dashboard`
    async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError>;

    /// `GET /api/stores`
    async fn stores(&self) -> Result<Vec<Store>, ApiError>;

    /// `GET /api/orders`
    async fn orders(&self) -> Result<Vec<Order>, ApiError>;

    /// `GET /api/sales-intelligence`, aggregated by the backend.
    async fn sales_intelligence(&self) -> Result<Vec<StoreIntelligence>, ApiError>;

    /// `POST /api/sync`, re-pull data from LeafLink.
    async fn sync(&self) -> Result<SyncSummary, ApiError>;
}
