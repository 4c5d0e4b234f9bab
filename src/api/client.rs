//! HTTP client for the sales backend.

use crate::api::{ApiError, DashboardApi};
use crate::config::ApiConfig;
use crate::models::{DashboardStats, Order, Store, StoreIntelligence, SyncSummary};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

const DASHBOARD: &str = "/api/dashboard";
const STORES: &str = "/api/stores";
const ORDERS: &str = "/api/orders";
const SALES_INTELLIGENCE: &str = "/api/sales-intelligence";
const SYNC: &str = "/api/sync";

/// `GET /api/dashboard` response.
#[derive(Debug, Deserialize)]
struct DashboardResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    stats: Option<DashboardStats>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StoresResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    stores: Vec<Store>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrdersResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    orders: Vec<Order>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SalesIntelligenceResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    stores: Vec<StoreIntelligence>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SyncResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    orders: u64,
    #[serde(default)]
    line_items: Option<u64>,
    #[serde(default)]
    companies: u64,
    #[serde(default)]
    error: Option<String>,
}

/// Error body some endpoints send alongside a non-2xx status.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    success: bool,
    error: Option<String>,
}

/// Turn `success: false` into an application error.
fn check_success(success: bool, error: Option<String>, fallback: &str) -> Result<(), ApiError> {
    if success {
        Ok(())
    } else {
        Err(ApiError::Application(
            error.unwrap_or_else(|| fallback.to_string()),
        ))
    }
}

/// Client for the sales backend.
pub struct ApiClient {
    base_url: String,
    timeout: Duration,
    http_client: reqwest::Client,
}

impl ApiClient {
    /// Create a client for the given base URL.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        info!("Using sales API at {} (timeout {:?})", base_url, timeout);

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            base_url,
            timeout,
            http_client,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_seconds))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let request = self.http_client.get(self.url(endpoint));
        self.execute(request, endpoint).await
    }

    async fn post<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let request = self.http_client.post(self.url(endpoint));
        self.execute(request, endpoint).await
    }

    /// Send a request and decode the JSON body.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        endpoint: &str,
    ) -> Result<T, ApiError> {
        debug!("Requesting {}", endpoint);

        let response = request
            .send()
            .await
            .map_err(|e| self.send_error(e, endpoint))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.send_error(e, endpoint))?;

        if !status.is_success() {
            // Prefer the application's own message when it sent one
            if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) {
                if !envelope.success {
                    if let Some(message) = envelope.error {
                        return Err(ApiError::Application(message));
                    }
                }
            }

            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    fn send_error(&self, error: reqwest::Error, endpoint: &str) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout {
                endpoint: endpoint.to_string(),
                timeout: self.timeout,
            }
        } else if error.is_connect() {
            ApiError::Connect {
                url: self.base_url.clone(),
                source: error,
            }
        } else {
            ApiError::Transport {
                endpoint: endpoint.to_string(),
                source: error,
            }
        }
    }
}

#[async_trait]
impl DashboardApi for ApiClient {
    async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        let response: DashboardResponse = self.get(DASHBOARD).await?;
        check_success(response.success, response.error, "Failed to load dashboard")?;
        Ok(response.stats.unwrap_or_default())
    }

    async fn stores(&self) -> Result<Vec<Store>, ApiError> {
        let response: StoresResponse = self.get(STORES).await?;
        check_success(
            response.success.unwrap_or(true),
            response.error,
            "Failed to load stores",
        )?;
        debug!("Fetched {} stores", response.stores.len());
        Ok(response.stores)
    }

    async fn orders(&self) -> Result<Vec<Order>, ApiError> {
        let response: OrdersResponse = self.get(ORDERS).await?;
        check_success(
            response.success.unwrap_or(true),
            response.error,
            "Failed to load orders",
        )?;
        debug!("Fetched {} orders", response.orders.len());
        Ok(response.orders)
    }

    async fn sales_intelligence(&self) -> Result<Vec<StoreIntelligence>, ApiError> {
        let response: SalesIntelligenceResponse = self.get(SALES_INTELLIGENCE).await?;
        check_success(
            response.success,
            response.error,
            "Failed to load sales intelligence",
        )?;
        debug!("Fetched intelligence for {} stores", response.stores.len());
        Ok(response.stores)
    }

    async fn sync(&self) -> Result<SyncSummary, ApiError> {
        let response: SyncResponse = self.post(SYNC).await?;
        check_success(response.success, response.error, "Sync failed")?;
        Ok(SyncSummary {
            orders: response.orders,
            line_items: response.line_items,
            companies: response.companies,
        })
    }
}
