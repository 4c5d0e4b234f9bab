//! Data models for store reorder intelligence.
//!
//! This module contains the records fetched from the sales API (stores,
//! orders, dashboard stats) and the derived per-store intelligence record.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Identifier as sent by the backend: either a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Lifecycle status of an order, as reported by the ordering platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
    Other(String),
}

impl From<&str> for OrderStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pending" => OrderStatus::Pending,
            "confirmed" => OrderStatus::Confirmed,
            "shipped" => OrderStatus::Shipped,
            "delivered" => OrderStatus::Delivered,
            "cancelled" | "canceled" => OrderStatus::Cancelled,
            _ => OrderStatus::Other(s.to_string()),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        OrderStatus::from(s.as_str())
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Confirmed => write!(f, "confirmed"),
            OrderStatus::Shipped => write!(f, "shipped"),
            OrderStatus::Delivered => write!(f, "delivered"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
            OrderStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

/// A single wholesale order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: RecordId,
    /// Buyer (store) name as typed on the order. Used for fuzzy attribution.
    #[serde(default)]
    pub buyer_name: Option<String>,
    #[serde(deserialize_with = "lenient::date")]
    pub order_date: DateTime<Utc>,
    #[serde(default)]
    pub order_number: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    /// Explicit store reference, when the ingestion side provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<RecordId>,
}

impl Order {
    /// Order amount, with a missing amount counting as zero.
    pub fn amount(&self) -> f64 {
        self.total_amount.unwrap_or(0.0)
    }
}

/// A retail store account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_email: Option<String>,
}

/// Reorder urgency tier.
///
/// Declaration order is display order: urgent stores sort first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Urgent,
    Warning,
    Good,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Urgency::Urgent => write!(f, "urgent"),
            Urgency::Warning => write!(f, "warning"),
            Urgency::Good => write!(f, "good"),
        }
    }
}

impl Urgency {
    /// Returns an emoji representation of the tier.
    pub fn emoji(&self) -> &'static str {
        match self {
            Urgency::Urgent => "🔥",
            Urgency::Warning => "⚠️",
            Urgency::Good => "✅",
        }
    }

    /// Call-to-action label shown next to a store.
    pub fn label(&self) -> &'static str {
        match self {
            Urgency::Urgent => "URGENT - CALL NOW",
            Urgency::Warning => "FOLLOW UP SOON",
            Urgency::Good => "ON SCHEDULE",
        }
    }

    /// Severity rank, higher is more pressing.
    pub fn severity(&self) -> u8 {
        match self {
            Urgency::Urgent => 2,
            Urgency::Warning => 1,
            Urgency::Good => 0,
        }
    }
}

/// A product line as summarized per store by the sales-intelligence endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strain_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub orders: u32,
}

/// Revenue per strain type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StrainBreakdown {
    #[serde(default)]
    pub indica: f64,
    #[serde(default)]
    pub sativa: f64,
    #[serde(default)]
    pub hybrid: f64,
}

impl StrainBreakdown {
    pub fn total(&self) -> f64 {
        self.indica + self.sativa + self.hybrid
    }
}

/// Derived reorder metrics for one store.
///
/// Built fresh on every load, either locally by the aggregator or by the
/// backend's sales-intelligence endpoint. The product fields are only
/// populated by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreIntelligence {
    #[serde(flatten)]
    pub store: Store,
    pub order_count: usize,
    pub total_revenue: f64,
    #[serde(default)]
    pub last_order: Option<Order>,
    pub days_since_last_order: i64,
    pub avg_cycle: i64,
    pub urgency: Urgency,
    #[serde(default)]
    pub urgency_score: i64,
    #[serde(default, rename = "revenue90d")]
    pub revenue_90d: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_products: Vec<ProductSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strain_type_breakdown: Option<StrainBreakdown>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub category_breakdown: HashMap<String, f64>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_expected_order: Option<DateTime<Utc>>,
}

impl StoreIntelligence {
    /// Days past the typical reorder cycle, if the store is overdue.
    pub fn days_overdue(&self) -> Option<i64> {
        let overdue = self.days_since_last_order - self.avg_cycle;
        (overdue > 0).then_some(overdue)
    }

    /// Expected date of the next order: the backend's value when it sent
    /// one, otherwise last order date plus the cycle.
    pub fn expected_next_order(&self) -> Option<DateTime<Utc>> {
        self.next_expected_order.or_else(|| {
            self.last_order
                .as_ref()
                .map(|o| o.order_date + Duration::days(self.avg_cycle))
        })
    }
}

/// Headline numbers from the dashboard endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default, deserialize_with = "lenient::count")]
    pub total_orders: u64,
    #[serde(default, deserialize_with = "lenient::amount_or_zero")]
    pub total_revenue: f64,
    #[serde(default, deserialize_with = "lenient::amount_or_zero")]
    pub avg_order_value: f64,
    #[serde(default, deserialize_with = "lenient::amount_or_zero")]
    pub total_commission: f64,
}

impl DashboardStats {
    /// Headline numbers computed from raw orders.
    pub fn from_orders(orders: &[Order], commission_rate: f64) -> Self {
        let total_revenue: f64 = orders.iter().map(Order::amount).sum();
        let total_orders = orders.len() as u64;
        let avg_order_value = if total_orders > 0 {
            total_revenue / total_orders as f64
        } else {
            0.0
        };

        Self {
            total_orders,
            total_revenue,
            avg_order_value,
            total_commission: total_revenue * commission_rate,
        }
    }
}

/// Counts reported by a completed sync job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub orders: u64,
    #[serde(default)]
    pub line_items: Option<u64>,
    pub companies: u64,
}

/// Parse the date formats the backend is known to emit.
///
/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.fff]` (as UTC) and plain
/// `YYYY-MM-DD` (midnight UTC).
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Tolerant field deserializers for backend payloads.
mod lenient {
    use super::*;
    use serde::de::Error;

    /// Amount as a number, numeric string or null.
    pub fn amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
    }

    pub fn amount_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(amount(deserializer)?.unwrap_or(0.0))
    }

    /// Count as a number or numeric string (Postgres bigints arrive as text).
    pub fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(amount(deserializer)?.map(|n| n.max(0.0) as u64).unwrap_or(0))
    }

    pub fn date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_date(&raw).ok_or_else(|| D::Error::custom(format!("invalid date: {}", raw)))
    }

    pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse_date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_urgency_ordering() {
        assert!(Urgency::Urgent < Urgency::Warning);
        assert!(Urgency::Warning < Urgency::Good);
        assert!(Urgency::Urgent.severity() > Urgency::Warning.severity());
    }

    #[test]
    fn test_order_status_from_str() {
        assert_eq!(OrderStatus::from("Delivered"), OrderStatus::Delivered);
        assert_eq!(OrderStatus::from("CANCELED"), OrderStatus::Cancelled);
        assert_eq!(
            OrderStatus::from("Backordered"),
            OrderStatus::Other("Backordered".to_string())
        );
    }

    #[test]
    fn test_parse_date_formats() {
        let midnight = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        assert_eq!(parse_date("2024-03-05"), Some(midnight));
        assert_eq!(parse_date("2024-03-05T00:00:00Z"), Some(midnight));
        assert_eq!(parse_date("2024-03-05T00:00:00"), Some(midnight));
        assert_eq!(
            parse_date("2024-03-05T02:00:00+02:00"),
            Some(midnight)
        );
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn test_order_lenient_amounts() {
        let json = r#"[
            {"id": 1, "buyer_name": "A", "order_date": "2024-01-01", "total_amount": "125.50", "status": "shipped"},
            {"id": "ord-2", "buyer_name": "A", "order_date": "2024-01-02", "total_amount": null},
            {"id": 3, "order_date": "2024-01-03T10:00:00.000Z"}
        ]"#;

        let orders: Vec<Order> = serde_json::from_str(json).unwrap();
        assert_eq!(orders[0].amount(), 125.5);
        assert_eq!(orders[0].status, Some(OrderStatus::Shipped));
        assert_eq!(orders[1].amount(), 0.0);
        assert_eq!(orders[1].id, RecordId::Text("ord-2".to_string()));
        assert_eq!(orders[2].buyer_name, None);
        assert_eq!(orders[2].amount(), 0.0);
    }

    #[test]
    fn test_store_intelligence_wire_names() {
        let json = r#"{
            "id": 7, "name": "Green Room", "city": "Denver", "buyer_name": "Sam",
            "orderCount": 3, "totalRevenue": 900.0, "lastOrder": null,
            "daysSinceLastOrder": 12, "avgCycle": 14, "urgency": "good",
            "urgencyScore": 0, "revenue90d": 600.0,
            "strainTypeBreakdown": {"indica": 100, "sativa": 200, "hybrid": 300},
            "nextExpectedOrder": "2024-05-01"
        }"#;

        let intel: StoreIntelligence = serde_json::from_str(json).unwrap();
        assert_eq!(intel.store.name, "Green Room");
        assert_eq!(intel.store.buyer_name.as_deref(), Some("Sam"));
        assert_eq!(intel.order_count, 3);
        assert_eq!(intel.revenue_90d, 600.0);
        assert_eq!(intel.urgency, Urgency::Good);
        assert_eq!(intel.strain_type_breakdown.map(|s| s.total()), Some(600.0));
        assert!(intel.next_expected_order.is_some());

        let back = serde_json::to_value(&intel).unwrap();
        assert_eq!(back["daysSinceLastOrder"], 12);
        assert_eq!(back["buyer_name"], "Sam");
        assert_eq!(back["revenue90d"], 600.0);
    }

    #[test]
    fn test_dashboard_stats_lenient_numbers() {
        let json = r#"{"total_orders": "42", "total_revenue": "1050.25", "avg_order_value": 25.0}"#;
        let stats: DashboardStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.total_orders, 42);
        assert_eq!(stats.total_revenue, 1050.25);
        assert_eq!(stats.total_commission, 0.0);
    }

    #[test]
    fn test_dashboard_stats_from_orders() {
        let json = r#"[
            {"id": 1, "buyer_name": "A", "order_date": "2024-05-01", "total_amount": "250.00"},
            {"id": 2, "buyer_name": "A", "order_date": "2024-05-10", "total_amount": null},
            {"id": 3, "buyer_name": "B", "order_date": "2024-05-20", "total_amount": 750}
        ]"#;
        let orders: Vec<Order> = serde_json::from_str(json).unwrap();

        let stats = DashboardStats::from_orders(&orders, 0.08);
        assert_eq!(stats.total_orders, 3);
        assert_eq!(stats.total_revenue, 1000.0);
        assert!((stats.avg_order_value - 333.333).abs() < 1e-3);
        assert_eq!(stats.total_commission, 80.0);

        let empty = DashboardStats::from_orders(&[], 0.08);
        assert_eq!(empty.total_orders, 0);
        assert_eq!(empty.avg_order_value, 0.0);
        assert_eq!(empty.total_commission, 0.0);
    }
}
