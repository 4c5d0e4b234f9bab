//! Product and strain insights for the store detail view.
//!
//! These work on the product fields the sales-intelligence endpoint fills
//! in. Locally aggregated stores carry no product data, so every function
//! here degrades to zeros / empty lists for them.

use crate::models::{StoreIntelligence, StrainBreakdown};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Cannabis strain family of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrainType {
    Indica,
    Sativa,
    Hybrid,
}

impl StrainType {
    /// Classify a free-form strain label. Anything that does not mention
    /// indica or sativa counts as hybrid.
    pub fn classify(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("indica") {
            StrainType::Indica
        } else if label.contains("sativa") {
            StrainType::Sativa
        } else {
            StrainType::Hybrid
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            StrainType::Indica => "🟣",
            StrainType::Sativa => "🟢",
            StrainType::Hybrid => "🟡",
        }
    }
}

impl fmt::Display for StrainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrainType::Indica => write!(f, "Indica"),
            StrainType::Sativa => write!(f, "Sativa"),
            StrainType::Hybrid => write!(f, "Hybrid"),
        }
    }
}

/// Percentage of strain revenue per family, unrounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StrainShares {
    pub indica: f64,
    pub sativa: f64,
    pub hybrid: f64,
}

impl StrainShares {
    pub fn from_breakdown(breakdown: &StrainBreakdown) -> Self {
        let total = breakdown.total();
        if total <= 0.0 {
            return Self::default();
        }

        Self {
            indica: breakdown.indica / total * 100.0,
            sativa: breakdown.sativa / total * 100.0,
            hybrid: breakdown.hybrid / total * 100.0,
        }
    }

    /// Whole percentages, as shown on store cards.
    pub fn rounded(&self) -> (i64, i64, i64) {
        (
            self.indica.round() as i64,
            self.sativa.round() as i64,
            self.hybrid.round() as i64,
        )
    }
}

/// Rounds to one decimal, the precision the detail view shows.
pub fn one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Sales recommendation derived from strain preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrainPreference {
    StrongIndica,
    StrongSativa,
    HybridLover,
    Balanced,
}

impl StrainPreference {
    pub fn recommendation(&self) -> &'static str {
        match self {
            StrainPreference::StrongIndica => {
                "Strong Indica preference! Recommend new Indica products."
            }
            StrainPreference::StrongSativa => "Strong Sativa preference! Focus on Sativa products.",
            StrainPreference::HybridLover => "They love Hybrids! Push hybrid product line.",
            StrainPreference::Balanced => {
                "Balanced preferences - offer variety across all strain types."
            }
        }
    }
}

/// Preferences that apply, judged on the one-decimal percentages.
///
/// Indica or sativa above 50% and hybrid above 40% each fire independently;
/// when none fires the store is balanced.
pub fn strain_preferences(shares: &StrainShares) -> Vec<StrainPreference> {
    let mut preferences = Vec::new();

    if one_decimal(shares.indica) > 50.0 {
        preferences.push(StrainPreference::StrongIndica);
    }
    if one_decimal(shares.sativa) > 50.0 {
        preferences.push(StrainPreference::StrongSativa);
    }
    if one_decimal(shares.hybrid) > 40.0 {
        preferences.push(StrainPreference::HybridLover);
    }

    if preferences.is_empty() {
        preferences.push(StrainPreference::Balanced);
    }

    preferences
}

/// Revenue share of one product category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub revenue: f64,
    pub percent: f64,
}

/// Category revenue as a share of the store's total revenue, largest first.
pub fn category_shares(store: &StoreIntelligence) -> Vec<CategoryShare> {
    let mut shares: Vec<CategoryShare> = store
        .category_breakdown
        .iter()
        .map(|(category, revenue)| CategoryShare {
            category: category.clone(),
            revenue: *revenue,
            percent: if store.total_revenue > 0.0 {
                revenue / store.total_revenue * 100.0
            } else {
                0.0
            },
        })
        .collect();

    shares.sort_by(|a, b| {
        b.revenue
            .partial_cmp(&a.revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });

    shares
}

/// Commission earned on a revenue amount.
pub fn commission(amount: f64, rate: f64) -> f64 {
    amount * rate
}

/// Everything the detail view shows beyond the raw intelligence record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreDetail {
    pub avg_order_value: f64,
    pub days_overdue: Option<i64>,
    pub days_until_next_order: Option<i64>,
    pub next_expected_order: Option<DateTime<Utc>>,
    pub commission: f64,
    pub commission_90d: f64,
    pub strain_shares: Option<StrainShares>,
    pub strain_preferences: Vec<StrainPreference>,
    pub categories: Vec<CategoryShare>,
}

impl StoreDetail {
    pub fn from_intelligence(store: &StoreIntelligence, commission_rate: f64) -> Self {
        let avg_order_value = if store.order_count > 0 {
            store.total_revenue / store.order_count as f64
        } else {
            0.0
        };

        let days_overdue = store.days_overdue();
        let days_until_next_order = match days_overdue {
            Some(_) => None,
            None => Some(store.avg_cycle - store.days_since_last_order),
        };

        let strain_shares = store
            .strain_type_breakdown
            .as_ref()
            .map(StrainShares::from_breakdown);
        let strain_preferences = strain_shares
            .as_ref()
            .map(strain_preferences)
            .unwrap_or_default();

        Self {
            avg_order_value,
            days_overdue,
            days_until_next_order,
            next_expected_order: store.expected_next_order(),
            commission: commission(store.total_revenue, commission_rate),
            commission_90d: commission(store.revenue_90d, commission_rate),
            strain_shares,
            strain_preferences,
            categories: category_shares(store),
        }
    }
}
