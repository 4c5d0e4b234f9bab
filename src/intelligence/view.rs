//! Filtering, ordering and tier counts for the store list.

use crate::models::{StoreIntelligence, Urgency};
use serde::Serialize;
use std::cmp::Ordering;

/// Which stores to show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreFilter {
    /// Keep only this tier; `None` keeps every tier.
    pub urgency: Option<Urgency>,
    /// Case-insensitive substring of the store name.
    pub search: Option<String>,
}

impl StoreFilter {
    pub fn matches(&self, store: &StoreIntelligence) -> bool {
        if let Some(tier) = self.urgency {
            if store.urgency != tier {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => store
                .store
                .name
                .to_lowercase()
                .contains(&term.to_lowercase()),
            _ => true,
        }
    }

    /// Human-readable description for report headers.
    pub fn describe(&self) -> String {
        let tier = self
            .urgency
            .map(|u| u.to_string())
            .unwrap_or_else(|| "all".to_string());

        match self.search.as_deref() {
            Some(term) if !term.trim().is_empty() => format!("{} matching \"{}\"", tier, term.trim()),
            _ => tier,
        }
    }
}

/// Display order: tier first (urgent, warning, good), then most overdue,
/// then longest since last order, then name.
pub fn compare_stores(a: &StoreIntelligence, b: &StoreIntelligence) -> Ordering {
    a.urgency
        .cmp(&b.urgency)
        .then_with(|| b.urgency_score.cmp(&a.urgency_score))
        .then_with(|| b.days_since_last_order.cmp(&a.days_since_last_order))
        .then_with(|| {
            a.store
                .name
                .to_lowercase()
                .cmp(&b.store.name.to_lowercase())
        })
}

/// Sort stores in display order.
pub fn sort_stores(stores: &mut [StoreIntelligence]) {
    stores.sort_by(compare_stores);
}

/// Filter, then sort, returning the stores to display.
pub fn select_stores(stores: &[StoreIntelligence], filter: &StoreFilter) -> Vec<StoreIntelligence> {
    let mut selected: Vec<StoreIntelligence> = stores
        .iter()
        .filter(|s| filter.matches(s))
        .cloned()
        .collect();
    sort_stores(&mut selected);
    selected
}

/// Find a store by case-insensitive name substring, most urgent first.
pub fn find_store<'a>(stores: &'a [StoreIntelligence], query: &str) -> Option<&'a StoreIntelligence> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    stores
        .iter()
        .filter(|s| s.store.name.to_lowercase().contains(&needle))
        .min_by(|a, b| compare_stores(a, b))
}

/// Number of stores in each tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UrgencyCounts {
    pub urgent: usize,
    pub warning: usize,
    pub good: usize,
}

impl UrgencyCounts {
    pub fn from_stores(stores: &[StoreIntelligence]) -> Self {
        let mut counts = Self::default();

        for store in stores {
            match store.urgency {
                Urgency::Urgent => counts.urgent += 1,
                Urgency::Warning => counts.warning += 1,
                Urgency::Good => counts.good += 1,
            }
        }

        counts
    }

    pub fn total(&self) -> usize {
        self.urgent + self.warning + self.good
    }

    /// Stores at or above the given tier.
    pub fn at_or_above(&self, tier: Urgency) -> usize {
        [
            (Urgency::Urgent, self.urgent),
            (Urgency::Warning, self.warning),
            (Urgency::Good, self.good),
        ]
        .into_iter()
        .filter(|(t, _)| t.severity() >= tier.severity())
        .map(|(_, n)| n)
        .sum()
    }
}
