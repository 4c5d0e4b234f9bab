//! Order to store attribution.
//!
//! Orders coming out of LeafLink only carry the buyer name as typed by the
//! buyer, so the default attribution is a case-insensitive substring
//! overlap between that name and the store name, in either direction.
//! Overlapping names ("Green Room" vs "Green Room East") can attribute one
//! order to several stores. When the ingestion side supplies a `store_id`,
//! [`StoreIdMatcher`] uses it and only falls back to names without one.

use crate::config::{IntelligenceConfig, MatchStrategy};
use crate::models::{Order, Store};

/// Decides whether an order belongs to a store.
pub trait StoreMatcher: Send + Sync {
    fn matches(&self, order: &Order, store: &Store) -> bool;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// True when either name contains the other, ignoring case.
///
/// Names are compared as given. An empty name is contained in every other
/// name, so it overlaps everything.
pub fn names_overlap(buyer_name: &str, store_name: &str) -> bool {
    let buyer = buyer_name.to_lowercase();
    let store = store_name.to_lowercase();

    buyer.contains(&store) || store.contains(&buyer)
}

/// Substring match on buyer name vs store name.
///
/// Orders without a buyer name never match. With `ignore_blank_buyers`
/// set, empty or whitespace-only buyer names match nothing either;
/// otherwise they overlap every store.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzyNameMatcher {
    pub ignore_blank_buyers: bool,
}

impl FuzzyNameMatcher {
    pub fn new(ignore_blank_buyers: bool) -> Self {
        Self { ignore_blank_buyers }
    }
}

impl StoreMatcher for FuzzyNameMatcher {
    fn matches(&self, order: &Order, store: &Store) -> bool {
        let Some(buyer) = order.buyer_name.as_deref() else {
            return false;
        };

        if self.ignore_blank_buyers && buyer.trim().is_empty() {
            return false;
        }

        names_overlap(buyer, &store.name)
    }

    fn name(&self) -> &'static str {
        "fuzzy-name"
    }
}

/// Explicit `store_id` join with a fuzzy fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreIdMatcher {
    fallback: FuzzyNameMatcher,
}

impl StoreMatcher for StoreIdMatcher {
    fn matches(&self, order: &Order, store: &Store) -> bool {
        match order.store_id {
            Some(ref id) => *id == store.id,
            None => self.fallback.matches(order, store),
        }
    }

    fn name(&self) -> &'static str {
        "store-id"
    }
}

/// Build the matcher for the configured strategy.
pub fn matcher_for(config: &IntelligenceConfig) -> Box<dyn StoreMatcher> {
    let fuzzy = FuzzyNameMatcher::new(config.ignore_blank_buyer_names);

    match config.matching {
        MatchStrategy::Fuzzy => Box::new(fuzzy),
        MatchStrategy::StoreId => Box::new(StoreIdMatcher { fallback: fuzzy }),
    }
}
