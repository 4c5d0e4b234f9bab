//! Reorder intelligence.
//!
//! Attribution of orders to stores, per-store aggregation, list
//! filtering/sorting, and the product insights shown on the detail view.

pub mod aggregator;
pub mod matcher;
pub mod products;
pub mod view;

pub use aggregator::aggregate_stores;
pub use matcher::{matcher_for, StoreMatcher};
pub use products::StoreDetail;
pub use view::{find_store, select_stores, StoreFilter, UrgencyCounts};
