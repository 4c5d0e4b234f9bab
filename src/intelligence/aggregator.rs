//! Store intelligence aggregation.
//!
//! Turns the raw store and order lists into one [`StoreIntelligence`] record
//! per store. Everything here is a pure function of its inputs; the
//! reference time is always passed in.

use crate::config::IntelligenceConfig;
use crate::intelligence::matcher::StoreMatcher;
use crate::models::{Order, Store, StoreIntelligence, Urgency};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::debug;

const SECONDS_PER_DAY: i64 = 86_400;

/// Whole days from `earlier` to `later`, rounded down.
pub fn whole_days_between(later: DateTime<Utc>, earlier: DateTime<Utc>) -> i64 {
    (later - earlier).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Build intelligence records for every store.
///
/// Output order follows `stores`; use [`crate::intelligence::view`] to sort.
pub fn aggregate_stores(
    stores: &[Store],
    orders: &[Order],
    matcher: &dyn StoreMatcher,
    config: &IntelligenceConfig,
    as_of: DateTime<Utc>,
) -> Vec<StoreIntelligence> {
    let intel: Vec<StoreIntelligence> = stores
        .iter()
        .map(|store| {
            let matched: Vec<&Order> = orders
                .iter()
                .filter(|order| matcher.matches(order, store))
                .collect();
            compute_store_intelligence(store, matched, config, as_of)
        })
        .collect();

    let unmatched = orders
        .iter()
        .filter(|order| !stores.iter().any(|store| matcher.matches(order, store)))
        .count();
    if unmatched > 0 {
        debug!(
            "{} of {} orders matched no store ({} matcher)",
            unmatched,
            orders.len(),
            matcher.name()
        );
    }

    debug!(
        "Aggregated {} stores from {} orders as of {}",
        intel.len(),
        orders.len(),
        as_of.format("%Y-%m-%d %H:%M")
    );

    intel
}

/// Compute the intelligence record for one store from its matched orders.
pub fn compute_store_intelligence(
    store: &Store,
    mut orders: Vec<&Order>,
    config: &IntelligenceConfig,
    as_of: DateTime<Utc>,
) -> StoreIntelligence {
    // Newest first
    orders.sort_by(|a, b| b.order_date.cmp(&a.order_date));

    let total_revenue: f64 = orders.iter().map(|o| o.amount()).sum();
    let last_order = orders.first().map(|o| (*o).clone());

    let days_since_last_order = last_order
        .as_ref()
        .map(|o| whole_days_between(as_of, o.order_date))
        .unwrap_or(config.no_orders_days);

    let avg_cycle = average_cycle(&orders, config);
    let urgency = classify_urgency(days_since_last_order, avg_cycle, config);

    let window_start = as_of - Duration::days(config.revenue_window_days);
    let revenue_90d: f64 = orders
        .iter()
        .filter(|o| o.order_date >= window_start)
        .map(|o| o.amount())
        .sum();

    StoreIntelligence {
        store: store.clone(),
        order_count: orders.len(),
        total_revenue,
        last_order,
        days_since_last_order,
        avg_cycle,
        urgency,
        urgency_score: urgency_score(days_since_last_order, avg_cycle),
        revenue_90d,
        top_products: Vec::new(),
        strain_type_breakdown: None,
        category_breakdown: HashMap::new(),
        next_expected_order: None,
    }
}

/// Average gap in days between consecutive orders.
///
/// `orders` must be sorted newest first. Gaps of zero days and gaps of
/// `max_cycle_days` or more are dropped; with nothing left the configured
/// default cycle is returned.
pub fn average_cycle(orders: &[&Order], config: &IntelligenceConfig) -> i64 {
    let cycles: Vec<i64> = orders
        .windows(2)
        .map(|pair| whole_days_between(pair[0].order_date, pair[1].order_date))
        .filter(|days| *days > 0 && *days < config.max_cycle_days)
        .collect();

    if cycles.is_empty() {
        return config.default_cycle_days;
    }

    let mean = cycles.iter().sum::<i64>() as f64 / cycles.len() as f64;
    mean.round() as i64
}

/// Urgency tier for a store given how long since it last ordered.
pub fn classify_urgency(
    days_since_last_order: i64,
    avg_cycle: i64,
    config: &IntelligenceConfig,
) -> Urgency {
    let days = days_since_last_order as f64;
    let cycle = avg_cycle as f64;

    if days > cycle * config.urgent_multiplier {
        Urgency::Urgent
    } else if days > cycle * config.warning_multiplier {
        Urgency::Warning
    } else {
        Urgency::Good
    }
}

/// Days overdue, zero when the store is within its cycle.
pub fn urgency_score(days_since_last_order: i64, avg_cycle: i64) -> i64 {
    (days_since_last_order - avg_cycle).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intelligence::matcher::FuzzyNameMatcher;
    use crate::models::RecordId;
    use chrono::TimeZone;

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn store(id: i64, name: &str) -> Store {
        Store {
            id: RecordId::Number(id),
            name: name.to_string(),
            city: "Denver".to_string(),
            state: Some("CO".to_string()),
            buyer_name: None,
            buyer_phone: None,
            buyer_email: None,
        }
    }

    fn order(buyer: &str, days_ago: i64, amount: Option<f64>) -> Order {
        Order {
            id: RecordId::Number(days_ago),
            buyer_name: Some(buyer.to_string()),
            order_date: as_of() - Duration::days(days_ago),
            order_number: None,
            total_amount: amount,
            status: None,
            store_id: None,
        }
    }

    fn aggregate_one(orders: &[Order]) -> StoreIntelligence {
        let config = IntelligenceConfig::default();
        let mut intel =
            aggregate_stores(&[store(1, "A")], orders, &FuzzyNameMatcher::default(), &config, as_of());
        intel.remove(0)
    }

    #[test]
    fn test_end_to_end_two_orders() {
        let intel = aggregate_one(&[
            order("A", 5, Some(100.0)),
            order("A", 20, Some(50.0)),
        ]);

        assert_eq!(intel.order_count, 2);
        assert_eq!(intel.total_revenue, 150.0);
        assert_eq!(intel.avg_cycle, 15);
        assert_eq!(intel.days_since_last_order, 5);
        assert_eq!(intel.urgency, Urgency::Good);
        assert_eq!(intel.urgency_score, 0);
        assert_eq!(intel.revenue_90d, 150.0);
        assert_eq!(
            intel.last_order.map(|o| o.order_date),
            Some(as_of() - Duration::days(5))
        );
    }

    #[test]
    fn test_no_orders_sentinel() {
        let intel = aggregate_one(&[order("Somebody Else", 3, Some(10.0))]);

        assert_eq!(intel.order_count, 0);
        assert_eq!(intel.total_revenue, 0.0);
        assert!(intel.last_order.is_none());
        assert_eq!(intel.days_since_last_order, 999);
        assert_eq!(intel.avg_cycle, 14);
        assert_eq!(intel.urgency, Urgency::Urgent);
        assert_eq!(intel.urgency_score, 985);
    }

    #[test]
    fn test_cycle_outlier_filter() {
        // Gaps of 5, 200 and 10 days
        let intel = aggregate_one(&[
            order("A", 0, Some(1.0)),
            order("A", 5, Some(1.0)),
            order("A", 205, Some(1.0)),
            order("A", 215, Some(1.0)),
        ]);

        assert_eq!(intel.avg_cycle, 8);
    }

    #[test]
    fn test_cycle_defaults() {
        let config = IntelligenceConfig::default();

        let single = order("A", 3, Some(1.0));
        assert_eq!(average_cycle(&[&single], &config), 14);

        // Same-day orders produce a zero gap, which is dropped
        let a = order("A", 3, Some(1.0));
        let b = order("A", 3, Some(2.0));
        assert_eq!(average_cycle(&[&a, &b], &config), 14);

        // Exactly max_cycle_days is an outlier
        let c = order("A", 0, Some(1.0));
        let d = order("A", 90, Some(1.0));
        assert_eq!(average_cycle(&[&c, &d], &config), 14);
    }

    #[test]
    fn test_partial_days_round_down() {
        let config = IntelligenceConfig::default();
        let last = Order {
            order_date: as_of() - Duration::hours(47),
            ..order("A", 0, Some(1.0))
        };

        let intel = compute_store_intelligence(&store(1, "A"), vec![&last], &config, as_of());
        assert_eq!(intel.days_since_last_order, 1);
        assert_eq!(whole_days_between(as_of(), as_of() + Duration::hours(1)), -1);
    }

    #[test]
    fn test_urgency_break_points() {
        let config = IntelligenceConfig::default();

        assert_eq!(classify_urgency(0, 20, &config), Urgency::Good);
        assert_eq!(classify_urgency(24, 20, &config), Urgency::Good);
        assert_eq!(classify_urgency(25, 20, &config), Urgency::Warning);
        assert_eq!(classify_urgency(30, 20, &config), Urgency::Warning);
        assert_eq!(classify_urgency(31, 20, &config), Urgency::Urgent);
    }

    #[test]
    fn test_urgency_monotonic_in_days() {
        let config = IntelligenceConfig::default();

        for cycle in [7, 14, 15, 20, 33] {
            let mut previous = Urgency::Good.severity();
            for days in 0..200 {
                let severity = classify_urgency(days, cycle, &config).severity();
                assert!(severity >= previous, "cycle {} day {}", cycle, days);
                previous = severity;
            }
        }
    }

    #[test]
    fn test_urgency_score() {
        assert_eq!(urgency_score(30, 14), 16);
        assert_eq!(urgency_score(14, 14), 0);
        assert_eq!(urgency_score(3, 14), 0);
    }

    #[test]
    fn test_revenue_window() {
        let intel = aggregate_one(&[
            order("A", 89, Some(40.0)),
            order("A", 91, Some(60.0)),
        ]);

        assert_eq!(intel.revenue_90d, 40.0);
        assert_eq!(intel.total_revenue, 100.0);
    }

    #[test]
    fn test_revenue_independent_of_input_order() {
        let orders = vec![
            order("A", 40, Some(12.5)),
            order("A", 2, None),
            order("A", 10, Some(100.25)),
            order("A", 25, Some(7.0)),
        ];
        let mut reversed = orders.clone();
        reversed.reverse();

        let forward = aggregate_one(&orders);
        let backward = aggregate_one(&reversed);

        assert_eq!(forward.total_revenue, 119.75);
        assert_eq!(forward.total_revenue, backward.total_revenue);
        assert_eq!(forward.avg_cycle, backward.avg_cycle);
        assert_eq!(forward.last_order, backward.last_order);
    }

    #[test]
    fn test_fuzzy_attribution_across_stores() {
        let config = IntelligenceConfig::default();
        let stores = vec![store(1, "Green Room"), store(2, "Blue Door")];
        let orders = vec![
            order("The Green Room Denver", 4, Some(80.0)),
            order("blue door", 6, Some(20.0)),
            order("Unknown Buyer", 1, Some(5.0)),
        ];

        let intel = aggregate_stores(&stores, &orders, &FuzzyNameMatcher::default(), &config, as_of());

        assert_eq!(intel.len(), 2);
        assert_eq!(intel[0].store.name, "Green Room");
        assert_eq!(intel[0].total_revenue, 80.0);
        assert_eq!(intel[1].total_revenue, 20.0);
    }
}
