//! Markdown and JSON report generation.

use crate::intelligence::products::{one_decimal, StrainShares, StrainType};
use crate::models::{DashboardStats, StoreIntelligence, Urgency};
use crate::report::{ReportMetadata, StoreDetailReport, StoreListReport};
use anyhow::Result;

/// Format a dollar amount with thousands separators and cents.
pub fn format_money(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = cents / 100;
    let digits = dollars.to_string();

    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// Generate the store list as Markdown.
pub fn generate_markdown_report(report: &StoreListReport) -> String {
    let mut output = String::new();

    output.push_str("# 🍄 Store Reorder Intelligence\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&format!("- **Filter:** {}\n\n", report.filter));
    output.push_str(&generate_warnings_section(&report.warnings));
    output.push_str(&generate_summary_section(report));
    output.push_str(&generate_store_table(report));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **API:** {}\n", metadata.api_url));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **As Of:** {}\n",
        metadata.as_of.format("%Y-%m-%d %H:%M UTC")
    ));
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Load Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));

    section
}

fn generate_warnings_section(warnings: &[String]) -> String {
    if warnings.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## ⚠️ Partial Data\n\n");
    for warning in warnings {
        section.push_str(&format!("- {}\n", warning));
    }
    section.push('\n');

    section
}

/// Headline numbers and tier counts.
fn generate_summary_section(report: &StoreListReport) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str(&format!(
        "| | Orders | Revenue | Avg Order | Commission ({}%) |\n",
        one_decimal(report.commission_rate * 100.0)
    ));
    section.push_str("|:---|:---:|:---:|:---:|:---:|\n");
    section.push_str(&stats_row("Dashboard", &report.stats));
    if let Some(ref totals) = report.order_totals {
        section.push_str(&stats_row("Loaded orders", totals));
    }
    section.push('\n');

    let counts = &report.counts;
    section.push_str(&format!(
        "| {} Urgent - Call Today | {} Warning - Follow Up | {} Good - On Schedule | **Total** |\n",
        Urgency::Urgent.emoji(),
        Urgency::Warning.emoji(),
        Urgency::Good.emoji(),
    ));
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | **{}** |\n\n",
        counts.urgent,
        counts.warning,
        counts.good,
        counts.total()
    ));

    section
}

fn stats_row(label: &str, stats: &DashboardStats) -> String {
    format!(
        "| {} | {} | {} | {} | {} |\n",
        label,
        stats.total_orders,
        format_money(stats.total_revenue),
        format_money(stats.avg_order_value),
        format_money(stats.total_commission),
    )
}

/// The prioritized store table.
fn generate_store_table(report: &StoreListReport) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "## 🎯 Stores ({} shown)\n\n",
        report.stores.len()
    ));

    if report.stores.is_empty() {
        section.push_str("No stores match your filters.\n\n");
        return section;
    }

    let show_products = report
        .stores
        .iter()
        .any(|s| s.strain_type_breakdown.is_some() || !s.top_products.is_empty());

    let mut header = String::from(
        "| Status | Store | City | Last Order | Cycle | Overdue | Orders | Revenue | 90d Revenue |",
    );
    let mut align = String::from("|:---|:---|:---|:---:|:---:|:---:|:---:|---:|---:|");
    if show_products {
        header.push_str(" Strain Mix | Top Product |");
        align.push_str(":---:|:---|");
    }
    if report.include_contacts {
        header.push_str(" Buyer | Phone |");
        align.push_str(":---|:---|");
    }
    section.push_str(&header);
    section.push('\n');
    section.push_str(&align);
    section.push('\n');

    for store in &report.stores {
        section.push_str(&generate_store_row(store, show_products, report.include_contacts));
    }
    section.push('\n');

    section
}

fn generate_store_row(store: &StoreIntelligence, show_products: bool, include_contacts: bool) -> String {
    let last_order = if store.last_order.is_some() {
        format!("{}d ago", store.days_since_last_order)
    } else {
        "never".to_string()
    };
    let overdue = store
        .days_overdue()
        .map(|d| format!("{}d", d))
        .unwrap_or_else(|| "-".to_string());

    let mut row = format!(
        "| {} {} | {} | {} | {} | {}d | {} | {} | {} | {} |",
        store.urgency.emoji(),
        store.urgency.label(),
        store.store.name,
        location(store),
        last_order,
        store.avg_cycle,
        overdue,
        store.order_count,
        format_money(store.total_revenue),
        format_money(store.revenue_90d),
    );

    if show_products {
        row.push_str(&format!(
            " {} | {} |",
            strain_mix(store),
            store
                .top_products
                .first()
                .map(|p| p.name.as_str())
                .unwrap_or("-"),
        ));
    }

    if include_contacts {
        row.push_str(&format!(
            " {} | {} |",
            store.store.buyer_name.as_deref().unwrap_or("-"),
            store.store.buyer_phone.as_deref().unwrap_or("-"),
        ));
    }
    row.push('\n');

    row
}

/// Whole-percent strain shares for the list view, e.g. `🟣 25% 🟢 50% 🟡 25%`.
fn strain_mix(store: &StoreIntelligence) -> String {
    let Some(ref breakdown) = store.strain_type_breakdown else {
        return "-".to_string();
    };
    if breakdown.total() <= 0.0 {
        return "-".to_string();
    }

    let (indica, sativa, hybrid) = StrainShares::from_breakdown(breakdown).rounded();
    format!(
        "{} {}% {} {}% {} {}%",
        StrainType::Indica.emoji(),
        indica,
        StrainType::Sativa.emoji(),
        sativa,
        StrainType::Hybrid.emoji(),
        hybrid
    )
}

fn location(store: &StoreIntelligence) -> String {
    match store.store.state {
        Some(ref state) if !state.is_empty() => format!("{}, {}", store.store.city, state),
        _ => store.store.city.clone(),
    }
}

/// Generate the single-store detail view as Markdown.
pub fn generate_detail_markdown(report: &StoreDetailReport) -> String {
    let mut output = String::new();
    let store = &report.store;
    let detail = &report.detail;

    output.push_str(&format!("# {}\n\n", store.store.name));
    output.push_str(&format!(
        "**{} {}** · 📍 {}\n\n",
        store.urgency.emoji(),
        store.urgency.label(),
        location(store)
    ));

    output.push_str("## Contact\n\n");
    let contact_name = store.store.buyer_name.as_deref().unwrap_or("Store");
    output.push_str(&format!("- 👤 {}\n", contact_name));
    if let Some(ref phone) = store.store.buyer_phone {
        output.push_str(&format!("- 📞 {}\n", phone));
    }
    if let Some(ref email) = store.store.buyer_email {
        output.push_str(&format!("- 📧 {}\n", email));
    }
    output.push('\n');

    let never_ordered = store.last_order.is_none();

    if never_ordered {
        output.push_str("> 📞 **NO ORDERS ON RECORD.** Reach out to set up a first order.\n\n");
    } else if let Some(days) = detail.days_overdue {
        output.push_str(&format!(
            "> 📞 **OVERDUE BY {} DAYS.** This store typically orders every {} days. Last order was {} days ago.\n\n",
            days, store.avg_cycle, store.days_since_last_order
        ));
    }

    output.push_str("## Reorder Metrics\n\n");
    output.push_str("| Metric | Value |\n");
    output.push_str("|:---|:---|\n");
    output.push_str(&format!(
        "| Total Revenue | {} ({} orders) |\n",
        format_money(store.total_revenue),
        store.order_count
    ));
    output.push_str(&format!(
        "| Average Order | {} |\n",
        format_money(detail.avg_order_value)
    ));
    output.push_str(&format!(
        "| Revenue (90 days) | {} |\n",
        format_money(store.revenue_90d)
    ));
    output.push_str(&format!(
        "| Commission | {} ({} last 90 days) |\n",
        format_money(detail.commission),
        format_money(detail.commission_90d)
    ));
    let last_order = if never_ordered {
        "never".to_string()
    } else {
        format!("{} days ago", store.days_since_last_order)
    };
    output.push_str(&format!("| Last Order | {} |\n", last_order));
    output.push_str(&format!("| Typical Cycle | {} days |\n", store.avg_cycle));

    let next_order = match (detail.days_until_next_order, detail.next_expected_order) {
        _ if never_ordered => "-".to_string(),
        (Some(days), Some(date)) => format!("in {} days ({})", days, date.format("%Y-%m-%d")),
        (Some(days), None) => format!("in {} days", days),
        (None, _) => "OVERDUE".to_string(),
    };
    output.push_str(&format!("| Next Order | {} |\n\n", next_order));

    output.push_str(&generate_products_section(report));
    output.push_str(&generate_strain_section(report));
    output.push_str(&generate_category_section(report));
    output.push_str(&generate_footer());

    output
}

fn generate_products_section(report: &StoreDetailReport) -> String {
    let products = &report.store.top_products;
    if products.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Top Products\n\n");
    section.push_str("| # | Product | Strain | Category | Orders | Units | Revenue |\n");
    section.push_str("|:---:|:---|:---|:---|:---:|:---:|---:|\n");

    for (i, product) in products.iter().take(report.top_products).enumerate() {
        let strain = product
            .strain_type
            .as_deref()
            .map(|s| {
                let strain = StrainType::classify(s);
                format!("{} {}", strain.emoji(), strain)
            })
            .unwrap_or_else(|| "-".to_string());

        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            i + 1,
            product.name,
            strain,
            product.category.as_deref().unwrap_or("-"),
            product.orders,
            product.quantity,
            format_money(product.revenue),
        ));
    }
    section.push('\n');

    section
}

fn generate_strain_section(report: &StoreDetailReport) -> String {
    let (Some(breakdown), Some(shares)) = (
        report.store.strain_type_breakdown.as_ref(),
        report.detail.strain_shares.as_ref(),
    ) else {
        return String::new();
    };

    let mut section = String::new();
    section.push_str("## Strain Preferences\n\n");
    section.push_str("| Strain | Revenue | Share |\n");
    section.push_str("|:---|---:|---:|\n");

    for (strain, revenue, share) in [
        (StrainType::Indica, breakdown.indica, shares.indica),
        (StrainType::Sativa, breakdown.sativa, shares.sativa),
        (StrainType::Hybrid, breakdown.hybrid, shares.hybrid),
    ] {
        section.push_str(&format!(
            "| {} {} | {} | {:.1}% |\n",
            strain.emoji(),
            strain,
            format_money(revenue),
            one_decimal(share)
        ));
    }
    section.push('\n');

    for preference in &report.detail.strain_preferences {
        section.push_str(&format!("> 💡 {}\n", preference.recommendation()));
    }
    section.push('\n');

    section
}

fn generate_category_section(report: &StoreDetailReport) -> String {
    if report.detail.categories.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Categories\n\n");
    section.push_str("| Category | Revenue | Share |\n");
    section.push_str("|:---|---:|---:|\n");

    for category in &report.detail.categories {
        section.push_str(&format!(
            "| {} | {} | {:.1}% |\n",
            category.category,
            format_money(category.revenue),
            one_decimal(category.percent)
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by storeintel v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

/// Generate the store list as JSON.
pub fn generate_json_report(report: &StoreListReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate the detail view as JSON.
pub fn generate_detail_json(report: &StoreDetailReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::IntelligenceSource;
    use crate::intelligence::{StoreDetail, UrgencyCounts};
    use crate::models::{
        DashboardStats, Order, ProductSummary, RecordId, Store, StrainBreakdown,
    };
    use chrono::{Duration, TimeZone, Utc};
    use std::collections::HashMap;

    fn as_of() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn metadata() -> ReportMetadata {
        let as_of = as_of();
        ReportMetadata {
            api_url: "http://localhost:3001".to_string(),
            generated_at: as_of,
            as_of,
            source: IntelligenceSource::Local,
            duration_seconds: 0.4,
        }
    }

    fn store(name: &str, urgency: Urgency, days: i64) -> StoreIntelligence {
        StoreIntelligence {
            store: Store {
                id: RecordId::Number(1),
                name: name.to_string(),
                city: "Denver".to_string(),
                state: Some("CO".to_string()),
                buyer_name: Some("Sam".to_string()),
                buyer_phone: Some("555-0100".to_string()),
                buyer_email: Some("sam@example.com".to_string()),
            },
            order_count: 4,
            total_revenue: 12_345.5,
            last_order: Some(Order {
                id: RecordId::Number(10),
                buyer_name: Some(name.to_string()),
                order_date: as_of() - Duration::days(days),
                order_number: None,
                total_amount: Some(3_000.0),
                status: None,
                store_id: None,
            }),
            days_since_last_order: days,
            avg_cycle: 14,
            urgency,
            urgency_score: (days - 14).max(0),
            revenue_90d: 2_000.0,
            top_products: Vec::new(),
            strain_type_breakdown: None,
            category_breakdown: HashMap::new(),
            next_expected_order: None,
        }
    }

    fn list_report(stores: Vec<StoreIntelligence>) -> StoreListReport {
        StoreListReport {
            metadata: metadata(),
            filter: "all".to_string(),
            stats: DashboardStats {
                total_orders: 4,
                total_revenue: 12_345.5,
                avg_order_value: 3_086.375,
                total_commission: 987.64,
            },
            order_totals: None,
            counts: UrgencyCounts::from_stores(&stores),
            stores,
            warnings: Vec::new(),
            commission_rate: 0.08,
            include_contacts: true,
        }
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(12.5), "$12.50");
        assert_eq!(format_money(1234.567), "$1,234.57");
        assert_eq!(format_money(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_money(-42.0), "-$42.00");
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = list_report(vec![store("Green Room", Urgency::Urgent, 30)]);
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("## Summary"));
        assert!(markdown.contains("Green Room"));
        assert!(markdown.contains("URGENT - CALL NOW"));
        assert!(markdown.contains("| 16d |"));
        assert!(markdown.contains("$12,345.50"));
        assert!(markdown.contains("555-0100"));
        assert!(!markdown.contains("Partial Data"));
    }

    #[test]
    fn test_markdown_report_empty_and_warnings() {
        let mut report = list_report(Vec::new());
        report.warnings.push("Orders unavailable: timeout".to_string());
        report.include_contacts = false;

        let markdown = generate_markdown_report(&report);
        assert!(markdown.contains("No stores match your filters."));
        assert!(markdown.contains("Orders unavailable: timeout"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = list_report(vec![store("Green Room", Urgency::Good, 3)]);
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"daysSinceLastOrder\": 3"));
        assert!(json.contains("\"urgency\": \"good\""));
        assert!(json.contains("\"counts\""));
        assert!(!json.contains("include_contacts"));
    }

    #[test]
    fn test_generate_detail_markdown() {
        let mut intel = store("Green Room", Urgency::Urgent, 30);
        intel.top_products = vec![ProductSummary {
            name: "Blue Dream 3.5g".to_string(),
            strain_type: Some("Sativa".to_string()),
            category: Some("Flower".to_string()),
            quantity: 24.0,
            revenue: 480.0,
            orders: 3,
        }];
        intel.strain_type_breakdown = Some(StrainBreakdown {
            indica: 100.0,
            sativa: 700.0,
            hybrid: 200.0,
        });
        intel.category_breakdown.insert("Flower".to_string(), 480.0);

        let report = StoreDetailReport {
            metadata: metadata(),
            detail: StoreDetail::from_intelligence(&intel, 0.08),
            store: intel,
            top_products: 10,
        };
        let markdown = generate_detail_markdown(&report);

        assert!(markdown.contains("# Green Room"));
        assert!(markdown.contains("OVERDUE BY 16 DAYS"));
        assert!(markdown.contains("📞 555-0100"));
        assert!(markdown.contains("Blue Dream 3.5g"));
        assert!(markdown.contains("🟢 Sativa"));
        assert!(markdown.contains("70.0%"));
        assert!(markdown.contains("Focus on Sativa products"));
        assert!(markdown.contains("| Next Order | OVERDUE |"));

        let json = generate_detail_json(&report).unwrap();
        assert!(json.contains("\"strain_preferences\""));
        assert!(json.contains("\"strong_sativa\""));
    }

    #[test]
    fn test_summary_shows_rate_and_loaded_totals() {
        let mut report = list_report(vec![store("Green Room", Urgency::Good, 3)]);
        let markdown = generate_markdown_report(&report);
        assert!(markdown.contains("Commission (8%)"));
        assert!(markdown.contains("| Dashboard | 4 | $12,345.50 | $3,086.38 | $987.64 |"));
        assert!(!markdown.contains("Loaded orders"));

        report.commission_rate = 0.075;
        report.order_totals = Some(DashboardStats {
            total_orders: 2,
            total_revenue: 1_000.0,
            avg_order_value: 500.0,
            total_commission: 75.0,
        });
        let markdown = generate_markdown_report(&report);
        assert!(markdown.contains("Commission (7.5%)"));
        assert!(markdown.contains("| Loaded orders | 2 | $1,000.00 | $500.00 | $75.00 |"));
    }

    #[test]
    fn test_store_table_strain_mix() {
        let mut mixed = store("Green Room", Urgency::Warning, 18);
        mixed.strain_type_breakdown = Some(StrainBreakdown {
            indica: 100.0,
            sativa: 200.0,
            hybrid: 100.0,
        });
        mixed.top_products = vec![ProductSummary {
            name: "Blue Dream 3.5g".to_string(),
            strain_type: Some("Sativa".to_string()),
            category: Some("Flower".to_string()),
            quantity: 12.0,
            revenue: 240.0,
            orders: 2,
        }];
        let plain = store("Blue Door", Urgency::Good, 2);

        let markdown = generate_markdown_report(&list_report(vec![mixed, plain]));
        assert!(markdown.contains("| Strain Mix | Top Product |"));
        assert!(markdown.contains("| 🟣 25% 🟢 50% 🟡 25% | Blue Dream 3.5g |"));
        assert!(markdown.contains("| - | - | Sam |"));

        let markdown =
            generate_markdown_report(&list_report(vec![store("Blue Door", Urgency::Good, 2)]));
        assert!(!markdown.contains("Strain Mix"));
    }

    #[test]
    fn test_detail_markdown_never_ordered() {
        let mut intel = store("New Leaf", Urgency::Urgent, 999);
        intel.last_order = None;
        intel.order_count = 0;
        intel.total_revenue = 0.0;
        intel.revenue_90d = 0.0;

        let report = StoreDetailReport {
            metadata: metadata(),
            detail: StoreDetail::from_intelligence(&intel, 0.08),
            store: intel,
            top_products: 10,
        };
        let markdown = generate_detail_markdown(&report);

        assert!(markdown.contains("NO ORDERS ON RECORD"));
        assert!(markdown.contains("| Last Order | never |"));
        assert!(markdown.contains("| Next Order | - |"));
        assert!(!markdown.contains("999"));
        assert!(!markdown.contains("OVERDUE BY"));
    }
}
