//! storeintel - reorder intelligence for dispensary store accounts
//!
//! A CLI tool that loads stores and orders from the sales API, works out
//! each store's reorder cycle and urgency, and prints a prioritized call
//! list or a single-store detail report.
//!
//! Exit codes:
//!   0 - Success (no stores at or above threshold, or no --fail-on set)
//!   1 - Runtime error (connection, config, API failure, etc.)
//!   2 - Stores found at or above the --fail-on tier

mod api;
mod cli;
mod config;
mod dashboard;
mod intelligence;
mod models;
mod report;

use anyhow::{bail, Context, Result};
use api::{ApiClient, ApiError, DashboardApi};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use dashboard::DashboardSnapshot;
use indicatif::{ProgressBar, ProgressStyle};
use intelligence::{StoreDetail, StoreFilter};
use report::{ReportMetadata, StoreDetailReport, StoreListReport};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("storeintel v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Load failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            if e.downcast_ref::<ApiError>().is_some_and(ApiError::is_transport) {
                eprintln!("   Is the backend reachable? Set --api-url or STOREINTEL_API_URL.");
            }
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .storeintel.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!("⚠️  .storeintel.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .storeintel.toml")?;

    println!("✅ Created .storeintel.toml with default settings.");
    println!("   Edit it to set the API URL, urgency thresholds and report options.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Spinner shown while waiting on the API. Hidden in quiet mode.
fn spinner(args: &Args, message: &str) -> ProgressBar {
    if args.quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Run the load/report workflow. Returns exit code (0 or 2).
async fn run(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let client = ApiClient::from_config(&config.api)?;

    if args.sync {
        handle_sync(&args, &client).await?;
    }

    let as_of = args.as_of.unwrap_or_else(Utc::now);
    let start_time = Instant::now();

    let pb = spinner(&args, "Loading sales intelligence...");
    let loaded = load_snapshot(&args, &config, &client, as_of).await;
    pb.finish_and_clear();
    let snapshot = loaded?;
    debug!(
        "Snapshot from {}: {} stores, {} orders",
        snapshot.source,
        snapshot.stores.len(),
        snapshot.order_count
    );

    for warning in &snapshot.warnings {
        if !args.quiet {
            eprintln!("⚠️  {}", warning);
        }
    }

    let metadata = ReportMetadata {
        api_url: client.base_url().to_string(),
        generated_at: Utc::now(),
        as_of,
        source: snapshot.source,
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };

    let format = config.report.format;
    let output = match args.store {
        Some(ref query) => render_store_detail(&snapshot, query, metadata, &config, format)?,
        None => render_store_list(&args, &snapshot, metadata, &config, format)?,
    };

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !args.quiet {
                eprintln!("✅ Report saved to: {}", path.display());
            }
        }
        None => print!("{}", output),
    }

    let counts = snapshot.counts();
    if !args.quiet {
        eprintln!(
            "📊 {} stores: {} {} urgent | {} {} warning | {} {} good",
            counts.total(),
            models::Urgency::Urgent.emoji(),
            counts.urgent,
            models::Urgency::Warning.emoji(),
            counts.warning,
            models::Urgency::Good.emoji(),
            counts.good
        );
    }

    // Check --fail-on threshold
    if let Some(level) = args.fail_on {
        let flagged = counts.at_or_above(level.urgency());
        if flagged > 0 {
            eprintln!(
                "\n⛔ {} stores at or above {} urgency. Failing (exit code 2).",
                flagged,
                level.urgency()
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Trigger a LeafLink sync. A failed sync aborts the run.
async fn handle_sync(args: &Args, client: &dyn DashboardApi) -> Result<()> {
    let pb = spinner(args, "Syncing LeafLink...");
    let result = dashboard::run_sync(client).await;
    pb.finish_and_clear();

    let summary = result.context("❌ Sync failed")?;
    if !args.quiet {
        eprintln!(
            "✅ Synced! {} orders, {} products, {} stores",
            summary.orders,
            summary
                .line_items
                .map(|n| n.to_string())
                .unwrap_or_else(|| "?".to_string()),
            summary.companies
        );
    }

    Ok(())
}

async fn load_snapshot(
    args: &Args,
    config: &Config,
    client: &dyn DashboardApi,
    as_of: chrono::DateTime<Utc>,
) -> Result<DashboardSnapshot> {
    let snapshot = if args.server_side {
        dashboard::load_server_intelligence(client, as_of).await?
    } else {
        let matcher = intelligence::matcher_for(&config.intelligence);
        debug!("Attributing orders with the {} matcher", matcher.name());
        dashboard::load_dashboard(client, matcher.as_ref(), &config.intelligence, as_of).await?
    };

    Ok(snapshot)
}

fn render_store_list(
    args: &Args,
    snapshot: &DashboardSnapshot,
    metadata: ReportMetadata,
    config: &Config,
    format: OutputFormat,
) -> Result<String> {
    let filter = StoreFilter {
        urgency: args.urgency.tier(),
        search: args.search.clone(),
    };
    let stores = intelligence::select_stores(&snapshot.stores, &filter);
    info!("{} of {} stores match {}", stores.len(), snapshot.stores.len(), filter.describe());

    let report = StoreListReport {
        metadata,
        filter: filter.describe(),
        stats: snapshot.stats.clone(),
        order_totals: snapshot.order_totals.clone(),
        counts: snapshot.counts(),
        stores,
        warnings: snapshot.warnings.clone(),
        commission_rate: config.intelligence.commission_rate,
        include_contacts: config.report.include_contacts,
    };

    match format {
        OutputFormat::Json => report::generate_json_report(&report),
        OutputFormat::Markdown => Ok(report::generate_markdown_report(&report)),
    }
}

fn render_store_detail(
    snapshot: &DashboardSnapshot,
    query: &str,
    metadata: ReportMetadata,
    config: &Config,
    format: OutputFormat,
) -> Result<String> {
    let Some(store) = intelligence::find_store(&snapshot.stores, query) else {
        bail!("No store matches \"{}\"", query);
    };

    if store.top_products.is_empty() && store.strain_type_breakdown.is_none() {
        debug!("No product data for {}; use --server-side for product insights", store.store.name);
    }

    let report = StoreDetailReport {
        metadata,
        detail: StoreDetail::from_intelligence(store, config.intelligence.commission_rate),
        store: store.clone(),
        top_products: config.report.top_products,
    };

    match format {
        OutputFormat::Json => report::generate_detail_json(&report),
        OutputFormat::Markdown => Ok(report::generate_detail_markdown(&report)),
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .storeintel.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
