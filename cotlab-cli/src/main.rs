//! COTLab CLI — load workbooks, manage price mappings, fetch prices.
//!
//! Commands:
//! - `load` (default) — read the CFTC workbooks and replace the `cot_data` table
//! - `map-prices` — fill the commodity → ticker mapping table from the built-in catalog
//! - `fetch-prices` — download daily prices for every mappable commodity
//! - `columns` — print the column reference

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use cotlab_core::columns::COLUMN_REFERENCE;
use cotlab_core::data::{fetch_many, partition_mappable, TracingProgress, YahooProvider};
use cotlab_store::{run_load, CotStore, CotlabConfig, LoadSummary};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "cotlab",
    about = "COTLab CLI — Commitments of Traders workbooks into SQLite"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to ./cotlab.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Directory searched for workbooks.
    #[arg(long, global = true)]
    raw_data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read workbooks and replace the cot_data table.
    Load {
        /// Workbooks to load. Defaults to the configured files in the raw data directory.
        files: Vec<PathBuf>,
    },
    /// Map commodities to Yahoo tickers from the built-in catalog.
    MapPrices {
        /// Replace existing mappings, including manual ones.
        #[arg(long, default_value_t = false)]
        overwrite: bool,
    },
    /// Download daily prices for every commodity with a known ticker.
    FetchPrices {
        /// Start date (YYYY-MM-DD). Defaults to --lookback days before the end date.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Days of history when --start is not given. Defaults to the config value.
        #[arg(long)]
        lookback: Option<u32>,

        /// Restrict to these commodities instead of every loaded one.
        #[arg(long = "commodity")]
        commodities: Vec<String>,

        /// Store fetched bars in commodity_prices.
        #[arg(long, default_value_t = false)]
        save: bool,
    },
    /// Print the column reference.
    Columns,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = CotlabConfig::load_or_default(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.database.path = db;
    }
    if let Some(dir) = cli.raw_data_dir {
        config.ingest.raw_data_dir = dir;
    }

    match cli.command.unwrap_or(Commands::Load { files: Vec::new() }) {
        Commands::Load { files } => run_load_cmd(&config, &files),
        Commands::MapPrices { overwrite } => run_map_prices(&config, overwrite),
        Commands::FetchPrices {
            start,
            end,
            lookback,
            commodities,
            save,
        } => run_fetch_prices(&config, start, end, lookback, commodities, save),
        Commands::Columns => {
            run_columns();
            Ok(())
        }
    }
}

fn runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("cannot start async runtime")
}

async fn open_store(config: &CotlabConfig) -> Result<CotStore> {
    CotStore::open(&config.database.path)
        .await
        .with_context(|| format!("cannot open database {}", config.database.path.display()))
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

// ── load ─────────────────────────────────────────────────────────────

fn run_load_cmd(config: &CotlabConfig, files: &[PathBuf]) -> Result<()> {
    let rt = runtime()?;
    let summary = rt.block_on(async {
        let store = open_store(config).await?;
        run_load(&store, config, files).await.context("load failed")
    })?;
    print_load_summary(&summary, config);
    Ok(())
}

fn print_load_summary(summary: &LoadSummary, config: &CotlabConfig) {
    for skipped in &summary.skipped {
        println!("Skipped {}: {}", skipped.path.display(), skipped.reason);
    }
    println!();
    println!("{:<40} {:>8}  {}", "Workbook", "Rows", "BLAKE3");
    println!("{}", "-".repeat(70));
    for file in &summary.files {
        let name = file
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.path.display().to_string());
        println!("{:<40} {:>8}  {}", name, file.rows, &file.fingerprint[..16.min(file.fingerprint.len())]);
    }
    println!();

    let report = &summary.report;
    println!(
        "Loaded {} rows into {} ({} read, {} without a commodity name)",
        summary.rows,
        config.database.path.display(),
        report.rows_in,
        report.rows_without_name
    );
    if report.unparsed_dates > 0 {
        println!("Rows with an unreadable as-of date: {}", report.unparsed_dates);
    }
    if !report.columns_missing.is_empty() {
        println!("Missing columns (stored as NULL): {}", report.columns_missing.join(", "));
    }

    println!();
    println!("Final columns:");
    for column in summary.columns() {
        println!("  {column}");
    }
}

// ── map-prices ───────────────────────────────────────────────────────

fn run_map_prices(config: &CotlabConfig, overwrite: bool) -> Result<()> {
    let rt = runtime()?;
    rt.block_on(async {
        let store = open_store(config).await?;
        let mapped = store.auto_map(overwrite).await?;
        let mappings = store.price_mappings(false).await?;

        println!("Mapped {mapped} commodities ({} mappings total)", mappings.len());
        println!();
        println!("{:<40} {:<10} {:<8} {:<9}", "Commodity", "Ticker", "Type", "Source");
        println!("{}", "-".repeat(70));
        for m in &mappings {
            println!(
                "{:<40} {:<10} {:<8} {:<9}",
                m.commodity_name,
                m.ticker_symbol.as_deref().unwrap_or("-"),
                m.ticker_type.map(|t| t.as_str()).unwrap_or("-"),
                if m.auto_mapped { "auto" } else { "manual" },
            );
        }

        let unmapped = store.unmapped_commodities().await?;
        if !unmapped.is_empty() {
            println!();
            println!("{} commodities have no known ticker:", unmapped.len());
            for name in &unmapped {
                println!("  {name}");
            }
        }
        Ok(())
    })
}

// ── fetch-prices ─────────────────────────────────────────────────────

fn run_fetch_prices(
    config: &CotlabConfig,
    start: Option<String>,
    end: Option<String>,
    lookback: Option<u32>,
    commodities: Vec<String>,
    save: bool,
) -> Result<()> {
    let end_date = match end.as_deref() {
        Some(s) => parse_date(s)?,
        None => chrono::Local::now().date_naive(),
    };
    let start_date = match start.as_deref() {
        Some(s) => parse_date(s)?,
        None => {
            let days = lookback.unwrap_or(config.prices.lookback_days);
            end_date - chrono::Duration::days(i64::from(days))
        }
    };
    if start_date > end_date {
        bail!("start date {start_date} is after end date {end_date}");
    }

    let rt = runtime()?;
    let store = rt.block_on(open_store(config))?;
    let names = if commodities.is_empty() {
        rt.block_on(store.commodity_names())?
    } else {
        commodities
    };

    let (mappable, unmappable) = partition_mappable(&names);
    println!(
        "{} of {} commodities have a known ticker; fetching {start_date} to {end_date}",
        mappable.len(),
        names.len()
    );
    if mappable.is_empty() {
        return Ok(());
    }

    let provider = YahooProvider::new()?;
    let results = fetch_many(
        &provider,
        &mappable,
        start_date,
        end_date,
        Duration::from_millis(config.prices.request_delay_ms),
        &TracingProgress,
    );

    println!();
    println!(
        "{:<40} {:<10} {:>6} {:<12} {:<12} {:>10}",
        "Commodity", "Ticker", "Bars", "First", "Last", "Close"
    );
    println!("{}", "-".repeat(96));
    let mut failed = 0;
    for (commodity, result) in &results {
        match result {
            Ok(prices) => {
                let first = prices.bars.first();
                let last = prices.bars.last();
                println!(
                    "{:<40} {:<10} {:>6} {:<12} {:<12} {:>10}",
                    commodity,
                    prices.ticker,
                    prices.bars.len(),
                    first.map(|b| b.date.to_string()).unwrap_or_default(),
                    last.map(|b| b.date.to_string()).unwrap_or_default(),
                    last.map(|b| format!("{:.2}", b.close)).unwrap_or_default(),
                );
            }
            Err(e) => {
                failed += 1;
                println!("{commodity:<40} error: {e}");
            }
        }
    }
    if !unmappable.is_empty() {
        println!();
        println!("No ticker known for: {}", unmappable.join(", "));
    }

    if save {
        let saved = rt.block_on(async {
            store.auto_map(false).await?;
            let mut saved = 0;
            for (commodity, result) in &results {
                if let Ok(prices) = result {
                    saved += store.save_prices(commodity, &prices.bars).await?;
                }
            }
            anyhow::Ok(saved)
        })?;
        println!();
        println!("Saved {saved} bars to {}", config.database.path.display());
    }

    if failed > 0 {
        tracing::warn!(failed, total = results.len(), "some commodities returned no prices");
    }
    Ok(())
}

// ── columns ──────────────────────────────────────────────────────────

fn run_columns() {
    println!("{:<42} {:<16} {}", "Column", "Short name", "Description");
    println!("{}", "-".repeat(110));
    for info in COLUMN_REFERENCE {
        println!("{:<42} {:<16} {}", info.name, info.short_name, info.description);
    }
}
