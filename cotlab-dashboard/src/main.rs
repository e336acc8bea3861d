//! `cotlab-dashboard` — serve the COT dashboard over HTTP.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use cotlab_dashboard::AppState;
use cotlab_store::{CotStore, CotlabConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "cotlab-dashboard",
    about = "COTLab dashboard — explore Commitments of Traders data in the browser"
)]
struct Args {
    /// Path to a TOML config file. Defaults to ./cotlab.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:8501.
    #[arg(long)]
    bind: Option<String>,

    /// SQLite database file.
    #[arg(long)]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = CotlabConfig::load_or_default(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.dashboard.bind = bind;
    }
    if let Some(db) = args.db {
        config.database.path = db;
    }

    let store = CotStore::open(&config.database.path)
        .await
        .with_context(|| format!("cannot open database {}", config.database.path.display()))?;
    if store.count_rows().await? == 0 {
        tracing::warn!(
            db = %config.database.path.display(),
            "cot_data is empty; run `cotlab load` first"
        );
    }

    cotlab_dashboard::serve(AppState::new(store), &config.dashboard.bind).await
}
