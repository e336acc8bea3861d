//! Load pipeline: resolve workbooks, read them, normalize, replace `cot_data`.

use std::path::PathBuf;

use cotlab_core::columns::{COMMODITY_NAME, COMMODITY_TYPE, EXCHANGE_NAME, MARKET_AND_EXCHANGE_NAMES};
use cotlab_core::ingest::{self, IngestError, NormalizeReport, Normalized};
use serde::Serialize;
use thiserror::Error;

use crate::config::CotlabConfig;
use crate::db::{CotStore, StoreError};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("ingest task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A workbook that made it into the load.
#[derive(Debug, Clone, Serialize)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub rows: usize,
    /// blake3 of the file bytes.
    pub fingerprint: String,
}

/// A workbook that was named but could not be used.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct LoadSummary {
    pub files: Vec<LoadedFile>,
    pub skipped: Vec<SkippedFile>,
    /// Rows written to `cot_data`.
    pub rows: usize,
    pub report: NormalizeReport,
}

impl LoadSummary {
    /// Columns carried by the loaded workbooks, as they appear in `cot_data`:
    /// the source columns minus the market name, then the derived ones.
    pub fn columns(&self) -> Vec<&'static str> {
        self.report
            .columns_present
            .iter()
            .copied()
            .filter(|c| *c != MARKET_AND_EXCHANGE_NAMES)
            .chain([COMMODITY_NAME, EXCHANGE_NAME, COMMODITY_TYPE])
            .collect()
    }
}

/// Result of the blocking half of a load.
#[derive(Debug)]
pub struct Ingested {
    pub files: Vec<LoadedFile>,
    pub skipped: Vec<SkippedFile>,
    pub normalized: Normalized,
}

/// Read and normalize workbooks without touching the database.
///
/// Missing or unreadable files are skipped with a warning; the load only
/// fails when no workbook could be read at all.
pub fn ingest_workbooks(config: &CotlabConfig, explicit: &[PathBuf]) -> Result<Ingested, IngestError> {
    let paths = ingest::resolve_workbooks(
        explicit,
        &config.ingest.raw_data_dir,
        &config.ingest.default_files,
    )?;

    let mut sheets = Vec::new();
    let mut files = Vec::new();
    let mut skipped = Vec::new();
    for path in &paths {
        match ingest::read_workbook(path) {
            Ok(sheet) => {
                tracing::info!(
                    file = %path.display(),
                    rows = sheet.row_count(),
                    fingerprint = %sheet.fingerprint,
                    "loaded workbook"
                );
                files.push(LoadedFile {
                    path: path.clone(),
                    rows: sheet.row_count(),
                    fingerprint: sheet.fingerprint.clone(),
                });
                sheets.push(sheet);
            }
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "skipping workbook");
                skipped.push(SkippedFile {
                    path: path.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    if sheets.is_empty() {
        return Err(IngestError::NoWorkbooks);
    }

    let normalized = ingest::normalize(&sheets)?;
    tracing::info!(
        rows = normalized.report.rows_kept,
        dropped = normalized.report.rows_without_name,
        unparsed_dates = normalized.report.unparsed_dates,
        "normalized rows"
    );
    Ok(Ingested {
        files,
        skipped,
        normalized,
    })
}

/// Full load: ingest on a blocking thread, then replace `cot_data`.
pub async fn run_load(
    store: &CotStore,
    config: &CotlabConfig,
    explicit: &[PathBuf],
) -> Result<LoadSummary, LoadError> {
    let cfg = config.clone();
    let explicit = explicit.to_vec();
    let ingested = tokio::task::spawn_blocking(move || ingest_workbooks(&cfg, &explicit)).await??;

    let rows = store.replace_cot_data(&ingested.normalized.records).await?;
    Ok(LoadSummary {
        files: ingested.files,
        skipped: ingested.skipped,
        rows,
        report: ingested.normalized.report,
    })
}
