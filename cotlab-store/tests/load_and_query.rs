//! Integration tests for the load pipeline and dashboard queries.
//!
//! Builds known workbooks with rust_xlsxwriter, loads them into a scratch
//! SQLite file, and verifies:
//! 1. Loading a known workbook produces the expected row count
//! 2. Filtering by commodity and date range returns only matching rows
//! 3. Exported CSV round-trips the filtered data exactly
//! 4. Reloading replaces the table instead of appending
//! 5. Missing workbooks are skipped, and a load with none fails
//! 6. Undated rows are read back after every dated row

use std::path::Path;

use chrono::NaiveDate;
use cotlab_core::columns::Metric;
use cotlab_core::CotRecord;
use cotlab_store::{
    export_file_name, records_from_csv, records_to_csv, run_load, CotStore, CotlabConfig,
    DateRange, LoadError,
};
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

// ── Helpers ──────────────────────────────────────────────────────────

const HEADERS: &[&str] = &[
    "Market_and_Exchange_Names",
    "As_of_Date_In_Form_YYMMDD",
    "Report_Date_as_MM_DD_YYYY",
    "CFTC_Commodity_Code",
    "Open_Interest_All",
    "M_Money_Positions_Long_ALL",
    "M_Money_Positions_Short_ALL",
];

/// (market, yymmdd, open interest, mm long, mm short)
type Row = (&'static str, f64, f64, f64, f64);

const ROWS: &[Row] = &[
    ("GOLD - COMMODITY EXCHANGE INC.", 240102.0, 500_000.0, 180_000.0, 60_000.0),
    ("GOLD - COMMODITY EXCHANGE INC.", 240109.0, 505_000.0, 190_000.0, 55_000.0),
    ("GOLD - COMMODITY EXCHANGE INC.", 240116.0, 510_000.0, 200_000.0, 50_000.0),
    ("GOLD - COMMODITY EXCHANGE INC.", 240123.0, 498_000.0, 185_500.5, 52_000.0),
    ("CORN - CHICAGO BOARD OF TRADE", 240109.0, 1_400_000.0, 150_000.0, 300_000.0),
    ("CORN - CHICAGO BOARD OF TRADE", 240116.0, 1_420_000.0, 140_000.0, 320_000.0),
    ("", 240116.0, 1.0, 1.0, 1.0),
];

fn write_workbook(path: &Path, rows: &[Row]) {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    for (c, h) in HEADERS.iter().enumerate() {
        ws.write_string(0, c as u16, *h).unwrap();
    }
    for (r, (market, yymmdd, oi, long, short)) in rows.iter().enumerate() {
        let r = r as u32 + 1;
        if !market.is_empty() {
            ws.write_string(r, 0, *market).unwrap();
        }
        ws.write_number(r, 1, *yymmdd).unwrap();
        ws.write_string(r, 2, "01/02/2024").unwrap();
        ws.write_number(r, 3, 88.0).unwrap();
        ws.write_number(r, 4, *oi).unwrap();
        ws.write_number(r, 5, *long).unwrap();
        ws.write_number(r, 6, *short).unwrap();
    }
    wb.save(path).unwrap();
}

fn config_for(dir: &TempDir) -> CotlabConfig {
    let mut cfg = CotlabConfig::default();
    cfg.ingest.raw_data_dir = dir.path().join("raw_data");
    cfg.database.path = dir.path().join("commodities.db");
    cfg
}

async fn loaded_store(dir: &TempDir) -> (CotStore, CotlabConfig) {
    let cfg = config_for(dir);
    std::fs::create_dir_all(&cfg.ingest.raw_data_dir).unwrap();
    write_workbook(&cfg.ingest.raw_data_dir.join("COT_FutsOnly_2024.xlsx"), ROWS);

    let store = CotStore::open(&cfg.database.path).await.unwrap();
    run_load(&store, &cfg, &[]).await.unwrap();
    (store, cfg)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ── 1. Row count ─────────────────────────────────────────────────────

#[tokio::test]
async fn known_workbook_loads_expected_rows() {
    let dir = TempDir::new().unwrap();
    let cfg = config_for(&dir);
    std::fs::create_dir_all(&cfg.ingest.raw_data_dir).unwrap();
    write_workbook(&cfg.ingest.raw_data_dir.join("COT_FutsOnly_2024.xlsx"), ROWS);

    let store = CotStore::open(&cfg.database.path).await.unwrap();
    let summary = run_load(&store, &cfg, &[]).await.unwrap();

    // The nameless row is dropped.
    assert_eq!(summary.rows, 6);
    assert_eq!(summary.report.rows_in, 7);
    assert_eq!(summary.report.rows_without_name, 1);
    assert_eq!(summary.files.len(), 1);
    assert_eq!(summary.files[0].rows, 7);
    assert!(summary.skipped.is_empty());
    assert_eq!(store.count_rows().await.unwrap(), 6);

    let columns = summary.columns();
    assert!(columns.contains(&"Open_Interest_All"));
    assert!(!columns.contains(&"Market_and_Exchange_Names"));
    assert!(!columns.contains(&"Swap_Positions_Long_All"));
    assert_eq!(columns.last(), Some(&"Commodity_Type"));

    assert_eq!(store.commodity_types().await.unwrap(), vec!["Agricultural - Grains", "Metals"]);
    let stats = store.commodities_with_stats().await.unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].commodity_name, "CORN");
    assert_eq!(stats[1].commodity_name, "GOLD");
    assert_eq!(stats[1].commodity_code.as_deref(), Some("88"));
    assert_eq!(stats[1].min_oi, Some(498_000.0));
    assert_eq!(stats[1].max_oi, Some(510_000.0));

    let gold = store.commodity_stats("GOLD").await.unwrap().unwrap();
    assert_eq!(gold, stats[1]);
    assert!(store.commodity_stats("SILVER").await.unwrap().is_none());
}

// ── 2. Commodity + date range ────────────────────────────────────────

#[tokio::test]
async fn filter_by_commodity_and_range() {
    let dir = TempDir::new().unwrap();
    let (store, _) = loaded_store(&dir).await;

    let all_gold = store.load_commodity_data("GOLD", None).await.unwrap();
    assert_eq!(all_gold.len(), 4);

    let range = DateRange::new(date(2024, 1, 9), date(2024, 1, 16)).unwrap();
    let gold = store.load_commodity_data("GOLD", Some(range)).await.unwrap();
    assert_eq!(gold.len(), 2);
    assert!(gold.iter().all(|r| r.commodity_name == "GOLD"));
    assert!(gold.iter().all(|r| range.contains(r.as_of_date.unwrap())));
    assert_eq!(gold[0].as_of_date, Some(date(2024, 1, 9)));
    assert_eq!(gold[1].metric(Metric::OpenInterest), Some(510_000.0));
    assert_eq!(gold[1].exchange_name, "COMMODITY EXCHANGE INC.");

    assert!(store.load_commodity_data("SILVER", None).await.unwrap().is_empty());

    let bounds = store.date_bounds("GOLD").await.unwrap().unwrap();
    assert_eq!(bounds, DateRange::new(date(2024, 1, 2), date(2024, 1, 23)).unwrap());
    assert!(store.date_bounds("SILVER").await.unwrap().is_none());
}

// ── 3. CSV round trip ────────────────────────────────────────────────

#[tokio::test]
async fn exported_csv_round_trips() {
    let dir = TempDir::new().unwrap();
    let (store, _) = loaded_store(&dir).await;

    let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
    let gold = store.load_commodity_data("GOLD", Some(range)).await.unwrap();
    let text = records_to_csv(&gold).unwrap();

    assert_eq!(text.lines().count(), gold.len() + 1);
    assert_eq!(records_from_csv(&text).unwrap(), gold);
    assert_eq!(export_file_name("GOLD"), "GOLD_cot_data.csv");
}

// ── 4. Reload replaces ───────────────────────────────────────────────

#[tokio::test]
async fn reload_replaces_table() {
    let dir = TempDir::new().unwrap();
    let (store, cfg) = loaded_store(&dir).await;

    write_workbook(&cfg.ingest.raw_data_dir.join("COT_FutsOnly_2024.xlsx"), &ROWS[..2]);
    let summary = run_load(&store, &cfg, &[]).await.unwrap();
    assert_eq!(summary.rows, 2);
    assert_eq!(store.count_rows().await.unwrap(), 2);
    assert_eq!(store.commodity_names().await.unwrap(), vec!["GOLD"]);
}

// ── 5. Missing files ─────────────────────────────────────────────────

#[tokio::test]
async fn missing_workbooks_are_skipped() {
    let dir = TempDir::new().unwrap();
    let (store, cfg) = loaded_store(&dir).await;

    let present = cfg.ingest.raw_data_dir.join("COT_FutsOnly_2024.xlsx");
    let absent = cfg.ingest.raw_data_dir.join("COT_FutsOnly_2099.xlsx");
    let summary = run_load(&store, &cfg, &[absent.clone(), present]).await.unwrap();
    assert_eq!(summary.rows, 6);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].path, absent);
}

#[tokio::test]
async fn load_without_workbooks_fails_and_keeps_data() {
    let dir = TempDir::new().unwrap();
    let (store, cfg) = loaded_store(&dir).await;

    let mut empty = cfg.clone();
    empty.ingest.raw_data_dir = dir.path().join("nowhere");
    let err = run_load(&store, &empty, &[]).await.unwrap_err();
    assert!(matches!(
        err,
        LoadError::Ingest(cotlab_core::ingest::IngestError::NoWorkbooks)
    ));
    assert_eq!(store.count_rows().await.unwrap(), 6);
}

#[tokio::test]
async fn fresh_database_has_empty_tables() {
    let dir = TempDir::new().unwrap();
    let store = CotStore::open(&dir.path().join("nested/cot.db")).await.unwrap();
    assert_eq!(store.count_rows().await.unwrap(), 0);
    assert!(store.commodities_with_stats().await.unwrap().is_empty());
    assert!(store.commodity_types().await.unwrap().is_empty());
}

#[tokio::test]
async fn undated_rows_come_last() {
    let dir = TempDir::new().unwrap();
    let store = CotStore::open(&dir.path().join("cot.db")).await.unwrap();
    let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
    let records = vec![
        CotRecord::new("GOLD", "COMEX").with_metric(Metric::OpenInterest, 1.0),
        CotRecord::new("GOLD", "COMEX").with_as_of_date(day(9)),
        CotRecord::new("GOLD", "COMEX").with_as_of_date(day(2)),
    ];
    store.replace_cot_data(&records).await.unwrap();

    let rows = store.load_commodity_data("GOLD", None).await.unwrap();
    let dates: Vec<_> = rows.iter().map(|r| r.as_of_date).collect();
    assert_eq!(dates, vec![Some(day(2)), Some(day(9)), None]);
    assert_eq!(rows[2].metric(Metric::OpenInterest), Some(1.0));

    let ranged = store
        .load_commodity_data("GOLD", DateRange::new(day(1), day(31)))
        .await
        .unwrap();
    assert_eq!(ranged.len(), 2);
}
