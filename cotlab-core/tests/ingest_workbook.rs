//! Integration tests for workbook ingest.
//!
//! Workbooks are generated with rust_xlsxwriter so the tests exercise the real
//! calamine reader:
//! 1. A known workbook yields the expected row count and values
//! 2. Two workbooks with different column orders concatenate and sort by date
//! 3. Fingerprints are stable for identical files and differ otherwise

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use cotlab_core::columns::Metric;
use cotlab_core::ingest::{normalize, read_workbook, resolve_workbooks};
use cotlab_core::CommodityType;
use rust_xlsxwriter::Workbook;

// ── Helpers ──────────────────────────────────────────────────────────

enum V {
    S(&'static str),
    N(f64),
}

fn write_workbook(path: &Path, headers: &[&str], rows: &[Vec<V>]) {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    for (c, h) in headers.iter().enumerate() {
        ws.write_string(0, c as u16, *h).unwrap();
    }
    for (r, row) in rows.iter().enumerate() {
        for (c, v) in row.iter().enumerate() {
            let (r, c) = (r as u32 + 1, c as u16);
            match v {
                V::S(s) => ws.write_string(r, c, *s).unwrap(),
                V::N(n) => ws.write_number(r, c, *n).unwrap(),
            };
        }
    }
    wb.save(path).unwrap();
}

const HEADERS: &[&str] = &[
    "Market_and_Exchange_Names",
    "As_of_Date_In_Form_YYMMDD",
    "Report_Date_as_MM_DD_YYYY",
    "CFTC_Contract_Market_Code",
    "CFTC_Commodity_Code",
    "Contract_Units",
    "Open_Interest_All",
    "M_Money_Positions_Long_ALL",
    "M_Money_Positions_Short_ALL",
    "Pct_of_OI_M_Money_Long_All",
    "Conc_Gross_LE_4_TDR_Long_All",
];

fn row(market: &'static str, yymmdd: f64, oi: f64, mm_long: f64, mm_short: f64) -> Vec<V> {
    vec![
        V::S(market),
        V::N(yymmdd),
        V::S("01/02/2024"),
        V::S("088691"),
        V::N(88.0),
        V::S("(100 TROY OUNCES)"),
        V::N(oi),
        V::N(mm_long),
        V::N(mm_short),
        V::N(12.5),
        V::N(30.1),
    ]
}

fn known_rows() -> Vec<Vec<V>> {
    vec![
        row("GOLD - COMMODITY EXCHANGE INC.", 240116.0, 510_000.0, 200_000.0, 50_000.0),
        row("GOLD - COMMODITY EXCHANGE INC.", 240109.0, 505_000.0, 190_000.0, 55_000.0),
        row("CORN - CHICAGO BOARD OF TRADE", 240109.0, 1_400_000.0, 150_000.0, 300_000.0),
        row("NAT GAS NYME - NEW YORK MERCANTILE EXCHANGE", 240102.0, 1_100_000.0, 90_000.0, 210_000.0),
        row("PJM WESTERN HUB - DA PEAK - ICE FUTURES ENERGY DIV", 240102.0, 40_000.0, 0.0, 0.0),
    ]
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ── 1. Known workbook ────────────────────────────────────────────────

#[test]
fn known_workbook_produces_expected_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("COT_FutsOnly_2024.xlsx");
    write_workbook(&path, HEADERS, &known_rows());

    let sheet = read_workbook(&path).unwrap();
    assert_eq!(sheet.row_count(), 5);
    assert_eq!(sheet.headers.len(), HEADERS.len());
    assert_eq!(sheet.fingerprint.len(), 64);

    let out = normalize(&[sheet]).unwrap();
    assert_eq!(out.records.len(), 5);
    assert_eq!(out.report.rows_kept, 5);
    assert_eq!(out.report.unparsed_dates, 0);
    assert!(!out.report.columns_present.contains(&"Conc_Gross_LE_4_TDR_Long_All"));
    assert!(out.report.columns_missing.contains(&"Swap_Positions_Long_All"));

    // Sorted ascending by as-of date, stable within a date.
    let dates: Vec<_> = out.records.iter().map(|r| r.as_of_date.unwrap()).collect();
    assert_eq!(
        dates,
        vec![
            date(2024, 1, 2),
            date(2024, 1, 2),
            date(2024, 1, 9),
            date(2024, 1, 9),
            date(2024, 1, 16)
        ]
    );
    assert_eq!(out.records[0].commodity_name, "NAT GAS NYME");
    assert_eq!(out.records[1].commodity_name, "PJM WESTERN HUB");
    assert_eq!(out.records[1].exchange_name, "DA PEAK - ICE FUTURES ENERGY DIV");
    assert_eq!(out.records[1].commodity_type, CommodityType::PowerEmissions);

    let gold = &out.records[4];
    assert_eq!(gold.commodity_name, "GOLD");
    assert_eq!(gold.commodity_type, CommodityType::Metals);
    assert_eq!(gold.report_date, Some(date(2024, 1, 2)));
    assert_eq!(gold.contract_market_code.as_deref(), Some("088691"));
    assert_eq!(gold.commodity_code.as_deref(), Some("88"));
    assert_eq!(gold.contract_units.as_deref(), Some("(100 TROY OUNCES)"));
    assert_eq!(gold.metric(Metric::OpenInterest), Some(510_000.0));
    assert_eq!(gold.metric(Metric::ManagedMoneyLong), Some(200_000.0));
    assert_eq!(gold.metric(Metric::PctOiManagedMoneyLong), Some(12.5));
    assert_eq!(gold.metric(Metric::SwapLong), None);
}

// ── 2. Multiple workbooks ────────────────────────────────────────────

#[test]
fn workbooks_concatenate_across_column_orders() {
    let dir = tempfile::tempdir().unwrap();

    let first = dir.path().join("COT_2023.xlsx");
    write_workbook(
        &first,
        &["Market_and_Exchange_Names", "As_of_Date_In_Form_YYMMDD", "Open_Interest_All"],
        &[vec![V::S("SILVER - COMMODITY EXCHANGE INC."), V::N(231226.0), V::N(150_000.0)]],
    );
    let second = dir.path().join("COT_2024.xlsx");
    write_workbook(
        &second,
        &["Open_Interest_All", "As_of_Date_In_Form_YYMMDD", "Market_and_Exchange_Names"],
        &[vec![V::N(155_000.0), V::N(240102.0), V::S("SILVER - COMMODITY EXCHANGE INC.")]],
    );
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let paths = resolve_workbooks(&[], dir.path(), &[]).unwrap();
    assert_eq!(paths, vec![first, second]);

    let sheets: Vec<_> = paths.iter().map(|p| read_workbook(p).unwrap()).collect();
    let out = normalize(&sheets).unwrap();
    let oi: Vec<_> = out
        .records
        .iter()
        .map(|r| r.metric(Metric::OpenInterest).unwrap())
        .collect();
    assert_eq!(oi, vec![150_000.0, 155_000.0]);
    assert_eq!(out.records[0].as_of_date, Some(date(2023, 12, 26)));
}

// ── 3. Fingerprints ──────────────────────────────────────────────────

#[test]
fn fingerprints_track_file_contents() {
    let dir = tempfile::tempdir().unwrap();
    let a: PathBuf = dir.path().join("COT_a.xlsx");
    let b: PathBuf = dir.path().join("COT_b.xlsx");
    write_workbook(&a, HEADERS, &known_rows());
    std::fs::copy(&a, &b).unwrap();

    let fa = read_workbook(&a).unwrap().fingerprint;
    let fb = read_workbook(&b).unwrap().fingerprint;
    assert_eq!(fa, fb);

    write_workbook(&b, HEADERS, &known_rows()[..2]);
    assert_ne!(read_workbook(&b).unwrap().fingerprint, fa);
}

#[test]
fn header_only_workbook_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("COT_empty.xlsx");
    write_workbook(&path, HEADERS, &[]);
    let err = read_workbook(&path).unwrap_err();
    assert!(matches!(err, cotlab_core::ingest::IngestError::EmptySheet(_)));
}
