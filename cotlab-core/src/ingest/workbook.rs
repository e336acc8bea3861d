//! Excel workbook discovery and reading.
//!
//! CFTC publishes the disaggregated futures-only report as yearly `.xls`
//! workbooks (`COT_FutsOnly_2024.xls`) and, more recently, `.xlsx`. Both are
//! read through calamine; only the first worksheet is used and its first row
//! is the header.

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Days, NaiveDate};

use super::IngestError;

/// A worksheet cell reduced to the shapes normalization cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    /// Excel serial date (days since 1899-12-30, fraction is time of day).
    Date(f64),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Text rendering; integral numbers lose their fractional part so codes
    /// such as `088691` stored as numbers come out as `88691`, not `88691.0`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            Cell::Number(n) | Cell::Date(n) => Some(format_number(*n)),
            Cell::Bool(b) => Some(b.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().replace(',', "").parse().ok(),
            Cell::Bool(_) | Cell::Date(_) | Cell::Empty => None,
        }
    }
}

impl From<&Data> for Cell {
    fn from(value: &Data) -> Self {
        match value {
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::String(s) => Cell::Text(s.clone()),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => Cell::Date(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(_) | Data::Empty => Cell::Empty,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Convert an Excel serial day number to a calendar date.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.floor() as u64))
}

/// First worksheet of a workbook: header row plus data rows.
#[derive(Debug, Clone)]
pub struct RawSheet {
    pub source: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    /// blake3 hex digest of the workbook file.
    pub fingerprint: String,
}

impl RawSheet {
    /// Position of a header by exact (trimmed) name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

fn is_cot_workbook(file_name: &str) -> bool {
    file_name.starts_with("COT_") && (file_name.ends_with(".xls") || file_name.ends_with(".xlsx"))
}

/// `COT_*.xls` / `COT_*.xlsx` files in `dir`, sorted by file name.
///
/// A missing directory yields an empty list.
pub fn discover_workbooks(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let io_err = |source| IngestError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let name = entry.file_name();
        if let Some(name) = name.to_str() {
            if is_cot_workbook(name) && entry.path().is_file() {
                found.push(entry.path());
            }
        }
    }
    found.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(found)
}

/// Decide which workbooks a load reads.
///
/// Explicit paths win. Otherwise the raw data directory is scanned, and when
/// that finds nothing the default file names under it are used.
pub fn resolve_workbooks(
    explicit: &[PathBuf],
    raw_data_dir: &Path,
    default_files: &[String],
) -> Result<Vec<PathBuf>, IngestError> {
    if !explicit.is_empty() {
        return Ok(explicit.to_vec());
    }
    let discovered = discover_workbooks(raw_data_dir)?;
    if !discovered.is_empty() {
        return Ok(discovered);
    }
    tracing::info!(
        dir = %raw_data_dir.display(),
        "no COT_* workbooks found, falling back to default file list"
    );
    Ok(default_files.iter().map(|f| raw_data_dir.join(f)).collect())
}

/// Read the first worksheet of an `.xls`/`.xlsx` workbook.
pub fn read_workbook(path: &Path) -> Result<RawSheet, IngestError> {
    if !path.exists() {
        return Err(IngestError::NotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let fingerprint = blake3::hash(&bytes).to_hex().to_string();

    let open_err = |e: calamine::Error| IngestError::Open {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };
    let mut workbook = open_workbook_auto(path).map_err(open_err)?;
    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IngestError::NoWorksheets(path.to_path_buf()))?;
    let range = workbook.worksheet_range(&first).map_err(open_err)?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header
            .iter()
            .map(|c| Cell::from(c).as_text().unwrap_or_default())
            .collect(),
        None => return Err(IngestError::EmptySheet(path.to_path_buf())),
    };

    let rows: Vec<Vec<Cell>> = rows
        .map(|r| r.iter().map(Cell::from).collect::<Vec<_>>())
        .filter(|r| !r.iter().all(Cell::is_empty))
        .collect();
    if rows.is_empty() {
        return Err(IngestError::EmptySheet(path.to_path_buf()));
    }

    tracing::debug!(
        path = %path.display(),
        sheet = %first,
        rows = rows.len(),
        columns = headers.len(),
        "read workbook"
    );

    Ok(RawSheet {
        source: path.to_path_buf(),
        headers,
        rows,
        fingerprint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_text_renders_integral_numbers_without_fraction() {
        assert_eq!(Cell::Number(88691.0).as_text().as_deref(), Some("88691"));
        assert_eq!(Cell::Number(1.5).as_text().as_deref(), Some("1.5"));
        assert_eq!(Cell::Text("  ".into()).as_text(), None);
        assert_eq!(Cell::Empty.as_text(), None);
    }

    #[test]
    fn cell_numbers_parse_from_text() {
        assert_eq!(Cell::Text(" 1,234 ".into()).as_f64(), Some(1234.0));
        assert_eq!(Cell::Text("n/a".into()).as_f64(), None);
        assert_eq!(Cell::Number(3.0).as_f64(), Some(3.0));
    }

    #[test]
    fn excel_serial_dates() {
        assert_eq!(
            excel_serial_to_date(45_293.0),
            NaiveDate::from_ymd_opt(2024, 1, 2)
        );
        assert_eq!(
            excel_serial_to_date(45_293.75),
            NaiveDate::from_ymd_opt(2024, 1, 2)
        );
        assert_eq!(excel_serial_to_date(0.0), None);
        assert_eq!(excel_serial_to_date(f64::NAN), None);
    }

    #[test]
    fn workbook_name_filter() {
        assert!(is_cot_workbook("COT_FutsOnly_2024.xls"));
        assert!(is_cot_workbook("COT_2025.xlsx"));
        assert!(!is_cot_workbook("cot_2024.xls"));
        assert!(!is_cot_workbook("COT_2024.csv"));
        assert!(!is_cot_workbook("notes_COT_2024.xls"));
    }

    #[test]
    fn discover_sorts_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["COT_2025.xlsx", "COT_2023.xls", "readme.txt", "COT_2024.xls"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let found = discover_workbooks(dir.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["COT_2023.xls", "COT_2024.xls", "COT_2025.xlsx"]);
    }

    #[test]
    fn missing_directory_discovers_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_workbooks(&dir.path().join("absent")).unwrap().is_empty());
    }

    #[test]
    fn resolve_prefers_explicit_then_discovered_then_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let defaults = vec!["COT_FutsOnly_2023.xls".to_string()];

        let explicit = vec![PathBuf::from("/data/mine.xlsx")];
        assert_eq!(
            resolve_workbooks(&explicit, dir.path(), &defaults).unwrap(),
            explicit
        );

        assert_eq!(
            resolve_workbooks(&[], dir.path(), &defaults).unwrap(),
            vec![dir.path().join("COT_FutsOnly_2023.xls")]
        );

        std::fs::write(dir.path().join("COT_X.xlsx"), b"x").unwrap();
        assert_eq!(
            resolve_workbooks(&[], dir.path(), &defaults).unwrap(),
            vec![dir.path().join("COT_X.xlsx")]
        );
    }

    #[test]
    fn missing_workbook_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_workbook(&dir.path().join("COT_missing.xls")).unwrap_err();
        assert!(matches!(err, IngestError::NotFound(_)));
    }

    #[test]
    fn garbage_workbook_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("COT_bad.xlsx");
        std::fs::write(&path, b"not a zip archive").unwrap();
        let err = read_workbook(&path).unwrap_err();
        assert!(matches!(err, IngestError::Open { .. }));
    }
}
