//! Workbook ingest: discover CFTC Excel files, read them, normalize rows.

pub mod normalize;
pub mod workbook;

use std::path::PathBuf;

use thiserror::Error;

pub use normalize::{normalize, NormalizeReport, Normalized};
pub use workbook::{discover_workbooks, read_workbook, resolve_workbooks, Cell, RawSheet};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("workbook not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("cannot open workbook {}: {reason}", .path.display())]
    Open { path: PathBuf, reason: String },

    #[error("workbook {} has no worksheets", .0.display())]
    NoWorksheets(PathBuf),

    #[error("workbook {} loaded but is empty", .0.display())]
    EmptySheet(PathBuf),

    #[error("workbook {} has no '{column}' column", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no data files found")]
    NoWorkbooks,
}
