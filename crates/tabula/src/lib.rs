//! # tabula
//!
//! A tabular data access layer over spreadsheet documents.
//!
//! Tabula opens a workbook, reads a header row per sheet, and loads the rows
//! below it into maps keyed by [`normalize`]d column names. Rows are loaded
//! in parallel on a bounded [`WorkerPool`]. Cells of the live document can be
//! read, updated and saved, and row groups can be exported to numbered
//! delimited-text files in parallel.
//!
//! ## Example
//!
//! ```rust
//! use tabula::prelude::*;
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.add_sheet("Orders").unwrap();
//! sheet.put_a1("A1", "Order ID").unwrap();
//! sheet.put_a1("A2", "ORD-1").unwrap();
//!
//! let store = WorkbookStore::from_document(workbook, &LoadOptions::default().with_header_row(1)).unwrap();
//! let view = store.first_sheet().unwrap();
//! let row = view.rows().next().unwrap();
//!
//! assert_eq!(view.get_value("Order ID", row).unwrap(), Some("ORD-1"));
//! assert_eq!(view.get_value("_orderid", row).unwrap(), Some("ORD-1"));
//! ```

pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod fsutil;
pub mod normalize;
pub mod pool;
pub mod prelude;
pub mod sheet_view;
pub mod store;

pub use config::{FolderConfig, TabulaConfig};
pub use dataset::{load_dataset, open_from_template, update_cells};
pub use engine::{DocumentEngine, SheetAccess};
pub use error::{Error, Result};
pub use normalize::normalize;
pub use pool::{WorkerPool, DEFAULT_MAX_WORKERS};
pub use sheet_view::{Column, Row, SheetView};
pub use store::{LoadOptions, SheetViews, WorkbookStore};

// Re-export engine and I/O types
pub use tabula_core::{CellRef, CellValue, Workbook, Worksheet};
pub use tabula_csv::{
    chunk, CsvError, CsvReadOptions, CsvWriteOptions, FilePattern, LineTerminator,
    PartitionOutcome, PartitionPlan, TabularReader, TabularWriter,
};
pub use tabula_xlsx::{XlsxError, XlsxReader, XlsxWriter};
