//! # tabula-core
//!
//! The in-memory document engine tabula reads sheets from and writes cells to.
//! A [`Workbook`] holds named [`Worksheet`]s in order. Each worksheet is a
//! sparse grid of [`CellValue`]s addressed by zero-based row and column, or
//! by an A1 reference through [`CellRef`].
//!
//! ```rust
//! use tabula_core::{CellValue, Workbook};
//!
//! let mut book = Workbook::new();
//! let orders = book.add_sheet("Orders").unwrap();
//! orders.put_a1("A1", "Order ID").unwrap();
//! orders.put(1, 0, 1001.0).unwrap();
//!
//! assert_eq!(orders.last_data_row(), Some(1));
//! assert_eq!(orders.cell_text(1, 0).as_deref(), Some("1001"));
//! assert_eq!(orders.value_a1("A1").unwrap(), CellValue::from("Order ID"));
//! ```

pub mod book;
pub mod error;
pub mod reference;
pub mod sheet;
pub mod value;

pub use book::Workbook;
pub use error::{Error, Result};
pub use reference::CellRef;
pub use sheet::{RowCells, Worksheet};
pub use value::CellValue;

/// Rows available in a sheet
pub const MAX_ROWS: u32 = 1_048_576;

/// Columns available in a sheet
pub const MAX_COLS: u16 = 16_384;

/// Longest sheet name a package accepts
pub const MAX_SHEET_NAME_LEN: usize = 31;
