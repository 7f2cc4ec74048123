//! Prelude module - common imports for tabula users
//!
//! ```rust
//! use tabula::prelude::*;
//! ```

pub use crate::{
    // Values
    CellValue,
    // Delimited text
    CsvReadOptions,
    CsvWriteOptions,
    // Engine seam
    DocumentEngine,
    // Errors
    Error,
    FilePattern,
    LoadOptions,
    PartitionPlan,
    Result,
    Row,
    SheetAccess,
    SheetView,
    TabularReader,
    TabularWriter,
    // Main types
    Workbook,
    WorkbookStore,
    Worksheet,
};
