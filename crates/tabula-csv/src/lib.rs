//! # tabula-csv
//!
//! Delimited-text import and export for tabula.
//!
//! - [`TabularReader`] reads a delimited file into rows of strings, dropping
//!   the header record when asked to.
//! - [`TabularWriter`] serializes records to a file (creating the directory
//!   chain first) and fans row groups out to numbered files with
//!   [`TabularWriter::write_partitioned`].

mod error;
mod options;
mod partition;
mod reader;
mod writer;

pub use error::{CsvError, CsvResult};
pub use options::{CsvReadOptions, CsvWriteOptions, LineTerminator};
pub use partition::{chunk, FilePattern, PartitionOutcome, PartitionPlan, DEFAULT_MAX_WRITERS};
pub use reader::TabularReader;
pub use writer::TabularWriter;
