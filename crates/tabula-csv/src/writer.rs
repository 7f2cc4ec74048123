//! CSV writer

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::{CsvError, CsvResult};
use crate::options::CsvWriteOptions;

/// Delimited-text writer
#[derive(Debug, Clone, Default)]
pub struct TabularWriter {
    options: CsvWriteOptions,
}

impl TabularWriter {
    /// Create a writer with the given options
    pub fn new(options: CsvWriteOptions) -> Self {
        Self { options }
    }

    /// Get the writer options
    pub fn options(&self) -> &CsvWriteOptions {
        &self.options
    }

    /// Write records to a file, creating its directory chain first.
    ///
    /// Nothing is created when a header is requested but cannot be produced.
    pub fn write<T, P>(&self, records: &[T], path: P) -> CsvResult<()>
    where
        T: Serialize,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let header = self.header_mode(records)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        self.write_records(header, records, BufWriter::new(file))?;
        tracing::debug!(path = %path.display(), records = records.len(), "wrote delimited file");
        Ok(())
    }

    /// Write records to any writer
    pub fn write_to<T, W>(&self, records: &[T], writer: W) -> CsvResult<()>
    where
        T: Serialize,
        W: Write,
    {
        let header = self.header_mode(records)?;
        self.write_records(header, records, writer)
    }

    fn header_mode<T: Serialize>(&self, records: &[T]) -> CsvResult<HeaderMode<'_>> {
        if !self.options.write_header {
            return Ok(HeaderMode::Off);
        }
        if let Some(header) = &self.options.header {
            return Ok(HeaderMode::Explicit(header));
        }
        match records.first() {
            Some(first) if has_field_names(first)? => Ok(HeaderMode::FieldNames),
            _ => Err(CsvError::MissingHeader),
        }
    }

    fn write_records<T, W>(&self, header: HeaderMode<'_>, records: &[T], writer: W) -> CsvResult<()>
    where
        T: Serialize,
        W: Write,
    {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .terminator(self.options.line_terminator.to_csv())
            .has_headers(matches!(header, HeaderMode::FieldNames))
            .from_writer(writer);

        if let HeaderMode::Explicit(names) = header {
            csv_writer.write_record(names)?;
        }

        for record in records {
            csv_writer.serialize(record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

/// Where the header line comes from
#[derive(Debug, Clone, Copy)]
enum HeaderMode<'a> {
    Off,
    Explicit(&'a [String]),
    FieldNames,
}

/// csv only emits a header for records with named fields (structs, maps).
/// Rendering one record both ways shows whether it has any.
fn has_field_names<T: Serialize>(record: &T) -> CsvResult<bool> {
    let render = |has_headers: bool| -> CsvResult<Vec<u8>> {
        let mut sample = csv::WriterBuilder::new()
            .has_headers(has_headers)
            .from_writer(Vec::new());
        sample.serialize(record)?;
        sample.flush()?;
        Ok(sample.get_ref().clone())
    };
    Ok(render(true)? != render(false)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::LineTerminator;
    use pretty_assertions::assert_eq;

    #[derive(Serialize)]
    struct Order {
        id: u32,
        customer: String,
    }

    fn orders() -> Vec<Order> {
        vec![
            Order {
                id: 1,
                customer: "Acme".into(),
            },
            Order {
                id: 2,
                customer: "Smith, J".into(),
            },
        ]
    }

    fn render<T: Serialize>(options: CsvWriteOptions, records: &[T]) -> String {
        let mut buf = Vec::new();
        TabularWriter::new(options).write_to(records, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_no_header_by_default() {
        let options = CsvWriteOptions {
            line_terminator: LineTerminator::LF,
            ..CsvWriteOptions::default()
        };
        assert_eq!(render(options, &orders()), "1,Acme\n2,\"Smith, J\"\n");
    }

    #[test]
    fn test_header_from_field_names() {
        let options = CsvWriteOptions {
            write_header: true,
            line_terminator: LineTerminator::LF,
            ..CsvWriteOptions::default()
        };
        assert_eq!(
            render(options, &orders()),
            "id,customer\n1,Acme\n2,\"Smith, J\"\n"
        );
    }

    #[test]
    fn test_explicit_header_for_plain_rows() {
        let options = CsvWriteOptions {
            line_terminator: LineTerminator::LF,
            ..CsvWriteOptions::with_header(["_a", "_b"])
        };
        let rows = vec![vec![Some("x"), None], vec![None, Some("y")]];
        assert_eq!(render(options, &rows), "_a,_b\nx,\n,y\n");
    }

    #[test]
    fn test_explicit_header_ignored_without_flag() {
        let options = CsvWriteOptions {
            write_header: false,
            line_terminator: LineTerminator::LF,
            ..CsvWriteOptions::with_header(["_a"])
        };
        assert_eq!(render(options, &[vec!["1"]]), "1\n");
    }

    #[test]
    fn test_header_requested_for_plain_rows_without_names() {
        let options = CsvWriteOptions {
            write_header: true,
            ..CsvWriteOptions::default()
        };
        let rows = vec![vec!["a".to_string(), "b".to_string()]];
        let mut buf = Vec::new();
        let err = TabularWriter::new(options).write_to(&rows, &mut buf).unwrap_err();
        assert!(matches!(err, CsvError::MissingHeader));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_missing_header_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("rows.csv");
        let options = CsvWriteOptions {
            write_header: true,
            ..CsvWriteOptions::default()
        };
        let rows = vec![vec!["1", "2"], vec!["3", "4"]];

        let err = TabularWriter::new(options).write(&rows, &path).unwrap_err();
        assert!(matches!(err, CsvError::MissingHeader));
        assert!(!path.exists());
        assert!(!dir.path().join("sub").exists());
    }

    #[test]
    fn test_header_requested_for_empty_records() {
        let options = CsvWriteOptions {
            write_header: true,
            ..CsvWriteOptions::default()
        };
        let none: Vec<Order> = Vec::new();
        let err = TabularWriter::new(options).write_to(&none, Vec::new()).unwrap_err();
        assert!(matches!(err, CsvError::MissingHeader));
    }

    #[test]
    fn test_write_creates_directory_chain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("c").join("out.csv");

        TabularWriter::default().write(&orders(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "1,Acme\r\n2,\"Smith, J\"\r\n");
    }
}
