//! CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::options::CsvReadOptions;

/// Delimited-text reader
pub struct TabularReader;

impl TabularReader {
    /// Read a delimited file into records of fields.
    ///
    /// Fails with [`CsvError::NotFound`] before opening anything when `path`
    /// does not exist.
    pub fn read<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> CsvResult<Vec<Vec<String>>> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CsvError::NotFound(path.to_path_buf()));
        }

        let file = File::open(path)?;
        tracing::debug!(path = %path.display(), "reading delimited file");
        Self::from_reader(file, options)
    }

    /// Read delimited text from any reader
    pub fn from_reader<R: Read>(reader: R, options: &CsvReadOptions) -> CsvResult<Vec<Vec<String>>> {
        // The header goes through the parser like any other record
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut records = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            records.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        if options.has_header && !records.is_empty() {
            records.remove(0);
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_drops_header_record() {
        let data = "id,name\n1,alpha\n2,\"beta, gamma\"\n";
        let rows = TabularReader::from_reader(data.as_bytes(), &CsvReadOptions::default()).unwrap();

        assert_eq!(
            rows,
            vec![
                vec!["1".to_string(), "alpha".to_string()],
                vec!["2".to_string(), "beta, gamma".to_string()],
            ]
        );
    }

    #[test]
    fn test_keeps_first_record_without_header() {
        let options = CsvReadOptions {
            has_header: false,
            ..CsvReadOptions::default()
        };
        let rows = TabularReader::from_reader("a;b\nc;d\n".as_bytes(), &CsvReadOptions {
            delimiter: b';',
            ..options
        })
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["a", "b"]);
    }

    #[test]
    fn test_ragged_records() {
        let data = "h1,h2,h3\n1\n1,2,3\n";
        let rows = TabularReader::from_reader(data.as_bytes(), &CsvReadOptions::default()).unwrap();
        assert_eq!(rows[0].len(), 1);
        assert_eq!(rows[1].len(), 3);
    }

    #[test]
    fn test_quoted_newline() {
        let data = "note\n\"line one\nline two\"\n";
        let rows = TabularReader::from_reader(data.as_bytes(), &CsvReadOptions::default()).unwrap();
        assert_eq!(rows, vec![vec!["line one\nline two".to_string()]]);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.csv");

        let err = TabularReader::read(&missing, &CsvReadOptions::default()).unwrap_err();
        assert!(matches!(err, CsvError::NotFound(p) if p == missing));
    }
}
