//! Sheet rows exported to delimited text and read back

use pretty_assertions::assert_eq;
use tabula::prelude::*;
use tabula::{chunk, CsvError, LineTerminator, PartitionOutcome, WorkerPool};

fn view() -> SheetView {
    let mut ws = Worksheet::new("Stock");
    ws.put_a1("A1", "SKU").unwrap();
    ws.put_a1("B1", "Description").unwrap();
    ws.put_a1("C1", "Qty").unwrap();
    for i in 1..=9u32 {
        ws.put(i, 0, format!("SKU{}", i)).unwrap();
        ws.put(i, 1, format!("Widget, size {}", i)).unwrap();
        ws.put(i, 2, f64::from(i * 3)).unwrap();
    }
    SheetView::load(&ws, 1, 0, &WorkerPool::new(4))
}

fn records(view: &SheetView) -> Vec<Vec<Option<String>>> {
    let keys = view.column_keys();
    view.rows_in_sheet_order()
        .into_iter()
        .map(|row| {
            row.values_for(&keys[..])
                .into_iter()
                .map(|v| v.map(str::to_string))
                .collect()
        })
        .collect()
}

fn as_strings(group: &[Vec<Option<String>>]) -> Vec<Vec<String>> {
    group
        .iter()
        .map(|r| r.iter().map(|v| v.clone().unwrap_or_default()).collect())
        .collect()
}

#[test]
fn test_partitioned_export_with_explicit_offsets() {
    let dir = tempfile::tempdir().unwrap();
    let view = view();
    let groups = chunk(&records(&view), 5);
    assert_eq!(groups.len(), 2);

    let writer = TabularWriter::new(CsvWriteOptions::with_header(view.column_keys()));
    let plan = PartitionPlan::new(dir.path().join("export"), FilePattern::parse("stock_{}.csv").unwrap(), 0)
        .with_offsets(vec![100, 200]);

    let outcomes = writer.write_partitioned(&groups, &plan);
    assert!(outcomes.iter().all(PartitionOutcome::is_ok));

    let files = tabula::fsutil::files_in_directory(dir.path().join("export")).unwrap();
    assert_eq!(
        files,
        vec![
            dir.path().join("export").join("stock_100.csv"),
            dir.path().join("export").join("stock_200.csv"),
        ]
    );

    for (file, group) in files.iter().zip(&groups) {
        let rows = TabularReader::read(file, &CsvReadOptions::default()).unwrap();
        assert_eq!(rows.len(), group.len());
        assert_eq!(rows, as_strings(group));
    }
}

#[test]
fn test_partitioned_export_sequential_offsets() {
    let dir = tempfile::tempdir().unwrap();
    let view = view();
    let groups = chunk(&records(&view), 4);

    let writer = TabularWriter::new(CsvWriteOptions {
        line_terminator: LineTerminator::LF,
        ..CsvWriteOptions::with_header(view.column_keys())
    });
    let plan = PartitionPlan::new(dir.path(), FilePattern::parse("{0}.csv").unwrap(), 7);
    let outcomes = writer.write_partitioned(&groups, &plan);

    let offsets: Vec<_> = outcomes.iter().map(|o| o.offset).collect();
    assert_eq!(offsets, vec![Some(7), Some(8), Some(9)]);

    let text = std::fs::read_to_string(dir.path().join("9.csv")).unwrap();
    assert_eq!(text, "_sku,_description,_qty\nSKU9,\"Widget, size 9\",27\n");
}

#[test]
fn test_missing_offset_reported_per_group() {
    let dir = tempfile::tempdir().unwrap();
    let view = view();
    let groups = chunk(&records(&view), 3);

    let plan = PartitionPlan::new(dir.path(), FilePattern::parse("p{}.csv").unwrap(), 0)
        .with_offsets(vec![1, 2]);
    let outcomes = TabularWriter::new(CsvWriteOptions::with_header(view.column_keys()))
        .write_partitioned(&groups, &plan);

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].is_ok() && outcomes[1].is_ok());
    assert!(matches!(
        outcomes[2].result,
        Err(CsvError::MissingOffset { index: 2, available: 2 })
    ));
}

#[test]
fn test_read_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = TabularReader::read(dir.path().join("absent.csv"), &CsvReadOptions::default());
    assert!(matches!(result, Err(CsvError::NotFound(_))));
}

#[test]
fn test_write_creates_missing_directories() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("x").join("y").join("z.csv");
    let view = view();

    TabularWriter::new(CsvWriteOptions::with_header(view.column_keys()))
        .write(&records(&view), &target)
        .unwrap();

    let rows = TabularReader::read(&target, &CsvReadOptions::default()).unwrap();
    assert_eq!(rows.len(), 9);
    assert_eq!(rows[0], vec!["SKU1", "Widget, size 1", "3"]);
}

#[test]
fn test_plain_rows_without_header_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let view = view();
    let groups = chunk(&as_strings(&records(&view)), 5);

    let plan = PartitionPlan::new(dir.path(), FilePattern::parse("s{}.csv").unwrap(), 0);
    let outcomes = TabularWriter::default().write_partitioned(&groups, &plan);

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes
        .iter()
        .all(|o| matches!(o.result, Err(CsvError::MissingHeader))));
    assert!(tabula::fsutil::files_in_directory(dir.path()).unwrap().is_empty());
}

#[test]
fn test_plain_string_rows_keep_every_row() {
    let dir = tempfile::tempdir().unwrap();
    let view = view();
    let rows = as_strings(&records(&view));
    let groups = chunk(&rows, 4);

    let writer = TabularWriter::new(CsvWriteOptions::with_header(view.column_keys()));
    let plan = PartitionPlan::new(dir.path(), FilePattern::parse("s{}.csv").unwrap(), 0);
    assert!(writer
        .write_partitioned(&groups, &plan)
        .iter()
        .all(PartitionOutcome::is_ok));

    let mut read_back = Vec::new();
    for offset in 0..3 {
        let file = dir.path().join(format!("s{}.csv", offset));
        read_back.extend(TabularReader::read(file, &CsvReadOptions::default()).unwrap());
    }
    assert_eq!(read_back, rows);
}

#[test]
fn test_failed_partition_leaves_siblings_written() {
    let dir = tempfile::tempdir().unwrap();
    let view = view();
    let groups = chunk(&records(&view), 3);
    std::fs::create_dir(dir.path().join("stock_11.csv")).unwrap();

    let plan = PartitionPlan::new(dir.path(), FilePattern::parse("stock_{}.csv").unwrap(), 10);
    let outcomes = TabularWriter::new(CsvWriteOptions::with_header(view.column_keys()))
        .write_partitioned(&groups, &plan);

    assert!(outcomes[0].is_ok());
    assert!(matches!(outcomes[1].result, Err(CsvError::Io(_))));
    assert!(outcomes[2].is_ok());
    for offset in [10, 12] {
        let file = dir.path().join(format!("stock_{}.csv", offset));
        let rows = TabularReader::read(&file, &CsvReadOptions::default()).unwrap();
        assert_eq!(rows.len(), 3);
    }
}
