//! Row materialization through the public API

use pretty_assertions::assert_eq;
use tabula::prelude::*;
use tabula::WorkerPool;

fn sheet(data_rows: u32) -> Worksheet {
    let mut ws = Worksheet::new("Orders");
    ws.put_a1("A1", "Order ID").unwrap();
    ws.put_a1("B1", "Ship To").unwrap();
    for i in 1..=data_rows {
        ws.put(i, 0, format!("ORD-{:03}", i)).unwrap();
        if i % 2 == 0 {
            ws.put(i, 1, "Berlin").unwrap();
        }
    }
    ws
}

#[test]
fn test_row_counts_with_and_without_limit() {
    let ws = sheet(5);
    let pool = WorkerPool::default();

    assert_eq!(SheetView::load(&ws, 1, 0, &pool).len(), 5);

    let limited = SheetView::load(&ws, 1, 3, &pool);
    assert_eq!(limited.len(), 3);
    let ids: Vec<_> = limited
        .rows_in_sheet_order()
        .into_iter()
        .map(|r| r.get("_orderid").map(str::to_string))
        .collect();
    assert_eq!(
        ids,
        vec![
            Some("ORD-001".to_string()),
            Some("ORD-002".to_string()),
            Some("ORD-003".to_string())
        ]
    );
}

#[test]
fn test_raw_and_normalized_lookup_agree() {
    let ws = sheet(40);
    let view = SheetView::load(&ws, 1, 0, &WorkerPool::new(8));

    for row in view.rows() {
        assert_eq!(
            view.get_value("Order ID", row).unwrap(),
            view.get_value("_orderid", row).unwrap()
        );
        assert_eq!(
            view.get_value("Ship To", row).unwrap(),
            view.get_value("_shipto", row).unwrap()
        );
    }
    assert!(matches!(
        view.get_value("Order", view.rows().next().unwrap()),
        Err(Error::ColumnNotFound(_))
    ));
}

#[test]
fn test_every_row_attempted_once() {
    let ws = sheet(250);
    let view = SheetView::load(&ws, 1, 0, &WorkerPool::new(16));

    let mut sources: Vec<u32> = view.rows().map(Row::source_row).collect();
    sources.sort_unstable();
    assert_eq!(sources, (1..=250).collect::<Vec<_>>());

    for i in 1..=250u32 {
        let expected = format!("ORD-{:03}", i);
        assert_eq!(view.get_cell_value_at_row(0, i), Some(expected.as_str()));
        let ship_to = view.get_cell_value_at_row(1, i);
        assert_eq!(ship_to, if i % 2 == 0 { Some("Berlin") } else { None });
    }
}

#[test]
fn test_rows_restartable() {
    let view = SheetView::load(&sheet(10), 1, 0, &WorkerPool::new(4));
    let first: Vec<u32> = view.rows().map(Row::source_row).collect();
    let second: Vec<u32> = view.rows().map(Row::source_row).collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 10);
}

#[test]
fn test_positional_lookup_matches_store_order() {
    let view = SheetView::load(&sheet(30), 1, 0, &WorkerPool::new(4));

    for (position, row) in view.rows().enumerate() {
        assert_eq!(view.get_cell_value(0, position), row.get("_orderid"));
    }
}
