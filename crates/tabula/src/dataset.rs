//! Loading helpers

use std::fs;
use std::path::Path;

use crate::engine::DocumentEngine;
use crate::error::Result;
use crate::store::{LoadOptions, WorkbookStore};

/// Open a document and load its sheets
pub fn load_dataset<E: DocumentEngine, P: AsRef<Path>>(
    path: P,
    options: &LoadOptions,
) -> Result<WorkbookStore<E>> {
    tracing::info!(path = %path.as_ref().display(), "loading workbook data into memory");
    WorkbookStore::open(path, options)
}

/// Apply `(row, column, value)` updates in order. Later updates to the same
/// cell win.
pub fn update_cells<E, S>(store: &mut WorkbookStore<E>, sheet: &str, updates: &[(u32, u16, S)]) -> Result<()>
where
    E: DocumentEngine,
    S: AsRef<str>,
{
    if updates.is_empty() {
        return Ok(());
    }
    for (row, column, value) in updates {
        store.update_cell(sheet, *column, *row, value.as_ref())?;
    }
    tracing::debug!(sheet, cells = updates.len(), "cells updated");
    Ok(())
}

/// Replace `target` with a copy of `template` and open it
pub fn open_from_template<E, P, Q>(template: P, target: Q, header_row: u32) -> Result<WorkbookStore<E>>
where
    E: DocumentEngine,
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let target = target.as_ref();
    if target.exists() {
        fs::remove_file(target)?;
    }
    fs::copy(template.as_ref(), target)?;

    load_dataset(target, &LoadOptions::default().with_header_row(header_row))
}
