//! File-system helpers for staging documents and export folders

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Result;

/// Create the parent directory chain of `file_path`
pub fn prepare_folder<P: AsRef<Path>>(file_path: P) -> Result<()> {
    if let Some(parent) = file_path
        .as_ref()
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Create `dir` and its parents if missing
pub fn ensure_folder<P: AsRef<Path>>(dir: P) -> Result<()> {
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Leave `dir` existing and empty
pub fn prepare_empty_folder<P: AsRef<Path>>(dir: P) -> Result<()> {
    let dir = dir.as_ref();
    if dir.is_dir() {
        clear_folder(dir, false)
    } else {
        ensure_folder(dir)
    }
}

/// Delete everything below `dir`, and `dir` itself when `delete_parent` is set.
///
/// Walks post-order: a directory is removed only after its contents.
/// A missing `dir` is a no-op.
pub fn clear_folder<P: AsRef<Path>>(dir: P, delete_parent: bool) -> Result<()> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Ok(());
    }

    tracing::debug!(dir = %dir.display(), delete_parent, "clearing folder");
    for entry in WalkDir::new(dir).min_depth(1).contents_first(true) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            fs::remove_dir(entry.path())?;
        } else {
            remove_file_forced(entry.path())?;
        }
    }

    if delete_parent {
        fs::remove_dir(dir)?;
    }
    Ok(())
}

/// Delete a file, or a directory with everything in it
pub fn delete_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        clear_folder(path, true)
    } else {
        delete_file(path);
        Ok(())
    }
}

/// Copy `source` to `dest`. A missing source is a no-op.
///
/// Without `overwrite`, an existing `dest` is an error.
pub fn copy_file<P: AsRef<Path>, Q: AsRef<Path>>(source: P, dest: Q, overwrite: bool) -> Result<()> {
    let (source, dest) = (source.as_ref(), dest.as_ref());
    if !source.is_file() {
        return Ok(());
    }
    check_dest(dest, overwrite)?;
    fs::copy(source, dest)?;
    Ok(())
}

/// Move `source` to `dest`. A missing source is a no-op.
pub fn move_file<P: AsRef<Path>, Q: AsRef<Path>>(source: P, dest: Q, overwrite: bool) -> Result<()> {
    let (source, dest) = (source.as_ref(), dest.as_ref());
    if !source.is_file() {
        return Ok(());
    }
    check_dest(dest, overwrite)?;

    if fs::rename(source, dest).is_err() {
        // rename fails across file systems
        fs::copy(source, dest)?;
        fs::remove_file(source)?;
    }
    Ok(())
}

/// Copy the tree under `source` into `dest`
pub fn copy_directory<P: AsRef<Path>, Q: AsRef<Path>>(source: P, dest: Q, overwrite: bool) -> Result<()> {
    let (source, dest) = (source.as_ref(), dest.as_ref());
    if !source.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("source directory not found: {}", source.display()),
        )
        .into());
    }

    for entry in WalkDir::new(source) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let target = dest.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            check_dest(&target, overwrite)?;
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Move the tree under `source` to `dest`. A missing source is a no-op.
///
/// With `overwrite`, an existing `dest` tree is removed first. Without it,
/// an existing `dest` is an error.
pub fn move_directory<P: AsRef<Path>, Q: AsRef<Path>>(source: P, dest: Q, overwrite: bool) -> Result<()> {
    let (source, dest) = (source.as_ref(), dest.as_ref());
    if !source.is_dir() {
        return Ok(());
    }
    if dest.exists() {
        if !overwrite {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("destination exists: {}", dest.display()),
            )
            .into());
        }
        delete_path(dest)?;
    }
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    tracing::debug!(source = %source.display(), dest = %dest.display(), "moving folder");
    if fs::rename(source, dest).is_err() {
        copy_directory(source, dest, true)?;
        clear_folder(source, true)?;
    }
    Ok(())
}

/// Delete a file if present. Failures are logged, not returned.
pub fn delete_file<P: AsRef<Path>>(path: P) {
    let path = path.as_ref();
    if !path.is_file() {
        return;
    }
    match remove_file_forced(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "file deleted"),
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to delete file"),
    }
}

/// Every file below `dir`, sorted
pub fn files_in_directory<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn check_dest(dest: &Path, overwrite: bool) -> Result<()> {
    if dest.exists() {
        if !overwrite {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("destination exists: {}", dest.display()),
            )
            .into());
        }
        remove_file_forced(dest)?;
    }
    Ok(())
}

/// Remove a file, clearing its read-only flag first
fn remove_file_forced(path: &Path) -> io::Result<()> {
    if let Ok(metadata) = fs::symlink_metadata(path) {
        let mut permissions = metadata.permissions();
        if permissions.readonly() && !metadata.file_type().is_symlink() {
            #[allow(clippy::permissions_set_readonly_false)]
            permissions.set_readonly(false);
            fs::set_permissions(path, permissions)?;
        }
    }
    fs::remove_file(path)
}
