//! Filesystem primitives used while an archive is unpacked for a move.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};
use crate::path::{segments, EntryPath};

/// Maximum nesting depth followed by [`copy_path`].
const MAX_COPY_DEPTH: usize = 64;

/// Where `entry` lives inside an archive extracted under `scratch`.
pub fn entry_location(scratch: &Path, root_name: &str, entry: &EntryPath) -> PathBuf {
    let mut location = scratch.join(root_name);
    for segment in segments(entry.as_str()) {
        location.push(segment);
    }
    location
}

/// Copies a file or a directory tree to `dest`, creating parents as needed.
///
/// An existing file at `dest` is overwritten.
///
/// # Errors
///
/// - [`CoreError::NotFound`] if `src` does not exist.
/// - [`CoreError::Io`] for any I/O failure during copy.
pub fn copy_path(src: &Path, dest: &Path) -> CoreResult<()> {
    let meta = fs::symlink_metadata(src).map_err(|e| not_found_or_io(src, e))?;

    if meta.is_dir() {
        copy_dir_recursive(src, dest, 0)
    } else {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(src, dest)?;
        Ok(())
    }
}

fn copy_dir_recursive(src: &Path, dest: &Path, depth: usize) -> CoreResult<()> {
    if depth > MAX_COPY_DEPTH {
        return Err(CoreError::Io(io::Error::other(format!(
            "maximum recursion depth ({MAX_COPY_DEPTH}) exceeded during copy"
        ))));
    }

    fs::create_dir_all(dest)?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target, depth + 1)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

/// Moves a file or directory to `dest`.
///
/// Tries a plain `rename` first and falls back to copy + delete when that
/// fails. The parent of `dest` is created if missing.
///
/// # Errors
///
/// - [`CoreError::NotFound`] if `src` does not exist.
/// - [`CoreError::Io`] for any I/O failure.
pub fn move_path(src: &Path, dest: &Path) -> CoreResult<()> {
    if fs::symlink_metadata(src).is_err() {
        return Err(CoreError::NotFound(src.to_path_buf()));
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    if let Err(e) = fs::rename(src, dest) {
        tracing::debug!(
            src = %src.display(),
            dest = %dest.display(),
            error = %e,
            "rename failed, falling back to copy"
        );
        copy_path(src, dest)?;
        delete_path(src)?;
    }
    Ok(())
}

/// Deletes a file or a directory tree.
///
/// # Errors
///
/// - [`CoreError::NotFound`] if `path` does not exist.
/// - [`CoreError::Io`] for any I/O failure during deletion.
pub fn delete_path(path: &Path) -> CoreResult<()> {
    let meta = fs::symlink_metadata(path).map_err(|e| not_found_or_io(path, e))?;

    if meta.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}

fn not_found_or_io(path: &Path, error: io::Error) -> CoreError {
    if error.kind() == io::ErrorKind::NotFound {
        CoreError::NotFound(path.to_path_buf())
    } else {
        CoreError::Io(error)
    }
}
