//! Archive codec: the byte-format layer below the shell.
//!
//! The rest of the crate only needs to list, extract and repack an
//! archive, which is captured by the [`ArchiveCodec`] trait.
//! [`ZipCodec`] is the implementation backed by the `zip` crate.

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path};

use walkdir::WalkDir;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::config::settings::Compression;
use crate::error::{CoreError, CoreResult};

/// Archive formats recognised by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
}

impl ArchiveFormat {
    /// Detects the format from the path's extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnsupportedFormat`] for any extension other
    /// than `.zip`, including no extension at all.
    pub fn detect(path: &Path) -> CoreResult<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("zip") => Ok(Self::Zip),
            _ => Err(CoreError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// The operations the shell needs from an archive format.
pub trait ArchiveCodec {
    /// Returns the raw member names in archive order.
    fn list(&self, archive: &Path) -> CoreResult<Vec<String>>;
    /// Materialises every member of `archive` under `dest`.
    fn extract(&self, archive: &Path, dest: &Path) -> CoreResult<()>;
    /// Builds a new archive at `dest` from the contents of `src_dir`.
    ///
    /// Member names are relative to `src_dir`, so a `src_dir` holding a
    /// single folder produces an archive with that folder as its root.
    fn repack(&self, src_dir: &Path, dest: &Path) -> CoreResult<()>;
}

/// Zip implementation of [`ArchiveCodec`].
#[derive(Debug, Clone, Copy)]
pub struct ZipCodec {
    compression: CompressionMethod,
}

impl ZipCodec {
    pub fn new(compression: Compression) -> Self {
        let compression = match compression {
            Compression::Deflated => CompressionMethod::Deflated,
            Compression::Stored => CompressionMethod::Stored,
        };
        Self { compression }
    }
}

impl Default for ZipCodec {
    fn default() -> Self {
        Self::new(Compression::default())
    }
}

impl ArchiveCodec for ZipCodec {
    fn list(&self, archive: &Path) -> CoreResult<Vec<String>> {
        let mut zip = open_zip(archive)?;
        let mut names = Vec::with_capacity(zip.len());
        for idx in 0..zip.len() {
            let entry = zip.by_index(idx).map_err(|e| map_zip_error(archive, e))?;
            names.push(entry.name().to_string());
        }
        Ok(names)
    }

    fn extract(&self, archive: &Path, dest: &Path) -> CoreResult<()> {
        let mut zip = open_zip(archive)?;
        for idx in 0..zip.len() {
            let mut entry = zip.by_index(idx).map_err(|e| map_zip_error(archive, e))?;
            let Some(relative) = entry.enclosed_name().filter(|p| is_contained(p)) else {
                tracing::warn!(name = entry.name(), "blocked unsafe archive member");
                return Err(CoreError::InvalidArchive(format!(
                    "member escapes extraction directory: {}",
                    entry.name()
                )));
            };
            // Entry paths are NFC; the scratch layout has to match them.
            let out_path = dest.join(crate::nfc_string(&relative.to_string_lossy()));

            if entry.is_dir() {
                fs::create_dir_all(&out_path)?;
                continue;
            }
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&out_path)?;
            io::copy(&mut entry, &mut out)?;
        }
        tracing::debug!(archive = %archive.display(), dest = %dest.display(), "extracted archive");
        Ok(())
    }

    fn repack(&self, src_dir: &Path, dest: &Path) -> CoreResult<()> {
        let file = File::create(dest)?;
        let mut writer = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(self.compression);

        let walker = WalkDir::new(src_dir).min_depth(1).sort_by_file_name();
        for item in walker {
            let item = item.map_err(|e| CoreError::Io(e.into()))?;
            let relative = item
                .path()
                .strip_prefix(src_dir)
                .map_err(|e| CoreError::Codec(e.to_string()))?;
            let mut name = member_name(relative);

            if item.file_type().is_dir() {
                name.push('/');
                writer
                    .add_directory(name, options)
                    .map_err(|e| map_zip_error(dest, e))?;
            } else {
                writer
                    .start_file(name, options)
                    .map_err(|e| map_zip_error(dest, e))?;
                let mut src = File::open(item.path())?;
                io::copy(&mut src, &mut writer)?;
            }
        }

        writer.finish().map_err(|e| map_zip_error(dest, e))?;
        tracing::debug!(src = %src_dir.display(), archive = %dest.display(), "repacked archive");
        Ok(())
    }
}

fn open_zip(path: &Path) -> CoreResult<ZipArchive<File>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => CoreError::NotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path.to_path_buf()),
        _ => CoreError::Io(e),
    })?;
    ZipArchive::new(file).map_err(|e| map_zip_error(path, e))
}

fn map_zip_error(path: &Path, error: ZipError) -> CoreError {
    match error {
        ZipError::Io(e) => CoreError::Io(e),
        other => CoreError::Codec(format!("{}: {}", path.display(), other)),
    }
}

/// Rejects anything but plain relative components.
fn is_contained(path: &Path) -> bool {
    path.components()
        .all(|component| matches!(component, Component::Normal(_)))
}

/// Joins path components with `/`, the zip member separator on every platform.
fn member_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Builds a zip archive at `archive` holding `entries`.
///
/// Names ending with `/` become directories; files get their own name as
/// content. Used by tests across the crate to create fixtures without
/// touching the codec under test.
#[cfg(test)]
pub(crate) fn write_fixture(archive: &Path, entries: &[&str]) -> std::path::PathBuf {
    use std::io::Write;

    let file = File::create(archive).unwrap();
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for name in entries {
        if name.ends_with('/') {
            writer.add_directory(name.to_string(), options).unwrap();
        } else {
            writer.start_file(name.to_string(), options).unwrap();
            writer.write_all(name.as_bytes()).unwrap();
        }
    }
    writer.finish().unwrap();
    archive.to_path_buf()
}
