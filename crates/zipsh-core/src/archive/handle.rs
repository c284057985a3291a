//! The open archive and its derived entry index.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::archive::codec::{ArchiveCodec, ArchiveFormat};
use crate::error::{CoreError, CoreResult};
use crate::path::EntryPath;
use crate::tree::DirectoryTree;

/// An archive opened by the shell.
///
/// Holds the on-disk location, the name of the single top-level folder that
/// every member lives under, the [`EntryPath`] set (the source of truth) and
/// the [`DirectoryTree`] index derived from it.
///
/// `Archive` is never patched in place: after a mutation the caller obtains
/// a fresh instance from [`Archive::reload`], so the index can never go
/// stale.
#[derive(Debug, Clone)]
pub struct Archive {
    path: PathBuf,
    root_name: String,
    entries: Vec<EntryPath>,
    tree: DirectoryTree,
}

impl Archive {
    /// Opens the archive at `path` and builds its directory index.
    ///
    /// # Errors
    ///
    /// - [`CoreError::UnsupportedFormat`] if the extension is not `.zip`.
    /// - [`CoreError::NotFound`] if the archive does not exist.
    /// - [`CoreError::InvalidArchive`] if members do not share one root folder.
    /// - [`CoreError::Codec`] if the archive cannot be decoded.
    pub fn open(path: &Path, codec: &impl ArchiveCodec) -> CoreResult<Self> {
        ArchiveFormat::detect(path)?;
        let names = codec.list(path)?;
        let (root_name, entries) = parse_entries(&names)?;
        let tree = DirectoryTree::build(&entries);

        tracing::debug!(
            archive = %path.display(),
            root = %root_name,
            entries = entries.len(),
            "loaded archive"
        );

        Ok(Self {
            path: path.to_path_buf(),
            root_name,
            entries,
            tree,
        })
    }

    /// Re-reads the archive from disk, returning a fresh handle.
    pub fn reload(&self, codec: &impl ArchiveCodec) -> CoreResult<Self> {
        Self::open(&self.path, codec)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The top-level folder stripped from every member name.
    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// Entry paths in archive order.
    pub fn entries(&self) -> &[EntryPath] {
        &self.entries
    }

    pub fn tree(&self) -> &DirectoryTree {
        &self.tree
    }
}

/// Turns raw member names into the root folder name and [`EntryPath`]s.
///
/// Every member must live under the same top-level folder, which is
/// stripped. The member naming the folder itself is dropped. Directories
/// that are implied by a member but never listed on their own are inserted
/// just before their first descendant, so the result is prefix-closed.
/// Duplicate names are kept once, in first-seen order.
///
/// # Errors
///
/// Returns [`CoreError::InvalidArchive`] when the archive is empty, when a
/// member sits outside any folder or has an absolute name, or when members
/// use more than one top-level folder.
pub fn parse_entries(names: &[String]) -> CoreResult<(String, Vec<EntryPath>)> {
    let mut root_name: Option<String> = None;
    let mut seen: HashSet<EntryPath> = HashSet::new();
    let mut entries = Vec::new();

    for raw in names {
        let name = crate::nfc_string(raw);
        if name.starts_with('/') {
            return Err(CoreError::InvalidArchive(format!(
                "absolute member name: {name}"
            )));
        }
        let Some((top, rest)) = name.split_once('/') else {
            return Err(CoreError::InvalidArchive(format!(
                "member outside of a root folder: {name}"
            )));
        };

        match &root_name {
            None => root_name = Some(top.to_string()),
            Some(root) if root != top => {
                return Err(CoreError::InvalidArchive(format!(
                    "multiple top-level folders: {root}, {top}"
                )));
            }
            Some(_) => {}
        }

        let Some(entry) = EntryPath::parse(&format!("/{rest}")) else {
            continue;
        };
        push_with_parents(entry, &mut seen, &mut entries);
    }

    let root_name =
        root_name.ok_or_else(|| CoreError::InvalidArchive("archive is empty".to_string()))?;
    Ok((root_name, entries))
}

fn push_with_parents(entry: EntryPath, seen: &mut HashSet<EntryPath>, entries: &mut Vec<EntryPath>) {
    let mut missing = Vec::new();
    let mut parent = entry.parent();
    while !parent.is_root() {
        let dir = EntryPath::Dir(parent.clone());
        if seen.contains(&dir) {
            break;
        }
        missing.push(dir);
        parent = parent.parent().unwrap_or_default();
    }

    for dir in missing.into_iter().rev() {
        tracing::warn!(entry = %dir, "synthesized missing directory entry");
        seen.insert(dir.clone());
        entries.push(dir);
    }

    if seen.insert(entry.clone()) {
        entries.push(entry);
    }
}
