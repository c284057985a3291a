//! Validation of `mv` requests against the directory tree.

use std::collections::HashSet;

use crate::mutation::MoveError;
use crate::path::{resolve, segments, DirPath, EntryPath, FilePath};
use crate::tree::DirectoryTree;

/// What a validated `mv` will do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovePlan {
    /// Source and destination are the same entry; nothing to do.
    Noop,
    /// Move `source` to `target`. `replaces` is set when `target` is an
    /// existing file that will be overwritten.
    Move {
        source: EntryPath,
        target: EntryPath,
        replaces: bool,
    },
}

/// Where the destination argument points.
enum Destination {
    /// An entry that already exists.
    Existing(EntryPath),
    /// A new name inside an existing directory.
    Rename(FilePath),
}

/// Checks an `mv` request and works out the final target path.
///
/// Checks run in this order, the first failure wins:
///
/// 1. exactly two arguments;
/// 2. both are resolved against `current`; a `..` segment in either is
///    rejected, since entry paths never climb;
/// 3. the source is not the root;
/// 4. the source exists as a file or directory;
/// 5. the destination exists, or is a new name in an existing directory;
/// 6. same source and destination is a [`MovePlan::Noop`];
/// 7. a directory cannot replace a file;
/// 8. a directory cannot move into its own subtree;
///
/// and finally moving into a directory must not clobber an existing entry.
///
/// When the destination is an existing directory the source moves inside
/// it and keeps its name; an existing file is replaced by a file source.
pub fn plan_move(
    args: &[String],
    current: &DirPath,
    tree: &DirectoryTree,
) -> Result<MovePlan, MoveError> {
    let [source_arg, dest_arg] = args else {
        return Err(MoveError::ArgumentCount(args.len()));
    };
    if let Some(arg) = [source_arg, dest_arg]
        .into_iter()
        .find(|arg| segments(arg).any(|s| s == ".."))
    {
        return Err(MoveError::ParentReference(arg.clone()));
    }

    let source_raw = resolve(current, source_arg);
    let dest_raw = resolve(current, dest_arg);

    if segments(&source_raw).next().is_none() {
        return Err(MoveError::RootSource);
    }
    let source = locate(&source_raw, tree)
        .ok_or_else(|| MoveError::SourceNotFound(source_arg.clone()))?;
    let destination = locate_destination(&dest_raw, tree)
        .ok_or_else(|| MoveError::DestinationNotFound(dest_arg.clone()))?;

    let (target, replaces, into_dir) = match destination {
        Destination::Existing(existing) if existing == source => return Ok(MovePlan::Noop),
        Destination::Existing(EntryPath::Dir(dir)) => (child_of(&dir, &source), false, true),
        Destination::Existing(EntryPath::File(file)) => {
            if source.is_dir() {
                return Err(MoveError::DirectoryOntoFile {
                    src: source.to_string(),
                    dest: file.to_string(),
                });
            }
            (EntryPath::File(file), true, false)
        }
        Destination::Rename(path) => (renamed(path, &source), false, false),
    };

    if target == source {
        return Ok(MovePlan::Noop);
    }
    if let EntryPath::Dir(dir) = &source {
        if dir.is_ancestor_of(target.as_str()) {
            return Err(MoveError::IntoOwnSubtree {
                src: source.to_string(),
                dest: target.to_string(),
            });
        }
    }
    if into_dir && occupied(tree, &target) {
        return Err(MoveError::DestinationExists(target.to_string()));
    }

    Ok(MovePlan::Move {
        source,
        target,
        replaces,
    })
}

/// The entry list after moving `source` to `target`, in the original order.
///
/// Entries at or below `source` are re-anchored under `target`; an entry
/// that the move overwrites is kept once.
pub fn apply_move(entries: &[EntryPath], source: &EntryPath, target: &EntryPath) -> Vec<EntryPath> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .map(|entry| entry.rebase(source, target).unwrap_or_else(|| entry.clone()))
        .filter(|entry| seen.insert(entry.clone()))
        .collect()
}

fn locate(raw: &str, tree: &DirectoryTree) -> Option<EntryPath> {
    if !raw.ends_with('/') {
        if let Some(file) = FilePath::new(raw) {
            if tree.contains_file(&file) {
                return Some(EntryPath::File(file));
            }
        }
    }
    let dir = DirPath::new(raw);
    tree.contains_dir(&dir).then_some(EntryPath::Dir(dir))
}

fn locate_destination(raw: &str, tree: &DirectoryTree) -> Option<Destination> {
    if let Some(existing) = locate(raw, tree) {
        return Some(Destination::Existing(existing));
    }
    if raw.ends_with('/') {
        return None;
    }
    let path = FilePath::new(raw)?;
    tree.contains_dir(&path.parent())
        .then_some(Destination::Rename(path))
}

fn child_of(dir: &DirPath, source: &EntryPath) -> EntryPath {
    match source {
        EntryPath::Dir(src) => EntryPath::Dir(dir.join_dir(src.name().unwrap_or_default())),
        EntryPath::File(src) => EntryPath::File(dir.join_file(src.name())),
    }
}

fn renamed(path: FilePath, source: &EntryPath) -> EntryPath {
    if source.is_dir() {
        EntryPath::Dir(DirPath::new(path.as_str()))
    } else {
        EntryPath::File(path)
    }
}

/// `true` if a file or a directory already sits at `target`'s name.
fn occupied(tree: &DirectoryTree, target: &EntryPath) -> bool {
    let bare = target.as_str().trim_end_matches('/');
    FilePath::new(bare).is_some_and(|file| tree.contains_file(&file))
        || tree.contains_dir(&DirPath::new(bare))
}
