//! Directory listing (`ls`).

use crate::path::DirPath;
use crate::tree::DirectoryTree;

/// Names of the immediate children of `dir`, in entry order.
///
/// Only direct children are returned, never deeper descendants.
/// Directories keep their trailing `/`. An unknown directory lists as empty.
pub fn list_directory(tree: &DirectoryTree, dir: &DirPath) -> Vec<String> {
    tree.children_of(dir)
        .map(|children| children.iter().map(|c| c.name.clone()).collect())
        .unwrap_or_default()
}
