//! ASCII rendering of a [`DirectoryTree`], as printed by `tree`.

use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::path::DirPath;
use crate::tree::index::{DirectoryTree, TreeChild};

/// Connector for every item but the last in a group.
pub const BRANCH: &str = "├── ";
/// Connector for the last item in a group.
pub const CORNER: &str = "└── ";
/// Indent below an item drawn with [`BRANCH`].
pub const PIPE: &str = "│   ";
/// Indent below an item drawn with [`CORNER`].
pub const BLANK: &str = "    ";

/// The rendered tree below one directory plus its summary counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeReport {
    /// The directory the tree was rendered from.
    pub root: DirPath,
    /// One line per entry, connectors included.
    pub lines: Vec<String>,
    pub directories: usize,
    pub files: usize,
}

impl TreeReport {
    /// The closing line, e.g. `2 directories, 1 file`.
    pub fn summary(&self) -> String {
        format!(
            "{} {}, {} {}",
            self.directories,
            plural(self.directories, "directory", "directories"),
            self.files,
            plural(self.files, "file", "files"),
        )
    }

    /// All output lines: header, entries, a blank line, summary.
    pub fn to_lines(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.lines.len() + 3);
        out.push(self.root.to_string());
        out.extend(self.lines.iter().cloned());
        out.push(String::new());
        out.push(self.summary());
        out
    }
}

impl fmt::Display for TreeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.to_lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Renders everything below `scope`.
///
/// Each directory's children form a group. Within a group files come
/// before directories and otherwise keep entry order; the last item uses
/// [`CORNER`], the rest [`BRANCH`]. Counts follow from the groups visited:
/// `directories = groups - 1` (the scope itself is a group) and
/// `files = entries - directories`.
///
/// # Errors
///
/// Returns [`CoreError::NoSuchDirectory`] if `scope` is not in the tree.
pub fn render_tree(tree: &DirectoryTree, scope: &DirPath) -> CoreResult<TreeReport> {
    if !tree.contains_dir(scope) {
        return Err(CoreError::NoSuchDirectory(scope.to_string()));
    }

    let mut lines = Vec::new();
    let mut groups = 0;
    render_group(tree, scope, "", &mut lines, &mut groups);

    let directories = groups - 1;
    let files = lines.len() - directories;
    Ok(TreeReport {
        root: scope.clone(),
        lines,
        directories,
        files,
    })
}

fn render_group(
    tree: &DirectoryTree,
    dir: &DirPath,
    prefix: &str,
    lines: &mut Vec<String>,
    groups: &mut usize,
) {
    *groups += 1;
    let Some(children) = tree.children_of(dir) else {
        return;
    };

    // Stable sort: files keep their order, then directories keep theirs.
    let mut ordered: Vec<&TreeChild> = children.iter().collect();
    ordered.sort_by_key(|child| child.is_dir);

    let last = ordered.len().saturating_sub(1);
    for (idx, child) in ordered.into_iter().enumerate() {
        let is_last = idx == last;
        let connector = if is_last { CORNER } else { BRANCH };
        lines.push(format!("{prefix}{connector}{}", child.name));

        if child.is_dir {
            let indent = if is_last { BLANK } else { PIPE };
            render_group(
                tree,
                &dir.join_dir(&child.name),
                &format!("{prefix}{indent}"),
                lines,
                groups,
            );
        }
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}
