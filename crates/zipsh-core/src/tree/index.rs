//! Directory index built from a flat entry list.

use std::collections::{HashMap, HashSet};

use crate::path::{DirPath, EntryPath, FilePath};

/// One immediate child of a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeChild {
    /// Last path segment; directories keep their trailing `/`.
    pub name: String,
    /// `true` when this child is a directory.
    pub is_dir: bool,
}

/// Maps every directory to its immediate children, in entry order.
///
/// The index is a pure function of the entry list: [`DirectoryTree::build`]
/// never looks at anything else, so building twice from the same entries
/// yields equal trees. It is rebuilt from scratch whenever the archive
/// changes instead of being patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryTree {
    children: HashMap<DirPath, Vec<TreeChild>>,
    files: HashSet<FilePath>,
}

impl DirectoryTree {
    /// Builds the index from `entries`.
    ///
    /// Every directory entry gets a (possibly empty) child list; the root
    /// `/` is always present. Children are unique and keep the order in
    /// which they first appear.
    pub fn build(entries: &[EntryPath]) -> Self {
        let mut children: HashMap<DirPath, Vec<TreeChild>> = HashMap::new();
        let mut files = HashSet::new();
        let mut placed: HashSet<&str> = HashSet::new();

        children.insert(DirPath::root(), Vec::new());

        for entry in entries {
            match entry {
                EntryPath::Dir(dir) => {
                    children.entry(dir.clone()).or_default();
                }
                EntryPath::File(file) => {
                    files.insert(file.clone());
                }
            }

            if !placed.insert(entry.as_str()) {
                continue;
            }
            children.entry(entry.parent()).or_default().push(TreeChild {
                name: entry.child_name(),
                is_dir: entry.is_dir(),
            });
        }

        Self { children, files }
    }

    /// Immediate children of `dir`, or `None` if `dir` is not a directory.
    pub fn children_of(&self, dir: &DirPath) -> Option<&[TreeChild]> {
        self.children.get(dir).map(Vec::as_slice)
    }

    pub fn contains_dir(&self, dir: &DirPath) -> bool {
        self.children.contains_key(dir)
    }

    pub fn contains_file(&self, file: &FilePath) -> bool {
        self.files.contains(file)
    }

    pub fn contains(&self, entry: &EntryPath) -> bool {
        match entry {
            EntryPath::Dir(dir) => self.contains_dir(dir),
            EntryPath::File(file) => self.contains_file(file),
        }
    }

    /// Number of directories, not counting the root.
    pub fn dir_count(&self) -> usize {
        self.children.len() - 1
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(raw: &[&str]) -> Vec<EntryPath> {
        raw.iter().filter_map(|s| EntryPath::parse(s)).collect()
    }

    fn names(children: &[TreeChild]) -> Vec<&str> {
        children.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn empty_tree_has_root() {
        let tree = DirectoryTree::build(&[]);
        assert!(tree.contains_dir(&DirPath::root()));
        assert_eq!(tree.children_of(&DirPath::root()).unwrap().len(), 0);
        assert_eq!(tree.dir_count(), 0);
        assert_eq!(tree.file_count(), 0);
    }

    #[test]
    fn children_are_immediate_only() {
        let tree = DirectoryTree::build(&entries(&[
            "/a/",
            "/a/x.txt",
            "/a/sub/",
            "/a/sub/y.txt",
            "/b/",
        ]));

        let root = tree.children_of(&DirPath::root()).unwrap();
        assert_eq!(names(root), vec!["a/", "b/"]);

        let a = tree.children_of(&DirPath::new("/a/")).unwrap();
        assert_eq!(names(a), vec!["x.txt", "sub/"]);
        assert!(!a[0].is_dir);
        assert!(a[1].is_dir);
    }

    #[test]
    fn empty_directory_has_empty_children() {
        let tree = DirectoryTree::build(&entries(&["/a/", "/b/"]));
        assert_eq!(tree.children_of(&DirPath::new("/b/")), Some(&[][..]));
    }

    #[test]
    fn unknown_directory_has_no_children() {
        let tree = DirectoryTree::build(&entries(&["/a/"]));
        assert!(tree.children_of(&DirPath::new("/nope/")).is_none());
    }

    #[test]
    fn file_is_not_a_directory() {
        let tree = DirectoryTree::build(&entries(&["/a/", "/a/x.txt"]));
        let file = FilePath::new("/a/x.txt").unwrap();

        assert!(tree.contains_file(&file));
        assert!(!tree.contains_dir(&DirPath::new("/a/x.txt")));
        assert!(tree.contains(&EntryPath::File(file)));
    }

    #[test]
    fn duplicate_entries_are_listed_once() {
        let tree = DirectoryTree::build(&entries(&["/a/", "/a/", "/a/x.txt", "/a/x.txt"]));
        assert_eq!(names(tree.children_of(&DirPath::root()).unwrap()), vec!["a/"]);
        assert_eq!(names(tree.children_of(&DirPath::new("/a/")).unwrap()), vec!["x.txt"]);
    }

    #[test]
    fn counts_directories_and_files() {
        let tree =
            DirectoryTree::build(&entries(&["/a/", "/a/x.txt", "/a/sub/", "/b/", "/top.txt"]));
        assert_eq!(tree.dir_count(), 3);
        assert_eq!(tree.file_count(), 2);
    }

    #[test]
    fn rebuild_is_deterministic() {
        let list = entries(&["/b/", "/a/", "/a/x.txt", "/a/y/", "/a/y/z.txt", "/c.txt"]);
        let first = DirectoryTree::build(&list);
        let second = DirectoryTree::build(&list);
        assert_eq!(first, second);
    }
}
