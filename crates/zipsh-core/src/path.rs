//! Path model for archive entries.
//!
//! Every entry inside an archive is addressed by an absolute, `/`-separated
//! path relative to the archive's root folder. Directories always end with
//! `/`, files never do. [`DirPath`] and [`FilePath`] encode that convention
//! in the type system so callers cannot mix them up; [`EntryPath`] is the
//! sum of both.
//!
//! The free functions [`clean`], [`normalize_dir`], [`resolve`] and
//! [`is_ancestor`] are the string-level building blocks the typed paths
//! are made of.

use std::fmt;

/// The archive root directory.
pub const ROOT: &str = "/";

/// Splits `path` into its non-empty segments, skipping `.` segments.
///
/// `..` segments are returned as-is; nothing in this module collapses them.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty() && *s != ".")
}

/// Collapses repeated slashes and `.` segments.
///
/// A leading `/` and a trailing `/` are preserved if present, so
/// `clean("/a//./b/")` is `"/a/b/"` and `clean("a/b")` stays relative.
pub fn clean(path: &str) -> String {
    let absolute = path.starts_with('/');
    let joined = segments(path).collect::<Vec<_>>().join("/");

    let mut cleaned = String::with_capacity(joined.len() + 2);
    if absolute {
        cleaned.push('/');
    }
    cleaned.push_str(&joined);
    if path.ends_with('/') && !joined.is_empty() {
        cleaned.push('/');
    }
    cleaned
}

/// Normalises `path` into a directory reference ending with `/`.
///
/// The path is [`clean`]ed first; `..` segments are left untouched.
pub fn normalize_dir(path: &str) -> String {
    let mut cleaned = clean(path);
    if !cleaned.ends_with('/') {
        cleaned.push('/');
    }
    cleaned
}

/// Resolves a user-supplied argument against the current directory.
///
/// Absolute arguments (starting with `/`) are returned cleaned; relative
/// ones are appended to `current_dir`.
pub fn resolve(current_dir: &DirPath, arg: &str) -> String {
    if arg.starts_with('/') {
        clean(arg)
    } else {
        clean(&format!("{}{}", current_dir.as_str(), arg))
    }
}

/// Returns `true` if `descendant` lies strictly below directory `ancestor`.
///
/// The comparison is segment-wise, so `/ab` is *not* an ancestor of `/abc`
/// even though it is a string prefix of it. A path is never its own
/// ancestor.
pub fn is_ancestor(ancestor: &str, descendant: &str) -> bool {
    let ancestor: Vec<&str> = segments(ancestor).collect();
    let descendant: Vec<&str> = segments(descendant).collect();
    ancestor.len() < descendant.len() && descendant.starts_with(&ancestor)
}

/// An absolute directory path, always starting and ending with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DirPath(String);

impl DirPath {
    /// The archive root, `/`.
    pub fn root() -> Self {
        Self(ROOT.to_string())
    }

    /// Builds a directory path from any string, adding the leading and
    /// trailing slashes if they are missing.
    pub fn new(path: &str) -> Self {
        let cleaned = clean(path);
        if cleaned.starts_with('/') {
            Self(normalize_dir(&cleaned))
        } else {
            Self(normalize_dir(&format!("/{cleaned}")))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT
    }

    /// Number of segments below the root (`/` is 0, `/a/b/` is 2).
    pub fn depth(&self) -> usize {
        segments(&self.0).count()
    }

    /// The last segment without its trailing slash, `None` for the root.
    pub fn name(&self) -> Option<&str> {
        segments(&self.0).last()
    }

    /// The enclosing directory, `None` for the root.
    pub fn parent(&self) -> Option<DirPath> {
        if self.is_root() {
            return None;
        }
        Some(self.strip_segments(1))
    }

    /// Removes `count` trailing segments, stopping at the root.
    pub fn strip_segments(&self, count: usize) -> DirPath {
        let parts: Vec<&str> = segments(&self.0).collect();
        let keep = parts.len().saturating_sub(count);
        DirPath::new(&parts[..keep].join("/"))
    }

    pub fn join_dir(&self, name: &str) -> DirPath {
        DirPath::new(&format!("{}{}", self.0, name))
    }

    pub fn join_file(&self, name: &str) -> FilePath {
        FilePath(clean(&format!("{}{}", self.0, name.trim_end_matches('/'))))
    }

    /// Returns `true` if `other` lies strictly below this directory.
    pub fn is_ancestor_of(&self, other: &str) -> bool {
        is_ancestor(&self.0, other)
    }

    /// Re-anchors this path after the directory `from` was moved to `to`.
    ///
    /// Returns `None` when this path is neither `from` nor below it.
    pub fn rebase(&self, from: &DirPath, to: &DirPath) -> Option<DirPath> {
        if self == from {
            return Some(to.clone());
        }
        if !from.is_ancestor_of(&self.0) {
            return None;
        }
        Some(DirPath::new(&format!("{}{}", to.0, &self.0[from.0.len()..])))
    }
}

impl Default for DirPath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for DirPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An absolute file path: starts with `/`, never ends with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilePath(String);

impl FilePath {
    /// Builds a file path, or `None` if `path` names a directory
    /// (trailing `/`) or is empty.
    pub fn new(path: &str) -> Option<Self> {
        if path.ends_with('/') {
            return None;
        }
        let cleaned = clean(path);
        if segments(&cleaned).next().is_none() {
            return None;
        }
        if cleaned.starts_with('/') {
            Some(Self(cleaned))
        } else {
            Some(Self(format!("/{cleaned}")))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn name(&self) -> &str {
        segments(&self.0).last().unwrap_or_default()
    }

    pub fn parent(&self) -> DirPath {
        DirPath::new(&self.0).strip_segments(1)
    }
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single archive entry: either a directory or a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryPath {
    Dir(DirPath),
    File(FilePath),
}

impl EntryPath {
    /// Parses an entry path; a trailing `/` marks a directory.
    ///
    /// Returns `None` for the root itself, which is implicit and never an
    /// entry.
    pub fn parse(path: &str) -> Option<Self> {
        if segments(path).next().is_none() {
            return None;
        }
        if path.ends_with('/') {
            Some(Self::Dir(DirPath::new(path)))
        } else {
            FilePath::new(path).map(Self::File)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Dir(dir) => dir.as_str(),
            Self::File(file) => file.as_str(),
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Dir(_))
    }

    /// The directory holding this entry.
    pub fn parent(&self) -> DirPath {
        match self {
            Self::Dir(dir) => dir.parent().unwrap_or_default(),
            Self::File(file) => file.parent(),
        }
    }

    /// The last segment as shown in listings: directories keep their
    /// trailing `/`, files have none.
    pub fn child_name(&self) -> String {
        match self {
            Self::Dir(dir) => format!("{}/", dir.name().unwrap_or_default()),
            Self::File(file) => file.name().to_string(),
        }
    }

    /// Maps this entry to its location after `from` was moved to `to`.
    ///
    /// Returns `None` when the entry is unaffected by the move.
    pub fn rebase(&self, from: &EntryPath, to: &EntryPath) -> Option<EntryPath> {
        if self == from {
            return Some(to.clone());
        }
        match (from, to) {
            (Self::Dir(from_dir), Self::Dir(to_dir)) if from_dir.is_ancestor_of(self.as_str()) => {
                let rest = &self.as_str()[from_dir.as_str().len()..];
                EntryPath::parse(&format!("{}{}", to_dir.as_str(), rest))
            }
            _ => None,
        }
    }
}

impl fmt::Display for EntryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
