//! Current/previous directory tracking and `cd` semantics.

use crate::error::{CoreError, CoreResult};
use crate::path::{normalize_dir, resolve, DirPath, ROOT};
use crate::tree::DirectoryTree;

/// Immutable navigation state: the current and the previous directory.
///
/// Every transition returns a **new** `Navigation`, following the
/// project-wide immutability convention. A failed `cd` returns an error and
/// leaves the original untouched, so callers can simply keep the old value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigation {
    current: DirPath,
    previous: DirPath,
}

impl Navigation {
    /// Starts at `/` with `/` as the previous directory.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_dir(&self) -> &DirPath {
        &self.current
    }

    pub fn previous_dir(&self) -> &DirPath {
        &self.previous
    }

    /// Applies `cd` with an optional argument against `tree`.
    ///
    /// - no argument or `/`: go to the root;
    /// - `-`: swap current and previous;
    /// - anything containing `..`: climb one level per `..` occurrence,
    ///   stopping at the root (a no-op when already there);
    /// - otherwise the argument is tried relative to the current directory,
    ///   then as an absolute path.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoSuchDirectory`] when the target is not a
    /// directory in `tree`.
    pub fn cd(&self, arg: Option<&str>, tree: &DirectoryTree) -> CoreResult<Self> {
        let Some(arg) = arg else {
            return Ok(self.go_to(DirPath::root()));
        };

        if arg == ROOT {
            return Ok(self.go_to(DirPath::root()));
        }
        if normalize_dir(arg) == "-/" {
            return Ok(self.swap());
        }
        if arg.contains("..") {
            return Ok(self.climb(arg.matches("..").count()));
        }

        let relative = DirPath::new(&resolve(&self.current, arg));
        if tree.contains_dir(&relative) {
            return Ok(self.go_to(relative));
        }
        let absolute = DirPath::new(arg);
        if tree.contains_dir(&absolute) {
            return Ok(self.go_to(absolute));
        }

        Err(CoreError::NoSuchDirectory(arg.to_string()))
    }

    /// Moves to `target`, remembering the current directory as previous.
    pub fn go_to(&self, target: DirPath) -> Self {
        Self {
            previous: self.current.clone(),
            current: target,
        }
    }

    /// Swaps current and previous (`cd -`).
    pub fn swap(&self) -> Self {
        Self {
            current: self.previous.clone(),
            previous: self.current.clone(),
        }
    }

    /// Strips `levels` trailing segments from the current directory.
    ///
    /// At the root this is a no-op and `previous` is kept as-is.
    pub fn climb(&self, levels: usize) -> Self {
        if self.current.is_root() {
            return self.clone();
        }
        if levels >= self.current.depth() {
            return self.go_to(DirPath::root());
        }
        self.go_to(self.current.strip_segments(levels))
    }

    /// Re-anchors both directories after the tree changed underneath.
    ///
    /// When `moved` is `Some((from, to))`, paths at or below `from` follow
    /// the directory to `to`. Any path that no longer exists in `tree`
    /// falls back to the root.
    pub fn reconcile(&self, moved: Option<(&DirPath, &DirPath)>, tree: &DirectoryTree) -> Self {
        let fix = |dir: &DirPath| {
            let rebased = moved
                .and_then(|(from, to)| dir.rebase(from, to))
                .unwrap_or_else(|| dir.clone());
            if tree.contains_dir(&rebased) {
                rebased
            } else {
                DirPath::root()
            }
        };
        Self {
            current: fix(&self.current),
            previous: fix(&self.previous),
        }
    }
}
