//! The `mv` mutation engine.
//!
//! A move is done in two phases. [`plan::plan_move`] checks every
//! precondition against the in-memory tree and either rejects the move with
//! a [`MoveError`] or produces a [`plan::MovePlan`]. [`engine::rewrite_archive`]
//! then applies the plan to the archive on disk; [`engine::execute_move`]
//! does the same and returns a freshly loaded [`crate::archive::Archive`].

pub mod engine;
pub mod fs_ops;
pub mod plan;

pub use engine::{execute_move, rewrite_archive};
pub use plan::{apply_move, plan_move, MovePlan};

/// A violated `mv` precondition. Nothing on disk or in memory was changed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    /// `mv` needs exactly a source and a destination.
    #[error("mv: expected <source> <destination>, got {0} argument(s)")]
    ArgumentCount(usize),

    /// Paths given to `mv` may not contain `..`.
    #[error("mv: '..' is not supported in paths: '{0}'")]
    ParentReference(String),

    /// The archive root cannot be moved.
    #[error("mv: cannot move the root directory")]
    RootSource,

    /// The source is neither a file nor a directory in the archive.
    #[error("mv: cannot stat '{0}': no such file or directory")]
    SourceNotFound(String),

    /// Neither the destination nor its parent directory exists.
    #[error("mv: destination '{0}' does not exist")]
    DestinationNotFound(String),

    /// A directory cannot replace a file.
    #[error("mv: cannot overwrite non-directory '{dest}' with directory '{src}'")]
    DirectoryOntoFile { src: String, dest: String },

    /// A directory cannot be moved into itself or its own subtree.
    #[error("mv: cannot move '{src}' to a subdirectory of itself, '{dest}'")]
    IntoOwnSubtree { src: String, dest: String },

    /// Moving into a directory would clobber an entry of the same name.
    #[error("mv: '{0}' already exists")]
    DestinationExists(String),
}
