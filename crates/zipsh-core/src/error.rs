//! Error types for `zipsh-core`.
//!
//! All fallible operations in the core library return [`CoreResult<T>`],
//! which is an alias for `Result<T, CoreError>`.

use std::path::PathBuf;

use crate::mutation::MoveError;

/// Unified error type for all core operations.
///
/// Each variant captures just enough context for the shell to print a
/// meaningful message. Only [`CoreError::UnsupportedFormat`] and archive
/// loading failures at startup are fatal; everything else is reported and
/// the command loop continues.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The archive extension is not one the codec understands.
    #[error("unsupported archive format: {0}")]
    UnsupportedFormat(PathBuf),

    /// The archive does not follow the single top-level folder layout.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// The archive codec failed to read or write the archive bytes.
    #[error("archive error: {0}")]
    Codec(String),

    /// The target path does not exist on disk.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// The process lacks permission to access the path.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// `cd` target is not a directory inside the archive.
    #[error("no such directory: {0}")]
    NoSuchDirectory(String),

    /// The command name is not recognised by the shell.
    #[error("command not found: {0}")]
    CommandNotFound(String),

    /// A command was invoked with the wrong arguments.
    #[error("usage: {0}")]
    Usage(String),

    /// An `mv` precondition was violated. Nothing was changed.
    #[error(transparent)]
    Move(#[from] MoveError),

    /// The repacked archive does not contain the expected entries.
    #[error("repacked archive failed verification: {0}")]
    Verification(String),

    /// Failed to parse a TOML configuration file.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout `zipsh-core`.
pub type CoreResult<T> = Result<T, CoreError>;
