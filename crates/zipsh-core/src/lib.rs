//! zipsh core library: a shell view over a zip archive.
//!
//! `zipsh-core` turns the flat member list of an archive into a navigable
//! directory tree and implements the shell commands on top of it. It has no
//! terminal handling of its own; the `zipsh` binary drives a [`Session`]
//! from standard input.
//!
//! # Modules
//!
//! - [`path`]: typed archive paths ([`DirPath`], [`FilePath`], [`EntryPath`]) and resolution.
//! - [`archive`]: the [`ArchiveCodec`] seam, the zip codec and the opened [`Archive`].
//! - [`tree`]: the [`DirectoryTree`] index and the `tree` renderer.
//! - [`nav`]: [`Navigation`] state for `cd`, and `ls` listings.
//! - [`mutation`]: `mv` validation and the crash-safe rewrite of the archive.
//! - [`shell`]: command parsing and the [`Session`] dispatcher.
//! - [`config`]: TOML settings.
//! - [`error`]: unified error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod archive;
pub mod config;
pub mod error;
pub mod mutation;
pub mod nav;
pub mod path;
pub mod shell;
pub mod tree;

pub use archive::{Archive, ArchiveCodec, ArchiveFormat, ZipCodec};
pub use config::{ArchiveConfig, Compression, Config, LogConfig, ShellConfig};
pub use error::{CoreError, CoreResult};
pub use mutation::{apply_move, execute_move, plan_move, rewrite_archive, MoveError, MovePlan};
pub use nav::{list_directory, Navigation};
pub use path::{DirPath, EntryPath, FilePath};
pub use shell::{Command, CommandResult, Session};
pub use tree::{render_tree, DirectoryTree, TreeChild, TreeReport};

/// Normalises a string to NFC (composed) form.
///
/// Archives written on macOS often carry NFD (decomposed) member names, so
/// names are re-composed before they are compared or displayed.
pub fn nfc_string(s: &str) -> String {
    use unicode_normalization::UnicodeNormalization;
    s.nfc().collect()
}
