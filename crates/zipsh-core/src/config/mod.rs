//! Configuration management for zipsh.
//!
//! Shell, archive and logging preferences ([`settings::Config`]) are stored
//! as a TOML file and loaded at startup.

pub mod settings;

pub use settings::{ArchiveConfig, Compression, Config, LogConfig, ShellConfig};
