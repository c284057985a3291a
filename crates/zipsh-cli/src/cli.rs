//! Command-line arguments and configuration lookup.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use zipsh_core::Config;

#[derive(Parser, Debug)]
#[command(name = "zipsh")]
#[command(version, about = "Browse and rearrange a zip archive from a shell prompt")]
pub struct Cli {
    /// User name shown in the prompt
    pub user: String,

    /// Host name shown in the prompt
    pub host: String,

    /// The .zip archive to open
    pub archive: PathBuf,

    /// Configuration file (defaults to ./config/default.toml, then
    /// ~/.config/zipsh/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Loads the configuration.
///
/// An explicit path must load. Otherwise the first existing file from
/// [`default_locations`] is used, falling back to built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()));
    }

    match default_locations().into_iter().find(|p| p.is_file()) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn default_locations() -> Vec<PathBuf> {
    let mut locations = vec![Path::new("config").join("default.toml")];
    if let Ok(home) = std::env::var("HOME") {
        locations.push(
            PathBuf::from(home)
                .join(".config")
                .join("zipsh")
                .join("config.toml"),
        );
    }
    locations
}
