//! zipsh: a shell for browsing and rearranging a zip archive.
//!
//! This binary parses the command line, loads configuration, sets up file
//! logging and runs the prompt loop over standard input.

mod cli;
mod repl;

use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::str::FromStr;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use zipsh_core::{LogConfig, Session, ZipCodec};

use crate::cli::{load_config, Cli};
use crate::repl::Prompt;

/// Sends `tracing` output to the configured log file so it never mixes
/// with the shell's own output.
fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    let level = tracing::Level::from_str(&config.level)
        .with_context(|| format!("invalid log level {:?}", config.level))?;
    let path = config.file_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.log)?;

    let codec = ZipCodec::new(config.archive.compression);
    let mut session = Session::open(&cli.archive, codec, &config.archive)
        .with_context(|| format!("cannot open {}", cli.archive.display()))?;

    let color = config.shell.color && io::stdout().is_terminal();
    let prompt = Prompt::new(cli.user, cli.host, color);

    let result = repl::run(
        &mut session,
        &prompt,
        io::stdin().lock(),
        io::stdout().lock(),
        io::stderr().lock(),
    );
    if let Err(e) = &result {
        tracing::error!(error = %e, "shell terminated");
    }
    result
}
