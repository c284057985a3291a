//! The read-eval-print loop.

use std::io::{BufRead, Write};

use crossterm::style::Stylize;
use zipsh_core::{ArchiveCodec, DirPath, Session};

/// The `{user}@{host}:{current_dir}$ ` prompt.
#[derive(Debug, Clone)]
pub struct Prompt {
    user: String,
    host: String,
    color: bool,
}

impl Prompt {
    pub fn new(user: String, host: String, color: bool) -> Self {
        Self { user, host, color }
    }

    pub fn render(&self, cwd: &DirPath) -> String {
        let identity = format!("{}@{}", self.user, self.host);
        if self.color {
            format!("{}:{}$ ", identity.green().bold(), cwd.as_str().blue().bold())
        } else {
            format!("{identity}:{cwd}$ ")
        }
    }
}

/// Reads commands from `input` until `exit` or end of input.
///
/// Command output goes to `out`; failed commands and lines that are not
/// valid UTF-8 are reported on `err` and the loop continues.
pub fn run<C, R, W, E>(
    session: &mut Session<C>,
    prompt: &Prompt,
    mut input: R,
    mut out: W,
    mut err: E,
) -> anyhow::Result<()>
where
    C: ArchiveCodec,
    R: BufRead,
    W: Write,
    E: Write,
{
    let mut buf = Vec::new();
    loop {
        write!(out, "{}", prompt.render(session.current_dir()))?;
        out.flush()?;

        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            writeln!(out)?;
            tracing::info!("end of input");
            return Ok(());
        }
        let Ok(line) = std::str::from_utf8(&buf) else {
            tracing::warn!(bytes = buf.len(), "input line is not valid UTF-8");
            writeln!(err, "input is not valid UTF-8")?;
            continue;
        };

        match session.run_line(line) {
            Ok(result) => {
                for text in &result.output {
                    writeln!(out, "{text}")?;
                }
                if result.exit {
                    tracing::info!("exit");
                    return Ok(());
                }
            }
            Err(e) => {
                tracing::warn!(command = line.trim(), error = %e, "command failed");
                writeln!(err, "{e}")?;
            }
        }
    }
}
