//! Command-line parsing for the shell.

use crate::error::{CoreError, CoreResult};

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ls,
    Cd(Option<String>),
    Tree,
    Mv(Vec<String>),
    Exit,
    /// A blank line.
    Empty,
}

impl Command {
    /// All recognised command names.
    pub fn names() -> &'static [&'static str] {
        &["cd", "exit", "ls", "mv", "tree"]
    }

    /// Parses one input line. Arguments are separated by whitespace.
    ///
    /// `mv` takes its arguments as-is; their count is checked when the move
    /// is planned so the error names the failed precondition.
    ///
    /// # Errors
    ///
    /// - [`CoreError::CommandNotFound`] for an unrecognised command name.
    /// - [`CoreError::Usage`] when `ls`, `tree`, `exit` or `cd` get too many
    ///   arguments.
    pub fn parse(line: &str) -> CoreResult<Self> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(Self::Empty);
        };
        let args: Vec<String> = words.map(str::to_string).collect();

        match name {
            "ls" => no_args(&args, "ls").map(|()| Self::Ls),
            "tree" => no_args(&args, "tree").map(|()| Self::Tree),
            "exit" => no_args(&args, "exit").map(|()| Self::Exit),
            "cd" => match args.as_slice() {
                [] => Ok(Self::Cd(None)),
                [path] => Ok(Self::Cd(Some(path.clone()))),
                _ => Err(CoreError::Usage("cd [path|..|-]".to_string())),
            },
            "mv" => Ok(Self::Mv(args)),
            other => Err(CoreError::CommandNotFound(other.to_string())),
        }
    }
}

fn no_args(args: &[String], name: &str) -> CoreResult<()> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Usage(name.to_string()))
    }
}
