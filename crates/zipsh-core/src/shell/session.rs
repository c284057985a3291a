//! Shell state and command dispatch.

use std::path::Path;

use crate::archive::{Archive, ArchiveCodec};
use crate::config::ArchiveConfig;
use crate::error::CoreResult;
use crate::mutation::{plan_move, rewrite_archive, MovePlan};
use crate::nav::{list_directory, Navigation};
use crate::path::{DirPath, EntryPath};
use crate::shell::command::Command;
use crate::tree::render_tree;

/// What a command produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    /// Lines to print, without trailing newlines.
    pub output: Vec<String>,
    /// The shell should stop after printing the output.
    pub exit: bool,
}

impl CommandResult {
    pub fn lines(output: Vec<String>) -> Self {
        Self {
            output,
            exit: false,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn exit() -> Self {
        Self {
            output: Vec::new(),
            exit: true,
        }
    }
}

/// Everything one shell instance works on: the open archive, the
/// navigation state and the codec used to rewrite the archive.
///
/// A failed command leaves the session exactly as it was, with one
/// exception: when `mv` has already replaced the archive on disk but the
/// reload fails, the session keeps the old view and retries the reload
/// before the next command.
pub struct Session<C: ArchiveCodec> {
    archive: Archive,
    nav: Navigation,
    codec: C,
    verify: bool,
    pending_reload: Option<PendingReload>,
}

/// A rewrite that landed on disk but is not yet reflected in memory.
#[derive(Debug, Clone)]
struct PendingReload {
    /// Directory move to carry navigation along, if any.
    moved_dir: Option<(DirPath, DirPath)>,
}

impl<C: ArchiveCodec> Session<C> {
    /// Opens `path` and starts at the archive root.
    ///
    /// # Errors
    ///
    /// Any error from [`Archive::open`].
    pub fn open(path: &Path, codec: C, config: &ArchiveConfig) -> CoreResult<Self> {
        let archive = Archive::open(path, &codec)?;
        tracing::info!(
            archive = %path.display(),
            root = archive.root_name(),
            entries = archive.entries().len(),
            "session started"
        );
        Ok(Self {
            archive,
            nav: Navigation::new(),
            codec,
            verify: config.verify,
            pending_reload: None,
        })
    }

    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    pub fn navigation(&self) -> &Navigation {
        &self.nav
    }

    pub fn current_dir(&self) -> &DirPath {
        self.nav.current_dir()
    }

    /// Parses and runs one input line.
    ///
    /// # Errors
    ///
    /// Parse errors from [`Command::parse`] and any error from
    /// [`Session::execute`].
    pub fn run_line(&mut self, line: &str) -> CoreResult<CommandResult> {
        let command = Command::parse(line)?;
        self.execute(&command)
    }

    /// Runs a parsed command.
    ///
    /// # Errors
    ///
    /// - [`crate::CoreError::NoSuchDirectory`] from `cd`.
    /// - [`crate::CoreError::Move`] when an `mv` precondition fails.
    /// - Codec, I/O and verification errors while rewriting the archive.
    /// - Load errors while catching up with an earlier `mv`.
    pub fn execute(&mut self, command: &Command) -> CoreResult<CommandResult> {
        tracing::debug!(?command, cwd = %self.nav.current_dir(), "execute");
        if !matches!(command, Command::Exit | Command::Empty) {
            if let Some(pending) = self.pending_reload.take() {
                tracing::info!("retrying archive reload");
                self.reload(pending)?;
            }
        }
        match command {
            Command::Ls => Ok(self.ls()),
            Command::Cd(arg) => self.cd(arg.as_deref()),
            Command::Tree => self.tree(),
            Command::Mv(args) => self.mv(args),
            Command::Exit => Ok(CommandResult::exit()),
            Command::Empty => Ok(CommandResult::empty()),
        }
    }

    fn ls(&self) -> CommandResult {
        CommandResult::lines(list_directory(self.archive.tree(), self.nav.current_dir()))
    }

    fn cd(&mut self, arg: Option<&str>) -> CoreResult<CommandResult> {
        self.nav = self.nav.cd(arg, self.archive.tree())?;
        Ok(CommandResult::empty())
    }

    fn tree(&self) -> CoreResult<CommandResult> {
        let report = render_tree(self.archive.tree(), self.nav.current_dir())?;
        Ok(CommandResult::lines(report.to_lines()))
    }

    fn mv(&mut self, args: &[String]) -> CoreResult<CommandResult> {
        let (source, target) = match plan_move(args, self.nav.current_dir(), self.archive.tree())? {
            MovePlan::Noop => {
                tracing::debug!(?args, "mv to the same path, nothing to do");
                return Ok(CommandResult::empty());
            }
            MovePlan::Move {
                source,
                target,
                replaces,
            } => {
                if replaces {
                    tracing::debug!(file = %target, "overwriting existing file");
                }
                (source, target)
            }
        };

        rewrite_archive(&self.archive, &source, &target, &self.codec, self.verify)?;
        let moved_dir = match (source, target) {
            (EntryPath::Dir(from), EntryPath::Dir(to)) => Some((from, to)),
            _ => None,
        };
        self.reload(PendingReload { moved_dir })?;
        Ok(CommandResult::empty())
    }

    /// Loads the archive from disk and moves navigation onto the new tree.
    /// On failure the reload stays pending.
    fn reload(&mut self, pending: PendingReload) -> CoreResult<()> {
        match self.archive.reload(&self.codec) {
            Ok(archive) => {
                let moved = pending.moved_dir.as_ref().map(|(from, to)| (from, to));
                self.nav = self.nav.reconcile(moved, archive.tree());
                self.archive = archive;
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    archive = %self.archive.path().display(),
                    error = %e,
                    "archive changed on disk but could not be reloaded"
                );
                self.pending_reload = Some(pending);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::codec::write_fixture;
    use crate::archive::ZipCodec;
    use crate::error::CoreError;
    use crate::mutation::MoveError;
    use std::cell::Cell;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn session(tmp: &TempDir, entries: &[&str]) -> Session<ZipCodec> {
        let path = write_fixture(&tmp.path().join("data.zip"), entries);
        Session::open(&path, ZipCodec::default(), &ArchiveConfig::default()).unwrap()
    }

    fn run(session: &mut Session<ZipCodec>, line: &str) -> Vec<String> {
        session.run_line(line).unwrap().output
    }

    #[test]
    fn walkthrough_ls_cd_mv() {
        let tmp = TempDir::new().unwrap();
        let mut sh = session(&tmp, &["proj/", "proj/a/", "proj/a/x.txt", "proj/b/"]);

        assert_eq!(run(&mut sh, "ls"), vec!["a/", "b/"]);
        run(&mut sh, "cd a");
        assert_eq!(run(&mut sh, "ls"), vec!["x.txt"]);
        run(&mut sh, "cd ..");
        assert!(sh.current_dir().is_root());

        run(&mut sh, "mv a/x.txt b/x.txt");
        run(&mut sh, "cd b");
        assert_eq!(run(&mut sh, "ls"), vec!["x.txt"]);
        run(&mut sh, "cd ..");
        run(&mut sh, "cd a");
        assert!(run(&mut sh, "ls").is_empty());
    }

    #[test]
    fn tree_renders_from_current_directory() {
        let tmp = TempDir::new().unwrap();
        let mut sh = session(&tmp, &["proj/", "proj/a/", "proj/a/x.txt", "proj/b/"]);

        assert_eq!(
            run(&mut sh, "tree"),
            vec!["/", "├── a/", "│   └── x.txt", "└── b/", "", "2 directories, 1 file"]
        );
        run(&mut sh, "cd a");
        assert_eq!(
            run(&mut sh, "tree"),
            vec!["/a/", "└── x.txt", "", "0 directories, 1 file"]
        );
    }

    #[test]
    fn exit_and_blank_lines() {
        let tmp = TempDir::new().unwrap();
        let mut sh = session(&tmp, &["proj/", "proj/a/"]);

        assert_eq!(sh.run_line("").unwrap(), CommandResult::empty());
        assert!(sh.run_line("exit").unwrap().exit);
    }

    #[test]
    fn failed_cd_keeps_state() {
        let tmp = TempDir::new().unwrap();
        let mut sh = session(&tmp, &["proj/", "proj/a/"]);
        run(&mut sh, "cd a");

        let result = sh.run_line("cd nope");

        assert!(matches!(result, Err(CoreError::NoSuchDirectory(_))));
        assert_eq!(sh.current_dir().as_str(), "/a/");
    }

    #[test]
    fn unknown_command_keeps_state() {
        let tmp = TempDir::new().unwrap();
        let mut sh = session(&tmp, &["proj/", "proj/a/"]);

        let result = sh.run_line("rm a");
        assert!(matches!(result, Err(CoreError::CommandNotFound(_))));
        assert!(sh.current_dir().is_root());
    }

    #[test]
    fn rejected_mv_leaves_archive_untouched() {
        let tmp = TempDir::new().unwrap();
        let mut sh = session(&tmp, &["proj/", "proj/a/", "proj/a/sub/", "proj/f.txt"]);
        let before = std::fs::read(sh.archive().path()).unwrap();

        for (line, expected) in [
            ("mv / a", MoveError::RootSource),
            ("mv nope a", MoveError::SourceNotFound("nope".into())),
            ("mv f.txt nowhere/", MoveError::DestinationNotFound("nowhere/".into())),
            ("mv a", MoveError::ArgumentCount(1)),
            ("mv f.txt ../a", MoveError::ParentReference("../a".into())),
        ] {
            match sh.run_line(line) {
                Err(CoreError::Move(err)) => assert_eq!(err, expected, "{line}"),
                other => panic!("{line}: expected move error, got {other:?}"),
            }
        }
        assert!(matches!(
            sh.run_line("mv a f.txt"),
            Err(CoreError::Move(MoveError::DirectoryOntoFile { .. }))
        ));
        assert!(matches!(
            sh.run_line("mv a a/sub"),
            Err(CoreError::Move(MoveError::IntoOwnSubtree { .. }))
        ));

        assert_eq!(std::fs::read(sh.archive().path()).unwrap(), before);
    }

    #[test]
    fn mv_to_same_path_is_silent_noop() {
        let tmp = TempDir::new().unwrap();
        let mut sh = session(&tmp, &["proj/", "proj/a/", "proj/a/x.txt"]);
        let before = std::fs::read(sh.archive().path()).unwrap();

        assert!(run(&mut sh, "mv a/x.txt /a/x.txt").is_empty());
        assert_eq!(std::fs::read(sh.archive().path()).unwrap(), before);
    }

    #[test]
    fn mv_directory_carries_current_directory_along() {
        let tmp = TempDir::new().unwrap();
        let mut sh = session(
            &tmp,
            &["proj/", "proj/a/", "proj/a/inner/", "proj/a/inner/f.txt", "proj/b/"],
        );
        run(&mut sh, "cd a");
        run(&mut sh, "cd inner");

        run(&mut sh, "mv /a /b");

        assert_eq!(sh.current_dir().as_str(), "/b/a/inner/");
        assert_eq!(sh.navigation().previous_dir().as_str(), "/b/a/");
        assert_eq!(run(&mut sh, "ls"), vec!["f.txt"]);
    }

    /// Delegates to [`ZipCodec`]; `list` fails while `failures` is non-zero.
    struct FlakyList {
        failures: Rc<Cell<u32>>,
    }

    impl ArchiveCodec for FlakyList {
        fn list(&self, archive: &Path) -> CoreResult<Vec<String>> {
            let left = self.failures.get();
            if left > 0 {
                self.failures.set(left - 1);
                return Err(CoreError::Codec("archive busy".into()));
            }
            ZipCodec::default().list(archive)
        }
        fn extract(&self, archive: &Path, dest: &Path) -> CoreResult<()> {
            ZipCodec::default().extract(archive, dest)
        }
        fn repack(&self, src_dir: &Path, dest: &Path) -> CoreResult<()> {
            ZipCodec::default().repack(src_dir, dest)
        }
    }

    #[test]
    fn failed_reload_after_mv_is_retried() {
        let tmp = TempDir::new().unwrap();
        let path = write_fixture(
            &tmp.path().join("data.zip"),
            &["proj/", "proj/a/", "proj/a/inner/", "proj/a/inner/f.txt", "proj/b/"],
        );
        let failures = Rc::new(Cell::new(0));
        let config = ArchiveConfig {
            verify: false,
            ..ArchiveConfig::default()
        };
        let codec = FlakyList {
            failures: Rc::clone(&failures),
        };
        let mut sh = Session::open(&path, codec, &config).unwrap();
        sh.run_line("cd a/inner").unwrap();

        failures.set(1);
        let result = sh.run_line("mv /a /b");

        assert!(matches!(result, Err(CoreError::Codec(_))));
        let on_disk = ZipCodec::default().list(&path).unwrap();
        assert!(on_disk.contains(&"proj/b/a/inner/f.txt".to_string()));

        assert_eq!(sh.run_line("ls").unwrap().output, vec!["f.txt"]);
        assert_eq!(sh.current_dir().as_str(), "/b/a/inner/");
        assert!(!sh.archive().tree().contains_dir(&DirPath::new("/a/")));
    }

    #[test]
    fn mv_reloads_tree_without_stale_entries() {
        let tmp = TempDir::new().unwrap();
        let mut sh = session(&tmp, &["proj/", "proj/a/", "proj/a/x.txt", "proj/b/"]);

        run(&mut sh, "mv a b");

        let tree = sh.archive().tree();
        assert!(tree.contains_dir(&DirPath::new("/b/a/")));
        assert!(!tree.contains_dir(&DirPath::new("/a/")));
        assert_eq!(run(&mut sh, "ls"), vec!["b/"]);
    }
}
