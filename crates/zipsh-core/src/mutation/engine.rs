//! Applies a validated move to the archive on disk.

use std::fs;
use std::path::Path;

use tempfile::{Builder, TempDir};

use crate::archive::handle::parse_entries;
use crate::archive::{Archive, ArchiveCodec};
use crate::error::{CoreError, CoreResult};
use crate::mutation::fs_ops::{entry_location, move_path};
use crate::mutation::plan::apply_move;
use crate::path::EntryPath;

/// Moves `source` to `target` inside `archive` and returns the reloaded
/// archive.
///
/// See [`rewrite_archive`] for how the file on disk is replaced. An error
/// from the final reload means the archive on disk already holds the move.
///
/// # Errors
///
/// Any error from [`rewrite_archive`] or [`Archive::reload`].
pub fn execute_move(
    archive: &Archive,
    source: &EntryPath,
    target: &EntryPath,
    codec: &impl ArchiveCodec,
    verify: bool,
) -> CoreResult<Archive> {
    rewrite_archive(archive, source, target, codec, verify)?;
    archive.reload(codec)
}

/// Rewrites the archive file with `source` moved to `target`.
///
/// The archive is unpacked into a scratch directory, the entry is moved
/// there, and the result is packed into a staging file next to the
/// original. Only a complete staging file replaces the original, via an
/// atomic rename; any earlier failure leaves the archive on disk as it
/// was. With `verify` set, the staged member list is checked against the
/// expected entry set before the swap. Once the swap succeeds this returns
/// `Ok`, even if the scratch directory cannot be removed.
///
/// The caller is expected to have validated the move with
/// [`crate::mutation::plan_move`].
///
/// # Errors
///
/// - [`CoreError::Io`] for failures in the scratch directory or the swap.
/// - [`CoreError::Codec`] if extraction or repacking fails.
/// - [`CoreError::Verification`] if the staged archive has the wrong entries.
pub fn rewrite_archive(
    archive: &Archive,
    source: &EntryPath,
    target: &EntryPath,
    codec: &impl ArchiveCodec,
    verify: bool,
) -> CoreResult<()> {
    let scratch = TempDir::new()?;
    codec.extract(archive.path(), scratch.path())?;

    let from = entry_location(scratch.path(), archive.root_name(), source);
    let to = entry_location(scratch.path(), archive.root_name(), target);
    move_path(&from, &to)?;
    tracing::debug!(from = %from.display(), to = %to.display(), "moved in scratch directory");

    let staging_dir = staging_dir(archive.path());
    let staged = Builder::new()
        .prefix(".zipsh-")
        .suffix(".zip")
        .tempfile_in(staging_dir)?
        .into_temp_path();
    codec.repack(scratch.path(), &staged)?;

    if verify {
        verify_staged(archive, source, target, codec, &staged)?;
    }

    let permissions = fs::metadata(archive.path())?.permissions();
    fs::set_permissions(&staged, permissions)?;
    staged.persist(archive.path()).map_err(|e| {
        tracing::error!(archive = %archive.path().display(), error = %e.error, "failed to replace archive");
        CoreError::Io(e.error)
    })?;
    tracing::info!(from = %source, to = %target, archive = %archive.path().display(), "moved entry");

    let scratch_path = scratch.path().to_path_buf();
    if let Err(e) = scratch.close() {
        tracing::warn!(dir = %scratch_path.display(), error = %e, "failed to remove scratch directory");
    }
    Ok(())
}

/// Checks that the staged archive holds exactly the entries the move should
/// produce, under the same root folder.
fn verify_staged(
    archive: &Archive,
    source: &EntryPath,
    target: &EntryPath,
    codec: &impl ArchiveCodec,
    staged: &Path,
) -> CoreResult<()> {
    let names = codec.list(staged)?;
    let (root_name, mut actual) = parse_entries(&names)?;
    if root_name != archive.root_name() {
        return Err(CoreError::Verification(format!(
            "root folder changed from {} to {root_name}",
            archive.root_name()
        )));
    }

    let mut expected = apply_move(archive.entries(), source, target);
    expected.sort();
    actual.sort();
    if expected != actual {
        let missing: Vec<&str> = expected
            .iter()
            .filter(|e| actual.binary_search(*e).is_err())
            .map(EntryPath::as_str)
            .collect();
        let extra: Vec<&str> = actual
            .iter()
            .filter(|e| expected.binary_search(*e).is_err())
            .map(EntryPath::as_str)
            .collect();
        tracing::error!(?missing, ?extra, "staged archive does not match the expected entries");
        return Err(CoreError::Verification(format!(
            "missing [{}], unexpected [{}]",
            missing.join(", "),
            extra.join(", ")
        )));
    }
    Ok(())
}

fn staging_dir(archive: &Path) -> &Path {
    archive
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::codec::write_fixture;
    use crate::archive::ZipCodec;
    use crate::mutation::plan::{plan_move, MovePlan};
    use crate::path::DirPath;

    fn entry(path: &str) -> EntryPath {
        EntryPath::parse(path).unwrap()
    }

    fn fixture(tmp: &TempDir) -> Archive {
        let path = write_fixture(
            &tmp.path().join("data.zip"),
            &[
                "proj/",
                "proj/a/",
                "proj/a/x.txt",
                "proj/a/sub/",
                "proj/a/sub/deep.txt",
                "proj/b/",
                "proj/keep.txt",
            ],
        );
        Archive::open(&path, &ZipCodec::default()).unwrap()
    }

    fn read_member(archive: &Path, name: &str) -> String {
        let tmp = TempDir::new().unwrap();
        ZipCodec::default().extract(archive, tmp.path()).unwrap();
        fs::read_to_string(tmp.path().join(name)).unwrap()
    }

    /// Delegates to [`ZipCodec`] but fails to repack.
    struct BrokenRepack;

    impl ArchiveCodec for BrokenRepack {
        fn list(&self, archive: &Path) -> CoreResult<Vec<String>> {
            ZipCodec::default().list(archive)
        }
        fn extract(&self, archive: &Path, dest: &Path) -> CoreResult<()> {
            ZipCodec::default().extract(archive, dest)
        }
        fn repack(&self, _src_dir: &Path, _dest: &Path) -> CoreResult<()> {
            Err(CoreError::Codec("disk full".into()))
        }
    }

    /// Delegates to [`ZipCodec`] but silently loses `keep.txt` on repack.
    struct LossyRepack;

    impl ArchiveCodec for LossyRepack {
        fn list(&self, archive: &Path) -> CoreResult<Vec<String>> {
            ZipCodec::default().list(archive)
        }
        fn extract(&self, archive: &Path, dest: &Path) -> CoreResult<()> {
            ZipCodec::default().extract(archive, dest)
        }
        fn repack(&self, src_dir: &Path, dest: &Path) -> CoreResult<()> {
            fs::remove_file(src_dir.join("proj/keep.txt"))?;
            ZipCodec::default().repack(src_dir, dest)
        }
    }

    fn dir_listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn moves_file_and_preserves_content() {
        let tmp = TempDir::new().unwrap();
        let archive = fixture(&tmp);

        let moved = execute_move(
            &archive,
            &entry("/a/x.txt"),
            &entry("/b/x.txt"),
            &ZipCodec::default(),
            true,
        )
        .unwrap();

        assert!(moved.entries().contains(&entry("/b/x.txt")));
        assert!(!moved.entries().contains(&entry("/a/x.txt")));
        assert_eq!(read_member(moved.path(), "proj/b/x.txt"), "proj/a/x.txt");
    }

    #[test]
    fn moves_directory_subtree() {
        let tmp = TempDir::new().unwrap();
        let archive = fixture(&tmp);

        let moved = execute_move(
            &archive,
            &entry("/a/"),
            &entry("/b/a/"),
            &ZipCodec::default(),
            true,
        )
        .unwrap();

        let tree = moved.tree();
        assert!(tree.contains_dir(&DirPath::new("/b/a/sub/")));
        assert!(tree.contains(&entry("/b/a/sub/deep.txt")));
        assert!(!tree.contains_dir(&DirPath::new("/a/")));
        assert_eq!(moved.root_name(), "proj");
    }

    #[test]
    fn planned_rename_round_trips() {
        let tmp = TempDir::new().unwrap();
        let archive = fixture(&tmp);
        let args = vec!["a/x.txt".to_string(), "b/y.txt".to_string()];

        let MovePlan::Move { source, target, .. } =
            plan_move(&args, &DirPath::root(), archive.tree()).unwrap()
        else {
            panic!("expected a move");
        };
        let moved = execute_move(&archive, &source, &target, &ZipCodec::default(), true).unwrap();

        let expected = apply_move(archive.entries(), &source, &target);
        let mut actual = moved.entries().to_vec();
        let mut expected_sorted = expected.clone();
        actual.sort();
        expected_sorted.sort();
        assert_eq!(actual, expected_sorted);
    }

    #[test]
    fn moves_member_stored_with_decomposed_name() {
        let tmp = TempDir::new().unwrap();
        let path = write_fixture(
            &tmp.path().join("data.zip"),
            &["proj/", "proj/b/", "proj/cafe\u{301}.txt"],
        );
        let archive = Archive::open(&path, &ZipCodec::default()).unwrap();
        assert!(archive.entries().contains(&entry("/caf\u{e9}.txt")));

        let moved = execute_move(
            &archive,
            &entry("/caf\u{e9}.txt"),
            &entry("/b/caf\u{e9}.txt"),
            &ZipCodec::default(),
            true,
        )
        .unwrap();

        assert!(moved.entries().contains(&entry("/b/caf\u{e9}.txt")));
        assert!(!moved.entries().contains(&entry("/caf\u{e9}.txt")));
        assert_eq!(
            read_member(moved.path(), "proj/b/caf\u{e9}.txt"),
            "proj/cafe\u{301}.txt"
        );
    }

    #[test]
    fn failed_repack_leaves_archive_untouched() {
        let tmp = TempDir::new().unwrap();
        let archive = fixture(&tmp);
        let before = fs::read(archive.path()).unwrap();

        let result = execute_move(
            &archive,
            &entry("/a/x.txt"),
            &entry("/b/x.txt"),
            &BrokenRepack,
            true,
        );

        assert!(matches!(result, Err(CoreError::Codec(_))));
        assert_eq!(fs::read(archive.path()).unwrap(), before);
        assert_eq!(dir_listing(tmp.path()), vec!["data.zip"]);
    }

    #[test]
    fn verification_catches_lost_entries() {
        let tmp = TempDir::new().unwrap();
        let archive = fixture(&tmp);
        let before = fs::read(archive.path()).unwrap();

        let result = execute_move(
            &archive,
            &entry("/a/x.txt"),
            &entry("/b/x.txt"),
            &LossyRepack,
            true,
        );

        match result {
            Err(CoreError::Verification(msg)) => assert!(msg.contains("/keep.txt")),
            other => panic!("expected verification failure, got {other:?}"),
        }
        assert_eq!(fs::read(archive.path()).unwrap(), before);
        assert_eq!(dir_listing(tmp.path()), vec!["data.zip"]);
    }

    #[test]
    fn skipping_verification_trusts_the_codec() {
        let tmp = TempDir::new().unwrap();
        let archive = fixture(&tmp);

        let moved = execute_move(
            &archive,
            &entry("/a/x.txt"),
            &entry("/b/x.txt"),
            &LossyRepack,
            false,
        )
        .unwrap();

        assert!(!moved.entries().contains(&entry("/keep.txt")));
    }
}
