use std::{
    collections::BTreeSet,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tempfile::TempDir;
use tracing::debug;

use crate::result::{Error, Result};

/// Ephemeral directory receiving the downloads of one job.
///
/// The directory and everything inside it is removed by [`ScratchArea::close`],
/// or when the handle is dropped if the job stopped early.
#[derive(Debug)]
pub struct ScratchArea {
    dir: TempDir,
}

impl ScratchArea {
    pub fn create() -> Result<Self> {
        Self::create_in(std::env::temp_dir())
    }

    pub fn create_in<P: AsRef<Path>>(parent: P) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("yoink-")
            .tempdir_in(parent)
            .map_err(|err| {
                Error::from(err)
                    .wrap_err_with(|| "Could not create the scratch directory")
                    .into_resource()
            })?;

        debug!("Scratch directory created at {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// List the paths currently inside the scratch directory
    pub fn entries(&self) -> Result<BTreeSet<PathBuf>> {
        list_dir(self.path()).map_err(|err| {
            err.wrap_err_with(|| "Could not list the scratch directory")
                .into_resource()
        })
    }

    /// Remove the unfinished downloads that are not part of `before`.
    /// Completed files are kept.
    pub fn discard_partial_entries(&self, before: &BTreeSet<PathBuf>) -> Result<usize> {
        let mut removed = 0;
        for path in self.entries()?.difference(before) {
            if !is_partial(path) {
                continue;
            }

            debug!("Discarding unfinished {}", path.display());
            let res = if path.is_dir() {
                std::fs::remove_dir_all(path)
            } else {
                std::fs::remove_file(path)
            };
            res.map_err(|err| {
                Error::from(err)
                    .wrap_err_with(|| format!("Could not remove {}", path.display()))
                    .into_resource()
            })?;
            removed += 1;
        }
        Ok(removed)
    }

    /// Delete the scratch directory and its content, reporting failures
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close().map_err(|err| {
            Error::from(err)
                .wrap_err_with(|| format!("Could not remove {}", path.display()))
                .into_resource()
        })?;

        debug!("Scratch directory {} removed", path.display());
        Ok(())
    }
}

/// Whether the downloader left `path` unfinished: fragment directories,
/// `.part`, `.ytdl` and `.temp` files or `.part-FragN` fragments
fn is_partial(path: &Path) -> bool {
    if path.is_dir() {
        return true;
    }

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    PARTIAL_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) || name.contains(".part-Frag")
}

const PARTIAL_SUFFIXES: [&str; 3] = [".part", ".ytdl", ".temp"];

fn list_dir(dir: &Path) -> Result<BTreeSet<PathBuf>> {
    let mut paths = BTreeSet::new();
    for entry in dir.read_dir()? {
        paths.insert(entry?.path());
    }
    Ok(paths)
}

/// Delete the file at `path` if there is one
pub fn remove_existing(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(Error::from(err)
            .wrap_err_with(|| format!("Could not remove existing {}", path.display()))),
    }
}

/// Move a file, copying it when a simple rename is not possible
/// (e.g. across filesystems)
pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    if std::fs::rename(from, to).is_err() {
        debug!("Moving file failed, falling back to copying");
        std::fs::copy(from, to)?;
        std::fs::remove_file(from)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_area_is_removed_on_close() {
        let parent = tempfile::tempdir().unwrap();
        let scratch = ScratchArea::create_in(parent.path()).unwrap();
        let path = scratch.path().to_path_buf();
        std::fs::create_dir(path.join("nested")).unwrap();
        std::fs::write(path.join("nested").join("a.part"), b"x").unwrap();

        assert!(path.is_dir());
        scratch.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn scratch_area_is_removed_on_drop() {
        let scratch = ScratchArea::create().unwrap();
        let path = scratch.path().to_path_buf();
        std::fs::write(path.join("a.webm"), b"x").unwrap();

        drop(scratch);
        assert!(!path.exists());
    }

    #[test]
    fn discards_only_new_unfinished_entries() {
        let scratch = ScratchArea::create().unwrap();
        std::fs::write(scratch.path().join("old.mp4.part"), b"x").unwrap();
        let before = scratch.entries().unwrap();

        for name in ["done.mp4", "new.mp4.part", "new.mp4.ytdl", "new.f137.mp4.part-Frag3"] {
            std::fs::write(scratch.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(scratch.path().join("fragments")).unwrap();

        assert_eq!(scratch.discard_partial_entries(&before).unwrap(), 4);

        let names: Vec<_> = scratch
            .entries()
            .unwrap()
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["done.mp4", "old.mp4.part"]);
    }

    #[test]
    fn remove_existing_tolerates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.mp3");

        assert!(!remove_existing(&path).unwrap());
        std::fs::write(&path, b"x").unwrap();
        assert!(remove_existing(&path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn move_file_keeps_the_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("A.mp4");
        let to = dir.path().join("out").join("A.mp4");
        std::fs::create_dir(dir.path().join("out")).unwrap();
        std::fs::write(&from, b"video bytes").unwrap();

        move_file(&from, &to).unwrap();
        assert!(!from.exists());
        assert_eq!(std::fs::read(&to).unwrap(), b"video bytes");
    }
}
