//! Staged artifact writes.
//!
//! Contents are written to a hidden temporary file beside the target and
//! synced; the rename into place happens separately so several files can be
//! staged before any of them becomes visible. A staged file that is never
//! committed is removed when dropped.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};

use camino::{Utf8Component, Utf8Path};
use cap_std::fs::{Dir, OpenOptions};

static STAGE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A fully written temporary file awaiting its rename.
#[derive(Debug)]
pub(crate) struct StagedFile<'dir> {
    dir: &'dir Dir,
    temp_name: String,
    target_name: String,
    committed: bool,
}

impl<'dir> StagedFile<'dir> {
    /// Write `contents` to a temporary sibling of `target` inside `dir`.
    pub(crate) fn stage(dir: &'dir Dir, target: &Utf8Path, contents: &str) -> io::Result<Self> {
        let target_name = single_file_name(target)?;
        let temp_name = format!(
            ".{target_name}.staged.{}.{}",
            std::process::id(),
            STAGE_COUNTER.fetch_add(1, Ordering::Relaxed)
        );

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        let mut file = dir.open_with(&temp_name, &options)?;
        let staged = Self {
            dir,
            temp_name,
            target_name: target_name.to_owned(),
            committed: false,
        };
        // From here on a failure drops `staged`, which removes the temp file.
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
        Ok(staged)
    }

    /// Rename the temporary file over the target.
    pub(crate) fn commit(mut self) -> io::Result<()> {
        replace(self.dir, &self.temp_name, &self.target_name)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedFile<'_> {
    fn drop(&mut self) {
        if !self.committed && self.dir.remove_file(&self.temp_name).is_err() {
            // Nothing further to do if cleanup fails.
        }
    }
}

/// Best-effort fsync of the directory so completed renames survive a crash.
pub(crate) fn sync_dir(dir: &Dir) {
    if dir.open(".").and_then(|handle| handle.sync_all()).is_err() {
        // Some platforms cannot sync directories.
    }
}

fn single_file_name(path: &Utf8Path) -> io::Result<&str> {
    let mut components = path.components();
    match (components.next(), components.next()) {
        (Some(Utf8Component::Normal(name)), None) => Ok(name),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("'{path}' must be a bare file name"),
        )),
    }
}

#[cfg(windows)]
fn replace(dir: &Dir, from: &str, to: &str) -> io::Result<()> {
    // Windows refuses to rename over an existing file.
    match dir.remove_file(to) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.rename(from, dir, to)
}

#[cfg(not(windows))]
fn replace(dir: &Dir, from: &str, to: &str) -> io::Result<()> {
    dir.rename(from, dir, to)
}
