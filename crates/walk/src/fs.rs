//! Narrow filesystem capability consumed by the walker.
//!
//! The walker never calls `std::fs` directly. Everything it needs (directory
//! streams, path resolution, stat) goes through [`FileSystem`], so tests can
//! substitute a scripted implementation that fails on demand.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::entry::{EntryKind, EntryStats};

/// Raw record produced by a directory stream.
///
/// `kind` comes from the stream itself and never follows symlinks. Custom
/// sort comparators receive these records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirRecord {
    /// File name within the parent directory.
    pub name: OsString,
    /// Kind reported by the directory stream.
    pub kind: EntryKind,
}

impl DirRecord {
    /// Creates a record.
    pub fn new(name: impl Into<OsString>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Filesystem operations the traversal engine depends on.
///
/// Errors are expected to carry POSIX-style codes where the platform has
/// them; the walker classifies them with [`classify`](crate::classify).
pub trait FileSystem {
    /// Open directory stream. Dropping it closes the underlying handle.
    type ReadDir: Iterator<Item = io::Result<DirRecord>>;

    /// Opens `path` for reading its entries.
    fn read_dir(&self, path: &Path) -> io::Result<Self::ReadDir>;

    /// Resolves `path` to its canonical, de-aliased form.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    /// Stats `path`, following a final symlink when `follow` is set.
    fn metadata(&self, path: &Path, follow: bool) -> io::Result<EntryStats>;
}

/// [`FileSystem`] backed by the host operating system.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalFs;

/// Directory stream returned by [`LocalFs`].
#[derive(Debug)]
pub struct LocalReadDir {
    inner: fs::ReadDir,
}

impl Iterator for LocalReadDir {
    type Item = io::Result<DirRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = match self.inner.next()? {
            Ok(entry) => entry,
            Err(error) => return Some(Err(error)),
        };
        Some(entry.file_type().map(|file_type| {
            DirRecord::new(entry.file_name(), EntryKind::from_file_type(file_type))
        }))
    }
}

impl FileSystem for LocalFs {
    type ReadDir = LocalReadDir;

    fn read_dir(&self, path: &Path) -> io::Result<Self::ReadDir> {
        fs::read_dir(path).map(|inner| LocalReadDir { inner })
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }

    fn metadata(&self, path: &Path, follow: bool) -> io::Result<EntryStats> {
        let metadata = if follow {
            fs::metadata(path)?
        } else {
            fs::symlink_metadata(path)?
        };
        Ok(EntryStats::from_metadata(&metadata))
    }
}
