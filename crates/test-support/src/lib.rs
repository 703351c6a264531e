#![deny(unsafe_code)]
#![deny(missing_docs)]

//! Shared fixtures for treewalk tests.
//!
//! [`TestTree`] owns a temporary directory and offers terse helpers for
//! populating it with files, directories and symlinks using `/`-separated
//! relative paths. The directory is removed when the tree is dropped.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Temporary directory tree populated through relative paths.
#[derive(Debug)]
pub struct TestTree {
    dir: TempDir,
}

impl TestTree {
    /// Creates an empty tree.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    /// Creates a tree containing one file per relative path.
    ///
    /// Paths ending in `/` create directories instead.
    pub fn with_paths<I, S>(paths: I) -> io::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tree = Self::new()?;
        for path in paths {
            let path = path.as_ref();
            if let Some(dir) = path.strip_suffix('/') {
                tree.dir(dir)?;
            } else {
                tree.file(path, path.as_bytes())?;
            }
        }
        Ok(tree)
    }

    /// Returns the root of the tree.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Joins a relative path onto the root.
    #[must_use]
    pub fn join(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Writes a file, creating parent directories as needed.
    pub fn file(&self, relative: &str, contents: impl AsRef<[u8]>) -> io::Result<PathBuf> {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Creates a directory and its parents.
    pub fn dir(&self, relative: &str) -> io::Result<PathBuf> {
        let path = self.join(relative);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Creates a symlink at `relative` pointing to `target`, verbatim.
    #[cfg(unix)]
    pub fn symlink(&self, relative: &str, target: impl AsRef<Path>) -> io::Result<PathBuf> {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        std::os::unix::fs::symlink(target, &path)?;
        Ok(path)
    }

    /// Sets Unix permission bits on `relative`.
    #[cfg(unix)]
    pub fn chmod(&self, relative: &str, mode: u32) -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(self.join(relative), fs::Permissions::from_mode(mode))
    }
}

/// Reports whether permission bits are enforced for the current process.
///
/// Privileged users bypass directory permissions, so tests that rely on an
/// unreadable directory should skip themselves when this returns `false`.
#[cfg(unix)]
#[must_use]
pub fn permissions_enforced() -> bool {
    let Ok(probe) = TestTree::new() else {
        return false;
    };
    if probe.dir("locked").is_err() || probe.chmod("locked", 0o000).is_err() {
        return false;
    }
    let enforced = fs::read_dir(probe.join("locked")).is_err();
    let _ = probe.chmod("locked", 0o755);
    enforced
}
