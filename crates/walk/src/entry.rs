use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Coarse classification of a filesystem object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link that was not resolved.
    Symlink,
    /// Sockets, FIFOs, devices and anything else.
    Other,
}

impl EntryKind {
    /// Classifies a [`fs::FileType`].
    #[must_use]
    pub fn from_file_type(file_type: fs::FileType) -> Self {
        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }

    /// Returns `true` for [`EntryKind::Directory`].
    #[must_use]
    pub const fn is_dir(self) -> bool {
        matches!(self, Self::Directory)
    }
}

/// Metadata captured for an entry when stat augmentation is enabled.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EntryStats {
    /// Kind reported by the stat call.
    pub kind: EntryKind,
    /// Size in bytes.
    pub len: u64,
    /// Last modification time, when the platform reports it.
    pub modified: Option<SystemTime>,
    /// Last access time, when the platform reports it.
    pub accessed: Option<SystemTime>,
    /// Creation time, when the platform reports it.
    pub created: Option<SystemTime>,
    /// Whether the object is read-only.
    pub readonly: bool,
    /// Unix permission bits; `None` on other platforms.
    pub mode: Option<u32>,
}

impl EntryStats {
    /// Captures the fields of a [`fs::Metadata`].
    #[must_use]
    pub fn from_metadata(metadata: &fs::Metadata) -> Self {
        Self {
            kind: EntryKind::from_file_type(metadata.file_type()),
            len: metadata.len(),
            modified: metadata.modified().ok(),
            accessed: metadata.accessed().ok(),
            created: metadata.created().ok(),
            readonly: metadata.permissions().readonly(),
            mode: mode_bits(metadata),
        }
    }
}

#[cfg(unix)]
fn mode_bits(metadata: &fs::Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(metadata.permissions().mode())
}

#[cfg(not(unix))]
fn mode_bits(_metadata: &fs::Metadata) -> Option<u32> {
    None
}

/// One file or directory produced by a [`Walker`](crate::Walker).
///
/// Entries are owned by the caller once yielded and are never touched again
/// by the walker.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WalkEntry {
    pub(crate) path: PathBuf,
    pub(crate) relative_path: PathBuf,
    pub(crate) kind: EntryKind,
    pub(crate) is_symlink: bool,
    pub(crate) depth: usize,
    pub(crate) stats: Option<EntryStats>,
}

impl WalkEntry {
    /// Returns the path formed by joining the traversal root with the relative path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path relative to the traversal root.
    #[must_use]
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// Returns the kind of the entry.
    ///
    /// When symlinks are followed, a link to a directory reports
    /// [`EntryKind::Directory`] and [`is_symlink`](Self::is_symlink) stays
    /// `true`. Dangling links report [`EntryKind::Symlink`].
    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Reports whether the directory stream listed this entry as a symlink.
    #[must_use]
    pub const fn is_symlink(&self) -> bool {
        self.is_symlink
    }

    /// Returns `true` when the entry is (or resolves to) a directory.
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Number of components below the root; the root's children have depth `1`.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Metadata captured when stat augmentation was requested and succeeded.
    #[must_use]
    pub const fn stats(&self) -> Option<&EntryStats> {
        self.stats.as_ref()
    }

    /// Returns the final component of the relative path.
    #[must_use]
    pub fn file_name(&self) -> Option<&OsStr> {
        self.relative_path.file_name()
    }

    /// Returns the extension of the file name, if any.
    #[must_use]
    pub fn extension(&self) -> Option<&OsStr> {
        self.relative_path.extension()
    }

    /// Relative path rendered with `/` separators, as seen by filter rules.
    #[must_use]
    pub fn relative_str(&self) -> String {
        slash_path(&self.relative_path)
    }
}

pub(crate) fn slash_path(path: &Path) -> String {
    let mut rendered = String::new();
    for component in path.components() {
        if !rendered.is_empty() {
            rendered.push('/');
        }
        rendered.push_str(&component.as_os_str().to_string_lossy());
    }
    rendered
}
