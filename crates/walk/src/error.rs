use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Closed taxonomy of traversal failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WalkErrorKind {
    /// Access was refused (`EACCES`, `EPERM`).
    PermissionDenied,
    /// The path does not exist (`ENOENT`).
    NotFound,
    /// A path component is not a directory (`ENOTDIR`).
    InvalidPath,
    /// Too many levels of symbolic links (`ELOOP`).
    SymlinkLoop,
    /// Traversal was cancelled and the policy asked for it to be reported.
    Aborted,
    /// Recursion went past the depth limit under strict depth checking.
    MaxDepthExceeded,
    /// Any other failure; the OS code is kept on the error.
    Unknown,
}

impl WalkErrorKind {
    /// Returns a short, stable, lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission denied",
            Self::NotFound => "not found",
            Self::InvalidPath => "invalid path",
            Self::SymlinkLoop => "symlink loop",
            Self::Aborted => "aborted",
            Self::MaxDepthExceeded => "max depth exceeded",
            Self::Unknown => "unknown error",
        }
    }

    const fn io_kind(self) -> io::ErrorKind {
        match self {
            Self::PermissionDenied => io::ErrorKind::PermissionDenied,
            Self::NotFound => io::ErrorKind::NotFound,
            Self::InvalidPath => io::ErrorKind::NotADirectory,
            Self::Aborted => io::ErrorKind::Interrupted,
            Self::SymlinkLoop | Self::MaxDepthExceeded | Self::Unknown => io::ErrorKind::Other,
        }
    }
}

impl fmt::Display for WalkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified traversal failure naming the offending path.
#[derive(Debug, Error)]
#[error("{kind}: '{}'", .path.display())]
pub struct WalkError {
    kind: WalkErrorKind,
    path: PathBuf,
    #[source]
    source: Option<io::Error>,
}

impl WalkError {
    /// Creates an error without an underlying I/O cause.
    pub fn new(kind: WalkErrorKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
            source: None,
        }
    }

    /// Creates an error wrapping the I/O failure that caused it.
    pub fn with_source(kind: WalkErrorKind, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            kind,
            path: path.into(),
            source: Some(source),
        }
    }

    pub(crate) fn aborted(path: impl Into<PathBuf>) -> Self {
        Self::new(WalkErrorKind::Aborted, path)
    }

    pub(crate) fn max_depth_exceeded(path: impl Into<PathBuf>) -> Self {
        Self::new(WalkErrorKind::MaxDepthExceeded, path)
    }

    /// Returns the classification.
    #[must_use]
    pub const fn kind(&self) -> WalkErrorKind {
        self.kind
    }

    /// Returns the path the failure refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the underlying I/O error, if any.
    #[must_use]
    pub const fn io_error(&self) -> Option<&io::Error> {
        self.source.as_ref()
    }

    /// Returns the raw OS error code of the cause, if any.
    #[must_use]
    pub fn raw_os_error(&self) -> Option<i32> {
        self.source.as_ref().and_then(io::Error::raw_os_error)
    }

    /// Returns `true` for [`WalkErrorKind::PermissionDenied`].
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        self.kind == WalkErrorKind::PermissionDenied
    }
}

impl From<WalkError> for io::Error {
    fn from(error: WalkError) -> Self {
        Self::new(error.kind.io_kind(), error)
    }
}

/// Maps a raw I/O failure on `path` into the traversal taxonomy.
///
/// An [`io::Error`] that already wraps a [`WalkError`] is unwrapped and
/// returned unchanged, so classifying twice is a no-op.
pub fn classify(error: io::Error, path: impl Into<PathBuf>) -> WalkError {
    if error
        .get_ref()
        .is_some_and(|inner| inner.is::<WalkError>())
    {
        if let Some(Ok(classified)) = error
            .into_inner()
            .map(|inner| inner.downcast::<WalkError>())
        {
            return *classified;
        }
        return WalkError::new(WalkErrorKind::Unknown, path);
    }

    let kind = kind_of(&error);
    WalkError::with_source(kind, path, error)
}

fn kind_of(error: &io::Error) -> WalkErrorKind {
    #[cfg(unix)]
    if let Some(code) = error.raw_os_error() {
        match code {
            libc::EACCES | libc::EPERM => return WalkErrorKind::PermissionDenied,
            libc::ENOENT => return WalkErrorKind::NotFound,
            libc::ELOOP => return WalkErrorKind::SymlinkLoop,
            libc::ENOTDIR => return WalkErrorKind::InvalidPath,
            _ => return WalkErrorKind::Unknown,
        }
    }

    match error.kind() {
        io::ErrorKind::PermissionDenied => WalkErrorKind::PermissionDenied,
        io::ErrorKind::NotFound => WalkErrorKind::NotFound,
        io::ErrorKind::NotADirectory => WalkErrorKind::InvalidPath,
        _ => WalkErrorKind::Unknown,
    }
}

/// Decides whether `error` may be skipped silently.
///
/// Only permission failures are ever suppressed, and only when `suppress` is set.
#[must_use]
pub fn should_suppress(error: &WalkError, suppress: bool) -> bool {
    suppress && error.is_permission_denied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[cfg(unix)]
    #[test]
    fn errno_values_map_to_kinds() {
        let cases = [
            (libc::EACCES, WalkErrorKind::PermissionDenied),
            (libc::EPERM, WalkErrorKind::PermissionDenied),
            (libc::ENOENT, WalkErrorKind::NotFound),
            (libc::ELOOP, WalkErrorKind::SymlinkLoop),
            (libc::ENOTDIR, WalkErrorKind::InvalidPath),
            (libc::EIO, WalkErrorKind::Unknown),
        ];
        for (code, expected) in cases {
            let error = classify(io::Error::from_raw_os_error(code), "/x");
            assert_eq!(error.kind(), expected, "errno {code}");
            assert_eq!(error.raw_os_error(), Some(code));
        }
    }

    #[test]
    fn error_kinds_without_codes_are_classified() {
        let denied = classify(io::Error::from(io::ErrorKind::PermissionDenied), "a");
        assert!(denied.is_permission_denied());
        let missing = classify(io::Error::from(io::ErrorKind::NotFound), "a");
        assert_eq!(missing.kind(), WalkErrorKind::NotFound);
        let other = classify(io::Error::other("boom"), "a");
        assert_eq!(other.kind(), WalkErrorKind::Unknown);
        assert_eq!(other.raw_os_error(), None);
    }

    #[test]
    fn classification_is_idempotent() {
        let first = classify(io::Error::from(io::ErrorKind::PermissionDenied), "/locked");
        let round_tripped: io::Error = first.into();
        assert_eq!(round_tripped.kind(), io::ErrorKind::PermissionDenied);

        let second = classify(round_tripped, "/elsewhere");
        assert_eq!(second.kind(), WalkErrorKind::PermissionDenied);
        assert_eq!(second.path(), Path::new("/locked"));
    }

    #[test]
    fn display_names_kind_and_path() {
        let error = WalkError::new(WalkErrorKind::SymlinkLoop, "/a/b");
        assert_eq!(error.to_string(), "symlink loop: '/a/b'");
        assert!(error.source().is_none());

        let wrapped =
            WalkError::with_source(WalkErrorKind::Unknown, "/c", io::Error::other("disk"));
        assert_eq!(wrapped.source().map(ToString::to_string).as_deref(), Some("disk"));
    }

    #[test]
    fn only_permission_errors_are_suppressed() {
        let denied = WalkError::new(WalkErrorKind::PermissionDenied, "p");
        assert!(should_suppress(&denied, true));
        assert!(!should_suppress(&denied, false));

        for kind in [
            WalkErrorKind::NotFound,
            WalkErrorKind::InvalidPath,
            WalkErrorKind::SymlinkLoop,
            WalkErrorKind::Aborted,
            WalkErrorKind::MaxDepthExceeded,
            WalkErrorKind::Unknown,
        ] {
            assert!(!should_suppress(&WalkError::new(kind, "p"), true), "{kind}");
        }
    }
}
