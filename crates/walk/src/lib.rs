#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `walk` is the treewalk traversal engine. Given a root path and a
//! [`WalkConfig`], it lazily enumerates the files and directories below the
//! root in strict pre-order, depth-first sequence, applying a depth limit,
//! include/exclude filters, symlink following with cycle detection, sibling
//! sorting, optional stat collection, and cooperative cancellation.
//!
//! # Design
//!
//! - [`WalkOptions`] is a partial record; [`WalkOptions::sanitize`] and
//!   [`sanitize`] (for untyped JSON input) produce a total [`WalkConfig`],
//!   filling gaps from [`DEFAULTS`]. All validation happens there so the
//!   engine can assume well-formed input.
//! - [`Walker`] implements [`Iterator`] over an explicit stack of directory
//!   frames. Each frame owns its open directory stream; popping the frame,
//!   stopping on an error, or dropping the walker closes it.
//! - Filesystem access goes through the [`FileSystem`] trait. [`LocalFs`] is
//!   the host implementation.
//! - I/O failures are mapped onto [`WalkErrorKind`] by [`classify`];
//!   [`should_suppress`] decides whether a failure is skipped. Only
//!   permission failures are ever suppressed.
//!
//! # Invariants
//!
//! - A directory's own entry (when yielded) precedes its descendants, and a
//!   subtree completes before the parent's next sibling is read.
//! - Siblings are buffered only when a sort mode is set, and never more than
//!   one directory level at a time.
//! - While following symlinks, a directory identity is registered before its
//!   frame is opened and is never entered twice in one traversal.
//! - After the first unsuppressed error the walker yields nothing further.
//!
//! # Examples
//!
//! ```
//! use walk::{SortMode, WalkBuilder};
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let temp = tempfile::tempdir()?;
//! std::fs::write(temp.path().join("beta.txt"), b"b")?;
//! std::fs::write(temp.path().join("alpha.txt"), b"a")?;
//! std::fs::create_dir(temp.path().join("sub"))?;
//! std::fs::write(temp.path().join("sub/gamma.txt"), b"g")?;
//!
//! let walker = WalkBuilder::new(temp.path()).sort(SortMode::Ascending).build()?;
//! let mut seen = Vec::new();
//! for entry in walker {
//!     seen.push(entry?.relative_str());
//! }
//! assert_eq!(seen, ["alpha.txt", "beta.txt", "sub/gamma.txt"]);
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

mod builder;
mod cancel;
mod entry;
mod error;
pub mod fs;
mod options;
mod walker;

use std::path::PathBuf;

pub use builder::WalkBuilder;
pub use cancel::CancellationToken;
pub use entry::{EntryKind, EntryStats, WalkEntry};
pub use error::{WalkError, WalkErrorKind, classify, should_suppress};
pub use fs::{DirRecord, FileSystem, LocalFs};
pub use options::{
    Comparator, ConfigError, DEFAULTS, Defaults, MaxDepth, ProgressSink, SortMode, WalkConfig,
    WalkOptions, sanitize,
};
pub use walker::{WalkSummary, Walker};

/// Starts a traversal of `root` on the host filesystem.
///
/// Nothing is read until the returned walker is polled.
pub fn traverse(root: impl Into<PathBuf>, config: WalkConfig) -> Walker {
    traverse_with(LocalFs, root, config)
}

/// Starts a traversal of `root` on a caller-supplied filesystem.
pub fn traverse_with<F: FileSystem>(
    fs: F,
    root: impl Into<PathBuf>,
    config: WalkConfig,
) -> Walker<F> {
    Walker::new(fs, root.into(), config)
}
