use std::cmp::Ordering;
use std::path::PathBuf;

use filters::Rule;

use crate::cancel::CancellationToken;
use crate::entry::WalkEntry;
use crate::fs::{DirRecord, FileSystem, LocalFs};
use crate::options::{Comparator, ConfigError, MaxDepth, ProgressSink, SortMode, WalkOptions};
use crate::walker::Walker;

/// Configures a traversal rooted at a specific path.
///
/// Every setter records a value in an underlying [`WalkOptions`]; unset
/// options take their defaults when [`build`](Self::build) sanitizes them.
#[derive(Clone, Debug)]
pub struct WalkBuilder {
    root: PathBuf,
    options: WalkOptions,
}

impl WalkBuilder {
    /// Creates a new builder that will traverse the provided root path.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            options: WalkOptions::default(),
        }
    }

    /// Replaces every option with `options`, keeping the root.
    #[must_use]
    pub fn options(mut self, options: WalkOptions) -> Self {
        self.options = options;
        self
    }

    /// Limits recursion to frames at most `depth` levels below the root.
    #[must_use]
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.options.max_depth = Some(MaxDepth::Limited(depth));
        self
    }

    /// Removes any depth limit.
    #[must_use]
    pub const fn unbounded(mut self) -> Self {
        self.options.max_depth = Some(MaxDepth::Unbounded);
        self
    }

    /// Sets the rule a relative path must match to be yielded.
    #[must_use]
    pub fn include(mut self, rule: Rule) -> Self {
        self.options.include = Some(rule);
        self
    }

    /// Sets the rule that excludes (and prunes) a relative path.
    #[must_use]
    pub fn exclude(mut self, rule: Rule) -> Self {
        self.options.exclude = Some(rule);
        self
    }

    /// Controls whether directories appear in the output.
    #[must_use]
    pub const fn yield_directories(mut self, yield_directories: bool) -> Self {
        self.options.yield_directories = Some(yield_directories);
        self
    }

    /// Configures whether symlinks to directories are descended.
    ///
    /// Canonical directory identities are tracked while following so a link
    /// back to an ancestor is entered at most once.
    #[must_use]
    pub const fn follow_symlinks(mut self, follow: bool) -> Self {
        self.options.follow_symlinks = Some(follow);
        self
    }

    /// Controls whether permission failures are skipped silently.
    #[must_use]
    pub const fn suppress_errors(mut self, suppress: bool) -> Self {
        self.options.suppress_errors = Some(suppress);
        self
    }

    /// Reports recursion past the depth limit as an error.
    #[must_use]
    pub const fn strict_depth(mut self, strict: bool) -> Self {
        self.options.strict_depth = Some(strict);
        self
    }

    /// Attaches a cancellation token.
    #[must_use]
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.options.cancellation_token = Some(token);
        self
    }

    /// Sets the sibling ordering.
    #[must_use]
    pub fn sort(mut self, mode: SortMode) -> Self {
        self.options.sort = Some(mode);
        self
    }

    /// Orders siblings with a caller comparator.
    #[must_use]
    pub fn sort_by<C>(self, compare: C) -> Self
    where
        C: Fn(&DirRecord, &DirRecord) -> Ordering + Send + Sync + 'static,
    {
        self.sort(SortMode::Custom(Comparator::new(compare)))
    }

    /// Registers an observer called with each entry as it is yielded.
    #[must_use]
    pub fn on_progress<P>(mut self, callback: P) -> Self
    where
        P: Fn(&WalkEntry) + Send + Sync + 'static,
    {
        self.options.on_progress = Some(ProgressSink::new(callback));
        self
    }

    /// Requests metadata for every yielded entry.
    #[must_use]
    pub const fn with_stats(mut self, with_stats: bool) -> Self {
        self.options.with_stats = Some(with_stats);
        self
    }

    /// Builds a [`Walker`] over the host filesystem.
    pub fn build(self) -> Result<Walker, ConfigError> {
        self.build_with(LocalFs)
    }

    /// Builds a [`Walker`] over a caller-supplied filesystem.
    pub fn build_with<F: FileSystem>(self, fs: F) -> Result<Walker<F>, ConfigError> {
        let config = self.options.sanitize()?;
        Ok(Walker::new(fs, self.root, config))
    }
}
