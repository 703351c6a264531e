use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::vec;

use filters::FilterDecision;
use logging::{debug_log, info_log};

use crate::entry::{EntryKind, WalkEntry, slash_path};
use crate::error::{WalkError, WalkErrorKind, classify, should_suppress};
use crate::fs::{DirRecord, FileSystem, LocalFs};
use crate::options::{SortMode, WalkConfig};

/// Counters describing what a traversal did so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WalkSummary {
    /// Entries handed to the caller.
    pub entries_yielded: u64,
    /// Directory frames opened.
    pub directories_entered: u64,
    /// Frames skipped because they were beyond the depth limit.
    pub pruned_by_depth: u64,
    /// Directories skipped because their identity was already visited.
    pub cycles_skipped: u64,
    /// Permission failures skipped under the suppression policy.
    pub errors_suppressed: u64,
    /// Entries rejected by the include or exclude rule.
    pub filtered_out: u64,
}

/// Lazy, pre-order, depth-first iterator over a directory tree.
///
/// Each open directory is owned by one frame on an explicit stack; popping
/// the frame (or dropping the walker) closes the handle. A directory's own
/// entry is returned before its frame is opened, so a subtree is produced
/// completely before its parent resumes.
pub struct Walker<F: FileSystem = LocalFs> {
    fs: F,
    root: PathBuf,
    config: WalkConfig,
    stack: Vec<Frame<F::ReadDir>>,
    pending: Option<PendingDir>,
    visited: HashSet<PathBuf>,
    summary: WalkSummary,
    finished: bool,
}

struct PendingDir {
    path: PathBuf,
    relative: PathBuf,
    depth: usize,
}

struct Frame<R> {
    path: PathBuf,
    relative: PathBuf,
    depth: usize,
    records: Records<R>,
}

enum Records<R> {
    Streaming(R),
    Sorted(vec::IntoIter<DirRecord>),
}

impl<R: Iterator<Item = std::io::Result<DirRecord>>> Records<R> {
    fn next_record(&mut self) -> Option<std::io::Result<DirRecord>> {
        match self {
            Self::Streaming(stream) => stream.next(),
            Self::Sorted(records) => records.next().map(Ok),
        }
    }
}

enum Descent {
    Into(PathBuf),
    No,
}

impl<F: FileSystem> Walker<F> {
    pub(crate) fn new(fs: F, root: PathBuf, config: WalkConfig) -> Self {
        debug_log!(Walk, 1, "walking {}", root.display());
        let pending = PendingDir {
            path: root.clone(),
            relative: PathBuf::new(),
            depth: 0,
        };
        Self {
            fs,
            root,
            config,
            stack: Vec::new(),
            pending: Some(pending),
            visited: HashSet::new(),
            summary: WalkSummary::default(),
            finished: false,
        }
    }

    /// Returns the root this walker was created for.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the configuration driving this walker.
    #[must_use]
    pub const fn config(&self) -> &WalkConfig {
        &self.config
    }

    /// Returns the counters accumulated so far.
    #[must_use]
    pub const fn summary(&self) -> WalkSummary {
        self.summary
    }

    /// Number of directory handles currently held open.
    #[must_use]
    pub fn open_handles(&self) -> usize {
        self.stack.len()
    }

    fn cancelled(&self) -> bool {
        self.config.is_cancelled()
    }

    /// Stops the traversal, releasing every open handle.
    ///
    /// Cancellation ends quietly under the suppression policy; everything
    /// else is handed to the caller as the final item.
    fn finish_with(&mut self, error: WalkError) -> Option<Result<WalkEntry, WalkError>> {
        self.finished = true;
        self.pending = None;
        self.stack.clear();
        if error.kind() == WalkErrorKind::Aborted {
            debug_log!(Cancel, 1, "cancellation observed at {}", error.path().display());
            if self.config.suppress_errors {
                return None;
            }
        } else {
            debug_log!(Error, 1, "traversal stopped: {error}");
        }
        Some(Err(error))
    }

    /// Applies the suppression policy to a classified failure.
    fn tolerate(&mut self, error: WalkError) -> Result<(), WalkError> {
        if should_suppress(&error, self.config.suppress_errors) {
            self.summary.errors_suppressed += 1;
            debug_log!(Error, 1, "suppressed {error}");
            info_log!(Skip, 1, "skipping {}: {}", error.path().display(), error.kind());
            Ok(())
        } else {
            Err(error)
        }
    }

    /// Runs the frame prologue for a directory and pushes its frame.
    fn enter(&mut self, dir: PendingDir) -> Result<(), WalkError> {
        if self.cancelled() {
            return Err(WalkError::aborted(dir.path));
        }

        if !self.config.max_depth.allows(dir.depth) {
            if self.config.strict_depth {
                return Err(WalkError::max_depth_exceeded(dir.path));
            }
            self.summary.pruned_by_depth += 1;
            debug_log!(Walk, 2, "pruned {} at depth {}", dir.path.display(), dir.depth);
            return Ok(());
        }

        if self.config.follow_symlinks && !self.register_identity(&dir.path)? {
            return Ok(());
        }

        let stream = match self.fs.read_dir(&dir.path) {
            Ok(stream) => stream,
            Err(error) => return self.tolerate(classify(error, &dir.path)),
        };

        if self.cancelled() {
            drop(stream);
            return Err(WalkError::aborted(dir.path));
        }

        let records = if self.config.sort.buffers() {
            let mut records = Vec::new();
            for record in stream {
                match record {
                    Ok(record) => records.push(record),
                    Err(error) => return self.tolerate(classify(error, &dir.path)),
                }
            }
            sort_records(&mut records, &self.config.sort);
            Records::Sorted(records.into_iter())
        } else {
            Records::Streaming(stream)
        };

        self.summary.directories_entered += 1;
        debug_log!(Walk, 2, "entered {} at depth {}", dir.path.display(), dir.depth);
        self.stack.push(Frame {
            path: dir.path,
            relative: dir.relative,
            depth: dir.depth,
            records,
        });
        Ok(())
    }

    /// Records the canonical identity of `path`.
    ///
    /// Returns `Ok(false)` when the directory was already visited or its
    /// resolution failed under suppression. When resolution fails the literal
    /// path is registered first so the loop still terminates.
    fn register_identity(&mut self, path: &Path) -> Result<bool, WalkError> {
        match self.fs.canonicalize(path) {
            Ok(canonical) => {
                if self.visited.insert(canonical) {
                    Ok(true)
                } else {
                    self.summary.cycles_skipped += 1;
                    debug_log!(Dup, 1, "already visited {}", path.display());
                    Ok(false)
                }
            }
            Err(error) => {
                let fresh = self.visited.insert(path.to_path_buf());
                self.tolerate(classify(error, path))?;
                if !fresh {
                    self.summary.cycles_skipped += 1;
                }
                Ok(false)
            }
        }
    }

    /// Turns one directory record into an optional entry and a descent decision.
    fn visit(&mut self, record: DirRecord) -> Result<Option<WalkEntry>, WalkError> {
        let Some(frame) = self.stack.last() else {
            return Ok(None);
        };
        let path = frame.path.join(&record.name);
        let relative = frame.relative.join(&record.name);
        let frame_depth = frame.depth;
        let is_symlink = record.kind == EntryKind::Symlink;

        let (kind, descent) = match record.kind {
            EntryKind::Directory => (EntryKind::Directory, Descent::Into(path.clone())),
            EntryKind::Symlink if self.config.follow_symlinks => {
                match self.fs.metadata(&path, true) {
                    Ok(target) if target.kind.is_dir() => {
                        (EntryKind::Directory, Descent::Into(path.clone()))
                    }
                    Ok(target) => (target.kind, Descent::No),
                    Err(error) => {
                        let error = classify(error, &path);
                        if error.kind() == WalkErrorKind::NotFound {
                            debug_log!(Walk, 3, "dangling link {}", path.display());
                            (EntryKind::Symlink, Descent::No)
                        } else {
                            self.tolerate(error)?;
                            return Ok(None);
                        }
                    }
                }
            }
            other => (other, Descent::No),
        };

        let candidate = slash_path(&relative);
        let decision = self.config.filter.decide(&candidate);
        if decision != FilterDecision::Allowed {
            self.summary.filtered_out += 1;
            debug_log!(Filter, 2, "{candidate}: {decision:?}");
        }
        if decision.is_excluded() {
            return Ok(None);
        }

        if let Descent::Into(target) = descent {
            self.pending = Some(PendingDir {
                path: target,
                relative: relative.clone(),
                depth: frame_depth + 1,
            });
        }

        let wanted = decision.is_allowed()
            && (kind != EntryKind::Directory || self.config.yield_directories);
        if !wanted {
            return Ok(None);
        }

        let stats = if self.config.with_stats {
            // A link still reported as a symlink here is dangling; describe the link itself.
            let follow = self.config.follow_symlinks && kind != EntryKind::Symlink;
            match self.fs.metadata(&path, follow) {
                Ok(stats) => Some(stats),
                Err(error) => {
                    let error = classify(error, &path);
                    debug_log!(Stat, 1, "stat failed: {error}");
                    self.tolerate(error)?;
                    None
                }
            }
        } else {
            None
        };

        Ok(Some(WalkEntry {
            path,
            relative_path: relative,
            kind,
            is_symlink,
            depth: frame_depth + 1,
            stats,
        }))
    }

    fn deliver(&mut self, entry: WalkEntry) -> Option<Result<WalkEntry, WalkError>> {
        self.summary.entries_yielded += 1;
        if let Some(sink) = &self.config.on_progress {
            sink.notify(&entry);
        }
        Some(Ok(entry))
    }
}

impl<F: FileSystem> Iterator for Walker<F> {
    type Item = Result<WalkEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }

            if let Some(dir) = self.pending.take() {
                if let Err(error) = self.enter(dir) {
                    return self.finish_with(error);
                }
                continue;
            }

            if self.stack.is_empty() {
                self.finished = true;
                debug_log!(Walk, 1, "finished {}", self.root.display());
                return None;
            }

            if self.cancelled() {
                let path = self
                    .stack
                    .last()
                    .map_or_else(|| self.root.clone(), |frame| frame.path.clone());
                return self.finish_with(WalkError::aborted(path));
            }

            let Some(frame) = self.stack.last_mut() else {
                continue;
            };
            let record = match frame.records.next_record() {
                None => {
                    debug_log!(Walk, 3, "closed {}", frame.path.display());
                    self.stack.pop();
                    continue;
                }
                Some(Ok(record)) => record,
                Some(Err(error)) => {
                    let error = classify(error, &frame.path);
                    if let Err(error) = self.tolerate(error) {
                        return self.finish_with(error);
                    }
                    self.stack.pop();
                    continue;
                }
            };

            match self.visit(record) {
                Ok(Some(entry)) => return self.deliver(entry),
                Ok(None) => {}
                Err(error) => return self.finish_with(error),
            }
        }
    }
}

fn sort_records(records: &mut [DirRecord], mode: &SortMode) {
    match mode {
        SortMode::None => {}
        SortMode::Ascending => records.sort_by(|a, b| collate(a, b)),
        SortMode::Descending => records.sort_by(|a, b| collate(b, a)),
        SortMode::Custom(comparator) => records.sort_by(|a, b| comparator.compare(a, b)),
    }
}

/// Case-folded name order with a byte-wise tiebreak, so the result is total.
fn collate(left: &DirRecord, right: &DirRecord) -> Ordering {
    let left_name = left.name.to_string_lossy();
    let right_name = right.name.to_string_lossy();
    left_name
        .to_lowercase()
        .cmp(&right_name.to_lowercase())
        .then_with(|| left.name.cmp(&right.name))
}
