//! Folds over the entry sequence.
//!
//! Nothing here touches the filesystem or the walker: every report consumes
//! yielded [`WalkEntry`] values only, so the same folds work on any entry
//! source, including a vector built in a test.

use std::collections::BTreeMap;
use std::io::{self, Write};

use serde::Serialize;
use serde_json::Value;
use walk::{EntryKind, WalkEntry};

/// Report selected with `--report`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ReportKind {
    /// One line per entry, streamed as the walk proceeds.
    #[default]
    List,
    /// Entries per kind.
    Count,
    /// Total bytes of yielded files.
    Size,
    /// Files per extension.
    Ext,
    /// Basenames shared by more than one file.
    Dupes,
}

impl ReportKind {
    /// Accepted `--report` values.
    pub const NAMES: [&'static str; 5] = ["list", "count", "size", "ext", "dupes"];

    /// Parses a `--report` value.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "list" => Some(Self::List),
            "count" => Some(Self::Count),
            "size" => Some(Self::Size),
            "ext" => Some(Self::Ext),
            "dupes" => Some(Self::Dupes),
            _ => None,
        }
    }

    /// Whether this report reads entry metadata.
    #[must_use]
    pub const fn needs_stats(self) -> bool {
        matches!(self, Self::Size)
    }
}

/// Entry totals per kind.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Counts {
    /// Regular files.
    pub files: u64,
    /// Directories (only present when directories are yielded).
    pub directories: u64,
    /// Symlinks that were not resolved to a directory.
    pub symlinks: u64,
    /// Sockets, devices and other special files.
    pub other: u64,
}

impl Counts {
    /// Sum over every kind.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.files + self.directories + self.symlinks + self.other
    }
}

/// Byte totals over yielded non-directory entries.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct SizeTotals {
    /// Sum of reported sizes.
    pub bytes: u64,
    /// Entries that contributed to `bytes`.
    pub measured: u64,
    /// Entries without metadata (stat failed under suppression, or not requested).
    pub unmeasured: u64,
}

/// Incremental state for one report.
#[derive(Clone, Debug)]
pub enum Fold {
    /// See [`ReportKind::Count`].
    Count(Counts),
    /// See [`ReportKind::Size`].
    Size(SizeTotals),
    /// See [`ReportKind::Ext`].
    Ext(BTreeMap<String, u64>),
    /// See [`ReportKind::Dupes`]; keyed by basename, values are relative paths.
    Dupes(BTreeMap<String, Vec<String>>),
}

impl Fold {
    /// Starts a fold for `kind`; [`ReportKind::List`] streams and has none.
    #[must_use]
    pub fn new(kind: ReportKind) -> Option<Self> {
        match kind {
            ReportKind::List => None,
            ReportKind::Count => Some(Self::Count(Counts::default())),
            ReportKind::Size => Some(Self::Size(SizeTotals::default())),
            ReportKind::Ext => Some(Self::Ext(BTreeMap::new())),
            ReportKind::Dupes => Some(Self::Dupes(BTreeMap::new())),
        }
    }

    /// Accounts for one entry.
    pub fn observe(&mut self, entry: &WalkEntry) {
        match self {
            Self::Count(counts) => match entry.kind() {
                EntryKind::File => counts.files += 1,
                EntryKind::Directory => counts.directories += 1,
                EntryKind::Symlink => counts.symlinks += 1,
                EntryKind::Other => counts.other += 1,
            },
            Self::Size(totals) => {
                if entry.is_dir() {
                    return;
                }
                match entry.stats() {
                    Some(stats) => {
                        totals.bytes += stats.len;
                        totals.measured += 1;
                    }
                    None => totals.unmeasured += 1,
                }
            }
            Self::Ext(groups) => {
                if entry.is_dir() {
                    return;
                }
                let key = entry
                    .extension()
                    .map(|ext| ext.to_string_lossy().to_lowercase())
                    .unwrap_or_default();
                *groups.entry(key).or_insert(0) += 1;
            }
            Self::Dupes(names) => {
                if entry.is_dir() {
                    return;
                }
                if let Some(name) = entry.file_name() {
                    names
                        .entry(name.to_string_lossy().into_owned())
                        .or_default()
                        .push(entry.relative_str());
                }
            }
        }
    }

    /// Drops bookkeeping that is not part of the final report.
    #[must_use]
    pub fn finish(self) -> Self {
        match self {
            Self::Dupes(mut names) => {
                names.retain(|_, paths| paths.len() > 1);
                Self::Dupes(names)
            }
            other => other,
        }
    }

    /// JSON form of the report.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let value = match self {
            Self::Count(counts) => serde_json::to_value(counts),
            Self::Size(totals) => serde_json::to_value(totals),
            Self::Ext(groups) => serde_json::to_value(groups),
            Self::Dupes(names) => serde_json::to_value(names),
        };
        value.unwrap_or(Value::Null)
    }

    /// Writes the report as plain text.
    pub fn write_text<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        match self {
            Self::Count(counts) => {
                writeln!(out, "files: {}", counts.files)?;
                writeln!(out, "directories: {}", counts.directories)?;
                writeln!(out, "symlinks: {}", counts.symlinks)?;
                writeln!(out, "other: {}", counts.other)?;
                writeln!(out, "total: {}", counts.total())
            }
            Self::Size(totals) => {
                writeln!(out, "{} bytes in {} files", totals.bytes, totals.measured)?;
                if totals.unmeasured > 0 {
                    writeln!(out, "{} entries without metadata", totals.unmeasured)?;
                }
                Ok(())
            }
            Self::Ext(groups) => {
                let mut rows: Vec<(&String, &u64)> = groups.iter().collect();
                rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
                for (ext, count) in rows {
                    let label = if ext.is_empty() { "(none)" } else { ext.as_str() };
                    writeln!(out, "{count}\t{label}")?;
                }
                Ok(())
            }
            Self::Dupes(names) => {
                for (name, paths) in names {
                    writeln!(out, "{name}")?;
                    for path in paths {
                        writeln!(out, "  {path}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

fn fold<'a, I>(kind: ReportKind, entries: I) -> Fold
where
    I: IntoIterator<Item = &'a WalkEntry>,
{
    let mut state = Fold::new(kind).unwrap_or(Fold::Count(Counts::default()));
    for entry in entries {
        state.observe(entry);
    }
    state.finish()
}

/// Counts entries per kind.
pub fn count<'a, I>(entries: I) -> Counts
where
    I: IntoIterator<Item = &'a WalkEntry>,
{
    match fold(ReportKind::Count, entries) {
        Fold::Count(counts) => counts,
        _ => Counts::default(),
    }
}

/// Sums the sizes of non-directory entries that carry metadata.
pub fn total_size<'a, I>(entries: I) -> SizeTotals
where
    I: IntoIterator<Item = &'a WalkEntry>,
{
    match fold(ReportKind::Size, entries) {
        Fold::Size(totals) => totals,
        _ => SizeTotals::default(),
    }
}

/// Counts non-directory entries per lower-cased extension; `""` means none.
pub fn group_by_extension<'a, I>(entries: I) -> BTreeMap<String, u64>
where
    I: IntoIterator<Item = &'a WalkEntry>,
{
    match fold(ReportKind::Ext, entries) {
        Fold::Ext(groups) => groups,
        _ => BTreeMap::new(),
    }
}

/// Basenames shared by two or more non-directory entries, with their paths.
pub fn duplicate_names<'a, I>(entries: I) -> BTreeMap<String, Vec<String>>
where
    I: IntoIterator<Item = &'a WalkEntry>,
{
    match fold(ReportKind::Dupes, entries) {
        Fold::Dupes(names) => names,
        _ => BTreeMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_support::TestTree;
    use walk::{SortMode, WalkBuilder};

    fn entries(tree: &TestTree, with_dirs: bool) -> Vec<WalkEntry> {
        WalkBuilder::new(tree.path())
            .sort(SortMode::Ascending)
            .yield_directories(with_dirs)
            .with_stats(true)
            .build()
            .expect("walker")
            .map(|entry| entry.expect("entry"))
            .collect()
    }

    #[test]
    fn report_names_round_trip() {
        for name in ReportKind::NAMES {
            assert!(ReportKind::parse(name).is_some(), "{name}");
        }
        assert_eq!(ReportKind::parse("tree"), None);
        assert!(ReportKind::Size.needs_stats());
        assert!(!ReportKind::Count.needs_stats());
    }

    #[test]
    fn counts_split_by_kind() {
        let tree = TestTree::with_paths(["a.txt", "b/c.txt", "b/d/"]).expect("tree");
        let counts = count(&entries(&tree, true));
        assert_eq!(counts.files, 2);
        assert_eq!(counts.directories, 2);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn size_sums_file_lengths() {
        let tree = TestTree::new().expect("tree");
        tree.file("one", b"1").expect("file");
        tree.file("sub/three", b"333").expect("file");
        let totals = total_size(&entries(&tree, true));
        assert_eq!(totals.bytes, 4);
        assert_eq!(totals.measured, 2);
        assert_eq!(totals.unmeasured, 0);
    }

    #[test]
    fn extensions_fold_case() {
        let tree = TestTree::with_paths(["a.RS", "b.rs", "c.toml", "Makefile"]).expect("tree");
        let groups = group_by_extension(&entries(&tree, false));
        assert_eq!(groups.get("rs"), Some(&2));
        assert_eq!(groups.get("toml"), Some(&1));
        assert_eq!(groups.get(""), Some(&1));
    }

    #[test]
    fn duplicates_need_two_files() {
        let tree = TestTree::with_paths(["mod.rs", "a/mod.rs", "b/lib.rs", "b/mod.rs"])
            .expect("tree");
        let dupes = duplicate_names(&entries(&tree, true));
        assert_eq!(dupes.len(), 1);
        assert_eq!(dupes["mod.rs"], ["a/mod.rs", "b/mod.rs", "mod.rs"]);
    }

    #[test]
    fn text_rendering_lists_counts() {
        let tree = TestTree::with_paths(["x.md", "y.md"]).expect("tree");
        let mut fold = Fold::new(ReportKind::Ext).expect("fold");
        for entry in &entries(&tree, false) {
            fold.observe(entry);
        }
        let mut out = Vec::new();
        fold.finish().write_text(&mut out).expect("write");
        assert_eq!(String::from_utf8(out).expect("utf8"), "2\tmd\n");
    }

    #[test]
    fn list_has_no_fold() {
        assert!(Fold::new(ReportKind::List).is_none());
    }
}
