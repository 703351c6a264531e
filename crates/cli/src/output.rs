use std::io::{self, Write};

use serde_json::json;
use walk::{WalkEntry, WalkSummary};

use crate::report::Fold;

/// Renders entries, reports and counters as text or JSON lines.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Output {
    json: bool,
}

impl Output {
    pub(crate) const fn new(json: bool) -> Self {
        Self { json }
    }

    /// One line per entry. Directories carry a trailing `/` in text mode and
    /// the size column appears when metadata was collected.
    pub(crate) fn entry<W: Write + ?Sized>(self, out: &mut W, entry: &WalkEntry) -> io::Result<()> {
        if self.json {
            serde_json::to_writer(&mut *out, entry)?;
            return writeln!(out);
        }
        let suffix = if entry.is_dir() { "/" } else { "" };
        match entry.stats() {
            Some(stats) => writeln!(out, "{}\t{}{suffix}", stats.len, entry.relative_str()),
            None => writeln!(out, "{}{suffix}", entry.relative_str()),
        }
    }

    pub(crate) fn report<W: Write + ?Sized>(self, out: &mut W, fold: &Fold) -> io::Result<()> {
        if self.json {
            serde_json::to_writer(&mut *out, &fold.to_json())?;
            return writeln!(out);
        }
        fold.write_text(out)
    }

    pub(crate) fn summary<W: Write + ?Sized>(
        self,
        out: &mut W,
        summary: &WalkSummary,
    ) -> io::Result<()> {
        if self.json {
            serde_json::to_writer(&mut *out, &json!({ "summary": summary }))?;
            return writeln!(out);
        }
        writeln!(out, "entries yielded: {}", summary.entries_yielded)?;
        writeln!(out, "directories entered: {}", summary.directories_entered)?;
        writeln!(out, "pruned by depth: {}", summary.pruned_by_depth)?;
        writeln!(out, "cycles skipped: {}", summary.cycles_skipped)?;
        writeln!(out, "errors suppressed: {}", summary.errors_suppressed)?;
        writeln!(out, "filtered out: {}", summary.filtered_out)
    }
}
