//! Translation of parsed flags into traversal options.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use filters::{GlobMatcher, GlobOptions, Rule};
use walk::{CancellationToken, MaxDepth, ProgressSink, SortMode, WalkOptions};

use crate::args::ParsedArgs;
use crate::error::CliError;

/// Reads a `--config` JSON document.
pub(crate) fn load_config_file(path: &Path) -> Result<WalkOptions, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::ConfigFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(WalkOptions::from_json_str(&text)?)
}

/// Options expressed by command-line flags alone.
///
/// Switches only produce a value when given, so a config file can still
/// supply anything the command line leaves unset.
pub(crate) fn flag_options(parsed: &ParsedArgs) -> Result<WalkOptions, CliError> {
    let glob_options = GlobOptions {
        dot: parsed.dot,
        nocase: parsed.nocase,
        match_base: false,
    };

    Ok(WalkOptions {
        max_depth: parsed.max_depth.as_deref().map(parse_max_depth).transpose()?,
        include: rule(&parsed.includes, parsed.regex_include.as_deref(), glob_options)?,
        exclude: rule(&parsed.excludes, parsed.regex_exclude.as_deref(), glob_options)?,
        yield_directories: parsed.dirs.then_some(true),
        follow_symlinks: parsed.follow.then_some(true),
        suppress_errors: parsed.no_suppress.then_some(false),
        strict_depth: parsed.strict.then_some(true),
        sort: parsed.sort.as_deref().map(SortMode::parse).transpose()?,
        with_stats: (parsed.stats || parsed.report.needs_stats()).then_some(true),
        ..WalkOptions::default()
    })
}

/// Config file first, flags on top.
pub(crate) fn resolve_options(parsed: &ParsedArgs) -> Result<WalkOptions, CliError> {
    let base = match &parsed.config {
        Some(path) => load_config_file(path)?,
        None => WalkOptions::default(),
    };
    Ok(base.merge(flag_options(parsed)?))
}

/// Arranges for the walk to be cancelled after `limit` entries.
pub(crate) fn apply_limit(options: WalkOptions, limit: u64) -> WalkOptions {
    let token = CancellationToken::new();
    if limit == 0 {
        token.cancel();
    }
    let trigger = token.clone();
    let produced = Arc::new(AtomicU64::new(0));
    let previous = options.on_progress.clone();

    let mut options = WalkOptions {
        cancellation_token: Some(token),
        ..options
    };
    options.on_progress = Some(ProgressSink::new(move |entry| {
        if let Some(previous) = &previous {
            previous.notify(entry);
        }
        if produced.fetch_add(1, Ordering::Relaxed) + 1 >= limit {
            trigger.cancel();
        }
    }));
    options
}

fn parse_max_depth(text: &str) -> Result<MaxDepth, CliError> {
    if text.eq_ignore_ascii_case("unbounded") || text.eq_ignore_ascii_case("infinity") {
        return Ok(MaxDepth::Unbounded);
    }
    text.parse::<usize>()
        .map(MaxDepth::Limited)
        .map_err(|_| {
            CliError::Usage(format!(
                "invalid --max-depth '{text}': expected a non-negative integer or 'unbounded'"
            ))
        })
}

fn rule(
    globs: &[String],
    regex: Option<&str>,
    options: GlobOptions,
) -> Result<Option<Rule>, CliError> {
    if let Some(pattern) = regex {
        return Ok(Some(Rule::regex(pattern)?));
    }
    if globs.is_empty() {
        return Ok(None);
    }
    let matchers = globs
        .iter()
        .map(|glob| GlobMatcher::new(glob, options))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(Rule::any_glob(matchers)))
}
