//! Traversal configuration: partial options, the sanitized record, and the
//! JSON boundary that validates untyped input.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use filters::{FilterError, PathFilter, Rule};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::cancel::CancellationToken;
use crate::entry::WalkEntry;
use crate::fs::DirRecord;

/// Depth limit for recursion.
///
/// A frame at depth `d` is opened only when `d` is within the limit; the
/// root frame has depth `0`, so `Limited(0)` yields exactly the root's
/// immediate children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaxDepth {
    /// Frames deeper than the value are pruned.
    Limited(usize),
    /// No limit.
    Unbounded,
}

impl MaxDepth {
    /// Returns `true` when a frame at `depth` may be opened.
    #[must_use]
    pub const fn allows(self, depth: usize) -> bool {
        match self {
            Self::Limited(limit) => depth <= limit,
            Self::Unbounded => true,
        }
    }
}

impl fmt::Display for MaxDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limited(limit) => write!(f, "{limit}"),
            Self::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// Caller-supplied ordering over raw directory records.
#[derive(Clone)]
pub struct Comparator(Arc<dyn Fn(&DirRecord, &DirRecord) -> Ordering + Send + Sync>);

impl Comparator {
    /// Wraps a comparison function.
    pub fn new<F>(compare: F) -> Self
    where
        F: Fn(&DirRecord, &DirRecord) -> Ordering + Send + Sync + 'static,
    {
        Self(Arc::new(compare))
    }

    /// Compares two records.
    #[must_use]
    pub fn compare(&self, left: &DirRecord, right: &DirRecord) -> Ordering {
        (self.0)(left, right)
    }
}

impl fmt::Debug for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Comparator(..)")
    }
}

/// Sibling ordering within one directory.
#[derive(Clone, Debug, Default)]
pub enum SortMode {
    /// Filesystem order; entries are streamed without buffering.
    #[default]
    None,
    /// Ascending name order, case-folded first.
    Ascending,
    /// Reverse of [`SortMode::Ascending`].
    Descending,
    /// Caller comparator.
    Custom(Comparator),
}

impl SortMode {
    /// Returns `true` when siblings must be collected before yielding.
    #[must_use]
    pub const fn buffers(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Parses `none`, `asc` or `desc`.
    ///
    /// `function` is recognised and rejected: a comparator can only be
    /// supplied through [`SortMode::Custom`].
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        match text {
            "none" => Ok(Self::None),
            "asc" => Ok(Self::Ascending),
            "desc" => Ok(Self::Descending),
            "function" => Err(ConfigError::ComparatorRequired),
            other => Err(ConfigError::InvalidSort {
                found: format!("\"{other}\""),
            }),
        }
    }
}

/// Observer invoked synchronously with each entry just before it is yielded.
#[derive(Clone)]
pub struct ProgressSink(Arc<dyn Fn(&WalkEntry) + Send + Sync>);

impl ProgressSink {
    /// Wraps a callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&WalkEntry) + Send + Sync + 'static,
    {
        Self(Arc::new(callback))
    }

    /// Invokes the callback with `entry`.
    pub fn notify(&self, entry: &WalkEntry) {
        (self.0)(entry);
    }
}

impl fmt::Debug for ProgressSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProgressSink(..)")
    }
}

/// Error produced when traversal options are malformed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `maxDepth` was neither a non-negative integer nor "unbounded".
    #[error("maxDepth must be a non-negative integer or \"unbounded\", found {found}")]
    InvalidMaxDepth {
        /// Rendering of the rejected value.
        found: String,
    },
    /// `sort` named an unknown mode.
    #[error("sort must be one of none, asc, desc or function, found {found}")]
    InvalidSort {
        /// Rendering of the rejected value.
        found: String,
    },
    /// `sort: "function"` without a comparator.
    #[error("sort mode \"function\" requires a comparator supplied programmatically")]
    ComparatorRequired,
    /// A boolean option carried another type.
    #[error("{option} must be a boolean, found {found}")]
    InvalidBoolean {
        /// Option name as written in the configuration.
        option: &'static str,
        /// JSON type that was found.
        found: &'static str,
    },
    /// `cancellationToken` carried something that is not a token.
    #[error("cancellationToken must be a cancellation token, found {found}")]
    InvalidCancellationToken {
        /// JSON type that was found.
        found: &'static str,
    },
    /// `onProgress` carried something that is not callable.
    #[error("onProgress must be callable, found {found}")]
    InvalidProgressSink {
        /// JSON type that was found.
        found: &'static str,
    },
    /// An include or exclude rule was rejected.
    #[error("invalid {option} rule: {source}")]
    InvalidFilter {
        /// `include` or `exclude`.
        option: &'static str,
        /// Underlying rule error.
        #[source]
        source: FilterError,
    },
    /// An option name is not recognised.
    #[error("unknown option '{name}'")]
    UnknownOption {
        /// The unrecognised key.
        name: String,
    },
    /// The configuration document is not an object.
    #[error("configuration must be an object, found {found}")]
    NotAnObject {
        /// JSON type that was found.
        found: &'static str,
    },
    /// The configuration text is not valid JSON.
    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Values used for every option a caller leaves unset.
#[derive(Debug)]
pub struct Defaults {
    /// Recursion limit.
    pub max_depth: MaxDepth,
    /// Whether directories appear in the output.
    pub yield_directories: bool,
    /// Whether symlinks to directories are descended.
    pub follow_symlinks: bool,
    /// Whether permission failures are skipped silently.
    pub suppress_errors: bool,
    /// Whether recursion past the limit is an error instead of a silent prune.
    pub strict_depth: bool,
    /// Sibling ordering.
    pub sort: SortMode,
    /// Whether each yielded entry carries [`EntryStats`](crate::EntryStats).
    pub with_stats: bool,
}

/// The defaults record. Include/exclude rules, the cancellation token and the
/// progress sink default to absent.
pub const DEFAULTS: Defaults = Defaults {
    max_depth: MaxDepth::Unbounded,
    yield_directories: false,
    follow_symlinks: false,
    suppress_errors: true,
    strict_depth: false,
    sort: SortMode::None,
    with_stats: false,
};

/// Partially specified traversal options.
///
/// Every field is optional; [`sanitize`](Self::sanitize) fills the gaps from
/// [`DEFAULTS`].
#[derive(Clone, Debug, Default)]
pub struct WalkOptions {
    /// Recursion limit.
    pub max_depth: Option<MaxDepth>,
    /// Rule a relative path must match to be yielded.
    pub include: Option<Rule>,
    /// Rule that excludes a relative path (and prunes directories).
    pub exclude: Option<Rule>,
    /// Whether directories appear in the output.
    pub yield_directories: Option<bool>,
    /// Whether symlinks to directories are descended.
    pub follow_symlinks: Option<bool>,
    /// Whether permission failures are skipped silently.
    pub suppress_errors: Option<bool>,
    /// Whether recursion past the limit is an error.
    pub strict_depth: Option<bool>,
    /// Token polled for cancellation.
    pub cancellation_token: Option<CancellationToken>,
    /// Sibling ordering.
    pub sort: Option<SortMode>,
    /// Observer called with each yielded entry.
    pub on_progress: Option<ProgressSink>,
    /// Whether each yielded entry carries stats.
    pub with_stats: Option<bool>,
}

const KNOWN_OPTIONS: [&str; 11] = [
    "maxDepth",
    "include",
    "exclude",
    "yieldDirectories",
    "followSymlinks",
    "suppressErrors",
    "strictDepth",
    "cancellationToken",
    "sort",
    "onProgress",
    "withStats",
];

impl WalkOptions {
    /// Parses untyped options using the camelCase option names.
    ///
    /// `null` means "not set" for every option. Unknown keys are rejected.
    pub fn from_json(value: &Value) -> Result<Self, ConfigError> {
        let map = value.as_object().ok_or(ConfigError::NotAnObject {
            found: json_type_name(value),
        })?;

        if let Some(unknown) = map.keys().find(|key| !KNOWN_OPTIONS.contains(&key.as_str())) {
            return Err(ConfigError::UnknownOption {
                name: unknown.clone(),
            });
        }

        Ok(Self {
            max_depth: parse_max_depth(map.get("maxDepth"))?,
            include: parse_rule(map, "include")?,
            exclude: parse_rule(map, "exclude")?,
            yield_directories: parse_bool(map, "yieldDirectories")?,
            follow_symlinks: parse_bool(map, "followSymlinks")?,
            suppress_errors: parse_bool(map, "suppressErrors")?,
            strict_depth: parse_bool(map, "strictDepth")?,
            cancellation_token: match present(map, "cancellationToken") {
                None => None,
                Some(other) => {
                    return Err(ConfigError::InvalidCancellationToken {
                        found: json_type_name(other),
                    });
                }
            },
            sort: match present(map, "sort") {
                None => None,
                Some(Value::String(text)) => Some(SortMode::parse(text)?),
                Some(other) => {
                    return Err(ConfigError::InvalidSort {
                        found: json_type_name(other).to_owned(),
                    });
                }
            },
            on_progress: match present(map, "onProgress") {
                None => None,
                Some(other) => {
                    return Err(ConfigError::InvalidProgressSink {
                        found: json_type_name(other),
                    });
                }
            },
            with_stats: parse_bool(map, "withStats")?,
        })
    }

    /// Parses options from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_json(&value)
    }

    /// Overlays every option set in `other` on top of `self`.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            max_depth: other.max_depth.or(self.max_depth),
            include: other.include.or(self.include),
            exclude: other.exclude.or(self.exclude),
            yield_directories: other.yield_directories.or(self.yield_directories),
            follow_symlinks: other.follow_symlinks.or(self.follow_symlinks),
            suppress_errors: other.suppress_errors.or(self.suppress_errors),
            strict_depth: other.strict_depth.or(self.strict_depth),
            cancellation_token: other.cancellation_token.or(self.cancellation_token),
            sort: other.sort.or(self.sort),
            on_progress: other.on_progress.or(self.on_progress),
            with_stats: other.with_stats.or(self.with_stats),
        }
    }

    /// Produces a complete configuration, filling unset fields from [`DEFAULTS`].
    pub fn sanitize(self) -> Result<WalkConfig, ConfigError> {
        Ok(WalkConfig {
            max_depth: self.max_depth.unwrap_or(DEFAULTS.max_depth),
            filter: PathFilter::new(self.include, self.exclude),
            yield_directories: self.yield_directories.unwrap_or(DEFAULTS.yield_directories),
            follow_symlinks: self.follow_symlinks.unwrap_or(DEFAULTS.follow_symlinks),
            suppress_errors: self.suppress_errors.unwrap_or(DEFAULTS.suppress_errors),
            strict_depth: self.strict_depth.unwrap_or(DEFAULTS.strict_depth),
            cancellation_token: self.cancellation_token,
            sort: self.sort.unwrap_or(DEFAULTS.sort),
            on_progress: self.on_progress,
            with_stats: self.with_stats.unwrap_or(DEFAULTS.with_stats),
        })
    }
}

/// Validates untyped options and produces a complete configuration.
///
/// # Examples
///
/// ```
/// use walk::{MaxDepth, sanitize};
///
/// let config = sanitize(&serde_json::json!({ "maxDepth": 2, "sort": "asc" })).unwrap();
/// assert_eq!(config.max_depth, MaxDepth::Limited(2));
/// assert!(config.suppress_errors);
///
/// assert!(sanitize(&serde_json::json!({ "maxDepth": -1 })).is_err());
/// assert!(sanitize(&serde_json::json!({ "include": "" })).is_err());
/// ```
pub fn sanitize(value: &Value) -> Result<WalkConfig, ConfigError> {
    WalkOptions::from_json(value)?.sanitize()
}

/// Fully populated traversal configuration, immutable for one traversal.
#[derive(Clone, Debug)]
pub struct WalkConfig {
    /// Recursion limit.
    pub max_depth: MaxDepth,
    /// Include/exclude pair evaluated against `/`-separated relative paths.
    pub filter: PathFilter,
    /// Whether directories appear in the output.
    pub yield_directories: bool,
    /// Whether symlinks to directories are descended.
    pub follow_symlinks: bool,
    /// Whether permission failures are skipped silently.
    pub suppress_errors: bool,
    /// Whether recursion past the limit is an error.
    pub strict_depth: bool,
    /// Token polled for cancellation.
    pub cancellation_token: Option<CancellationToken>,
    /// Sibling ordering.
    pub sort: SortMode,
    /// Observer called with each yielded entry.
    pub on_progress: Option<ProgressSink>,
    /// Whether each yielded entry carries stats.
    pub with_stats: bool,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULTS.max_depth,
            filter: PathFilter::default(),
            yield_directories: DEFAULTS.yield_directories,
            follow_symlinks: DEFAULTS.follow_symlinks,
            suppress_errors: DEFAULTS.suppress_errors,
            strict_depth: DEFAULTS.strict_depth,
            cancellation_token: None,
            sort: DEFAULTS.sort,
            on_progress: None,
            with_stats: DEFAULTS.with_stats,
        }
    }
}

impl WalkConfig {
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation_token
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

fn present<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|value| !value.is_null())
}

fn parse_bool(map: &Map<String, Value>, key: &'static str) -> Result<Option<bool>, ConfigError> {
    match present(map, key) {
        None => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(*flag)),
        Some(other) => Err(ConfigError::InvalidBoolean {
            option: key,
            found: json_type_name(other),
        }),
    }
}

fn parse_rule(map: &Map<String, Value>, key: &'static str) -> Result<Option<Rule>, ConfigError> {
    match map.get(key) {
        None => Ok(None),
        Some(value) => Rule::from_value(value)
            .map_err(|source| ConfigError::InvalidFilter { option: key, source }),
    }
}

/// Largest float depth accepted; integers above 2^53 are not exact in `f64`.
const MAX_INTEGRAL_DEPTH: f64 = 9_007_199_254_740_992.0;

fn parse_max_depth(value: Option<&Value>) -> Result<Option<MaxDepth>, ConfigError> {
    let invalid = |value: &Value| ConfigError::InvalidMaxDepth {
        found: value.to_string(),
    };
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => match text.to_ascii_lowercase().as_str() {
            "unbounded" | "infinity" => Ok(Some(MaxDepth::Unbounded)),
            _ => Err(invalid(&Value::String(text.clone()))),
        },
        Some(number @ Value::Number(n)) => {
            if let Some(depth) = n.as_u64() {
                usize::try_from(depth)
                    .map(|depth| Some(MaxDepth::Limited(depth)))
                    .map_err(|_| invalid(number))
            } else {
                match n.as_f64() {
                    Some(float) if float.is_infinite() && float > 0.0 => {
                        Ok(Some(MaxDepth::Unbounded))
                    }
                    // Integral floats such as `2.0` are still whole depths.
                    Some(float)
                        if float.is_finite()
                            && float >= 0.0
                            && float.fract() == 0.0
                            && float <= MAX_INTEGRAL_DEPTH =>
                    {
                        Ok(Some(MaxDepth::Limited(float as usize)))
                    }
                    _ => Err(invalid(number)),
                }
            }
        }
        Some(other) => Err(invalid(other)),
    }
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
