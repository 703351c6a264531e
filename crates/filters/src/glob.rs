//! Shell-glob compilation.
//!
//! Globs are translated into anchored regular expressions:
//!
//! - `*` matches a run of characters excluding `/`
//! - `**` matches a run including `/`; `**/` also matches nothing at all
//! - `?` matches one character other than `/`
//! - `[abc]`, `[a-z]`, `[!abc]` character classes (`^` negates too)
//! - `{a,b,c}` alternation, nestable, each alternative itself a glob
//! - `\x` escapes `x`; every other regex meta-character is literal
//!
//! [`GlobMatcher`] layers path semantics on top of the compiled expression:
//! separator normalisation, dot-file rejection, case folding and basename
//! matching.

use std::borrow::Cow;

use regex::{Regex, RegexBuilder};

use crate::{FilterError, Rule};

/// Flags controlling how a [`GlobMatcher`] compares candidate paths.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct GlobOptions {
    /// Allow wildcards to match basenames that start with `.`.
    pub dot: bool,
    /// Compare case-insensitively.
    pub nocase: bool,
    /// Always compare against the candidate's basename only.
    pub match_base: bool,
}

/// Reports whether `text` contains glob syntax (`*`, `?`, `[` or `{`).
#[must_use]
pub fn is_glob(text: &str) -> bool {
    text.contains(['*', '?', '[', '{'])
}

/// Compiles `glob` into a full-match, case-sensitive regex [`Rule`].
pub fn compile(glob: &str) -> Result<Rule, FilterError> {
    compile_regex(glob, GlobOptions::default()).map(Rule::from_regex)
}

/// Compiles `glob` into an anchored [`Regex`], honouring `options.nocase`.
pub fn compile_regex(glob: &str, options: GlobOptions) -> Result<Regex, FilterError> {
    if glob.is_empty() {
        return Err(FilterError::EmptyGlob);
    }
    RegexBuilder::new(&translate(glob))
        .case_insensitive(options.nocase)
        .build()
        .map_err(|source| FilterError::InvalidGlob {
            glob: glob.to_owned(),
            source,
        })
}

/// Translates `glob` into the source text of an anchored regular expression.
#[must_use]
pub fn translate(glob: &str) -> String {
    let chars: Vec<char> = glob.chars().collect();
    let mut out = String::with_capacity(glob.len() * 2 + 2);
    out.push('^');
    translate_into(&chars, &mut out);
    out.push('$');
    out
}

fn translate_into(chars: &[char], out: &mut String) {
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                let mut end = i;
                while chars.get(end) == Some(&'*') {
                    end += 1;
                }
                if end - i == 1 {
                    out.push_str("[^/]*");
                    i = end;
                } else if chars.get(end) == Some(&'/') {
                    out.push_str("(?:.*/)?");
                    i = end + 1;
                } else {
                    out.push_str(".*");
                    i = end;
                }
            }
            '?' => {
                out.push_str("[^/]");
                i += 1;
            }
            '[' => {
                if let Some(end) = class_end(chars, i) {
                    push_class(&chars[i + 1..end], out);
                    i = end + 1;
                } else {
                    out.push_str(r"\[");
                    i += 1;
                }
            }
            '{' => {
                if let Some((end, alternatives)) = brace_alternatives(chars, i) {
                    out.push_str("(?:");
                    for (index, alternative) in alternatives.iter().enumerate() {
                        if index > 0 {
                            out.push('|');
                        }
                        translate_into(alternative, out);
                    }
                    out.push(')');
                    i = end + 1;
                } else {
                    out.push_str(r"\{");
                    i += 1;
                }
            }
            '\\' if i + 1 < chars.len() => {
                push_literal(chars[i + 1], out);
                i += 2;
            }
            other => {
                push_literal(other, out);
                i += 1;
            }
        }
    }
}

/// Index of the `]` closing the class opened at `start`, if any.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut index = start + 1;
    if matches!(chars.get(index), Some('!' | '^')) {
        index += 1;
    }
    // A leading `]` is a member, not the terminator.
    if chars.get(index) == Some(&']') {
        index += 1;
    }
    chars[index.min(chars.len())..]
        .iter()
        .position(|&c| c == ']')
        .map(|offset| index + offset)
}

fn push_class(body: &[char], out: &mut String) {
    let (negated, body) = match body.split_first() {
        Some((&('!' | '^'), rest)) => (true, rest),
        _ => (false, body),
    };
    out.push('[');
    if negated {
        out.push_str("^/");
    }
    for (index, &c) in body.iter().enumerate() {
        if c == '-' && index > 0 && index + 1 < body.len() {
            out.push('-');
        } else {
            if matches!(c, '\\' | '[' | ']' | '^' | '-' | '&' | '~') {
                out.push('\\');
            }
            out.push(c);
        }
    }
    out.push(']');
}

/// Splits the brace group opened at `start` into its top-level alternatives.
///
/// Returns `None` when the group is unterminated or has no top-level comma,
/// in which case the brace is treated literally.
fn brace_alternatives(chars: &[char], start: usize) -> Option<(usize, Vec<&[char]>)> {
    let mut depth = 0usize;
    let mut alternatives = Vec::new();
    let mut segment_start = start + 1;
    let mut index = start;
    while index < chars.len() {
        match chars[index] {
            '\\' => index += 1,
            '[' => {
                if let Some(end) = class_end(chars, index) {
                    index = end;
                }
            }
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    if alternatives.is_empty() {
                        return None;
                    }
                    alternatives.push(&chars[segment_start..index]);
                    return Some((index, alternatives));
                }
            }
            ',' if depth == 1 => {
                alternatives.push(&chars[segment_start..index]);
                segment_start = index + 1;
            }
            _ => {}
        }
        index += 1;
    }
    None
}

fn push_literal(c: char, out: &mut String) {
    let mut buffer = [0u8; 4];
    out.push_str(&regex::escape(c.encode_utf8(&mut buffer)));
}

/// A compiled glob paired with the path-comparison rules of [`GlobOptions`].
#[derive(Clone, Debug)]
pub struct GlobMatcher {
    glob: String,
    regex: Regex,
    options: GlobOptions,
    has_separator: bool,
    has_magic: bool,
    explicit_dot: bool,
}

impl GlobMatcher {
    /// Compiles `glob` for path matching.
    pub fn new(glob: &str, options: GlobOptions) -> Result<Self, FilterError> {
        let regex = compile_regex(glob, options)?;
        let last_segment = glob.rsplit('/').next().unwrap_or(glob);
        Ok(Self {
            glob: glob.to_owned(),
            regex,
            options,
            has_separator: glob.contains('/'),
            has_magic: is_glob(glob),
            explicit_dot: last_segment.starts_with('.'),
        })
    }

    /// Returns the glob text this matcher was built from.
    #[must_use]
    pub fn glob(&self) -> &str {
        &self.glob
    }

    /// Returns the options this matcher was built with.
    #[must_use]
    pub const fn options(&self) -> GlobOptions {
        self.options
    }

    /// Tests `path` against the glob.
    ///
    /// Backslashes are treated as separators, a leading `./` and trailing
    /// `/` are ignored. Dot-prefixed basenames are rejected unless
    /// [`GlobOptions::dot`] is set or the glob itself names a dot file. When
    /// [`GlobOptions::match_base`] is set, or when a wildcard glob without a
    /// separator meets a path with one, only the basename is compared.
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        let normalized = normalize(path);
        let basename = normalized.rsplit('/').next().unwrap_or(&normalized);

        if !self.options.dot && !self.explicit_dot && basename.starts_with('.') {
            return false;
        }

        let base_only = self.options.match_base
            || (!self.has_separator && self.has_magic && normalized.contains('/'));
        if base_only {
            self.regex.is_match(basename)
        } else {
            self.regex.is_match(&normalized)
        }
    }
}

/// Compiles `glob` and tests `path` against it in one step.
pub fn match_path(path: &str, glob: &str, options: GlobOptions) -> Result<bool, FilterError> {
    Ok(GlobMatcher::new(glob, options)?.is_match(path))
}

fn normalize(path: &str) -> Cow<'_, str> {
    let path: Cow<'_, str> = if path.contains('\\') {
        Cow::Owned(path.replace('\\', "/"))
    } else {
        Cow::Borrowed(path)
    };
    let trimmed = path.strip_prefix("./").unwrap_or(&path).trim_end_matches('/');
    if trimmed.len() == path.len() {
        path
    } else {
        Cow::Owned(trimmed.to_owned())
    }
}
