use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::{Map, Value};

use crate::FilterError;
use crate::glob::{GlobMatcher, GlobOptions};

/// Caller-supplied matching function used by [`Rule::predicate`].
pub type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// A single validated filter rule.
///
/// A rule is exactly one of a non-empty literal substring, a compiled
/// regular expression, or a predicate. The "absent" shape is expressed as
/// `Option::<Rule>::None` and matches everything (see [`matches`]).
///
/// Rules can only be built through the validating constructors, so an
/// empty literal or an uncompilable expression never reaches the matcher.
#[derive(Clone)]
pub struct Rule {
    inner: RuleInner,
}

#[derive(Clone)]
enum RuleInner {
    Literal(String),
    Pattern(Regex),
    Predicate(Predicate),
}

impl Rule {
    /// Creates a substring rule.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::EmptyLiteral`] for an empty string.
    pub fn literal(text: impl Into<String>) -> Result<Self, FilterError> {
        let text = text.into();
        if text.is_empty() {
            return Err(FilterError::EmptyLiteral);
        }
        Ok(Self {
            inner: RuleInner::Literal(text),
        })
    }

    /// Compiles `pattern` into a regular-expression rule.
    ///
    /// The expression is searched, not anchored; anchor it explicitly when a
    /// full match is wanted.
    pub fn regex(pattern: &str) -> Result<Self, FilterError> {
        let regex = Regex::new(pattern).map_err(|source| FilterError::InvalidRegex {
            pattern: pattern.to_owned(),
            source,
        })?;
        Ok(Self::from_regex(regex))
    }

    /// Wraps an already compiled regular expression.
    #[must_use]
    pub fn from_regex(regex: Regex) -> Self {
        Self {
            inner: RuleInner::Pattern(regex),
        }
    }

    /// Creates a rule backed by a caller-supplied predicate.
    #[must_use]
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            inner: RuleInner::Predicate(Arc::new(predicate)),
        }
    }

    /// Creates a rule that matches when any of `matchers` accepts the path.
    #[must_use]
    pub fn any_glob(matchers: Vec<GlobMatcher>) -> Self {
        Self::predicate(move |path| matchers.iter().any(|matcher| matcher.is_match(path)))
    }

    /// Builds a rule from an untyped JSON description.
    ///
    /// `null` yields `Ok(None)` (the absent rule). A string is a literal; an
    /// object carries exactly one of `regex`, `glob` or `globs`, with the
    /// glob flags `dot`, `nocase` and `matchBase`. Every other shape is an
    /// error rather than a silent match-all.
    pub fn from_value(value: &Value) -> Result<Option<Self>, FilterError> {
        match value {
            Value::Null => Ok(None),
            Value::String(text) => Self::literal(text.as_str()).map(Some),
            Value::Object(map) => Self::from_object(map).map(Some),
            other => Err(FilterError::UnsupportedShape {
                found: json_type_name(other).to_owned(),
            }),
        }
    }

    fn from_object(map: &Map<String, Value>) -> Result<Self, FilterError> {
        if let Some(key) = map.keys().find(|key| !OBJECT_KEYS.contains(&key.as_str())) {
            return Err(FilterError::UnsupportedShape {
                found: format!("object with unknown key '{key}'"),
            });
        }
        let shapes: Vec<&str> = SHAPE_KEYS
            .iter()
            .copied()
            .filter(|key| map.contains_key(*key))
            .collect();
        let shape = match shapes.as_slice() {
            [shape] => *shape,
            [] => {
                return Err(FilterError::UnsupportedShape {
                    found: "object without regex, glob or globs".to_owned(),
                });
            }
            _ => {
                return Err(FilterError::UnsupportedShape {
                    found: format!("object with several shapes ({})", shapes.join(", ")),
                });
            }
        };

        if shape == "regex" {
            if let Some(key) = GLOB_FLAGS.iter().find(|key| map.contains_key(**key)) {
                return Err(FilterError::UnsupportedShape {
                    found: format!("glob flag '{key}' on a regex rule"),
                });
            }
            let pattern = &map["regex"];
            let pattern = pattern.as_str().ok_or_else(|| unsupported("regex", pattern))?;
            return Self::regex(pattern);
        }

        let options = glob_options_from(map)?;
        if shape == "glob" {
            let glob = &map["glob"];
            let glob = glob.as_str().ok_or_else(|| unsupported("glob", glob))?;
            return Ok(Self::any_glob(vec![GlobMatcher::new(glob, options)?]));
        }

        let globs = &map["globs"];
        let list = globs.as_array().ok_or_else(|| unsupported("globs", globs))?;
        if list.is_empty() {
            return Err(FilterError::UnsupportedShape {
                found: "empty array for 'globs'".to_owned(),
            });
        }
        let mut matchers = Vec::with_capacity(list.len());
        for glob in list {
            let glob = glob.as_str().ok_or_else(|| unsupported("globs", glob))?;
            matchers.push(GlobMatcher::new(glob, options)?);
        }
        Ok(Self::any_glob(matchers))
    }

    /// Evaluates the rule against `name`.
    #[must_use]
    pub fn is_match(&self, name: &str) -> bool {
        match &self.inner {
            RuleInner::Literal(text) => name.contains(text.as_str()),
            RuleInner::Pattern(regex) => regex.is_match(name),
            RuleInner::Predicate(predicate) => predicate(name),
        }
    }

    /// Returns the literal text when this is a substring rule.
    #[must_use]
    pub fn as_literal(&self) -> Option<&str> {
        match &self.inner {
            RuleInner::Literal(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the compiled expression when this is a regex rule.
    #[must_use]
    pub fn as_regex(&self) -> Option<&Regex> {
        match &self.inner {
            RuleInner::Pattern(regex) => Some(regex),
            _ => None,
        }
    }

    /// Reports whether the rule is backed by a predicate.
    #[must_use]
    pub fn is_predicate(&self) -> bool {
        matches!(self.inner, RuleInner::Predicate(_))
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            RuleInner::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            RuleInner::Pattern(regex) => f.debug_tuple("Pattern").field(&regex.as_str()).finish(),
            RuleInner::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Evaluates an optional rule against `name`; an absent rule matches everything.
#[must_use]
pub fn matches(name: &str, rule: Option<&Rule>) -> bool {
    rule.is_none_or(|rule| rule.is_match(name))
}

const SHAPE_KEYS: [&str; 3] = ["regex", "glob", "globs"];
const GLOB_FLAGS: [&str; 3] = ["dot", "nocase", "matchBase"];
const OBJECT_KEYS: [&str; 6] = ["regex", "glob", "globs", "dot", "nocase", "matchBase"];

fn glob_options_from(map: &Map<String, Value>) -> Result<GlobOptions, FilterError> {
    let flag = |key: &str| -> Result<bool, FilterError> {
        match map.get(key) {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(value)) => Ok(*value),
            Some(other) => Err(unsupported(key, other)),
        }
    };
    Ok(GlobOptions {
        dot: flag("dot")?,
        nocase: flag("nocase")?,
        match_base: flag("matchBase")?,
    })
}

fn unsupported(key: &str, value: &Value) -> FilterError {
    FilterError::UnsupportedShape {
        found: format!("{} for '{key}'", json_type_name(value)),
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
