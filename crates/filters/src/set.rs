use crate::glob::{GlobMatcher, GlobOptions};
use crate::{FilterDecision, FilterError, Rule, matches};

/// Include/exclude pair evaluated against relative paths.
///
/// The exclude rule is consulted first and a hit short-circuits to
/// [`FilterDecision::Excluded`]. An absent include rule admits everything
/// the exclude rule let through.
///
/// # Examples
///
/// ```
/// use filters::{PathFilter, Rule};
///
/// let filter = PathFilter::new(
///     Some(Rule::literal(".rs").unwrap()),
///     Some(Rule::literal("target").unwrap()),
/// );
/// assert!(filter.allows("src/main.rs"));
/// assert!(!filter.allows("target/debug/build.rs"));
/// assert!(!filter.allows("README.md"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct PathFilter {
    include: Option<Rule>,
    exclude: Option<Rule>,
}

impl PathFilter {
    /// Creates a filter from an optional include and exclude rule.
    #[must_use]
    pub const fn new(include: Option<Rule>, exclude: Option<Rule>) -> Self {
        Self { include, exclude }
    }

    /// Returns the include rule, if any.
    #[must_use]
    pub const fn include(&self) -> Option<&Rule> {
        self.include.as_ref()
    }

    /// Returns the exclude rule, if any.
    #[must_use]
    pub const fn exclude(&self) -> Option<&Rule> {
        self.exclude.as_ref()
    }

    /// Returns `true` if neither rule is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.include.is_none() && self.exclude.is_none()
    }

    /// Classifies `name` against both rules, exclude first.
    #[must_use]
    pub fn decide(&self, name: &str) -> FilterDecision {
        if self.exclude.as_ref().is_some_and(|rule| rule.is_match(name)) {
            FilterDecision::Excluded
        } else if matches(name, self.include.as_ref()) {
            FilterDecision::Allowed
        } else {
            FilterDecision::NotIncluded
        }
    }

    /// Returns `true` if `name` passes the filter.
    #[must_use]
    pub fn allows(&self, name: &str) -> bool {
        self.decide(name).is_allowed()
    }
}

/// Builds a [`PathFilter`] from glob lists.
///
/// Each non-empty list becomes one rule matching when any of its globs
/// matches; an empty list leaves that side absent.
pub fn build_filter<I, E, S, T>(
    include: I,
    exclude: E,
    options: GlobOptions,
) -> Result<PathFilter, FilterError>
where
    I: IntoIterator<Item = S>,
    E: IntoIterator<Item = T>,
    S: AsRef<str>,
    T: AsRef<str>,
{
    Ok(PathFilter::new(
        glob_rule(include, options)?,
        glob_rule(exclude, options)?,
    ))
}

fn glob_rule<I, S>(globs: I, options: GlobOptions) -> Result<Option<Rule>, FilterError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let matchers = globs
        .into_iter()
        .map(|glob| GlobMatcher::new(glob.as_ref(), options))
        .collect::<Result<Vec<_>, _>>()?;
    if matchers.is_empty() {
        Ok(None)
    } else {
        Ok(Some(Rule::any_glob(matchers)))
    }
}
