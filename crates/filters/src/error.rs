use thiserror::Error;

/// Error produced when a filter rule cannot be constructed or compiled.
///
/// Filter configuration errors are never suppressed: an invalid rule must
/// fail closed instead of silently matching every path.
#[derive(Debug, Error)]
pub enum FilterError {
    /// An empty literal was supplied; use an absent rule to match everything.
    #[error("empty literal filter is ambiguous; omit the rule to match everything")]
    EmptyLiteral,
    /// A regular expression failed to compile.
    #[error("failed to compile filter pattern '{pattern}': {source}")]
    InvalidRegex {
        /// The offending pattern text.
        pattern: String,
        /// Underlying regex compilation failure.
        #[source]
        source: regex::Error,
    },
    /// A glob expression was translated but the resulting expression was rejected.
    #[error("failed to compile glob '{glob}': {source}")]
    InvalidGlob {
        /// The glob as written by the caller.
        glob: String,
        /// Underlying regex compilation failure.
        #[source]
        source: regex::Error,
    },
    /// An empty glob was supplied.
    #[error("empty glob pattern")]
    EmptyGlob,
    /// An untyped rule description had a shape no rule variant accepts.
    #[error("unsupported filter rule shape: expected a non-empty string, regex or glob object, found {found}")]
    UnsupportedShape {
        /// Short description of what was found instead.
        found: String,
    },
}

impl FilterError {
    /// Returns the pattern text associated with the error, when there is one.
    #[must_use]
    pub fn pattern(&self) -> Option<&str> {
        match self {
            Self::InvalidRegex { pattern, .. } => Some(pattern),
            Self::InvalidGlob { glob, .. } => Some(glob),
            Self::EmptyLiteral | Self::EmptyGlob | Self::UnsupportedShape { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FilterError;
    use std::error::Error as _;

    #[test]
    fn invalid_regex_preserves_pattern_and_source() {
        let source = regex::Regex::new("(").unwrap_err();
        let error = FilterError::InvalidRegex {
            pattern: "(".into(),
            source: source.clone(),
        };

        assert_eq!(error.pattern(), Some("("));
        assert!(error.to_string().contains("failed to compile"));
        assert_eq!(error.source().unwrap().to_string(), source.to_string());
    }

    #[test]
    fn empty_literal_has_no_pattern() {
        let error = FilterError::EmptyLiteral;
        assert!(error.pattern().is_none());
        assert!(error.source().is_none());
        assert!(error.to_string().contains("ambiguous"));
    }

    #[test]
    fn unsupported_shape_names_what_was_found() {
        let error = FilterError::UnsupportedShape {
            found: "number".into(),
        };
        assert!(error.to_string().ends_with("found number"));
    }
}
