/// Outcome of evaluating a [`PathFilter`](crate::PathFilter) against one path.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FilterDecision {
    /// The path passed both rules.
    Allowed,
    /// The include rule is present and did not match.
    NotIncluded,
    /// The exclude rule matched; this always wins over the include rule.
    Excluded,
}

impl FilterDecision {
    /// Returns `true` when the path should be surfaced.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Returns `true` when the exclude rule matched.
    #[must_use]
    pub const fn is_excluded(self) -> bool {
        matches!(self, Self::Excluded)
    }
}
