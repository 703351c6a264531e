//! crates/logging/src/levels.rs
//! Flag enums and level structures for info and debug verbosity.

/// Info flags for user-facing diagnostic categories.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InfoFlag {
    /// Subtrees skipped because an error was suppressed.
    Skip,
    /// End-of-traversal statistics.
    Stats,
}

impl InfoFlag {
    /// Every info flag, in token order.
    pub const ALL: [Self; 2] = [Self::Skip, Self::Stats];

    /// Returns the token used on the command line (`skip`, `stats`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Stats => "stats",
        }
    }
}

/// Debug flags for engine-internal diagnostic categories.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DebugFlag {
    /// Cancellation polling.
    Cancel,
    /// Directories skipped because their identity was already visited.
    Dup,
    /// Error classification and suppression.
    Error,
    /// Filter rule evaluation.
    Filter,
    /// Stat augmentation.
    Stat,
    /// Frame lifecycle: open, prune, close.
    Walk,
}

impl DebugFlag {
    /// Every debug flag, in token order.
    pub const ALL: [Self; 6] = [
        Self::Cancel,
        Self::Dup,
        Self::Error,
        Self::Filter,
        Self::Stat,
        Self::Walk,
    ];

    /// Returns the token used on the command line (`walk`, `dup`, ...).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cancel => "cancel",
            Self::Dup => "dup",
            Self::Error => "error",
            Self::Filter => "filter",
            Self::Stat => "stat",
            Self::Walk => "walk",
        }
    }
}

/// Info verbosity levels for each flag.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InfoLevels {
    /// Suppressed-error skip reporting level.
    pub skip: u8,
    /// Statistics reporting level.
    pub stats: u8,
}

impl InfoLevels {
    /// Get the level for a specific flag.
    pub const fn get(&self, flag: InfoFlag) -> u8 {
        match flag {
            InfoFlag::Skip => self.skip,
            InfoFlag::Stats => self.stats,
        }
    }

    /// Set the level for a specific flag.
    pub fn set(&mut self, flag: InfoFlag, level: u8) {
        match flag {
            InfoFlag::Skip => self.skip = level,
            InfoFlag::Stats => self.stats = level,
        }
    }

    /// Set all flags to the specified level.
    pub fn set_all(&mut self, level: u8) {
        for flag in InfoFlag::ALL {
            self.set(flag, level);
        }
    }
}

/// Debug verbosity levels for each flag.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DebugLevels {
    /// Cancellation polling level.
    pub cancel: u8,
    /// Duplicate identity detection level.
    pub dup: u8,
    /// Error classification level.
    pub error: u8,
    /// Filter evaluation level.
    pub filter: u8,
    /// Stat augmentation level.
    pub stat: u8,
    /// Frame lifecycle level.
    pub walk: u8,
}

impl DebugLevels {
    /// Get the level for a specific flag.
    pub const fn get(&self, flag: DebugFlag) -> u8 {
        match flag {
            DebugFlag::Cancel => self.cancel,
            DebugFlag::Dup => self.dup,
            DebugFlag::Error => self.error,
            DebugFlag::Filter => self.filter,
            DebugFlag::Stat => self.stat,
            DebugFlag::Walk => self.walk,
        }
    }

    /// Set the level for a specific flag.
    pub fn set(&mut self, flag: DebugFlag, level: u8) {
        match flag {
            DebugFlag::Cancel => self.cancel = level,
            DebugFlag::Dup => self.dup = level,
            DebugFlag::Error => self.error = level,
            DebugFlag::Filter => self.filter = level,
            DebugFlag::Stat => self.stat = level,
            DebugFlag::Walk => self.walk = level,
        }
    }

    /// Set all flags to the specified level.
    pub fn set_all(&mut self, level: u8) {
        for flag in DebugFlag::ALL {
            self.set(flag, level);
        }
    }

    /// Returns `true` if any flag is enabled.
    #[must_use]
    pub fn any_enabled(&self) -> bool {
        DebugFlag::ALL.iter().any(|flag| self.get(*flag) > 0)
    }
}
