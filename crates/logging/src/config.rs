//! crates/logging/src/config.rs
//! Verbosity configuration combining info and debug levels.

use super::levels::{DebugFlag, DebugLevels, InfoFlag, InfoLevels};

/// Combined verbosity configuration for info and debug flags.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VerbosityConfig {
    /// Info flag levels.
    pub info: InfoLevels,
    /// Debug flag levels.
    pub debug: DebugLevels,
    /// Keep emitted diagnostics in the thread-local buffer for
    /// [`drain_events`](crate::drain_events).
    #[cfg_attr(feature = "serde", serde(default))]
    pub capture: bool,
}

impl VerbosityConfig {
    /// Create a new configuration from a `-v` count (0-4, higher saturates).
    pub fn from_verbose_level(level: u8) -> Self {
        let mut config = Self::default();

        if level >= 1 {
            config.info.skip = 1;
            config.info.stats = 1;
        }
        if level >= 2 {
            config.info.skip = 2;
            config.debug.error = 1;
            config.debug.dup = 1;
            config.debug.walk = 1;
        }
        if level >= 3 {
            config.debug.cancel = 1;
            config.debug.filter = 1;
            config.debug.stat = 1;
            config.debug.walk = 2;
        }
        if level >= 4 {
            config.debug.set_all(3);
        }

        config
    }

    /// Enables buffering of emitted events.
    #[must_use]
    pub const fn with_capture(mut self, capture: bool) -> Self {
        self.capture = capture;
        self
    }

    /// Apply a single info flag token (e.g., "skip2", "stats", "all").
    pub fn apply_info_flag(&mut self, token: &str) -> Result<(), String> {
        let (name, level) = parse_flag_token(token)?;
        if name == "all" {
            self.info.set_all(level);
            return Ok(());
        }

        let flag = InfoFlag::ALL
            .into_iter()
            .find(|flag| flag.name() == name)
            .ok_or_else(|| format!("unknown info flag: {name}"))?;
        self.info.set(flag, level);
        Ok(())
    }

    /// Apply a single debug flag token (e.g., "walk2", "dup", "all").
    pub fn apply_debug_flag(&mut self, token: &str) -> Result<(), String> {
        let (name, level) = parse_flag_token(token)?;
        if name == "all" {
            self.debug.set_all(level);
            return Ok(());
        }

        let flag = DebugFlag::ALL
            .into_iter()
            .find(|flag| flag.name() == name)
            .ok_or_else(|| format!("unknown debug flag: {name}"))?;
        self.debug.set(flag, level);
        Ok(())
    }
}

/// Parse a flag token like "walk2" into ("walk", 2) or "dup" into ("dup", 1).
fn parse_flag_token(token: &str) -> Result<(&str, u8), String> {
    if token.is_empty() {
        return Err("empty flag token".to_string());
    }

    match token.find(|c: char| c.is_ascii_digit()) {
        Some(0) => Err(format!("missing flag name in: {token}")),
        Some(pos) => {
            let level = token[pos..]
                .parse::<u8>()
                .map_err(|_| format!("invalid level in flag: {token}"))?;
            Ok((&token[..pos], level))
        }
        None => Ok((token, 1)),
    }
}
