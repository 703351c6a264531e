#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` provides the flag-based verbosity system used by the treewalk
//! workspace. Diagnostics are grouped into info categories (user-facing
//! progress such as skipped subtrees and statistics) and debug categories
//! (engine internals such as frame lifecycle, duplicate identities, and
//! filter evaluation). Each category carries an independent level so callers
//! can enable `--debug walk2` without drowning in filter chatter.
//!
//! # Design
//!
//! The active [`VerbosityConfig`] lives in thread-local storage. The
//! [`debug_log!`] and [`info_log!`] macros consult it before formatting, so
//! disabled diagnostics cost one thread-local read. Enabled events are
//! forwarded to the `tracing` ecosystem (behind the `tracing` feature) under
//! a `treewalk::<flag>` target and, when [`VerbosityConfig::capture`] is set, also
//! buffered for [`drain_events`]. Tests rely on the buffer to assert on what
//! the engine reported.
//!
//! # Examples
//!
//! ```
//! use logging::{VerbosityConfig, debug_log, drain_events, init};
//!
//! let mut config = VerbosityConfig::default().with_capture(true);
//! config.apply_debug_flag("walk2").unwrap();
//! init(config);
//!
//! debug_log!(Walk, 1, "opened {}", "/tmp");
//! debug_log!(Walk, 3, "too chatty");
//!
//! let events = drain_events();
//! assert_eq!(events.len(), 1);
//! assert_eq!(events[0].message(), "opened /tmp");
//! ```

mod config;
mod levels;
mod thread_local;
#[cfg(feature = "tracing")]
mod tracing_bridge;

pub use config::VerbosityConfig;
pub use levels::{DebugFlag, DebugLevels, InfoFlag, InfoLevels};
pub use thread_local::{
    DiagnosticEvent, apply_debug_flag, apply_info_flag, current, debug_gte, drain_events,
    emit_debug, emit_info, info_gte, init,
};
#[cfg(feature = "tracing")]
pub use tracing_bridge::{TRACING_TARGET, init_tracing};

/// Emit a debug diagnostic when the named flag is at or above `level`.
///
/// The format arguments are only evaluated when the flag is enabled.
#[macro_export]
macro_rules! debug_log {
    ($flag:ident, $level:expr, $($arg:tt)+) => {
        if $crate::debug_gte($crate::DebugFlag::$flag, $level) {
            $crate::emit_debug($crate::DebugFlag::$flag, $level, format!($($arg)+));
        }
    };
}

/// Emit an info diagnostic when the named flag is at or above `level`.
#[macro_export]
macro_rules! info_log {
    ($flag:ident, $level:expr, $($arg:tt)+) => {
        if $crate::info_gte($crate::InfoFlag::$flag, $level) {
            $crate::emit_info($crate::InfoFlag::$flag, $level, format!($($arg)+));
        }
    };
}
