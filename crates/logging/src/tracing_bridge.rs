//! crates/logging/src/tracing_bridge.rs
//! Bridge from the treewalk verbosity system to the tracing crate.
//!
//! Diagnostics emitted through [`debug_log!`](crate::debug_log) and
//! [`info_log!`](crate::info_log) are re-emitted as `tracing` events under a
//! per-flag target (`treewalk::walk`, `treewalk::skip`, ...) below
//! [`TRACING_TARGET`], so `RUST_LOG=treewalk::dup=debug` selects a single
//! category while `treewalk=trace` selects all of them.

use super::config::VerbosityConfig;
use super::levels::{DebugFlag, InfoFlag};

/// Parent target of every event forwarded from the verbosity system.
pub const TRACING_TARGET: &str = "treewalk";

/// Emits one event per flag arm. Targets must be literals because tracing
/// stores them in static callsite metadata.
macro_rules! forward_by_flag {
    (
        $flag:expr, $macro:ident, $level:expr, $message:expr,
        { $($variant:path => $target:literal),+ $(,)? }
    ) => {
        match $flag {
            $($variant => tracing::$macro!(target: $target, level = $level, "{}", $message),)+
        }
    };
}

pub(crate) fn forward_debug(flag: DebugFlag, level: u8, message: &str) {
    if level <= 1 {
        forward_by_flag!(flag, debug, level, message, {
            DebugFlag::Cancel => "treewalk::cancel",
            DebugFlag::Dup => "treewalk::dup",
            DebugFlag::Error => "treewalk::error",
            DebugFlag::Filter => "treewalk::filter",
            DebugFlag::Stat => "treewalk::stat",
            DebugFlag::Walk => "treewalk::walk",
        });
    } else {
        forward_by_flag!(flag, trace, level, message, {
            DebugFlag::Cancel => "treewalk::cancel",
            DebugFlag::Dup => "treewalk::dup",
            DebugFlag::Error => "treewalk::error",
            DebugFlag::Filter => "treewalk::filter",
            DebugFlag::Stat => "treewalk::stat",
            DebugFlag::Walk => "treewalk::walk",
        });
    }
}

pub(crate) fn forward_info(flag: InfoFlag, level: u8, message: &str) {
    forward_by_flag!(flag, info, level, message, {
        InfoFlag::Skip => "treewalk::skip",
        InfoFlag::Stats => "treewalk::stats",
    });
}

/// Install a global subscriber that prints diagnostics to stderr.
///
/// `RUST_LOG` takes precedence when set; otherwise the filter is derived from
/// the configuration (`treewalk=trace` when any debug flag is on, `treewalk=info`
/// when an info flag is on, `warn` otherwise). The thread-local configuration
/// is initialised as well. Returns `false` when a global subscriber was
/// already installed, which is harmless.
pub fn init_tracing(config: VerbosityConfig) -> bool {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    super::thread_local::init(config.clone());

    let default_directive = if config.debug.any_enabled() {
        "treewalk=trace"
    } else if InfoFlag::ALL.iter().any(|flag| config.info.get(*flag) > 0) {
        "treewalk=info"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .is_ok()
}
