use std::io;
use std::path::PathBuf;

use filters::FilterError;
use thiserror::Error;
use walk::{ConfigError, WalkError, WalkErrorKind};

/// Process exit code for a completed run.
pub const EXIT_OK: i32 = 0;
/// Process exit code for usage and configuration errors.
pub const EXIT_USAGE: i32 = 1;
/// Process exit code for a traversal stopped by an unsuppressed error.
pub const EXIT_TRAVERSAL: i32 = 2;
/// Process exit code for a cancellation surfaced as [`WalkErrorKind::Aborted`].
pub const EXIT_ABORTED: i32 = 3;

/// Failure of one CLI invocation.
#[derive(Debug, Error)]
pub enum CliError {
    /// Command-line parsing failed.
    #[error("{0}")]
    Usage(String),
    /// A `--config` document could not be read.
    #[error("failed to read config file '{}': {source}", .path.display())]
    ConfigFile {
        /// File named by `--config`.
        path: PathBuf,
        /// Underlying read failure.
        #[source]
        source: io::Error,
    },
    /// Traversal options were rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A glob or regular expression did not compile.
    #[error(transparent)]
    Filter(#[from] FilterError),
    /// The traversal stopped.
    #[error(transparent)]
    Walk(#[from] WalkError),
    /// Writing output failed.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl CliError {
    /// Exit code reported for this failure.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) | Self::ConfigFile { .. } | Self::Config(_) | Self::Filter(_) => {
                EXIT_USAGE
            }
            Self::Walk(error) if error.kind() == WalkErrorKind::Aborted => EXIT_ABORTED,
            Self::Walk(_) | Self::Output(_) => EXIT_TRAVERSAL,
        }
    }
}

impl From<clap::Error> for CliError {
    fn from(error: clap::Error) -> Self {
        Self::Usage(error.to_string().trim_end().to_owned())
    }
}
