#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cli` implements the command-line front-end of `treewalk`. It parses
//! arguments with [`clap`](https://docs.rs/clap/), merges them over an
//! optional JSON configuration document, drives a [`walk::Walker`], and
//! prints either the entries themselves or one of the [`report`] folds.
//!
//! # Design
//!
//! [`run`] accepts an argument iterator together with handles for standard
//! output and error so the binary and the tests share one code path. Flags
//! are translated into a partial [`walk::WalkOptions`]; a `--config` file
//! supplies the same record and flags take precedence field by field.
//! `--limit N` is implemented with a progress sink that trips the walk's
//! cancellation token once `N` entries have been produced.
//!
//! # Errors
//!
//! Diagnostics are written to the error handle as `treewalk: <message>`.
//! The exit code is [`EXIT_USAGE`] for argument and configuration problems,
//! [`EXIT_TRAVERSAL`] when the walk stops on an unsuppressed error, and
//! [`EXIT_ABORTED`] when cancellation is surfaced as an error.
//!
//! # Examples
//!
//! ```
//! let temp = tempfile::tempdir().unwrap();
//! std::fs::write(temp.path().join("a.txt"), b"a").unwrap();
//!
//! let mut stdout = Vec::new();
//! let mut stderr = Vec::new();
//! let root = temp.path().to_str().unwrap();
//! let exit_code = cli::run(["treewalk", "--report", "count", root], &mut stdout, &mut stderr);
//!
//! assert_eq!(exit_code, cli::EXIT_OK);
//! assert!(String::from_utf8(stdout).unwrap().contains("files: 1"));
//! assert!(stderr.is_empty());
//! ```

mod args;
mod error;
mod options;
mod output;
pub mod report;

use std::ffi::OsString;
use std::io::Write;

use logging::{VerbosityConfig, info_log};
use walk::WalkBuilder;

use crate::args::{ParsedArgs, parse_args};
use crate::options::{apply_limit, resolve_options};
use crate::output::Output;
use crate::report::Fold;

pub use error::{CliError, EXIT_ABORTED, EXIT_OK, EXIT_TRAVERSAL, EXIT_USAGE};

/// Help text describing the supported options.
const HELP_TEXT: &str = concat!(
    "Usage: treewalk [OPTIONS] <ROOT>\n",
    "\n",
    "Lazily walk the tree below ROOT in depth-first order.\n",
    "\n",
    "Options:\n",
    "  -h, --help               Show this help message and exit.\n",
    "  -V, --version            Output version information and exit.\n",
    "  -d, --max-depth N        Descend at most N levels below ROOT's children ('unbounded' for no limit).\n",
    "      --include GLOB       Only yield paths matching GLOB (repeatable).\n",
    "      --exclude GLOB       Skip and prune paths matching GLOB (repeatable).\n",
    "      --regex-include RE   Only yield paths RE finds a match in.\n",
    "      --regex-exclude RE   Skip and prune paths RE finds a match in.\n",
    "      --dot                Let glob wildcards match names starting with '.'.\n",
    "      --nocase             Compare globs case-insensitively.\n",
    "      --dirs               Yield directories as well as files.\n",
    "  -L, --follow             Descend into symlinked directories, skipping cycles.\n",
    "      --strict             Report recursion past --max-depth as an error.\n",
    "      --no-suppress        Stop on permission failures instead of skipping them.\n",
    "      --sort ORDER         Order siblings by name: none, asc or desc.\n",
    "      --stats              Collect metadata and print traversal counters.\n",
    "      --config FILE        Read options from a JSON document; flags take precedence.\n",
    "      --json               Emit JSON lines instead of text.\n",
    "  -v, --verbose            Increase diagnostic verbosity (repeatable).\n",
    "      --debug FLAG         Enable a debug flag: walk, filter, dup, stat, error, cancel or all.\n",
    "      --info FLAG          Enable an info flag: skip, stats or all.\n",
    "      --report KIND        Summarise entries: list, count, size, ext or dupes.\n",
    "      --limit N            Cancel the walk once N entries have been produced.\n",
    "\n",
    "Exit status: 0 success, 1 usage or configuration error, 2 traversal error,\n",
    "3 cancelled with the cancellation reported as an error.\n",
);

/// Runs the CLI using the provided argument iterator and output handles.
///
/// Returns the process exit code.
pub fn run<I, S, Out, Err>(arguments: I, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
    Out: Write,
    Err: Write,
{
    let result = parse_args(arguments)
        .map_err(CliError::from)
        .and_then(|parsed| execute(parsed, stdout));
    match result {
        Ok(()) => EXIT_OK,
        Err(error) => {
            let _ = stdout.flush();
            let _ = writeln!(stderr, "treewalk: {error}");
            error.exit_code()
        }
    }
}

fn execute<Out: Write>(parsed: ParsedArgs, stdout: &mut Out) -> Result<(), CliError> {
    if parsed.show_help {
        stdout.write_all(HELP_TEXT.as_bytes())?;
        return Ok(());
    }

    if parsed.show_version {
        writeln!(stdout, "treewalk {}", env!("CARGO_PKG_VERSION"))?;
        return Ok(());
    }

    configure_logging(&parsed)?;

    let Some(root) = parsed.root.clone() else {
        return Err(CliError::Usage(
            "missing ROOT operand (see --help)".to_owned(),
        ));
    };

    let mut options = resolve_options(&parsed)?;
    if let Some(limit) = parsed.limit {
        options = apply_limit(options, limit);
    }
    let mut walker = WalkBuilder::new(root).options(options).build()?;

    let output = Output::new(parsed.json);
    let mut fold = Fold::new(parsed.report);
    for item in walker.by_ref() {
        let entry = item?;
        match fold.as_mut() {
            Some(fold) => fold.observe(&entry),
            None => output.entry(stdout, &entry)?,
        }
    }

    if let Some(fold) = fold {
        output.report(stdout, &fold.finish())?;
    }

    let summary = walker.summary();
    info_log!(
        Stats,
        1,
        "{} entries, {} directories entered, {} errors suppressed",
        summary.entries_yielded,
        summary.directories_entered,
        summary.errors_suppressed
    );
    if parsed.stats {
        output.summary(stdout, &summary)?;
    }

    stdout.flush()?;
    Ok(())
}

fn configure_logging(parsed: &ParsedArgs) -> Result<(), CliError> {
    let mut verbosity = VerbosityConfig::from_verbose_level(parsed.verbose);
    for token in &parsed.debug {
        verbosity.apply_debug_flag(token).map_err(CliError::Usage)?;
    }
    for token in &parsed.info {
        verbosity.apply_info_flag(token).map_err(CliError::Usage)?;
    }

    if parsed.verbose > 0 || !parsed.debug.is_empty() || !parsed.info.is_empty() {
        logging::init_tracing(verbosity);
    } else {
        logging::init(verbosity);
    }
    Ok(())
}
