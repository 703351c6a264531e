use std::ffi::OsString;
use std::path::PathBuf;

use clap::builder::{OsStringValueParser, PossibleValuesParser};
use clap::{Arg, ArgAction, Command, value_parser};

use crate::report::ReportKind;

/// Parsed command produced by [`parse_args`].
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Default)]
pub(crate) struct ParsedArgs {
    pub(crate) show_help: bool,
    pub(crate) show_version: bool,
    pub(crate) root: Option<PathBuf>,
    pub(crate) max_depth: Option<String>,
    pub(crate) includes: Vec<String>,
    pub(crate) excludes: Vec<String>,
    pub(crate) regex_include: Option<String>,
    pub(crate) regex_exclude: Option<String>,
    pub(crate) dot: bool,
    pub(crate) nocase: bool,
    pub(crate) dirs: bool,
    pub(crate) follow: bool,
    pub(crate) strict: bool,
    pub(crate) no_suppress: bool,
    pub(crate) sort: Option<String>,
    pub(crate) stats: bool,
    pub(crate) config: Option<PathBuf>,
    pub(crate) json: bool,
    pub(crate) verbose: u8,
    pub(crate) debug: Vec<String>,
    pub(crate) info: Vec<String>,
    pub(crate) report: ReportKind,
    pub(crate) limit: Option<u64>,
}

/// Builds the `clap` command used for parsing.
fn clap_command() -> Command {
    Command::new("treewalk")
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg_required_else_help(false)
        .arg(
            Arg::new("help")
                .long("help")
                .short('h')
                .help("Show this help message and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .short('V')
                .help("Output version information and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("max-depth")
                .long("max-depth")
                .short('d')
                .value_name("N")
                .help("Descend at most N levels below the root's children (or 'unbounded').")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("include")
                .long("include")
                .value_name("GLOB")
                .help("Only yield paths matching GLOB (repeatable).")
                .action(ArgAction::Append)
                .conflicts_with("regex-include"),
        )
        .arg(
            Arg::new("exclude")
                .long("exclude")
                .value_name("GLOB")
                .help("Skip and prune paths matching GLOB (repeatable).")
                .action(ArgAction::Append)
                .conflicts_with("regex-exclude"),
        )
        .arg(
            Arg::new("regex-include")
                .long("regex-include")
                .value_name("RE")
                .help("Only yield paths the regular expression RE finds a match in.")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("regex-exclude")
                .long("regex-exclude")
                .value_name("RE")
                .help("Skip and prune paths the regular expression RE finds a match in.")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("dot")
                .long("dot")
                .help("Let glob wildcards match names starting with '.'.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("nocase")
                .long("nocase")
                .help("Compare globs case-insensitively.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dirs")
                .long("dirs")
                .help("Yield directories as well as files.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("follow")
                .long("follow")
                .short('L')
                .help("Descend into symlinked directories, skipping cycles.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Report recursion past --max-depth as an error instead of pruning.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-suppress")
                .long("no-suppress")
                .help("Stop on permission failures instead of skipping them.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("sort")
                .long("sort")
                .value_name("ORDER")
                .help("Order siblings by name: none, asc or desc.")
                .value_parser(PossibleValuesParser::new(["none", "asc", "desc"]))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .help("Collect metadata for each entry and print traversal counters.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Read traversal options from a JSON document; flags take precedence.")
                .value_parser(value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Emit JSON instead of text.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Increase diagnostic verbosity (repeatable).")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .value_name("FLAG")
                .help("Enable a debug flag, e.g. walk2 or all (repeatable).")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("info")
                .long("info")
                .value_name("FLAG")
                .help("Enable an info flag, e.g. skip or stats (repeatable).")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("report")
                .long("report")
                .value_name("KIND")
                .help("Summarise entries: list, count, size, ext or dupes.")
                .value_parser(PossibleValuesParser::new(ReportKind::NAMES))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("limit")
                .long("limit")
                .value_name("N")
                .help("Cancel the traversal once N entries have been produced.")
                .value_parser(value_parser!(u64))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("root")
                .value_name("ROOT")
                .num_args(1)
                .value_parser(OsStringValueParser::new()),
        )
}

/// Parses command-line arguments into a [`ParsedArgs`] structure.
pub(crate) fn parse_args<I, S>(arguments: I) -> Result<ParsedArgs, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut args: Vec<OsString> = arguments.into_iter().map(Into::into).collect();

    if args.is_empty() {
        args.push(OsString::from("treewalk"));
    }

    let mut matches = clap_command().try_get_matches_from(args)?;

    let strings = |matches: &mut clap::ArgMatches, id: &str| -> Vec<String> {
        matches
            .remove_many::<String>(id)
            .map(Iterator::collect)
            .unwrap_or_default()
    };
    let includes = strings(&mut matches, "include");
    let excludes = strings(&mut matches, "exclude");
    let debug = strings(&mut matches, "debug");
    let info = strings(&mut matches, "info");

    let report = matches
        .remove_one::<String>("report")
        .and_then(|name| ReportKind::parse(&name))
        .unwrap_or_default();

    Ok(ParsedArgs {
        show_help: matches.get_flag("help"),
        show_version: matches.get_flag("version"),
        root: matches.remove_one::<OsString>("root").map(PathBuf::from),
        max_depth: matches.remove_one::<String>("max-depth"),
        includes,
        excludes,
        regex_include: matches.remove_one::<String>("regex-include"),
        regex_exclude: matches.remove_one::<String>("regex-exclude"),
        dot: matches.get_flag("dot"),
        nocase: matches.get_flag("nocase"),
        dirs: matches.get_flag("dirs"),
        follow: matches.get_flag("follow"),
        strict: matches.get_flag("strict"),
        no_suppress: matches.get_flag("no-suppress"),
        sort: matches.remove_one::<String>("sort"),
        stats: matches.get_flag("stats"),
        config: matches.remove_one::<PathBuf>("config"),
        json: matches.get_flag("json"),
        verbose: matches.get_count("verbose"),
        debug,
        info,
        report,
        limit: matches.remove_one::<u64>("limit"),
    })
}
