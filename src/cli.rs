//! Command-line interface for ab2st.
//!
//! Defines CLI arguments using clap builder API

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};

use crate::passes::PassKind;

/// CLI arguments parsed from command line
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Source file or project directory to convert
    pub path: PathBuf,

    /// Passes switched off with `--no-<pass>`
    pub disabled: Vec<PassKind>,

    /// Config file path
    pub config: Option<PathBuf>,

    /// Exclude patterns for files/directories (glob patterns)
    pub exclude: Vec<String>,

    /// Also write the log to this file
    pub log_file: Option<PathBuf>,

    /// Enable debug output
    pub debug: bool,

    /// Silent mode (no output)
    pub silent: bool,
}

/// Build the clap Command for parsing CLI arguments
#[must_use]
pub fn build_cli() -> Command {
    let mut cmd = Command::new("ab2st")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Converts Automation Basic (.ab) programs into Structured Text (.st)")
        .arg(
            Arg::new("path")
                .help("Source file (.ab or .st) or project directory containing an *.apj file")
                .value_name("PATH")
                .default_value(".")
                .value_parser(clap::value_parser!(PathBuf)),
        );

    for kind in PassKind::ALL {
        cmd = cmd.arg(
            Arg::new(kind.disable_flag())
                .long(kind.disable_flag())
                .help(kind.disable_help())
                .action(ArgAction::SetTrue),
        );
    }

    cmd.arg(
        Arg::new("config")
            .short('c')
            .long("config")
            .help("Path to configuration file (overrides auto-discovery)")
            .value_name("FILE")
            .value_parser(clap::value_parser!(PathBuf)),
    )
    .arg(
        Arg::new("exclude")
            .short('e')
            .long("exclude")
            .help("Exclude files/directories matching pattern (glob syntax, can be repeated)")
            .value_name("PATTERN")
            .action(ArgAction::Append),
    )
    .arg(
        Arg::new("log-file")
            .long("log-file")
            .help("Also write the conversion log to this file")
            .value_name("FILE")
            .value_parser(clap::value_parser!(PathBuf)),
    )
    .arg(
        Arg::new("debug")
            .short('D')
            .long("debug")
            .help("Enable debug output (shows the effective configuration)")
            .action(ArgAction::SetTrue),
    )
    .arg(
        Arg::new("silent")
            .short('S')
            .long("silent")
            .help("Silent mode (no log output on stderr)")
            .action(ArgAction::SetTrue),
    )
}

/// Parse CLI arguments from command line
#[must_use]
pub fn parse_args() -> CliArgs {
    args_from_matches(&build_cli().get_matches())
}

/// Parse CLI arguments from an iterator (for testing)
#[must_use]
pub fn parse_args_from<I, T>(args: I) -> CliArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    args_from_matches(&build_cli().get_matches_from(args))
}

/// Convert clap `ArgMatches` to `CliArgs`
fn args_from_matches(matches: &clap::ArgMatches) -> CliArgs {
    CliArgs {
        path: matches
            .get_one::<PathBuf>("path")
            .cloned()
            .unwrap_or_else(|| PathBuf::from(".")),
        disabled: PassKind::ALL
            .into_iter()
            .filter(|kind| matches.get_flag(kind.disable_flag()))
            .collect(),
        config: matches.get_one::<PathBuf>("config").cloned(),
        exclude: matches
            .get_many::<String>("exclude")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        log_file: matches.get_one::<PathBuf>("log-file").cloned(),
        debug: matches.get_flag("debug"),
        silent: matches.get_flag("silent"),
    }
}
