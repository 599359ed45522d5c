//! Command-line surface of `autobump`.
//!
//! Argument parsing lives here so `xtask` can render man pages and shell
//! completions from [`command()`]. All file handling is in `autobump-core`;
//! [`commands`] only resolves inputs and prints results.

pub mod commands;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};

/// When to colorize terminal output.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ColorChoice {
    /// Color when stdout is a terminal.
    #[default]
    Auto,
    /// Always color.
    Always,
    /// Plain text.
    Never,
}

impl ColorChoice {
    /// Set the process-wide owo-colors override.
    pub fn apply(self) {
        match self {
            Self::Auto => {}
            Self::Always => owo_colors::set_override(true),
            Self::Never => owo_colors::set_override(false),
        }
    }
}

const AFTER_HELP: &str = "\
CURRENT VERSION:
    --from, then bump.current_version, then <version> in ./pom.xml, then the
    latest v* git tag. A version ending in bump.snapshot_suffix (-SNAPSHOT)
    is released without the suffix.

MARKERS (safe_matching = true, the default):
    x = \"1.2.3\" // $auto-bumper      replace on this line
    // $auto-bumper                    replace on the next line
    // $auto-bumper-line               replace on the next line

BUMP SCRIPT:
    autobump.script.toml lists [[files]] with a path and a shell command.
    The command reads the file on stdin and prints the new content.
    {prev_version} and {version} are replaced with the versions, shell-quoted
    when they contain special characters. AUTOBUMP_PREVIOUS_VERSION and
    AUTOBUMP_RELEASE_VERSION are exported as well.

ENVIRONMENT:
    RUST_LOG              Log filter (e.g. autobump_core=trace)
    AUTOBUMP_LOG_PATH     Log file
    AUTOBUMP_LOG_DIR      Log directory
";

/// Root argument parser.
#[derive(Parser)]
#[command(
    name = "autobump",
    version,
    about = "Rewrite version literals in project files during a release",
    after_long_help = AFTER_HELP
)]
pub struct Cli {
    /// What to do.
    #[command(subcommand)]
    pub command: Commands,

    /// Extra configuration file, layered over the discovered one
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Project directory (default: current directory)
    #[arg(short = 'C', long = "chdir", global = true, value_name = "DIR")]
    pub chdir: Option<PathBuf>,

    /// Log errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log more (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Colorize output
    #[arg(long, global = true, value_enum, default_value_t)]
    pub color: ColorChoice,

    /// Print a JSON report on stdout
    #[arg(long, global = true)]
    pub json: bool,
}

/// Subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Rewrite the version literal in every configured file
    Bump(commands::bump::BumpArgs),

    /// Show the resolved configuration and bump targets
    Info(commands::info::InfoArgs),
}

/// The clap command, for man pages and completions.
pub fn command() -> clap::Command {
    Cli::command()
}
