//! Bump command — thin CLI layer over `autobump_core::bump`.

use anyhow::{Context, bail};
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, info, instrument};

use autobump_core::bump::{self, BumpMethod, BumpOutcome, FileStatus, RunOptions};
use autobump_core::config::{BumpConfig, Config};
use autobump_core::script::CommandScript;
use autobump_core::version::{self, BumpLevel, ReleaseTarget};

/// Arguments for the `bump` subcommand.
#[derive(Args, Debug, Default)]
pub struct BumpArgs {
    /// Version currently in the files (default: config, then latest v* tag)
    #[arg(long, value_name = "VERSION")]
    pub from: Option<String>,

    /// Write this version verbatim instead of computing one
    #[arg(long, value_name = "VERSION", conflicts_with = "level")]
    pub to: Option<String>,

    /// Semver component to increment when --to is not given
    #[arg(long, value_enum)]
    pub level: Option<LevelArg>,

    /// Also run every entry of the bump script
    #[arg(long)]
    pub scripted: bool,

    /// Run without making changes (show what would happen)
    #[arg(long)]
    pub dry_run: bool,
}

/// CLI mirror of [`BumpLevel`].
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LevelArg {
    /// x.y.Z
    Patch,
    /// x.Y.0
    Minor,
    /// X.0.0
    Major,
}

impl From<LevelArg> for BumpLevel {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Patch => Self::Patch,
            LevelArg::Minor => Self::Minor,
            LevelArg::Major => Self::Major,
        }
    }
}

/// JSON shape when no release version can be determined.
#[derive(Serialize)]
struct Skipped<'a> {
    previous: &'a str,
    changed: bool,
    reason: &'static str,
}

/// JSON shape of a completed run.
#[derive(Serialize)]
struct Report<'a> {
    #[serde(flatten)]
    outcome: &'a BumpOutcome,
    changed: bool,
}

/// Execute the bump command.
#[instrument(name = "cmd_bump", skip_all, fields(json_output))]
pub fn cmd_bump(
    args: BumpArgs,
    global_json: bool,
    config: &Config,
    cwd: &camino::Utf8Path,
) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing bump command");

    let bump_config = config.bump.clone().unwrap_or_default();
    if bump_config.files.is_empty() && !(args.scripted || bump_config.scripted) {
        bail!("no files configured; add [[bump.files]] entries to the config file");
    }

    let Some(previous) = version::current_version(
        args.from.as_deref(),
        bump_config.current_version.as_deref(),
        cwd,
    )
    .context("failed to determine the current version")?
    else {
        bail!("no current version found; pass --from, set bump.current_version, or add a v* tag");
    };

    let target = match args.to {
        Some(v) => ReleaseTarget::Explicit(v),
        None => ReleaseTarget::Level(args.level.map(BumpLevel::from).unwrap_or_default()),
    };

    let Some(ctx) = version::resolve_context(&previous, &target, &bump_config.snapshot_suffix)
        .context("failed to resolve the release version")?
    else {
        info!(%previous, "no release version, nothing to bump");
        if global_json {
            let skipped = Skipped {
                previous: &previous,
                changed: false,
                reason: "no release version could be determined",
            };
            println!("{}", serde_json::to_string_pretty(&skipped)?);
        } else {
            println!(
                "{} {} {}",
                "!".yellow(),
                "No release version could be determined from".yellow(),
                previous.bold()
            );
        }
        return Ok(());
    };

    let options = run_options(&bump_config, args.scripted, args.dry_run);
    let outcome = bump::run(cwd, &bump_config.files, &ctx, options, &CommandScript)
        .context("bump failed")?;

    if global_json {
        let report = Report {
            outcome: &outcome,
            changed: outcome.any_modified,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_outcome(&outcome);
    }

    Ok(())
}

fn run_options(config: &BumpConfig, scripted_flag: bool, dry_run: bool) -> RunOptions {
    RunOptions {
        scripted: scripted_flag || config.scripted,
        default_ending: config.line_ending(),
        dry_run,
    }
}

fn print_outcome(outcome: &BumpOutcome) {
    println!(
        "{}: {} → {}",
        "Version".bold(),
        outcome.previous.dimmed(),
        outcome.release.green().bold()
    );
    if outcome.snapshot_release {
        println!("{}: {}", "Release".dimmed(), "snapshot".cyan());
    }
    println!();

    for file in &outcome.files {
        let via = match file.method {
            BumpMethod::Pattern => "",
            BumpMethod::Script => " (script)",
        };
        match file.status {
            FileStatus::Modified => {
                println!("  {} {}{}", "✓".green(), file.path.cyan(), via.dimmed());
            }
            FileStatus::Unchanged => {
                println!("  {} {}{}", "○".dimmed(), file.path, via.dimmed());
            }
            FileStatus::Missing => {
                println!(
                    "  {} {} {}",
                    "!".yellow(),
                    file.path,
                    "does not exist".yellow()
                );
            }
            FileStatus::NoTask => {
                println!(
                    "  {} {} {}",
                    "!".yellow(),
                    file.path,
                    "has no bump script task".yellow()
                );
            }
        }
    }

    println!();
    match (outcome.any_modified, outcome.dry_run) {
        (true, true) => println!("{}", "Dry run — no changes made.".yellow()),
        (true, false) => println!("  {} Files updated", "✓".green()),
        (false, _) => println!("{}", "Nothing to update.".dimmed()),
    }
}
