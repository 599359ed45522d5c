//! Info command — show package, config, and configured bump targets.

use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use autobump_core::config::{self, BumpConfig, Config, FileSpec};
use autobump_core::content::LineEnding;

/// Arguments for the `info` subcommand.
#[derive(Args, Debug, Default)]
pub struct InfoArgs {
    // No subcommand-specific arguments; uses global --json flag
}

#[derive(Serialize)]
struct PackageInfo {
    name: &'static str,
    version: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    license: &'static str,
}

impl PackageInfo {
    const fn new() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            description: env!("CARGO_PKG_DESCRIPTION"),
            license: env!("CARGO_PKG_LICENSE"),
        }
    }
}

#[derive(Serialize)]
struct ConfigInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    config_file: Option<String>,
    log_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_dir: Option<String>,
}

impl ConfigInfo {
    fn from_config(config: &Config, cwd: &camino::Utf8Path) -> Self {
        Self {
            config_file: config::find_project_config(cwd).map(|p| p.to_string()),
            log_level: config.log_level.as_str().to_string(),
            log_dir: config.log_dir.as_ref().map(|p| p.to_string()),
        }
    }
}

#[derive(Serialize)]
struct BumpInfo<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    current_version: Option<&'a str>,
    snapshot_suffix: &'a str,
    scripted: bool,
    line_ending: LineEnding,
    files: &'a [FileSpec],
}

impl<'a> BumpInfo<'a> {
    fn from_config(bump: &'a BumpConfig) -> Self {
        Self {
            current_version: bump.current_version.as_deref(),
            snapshot_suffix: &bump.snapshot_suffix,
            scripted: bump.scripted,
            line_ending: bump.line_ending(),
            files: &bump.files,
        }
    }
}

#[derive(Serialize)]
struct FullInfo<'a> {
    #[serde(flatten)]
    package: PackageInfo,
    config: ConfigInfo,
    bump: BumpInfo<'a>,
}

/// Print package information and the configured bump targets.
///
/// # Arguments
/// * `global_json` - Global `--json` flag from CLI
/// * `config` - Loaded configuration
/// * `cwd` - Current working directory for config discovery
#[instrument(name = "cmd_info", skip_all, fields(json_output))]
pub fn cmd_info(
    _args: InfoArgs,
    global_json: bool,
    config: &Config,
    cwd: &camino::Utf8Path,
) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing info command");

    let bump_config = config.bump.clone().unwrap_or_default();
    let full_info = FullInfo {
        package: PackageInfo::new(),
        config: ConfigInfo::from_config(config, cwd),
        bump: BumpInfo::from_config(&bump_config),
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&full_info)?);
        return Ok(());
    }

    println!(
        "{} {}",
        full_info.package.name.bold(),
        full_info.package.version.green()
    );
    if !full_info.package.description.is_empty() {
        println!("{}", full_info.package.description);
    }
    if !full_info.package.license.is_empty() {
        println!("{}: {}", "License".dimmed(), full_info.package.license);
    }

    println!();
    println!("{}", "Configuration".bold().underline());
    if let Some(ref path) = full_info.config.config_file {
        println!("{}: {}", "Config file".dimmed(), path.cyan());
    } else {
        println!("{}: {}", "Config file".dimmed(), "none loaded".yellow());
    }
    println!("{}: {}", "Log level".dimmed(), full_info.config.log_level);
    if let Some(ref dir) = full_info.config.log_dir {
        println!("{}: {}", "Log directory".dimmed(), dir);
    }

    let bump = &full_info.bump;
    println!();
    println!("{}", "Bump".bold().underline());
    match bump.current_version {
        Some(v) => println!("{}: {}", "Current version".dimmed(), v.cyan()),
        None => println!("{}: {}", "Current version".dimmed(), "pom.xml or latest v* tag".dimmed()),
    }
    if bump.snapshot_suffix.is_empty() {
        println!("{}: {}", "Snapshot suffix".dimmed(), "disabled".yellow());
    } else {
        println!("{}: {}", "Snapshot suffix".dimmed(), bump.snapshot_suffix);
    }
    println!("{}: {}", "Line ending".dimmed(), bump.line_ending);
    if bump.scripted {
        println!("{}: {}", "Bump script".dimmed(), "all entries".cyan());
    }

    if bump.files.is_empty() {
        println!(
            "  {} {}",
            "○".yellow(),
            "No files configured".yellow()
        );
    }
    for spec in bump.files {
        let mode = if spec.scripted {
            "script"
        } else if spec.safe_matching {
            "markers"
        } else {
            "anywhere"
        };
        print!("  {} {} {}", "→".dimmed(), spec.path.cyan(), mode.dimmed());
        if !spec.regex_replace.is_empty() {
            print!(" {}", format!("+{} rules", spec.regex_replace.len()).dimmed());
        }
        println!();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config::default()
    }

    fn test_cwd() -> camino::Utf8PathBuf {
        camino::Utf8PathBuf::from("/tmp")
    }

    #[test]
    fn test_cmd_info_text_succeeds() {
        assert!(cmd_info(InfoArgs::default(), false, &test_config(), &test_cwd()).is_ok());
    }

    #[test]
    fn test_cmd_info_json_via_global() {
        assert!(cmd_info(InfoArgs::default(), true, &test_config(), &test_cwd()).is_ok());
    }

    #[test]
    fn test_config_info_no_file() {
        let config = Config::default();
        let cwd = camino::Utf8PathBuf::from("/nonexistent");
        let info = ConfigInfo::from_config(&config, &cwd);
        assert!(info.config_file.is_none());
        assert_eq!(info.log_level, "info");
    }

    #[test]
    fn bump_info_reflects_files() {
        let bump = BumpConfig {
            files: vec![FileSpec::new("src/version.ts")],
            ..BumpConfig::default()
        };
        let info = BumpInfo::from_config(&bump);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["files"][0]["path"], "src/version.ts");
        assert_eq!(json["snapshot_suffix"], "-SNAPSHOT");
    }
}
