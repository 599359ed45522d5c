//! autobump CLI
#![deny(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use autobump::{Cli, Commands, commands};
use autobump_core::Config;
use autobump_core::config::ConfigLoader;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use tracing::debug;

mod observability;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.color.apply();

    let project_root = enter_project(cli.chdir.as_deref())?;
    let config = load_config(&project_root, cli.config.as_deref())?;
    let _guard = start_logging(&cli, &config)?;
    debug!(
        root = %project_root,
        config = ?cli.config,
        json = cli.json,
        "starting"
    );

    let result = match cli.command {
        Commands::Bump(args) => commands::bump::cmd_bump(args, cli.json, &config, &project_root),
        Commands::Info(args) => commands::info::cmd_info(args, cli.json, &config, &project_root),
    };
    if let Err(err) = &result {
        tracing::error!(error = %err, "command failed");
    }
    result
}

/// Apply `-C` and return the directory files are resolved against.
fn enter_project(chdir: Option<&Path>) -> anyhow::Result<Utf8PathBuf> {
    if let Some(dir) = chdir {
        std::env::set_current_dir(dir)
            .with_context(|| format!("cannot enter {}", dir.display()))?;
    }
    let cwd = std::env::current_dir().context("cannot read the working directory")?;
    utf8(cwd, "working directory")
}

fn load_config(project_root: &Utf8Path, explicit: Option<&Path>) -> anyhow::Result<Config> {
    let loader = ConfigLoader::new().with_project_search(project_root);
    let loader = match explicit {
        Some(path) => loader.with_file(utf8(path.to_path_buf(), "config path")?),
        None => loader,
    };
    loader.load().context("failed to load configuration")
}

fn start_logging(cli: &Cli, config: &Config) -> anyhow::Result<observability::ObservabilityGuard> {
    let log_dir = config.log_dir.clone().map(Utf8PathBuf::into_std_path_buf);
    let settings = observability::ObservabilityConfig::from_env_with_overrides(log_dir);
    let filter = observability::env_filter(cli.quiet, cli.verbose, config.log_level.as_str());
    observability::init_observability(&settings, filter).context("failed to initialize logging")
}

fn utf8(path: PathBuf, what: &str) -> anyhow::Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path)
        .map_err(|path| anyhow!("{what} is not valid UTF-8: {}", path.display()))
}
