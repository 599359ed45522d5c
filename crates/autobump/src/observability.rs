//! Observability setup: structured logging.
//!
//! Events go to a JSONL file. This module never writes to stdout, which is
//! reserved for command output (including `--json` reports). If no log file
//! can be opened, logging falls back to stderr.

use anyhow::Result;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const ENV_LOG_PATH: &str = "AUTOBUMP_LOG_PATH";
const ENV_LOG_DIR: &str = "AUTOBUMP_LOG_DIR";
const LOG_FILE_SUFFIX: &str = ".jsonl";

/// Configuration for observability setup.
#[derive(Clone, Debug)]
pub struct ObservabilityConfig {
    /// Name used for the default log file.
    pub service: String,
    /// Directory for JSONL log files. Falls back to platform defaults if unset.
    pub log_dir: Option<PathBuf>,
}

impl ObservabilityConfig {
    /// Create config from environment variables with optional overrides.
    pub fn from_env_with_overrides(log_dir: Option<PathBuf>) -> Self {
        Self {
            service: env!("CARGO_PKG_NAME").to_string(),
            log_dir,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct LogTarget {
    dir: PathBuf,
    file_name: String,
}

/// Guard that must be held for the lifetime of the application so buffered
/// log lines are flushed on exit.
pub struct ObservabilityGuard {
    _log_guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Initialize observability (logging).
///
/// Returns a guard that must be held for the application lifetime.
pub fn init_observability(
    cfg: &ObservabilityConfig,
    env_filter: EnvFilter,
) -> Result<ObservabilityGuard> {
    let (writer, log_guard) = match resolve_log_target(&cfg.service, cfg.log_dir.as_deref()) {
        Ok(target) => {
            let appender = tracing_appender::rolling::daily(&target.dir, &target.file_name);
            tracing_appender::non_blocking(appender)
        }
        Err(err) => {
            // stdout carries command output; never log there
            eprintln!("Warning: {err}. Falling back to stderr logging.");
            tracing_appender::non_blocking(std::io::stderr())
        }
    };

    let log_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(false)
        .with_ansi(false)
        .with_writer(writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(log_layer)
        .try_init()?;

    tracing::debug!("observability initialized");

    Ok(ObservabilityGuard {
        _log_guard: log_guard,
    })
}

/// Build an `EnvFilter` based on CLI flags and environment.
///
/// Priority: quiet flag > verbose flag > RUST_LOG env > default_level
pub fn env_filter(quiet: bool, verbose: u8, default_level: &str) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }

    match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

// ============================================================================
// Log Target Resolution
// ============================================================================

fn resolve_log_target(service: &str, config_log_dir: Option<&Path>) -> Result<LogTarget, String> {
    resolve_log_target_with(
        service,
        std::env::var_os(ENV_LOG_PATH).map(PathBuf::from),
        std::env::var_os(ENV_LOG_DIR).map(PathBuf::from),
        config_log_dir.map(PathBuf::from),
    )
}

/// Precedence: explicit file, env directory, configured directory, then the
/// platform data directory.
fn resolve_log_target_with(
    service: &str,
    path_override: Option<PathBuf>,
    dir_override: Option<PathBuf>,
    config_dir: Option<PathBuf>,
) -> Result<LogTarget, String> {
    if let Some(path) = path_override {
        return log_target_from_path(&path);
    }

    let file_name = format!("{service}{LOG_FILE_SUFFIX}");
    if let Some(dir) = dir_override.or(config_dir) {
        ensure_writable(&dir, &file_name)?;
        return Ok(LogTarget { dir, file_name });
    }

    let dir = directories::ProjectDirs::from("", "", service)
        .map(|dirs| dirs.data_local_dir().join("logs"))
        .ok_or_else(|| "no home directory for log files".to_string())?;
    ensure_writable(&dir, &file_name)?;
    Ok(LogTarget { dir, file_name })
}

fn log_target_from_path(path: &Path) -> Result<LogTarget, String> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| format!("{ENV_LOG_PATH} must end in a UTF-8 file name"))?
        .to_string();

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    ensure_writable(dir, &file_name)?;

    Ok(LogTarget {
        dir: dir.to_path_buf(),
        file_name,
    })
}

fn ensure_writable(dir: &Path, file_name: &str) -> Result<(), String> {
    std::fs::create_dir_all(dir)
        .map_err(|e| format!("Failed to create log directory {}: {e}", dir.display()))?;

    let path = dir.join(file_name);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| format!("Failed to open log file {}: {e}", path.display()))?;

    Ok(())
}
