//! Scripted bumps: hand a whole file to an external transform.
//!
//! A [`ScriptProvider`] supplies a list of [`ScriptEntry`] values, each a
//! path plus a task `(content, previous, release) -> content`. The engine
//! reads the file, runs the task and writes the result back if it differs.
//! No line splitting or line-ending handling happens on this path; the
//! task owns the entire content.
//!
//! The project-level provider is [`CommandScript`], which reads
//! [`SCRIPT_FILE`] from the project root:
//!
//! ```toml
//! [[files]]
//! path = "build.gradle"
//! command = "sed 's/version = \"{prev_version}\"/version = \"{version}\"/'"
//! ```
//!
//! Each command runs through `sh -c` with the file content on stdin. Its
//! stdout becomes the new content. `{prev_version}` and `{version}` are
//! replaced with the shell-quoted versions; plain semver strings need no
//! quoting and appear as-is. The same values are exported as
//! [`ENV_PREVIOUS_VERSION`] and [`ENV_RELEASE_VERSION`].

use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Format, Toml};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::bump::{BumpError, BumpResult, FileStatus};
use crate::version::{BumpContext, substitute};

/// Project-relative file that declares scripted bumps.
pub const SCRIPT_FILE: &str = "autobump.script.toml";

/// Environment variable carrying the previous version into script commands.
pub const ENV_PREVIOUS_VERSION: &str = "AUTOBUMP_PREVIOUS_VERSION";

/// Environment variable carrying the release version into script commands.
pub const ENV_RELEASE_VERSION: &str = "AUTOBUMP_RELEASE_VERSION";

/// Errors from loading or running a bump script.
#[derive(Error, Debug)]
pub enum ScriptError {
    /// The script file does not exist.
    #[error("bump script not found: {0}")]
    NotFound(Utf8PathBuf),

    /// The script file could not be parsed.
    #[error("invalid bump script: {0}")]
    Manifest(#[from] Box<figment::Error>),

    /// A task command could not be started.
    #[error("failed to execute `{command}`: {source}")]
    Exec {
        /// The interpolated command.
        command: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A task command exited with a non-zero status.
    #[error("`{command}` failed: {stderr}")]
    CommandFailed {
        /// The interpolated command.
        command: String,
        /// The exit code, if available.
        exit_code: Option<i32>,
        /// Captured stderr.
        stderr: String,
    },

    /// A task command printed something that is not UTF-8.
    #[error("`{command}` produced non-UTF-8 output")]
    InvalidOutput {
        /// The interpolated command.
        command: String,
    },

    /// A version cannot be passed to the shell (it contains a NUL byte).
    #[error("version {0:?} cannot be quoted for the shell")]
    Unquotable(String),

    /// A task reported its own failure.
    #[error("{0}")]
    Task(String),
}

/// Result alias for script operations.
pub type ScriptResult<T> = Result<T, ScriptError>;

type TaskFn = dyn Fn(&str, &str, &str) -> ScriptResult<String> + Send + Sync;

/// One scripted file: where it lives and how to transform it.
#[derive(Clone)]
pub struct ScriptEntry {
    /// Path relative to the project root.
    pub path: Utf8PathBuf,
    task: Arc<TaskFn>,
}

impl ScriptEntry {
    /// Pair a path with a task `(content, previous, release) -> content`.
    pub fn new<F>(path: impl Into<Utf8PathBuf>, task: F) -> Self
    where
        F: Fn(&str, &str, &str) -> ScriptResult<String> + Send + Sync + 'static,
    {
        Self {
            path: path.into(),
            task: Arc::new(task),
        }
    }

    /// Run the task on `content`.
    pub fn run(&self, content: &str, ctx: &BumpContext) -> ScriptResult<String> {
        (self.task)(content, &ctx.previous_version, &ctx.release_version)
    }
}

impl std::fmt::Debug for ScriptEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptEntry")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Supplies the scripted entries for a project.
///
/// How the script is found and evaluated is up to the implementation; the
/// engine only sees the resulting list.
pub trait ScriptProvider {
    /// Load the entries. Failure aborts the bump run.
    fn load(&self, project_root: &Utf8Path) -> ScriptResult<Vec<ScriptEntry>>;
}

/// A fixed, in-memory list of entries.
#[derive(Debug, Clone, Default)]
pub struct StaticScript {
    entries: Vec<ScriptEntry>,
}

impl StaticScript {
    /// Wrap `entries`.
    pub const fn new(entries: Vec<ScriptEntry>) -> Self {
        Self { entries }
    }
}

impl ScriptProvider for StaticScript {
    fn load(&self, _project_root: &Utf8Path) -> ScriptResult<Vec<ScriptEntry>> {
        Ok(self.entries.clone())
    }
}

/// Reads [`SCRIPT_FILE`] and turns each entry into a shell command task.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandScript;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ScriptManifest {
    files: Vec<CommandEntry>,
}

#[derive(Debug, Deserialize)]
struct CommandEntry {
    path: Utf8PathBuf,
    command: String,
}

impl ScriptProvider for CommandScript {
    #[instrument(skip(self))]
    fn load(&self, project_root: &Utf8Path) -> ScriptResult<Vec<ScriptEntry>> {
        let script_path = project_root.join(SCRIPT_FILE);
        if !script_path.is_file() {
            return Err(ScriptError::NotFound(script_path));
        }

        let manifest: ScriptManifest = Figment::new()
            .merge(Toml::file_exact(script_path.as_str()))
            .extract()
            .map_err(Box::new)?;
        debug!(entries = manifest.files.len(), "loaded bump script");

        Ok(manifest
            .files
            .into_iter()
            .map(|entry| {
                let root = project_root.to_path_buf();
                let command = entry.command;
                ScriptEntry::new(entry.path, move |content, previous, release| {
                    run_command(&command, &root, content, previous, release)
                })
            })
            .collect())
    }
}

/// Fill in `{prev_version}` and `{version}` with shell-quoted values.
fn interpolate_command(command: &str, previous: &str, release: &str) -> ScriptResult<String> {
    let quote = |value: &str| {
        shlex::try_quote(value)
            .map(|quoted| quoted.into_owned())
            .map_err(|_| ScriptError::Unquotable(value.to_owned()))
    };
    Ok(substitute(command, &quote(previous)?, &quote(release)?))
}

/// Run `command` through `sh -c` with `content` on stdin.
fn run_command(
    command: &str,
    cwd: &Utf8Path,
    content: &str,
    previous: &str,
    release: &str,
) -> ScriptResult<String> {
    let interpolated = interpolate_command(command, previous, release)?;
    debug!(%interpolated, "running bump script command");

    let exec_err = |source| ScriptError::Exec {
        command: interpolated.clone(),
        source,
    };

    let mut child = Command::new("sh")
        .args(["-c", &interpolated])
        .current_dir(cwd.as_std_path())
        .env(ENV_PREVIOUS_VERSION, previous)
        .env(ENV_RELEASE_VERSION, release)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(exec_err)?;

    // Feed stdin from another thread so a chatty child cannot block on a
    // full stdout pipe while we are still writing.
    let stdin = child.stdin.take();
    let input = content.to_owned();
    let writer = std::thread::spawn(move || match stdin {
        Some(mut stdin) => stdin.write_all(input.as_bytes()),
        None => Ok(()),
    });

    let output = child.wait_with_output().map_err(exec_err)?;
    match writer.join() {
        Ok(Ok(())) => {}
        // A command that ignores stdin closes the pipe early.
        Ok(Err(err)) => debug!(%err, "command did not read all of stdin"),
        Err(_) => debug!("stdin writer thread panicked"),
    }

    if !output.status.success() {
        return Err(ScriptError::CommandFailed {
            command: interpolated,
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    String::from_utf8(output.stdout).map_err(|_| ScriptError::InvalidOutput {
        command: interpolated,
    })
}

/// Apply one scripted entry to its file.
///
/// Missing files are skipped with a warning. The file is rewritten in full
/// only if the task returns different content.
#[instrument(skip(entry, ctx), fields(path = %entry.path))]
pub fn bump_scripted_file(
    entry: &ScriptEntry,
    ctx: &BumpContext,
    project_root: &Utf8Path,
    dry_run: bool,
) -> BumpResult<FileStatus> {
    let path = project_root.join(&entry.path);
    if !path.exists() {
        warn!(%path, "scripted file does not exist, skipping");
        return Ok(FileStatus::Missing);
    }

    let content = std::fs::read_to_string(&path).map_err(|source| BumpError::Read {
        path: path.clone(),
        source,
    })?;

    let updated = entry
        .run(&content, ctx)
        .map_err(|source| BumpError::ScriptTask {
            path: path.clone(),
            source,
        })?;

    if updated == content {
        debug!(%path, "script left file unchanged");
        return Ok(FileStatus::Unchanged);
    }

    if !dry_run {
        std::fs::write(&path, updated).map_err(|source| BumpError::Write {
            path: path.clone(),
            source,
        })?;
    }
    info!(%path, dry_run, "scripted file bumped");
    Ok(FileStatus::Modified)
}

/// Apply every entry in order and report whether any file changed.
pub fn bump_with_script(
    entries: &[ScriptEntry],
    ctx: &BumpContext,
    project_root: &Utf8Path,
    dry_run: bool,
) -> BumpResult<bool> {
    let mut any_modified = false;
    for entry in entries {
        let status = bump_scripted_file(entry, ctx, project_root, dry_run)?;
        any_modified |= status == FileStatus::Modified;
    }
    Ok(any_modified)
}
