//! Version bump execution.
//!
//! All orchestration logic lives here. The CLI is purely a display layer.
//!
//! # Flow
//!
//! 1. [`run`] walks the configured [`FileSpec`] list in order.
//! 2. Files flagged `scripted` go to [`crate::script`]; everything else goes
//!    through a [`FileBumper`].
//! 3. The per-file results are collected into a [`BumpOutcome`] whose
//!    `any_modified` flag tells the caller whether a commit is warranted.
//!
//! Files are independent. A failure stops the run but files already
//! rewritten stay rewritten.

use std::collections::HashSet;

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::{FileSpec, RegexRule};
use crate::content::{FileContent, LineEnding};
use crate::guard::GuardedLineSelector;
use crate::literal::LiteralReplacer;
use crate::script::{self, ScriptEntry, ScriptError, ScriptProvider};
use crate::version::BumpContext;

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// Errors from bump operations.
#[derive(Error, Debug)]
pub enum BumpError {
    /// A target file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that failed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A target file could not be rewritten.
    #[error("failed to write {path}: {source}")]
    Write {
        /// File that failed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The version literal could not be compiled into a pattern.
    #[error("cannot match version literal: {0}")]
    Pattern(#[from] regex::Error),

    /// A `regex_replace` rule does not compile.
    #[error("invalid regex_replace rule `{regex}` for {path}: {source}")]
    InvalidRule {
        /// File the rule belongs to.
        path: Utf8PathBuf,
        /// The offending pattern.
        regex: String,
        /// Compile error.
        source: regex::Error,
    },

    /// The bump script could not be loaded.
    #[error("failed to load bump script: {0}")]
    ScriptLoad(#[source] ScriptError),

    /// A script task failed for one file.
    #[error("bump script failed for {path}: {source}")]
    ScriptTask {
        /// File being transformed.
        path: Utf8PathBuf,
        /// What went wrong.
        source: ScriptError,
    },
}

/// Result alias for bump operations.
pub type BumpResult<T> = Result<T, BumpError>;

// ──────────────────────────────────────────────
// Outcome types
// ──────────────────────────────────────────────

/// What happened to a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileStatus {
    /// The file was rewritten (or would be, in a dry run).
    Modified,
    /// Nothing to replace.
    Unchanged,
    /// The path does not exist; skipped with a warning.
    Missing,
    /// The file is flagged `scripted` but the script has no task for it.
    NoTask,
}

/// Which path a file went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BumpMethod {
    /// Literal matcher, guarded or not.
    Pattern,
    /// Bump script task.
    Script,
}

/// Per-file entry in a [`BumpOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// Path as configured (relative to the project root).
    pub path: Utf8PathBuf,
    /// How the file was processed.
    pub method: BumpMethod,
    /// Result for this file.
    pub status: FileStatus,
}

/// Result of a bump run.
#[derive(Debug, Clone, Serialize)]
pub struct BumpOutcome {
    /// Literal that was searched for.
    pub previous: String,
    /// Literal written in its place.
    pub release: String,
    /// The previous version was a snapshot.
    pub snapshot_release: bool,
    /// No file was written.
    pub dry_run: bool,
    /// At least one file changed; the signal for committing the bump.
    pub any_modified: bool,
    /// Every processed file, in processing order.
    pub files: Vec<FileReport>,
}

impl BumpOutcome {
    /// Paths of files that changed.
    pub fn modified_files(&self) -> impl Iterator<Item = &Utf8Path> {
        self.files_with(FileStatus::Modified)
    }

    /// Paths of files that were configured but do not exist.
    pub fn missing_files(&self) -> impl Iterator<Item = &Utf8Path> {
        self.files_with(FileStatus::Missing)
    }

    fn files_with(&self, status: FileStatus) -> impl Iterator<Item = &Utf8Path> {
        self.files
            .iter()
            .filter(move |f| f.status == status)
            .map(|f| f.path.as_path())
    }
}

// ──────────────────────────────────────────────
// Single file
// ──────────────────────────────────────────────

/// Rewrites one version literal in plain-text files.
///
/// Build once per run; the literal patterns are compiled up front and shared
/// across files.
#[derive(Debug)]
pub struct FileBumper<'c> {
    ctx: &'c BumpContext,
    replacer: LiteralReplacer,
    default_ending: LineEnding,
    dry_run: bool,
}

impl<'c> FileBumper<'c> {
    /// Prepare a bumper for `ctx`.
    pub fn new(ctx: &'c BumpContext) -> BumpResult<Self> {
        Ok(Self {
            ctx,
            replacer: LiteralReplacer::new(&ctx.previous_version, &ctx.release_version)?,
            default_ending: LineEnding::platform_default(),
            dry_run: false,
        })
    }

    /// Ending used for files that contain no `\r`.
    #[must_use]
    pub const fn with_default_ending(mut self, ending: LineEnding) -> Self {
        self.default_ending = ending;
        self
    }

    /// Compute results without writing anything.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Bump the file at `path`.
    ///
    /// A missing file is skipped with a warning. The file is only written
    /// when at least one line changed.
    #[instrument(skip(self, rules))]
    pub fn bump(
        &self,
        path: &Utf8Path,
        safe_matching: bool,
        rules: &[RegexRule],
    ) -> BumpResult<FileStatus> {
        let rules = compile_rules(path, rules, self.ctx)?;

        if !path.exists() {
            warn!(%path, "file does not exist, skipping");
            return Ok(FileStatus::Missing);
        }

        let bytes = std::fs::read(path).map_err(|source| BumpError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8(bytes).map_err(|e| BumpError::Read {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;

        let content = FileContent::parse(&text, self.default_ending);
        let Some(lines) = self.rewrite(&content.lines, safe_matching, &rules) else {
            debug!(%path, "no version literal to replace");
            return Ok(FileStatus::Unchanged);
        };

        let updated = FileContent {
            line_ending: content.line_ending,
            lines,
        };
        if !self.dry_run {
            std::fs::write(path, updated.render()).map_err(|source| BumpError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }

        info!(
            %path,
            line_ending = %content.line_ending,
            dry_run = self.dry_run,
            "file bumped"
        );
        Ok(FileStatus::Modified)
    }

    /// Run every line through the selector (or the bare matcher), then the
    /// extra rules. Returns `None` if no line changed.
    fn rewrite(
        &self,
        lines: &[String],
        safe_matching: bool,
        rules: &[CompiledRule],
    ) -> Option<Vec<String>> {
        let mut selector = GuardedLineSelector::new(&self.replacer);
        let mut modified = false;

        let out = lines
            .iter()
            .map(|line| {
                let replaced = if safe_matching {
                    selector.process(line)
                } else {
                    self.replacer.replace(line)
                };
                let replaced = rules
                    .iter()
                    .fold(replaced.into_owned(), |acc, rule| rule.apply(&acc));
                modified |= replaced != *line;
                replaced
            })
            .collect();

        modified.then_some(out)
    }
}

/// A `regex_replace` rule ready to apply.
#[derive(Debug)]
struct CompiledRule {
    re: Regex,
    value: String,
}

impl CompiledRule {
    fn apply(&self, line: &str) -> String {
        self.re.replace_all(line, self.value.as_str()).into_owned()
    }
}

fn compile_rules(
    path: &Utf8Path,
    rules: &[RegexRule],
    ctx: &BumpContext,
) -> BumpResult<Vec<CompiledRule>> {
    rules
        .iter()
        .map(|rule| {
            let re = Regex::new(&rule.regex).map_err(|source| BumpError::InvalidRule {
                path: path.to_path_buf(),
                regex: rule.regex.clone(),
                source,
            })?;
            Ok(CompiledRule {
                re,
                value: ctx.interpolate(&rule.value),
            })
        })
        .collect()
}

/// Bump a single file with default options.
///
/// Convenience over [`FileBumper`] for one-off use; returns whether the
/// file was modified.
pub fn bump_file(path: &Utf8Path, ctx: &BumpContext, safe_matching: bool) -> BumpResult<bool> {
    let status = FileBumper::new(ctx)?.bump(path, safe_matching, &[])?;
    Ok(status == FileStatus::Modified)
}

// ──────────────────────────────────────────────
// Orchestration
// ──────────────────────────────────────────────

/// Run-wide switches.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Also run every script entry not covered by a file spec.
    pub scripted: bool,
    /// Ending for files that contain no `\r`.
    pub default_ending: LineEnding,
    /// Report without writing.
    pub dry_run: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            scripted: false,
            default_ending: LineEnding::platform_default(),
            dry_run: false,
        }
    }
}

/// Bump every file in `specs`, in order.
///
/// The script is loaded at most once, and only if a spec is `scripted` or
/// `options.scripted` is set. A file is handled by exactly one method: the
/// global script pass skips paths that already appeared in `specs`.
#[instrument(skip_all, fields(
    root = %project_root,
    previous = %ctx.previous_version,
    release = %ctx.release_version,
    files = specs.len(),
))]
pub fn run(
    project_root: &Utf8Path,
    specs: &[FileSpec],
    ctx: &BumpContext,
    options: RunOptions,
    scripts: &dyn ScriptProvider,
) -> BumpResult<BumpOutcome> {
    let bumper = FileBumper::new(ctx)?
        .with_default_ending(options.default_ending)
        .with_dry_run(options.dry_run);

    let mut loaded: Option<Vec<ScriptEntry>> = None;
    let mut handled: HashSet<&Utf8Path> = HashSet::new();
    let mut files = Vec::with_capacity(specs.len());

    for spec in specs {
        handled.insert(spec.path.as_path());

        if spec.scripted {
            let entries = load_script(&mut loaded, scripts, project_root)?;
            let mut tasks = entries.iter().filter(|e| e.path == spec.path).peekable();
            if tasks.peek().is_none() {
                warn!(path = %spec.path, "no script task declared for scripted file, skipping");
                files.push(report(&spec.path, BumpMethod::Script, FileStatus::NoTask));
                continue;
            }
            let mut status = FileStatus::Unchanged;
            for entry in tasks {
                match script::bump_scripted_file(entry, ctx, project_root, options.dry_run)? {
                    FileStatus::Unchanged => {}
                    other => status = other,
                }
            }
            files.push(report(&spec.path, BumpMethod::Script, status));
        } else {
            let status = bumper.bump(
                &project_root.join(&spec.path),
                spec.safe_matching,
                &spec.regex_replace,
            )?;
            files.push(report(&spec.path, BumpMethod::Pattern, status));
        }
    }

    if options.scripted {
        let entries = load_script(&mut loaded, scripts, project_root)?;
        for entry in entries.iter().filter(|e| !handled.contains(e.path.as_path())) {
            let status = script::bump_scripted_file(entry, ctx, project_root, options.dry_run)?;
            files.push(report(&entry.path, BumpMethod::Script, status));
        }
    }

    let any_modified = files.iter().any(|f| f.status == FileStatus::Modified);
    info!(
        any_modified,
        modified = files
            .iter()
            .filter(|f| f.status == FileStatus::Modified)
            .count(),
        "bump complete"
    );

    Ok(BumpOutcome {
        previous: ctx.previous_version.clone(),
        release: ctx.release_version.clone(),
        snapshot_release: ctx.snapshot_release,
        dry_run: options.dry_run,
        any_modified,
        files,
    })
}

fn load_script<'s>(
    cache: &'s mut Option<Vec<ScriptEntry>>,
    provider: &dyn ScriptProvider,
    project_root: &Utf8Path,
) -> BumpResult<&'s [ScriptEntry]> {
    if cache.is_none() {
        let entries = provider
            .load(project_root)
            .map_err(BumpError::ScriptLoad)?;
        debug!(entries = entries.len(), "bump script loaded");
        *cache = Some(entries);
    }
    Ok(cache.as_deref().unwrap_or_default())
}

fn report(path: &Utf8Path, method: BumpMethod, status: FileStatus) -> FileReport {
    FileReport {
        path: path.to_path_buf(),
        method,
        status,
    }
}
