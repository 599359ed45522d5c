//! Version context for a bump run.
//!
//! The engine never interprets version strings: it searches for
//! [`BumpContext::previous_version`] and writes
//! [`BumpContext::release_version`]. This module is where those two strings
//! come from: an explicit value, a semver bump level, or a snapshot release
//! that reuses the previous version without its pre-release suffix.

use camino::{Utf8Path, Utf8PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use semver::Version;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

/// Pre-release suffix that marks a snapshot version by default.
pub const DEFAULT_SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Maven project file consulted for the current version.
pub const POM_FILE: &str = "pom.xml";

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(prev_version|version)\}").expect("placeholder pattern is valid")
});

/// Replace `{prev_version}` and `{version}` in one pass, so text substituted
/// for one placeholder is never scanned for the other.
pub(crate) fn substitute(template: &str, previous: &str, release: &str) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| {
            let value = if &caps[1] == "version" { release } else { previous };
            value.to_owned()
        })
        .into_owned()
}

/// Errors from version operations.
#[derive(Error, Debug)]
pub enum VersionError {
    /// Failed to parse a semver string.
    #[error("invalid semver: {0}")]
    InvalidSemver(#[from] semver::Error),

    /// A version string was empty.
    #[error("{0} version must not be empty")]
    Empty(&'static str),

    /// A git operation failed while looking up the current version.
    #[error("git error: {0}")]
    Git(#[from] crate::git::GitError),

    /// `pom.xml` exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Pom {
        /// Path of the pom file.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Result alias for version operations.
pub type VersionResult<T> = Result<T, VersionError>;

/// Semver bump level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpLevel {
    /// Patch release (x.y.Z).
    #[default]
    Patch,
    /// Minor release (x.Y.0).
    Minor,
    /// Major release (X.0.0).
    Major,
}

impl std::fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Patch => write!(f, "patch"),
            Self::Minor => write!(f, "minor"),
            Self::Major => write!(f, "major"),
        }
    }
}

/// Compute the next version by applying a bump level.
///
/// Returns `None` if the incremented component would overflow.
pub fn next_version(current: &Version, level: BumpLevel) -> Option<Version> {
    let next = match level {
        BumpLevel::Patch => {
            Version::new(current.major, current.minor, current.patch.checked_add(1)?)
        }
        BumpLevel::Minor => Version::new(current.major, current.minor.checked_add(1)?, 0),
        BumpLevel::Major => Version::new(current.major.checked_add(1)?, 0, 0),
    };
    Some(next)
}

/// Parse a version string, stripping an optional `v` prefix.
pub fn parse_version(s: &str) -> VersionResult<Version> {
    let s = s.strip_prefix('v').unwrap_or(s);
    Ok(Version::parse(s)?)
}

/// How the release version is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseTarget {
    /// Use this string verbatim.
    Explicit(String),
    /// Increment the previous version.
    Level(BumpLevel),
}

/// The two version strings a bump run works with, passed explicitly to
/// every file operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BumpContext {
    /// Literal searched for in files.
    pub previous_version: String,
    /// Literal written in its place.
    pub release_version: String,
    /// The previous version carried the snapshot suffix.
    pub snapshot_release: bool,
}

impl BumpContext {
    /// Build a context from two non-empty version strings.
    pub fn new(previous: impl Into<String>, release: impl Into<String>) -> VersionResult<Self> {
        let previous_version = previous.into();
        let release_version = release.into();
        if previous_version.is_empty() {
            return Err(VersionError::Empty("previous"));
        }
        if release_version.is_empty() {
            return Err(VersionError::Empty("release"));
        }
        Ok(Self {
            previous_version,
            release_version,
            snapshot_release: false,
        })
    }

    /// Replace `{version}` and `{prev_version}` in `template`.
    pub fn interpolate(&self, template: &str) -> String {
        substitute(template, &self.previous_version, &self.release_version)
    }
}

/// Work out the release version for `previous`.
///
/// A previous version ending in `snapshot_suffix` is a snapshot release:
/// unless an explicit target is given, the release version is the previous
/// version with the suffix removed and no increment is computed.
///
/// Returns `Ok(None)` when no usable release version exists: a bump level
/// applied to something that is not semver or that cannot be incremented
/// without overflow, or an empty explicit target.
/// Callers skip the bump in that case.
#[instrument]
pub fn resolve_context(
    previous: &str,
    target: &ReleaseTarget,
    snapshot_suffix: &str,
) -> VersionResult<Option<BumpContext>> {
    let previous = previous.trim();
    if previous.is_empty() {
        return Err(VersionError::Empty("previous"));
    }

    let snapshot_base = (!snapshot_suffix.is_empty())
        .then(|| previous.strip_suffix(snapshot_suffix))
        .flatten()
        .filter(|base| !base.is_empty());

    let release = match (target, snapshot_base) {
        (ReleaseTarget::Explicit(v), _) => {
            let v = v.trim();
            if v.is_empty() {
                debug!("explicit release version is empty");
                return Ok(None);
            }
            v.to_owned()
        }
        (ReleaseTarget::Level(_), Some(base)) => {
            debug!(%base, "snapshot release reuses the previous version");
            base.to_owned()
        }
        (ReleaseTarget::Level(level), None) => {
            let current = match parse_version(previous) {
                Ok(current) => current,
                Err(err) => {
                    debug!(%err, "previous version is not semver, no increment");
                    return Ok(None);
                }
            };
            let Some(next) = next_version(&current, *level) else {
                debug!(%current, %level, "version component overflows, no increment");
                return Ok(None);
            };
            next.to_string()
        }
    };

    let mut ctx = BumpContext::new(previous, release)?;
    ctx.snapshot_release = snapshot_base.is_some();
    debug!(
        previous = %ctx.previous_version,
        release = %ctx.release_version,
        snapshot = ctx.snapshot_release,
        "resolved bump context"
    );
    Ok(Some(ctx))
}

/// Find the version currently in effect.
///
/// Precedence: `explicit` (CLI), `configured` (config file), the
/// `<project><version>` of `pom.xml` in `project_root`, then the latest `v*`
/// git tag with its `v` prefix removed.
#[instrument(skip(explicit, configured))]
pub fn current_version(
    explicit: Option<&str>,
    configured: Option<&str>,
    project_root: &Utf8Path,
) -> VersionResult<Option<String>> {
    if let Some(v) = explicit.or(configured) {
        return Ok(Some(v.to_owned()));
    }

    let pom = project_root.join(POM_FILE);
    match std::fs::read_to_string(&pom) {
        Ok(content) => {
            if let Some(v) = crate::pom::project_version(&content) {
                debug!(version = %v, "current version from pom.xml");
                return Ok(Some(v));
            }
            debug!("pom.xml has no project version");
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(source) => return Err(VersionError::Pom { path: pom, source }),
    }

    let tag = crate::git::latest_version_tag(project_root)?;
    Ok(tag.map(|t| t.strip_prefix('v').unwrap_or(&t).to_owned()))
}
