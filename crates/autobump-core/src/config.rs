//! Configuration schema, discovery and loading.
//!
//! Sources, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. `config.<ext>` in the user config directory (`~/.config/autobump/`)
//! 3. `.autobump.<ext>` or `autobump.<ext>` in the search directory or the
//!    nearest ancestor that has one, not looking past the repository root
//! 4. Files passed with `--config`, later ones winning
//!
//! `<ext>` is `toml`, `yaml`, `yml` or `json`, tried in that order.
//!
//! ```no_run
//! use autobump_core::config::ConfigLoader;
//! use camino::Utf8Path;
//!
//! let config = ConfigLoader::new()
//!     .with_project_search(Utf8Path::new("."))
//!     .load()
//!     .unwrap();
//! let files = config.bump.unwrap_or_default().files;
//! ```

use std::collections::HashSet;

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::content::LineEnding;
use crate::error::{ConfigError, ConfigResult};
use crate::version::DEFAULT_SNAPSHOT_SUFFIX;

const APP_NAME: &str = "autobump";

const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

/// A directory containing this entry is a repository root.
const REPO_BOUNDARY: &str = ".git";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Default log filter when neither `-v`, `-q` nor `RUST_LOG` is given.
    pub log_level: LogLevel,
    /// Directory for JSONL log files.
    pub log_dir: Option<Utf8PathBuf>,
    /// What to bump.
    pub bump: Option<BumpConfig>,
}

/// The `[bump]` section.
///
/// ```toml
/// [bump]
/// scripted = true
///
/// [[bump.files]]
/// path = "src/version.ts"
///
/// [[bump.files]]
/// path = "docs/install.md"
/// safe_matching = false
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct BumpConfig {
    /// Version to bump from when none is given on the command line.
    pub current_version: Option<String>,
    /// Suffix that marks a snapshot version (empty disables snapshot handling).
    pub snapshot_suffix: String,
    /// Also run every entry of the project's bump script, not only files
    /// flagged `scripted`.
    pub scripted: bool,
    /// Ending for rewritten files that contain no `\r` at all.
    pub default_line_ending: Option<LineEnding>,
    /// Files to update, in order.
    pub files: Vec<FileSpec>,
}

impl Default for BumpConfig {
    fn default() -> Self {
        Self {
            current_version: None,
            snapshot_suffix: DEFAULT_SNAPSHOT_SUFFIX.to_string(),
            scripted: false,
            default_line_ending: None,
            files: Vec::new(),
        }
    }
}

impl BumpConfig {
    /// The configured fallback ending, or the platform's.
    pub fn line_ending(&self) -> LineEnding {
        self.default_line_ending
            .unwrap_or_else(LineEnding::platform_default)
    }

    /// Reject file lists the bump run cannot process unambiguously.
    pub fn validate(&self) -> ConfigResult<()> {
        let mut seen = HashSet::new();
        for (index, spec) in self.files.iter().enumerate() {
            if spec.path.as_str().trim().is_empty() {
                return Err(ConfigError::EmptyPath(index));
            }
            if !seen.insert(spec.path.as_str()) {
                return Err(ConfigError::DuplicatePath(spec.path.to_string()));
            }
        }
        Ok(())
    }
}

/// One file to bump.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct FileSpec {
    /// Path relative to the project root.
    pub path: Utf8PathBuf,
    /// Only replace on lines selected by `$auto-bumper` markers.
    #[serde(default = "default_true")]
    pub safe_matching: bool,
    /// Hand the file to the bump script instead of the literal matcher.
    #[serde(default)]
    pub scripted: bool,
    /// Extra replacements applied to every line after the literal pass.
    #[serde(default)]
    pub regex_replace: Vec<RegexRule>,
}

impl FileSpec {
    /// A spec with default options for `path`.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: path.into(),
            safe_matching: true,
            scripted: false,
            regex_replace: Vec::new(),
        }
    }
}

/// A user-supplied `{ regex, value }` replacement.
///
/// `value` may reference capture groups (`$1`, `${name}`) and the
/// `{version}` / `{prev_version}` variables.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RegexRule {
    /// Pattern matched against each line.
    pub regex: String,
    /// Replacement text.
    pub value: String,
}

const fn default_true() -> bool {
    true
}

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Debug.
    Debug,
    /// Info.
    #[default]
    Info,
    /// Warn.
    Warn,
    /// Error.
    Error,
}

impl LogLevel {
    /// Filter directive for this level.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Builder that merges every configuration source into a [`Config`].
#[derive(Debug)]
pub struct ConfigLoader {
    search_from: Option<Utf8PathBuf>,
    user_config: bool,
    overrides: Vec<Utf8PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Defaults plus user config. Nothing is searched until
    /// [`with_project_search`](Self::with_project_search) is called.
    pub const fn new() -> Self {
        Self {
            search_from: None,
            user_config: true,
            overrides: Vec::new(),
        }
    }

    /// Look for a project config starting at `dir`.
    pub fn with_project_search(mut self, dir: impl AsRef<Utf8Path>) -> Self {
        self.search_from = Some(dir.as_ref().to_owned());
        self
    }

    /// Leave the user config directory out.
    pub const fn without_user_config(mut self) -> Self {
        self.user_config = false;
        self
    }

    /// Layer `path` over everything discovered. Must exist.
    pub fn with_file(mut self, path: impl AsRef<Utf8Path>) -> Self {
        self.overrides.push(path.as_ref().to_owned());
        self
    }

    /// Merge all sources and validate the `[bump]` section.
    #[instrument(skip(self), fields(search_from = ?self.search_from))]
    pub fn load(self) -> ConfigResult<Config> {
        let user = self.user_config.then(find_user_config).flatten();
        let project = self.search_from.as_deref().and_then(find_project_config);

        let figment = user
            .iter()
            .chain(project.iter())
            .chain(self.overrides.iter())
            .fold(
                Figment::from(Serialized::defaults(Config::default())),
                |figment, path| {
                    debug!(%path, "merging config file");
                    merge_file(figment, path)
                },
            );

        let config: Config = figment.extract().map_err(Box::new)?;
        if let Some(bump) = &config.bump {
            bump.validate()?;
        }
        tracing::info!(
            files = config.bump.as_ref().map_or(0, |b| b.files.len()),
            "configuration loaded"
        );
        Ok(config)
    }
}

fn merge_file(figment: Figment, path: &Utf8Path) -> Figment {
    match path.extension() {
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
        Some("json") => figment.merge(Json::file_exact(path)),
        _ => figment.merge(Toml::file_exact(path)),
    }
}

/// The project config [`ConfigLoader::load`] would pick up from `start`.
///
/// Each directory prefers `.autobump.<ext>` over `autobump.<ext>`. The walk
/// ends after the first directory that contains `.git`.
pub fn find_project_config(start: &Utf8Path) -> Option<Utf8PathBuf> {
    for dir in start.ancestors() {
        let found = CONFIG_EXTENSIONS.iter().find_map(|ext| {
            [format!(".{APP_NAME}.{ext}"), format!("{APP_NAME}.{ext}")]
                .into_iter()
                .map(|name| dir.join(name))
                .find(|path| path.is_file())
        });
        if found.is_some() {
            return found;
        }
        if dir.join(REPO_BOUNDARY).exists() {
            break;
        }
    }
    None
}

fn find_user_config() -> Option<Utf8PathBuf> {
    let dir = user_config_dir()?;
    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("config.{ext}")))
        .find(|path| path.is_file())
}

/// `~/.config/autobump/` or the platform equivalent.
pub fn user_config_dir() -> Option<Utf8PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", APP_NAME)?;
    Utf8PathBuf::from_path_buf(dirs.config_dir().to_path_buf()).ok()
}
