//! Core library for autobump.
//!
//! Rewrites a version literal in a set of project files. The CLI is a thin
//! display layer over this crate; everything that touches files lives here.
//!
//! # Modules
//!
//! - [`bump`] - Per-file bumping and the run over all configured files
//! - [`config`] - Configuration loading and management
//! - [`content`] - Line splitting and line-ending detection
//! - [`error`] - Configuration error types and result aliases
//! - [`git`] - Latest version tag lookup
//! - [`guard`] - Marker-comment line selection
//! - [`literal`] - Quoted version literal replacement
//! - [`pom`] - Maven `pom.xml` version lookup
//! - [`script`] - Scripted file transforms
//! - [`version`] - Previous and release version resolution
//!
//! # Quick Start
//!
//! ```no_run
//! use autobump_core::bump::{self, RunOptions};
//! use autobump_core::script::CommandScript;
//! use autobump_core::{BumpContext, ConfigLoader};
//! use camino::Utf8Path;
//!
//! let root = Utf8Path::new(".");
//! let config = ConfigLoader::new()
//!     .with_project_search(root)
//!     .load()
//!     .expect("Failed to load configuration");
//! let bump_config = config.bump.unwrap_or_default();
//!
//! let ctx = BumpContext::new("1.0.0", "1.1.0").expect("non-empty versions");
//! let outcome = bump::run(
//!     root,
//!     &bump_config.files,
//!     &ctx,
//!     RunOptions::default(),
//!     &CommandScript,
//! )
//! .expect("bump failed");
//!
//! println!("modified: {}", outcome.any_modified);
//! ```
#![deny(unsafe_code)]

pub mod bump;

pub mod config;

pub mod content;

pub mod error;

pub mod git;

pub mod guard;

pub mod literal;

pub mod pom;

pub mod script;

pub mod version;

pub use bump::{BumpError, BumpOutcome, BumpResult, FileBumper, FileStatus};
pub use config::{BumpConfig, Config, ConfigLoader, FileSpec, LogLevel};
pub use content::LineEnding;
pub use error::{ConfigError, ConfigResult};
pub use version::{BumpContext, BumpLevel, ReleaseTarget};

// Re-export semver so downstream crates don't need a direct dependency.
pub use semver;
