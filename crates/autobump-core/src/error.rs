//! Error types for autobump-core

use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),

    /// A `[[bump.files]]` entry has an empty `path`.
    #[error("bump.files[{0}] has an empty path")]
    EmptyPath(usize),

    /// The same path is listed twice in `[[bump.files]]`.
    #[error("{0} is listed more than once in bump.files")]
    DuplicatePath(String),
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;
