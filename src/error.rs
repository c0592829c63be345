//! Error types for the format runner

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for format runner operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the format runner
#[derive(Error, Debug)]
pub enum Error {
    #[error("passed binary '{}' was not found or is not executable", path.display())]
    BinaryNotExecutable { path: PathBuf },

    #[error("failed to find {name} in $PATH")]
    BinaryNotFound { name: String },

    #[error("unable to run {}: {message}", binary.display())]
    VersionCheck { binary: PathBuf, message: String },

    #[error("failed to read config file '{}': {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{}': {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
