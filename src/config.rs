//! Configuration types for the format runner

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Configuration for one run
///
/// Built from CLI arguments alone, or from a TOML file with CLI arguments
/// overriding the file's settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Apply edits in place instead of printing diffs
    pub in_place: bool,

    /// Path to the clang-format binary (default: search $PATH)
    pub binary: Option<PathBuf>,

    /// Formatting style forwarded to the tool (LLVM, GNU, Google, ...)
    pub style: Option<String>,

    /// Number of formatter processes run in parallel (0 = auto)
    pub jobs: usize,

    /// Verbose output
    pub verbose: bool,

    /// Files or directories to process
    pub paths: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            in_place: false,
            binary: None,
            style: None,
            jobs: 0, // Auto-detect
            verbose: false,
            paths: vec![PathBuf::from(".")],
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config = toml::from_str(&content).map_err(|e| Error::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Resolved worker limit: explicit jobs, else the host's available
    /// parallelism. Always at least 1.
    pub fn worker_limit(&self) -> usize {
        if self.jobs > 0 {
            self.jobs
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }
}
