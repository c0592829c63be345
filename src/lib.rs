//! Parallel clang-format runner
//!
//! This library runs clang-format over a source tree with support for:
//! - Recursive file discovery filtered by source extension
//! - A bounded worker pool with completion-order result delivery
//! - Unified diff output in check mode, in-place edits with -i
//! - Clean Ctrl-C handling: in-flight formatters are killed and reaped
//! - Exit status 1 when any file failed or would be changed

pub mod cli;
pub mod config;
pub mod discover;
pub mod error;
pub mod invocation;
pub mod report;
pub mod runner;
pub mod scheduler;

pub use cli::Cli;
pub use config::Config;
pub use discover::find_files;
pub use error::{Error, Result};
pub use invocation::{DEFAULT_BINARY, build_invocation, find_binary, verify_binary};
pub use report::{Mode, Reporter};
pub use runner::{RunOptions, RunResult};
pub use scheduler::{CancelToken, FormatRun, spawn_all};
