//! CLI argument parsing with clap

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// Runs clang-format over all files in a directory tree.
///
/// Without -i, files are left untouched and a unified diff between the
/// current content and the formatter's output is printed for every file
/// that would change. Requires clang-format in $PATH unless overridden.
#[derive(Parser, Debug)]
#[command(name = "run-clang-format")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (TOML format)
    ///
    /// When specified, settings from the config file are used as defaults.
    /// CLI arguments will override config file settings.
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Apply edits to files instead of displaying diffs
    #[arg(short = 'i')]
    pub in_place: bool,

    /// Path to clang-format binary
    #[arg(long, value_name = "PATH")]
    pub clang_format_binary: Option<PathBuf>,

    /// Formatting style to apply (LLVM, GNU, Google, Chromium, Microsoft,
    /// Mozilla, WebKit, file)
    #[arg(long)]
    pub style: Option<String>,

    /// Number of format instances to be run in parallel (0 = auto)
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Be more verbose
    #[arg(short, long)]
    pub verbose: bool,

    /// Files or directories to be processed
    pub paths: Vec<PathBuf>,
}

impl Cli {
    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if self.in_place {
            config.in_place = true;
        }
        if let Some(ref binary) = self.clang_format_binary {
            config.binary = Some(binary.clone());
        }
        if let Some(ref style) = self.style {
            config.style = Some(style.clone());
        }
        if let Some(jobs) = self.jobs {
            config.jobs = jobs;
        }
        if self.verbose {
            config.verbose = true;
        }
        if !self.paths.is_empty() {
            config.paths = self.paths.clone();
        }

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }
}
