//! Parallel clang-format runner
//!
//! Discovers source files, runs clang-format over them under a bounded
//! concurrency limit, and reports unified diffs (check mode) or in-place
//! edits, with an exit status summarizing whether anything changed.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use run_clang_format::{
    CancelToken, Cli, Config, DEFAULT_BINARY, Mode, Reporter, RunOptions, find_binary, find_files,
    scheduler, verify_binary,
};

/// Exit status for a user-interrupted run; the failure/diff-derived code
/// is never computed on this path.
const EXIT_INTERRUPTED: i32 = 130;

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli);

    let config = load_config(&cli)?;
    if config.verbose {
        info!(?config, "Configuration loaded");
    }

    // Preflight: resolve the binary and make sure it actually runs.
    let binary = find_binary(config.binary.as_deref(), DEFAULT_BINARY)?;
    verify_binary(&binary).context("Unable to run clang-format")?;

    let files = find_files(&config.paths);
    if files.is_empty() {
        if config.verbose {
            println!("No files found to format.");
        }
        return Ok(());
    }

    if config.verbose {
        let action = if config.in_place {
            "Formatting"
        } else {
            "Checking"
        };
        println!("{action} {} files ...", files.len());
    }

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel()).context("Failed to set Ctrl-C handler")?;

    let options = RunOptions {
        binary,
        style: config.style.clone(),
        in_place: config.in_place,
    };
    let mode = if config.in_place {
        Mode::InPlace
    } else {
        Mode::Check
    };
    let mut reporter = Reporter::new(mode, config.verbose, files.len());

    let run = scheduler::spawn_all(files, options, config.worker_limit(), cancel.clone())?;
    for result in run {
        reporter.consume(result);
    }

    if cancel.is_cancelled() {
        // The result stream already drained: every child is reaped and
        // pending tasks never started.
        println!("\nCtrl-C detected, goodbye.");
        std::process::exit(EXIT_INTERRUPTED);
    }

    std::process::exit(reporter.exit_code());
}

/// Diagnostics go to stderr via tracing; stdout is reserved for diffs and
/// progress output.
fn setup_logging(cli: &Cli) {
    let level = if cli.verbose { Level::INFO } else { Level::WARN };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load configuration from file or CLI arguments
fn load_config(cli: &Cli) -> Result<Config> {
    let config = if let Some(ref config_path) = cli.config {
        info!(config_file = %config_path.display(), "Loading configuration from file");
        let file_config = Config::load_from_file(config_path)?;
        cli.merge_with_config(file_config)
    } else {
        cli.to_config()
    };

    Ok(config)
}
