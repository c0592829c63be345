//! Completion-order result aggregation and reporting
//!
//! Consumes `RunResult`s as they arrive, prints progress lines, unified
//! diffs and tool stderr, and derives the final exit status. All printing
//! happens on the single consumer thread, so output for one file is never
//! interleaved with another's.

use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;

use similar::TextDiff;

use crate::runner::RunResult;

/// Unified diff context lines either side of a change
const DIFF_CONTEXT: usize = 3;

/// Run mode, fixed for the whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The tool rewrites files via `-i`; no diffs are computed
    InPlace,
    /// The tool's stdout is compared against the pre-run snapshot
    Check,
}

/// Aggregates per-file results and derives the final exit status.
#[derive(Debug)]
pub struct Reporter {
    mode: Mode,
    verbose: bool,
    total: usize,
    completed: usize,
    any_failure: bool,
    any_diff: bool,
}

impl Reporter {
    pub fn new(mode: Mode, verbose: bool, total: usize) -> Self {
        Self {
            mode,
            verbose,
            total,
            completed: 0,
            any_failure: false,
            any_diff: false,
        }
    }

    /// Consume one result in completion order.
    pub fn consume(&mut self, mut result: RunResult) {
        self.completed += 1;

        if result.exit_code != 0 {
            self.any_failure = true;
            if result.exit_code < 0 {
                result.stderr.push_str(&format!(
                    "{}: terminated by signal {}\n",
                    result.file.display(),
                    -result.exit_code
                ));
            }
        }

        if let Some(line) = self.progress_line(&result) {
            println!("{line}");
        }

        if self.mode == Mode::Check {
            if let Some(original) = &result.original_content {
                if *original != result.stdout {
                    self.any_diff = true;
                    print!("{}", render_diff(original, &result.stdout, &result.file));
                }
            }
        }

        if !result.stderr.is_empty() {
            eprintln!("{}", result.stderr);
        }
    }

    /// Verbose progress/invocation line, printed for in-place runs only;
    /// check-mode output is diffs and stderr.
    fn progress_line(&self, result: &RunResult) -> Option<String> {
        if self.verbose && self.mode == Mode::InPlace {
            Some(format!(
                "{} {}",
                progress_marker(self.completed, self.total, result.elapsed),
                join_invocation(&result.invocation)
            ))
        } else {
            None
        }
    }

    pub fn any_failure(&self) -> bool {
        self.any_failure
    }

    pub fn any_diff(&self) -> bool {
        self.any_diff
    }

    /// Final process exit status once the result stream is drained.
    pub fn exit_code(&self) -> i32 {
        if self.any_failure || (self.mode == Mode::Check && self.any_diff) {
            1
        } else {
            0
        }
    }
}

/// `[i/N][<elapsed>s]` with `i` right-aligned to the digit width of `N`
pub fn progress_marker(completed: usize, total: usize, elapsed: Duration) -> String {
    let width = total.to_string().len();
    format!(
        "[{completed:>width$}/{total}][{:.1}s]",
        elapsed.as_secs_f64()
    )
}

fn join_invocation(invocation: &[OsString]) -> String {
    invocation
        .iter()
        .map(|arg| arg.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Unified diff between the snapshot and the formatter's output, headed
/// with the file path and before/after formatting tags.
pub fn render_diff(original: &str, formatted: &str, file: &Path) -> String {
    let diff = TextDiff::configure()
        .algorithm(similar::Algorithm::Myers)
        .diff_lines(original, formatted);
    diff.unified_diff()
        .context_radius(DIFF_CONTEXT)
        .header(
            &format!("{} (before formatting)", file.display()),
            &format!("{} (after formatting)", file.display()),
        )
        .to_string()
}
