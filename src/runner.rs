//! Single-file execution of the external formatter
//!
//! Owns the whole lifecycle of one child process: optional pre-run content
//! snapshot, spawn, output capture, exit-status decoding and cancellation.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use std::ffi::OsString;
use tracing::{debug, warn};

use crate::invocation::build_invocation;
use crate::scheduler::CancelToken;

/// How often a worker re-checks its child and the cancellation token.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Settings shared by every formatter invocation in a run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Resolved path to the formatter binary
    pub binary: PathBuf,
    /// Style name forwarded as `--style=<name>`
    pub style: Option<String>,
    /// Rewrite files instead of emitting formatted text on stdout
    pub in_place: bool,
}

/// Outcome of one formatter invocation.
///
/// `original_content` is `Some` only in check mode and only when the
/// pre-run read succeeded; the reporter diffs it against `stdout`, which
/// in check mode carries the full reformatted text.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub file: PathBuf,
    pub invocation: Vec<OsString>,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// Wall-clock time spanning only the subprocess execution
    pub elapsed: Duration,
    pub original_content: Option<String>,
}

/// Run the formatter over one file.
///
/// Returns `None` when the run was cancelled mid-flight; the child has been
/// killed and reaped by then, and no result surfaces for the file.
pub fn run_one(file: &Path, options: &RunOptions, cancel: &CancelToken) -> Option<RunResult> {
    let invocation = build_invocation(
        file,
        &options.binary,
        options.style.as_deref(),
        options.in_place,
    );

    // Snapshot read failure is not an error: diffing is skipped for the
    // file and it can never be flagged as changed.
    let original_content = if options.in_place {
        None
    } else {
        match fs::read_to_string(file) {
            Ok(content) => Some(content),
            Err(err) => {
                debug!(file = %file.display(), %err, "Snapshot read failed, diff disabled for this file");
                None
            }
        }
    };

    let mut command = Command::new(&options.binary);
    command
        .args(&invocation[1..])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let start = Instant::now();
    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(err) => {
            warn!(file = %file.display(), %err, "Failed to spawn formatter");
            return Some(RunResult {
                file: file.to_path_buf(),
                invocation,
                exit_code: 1,
                stdout: String::new(),
                stderr: format!("{}: unable to run formatter: {err}\n", file.display()),
                elapsed: start.elapsed(),
                original_content,
            });
        }
    };

    // Drain both pipes off-thread so a chatty child can't fill a pipe
    // buffer and deadlock against our wait loop.
    let stdout_reader = spawn_pipe_reader(child.stdout.take());
    let stderr_reader = spawn_pipe_reader(child.stderr.take());

    let status = loop {
        if cancel.is_cancelled() {
            // Kill and reap so no orphan child outlives the run. The pipe
            // readers are left to drain on their own: a descendant of the
            // formatter may inherit the pipes and keep them open past the
            // kill, and the captured output is discarded anyway.
            let _ = child.kill();
            let _ = child.wait();
            debug!(file = %file.display(), "Cancelled in-flight formatter");
            return None;
        }
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(err) => {
                warn!(file = %file.display(), %err, "Lost track of formatter process");
                let _ = child.kill();
                let _ = child.wait();
                return Some(RunResult {
                    file: file.to_path_buf(),
                    invocation,
                    exit_code: 1,
                    stdout: String::new(),
                    stderr: format!("{}: failed to wait on formatter: {err}\n", file.display()),
                    elapsed: start.elapsed(),
                    original_content,
                });
            }
        }
    };
    let elapsed = start.elapsed();

    let stdout = stdout_reader.join().unwrap_or_default();
    let stderr = stderr_reader.join().unwrap_or_default();

    Some(RunResult {
        file: file.to_path_buf(),
        invocation,
        exit_code: decode_exit_status(status),
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        elapsed,
        original_content,
    })
}

fn spawn_pipe_reader<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

/// A signal-terminated child maps to a negative code, mirroring the
/// sign convention the reporter keys off.
#[cfg(unix)]
fn decode_exit_status(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|sig| -sig))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn decode_exit_status(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
