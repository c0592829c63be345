//! Bounded worker pool with completion-order result delivery
//!
//! One task is spawned per discovered file onto a rayon pool sized to the
//! worker limit, so at most that many formatter processes are alive at any
//! instant. Finished tasks hand their result over an mpsc channel, which
//! gives the consumer completion order rather than submission order: slow
//! files never hold up reporting of fast ones.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};

use tracing::debug;

use crate::error::Result;
use crate::runner::{RunOptions, RunResult, run_one};

/// Cooperative cancellation flag shared by the Ctrl-C handler and every
/// worker. Workers check it before spawning their child and while the
/// child runs; tasks that see it set before starting never start.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the whole run.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// An in-flight batch of formatter invocations.
///
/// Iterating yields results as tasks complete and ends once every task has
/// either finished or declined to start. The pool is kept alive by the
/// handle, so dropping it only returns after the last worker is done.
pub struct FormatRun {
    _pool: rayon::ThreadPool,
    results: mpsc::Receiver<RunResult>,
}

impl Iterator for FormatRun {
    type Item = RunResult;

    fn next(&mut self) -> Option<RunResult> {
        self.results.recv().ok()
    }
}

/// Launch one task per file, bounded to `workers` concurrent child
/// processes. `workers` must already be resolved to at least 1; a zero
/// jobs setting is mapped to available parallelism before this point.
///
/// Tasks are queued in `files` order but results arrive in completion
/// order. Cancelled tasks send nothing, so the stream simply ends early.
pub fn spawn_all(
    files: Vec<PathBuf>,
    options: RunOptions,
    workers: usize,
    cancel: CancelToken,
) -> Result<FormatRun> {
    debug_assert!(workers >= 1);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()?;
    let (tx, rx) = mpsc::channel();
    let options = Arc::new(options);

    debug!(files = files.len(), workers, "Scheduling format tasks");
    for file in files {
        let tx = tx.clone();
        let options = Arc::clone(&options);
        let cancel = cancel.clone();
        pool.spawn(move || {
            if cancel.is_cancelled() {
                return;
            }
            if let Some(result) = run_one(&file, &options, &cancel) {
                // The receiver may already be gone if the consumer bailed.
                let _ = tx.send(result);
            }
        });
    }

    Ok(FormatRun {
        _pool: pool,
        results: rx,
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use std::time::{Duration, Instant};

    // Formatter stand-in that sleeps for the number of seconds stored in
    // the target file, then echoes the file path.
    fn sleepy_formatter(dir: &Path) -> PathBuf {
        let path = dir.join("sleepy-format");
        fs::write(&path, "#!/bin/sh\nsleep \"$(cat \"$1\")\"\necho \"$1\"\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn options(binary: PathBuf) -> RunOptions {
        RunOptions {
            binary,
            style: None,
            in_place: false,
        }
    }

    #[test]
    fn test_results_arrive_in_completion_order() {
        let dir = tempfile::tempdir().unwrap();
        let slow = dir.path().join("slow.c");
        let fast = dir.path().join("fast.c");
        fs::write(&slow, "0.6").unwrap();
        fs::write(&fast, "0.05").unwrap();
        let binary = sleepy_formatter(dir.path());

        // Slow file queued first; with two workers both start together.
        let run = spawn_all(
            vec![slow.clone(), fast.clone()],
            options(binary),
            2,
            CancelToken::new(),
        )
        .unwrap();
        let order: Vec<PathBuf> = run.map(|r| r.file).collect();
        assert_eq!(order, vec![fast, slow]);
    }

    #[test]
    fn test_worker_limit_serializes_execution() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.c");
        let b = dir.path().join("b.c");
        fs::write(&a, "0.2").unwrap();
        fs::write(&b, "0.2").unwrap();
        let binary = sleepy_formatter(dir.path());

        let start = Instant::now();
        let run = spawn_all(vec![a, b], options(binary), 1, CancelToken::new()).unwrap();
        let results: Vec<_> = run.collect();
        assert_eq!(results.len(), 2);
        // One worker means the sleeps cannot overlap.
        assert!(start.elapsed() >= Duration::from_millis(350));
    }

    #[test]
    fn test_every_file_yields_exactly_one_result() {
        let dir = tempfile::tempdir().unwrap();
        let binary = sleepy_formatter(dir.path());
        let mut files = Vec::new();
        for i in 0..8 {
            let f = dir.path().join(format!("f{i}.c"));
            fs::write(&f, "0").unwrap();
            files.push(f);
        }

        let run = spawn_all(files.clone(), options(binary), 3, CancelToken::new()).unwrap();
        let mut seen: Vec<PathBuf> = run.map(|r| r.file).collect();
        seen.sort();
        assert_eq!(seen, files);
    }

    #[test]
    fn test_cancellation_stops_pending_and_running_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let binary = sleepy_formatter(dir.path());
        let mut files = Vec::new();
        for i in 0..5 {
            let f = dir.path().join(format!("f{i}.c"));
            fs::write(&f, "30").unwrap();
            files.push(f);
        }

        let cancel = CancelToken::new();
        let delayed = cancel.clone();
        let killer = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(200));
            delayed.cancel();
        });

        let start = Instant::now();
        let run = spawn_all(files, options(binary), 2, cancel).unwrap();
        let results: Vec<_> = run.collect();
        killer.join().unwrap();

        // No result surfaces for a cancelled file, and nothing lingers for
        // anywhere near the 30s sleeps.
        assert!(results.is_empty());
        assert!(start.elapsed() < Duration::from_secs(10));
    }
}
