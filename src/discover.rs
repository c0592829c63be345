//! Source file discovery
//!
//! Expands the CLI path arguments into the set of files the formatter will
//! visit: explicit file arguments are taken as-is, directories are walked
//! recursively and filtered by extension.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

/// Extensions clang-format understands, lowercase, without the leading dot.
pub const SOURCE_EXTENSIONS: &[&str] = &[
    "c", "h", "cpp", "hpp", "cc", "hh", "cxx", "hxx", "c++", "h++", "m", "mm",
];

/// Check if a path carries a recognized source extension (case-insensitive)
fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SOURCE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Collect every file to be formatted, reachable from `paths`.
///
/// Explicit file arguments are included regardless of extension; directory
/// arguments are walked recursively with the extension filter applied.
/// Non-existent inputs are skipped rather than reported: discovery never
/// fails, it only produces a possibly-empty set. The result is absolute,
/// deduplicated and sorted so run order and output are reproducible.
pub fn find_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = BTreeSet::new();

    for path in paths {
        if path.is_file() {
            if let Ok(abs) = std::path::absolute(path) {
                files.insert(abs);
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
                if entry.file_type().is_file() && has_source_extension(entry.path()) {
                    if let Ok(abs) = std::path::absolute(entry.path()) {
                        files.insert(abs);
                    }
                }
            }
        } else {
            debug!(path = %path.display(), "Skipping non-existent input path");
        }
    }

    files.into_iter().collect()
}
