//! Formatter binary resolution and command-line construction

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::{Error, Result};

/// Binary name looked up on $PATH when no override is given.
pub const DEFAULT_BINARY: &str = "clang-format";

/// Build the argument vector for one file:
/// `[binary, --style=<S>, -i, file]`, with the style and in-place parts
/// independently optional. The style value is forwarded verbatim; the tool
/// is the authority on valid style names.
pub fn build_invocation(
    file: &Path,
    binary: &Path,
    style: Option<&str>,
    in_place: bool,
) -> Vec<OsString> {
    let mut argv: Vec<OsString> = vec![binary.as_os_str().to_os_string()];
    if let Some(style) = style {
        argv.push(format!("--style={style}").into());
    }
    if in_place {
        argv.push("-i".into());
    }
    argv.push(file.as_os_str().to_os_string());
    argv
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

fn search_path(name: &str) -> Option<PathBuf> {
    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

/// Resolve the formatter binary or fail with a descriptive error.
///
/// An explicit path must point at an executable; a bare name (explicit or
/// the default) is searched on $PATH.
pub fn find_binary(explicit: Option<&Path>, name: &str) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if is_executable(path) {
            return Ok(path.to_path_buf());
        }
        if path.components().count() == 1 {
            if let Some(found) = path.to_str().and_then(search_path) {
                return Ok(found);
            }
        }
        return Err(Error::BinaryNotExecutable {
            path: path.to_path_buf(),
        });
    }

    search_path(name).ok_or_else(|| Error::BinaryNotFound {
        name: name.to_string(),
    })
}

/// Preflight check: the resolved binary must answer `--version` with exit 0.
pub fn verify_binary(binary: &Path) -> Result<()> {
    let output = Command::new(binary)
        .arg("--version")
        .output()
        .map_err(|e| Error::VersionCheck {
            binary: binary.to_path_buf(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(Error::VersionCheck {
            binary: binary.to_path_buf(),
            message: format!("version check exited with {}", output.status),
        });
    }

    debug!(
        binary = %binary.display(),
        version = %String::from_utf8_lossy(&output.stdout).trim(),
        "Formatter preflight OK"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[OsString]) -> Vec<String> {
        argv.iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_minimal_invocation() {
        let argv = build_invocation(
            Path::new("src/foo.cpp"),
            Path::new("clang-format"),
            None,
            false,
        );
        assert_eq!(args(&argv), vec!["clang-format", "src/foo.cpp"]);
    }

    #[test]
    fn test_full_invocation() {
        let argv = build_invocation(
            Path::new("src/foo.cpp"),
            Path::new("clang-format"),
            Some("Google"),
            true,
        );
        assert_eq!(
            args(&argv),
            vec!["clang-format", "--style=Google", "-i", "src/foo.cpp"]
        );
    }

    #[test]
    fn test_style_only() {
        let argv = build_invocation(
            Path::new("a.c"),
            Path::new("/opt/llvm/bin/clang-format"),
            Some("file"),
            false,
        );
        assert_eq!(
            args(&argv),
            vec!["/opt/llvm/bin/clang-format", "--style=file", "a.c"]
        );
    }

    #[test]
    fn test_in_place_only() {
        let argv = build_invocation(Path::new("a.c"), Path::new("clang-format"), None, true);
        assert_eq!(args(&argv), vec!["clang-format", "-i", "a.c"]);
    }

    #[test]
    fn test_find_binary_rejects_missing_explicit_path() {
        let err = find_binary(Some(Path::new("/no/such/clang-format")), DEFAULT_BINARY)
            .unwrap_err();
        assert!(matches!(err, Error::BinaryNotExecutable { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_find_binary_accepts_explicit_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("fake-format");
        std::fs::write(&fake, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let found = find_binary(Some(&fake), DEFAULT_BINARY).unwrap();
        assert_eq!(found, fake);
    }

    #[cfg(unix)]
    #[test]
    fn test_find_binary_rejects_non_executable_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("not-a-binary");
        std::fs::write(&plain, "just text\n").unwrap();
        std::fs::set_permissions(&plain, std::fs::Permissions::from_mode(0o644)).unwrap();

        let err = find_binary(Some(&plain), DEFAULT_BINARY).unwrap_err();
        assert!(matches!(err, Error::BinaryNotExecutable { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_verify_binary_ok() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("fake-format");
        std::fs::write(&fake, "#!/bin/sh\necho fake-format version 1.0\n").unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        verify_binary(&fake).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_verify_binary_nonzero_exit() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let grumpy = dir.path().join("grumpy-format");
        std::fs::write(&grumpy, "#!/bin/sh\nexit 3\n").unwrap();
        std::fs::set_permissions(&grumpy, std::fs::Permissions::from_mode(0o755)).unwrap();

        let err = verify_binary(&grumpy).unwrap_err();
        assert!(matches!(err, Error::VersionCheck { .. }));
    }
}
