//! Locating programs on disk.

use std::borrow::Cow;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// Resolve a command name the way `execvp` does.
///
/// - A name containing a `/` is a path (absolute, or relative to the current
///   directory) and is returned as-is if it points at an executable file.
/// - Any other name is looked up in each directory of `search_paths`, first
///   match wins.
/// - An empty name resolves to nothing.
pub fn find_command_path<'a>(search_paths: &OsStr, name: &'a str) -> Option<Cow<'a, Path>> {
    if name.is_empty() {
        return None;
    }
    let path = Path::new(name);
    if name.contains('/') {
        return is_executable(path).then_some(Cow::Borrowed(path));
    }
    find_in_path(search_paths, path.as_os_str()).map(Cow::Owned)
}

fn find_in_path(search_paths: &OsStr, name: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_paths)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Shell-style exit code for a finished child: the exit code, or `128 + n`
/// when signal `n` killed it.
#[cfg(unix)]
pub fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => -1,
    }
}

#[cfg(not(unix))]
pub fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}
