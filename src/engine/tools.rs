//! Path and filter utilities

use std::path::{Path, PathBuf};

use crate::utils::config::VIRTUAL_FS_PREFIXES;

/// Convert absolute path to relative path from base
pub fn path_relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(|p| p.to_path_buf())
}

/// Hidden by name: final component starts with `.`. `/` and `..`-style paths have no name and are not hidden.
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// The fixed virtual filesystem prefixes as paths.
pub fn virtual_fs_prefixes() -> Vec<PathBuf> {
    VIRTUAL_FS_PREFIXES.iter().map(PathBuf::from).collect()
}

/// True if `path` equals or lies under one of `prefixes`. Component-wise, so `/procfs` is not under `/proc`.
/// `path` must already be absolute and normalized.
pub fn is_under_prefix(path: &Path, prefixes: &[PathBuf]) -> bool {
    prefixes.iter().any(|p| path.starts_with(p))
}

/// True if the current process may read `path` (file contents or directory listing).
#[cfg(unix)]
pub fn is_readable(path: &Path) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;
    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    unsafe { libc::access(c_path.as_ptr(), libc::R_OK) == 0 }
}

#[cfg(not(unix))]
pub fn is_readable(path: &Path) -> bool {
    if path.is_dir() {
        std::fs::read_dir(path).is_ok()
    } else {
        std::fs::File::open(path).is_ok()
    }
}

/// True if the process is running with effective uid 0 (e.g. via sudo).
#[cfg(unix)]
pub fn running_as_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
pub fn running_as_root() -> bool {
    false
}
