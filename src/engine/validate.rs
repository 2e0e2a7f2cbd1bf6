//! Precondition checks run once, before any traversal.

use log::debug;
use std::io::ErrorKind;
use std::path::Path;

use crate::SearchRequest;
use crate::error::SearchError;

use super::tools::{is_hidden, is_readable, is_under_prefix, virtual_fs_prefixes};

/// Validate `(pattern, root, search_hidden)` and build the immutable [`SearchRequest`].
///
/// Checks run in this order and the first failure wins:
/// root exists, root readable, root is a directory, pattern non-empty, pattern has no newline,
/// root not hidden (unless `search_hidden`), root not under a virtual filesystem prefix.
/// Only metadata syscalls are made.
pub fn validate_request(
    pattern: &str,
    root: &Path,
    search_hidden: bool,
) -> Result<SearchRequest, SearchError> {
    let meta = std::fs::metadata(root).map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => SearchError::PermissionDenied(root.to_path_buf()),
        _ => SearchError::NotFound(root.to_path_buf()),
    })?;
    if !is_readable(root) {
        return Err(SearchError::PermissionDenied(root.to_path_buf()));
    }
    if !meta.is_dir() {
        return Err(SearchError::InvalidArgument(format!(
            "not a directory: {}",
            root.display()
        )));
    }
    if pattern.is_empty() {
        return Err(SearchError::InvalidArgument("pattern is empty".into()));
    }
    if pattern.contains('\n') {
        return Err(SearchError::InvalidArgument(
            "pattern contains a newline".into(),
        ));
    }

    let canonical = root.canonicalize().map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => SearchError::PermissionDenied(root.to_path_buf()),
        _ => SearchError::NotFound(root.to_path_buf()),
    })?;
    if !search_hidden && is_hidden(&canonical) {
        return Err(SearchError::InvalidArgument(format!(
            "root is hidden and hidden search is off: {}",
            canonical.display()
        )));
    }
    if is_under_prefix(&canonical, &virtual_fs_prefixes()) {
        return Err(SearchError::InvalidArgument(format!(
            "root is inside a virtual filesystem: {}",
            canonical.display()
        )));
    }

    debug!("Validated search root {}", canonical.display());
    Ok(SearchRequest {
        pattern: pattern.to_string(),
        root: canonical,
        search_hidden,
    })
}
