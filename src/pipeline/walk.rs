//! Walk loop: one thread, depth-first, applies the traversal policy and hands eligible files to the scan workers.

use crossbeam_channel::Sender;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use walkdir::{DirEntry, WalkDir};

use crate::engine::tools::is_readable;
use crate::error::{EntryFailure, SearchError};

use super::context::{PipelineContext, StreamItem, TraversalPolicy};

/// One result from the directory walk: a path to scan, or an error with the depth it happened at.
pub enum WalkOutcome {
    Ok(DirEntry),
    Err(walkdir::Error),
}

/// Convert a walkdir result into [`WalkOutcome`].
pub fn to_outcome_walkdir(r: Result<DirEntry, walkdir::Error>) -> WalkOutcome {
    match r {
        Ok(entry) => WalkOutcome::Ok(entry),
        Err(err) => WalkOutcome::Err(err),
    }
}

/// Directory entries are filtered before walkdir lists their children; files pass through.
fn walkdir_iter(ctx: &PipelineContext) -> Box<dyn Iterator<Item = WalkOutcome>> {
    let policy = ctx.policy.clone();
    Box::new(
        WalkDir::new(&ctx.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(move |entry| keep_dir_entry(entry, &policy))
            .map(to_outcome_walkdir),
    )
}

fn keep_dir_entry(entry: &DirEntry, policy: &TraversalPolicy) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    match policy.dir_skip(entry.path()) {
        Some(reason) => {
            warn!("Skipping directory {} ({})", entry.path().display(), reason);
            false
        }
        None => true,
    }
}

/// Per-file decision. `Ok(Some(path))` to scan, `Ok(None)` to omit silently.
fn eligible_file(entry: &DirEntry, policy: &TraversalPolicy) -> Result<Option<PathBuf>, EntryFailure> {
    let path = entry.path();
    if policy.skips_hidden_file(path) {
        return Ok(None);
    }
    // Follows symlinks: a link to a regular file is scanned, a link to anything else is not.
    let meta = std::fs::metadata(path)?;
    if !meta.is_file() {
        return Ok(None);
    }
    if entry.path_is_symlink() && policy.is_excluded_target(&path.canonicalize()?) {
        return Ok(None);
    }
    if !is_readable(path) {
        return Ok(None);
    }
    Ok(Some(path.to_path_buf()))
}

pub fn spawn_walk_thread(
    path_tx: Sender<PathBuf>,
    item_tx: Sender<StreamItem>,
    ctx: PipelineContext,
) -> JoinHandle<usize> {
    thread::spawn(move || {
        let iter = walkdir_iter(&ctx);
        run_walk_loop(path_tx, item_tx, &ctx, iter)
    })
}

/// Run the walk loop: consume `iter`, send eligible files on `path_tx`.
/// Per-entry errors are logged and skipped. An error at depth 0 (the root itself could not be
/// listed) is sent on `item_tx` and ends the walk. Cancellation is checked before every entry.
/// Drops `path_tx` when done so workers drain and exit. Returns the number of files dispatched.
pub fn run_walk_loop<I>(
    path_tx: Sender<PathBuf>,
    item_tx: Sender<StreamItem>,
    ctx: &PipelineContext,
    iter: I,
) -> usize
where
    I: Iterator<Item = WalkOutcome>,
{
    let mut count = 0_usize;
    for outcome in iter {
        if ctx.cancel.is_cancelled() {
            debug!("walk: cancelled after {} files", count);
            break;
        }
        match outcome {
            WalkOutcome::Ok(entry) => {
                if entry.file_type().is_dir() {
                    continue;
                }
                match eligible_file(&entry, &ctx.policy) {
                    Ok(Some(path)) => {
                        if path_tx.send(path).is_err() {
                            break;
                        }
                        count += 1;
                    }
                    Ok(None) => debug!("Skipping file {}", entry.path().display()),
                    Err(EntryFailure::Skip(msg)) => {
                        warn!("Cannot visit {}: {}", entry.path().display(), msg)
                    }
                    Err(EntryFailure::Abort(err)) => {
                        let _ = item_tx.send(Err(err));
                        break;
                    }
                }
            }
            WalkOutcome::Err(err) => {
                if err.depth() == 0 {
                    let path = err.path().map(Path::to_path_buf);
                    let _ = item_tx.send(Err(SearchError::Traversal { path, source: err }));
                    break;
                }
                warn!("Error accessing path: {}", err);
            }
        }
    }
    debug!("walk: dispatched {} files", count);
    drop(path_tx);
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CancelToken;
    use crate::engine::validate_request;
    use crossbeam_channel::unbounded;
    use std::fs;

    fn walk_paths(root: &Path, policy: TraversalPolicy) -> Vec<PathBuf> {
        let request = validate_request("x", root, true).unwrap();
        let ctx = PipelineContext::new(&request, policy, CancelToken::new());
        let (path_tx, path_rx) = unbounded();
        let (item_tx, _item_rx) = unbounded();
        run_walk_loop(path_tx, item_tx, &ctx, walkdir_iter(&ctx));
        let mut paths: Vec<PathBuf> = path_rx.iter().collect();
        paths.sort();
        paths
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::Builder::new().prefix("walk").tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "x").unwrap();
        fs::create_dir(dir.path().join(".hidden")).unwrap();
        fs::write(dir.path().join(".hidden/b.txt"), "x").unwrap();
        fs::write(dir.path().join(".dotfile"), "x").unwrap();
        fs::create_dir_all(dir.path().join("vfs/deep")).unwrap();
        fs::write(dir.path().join("vfs/deep/c.txt"), "x").unwrap();
        dir
    }

    #[test]
    fn hidden_entries_skipped_by_default() {
        let dir = fixture();
        let root = dir.path().canonicalize().unwrap();
        let paths = walk_paths(&root, TraversalPolicy::with_excluded_prefixes(false, vec![]));
        assert_eq!(paths, vec![root.join("a.txt"), root.join("vfs/deep/c.txt")]);
    }

    #[test]
    fn hidden_entries_included_when_requested() {
        let dir = fixture();
        let root = dir.path().canonicalize().unwrap();
        let paths = walk_paths(&root, TraversalPolicy::with_excluded_prefixes(true, vec![]));
        assert_eq!(paths.len(), 4);
        assert!(paths.contains(&root.join(".hidden/b.txt")));
        assert!(paths.contains(&root.join(".dotfile")));
    }

    #[test]
    fn excluded_prefix_subtree_never_dispatched() {
        let dir = fixture();
        let root = dir.path().canonicalize().unwrap();
        let policy = TraversalPolicy::with_excluded_prefixes(true, vec![root.join("vfs")]);
        let paths = walk_paths(&root, policy);
        assert!(paths.iter().all(|p| !p.starts_with(root.join("vfs"))));
        assert!(paths.contains(&root.join("a.txt")));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_to_directory_is_not_followed_and_to_file_is_scanned() {
        let dir = fixture();
        let root = dir.path().canonicalize().unwrap();
        std::os::unix::fs::symlink(root.join("vfs"), root.join("link_dir")).unwrap();
        std::os::unix::fs::symlink(root.join("a.txt"), root.join("link_file")).unwrap();
        let paths = walk_paths(&root, TraversalPolicy::with_excluded_prefixes(false, vec![]));
        assert!(paths.contains(&root.join("link_file")));
        assert!(paths.iter().all(|p| !p.starts_with(root.join("link_dir"))));
    }

    #[test]
    fn cancelled_walk_dispatches_nothing() {
        let dir = fixture();
        let request = validate_request("x", dir.path(), false).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        let ctx = PipelineContext::new(&request, TraversalPolicy::new(false), cancel);
        let (path_tx, path_rx) = unbounded();
        let (item_tx, _item_rx) = unbounded();
        let n = run_walk_loop(path_tx, item_tx, &ctx, walkdir_iter(&ctx));
        assert_eq!(n, 0);
        assert_eq!(path_rx.iter().count(), 0);
    }

    #[test]
    fn root_failure_is_sent_as_traversal_error() {
        let dir = fixture();
        let request = validate_request("x", dir.path(), false).unwrap();
        let ctx = PipelineContext::new(&request, TraversalPolicy::new(false), CancelToken::new());
        let missing = dir.path().join("missing");
        let iter = WalkDir::new(&missing).into_iter().map(to_outcome_walkdir);
        let (path_tx, _path_rx) = unbounded();
        let (item_tx, item_rx) = unbounded();
        assert_eq!(run_walk_loop(path_tx, item_tx, &ctx, iter), 0);
        let item = item_rx.recv().unwrap();
        assert!(matches!(item, Err(SearchError::Traversal { path: Some(ref p), .. }) if p == &missing));
    }
}
