//! Lazily started result stream over the walk + scan pipeline.

use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::engine::CancelToken;
use crate::error::SearchError;
use crate::{Occurrence, SearchRequest};

use super::context::{PipelineContext, PipelineTuning, TraversalPolicy};
use super::orchestrator::{PipelineHandles, run_pipeline, shutdown_pipeline_handles};

enum StreamState {
    Pending(PipelineContext),
    Running(PipelineHandles),
    Done,
}

/// Occurrences in arrival order. Nothing touches the filesystem until the first `next()`.
///
/// Ends with `None` once the walk and every dispatched scan are finished. A traversal failure or
/// cancellation is yielded as a final `Err`, after which the stream only returns `None`.
/// Dropping the stream cancels the search and joins its threads. One stream is one traversal.
pub struct OccurrenceStream {
    state: StreamState,
    tuning: PipelineTuning,
    /// Token the caller sees (their own, or one made for this stream).
    cancel: CancelToken,
    /// Child of `cancel` handed to the pipeline, so the stream can stop it without cancelling the caller's token.
    stop: CancelToken,
    root: PathBuf,
}

impl OccurrenceStream {
    pub(crate) fn new(
        request: SearchRequest,
        policy: TraversalPolicy,
        tuning: PipelineTuning,
        cancel: CancelToken,
    ) -> Self {
        let stop = cancel.child();
        let ctx = PipelineContext::new(&request, policy, stop.clone());
        Self {
            state: StreamState::Pending(ctx),
            tuning,
            cancel,
            stop,
            root: request.root,
        }
    }

    /// Canonical root being searched.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Stop the pipeline, drop the receiver, join threads.
    fn finish(&mut self) -> Result<usize, SearchError> {
        self.stop.cancel();
        match std::mem::replace(&mut self.state, StreamState::Done) {
            StreamState::Running(PipelineHandles {
                item_rx,
                walk_handle,
                worker_handles,
            }) => {
                drop(item_rx);
                let path_count = shutdown_pipeline_handles(walk_handle, worker_handles)?;
                debug!("stream: closed after {} files", path_count);
                Ok(path_count)
            }
            _ => Ok(0),
        }
    }

    /// Shut down after a terminal element that already carries its own error; a join failure is only logged.
    fn finish_logged(&mut self) {
        if let Err(e) = self.finish() {
            warn!("stream: shutdown after terminal error: {}", e);
        }
    }

    /// Terminal element after the channel closes: a thread panic, a cancellation, or nothing.
    fn finish_after_close(&mut self) -> Option<Result<Occurrence, SearchError>> {
        let cancelled = self.cancel.is_cancelled();
        match self.finish() {
            Err(e) => Some(Err(e)),
            Ok(_) if cancelled => Some(Err(SearchError::Cancelled)),
            Ok(_) => None,
        }
    }
}

impl Iterator for OccurrenceStream {
    type Item = Result<Occurrence, SearchError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let StreamState::Done = self.state {
            return None;
        }
        if self.cancel.is_cancelled() {
            self.finish_logged();
            return Some(Err(SearchError::Cancelled));
        }
        self.state = match std::mem::replace(&mut self.state, StreamState::Done) {
            StreamState::Pending(ctx) => StreamState::Running(run_pipeline(ctx, self.tuning)),
            other => other,
        };

        let StreamState::Running(handles) = &self.state else {
            return None;
        };
        match handles.item_rx.recv() {
            Ok(Ok(occ)) => Some(Ok(occ)),
            Ok(Err(err)) => {
                self.finish_logged();
                Some(Err(err))
            }
            Err(_) => self.finish_after_close(),
        }
    }
}

impl std::fmt::Debug for OccurrenceStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OccurrenceStream")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl Drop for OccurrenceStream {
    fn drop(&mut self) {
        if let StreamState::Running(_) = self.state {
            self.finish_logged();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::validate_request;
    use crate::pipeline::context::StreamItem;
    use std::fs;

    #[test]
    fn excluded_prefix_contents_never_reported() {
        let dir = tempfile::Builder::new().prefix("stream").tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::write(root.join("top.txt"), "needle").unwrap();
        fs::create_dir_all(root.join("sysfs/kernel")).unwrap();
        fs::write(root.join("sysfs/kernel/a.txt"), "needle needle").unwrap();
        fs::create_dir_all(root.join("nested/procfs")).unwrap();
        fs::write(root.join("nested/procfs/b.txt"), "needle").unwrap();

        let request = validate_request("needle", &root, false).unwrap();
        let policy = TraversalPolicy::with_excluded_prefixes(
            false,
            vec![root.join("sysfs"), root.join("nested/procfs")],
        );
        let tuning = PipelineTuning {
            scan_workers: 2,
            channel_cap: 8,
        };
        let found: Vec<Occurrence> = OccurrenceStream::new(request, policy, tuning, CancelToken::new())
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].file, root.join("top.txt"));
    }

    /// A stream already running on handles whose scan worker panicked.
    fn stream_with_panicked_worker(items: Vec<StreamItem>) -> OccurrenceStream {
        let dir = tempfile::Builder::new().prefix("stream").tempdir().unwrap();
        let request = validate_request("x", dir.path(), false).unwrap();
        let tuning = PipelineTuning {
            scan_workers: 1,
            channel_cap: 8,
        };
        let mut stream =
            OccurrenceStream::new(request, TraversalPolicy::new(false), tuning, CancelToken::new());
        let (item_tx, item_rx) = crossbeam_channel::unbounded();
        for item in items {
            item_tx.send(item).unwrap();
        }
        stream.state = StreamState::Running(PipelineHandles {
            item_rx,
            walk_handle: std::thread::spawn(|| 0),
            worker_handles: vec![std::thread::spawn(|| panic!("scan worker died"))],
        });
        stream
    }

    #[test]
    fn terminal_error_wins_over_join_failure() {
        let mut stream = stream_with_panicked_worker(vec![Err(SearchError::InvalidArgument(
            "boom".into(),
        ))]);
        assert!(matches!(
            stream.next(),
            Some(Err(SearchError::InvalidArgument(ref m))) if m == "boom"
        ));
        assert!(stream.next().is_none());
    }

    #[test]
    fn cancellation_wins_over_join_failure() {
        let mut stream = stream_with_panicked_worker(vec![]);
        stream.cancel();
        assert!(matches!(stream.next(), Some(Err(SearchError::Cancelled))));
        assert!(stream.next().is_none());
    }

    #[test]
    fn join_failure_surfaces_when_channel_closes() {
        let mut stream = stream_with_panicked_worker(vec![]);
        assert!(matches!(
            stream.next(),
            Some(Err(SearchError::WorkerPanicked("scan")))
        ));
        assert!(stream.next().is_none());
    }

    #[test]
    fn drop_with_panicked_worker_does_not_panic() {
        drop(stream_with_panicked_worker(vec![]));
    }
}
