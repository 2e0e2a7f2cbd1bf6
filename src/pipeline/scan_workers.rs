use crossbeam_channel::{Receiver, Sender};
use log::{debug, warn};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use crate::engine::scanner::scan_file;
use crate::error::{EntryFailure, SearchError};

use super::context::{PipelineContext, StreamItem};

/// Single scan worker: read paths from path_rx, scan each file, send occurrences on item_tx.
///
/// A worker holds at most one open file, so the number of workers is the admission limit on
/// concurrent scans. Per-file failures are logged; cancellation or a closed output channel stops the worker.
fn scan_worker_loop(path_rx: Receiver<PathBuf>, item_tx: Sender<StreamItem>, ctx: PipelineContext) {
    while let Ok(path) = path_rx.recv() {
        if ctx.cancel.is_cancelled() {
            break;
        }
        let emit = |occ| {
            item_tx
                .send(Ok(occ))
                .map_err(|_| EntryFailure::Abort(SearchError::Cancelled))
        };
        match scan_file(&path, &ctx.pattern, &ctx.cancel, emit) {
            Ok(_) => {}
            Err(EntryFailure::Skip(msg)) => warn!("Skipping {}: {}", path.display(), msg),
            Err(EntryFailure::Abort(err)) => {
                debug!("scan worker stopping: {}", err);
                break;
            }
        }
    }
    drop(item_tx);
}

/// Spawn scan workers: read paths from path_rx, scan, send on item_tx. Caller must drop its sender after this so the stream sees the channel close.
pub fn spawn_scan_workers(
    path_rx: Receiver<PathBuf>,
    item_tx: &Sender<StreamItem>,
    ctx: &PipelineContext,
    num_workers: usize,
) -> Vec<JoinHandle<()>> {
    (0..num_workers.max(1))
        .map(|_| {
            let path_rx = path_rx.clone();
            let item_tx = item_tx.clone();
            let ctx = ctx.clone();
            thread::spawn(move || scan_worker_loop(path_rx, item_tx, ctx))
        })
        .collect()
}
