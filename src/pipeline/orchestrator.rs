use crossbeam_channel::Receiver;
use log::debug;
use std::thread::JoinHandle;

use crate::SearchOpts;
use crate::error::SearchError;
use crate::pipeline;
use crate::utils::config::{OUTPUT_CHANNEL_CAP, ScanWorkerLimits};

use super::context::{PipelineContext, PipelineTuning, StreamItem};

/// Handles returned by [`run_pipeline`]: receive items, then join when done.
pub struct PipelineHandles {
    pub item_rx: Receiver<StreamItem>,
    pub walk_handle: JoinHandle<usize>,
    pub worker_handles: Vec<JoinHandle<()>>,
}

/// Scan worker count for `available` threads: `max(1, available / 2)`.
pub fn scan_workers_for(available: usize) -> usize {
    ScanWorkerLimits {
        all_threads: available,
        ..ScanWorkerLimits::default()
    }
    .workers()
}

/// Worker count and channel cap from opts, falling back to the thread-derived defaults.
pub fn tuning_from_opts(opts: &SearchOpts) -> PipelineTuning {
    let scan_workers = opts
        .scan_workers
        .unwrap_or_else(|| ScanWorkerLimits::current().workers())
        .max(ScanWorkerLimits::FLOOR);
    let channel_cap = opts.channel_cap.unwrap_or(OUTPUT_CHANNEL_CAP).max(1);
    PipelineTuning {
        scan_workers,
        channel_cap,
    }
}

/// Start the walk + scan pipeline. Caller receives from `item_rx` and must join
/// `walk_handle` and `worker_handles` when done (see [`shutdown_pipeline_handles`]).
pub fn run_pipeline(ctx: PipelineContext, tuning: PipelineTuning) -> PipelineHandles {
    debug!(
        "Searching {} with {} scan workers",
        ctx.root.display(),
        tuning.scan_workers
    );
    let channels = pipeline::create_pipeline_channels(tuning.channel_cap);

    let worker_handles = pipeline::spawn_scan_workers(
        channels.path_rx,
        &channels.item_tx,
        &ctx,
        tuning.scan_workers,
    );

    let walk_handle = pipeline::spawn_walk_thread(channels.path_tx, channels.item_tx, ctx);

    PipelineHandles {
        item_rx: channels.item_rx,
        walk_handle,
        worker_handles,
    }
}

/// Join walk and worker threads. The item receiver must already be dropped or drained, or a
/// worker blocked on a full channel never returns. Returns the walk's dispatched-file count.
pub fn shutdown_pipeline_handles(
    walk_handle: JoinHandle<usize>,
    worker_handles: Vec<JoinHandle<()>>,
) -> Result<usize, SearchError> {
    let walk = walk_handle.join();
    let mut worker_panicked = false;
    for h in worker_handles {
        worker_panicked |= h.join().is_err();
    }
    let path_count = walk.map_err(|_| SearchError::WorkerPanicked("walk"))?;
    if worker_panicked {
        return Err(SearchError::WorkerPanicked("scan"));
    }
    Ok(path_count)
}
