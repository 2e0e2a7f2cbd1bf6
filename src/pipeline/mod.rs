//! Pipeline components: context, walk loop, scan workers, result stream.

pub mod context;
pub mod orchestrator;
pub mod scan_workers;
pub mod stream;
pub mod walk;

pub use context::{
    DirSkip, PipelineChannels, PipelineContext, PipelineTuning, StreamItem, TraversalPolicy,
    create_pipeline_channels,
};
pub use orchestrator::{
    PipelineHandles, run_pipeline, scan_workers_for, shutdown_pipeline_handles, tuning_from_opts,
};
pub use scan_workers::spawn_scan_workers;
pub use stream::OccurrenceStream;
pub use walk::{WalkOutcome, run_walk_loop, spawn_walk_thread, to_outcome_walkdir};
