//! Pipeline context and tuning: shared data passed into the walk thread and scan workers.

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::engine::CancelToken;
use crate::engine::tools::{is_hidden, is_under_prefix, virtual_fs_prefixes};
use crate::error::SearchError;
use crate::{Occurrence, SearchRequest};

/// Item carried from the pipeline to the stream: an occurrence, or a terminal error.
pub type StreamItem = Result<Occurrence, SearchError>;

/// Why a directory subtree was not entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirSkip {
    VirtualFs,
    Hidden,
}

impl fmt::Display for DirSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirSkip::VirtualFs => f.write_str("virtual filesystem"),
            DirSkip::Hidden => f.write_str("hidden directory"),
        }
    }
}

/// Inclusion rules for the walk. Each decision is a pure function of the path and the hidden flag;
/// nothing is inherited from the parent directory.
#[derive(Clone, Debug)]
pub struct TraversalPolicy {
    search_hidden: bool,
    excluded_prefixes: Vec<PathBuf>,
}

impl TraversalPolicy {
    /// Policy with the fixed virtual filesystem prefixes.
    pub fn new(search_hidden: bool) -> Self {
        Self {
            search_hidden,
            excluded_prefixes: virtual_fs_prefixes(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_excluded_prefixes(search_hidden: bool, excluded_prefixes: Vec<PathBuf>) -> Self {
        Self {
            search_hidden,
            excluded_prefixes,
        }
    }

    pub fn search_hidden(&self) -> bool {
        self.search_hidden
    }

    /// `Some(reason)` if the directory at `path` (absolute, normalized) must not be entered.
    pub fn dir_skip(&self, path: &Path) -> Option<DirSkip> {
        if is_under_prefix(path, &self.excluded_prefixes) {
            Some(DirSkip::VirtualFs)
        } else if !self.search_hidden && is_hidden(path) {
            Some(DirSkip::Hidden)
        } else {
            None
        }
    }

    pub fn skips_hidden_file(&self, path: &Path) -> bool {
        !self.search_hidden && is_hidden(path)
    }

    pub fn is_excluded_target(&self, resolved: &Path) -> bool {
        is_under_prefix(resolved, &self.excluded_prefixes)
    }
}

/// Tuning for one run: scan worker count and output channel cap.
#[derive(Clone, Copy, Debug)]
pub struct PipelineTuning {
    pub scan_workers: usize,
    pub channel_cap: usize,
}

/// Shared context for the walk + scan pipeline. Cloned into the walk thread and every worker.
#[derive(Clone)]
pub struct PipelineContext {
    pub root: PathBuf,
    pub pattern: Arc<str>,
    pub policy: TraversalPolicy,
    pub cancel: CancelToken,
}

impl PipelineContext {
    pub fn new(request: &SearchRequest, policy: TraversalPolicy, cancel: CancelToken) -> Self {
        Self {
            root: request.root().clone(),
            pattern: Arc::from(request.pattern()),
            policy,
            cancel,
        }
    }
}

/// Channels for the pipeline. Walk gets `path_tx` (and an `item_tx` clone for fatal errors);
/// workers get `path_rx` and `item_tx`; the stream keeps `item_rx`.
///
/// The path channel is unbounded so the walk never waits on scanning.
pub struct PipelineChannels {
    pub path_tx: Sender<PathBuf>,
    pub path_rx: Receiver<PathBuf>,
    pub item_tx: Sender<StreamItem>,
    pub item_rx: Receiver<StreamItem>,
}

pub fn create_pipeline_channels(channel_cap: usize) -> PipelineChannels {
    let (path_tx, path_rx) = unbounded::<PathBuf>();
    let (item_tx, item_rx) = bounded::<StreamItem>(channel_cap.max(1));
    PipelineChannels {
        path_tx,
        path_rx,
        item_tx,
        item_rx,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_fs_dirs_are_skipped_even_with_hidden_search() {
        let policy = TraversalPolicy::new(true);
        assert_eq!(policy.dir_skip(Path::new("/proc")), Some(DirSkip::VirtualFs));
        assert_eq!(policy.dir_skip(Path::new("/proc/1/fd")), Some(DirSkip::VirtualFs));
        assert_eq!(policy.dir_skip(Path::new("/sys/kernel")), Some(DirSkip::VirtualFs));
        assert_eq!(policy.dir_skip(Path::new("/dev")), Some(DirSkip::VirtualFs));
        assert_eq!(policy.dir_skip(Path::new("/run/user")), Some(DirSkip::VirtualFs));
    }

    #[test]
    fn prefix_match_is_component_wise() {
        let policy = TraversalPolicy::new(false);
        assert_eq!(policy.dir_skip(Path::new("/processes")), None);
        assert_eq!(policy.dir_skip(Path::new("/home/proc")), None);
        assert_eq!(policy.dir_skip(Path::new("/devtools/src")), None);
    }

    #[test]
    fn hidden_dirs_depend_on_flag() {
        let path = Path::new("/home/u/.cache");
        assert_eq!(TraversalPolicy::new(false).dir_skip(path), Some(DirSkip::Hidden));
        assert_eq!(TraversalPolicy::new(true).dir_skip(path), None);
    }

    #[test]
    fn hidden_files_depend_on_flag() {
        let path = Path::new("/home/u/.bashrc");
        assert!(TraversalPolicy::new(false).skips_hidden_file(path));
        assert!(!TraversalPolicy::new(true).skips_hidden_file(path));
        assert!(!TraversalPolicy::new(false).skips_hidden_file(Path::new("/home/u/notes.txt")));
    }

    #[test]
    fn injected_prefixes_replace_the_fixed_set() {
        let policy = TraversalPolicy::with_excluded_prefixes(false, vec![PathBuf::from("/data/virtual")]);
        assert_eq!(policy.dir_skip(Path::new("/data/virtual/x")), Some(DirSkip::VirtualFs));
        assert_eq!(policy.dir_skip(Path::new("/proc")), None);
    }
}
