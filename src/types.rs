//! Public and internal types for the textseek API and pipeline.

use serde::Serialize;
use std::path::PathBuf;

use crate::engine::CancelToken;

/// One located match of the pattern.
///
/// `line` is 1-based, `offset` is the 0-based character index within that line.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Occurrence {
    pub file: PathBuf,
    pub line: usize,
    pub offset: usize,
}

/// A validated search request. Only [`validate_request`](crate::engine::validate_request)
/// builds one, so holding a `SearchRequest` means the preconditions passed.
///
/// `root` is the canonical (absolute, normalized) form of the directory the caller gave.
#[derive(Clone, Debug)]
pub struct SearchRequest {
    pub(crate) pattern: String,
    pub(crate) root: PathBuf,
    pub(crate) search_hidden: bool,
}

impl SearchRequest {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    pub fn search_hidden(&self) -> bool {
        self.search_hidden
    }
}

/// Lib-only options for [`search_with_opts`](crate::search_with_opts).
#[derive(Clone, Debug, Default)]
pub struct SearchOpts {
    /// Descend into hidden directories and scan hidden files.
    pub search_hidden: bool,
    /// Override the number of files scanned at once. When None, half the available threads (min 1).
    pub scan_workers: Option<usize>,
    /// Capacity of the occurrence channel between scan workers and the stream.
    pub channel_cap: Option<usize>,
    /// Token owned by the caller. When None, the stream creates its own.
    pub cancel: Option<CancelToken>,
}

impl From<&Opts> for SearchOpts {
    fn from(o: &Opts) -> Self {
        SearchOpts {
            search_hidden: o.search_hidden,
            scan_workers: o.scan_workers,
            channel_cap: None,
            cancel: None,
        }
    }
}

/// Full options (CLI). Use [`SearchOpts`] for lib.
#[derive(Clone, Debug, Default)]
pub struct Opts {
    /// Descend into hidden directories and scan hidden files.
    pub search_hidden: bool,
    /// Override the number of files scanned at once.
    pub scan_workers: Option<usize>,
    /// Debug logging.
    pub verbose: bool,
    /// Print one JSON object per occurrence.
    pub json: bool,
    /// Print only the number of occurrences.
    pub count_only: bool,
}
