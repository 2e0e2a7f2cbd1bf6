//! Error types: request errors, whole-traversal failures, cancellation, and the internal
//! per-entry outcome that keeps "skip and continue" apart from "stop the search".

use std::path::PathBuf;
use thiserror::Error;

/// Error surfaced by the public search API.
///
/// Request errors (`NotFound`, `PermissionDenied`, `InvalidArgument`) are returned from
/// [`search_for_text_occurrences`](crate::search_for_text_occurrences) before any traversal.
/// The rest only appear as the terminal element of an [`OccurrenceStream`](crate::OccurrenceStream).
#[derive(Error, Debug)]
pub enum SearchError {
    // Request
    #[error("root directory not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // Traversal
    #[error("directory walk failed{}", .path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default())]
    Traversal {
        path: Option<PathBuf>,
        #[source]
        source: walkdir::Error,
    },

    #[error("{0} thread panicked")]
    WorkerPanicked(&'static str),

    #[error("search cancelled")]
    Cancelled,
}

/// Coarse category of a [`SearchError`], for callers that only branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchErrorKind {
    NotFound,
    PermissionDenied,
    InvalidArgument,
    Traversal,
    Cancelled,
}

impl SearchError {
    pub fn kind(&self) -> SearchErrorKind {
        match self {
            Self::NotFound(_) => SearchErrorKind::NotFound,
            Self::PermissionDenied(_) => SearchErrorKind::PermissionDenied,
            Self::InvalidArgument(_) => SearchErrorKind::InvalidArgument,
            Self::Traversal { .. } | Self::WorkerPanicked(_) => SearchErrorKind::Traversal,
            Self::Cancelled => SearchErrorKind::Cancelled,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// True for errors raised by validation, before the stream exists.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::PermissionDenied(_) | Self::InvalidArgument(_)
        )
    }
}

/// Outcome of a failed walk or scan step.
///
/// `Skip` is the expected case: an entry vanished or became unreadable. It is logged and the
/// entry contributes nothing. `Abort` carries something that must end the search.
#[derive(Debug)]
pub(crate) enum EntryFailure {
    Skip(String),
    Abort(SearchError),
}

impl From<std::io::Error> for EntryFailure {
    fn from(err: std::io::Error) -> Self {
        EntryFailure::Skip(err.to_string())
    }
}

impl From<SearchError> for EntryFailure {
    fn from(err: SearchError) -> Self {
        EntryFailure::Abort(err)
    }
}
