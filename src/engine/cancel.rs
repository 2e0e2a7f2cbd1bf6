//! Cooperative cancellation shared by the caller, the walk thread, and the scan workers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::SearchError;

/// Cloneable cancellation flag. Every clone observes the same state.
///
/// A token made with [`CancelToken::child`] is cancelled when either it or its parent is;
/// cancelling the child leaves the parent alone. The stream uses a child so it can stop its own
/// pipeline without touching a token the caller passed in.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    parent: Option<Arc<AtomicBool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(&self) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            parent: Some(Arc::clone(&self.flag)),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
            || self
                .parent
                .as_ref()
                .is_some_and(|p| p.load(Ordering::Relaxed))
    }

    /// `Err(SearchError::Cancelled)` once cancelled. Use with `?` at checkpoints.
    pub fn check(&self) -> Result<(), SearchError> {
        if self.is_cancelled() {
            Err(SearchError::Cancelled)
        } else {
            Ok(())
        }
    }
}
