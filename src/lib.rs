//! textseek: concurrent, streaming literal-substring search over a directory tree.
//!
//! One thread walks the tree and hands eligible files to a bounded pool of scan workers; every
//! occurrence is yielded through [`OccurrenceStream`] as soon as it is found.
//!
//! ```no_run
//! use std::path::Path;
//!
//! let stream = textseek::search_for_text_occurrences("TODO", Path::new("."), false)?;
//! for occ in stream {
//!     let occ = occ?;
//!     println!("{}:{}:{}", occ.file.display(), occ.line, occ.offset);
//! }
//! # Ok::<(), textseek::SearchError>(())
//! ```

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use engine::CancelToken;
pub use error::{SearchError, SearchErrorKind};
pub use pipeline::{OccurrenceStream, scan_workers_for};
pub use utils::config::VIRTUAL_FS_PREFIXES;

use log::debug;
use std::path::Path;

use crate::engine::validate_request;
use crate::pipeline::{TraversalPolicy, tuning_from_opts};

/// Search every eligible file under `root` for `pattern`.
///
/// The request is validated here and a request error is returned immediately. On success the
/// returned stream has not touched the tree yet; walking and scanning start on the first `next()`.
pub fn search_for_text_occurrences(
    pattern: &str,
    root: &Path,
    search_hidden: bool,
) -> Result<OccurrenceStream, SearchError> {
    search_with_opts(
        pattern,
        root,
        &SearchOpts {
            search_hidden,
            ..Default::default()
        },
    )
}

/// [`search_for_text_occurrences`] with worker count, channel cap, and cancellation token control.
pub fn search_with_opts(
    pattern: &str,
    root: &Path,
    opts: &SearchOpts,
) -> Result<OccurrenceStream, SearchError> {
    let request = validate_request(pattern, root, opts.search_hidden)?;
    let tuning = tuning_from_opts(opts);
    debug!(
        "{} CONFIG: {:?} {:?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        request,
        tuning
    );
    let policy = TraversalPolicy::new(request.search_hidden());
    let cancel = opts.cancel.clone().unwrap_or_default();
    Ok(OccurrenceStream::new(request, policy, tuning, cancel))
}

/// Run a search to completion and collect the occurrences (arrival order). The first terminal error is returned.
pub fn collect_occurrences(
    pattern: &str,
    root: &Path,
    search_hidden: bool,
) -> Result<Vec<Occurrence>, SearchError> {
    search_for_text_occurrences(pattern, root, search_hidden)?.collect()
}
