//! Application configuration constants.
//! Tuning and fixed exclusions in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!(".{pkg}.toml"),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// CLI config file name (e.g. `.textseek.toml`).
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

// ---- Traversal ----

/// Kernel / virtual filesystem roots never traversed, whatever `search_hidden` says.
/// Compared component-wise against canonical paths.
pub const VIRTUAL_FS_PREFIXES: &[&str] = &["/proc", "/sys", "/dev", "/run"];

// ---- Scan workers ----

/// Admission limit for concurrent file scans.
/// Use [`ScanWorkerLimits::current()`] to fill `all_threads` from rayon; the rest are const.
#[derive(Clone, Copy, Debug)]
pub struct ScanWorkerLimits {
    /// Available threads (from rayon); set by [`ScanWorkerLimits::current()`].
    pub all_threads: usize,
    /// Available threads are divided by this to get the scan worker count.
    pub divisor: usize,
    /// Never fewer than this many scan workers.
    pub floor: usize,
}

impl Default for ScanWorkerLimits {
    fn default() -> Self {
        Self {
            all_threads: 0, // use current() to set from rayon
            divisor: Self::DIVISOR,
            floor: Self::FLOOR,
        }
    }
}

impl ScanWorkerLimits {
    pub const DIVISOR: usize = 2;
    pub const FLOOR: usize = 1;

    /// Build limits with `all_threads` set from `rayon::current_num_threads()`.
    pub fn current() -> Self {
        Self {
            all_threads: rayon::current_num_threads(),
            ..Self::default()
        }
    }

    /// Scan worker count for these limits: `max(floor, all_threads / divisor)`.
    pub fn workers(&self) -> usize {
        (self.all_threads / self.divisor).max(self.floor)
    }
}

// ---- Streaming channel cap ----

/// Default capacity of the occurrence channel (scan workers -> stream). Scan workers block
/// when the consumer falls this far behind; the walk is never blocked by it.
pub const OUTPUT_CHANNEL_CAP: usize = 10_000;
