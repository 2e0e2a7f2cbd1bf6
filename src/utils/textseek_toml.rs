//! Load `.textseek.toml` from a directory (CLI only). Lib does not use this; the consuming program injects config via SearchOpts.

use serde::Deserialize;
use std::path::Path;

use crate::Opts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Deserialize)]
pub(crate) struct TextseekToml {
    #[serde(default)]
    settings: SearchSection,
}

#[derive(Debug, Default, Deserialize)]
struct SearchSection {
    hidden: Option<bool>,
    verbose: Option<bool>,
    json: Option<bool>,
    count: Option<bool>,
    workers: Option<usize>,
}

/// Load `.textseek.toml` from `dir` if present. Returns None if file missing or unreadable. CLI only.
pub(crate) fn load_textseek_toml(dir: &Path) -> Option<TextseekToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_textseek_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

pub(crate) fn parse_textseek_toml(s: &str) -> Result<TextseekToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $opts:expr, $sec_field:ident => $opts_field:ident) => {
        if let Some(v) = $sec.$sec_field {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only set fields present in the file). Call before applying CLI.
pub(crate) fn apply_file_to_opts(file: &TextseekToml, opts: &mut Opts) {
    let sec = &file.settings;
    apply_file_opt!(sec, opts, hidden => search_hidden);
    apply_file_opt!(sec, opts, verbose => verbose);
    apply_file_opt!(sec, opts, json => json);
    apply_file_opt!(sec, opts, count => count_only);
    if let Some(n) = sec.workers {
        opts.scan_workers = Some(n);
    }
}
