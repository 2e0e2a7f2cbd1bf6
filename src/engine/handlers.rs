//! CLI command handler: run one search and print occurrences as they arrive.

use anyhow::{Context, Result};
use log::debug;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;

use crate::engine::arg_parser::Cli;
use crate::engine::{CancelToken, path_relative_to};
use crate::error::SearchError;
use crate::utils::textseek_toml::{apply_file_to_opts, load_textseek_toml};
use crate::utils::{Colors, setup_logging};
use crate::{Occurrence, Opts, SearchOpts, search_with_opts};

/// Build opts: defaults, then `.textseek.toml` in the current directory, then CLI flags.
fn setup_opts(cli: &Cli) -> Opts {
    let mut opts = Opts::default();
    if let Some(file) = load_textseek_toml(Path::new(".")) {
        apply_file_to_opts(&file, &mut opts);
    }
    if let Some(v) = cli.hidden {
        opts.search_hidden = v;
    }
    if let Some(v) = cli.verbose {
        opts.verbose = v;
    }
    if let Some(v) = cli.json {
        opts.json = v;
    }
    if let Some(v) = cli.count {
        opts.count_only = v;
    }
    if cli.workers.is_some() {
        opts.scan_workers = cli.workers;
    }
    setup_logging(opts.verbose);
    opts
}

/// Path shown to the user: relative to the canonical root, re-joined onto DIR as typed.
fn display_path(occ: &Occurrence, root: &Path, dir: &Path) -> String {
    path_relative_to(&occ.file, root)
        .map(|rel| dir.join(rel))
        .unwrap_or_else(|| occ.file.clone())
        .display()
        .to_string()
}

fn write_occurrence<W: Write>(out: &mut W, occ: &Occurrence, shown: &str, json: bool) -> std::io::Result<()> {
    if json {
        let view = Occurrence {
            file: shown.into(),
            ..*occ
        };
        serde_json::to_writer(&mut *out, &view)?;
        writeln!(out)
    } else {
        let sep = Colors::separator();
        writeln!(
            out,
            "{}{}{}{}{}",
            Colors::path(shown),
            sep,
            Colors::number(occ.line),
            sep,
            Colors::number(occ.offset)
        )
    }
}

/// Run the search and print results. Ctrl+C cancels; a closed stdout ends the search quietly.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let opts = setup_opts(cli);
    let cancel = CancelToken::new();
    let cancel_handler = cancel.clone();
    ctrlc::set_handler(move || cancel_handler.cancel()).context("set Ctrl+C handler")?;

    let search_opts = SearchOpts {
        cancel: Some(cancel.clone()),
        ..SearchOpts::from(&opts)
    };
    let mut stream = search_with_opts(&cli.pattern, &cli.dir, &search_opts)?;
    let root = stream.root().to_path_buf();

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut total = 0_usize;
    for item in stream.by_ref() {
        let occ = match item {
            Ok(occ) => occ,
            Err(SearchError::Cancelled) => {
                out.flush().ok();
                anyhow::bail!("Search cancelled by user after {} occurrences", total);
            }
            Err(e) => return Err(e.into()),
        };
        total += 1;
        if opts.count_only {
            continue;
        }
        let shown = display_path(&occ, &root, &cli.dir);
        if let Err(e) = write_occurrence(&mut out, &occ, &shown, opts.json) {
            if e.kind() == ErrorKind::BrokenPipe {
                debug!("stdout closed, stopping search");
                cancel.cancel();
                return Ok(());
            }
            return Err(e).context("write occurrence");
        }
    }
    if opts.count_only {
        writeln!(out, "{}", total).context("write count")?;
    }
    out.flush().context("flush stdout")?;
    debug!("{} occurrences", total);
    Ok(())
}
