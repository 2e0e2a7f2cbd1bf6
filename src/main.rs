//! textseek CLI: print every occurrence of a literal pattern under a directory.

use anyhow::Result;
use clap::Parser;
use std::time::Instant;
use textseek::engine::arg_parser::Cli;
use textseek::engine::handle_run;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
