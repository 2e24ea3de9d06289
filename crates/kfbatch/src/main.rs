//! kfbatch - cluster resource availability from UGE and SLURM.

mod logging;
mod stat;

use clap::Parser;
use kfbatch_cli::{Args, normalize_legacy_args};
use kfbatch_parsers::CommandRunner;
use miette::{IntoDiagnostic, Result};
use std::io::{self, Write};

fn main() -> Result<()> {
    let args = Args::parse_from(normalize_legacy_args(std::env::args()));
    logging::init(args.verbose);

    // Queries are awaited one at a time.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .into_diagnostic()?;

    let mut stdout = io::stdout().lock();
    let result = runtime.block_on(stat::run_stat(&args, &mut CommandRunner, &mut stdout));
    stdout.flush().into_diagnostic()?;
    result.into_diagnostic()
}
