//! Sum key-sorted count records from stdin, one total per group on stdout.
//!
//! A malformed line aborts the run with a non-zero exit status.
use std::io::{self, BufWriter};

use anyhow::{Context, Result};
use mmtd::{logging, stream};
use tracing::info;

fn main() -> Result<()> {
    logging::init();
    let stdout = io::stdout();
    let groups = stream::reduce_sorted(io::stdin().lock(), BufWriter::new(stdout.lock()))
        .context("reducing count stream")?;
    info!(groups, "reduce done");
    Ok(())
}
