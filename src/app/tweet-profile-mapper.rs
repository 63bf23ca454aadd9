//! Turn cleaned tweet records on stdin into count records on stdout.
use std::io::{self, BufWriter};

use anyhow::Result;
use mmtd::{logging, stream};
use tracing::info;

fn main() -> Result<()> {
    logging::init();
    let stdout = io::stdout();
    let tweets = stream::run_emit_counts(io::stdin().lock(), BufWriter::new(stdout.lock()))?;
    info!(tweets, "count emission done");
    Ok(())
}
