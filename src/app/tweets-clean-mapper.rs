//! Validate raw tweet lines on stdin, write cleaned records to stdout.
use std::io::{self, BufWriter};

use anyhow::Result;
use mmtd::{logging, stream};
use tracing::info;

fn main() -> Result<()> {
    logging::init();
    let stdout = io::stdout();
    let kept = stream::run_clean(io::stdin().lock(), BufWriter::new(stdout.lock()))?;
    info!(kept, "cleaning done");
    Ok(())
}
