use anyhow::Result;
use clap::Parser;
use mmtd::standalone::{run_job, Args, Job};
use mmtd::logging;

fn main() -> Result<()> {
    logging::init();
    let job = Job::from(Args::parse());
    for path in run_job(&job)? {
        println!("{}", path.display());
    }
    Ok(())
}
