use anyhow::{bail, Context, Result};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use crate::constants::ENV_N_REDUCE;
use crate::workload;

pub mod engine;

#[derive(Parser, Debug)]
#[command(version, about = "Run a workload over local files in one process", long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a job locally
    Submit {
        /// Glob spec for the input files
        #[arg(short, long)]
        input: String,

        /// Name of the workload
        #[arg(short, long)]
        workload: String,

        /// Output directory
        #[arg(short, long)]
        output: String,

        /// Number of reduce buckets (output files)
        #[arg(short, long, env = ENV_N_REDUCE, default_value_t = 1)]
        n_reduce: u32,

        /// Auxiliary arguments to pass to the MapReduce application.
        #[clap(value_parser, last = true)]
        args: Vec<String>,
    },
}

#[derive(Debug, Clone)]
pub struct Job {
    pub input: String,
    pub workload: String,
    pub output: String,
    pub n_reduce: u32,
    pub args: Vec<String>,
}

impl From<Args> for Job {
    fn from(args: Args) -> Self {
        match args.command {
            Commands::Submit {
                input,
                workload,
                output,
                n_reduce,
                args,
            } => Job {
                input,
                workload,
                output,
                n_reduce,
                args,
            },
        }
    }
}

/// Map, shuffle and reduce `job` in memory. Returns the output files written.
///
/// The map logic carries out mapping and also the partitioning into
/// buckets; each bucket is then sorted by key before reduction, so the
/// reduce functions never depend on input order.
pub fn run_job(job: &Job) -> Result<Vec<PathBuf>> {
    if job.n_reduce == 0 {
        bail!("n_reduce must be at least 1");
    }
    let app = workload::named(&job.workload)?;
    let serialized_args = Bytes::from(serde_json::to_string(&job.args)?);

    info!(workload = %job.workload, input = %job.input, n_reduce = job.n_reduce, "starting job");
    let buckets = engine::perform_map(job, &app, &serialized_args, job.n_reduce)
        .with_context(|| format!("map phase of {}", job.workload))?;
    let outputs = engine::perform_reduce(job, &app, &serialized_args, buckets)
        .with_context(|| format!("reduce phase of {}", job.workload))?;
    info!(files = outputs.len(), output = %job.output, "job done");
    Ok(outputs)
}
