use anyhow::{Context, Result};
use clap::Parser;
use mmtd::cmd::join::{Args, Task};
use mmtd::join::{self, insights, Table};
use mmtd::logging;

fn main() -> Result<()> {
    logging::init();
    match Task::from(Args::parse()) {
        Task::MergeTweets(paths) => {
            let (rows, columns) = join::merge_tweets(&paths)?;
            println!("Saved {} ({rows} rows, {columns} columns)", paths.output.display());
        }
        Task::MergeSpotify(paths) => {
            let (rows, columns) = join::merge_spotify_top(&paths)?;
            println!("Saved {} ({rows} rows, {columns} columns)", paths.output.display());
        }
        Task::Insights { input, top_n, x, y, json } => {
            let table = Table::from_path(&input, None).with_context(|| format!("loading {}", input.display()))?;
            let report = insights::report(&table, top_n, &x, &y)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{report}");
            }
        }
    }
    Ok(())
}
