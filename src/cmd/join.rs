use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::constants::*;
use crate::join::{MergeSpotifyTopPaths, MergeTweetsPaths};

#[derive(Parser, Debug)]
#[command(version, about = "Merge and summarize the music tweet datasets", long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Enrich tweets with Spotify, Hot 100 and top artist data
    MergeTweets {
        #[arg(long, default_value = DEFAULT_TWEETS_CSV)]
        tweets: PathBuf,

        #[arg(long, default_value = DEFAULT_SPOTIFY_CSV)]
        spotify: PathBuf,

        #[arg(long, default_value = DEFAULT_HOT100_CSV)]
        hot100: PathBuf,

        /// Artist rankings, with a header row
        #[arg(long, default_value = DEFAULT_ARTISTS_CSV)]
        artists: PathBuf,

        #[arg(short, long, default_value = DEFAULT_MERGED_CSV)]
        output: PathBuf,
    },
    /// Enrich Spotify tracks with the top songs and top artists lists
    MergeSpotify {
        #[arg(long, default_value = DEFAULT_SPOTIFY_CSV)]
        spotify: PathBuf,

        /// Headerless top songs list
        #[arg(long, default_value = DEFAULT_TOP_SONGS_CSV)]
        top_songs: PathBuf,

        /// Headerless top artists list
        #[arg(long, default_value = DEFAULT_ARTISTS_CSV)]
        top_artists: PathBuf,

        #[arg(short, long, default_value = DEFAULT_SPOTIFY_TOP_CSV)]
        output: PathBuf,
    },
    /// Report the most tweeted tracks and a column correlation
    Insights {
        /// Merged tweets table
        #[arg(short, long, default_value = DEFAULT_MERGED_CSV)]
        input: PathBuf,

        /// How many tracks to list
        #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N)]
        top_n: usize,

        #[arg(short, long, default_value = "tweet_count")]
        x: String,

        #[arg(short, long, default_value = "spotify_popularity")]
        y: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Resolved form of a subcommand.
#[derive(Debug)]
pub enum Task {
    MergeTweets(MergeTweetsPaths),
    MergeSpotify(MergeSpotifyTopPaths),
    Insights {
        input: PathBuf,
        top_n: usize,
        x: String,
        y: String,
        json: bool,
    },
}

impl From<Args> for Task {
    fn from(args: Args) -> Self {
        match args.command {
            Commands::MergeTweets {
                tweets,
                spotify,
                hot100,
                artists,
                output,
            } => Task::MergeTweets(MergeTweetsPaths {
                tweets,
                spotify,
                hot100,
                artists,
                output,
            }),
            Commands::MergeSpotify {
                spotify,
                top_songs,
                top_artists,
                output,
            } => Task::MergeSpotify(MergeSpotifyTopPaths {
                spotify,
                top_songs,
                top_artists,
                output,
            }),
            Commands::Insights {
                input,
                top_n,
                x,
                y,
                json,
            } => Task::Insights { input, top_n, x, y, json },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_tweets_defaults() {
        let task = Task::from(Args::try_parse_from(["mmtd-join", "merge-tweets"]).unwrap());
        match task {
            Task::MergeTweets(p) => {
                assert_eq!(p.tweets, PathBuf::from(DEFAULT_TWEETS_CSV));
                assert_eq!(p.output, PathBuf::from(DEFAULT_MERGED_CSV));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn insights_flags() {
        let args = Args::try_parse_from(["mmtd-join", "insights", "-n", "3", "--y", "peak", "--json"]).unwrap();
        match Task::from(args) {
            Task::Insights { input, top_n, x, y, json } => {
                assert_eq!(input, PathBuf::from(DEFAULT_MERGED_CSV));
                assert_eq!((top_n, x.as_str(), y.as_str(), json), (3, "tweet_count", "peak", true));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
