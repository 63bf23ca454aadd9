//! Default file names, environment variable names and record markers.

// Environment variable names
pub const ENV_N_REDUCE: &str = "MMTD_N_REDUCE";
pub const ENV_LOG: &str = "RUST_LOG";

/// Log filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info";

// Inputs and output of `mmtd-join merge-tweets`
pub const DEFAULT_TWEETS_CSV: &str = "tweets_with_names_sample.csv";
pub const DEFAULT_SPOTIFY_CSV: &str = "Spotify_cleaned.csv";
pub const DEFAULT_HOT100_CSV: &str = "hot100_cleaned.csv";
pub const DEFAULT_ARTISTS_CSV: &str = "top_10000_artists.csv";
pub const DEFAULT_MERGED_CSV: &str = "MMTD_MERGED_FINAL.csv";

// Inputs and output of `mmtd-join merge-spotify`
pub const DEFAULT_TOP_SONGS_CSV: &str = "top_10000_songs.csv";
pub const DEFAULT_SPOTIFY_TOP_CSV: &str = "merged_spotify_top.csv";

/// Rows shown by the insights report.
pub const DEFAULT_TOP_N: usize = 10;

/// Timestamp layout accepted by the tweet cleaner.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Dimension and key of the global tweet total.
pub const STAT_DIMENSION: &str = "STAT";
pub const TOTAL_TWEETS_KEY: &str = "TOTAL_TWEETS";
