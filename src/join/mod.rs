//! Dataset merging on normalized artist/track names.
//!
//! [`merge_tweets`] enriches tweets with Spotify metadata, Hot 100 chart
//! data and artist rankings. [`merge_spotify_top`] enriches Spotify tracks
//! with the top songs and top artists lists, keyed on the primary artist.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

pub mod artist;
pub mod insights;
pub mod normalize;
pub mod table;

pub use artist::primary_artist;
pub use normalize::normalize_text;
pub use table::Table;

use crate::error::JoinError;

pub const ARTIST_NAME: &str = "artist_name";
pub const TRACK_NAME: &str = "track_name";
pub const PRIMARY_ARTIST: &str = "primary_artist";

/// Column names of the headerless top artists file.
pub const TOP_ARTISTS_COLUMNS: &[&str] = &["artist_name", "artist_listeners"];
/// Column names of the headerless top songs file.
pub const TOP_SONGS_COLUMNS: &[&str] = &["track_name", "artist_name", "song_release_date", "song_listens"];

fn normalize_cell(cell: Option<&str>) -> Option<String> {
    Some(normalize_text(cell))
}

/// Tweets ⋈ Spotify ⋈ Hot 100 on (artist, track), then ⋈ artists on artist.
///
/// All four tables get their name columns normalized in place first.
pub fn merge_tweet_tables(
    mut tweets: Table,
    mut spotify: Table,
    mut hot100: Table,
    mut artists: Table,
) -> Result<Table, JoinError> {
    for t in [&mut tweets, &mut spotify, &mut hot100] {
        t.map_column(ARTIST_NAME, normalize_cell)?;
        t.map_column(TRACK_NAME, normalize_cell)?;
    }
    artists.map_column(ARTIST_NAME, normalize_cell)?;

    let on = [ARTIST_NAME, TRACK_NAME];
    let merged = tweets.left_join(&spotify, &on, &on)?;
    let merged = merged.left_join(&hot100, &on, &on)?;
    merged.left_join(&artists, &[ARTIST_NAME], &[ARTIST_NAME])
}

/// Spotify ⋈ top songs on (name, primary artist), then ⋈ top artists on
/// primary artist. The right-hand name columns are dropped afterwards.
pub fn merge_spotify_top_tables(mut spotify: Table, top_songs: &Table, top_artists: &Table) -> Result<Table, JoinError> {
    spotify.derive_column("artists", PRIMARY_ARTIST, primary_artist)?;

    let merged = spotify.left_join(top_songs, &["name", PRIMARY_ARTIST], &[TRACK_NAME, ARTIST_NAME])?;
    let mut merged = merged.left_join(top_artists, &[PRIMARY_ARTIST], &[ARTIST_NAME])?;
    merged.drop_columns(&[TRACK_NAME, "artist_name_x", "artist_name_y"]);
    Ok(merged)
}

/// File locations for [`merge_tweets`].
#[derive(Debug, Clone)]
pub struct MergeTweetsPaths {
    pub tweets: PathBuf,
    pub spotify: PathBuf,
    pub hot100: PathBuf,
    pub artists: PathBuf,
    pub output: PathBuf,
}

/// File locations for [`merge_spotify_top`].
#[derive(Debug, Clone)]
pub struct MergeSpotifyTopPaths {
    pub spotify: PathBuf,
    pub top_songs: PathBuf,
    pub top_artists: PathBuf,
    pub output: PathBuf,
}

fn load(path: &Path, names: Option<&[&str]>) -> Result<Table> {
    Table::from_path(path, names).with_context(|| format!("loading {}", path.display()))
}

/// Load, merge and write the tweet tables. Returns the shape written.
pub fn merge_tweets(paths: &MergeTweetsPaths) -> Result<(usize, usize)> {
    let merged = merge_tweet_tables(
        load(&paths.tweets, None)?,
        load(&paths.spotify, None)?,
        load(&paths.hot100, None)?,
        load(&paths.artists, None)?,
    )?;
    merged
        .to_path(&paths.output)
        .with_context(|| format!("writing {}", paths.output.display()))?;
    let shape = merged.shape();
    info!(output = %paths.output.display(), rows = shape.0, columns = shape.1, "saved merged tweets");
    Ok(shape)
}

/// Load, merge and write the Spotify/top lists tables. Returns the shape written.
pub fn merge_spotify_top(paths: &MergeSpotifyTopPaths) -> Result<(usize, usize)> {
    let merged = merge_spotify_top_tables(
        load(&paths.spotify, None)?,
        &load(&paths.top_songs, Some(TOP_SONGS_COLUMNS))?,
        &load(&paths.top_artists, Some(TOP_ARTISTS_COLUMNS))?,
    )?;
    merged
        .to_path(&paths.output)
        .with_context(|| format!("writing {}", paths.output.display()))?;
    let shape = merged.shape();
    info!(output = %paths.output.display(), rows = shape.0, columns = shape.1, "saved merged spotify top lists");
    Ok(shape)
}
