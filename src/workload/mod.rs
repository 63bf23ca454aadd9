//! Converts workload names to actual application code.
//!
//! # Example
//!
//! To get the tweet profile application:
//! ```
//! # use anyhow::Result;
//! use mmtd::workload;
//! # fn main() -> Result<()> {
//! let profile = workload::named("tweet-profile")?;
//! assert!(profile.header.is_none());
//! # Ok(())
//! # }
//! ```

use crate::Workload;
use anyhow::{bail, Result};
use bytes::{BufMut, Bytes, BytesMut};

pub mod audio_features;
pub mod hot100;
pub mod spotify_clean;
pub mod tweet_profile;
pub mod tweets_clean;

/// Names accepted by [`named`], in registry order.
pub const NAMES: &[&str] = &[
    "tweet-profile",
    "tweets-clean",
    "spotify-clean",
    "hot100-clean",
    "audio-features",
];

/// Gets the [`Workload`] named `name`.
///
/// Returns [`None`] if no application with the given name was found.
pub fn try_named(name: &str) -> Option<Workload> {
    match name {
        "tweet-profile" => Some(Workload {
            map_fn: tweet_profile::map,
            reduce_fn: tweet_profile::reduce,
            header: None,
        }),
        "tweets-clean" => Some(Workload {
            map_fn: tweets_clean::map,
            reduce_fn: concat_lines,
            header: None,
        }),
        "spotify-clean" => Some(Workload {
            map_fn: spotify_clean::map,
            reduce_fn: concat_lines,
            header: None,
        }),
        "hot100-clean" => Some(Workload {
            map_fn: hot100::map,
            reduce_fn: concat_lines,
            header: None,
        }),
        "audio-features" => Some(Workload {
            map_fn: audio_features::map,
            reduce_fn: audio_features::reduce,
            header: Some(audio_features::HEADER),
        }),
        _ => None,
    }
}

/// Gets the [`Workload`] named `name`.
///
/// Returns an [`anyhow::Error`] if no application with the given name was found.
pub fn named(name: &str) -> Result<Workload> {
    match try_named(name) {
        Some(app) => Ok(app),
        None => bail!("No app named `{}` found. Known apps: {}", name, NAMES.join(", ")),
    }
}

/// Reduce function of the map-only jobs: writes every value as a line,
/// in the order the values arrive.
pub fn concat_lines(
    _key: Bytes,
    values: Box<dyn Iterator<Item = Bytes> + '_>,
    _aux: Bytes,
) -> Result<Bytes> {
    let mut writer = BytesMut::new();
    for value in values {
        writer.put(value);
        writer.put_u8(b'\n');
    }
    Ok(writer.freeze())
}
