//! Average audio features per release year.
//!
//! Map keys are four-digit years (so byte order is year order); values are
//! nine big-endian `f64`s. The year window defaults to 1960..=2020 and can be
//! changed with the auxiliary arguments `--from <year> --to <year>`.

use crate::utils::split_outside_quotes;
use crate::workload::spotify_clean::{
    format_double, IDX_ACOUSTICNESS, IDX_DANCEABILITY, IDX_ENERGY, IDX_INSTRUMENTAL, IDX_LIVENESS,
    IDX_LOUDNESS, IDX_SPEECHINESS, IDX_TEMPO, IDX_VALENCE, IDX_YEAR, NUM_COLUMNS,
};
use crate::*;
use anyhow::Result;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use clap::Parser;

pub const HEADER: &str = "year,avg_valence,avg_danceability,avg_energy,avg_acousticness,avg_instrumentalness,avg_liveness,avg_loudness,avg_speechiness,avg_tempo,song_count";

const NUM_FEATURES: usize = 9;

#[derive(Parser, Debug)]
#[clap(no_binary_name = true)]
struct Args {
    #[clap(long, default_value_t = 1960)]
    from: i32,
    #[clap(long, default_value_t = 2020)]
    to: i32,
}

fn parse_args(aux: &Bytes) -> Result<Args> {
    let args: Vec<String> = if aux.is_empty() {
        Vec::new()
    } else {
        serde_json::from_slice(aux)?
    };
    Ok(Args::try_parse_from(args)?)
}

/// Year and the nine features, in output order, of one CSV row.
fn parse_row(line: &str) -> Option<(i32, [f64; NUM_FEATURES])> {
    let fields = split_outside_quotes(line);
    if fields.len() < NUM_COLUMNS {
        return None;
    }
    let num = |i: usize| fields[i].trim().parse::<f64>().ok();
    let year = fields[IDX_YEAR].parse::<i32>().ok()?;
    let features = [
        num(IDX_VALENCE)?,
        num(IDX_DANCEABILITY)?,
        num(IDX_ENERGY)?,
        num(IDX_ACOUSTICNESS)?,
        num(IDX_INSTRUMENTAL)?,
        num(IDX_LIVENESS)?,
        num(IDX_LOUDNESS)?,
        num(IDX_SPEECHINESS)?,
        num(IDX_TEMPO)?,
    ];
    Some((year, features))
}

pub fn map(kv: KeyValue, aux: Bytes) -> MapOutput {
    let args = parse_args(&aux)?;
    let s = utils::string_from_bytes(kv.value)?;

    let mut header_checked = false;
    let mut rows = Vec::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !header_checked {
            header_checked = true;
            if line.to_lowercase().starts_with("valence") {
                continue;
            }
        }
        match parse_row(line) {
            Some((year, features)) if (args.from..=args.to).contains(&year) => rows.push((year, features)),
            _ => {}
        }
    }

    let mut value_buf = BytesMut::with_capacity(rows.len() * NUM_FEATURES * 8);
    let iter = rows.into_iter().map(move |(year, features)| {
        for f in features {
            value_buf.put_f64(f);
        }
        let value = value_buf.split().freeze();
        Ok(KeyValue::new(format!("{year:04}"), value))
    });
    Ok(Box::new(iter))
}

pub fn reduce(
    key: Bytes,
    values: Box<dyn Iterator<Item = Bytes> + '_>,
    _aux: Bytes,
) -> Result<Bytes> {
    let mut sums = [0.0f64; NUM_FEATURES];
    let mut count: u64 = 0;
    for mut value in values {
        if value.len() != NUM_FEATURES * 8 {
            continue;
        }
        for sum in sums.iter_mut() {
            *sum += value.get_f64();
        }
        count += 1;
    }
    if count == 0 {
        return Ok(Bytes::new());
    }

    let year = utils::string_from_bytes(key)?;
    let mut line = year;
    for sum in sums {
        line.push(',');
        line.push_str(&format_double(sum / count as f64));
    }
    line.push_str(&format!(",{count}\n"));
    Ok(Bytes::from(line))
}
