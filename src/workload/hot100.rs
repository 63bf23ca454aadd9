//! Map-only cleaning of the Billboard Hot 100 chart CSV.
//!
//! The first line of each input is replaced by a fixed header. Each data
//! line is read as eight quote-aware fields, of which the first seven are
//! validated and re-emitted. Rejected lines are logged at `warn`.

use std::sync::LazyLock;

use crate::utils::{escape_csv, take_quoted_fields};
use crate::*;
use bytes::Bytes;
use regex::Regex;
use tracing::warn;

pub const EXPECTED_FIELDS: usize = 8;

pub const HEADER: &str = "Date,Song,Artist,Rank,Last Week,Peak Position,Weeks in Charts";

static CHART_DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid regex"));

fn is_valid_number(s: &str) -> bool {
    s.parse::<i32>().is_ok()
}

/// Strip one pair of surrounding quotes and collapse doubled quotes.
fn unquote(s: &str) -> String {
    let inner = s
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(s);
    inner.replace("\"\"", "\"")
}

/// Why a chart line was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reject {
    InvalidDate(String),
    MissingSongOrArtist,
    InvalidNumber,
    InvalidLastWeek(String),
}

/// Validate one chart line and render the cleaned CSV record.
pub fn clean_line(line: &str) -> Result<String, Reject> {
    let fields = take_quoted_fields(line, EXPECTED_FIELDS);
    let date = fields[0].trim();
    let song = fields[1].trim();
    let artist = fields[2].trim();
    let rank = fields[3].trim();
    let last_week = fields[4].trim();
    let peak_position = fields[5].trim();
    let weeks_in_charts = fields[6].trim();

    if !CHART_DATE.is_match(date) {
        return Err(Reject::InvalidDate(date.to_string()));
    }
    if song.is_empty() || artist.is_empty() {
        return Err(Reject::MissingSongOrArtist);
    }
    if !(is_valid_number(rank) && is_valid_number(peak_position) && is_valid_number(weeks_in_charts)) {
        return Err(Reject::InvalidNumber);
    }
    let last_week = match last_week {
        "" | "#" => "NULL",
        lw if is_valid_number(lw) => lw,
        lw => return Err(Reject::InvalidLastWeek(lw.to_string())),
    };

    Ok([
        date.to_string(),
        escape_csv(&unquote(song)),
        escape_csv(&unquote(artist)),
        rank.to_string(),
        last_week.to_string(),
        peak_position.to_string(),
        weeks_in_charts.to_string(),
    ]
    .join(","))
}

pub fn map(kv: KeyValue, _aux: Bytes) -> MapOutput {
    let s = utils::string_from_bytes(kv.value)?;
    let file = String::from_utf8_lossy(&kv.key).into_owned();
    let mut rows = Vec::new();

    for (i, line) in s.lines().enumerate() {
        if i == 0 {
            rows.push(HEADER.to_string());
            continue;
        }
        match clean_line(line) {
            Ok(row) => rows.push(row),
            Err(reject) => warn!(file = %file, line = i + 1, ?reject, "dropping chart line"),
        }
    }

    let iter = rows
        .into_iter()
        .map(|row| Ok(KeyValue::new(Bytes::new(), row)));
    Ok(Box::new(iter))
}
