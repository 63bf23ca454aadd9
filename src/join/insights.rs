//! Tweet volume report over a merged tweets table.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::{Table, ARTIST_NAME, TRACK_NAME};
use crate::error::JoinError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackCount {
    pub artist_name: String,
    pub track_name: String,
    pub tweet_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correlation {
    pub x: String,
    pub y: String,
    /// Pearson coefficient; `None` when it is undefined for the data.
    pub pearson: Option<f64>,
    pub rows_used: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightsReport {
    pub top_tracks: Vec<TrackCount>,
    pub correlation: Correlation,
}

/// Rows per (artist, track), most tweeted first, ties in name order.
///
/// Rows missing either name are not counted.
pub fn top_tracks(table: &Table, n: usize) -> Result<Vec<TrackCount>, JoinError> {
    let mut counts: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    for (artist, track) in table.column(ARTIST_NAME)?.zip(table.column(TRACK_NAME)?) {
        if let (Some(artist), Some(track)) = (artist, track) {
            *counts.entry((artist, track)).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(ranked
        .into_iter()
        .take(n)
        .map(|((artist, track), tweet_count)| TrackCount {
            artist_name: artist.to_string(),
            track_name: track.to_string(),
            tweet_count,
        })
        .collect())
}

/// Pearson correlation of two samples of equal length.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len();
    if n < 2 || n != ys.len() {
        return None;
    }
    let mean = |v: &[f64]| v.iter().sum::<f64>() / n as f64;
    let (mx, my) = (mean(xs), mean(ys));
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mx, y - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some(sxy / (sxx * syy).sqrt())
}

fn finite(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Correlate two numeric columns over the rows where both parse to finite numbers.
///
/// An absent column gives an undefined correlation rather than an error.
pub fn correlate(table: &Table, x: &str, y: &str) -> Correlation {
    let (xs, ys): (Vec<f64>, Vec<f64>) = match (table.column(x), table.column(y)) {
        (Ok(xc), Ok(yc)) => xc
            .zip(yc)
            .filter_map(|(a, b)| Some((finite(a?)?, finite(b?)?)))
            .unzip(),
        _ => (Vec::new(), Vec::new()),
    };
    Correlation {
        x: x.to_string(),
        y: y.to_string(),
        pearson: pearson(&xs, &ys),
        rows_used: xs.len(),
    }
}

pub fn report(table: &Table, n: usize, x: &str, y: &str) -> Result<InsightsReport, JoinError> {
    Ok(InsightsReport {
        top_tracks: top_tracks(table, n)?,
        correlation: correlate(table, x, y),
    })
}

impl fmt::Display for InsightsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Top tracks by tweet volume:")?;
        for t in &self.top_tracks {
            writeln!(f, "{:>8}  {} - {}", t.tweet_count, t.artist_name, t.track_name)?;
        }
        let c = &self.correlation;
        writeln!(f)?;
        write!(f, "Correlation between {} and {}: ", c.x, c.y)?;
        match c.pearson {
            Some(r) => writeln!(f, "{r:.4} ({} rows)", c.rows_used),
            None => writeln!(f, "undefined ({} rows)", c.rows_used),
        }
    }
}
