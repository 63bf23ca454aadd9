//! Map-only cleaning of the 19-column Spotify tracks CSV.
//!
//! Numeric features are clipped into range or replaced by a default when
//! missing or unparsable; `explicit` and `mode` are normalized to `0`/`1`;
//! `key` is folded into `0..=11`; `release_date` is cut to its year. Rows
//! without an `id` are dropped. Every fix bumps a named counter, and the
//! counters are logged once per input file.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use crate::*;
use bytes::Bytes;
use tracing::info;

pub const NUM_COLUMNS: usize = 19;

pub const IDX_VALENCE: usize = 0;
pub const IDX_YEAR: usize = 1;
pub const IDX_ACOUSTICNESS: usize = 2;
pub const IDX_ARTISTS: usize = 3;
pub const IDX_DANCEABILITY: usize = 4;
pub const IDX_DURATION_MS: usize = 5;
pub const IDX_ENERGY: usize = 6;
pub const IDX_EXPLICIT: usize = 7;
pub const IDX_ID: usize = 8;
pub const IDX_INSTRUMENTAL: usize = 9;
pub const IDX_KEY: usize = 10;
pub const IDX_LIVENESS: usize = 11;
pub const IDX_LOUDNESS: usize = 12;
pub const IDX_MODE: usize = 13;
pub const IDX_NAME: usize = 14;
pub const IDX_POPULARITY: usize = 15;
pub const IDX_RELEASE_DATE: usize = 16;
pub const IDX_SPEECHINESS: usize = 17;
pub const IDX_TEMPO: usize = 18;

/// Named fix counters for one input.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FixCounters(BTreeMap<&'static str, u64>);

impl FixCounters {
    pub fn bump(&mut self, name: &'static str) {
        *self.0.entry(name).or_insert(0) += 1;
    }

    pub fn get(&self, name: &str) -> u64 {
        self.0.get(name).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Range, default and counter names for one numeric column.
struct Rule<T> {
    min: T,
    max: T,
    default: T,
    missing: &'static str,
    parse_err: &'static str,
    clipped: &'static str,
}

const VALENCE: Rule<f64> = Rule { min: 0.0, max: 1.0, default: 0.5, missing: "VALENCE_MISSING", parse_err: "VALENCE_PARSE_ERR", clipped: "VALENCE_CLIPPED" };
const YEAR: Rule<i32> = Rule { min: 1921, max: 2020, default: 2000, missing: "YEAR_MISSING", parse_err: "YEAR_PARSE_ERR", clipped: "YEAR_CLIPPED" };
const ACOUSTICNESS: Rule<f64> = Rule { min: 0.0, max: 1.0, default: 0.5, missing: "ACOUSTIC_MISSING", parse_err: "ACOUSTIC_PARSE_ERR", clipped: "ACOUSTIC_CLIPPED" };
const DANCEABILITY: Rule<f64> = Rule { min: 0.0, max: 0.99, default: 0.5, missing: "DANCE_MISSING", parse_err: "DANCE_PARSE_ERR", clipped: "DANCE_CLIPPED" };
const DURATION_MS: Rule<i64> = Rule { min: 5108, max: 5_400_000, default: 180_000, missing: "DUR_MISSING", parse_err: "DUR_PARSE_ERR", clipped: "DUR_CLIPPED" };
const ENERGY: Rule<f64> = Rule { min: 0.0, max: 1.0, default: 0.5, missing: "ENERGY_MISSING", parse_err: "ENERGY_PARSE_ERR", clipped: "ENERGY_CLIPPED" };
const INSTRUMENTALNESS: Rule<f64> = Rule { min: 0.0, max: 1.0, default: 0.0, missing: "INSTR_MISSING", parse_err: "INSTR_PARSE_ERR", clipped: "INSTR_CLIPPED" };
const LIVENESS: Rule<f64> = Rule { min: 0.0, max: 1.0, default: 0.5, missing: "LIVENESS_MISSING", parse_err: "LIVENESS_PARSE_ERR", clipped: "LIVENESS_CLIPPED" };
const LOUDNESS: Rule<f64> = Rule { min: -60.0, max: 3.85, default: -10.0, missing: "LOUD_MISSING", parse_err: "LOUD_PARSE_ERR", clipped: "LOUD_CLIPPED" };
const POPULARITY: Rule<i32> = Rule { min: 0, max: 100, default: 50, missing: "POP_MISSING", parse_err: "POP_PARSE_ERR", clipped: "POP_CLIPPED" };
const RELEASE_YEAR: Rule<i32> = Rule { min: 1921, max: 2020, default: 1970, missing: "RELDATE_MISSING", parse_err: "RELDATE_PARSE_ERR", clipped: "RELDATE_CLIPPED" };
const SPEECHINESS: Rule<f64> = Rule { min: 0.0, max: 0.97, default: 0.48, missing: "SPEECH_MISSING", parse_err: "SPEECH_PARSE_ERR", clipped: "SPEECH_CLIPPED" };
const TEMPO: Rule<f64> = Rule { min: 0.0, max: 244.0, default: 120.0, missing: "TEMPO_MISSING", parse_err: "TEMPO_PARSE_ERR", clipped: "TEMPO_CLIPPED" };

/// Render a double with a decimal point, switching to `E` notation
/// outside `[1e-3, 1e7)`: `0.5`, `120.0`, `1.2E-5`.
pub fn format_double(v: f64) -> String {
    let abs = v.abs();
    if v == 0.0 || !v.is_finite() || (1e-3..1e7).contains(&abs) {
        return format!("{v:?}");
    }
    let sci = format!("{v:E}");
    match sci.split_once('E') {
        Some((mantissa, exp)) if !mantissa.contains('.') => format!("{mantissa}.0E{exp}"),
        _ => sci,
    }
}

trait Cell: Copy + PartialOrd + FromStr + Display {
    fn render(self) -> String {
        self.to_string()
    }
}

impl Cell for i32 {}
impl Cell for i64 {}
impl Cell for f64 {
    fn render(self) -> String {
        format_double(self)
    }
}

fn is_missing(s: &str) -> bool {
    s.trim().is_empty()
}

fn fix_numeric<T: Cell>(s: &str, rule: &Rule<T>, counters: &mut FixCounters) -> String {
    if is_missing(s) {
        counters.bump(rule.missing);
        return rule.default.render();
    }
    match s.trim().parse::<T>() {
        Ok(v) if v < rule.min => {
            counters.bump(rule.clipped);
            rule.min.render()
        }
        Ok(v) if v > rule.max => {
            counters.bump(rule.clipped);
            rule.max.render()
        }
        Ok(v) => v.render(),
        Err(_) => {
            counters.bump(rule.parse_err);
            rule.default.render()
        }
    }
}

fn fix_binary(s: &str, missing: &'static str, parse_err: &'static str, counters: &mut FixCounters) -> String {
    if is_missing(s) {
        counters.bump(missing);
        return "0".to_string();
    }
    match s.trim().to_lowercase().as_str() {
        "0" | "false" | "no" | "n" => "0".to_string(),
        "1" | "true" | "yes" | "y" => "1".to_string(),
        _ => {
            counters.bump(parse_err);
            "0".to_string()
        }
    }
}

fn fix_text(s: &str, placeholder: &str, counter: &'static str, counters: &mut FixCounters) -> String {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        counters.bump(counter);
        return placeholder.to_string();
    }
    trimmed.to_string()
}

fn fix_key(s: &str, counters: &mut FixCounters) -> String {
    if is_missing(s) {
        counters.bump("KEY_MISSING");
        return "0".to_string();
    }
    match s.trim().parse::<i32>() {
        Ok(v) if v < 0 => {
            counters.bump("KEY_NEGATIVE_CLIPPED");
            "0".to_string()
        }
        Ok(v) if v > 11 => {
            counters.bump("KEY_MOD_12");
            (v % 12).to_string()
        }
        Ok(v) => v.to_string(),
        Err(_) => {
            counters.bump("KEY_PARSE_ERR");
            "0".to_string()
        }
    }
}

/// First four characters of a trimmed date, or empty when shorter.
fn release_year(s: &str) -> &str {
    let t = s.trim();
    match t.char_indices().nth(4) {
        Some((end, _)) => &t[..end],
        None if t.chars().count() == 4 => t,
        None => "",
    }
}

/// Clean one data row. Returns `None` when the row is dropped.
pub fn clean_row(line: &str, counters: &mut FixCounters) -> Option<String> {
    let mut fields: Vec<String> = line.split(',').map(str::to_string).collect();
    if fields.len() != NUM_COLUMNS {
        counters.bump("BAD_NUM_FIELDS");
        return None;
    }

    fields[IDX_VALENCE] = fix_numeric(&fields[IDX_VALENCE], &VALENCE, counters);
    fields[IDX_YEAR] = fix_numeric(&fields[IDX_YEAR], &YEAR, counters);
    fields[IDX_ACOUSTICNESS] = fix_numeric(&fields[IDX_ACOUSTICNESS], &ACOUSTICNESS, counters);
    fields[IDX_ARTISTS] = fix_text(&fields[IDX_ARTISTS], "Unknown Artist", "ARTISTS_IMPUTED_UNKNOWN", counters);
    fields[IDX_DANCEABILITY] = fix_numeric(&fields[IDX_DANCEABILITY], &DANCEABILITY, counters);
    fields[IDX_DURATION_MS] = fix_numeric(&fields[IDX_DURATION_MS], &DURATION_MS, counters);
    fields[IDX_ENERGY] = fix_numeric(&fields[IDX_ENERGY], &ENERGY, counters);
    fields[IDX_EXPLICIT] = fix_binary(&fields[IDX_EXPLICIT], "EXPL_MISSING", "EXPL_PARSE_ERR", counters);
    // fixes to the columns before `id` are still counted for dropped rows
    let id = fields[IDX_ID].trim().to_string();
    if id.is_empty() {
        counters.bump("ID_MISSING_DROPPED");
        return None;
    }
    fields[IDX_ID] = id;
    fields[IDX_INSTRUMENTAL] = fix_numeric(&fields[IDX_INSTRUMENTAL], &INSTRUMENTALNESS, counters);
    fields[IDX_KEY] = fix_key(&fields[IDX_KEY], counters);
    fields[IDX_LIVENESS] = fix_numeric(&fields[IDX_LIVENESS], &LIVENESS, counters);
    fields[IDX_LOUDNESS] = fix_numeric(&fields[IDX_LOUDNESS], &LOUDNESS, counters);
    fields[IDX_MODE] = fix_binary(&fields[IDX_MODE], "MODE_MISSING", "MODE_PARSE_ERR", counters);
    fields[IDX_NAME] = fix_text(&fields[IDX_NAME], "Unknown Title", "NAME_IMPUTED_UNKNOWN", counters);
    fields[IDX_POPULARITY] = fix_numeric(&fields[IDX_POPULARITY], &POPULARITY, counters);
    let year = release_year(&fields[IDX_RELEASE_DATE]).to_string();
    fields[IDX_RELEASE_DATE] = fix_numeric(&year, &RELEASE_YEAR, counters);
    fields[IDX_SPEECHINESS] = fix_numeric(&fields[IDX_SPEECHINESS], &SPEECHINESS, counters);
    fields[IDX_TEMPO] = fix_numeric(&fields[IDX_TEMPO], &TEMPO, counters);

    Some(fields.join(","))
}

pub fn map(kv: KeyValue, _aux: Bytes) -> MapOutput {
    let s = utils::string_from_bytes(kv.value)?;
    let mut counters = FixCounters::default();
    let mut header_seen = false;
    let mut rows = Vec::new();

    for line in s.lines() {
        if !header_seen && line.starts_with("valence") {
            header_seen = true;
            rows.push(line.to_string());
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        if let Some(row) = clean_row(line, &mut counters) {
            rows.push(row);
        }
    }

    if !counters.is_empty() {
        let file = String::from_utf8_lossy(&kv.key);
        info!(file = %file, rows = rows.len(), counters = ?counters.0, "spotify cleaning fixes");
    }

    let iter = rows
        .into_iter()
        .map(|row| Ok(KeyValue::new(Bytes::new(), row)));
    Ok(Box::new(iter))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "valence,year,acousticness,artists,danceability,duration_ms,energy,explicit,id,instrumentalness,key,liveness,loudness,mode,name,popularity,release_date,speechiness,tempo";

    #[test]
    fn clean_row_passes_valid_values() {
        let mut c = FixCounters::default();
        let row = "0.5,1999,0.1,Adele,0.7,200000,0.8,1,abc,0.0,5,0.2,-5.5,0,Hello,70,1999-05-01,0.05,120.5";
        assert_eq!(
            clean_row(row, &mut c).unwrap(),
            "0.5,1999,0.1,Adele,0.7,200000,0.8,1,abc,0.0,5,0.2,-5.5,0,Hello,70,1999,0.05,120.5"
        );
        assert!(c.is_empty());
    }

    #[test]
    fn clean_row_imputes_and_clips() {
        let mut c = FixCounters::default();
        let row = ",1800,2,  ,0.995,1,x,yes, id9 ,,14,0.2,-80,maybe,,101,19,1.5,300";
        assert_eq!(
            clean_row(row, &mut c).unwrap(),
            "0.5,1921,1.0,Unknown Artist,0.99,5108,0.5,1,id9,0.0,2,0.2,-60.0,0,Unknown Title,100,1970,0.97,244.0"
        );
        assert_eq!(c.get("VALENCE_MISSING"), 1);
        assert_eq!(c.get("YEAR_CLIPPED"), 1);
        assert_eq!(c.get("ENERGY_PARSE_ERR"), 1);
        assert_eq!(c.get("KEY_MOD_12"), 1);
        assert_eq!(c.get("MODE_PARSE_ERR"), 1);
        assert_eq!(c.get("RELDATE_MISSING"), 1);
        assert_eq!(c.get("ARTISTS_IMPUTED_UNKNOWN"), 1);
    }

    #[test]
    fn rows_without_id_or_with_wrong_width_are_dropped() {
        let mut c = FixCounters::default();
        assert!(clean_row("0.5,1999,0.1,A,0.7,1,0.8,1,  ,0,5,0.2,-5,0,H,70,1999,0.05,120", &mut c).is_none());
        assert!(clean_row("0.5,1999", &mut c).is_none());
        assert_eq!(c.get("ID_MISSING_DROPPED"), 1);
        assert_eq!(c.get("BAD_NUM_FIELDS"), 1);
    }

    #[test]
    fn double_rendering() {
        assert_eq!(format_double(0.5), "0.5");
        assert_eq!(format_double(120.0), "120.0");
        assert_eq!(format_double(-60.0), "-60.0");
        assert_eq!(format_double(0.0), "0.0");
        assert_eq!(format_double(1.2e-5), "1.2E-5");
        assert_eq!(format_double(1e7), "1.0E7");
    }

    #[test]
    fn map_keeps_header_and_skips_blank_lines() {
        let body = format!("{HEADER}\n\n0.5,1999,0.1,A,0.7,200000,0.8,0,id1,0.0,5,0.2,-5.5,1,T,70,1999,0.05,120.0\n");
        let values = map(KeyValue::new("spotify.csv", body), Bytes::new())
            .unwrap()
            .map(|kv| kv.unwrap().into_value())
            .collect::<Vec<_>>();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0], Bytes::from(HEADER));
    }
}
