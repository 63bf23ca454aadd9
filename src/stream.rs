//! Line-at-a-time stages of the tweet aggregation, Hadoop-streaming style.
//!
//! Each stage reads UTF-8 lines from a [`BufRead`] and writes tab-separated
//! lines to a [`Write`]. Cleaning and count emission drop lines they cannot
//! use. Reduction fails on the first malformed line.

use std::fmt;
use std::io::{self, BufRead, Write};

use tracing::{debug, trace};

use crate::error::RecordError;
use crate::record::{CleanedTweet, CountRecord, TweetRecord};

/// Lazily validate raw tweet lines.
///
/// Invalid lines are skipped; read errors are passed through.
pub fn clean<R: BufRead>(reader: R) -> impl Iterator<Item = io::Result<TweetRecord>> {
    reader.lines().enumerate().filter_map(|(i, line)| match line {
        Ok(line) => {
            let rec = TweetRecord::parse_raw(&line);
            if rec.is_none() {
                trace!(line = i + 1, "dropping raw tweet line");
            }
            rec.map(Ok)
        }
        Err(e) => Some(Err(e)),
    })
}

/// Write one cleaned line per valid raw tweet. Returns the number written.
pub fn run_clean<R: BufRead, W: Write>(reader: R, mut writer: W) -> io::Result<u64> {
    let mut written = 0;
    for rec in clean(reader) {
        writeln!(writer, "{}", rec?)?;
        written += 1;
    }
    writer.flush()?;
    debug!(records = written, "clean stage done");
    Ok(written)
}

/// Write four count lines per cleaned tweet line. Returns the number of tweets seen.
pub fn run_emit_counts<R: BufRead, W: Write>(reader: R, mut writer: W) -> io::Result<u64> {
    let mut tweets = 0;
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let Some(tweet) = CleanedTweet::parse(&line) else {
            trace!(line = i + 1, "dropping cleaned line without 6 fields");
            continue;
        };
        for count in tweet.counts() {
            writeln!(writer, "{count}")?;
        }
        tweets += 1;
    }
    writer.flush()?;
    debug!(tweets, "count stage done");
    Ok(tweets)
}

/// Sum for one contiguous run of a (dimension, key) pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupTotal {
    pub dimension: String,
    pub key: String,
    /// Wider than a single count so long runs of large counts cannot overflow.
    pub total: i128,
}

impl fmt::Display for GroupTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.dimension, self.key, self.total)
    }
}

/// Adjacent-duplicate summation.
///
/// Input must arrive sorted by (dimension, key). Nothing checks this: a key
/// whose records are not adjacent gets one total per run.
#[derive(Debug, Default)]
pub struct SortedReducer {
    current: Option<GroupTotal>,
}

impl SortedReducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one record. Returns the previous group when the key changes.
    pub fn push(&mut self, rec: CountRecord<'_>) -> Option<GroupTotal> {
        if let Some(cur) = self.current.as_mut() {
            if cur.dimension == rec.dimension && cur.key == rec.key {
                cur.total += i128::from(rec.count);
                return None;
            }
        }
        self.current.replace(GroupTotal {
            dimension: rec.dimension.to_string(),
            key: rec.key.to_string(),
            total: i128::from(rec.count),
        })
    }

    /// The pending group, if any record was pushed.
    pub fn finish(self) -> Option<GroupTotal> {
        self.current
    }
}

/// Sum counts over a sorted count stream. Returns the number of groups written.
///
/// Stops at the first malformed line; groups flushed before it stay written.
pub fn reduce_sorted<R: BufRead, W: Write>(reader: R, mut writer: W) -> Result<u64, RecordError> {
    let mut reducer = SortedReducer::new();
    let mut groups = 0;
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let rec = match CountRecord::parse(&line, i + 1) {
            Ok(rec) => rec,
            Err(e) => {
                writer.flush()?;
                return Err(e);
            }
        };
        if let Some(done) = reducer.push(rec) {
            writeln!(writer, "{done}")?;
            groups += 1;
        }
    }
    if let Some(done) = reducer.finish() {
        writeln!(writer, "{done}")?;
        groups += 1;
    }
    writer.flush()?;
    debug!(groups, "reduce stage done");
    Ok(groups)
}
