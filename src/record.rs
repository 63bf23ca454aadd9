//! Line formats of the tweet aggregation pipeline.
//!
//! Three formats flow through the stages:
//!
//! * raw tweet lines: `tweetId userId artistId trackId YYYY-MM-DD HH:MM:SS`,
//!   whitespace separated;
//! * cleaned tweet lines: the same six fields (weekday appended), tab separated;
//! * count lines: `dimension\tkey\tcount`.

use std::fmt;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDateTime, Timelike};
use regex::Regex;

use crate::constants::{STAT_DIMENSION, TIMESTAMP_FORMAT, TOTAL_TWEETS_KEY};
use crate::error::RecordError;

// strptime field widths: four-digit year, one or two digits elsewhere
static TIMESTAMP_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{1,2}-[0-9]{1,2} [0-9]{1,2}:[0-9]{1,2}:[0-9]{1,2}$").expect("valid regex")
});

/// A validated tweet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TweetRecord {
    pub tweet_id: String,
    pub user_id: String,
    pub artist_id: String,
    pub track_id: String,
    /// Timestamp text as it appeared in the input, tokens re-joined with single spaces.
    pub timestamp: String,
    /// 0 = Monday .. 6 = Sunday.
    pub weekday: u32,
}

fn is_numeric_id(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Parse a timestamp in `YYYY-MM-DD HH:MM:SS` form.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if !TIMESTAMP_SHAPE.is_match(s) {
        return None;
    }
    let dt = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).ok()?;
    // chrono folds second 60 into the nanoseconds; reject it
    if dt.nanosecond() >= 1_000_000_000 {
        return None;
    }
    Some(dt)
}

impl TweetRecord {
    /// Validate a raw whitespace-separated tweet line.
    ///
    /// Returns `None` when there are fewer than five tokens, when any of the
    /// four ids is not made of ASCII digits, or when the timestamp does not parse.
    pub fn parse_raw(line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 5 {
            return None;
        }
        if !parts[..4].iter().all(|p| is_numeric_id(p)) {
            return None;
        }
        let timestamp = parts[4..].join(" ");
        let dt = parse_timestamp(&timestamp)?;

        Some(Self {
            tweet_id: parts[0].to_string(),
            user_id: parts[1].to_string(),
            artist_id: parts[2].to_string(),
            track_id: parts[3].to_string(),
            timestamp,
            weekday: dt.weekday().num_days_from_monday(),
        })
    }

    /// The four count records emitted for this tweet.
    pub fn counts(&self) -> [CountRecord<'_>; 4] {
        CountRecord::for_tweet(&self.user_id, &self.track_id, &self.artist_id)
    }
}

impl fmt::Display for TweetRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.tweet_id, self.user_id, self.artist_id, self.track_id, self.timestamp, self.weekday
        )
    }
}

/// The fields of a cleaned tweet line, borrowed from the line.
///
/// Only the field count is checked; the cleaner already validated the contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CleanedTweet<'a> {
    pub tweet_id: &'a str,
    pub user_id: &'a str,
    pub artist_id: &'a str,
    pub track_id: &'a str,
    pub timestamp: &'a str,
    pub weekday: &'a str,
}

impl<'a> CleanedTweet<'a> {
    /// Split a cleaned line into its six tab-separated fields.
    pub fn parse(line: &'a str) -> Option<Self> {
        let fields: Vec<&str> = line.trim().split('\t').collect();
        match fields[..] {
            [tweet_id, user_id, artist_id, track_id, timestamp, weekday] => Some(Self {
                tweet_id,
                user_id,
                artist_id,
                track_id,
                timestamp,
                weekday,
            }),
            _ => None,
        }
    }

    pub fn counts(&self) -> [CountRecord<'a>; 4] {
        CountRecord::for_tweet(self.user_id, self.track_id, self.artist_id)
    }
}

/// The dimensions tweets are counted along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    Stat,
    User,
    Track,
    Artist,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Stat => STAT_DIMENSION,
            Dimension::User => "USER",
            Dimension::Track => "TRACK",
            Dimension::Artist => "ARTIST",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `dimension\tkey\tcount` line.
///
/// The reducer accepts any dimension name, not only the ones in [`Dimension`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountRecord<'a> {
    pub dimension: &'a str,
    pub key: &'a str,
    pub count: i64,
}

impl<'a> CountRecord<'a> {
    pub fn one(dimension: Dimension, key: &'a str) -> Self {
        Self {
            dimension: dimension.as_str(),
            key,
            count: 1,
        }
    }

    /// Global total first, then user, track and artist.
    pub fn for_tweet(user_id: &'a str, track_id: &'a str, artist_id: &'a str) -> [Self; 4] {
        [
            Self::one(Dimension::Stat, TOTAL_TWEETS_KEY),
            Self::one(Dimension::User, user_id),
            Self::one(Dimension::Track, track_id),
            Self::one(Dimension::Artist, artist_id),
        ]
    }

    /// Parse a count line. `line_no` is 1-based and only used in errors.
    pub fn parse(line: &'a str, line_no: usize) -> Result<Self, RecordError> {
        let fields: Vec<&str> = line.trim().split('\t').collect();
        let [dimension, key, count] = fields[..] else {
            return Err(RecordError::FieldCount {
                line: line_no,
                found: fields.len(),
                text: line.to_string(),
            });
        };
        let count = count.trim().parse::<i64>().map_err(|_| RecordError::Count {
            line: line_no,
            count: count.to_string(),
        })?;
        Ok(Self { dimension, key, count })
    }
}

impl fmt::Display for CountRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.dimension, self.key, self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_line_with_tuesday_timestamp() {
        let rec = TweetRecord::parse_raw("101 202 303 404 2024-03-05 14:30:00").unwrap();
        assert_eq!(rec.user_id, "202");
        assert_eq!(rec.artist_id, "303");
        assert_eq!(rec.track_id, "404");
        assert_eq!(rec.weekday, 1);
        assert_eq!(rec.to_string(), "101\t202\t303\t404\t2024-03-05 14:30:00\t1");
    }

    #[test]
    fn timestamp_tokens_rejoined_with_single_space() {
        let rec = TweetRecord::parse_raw("1  2\t3 4   2024-03-10    00:00:00\n").unwrap();
        assert_eq!(rec.timestamp, "2024-03-10 00:00:00");
        // Sunday
        assert_eq!(rec.weekday, 6);
    }

    #[test]
    fn raw_line_rejections() {
        assert!(TweetRecord::parse_raw("").is_none());
        assert!(TweetRecord::parse_raw("1 2 3 4").is_none());
        assert!(TweetRecord::parse_raw("1 2 3 x4 2024-03-05 14:30:00").is_none());
        assert!(TweetRecord::parse_raw("1 -2 3 4 2024-03-05 14:30:00").is_none());
        assert!(TweetRecord::parse_raw("1 2 3 4 2024-03-05").is_none());
        assert!(TweetRecord::parse_raw("1 2 3 4 2024-02-30 10:00:00").is_none());
        assert!(TweetRecord::parse_raw("1 2 3 4 2024-03-05T14:30:00").is_none());
        assert!(TweetRecord::parse_raw("1 2 3 4 2024-03-05 14:30:00 extra").is_none());
        assert!(TweetRecord::parse_raw("1 2 3 4 24-03-05 14:30:00").is_none());
        assert!(TweetRecord::parse_raw("1 2 3 4 2024-03-05 23:59:60").is_none());
        assert!(TweetRecord::parse_raw("1 2 3 ٤ 2024-03-05 14:30:00").is_none());
    }

    #[test]
    fn unpadded_timestamp_fields_accepted() {
        let rec = TweetRecord::parse_raw("1 2 3 4 2024-3-5 9:05:07").unwrap();
        assert_eq!(rec.timestamp, "2024-3-5 9:05:07");
        assert_eq!(rec.weekday, 1);
    }

    #[test]
    fn cleaned_line_needs_six_fields() {
        let t = CleanedTweet::parse("101\t202\t303\t404\t2024-03-05 14:30:00\t1\n").unwrap();
        assert_eq!(t.user_id, "202");
        assert_eq!(t.weekday, "1");
        assert!(CleanedTweet::parse("101\t202\t303\t404\t2024-03-05 14:30:00").is_none());
        assert!(CleanedTweet::parse("a\tb\tc\td\te\tf\tg").is_none());
    }

    #[test]
    fn counts_in_emission_order() {
        let t = CleanedTweet::parse("101\t202\t303\t404\t2024-03-05 14:30:00\t1").unwrap();
        let lines: Vec<String> = t.counts().iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec!["STAT\tTOTAL_TWEETS\t1", "USER\t202\t1", "TRACK\t404\t1", "ARTIST\t303\t1"]
        );
    }

    #[test]
    fn count_line_parsing() {
        let rec = CountRecord::parse("USER\t5\t3\n", 1).unwrap();
        assert_eq!(rec, CountRecord { dimension: "USER", key: "5", count: 3 });

        match CountRecord::parse("USER\t5", 7) {
            Err(RecordError::FieldCount { line, found, .. }) => {
                assert_eq!(line, 7);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(CountRecord::parse("", 1), Err(RecordError::FieldCount { found: 1, .. })));
        assert!(matches!(CountRecord::parse("USER\t5\tone", 2), Err(RecordError::Count { line: 2, .. })));
    }
}
