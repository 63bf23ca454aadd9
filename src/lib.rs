//! Tooling for the music micro-tweet dataset.
//!
//! Two independent pipelines live here. The join pipeline ([`join`])
//! merges tweets, Spotify metadata, the Billboard Hot 100 and artist
//! rankings on normalized artist/track names. The aggregation pipeline
//! ([`stream`]) cleans raw tweet lines, emits one count per dimension and
//! sums counts over a sorted stream, in the style of Hadoop streaming.
//!
//! The same map and reduce logic is also packaged as named [`Workload`]s
//! that the [`standalone`] engine can run over local files, doing the
//! shuffle in memory instead of relying on an external sort.

use bytes::Bytes;
use std::hash::Hasher;

pub mod cmd;
pub mod constants;
pub mod error;
pub mod join;
pub mod logging;
pub mod record;
pub mod standalone;
pub mod stream;
pub mod utils;
pub mod workload;

/////////////////////////////////////////////////////////////////////////////
// MapReduce application types
/////////////////////////////////////////////////////////////////////////////

/// The output of an application map function.
///
/// There are 2 layers of [`anyhow::Result`]s here. The outer layer
/// accounts for errors that arise while creating the iterator.
/// The inner layer accounts for errors that occur during iteration.
pub type MapOutput = anyhow::Result<Box<dyn Iterator<Item = anyhow::Result<KeyValue>>>>;

/// A map function takes a key-value pair (file name, file contents)
/// and auxiliary arguments.
///
/// It returns an iterator that yields intermediate key-value pairs.
pub type MapFn = fn(kv: KeyValue, aux: Bytes) -> MapOutput;

/// A reduce function takes in a key, an iterator over values for that key,
/// and an auxiliary argument. It returns the bytes to append to the
/// output file for that key group.
pub type ReduceFn = fn(
    key: Bytes,
    values: Box<dyn Iterator<Item = Bytes> + '_>,
    aux: Bytes,
) -> anyhow::Result<Bytes>;

/// A map reduce application.
#[derive(Copy, Clone)]
pub struct Workload {
    pub map_fn: MapFn,
    pub reduce_fn: ReduceFn,
    /// Line written once at the top of every output file, if any.
    pub header: Option<&'static str>,
}

/////////////////////////////////////////////////////////////////////////////
// Key-value pairs
/////////////////////////////////////////////////////////////////////////////

/// A single key-value pair.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct KeyValue {
    /// The key.
    pub key: Bytes,
    /// The value.
    pub value: Bytes,
}

impl KeyValue {
    /// Construct a new key-value pair from the given key and value.
    pub fn new(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Get the key of this key-value pair.
    ///
    /// This method is cheap, since [`Bytes`] are cheaply cloneable.
    #[inline]
    pub fn key(&self) -> Bytes {
        self.key.clone()
    }

    /// Consumes the key-value pair and returns the value.
    #[inline]
    pub fn into_value(self) -> Bytes {
        self.value
    }
}

/// Hashes an intermediate key. Compute a reduce bucket for a given key
/// by calculating `ihash(key) % n_reduce`.
pub fn ihash(key: &[u8]) -> u32 {
    let mut hasher = fnv::FnvHasher::with_key(0);
    hasher.write(key);
    // masked to 31 bits, always fits
    (hasher.finish() & 0x7fff_ffff) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ihash_is_stable_and_bounded() {
        let a = ihash(b"USER\t202");
        assert_eq!(a, ihash(b"USER\t202"));
        assert!(a <= 0x7fff_ffff);
        assert_eq!(ihash(b"") % 7, ihash(b"") % 7);
    }

    #[test]
    fn key_value_accessors() {
        let kv = KeyValue::new("k", "v");
        assert_eq!(kv.key(), Bytes::from("k"));
        assert_eq!(kv.into_value(), Bytes::from("v"));
    }
}
