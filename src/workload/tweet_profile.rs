//! Tweet volume per user, track and artist.
//!
//! Runs the cleaner and the count emitter in the map step. Keys are
//! `dimension\tkey`, values a big-endian `u64` count.

use crate::record::TweetRecord;
use crate::*;
use anyhow::{Context, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};

pub fn map(kv: KeyValue, _aux: Bytes) -> MapOutput {
    let s = utils::string_from_bytes(kv.value)?;
    let keys = s
        .lines()
        .filter_map(TweetRecord::parse_raw)
        .flat_map(|rec| {
            rec.counts()
                .map(|count| format!("{}\t{}", count.dimension, count.key))
        })
        .collect::<Vec<_>>();

    let mut key_buf = BytesMut::new();
    let mut value_buf = BytesMut::with_capacity(keys.len() * 8);

    let iter = keys.into_iter().map(move |key| {
        key_buf.put_slice(key.as_bytes());
        value_buf.put_u64(1);

        let key = key_buf.split().freeze();
        let value = value_buf.split().freeze();

        Ok(KeyValue { key, value })
    });
    Ok(Box::new(iter))
}

pub fn reduce(
    key: Bytes,
    values: Box<dyn Iterator<Item = Bytes> + '_>,
    _aux: Bytes,
) -> Result<Bytes> {
    let mut writer = BytesMut::with_capacity(key.len() + 24);
    let key = utils::string_from_bytes(key)?;
    let count = values
        .map(|mut value| value.get_u64())
        .try_fold(0u64, u64::checked_add)
        .with_context(|| format!("count for {key:?} overflows u64"))?;
    writer.put(format!("{}\t{}\n", key, count).as_bytes());

    Ok(writer.freeze())
}
