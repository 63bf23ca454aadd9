//! Map-only tweet cleaning.
//!
//! Every cleaned record is emitted under the empty key so the single
//! reduce group sees records in input order.

use crate::record::TweetRecord;
use crate::*;
use bytes::Bytes;

pub fn map(kv: KeyValue, _aux: Bytes) -> MapOutput {
    let s = utils::string_from_bytes(kv.value)?;
    let records = s
        .lines()
        .filter_map(TweetRecord::parse_raw)
        .map(|rec| rec.to_string())
        .collect::<Vec<_>>();

    let iter = records
        .into_iter()
        .map(|line| Ok(KeyValue::new(Bytes::new(), line)));
    Ok(Box::new(iter))
}
