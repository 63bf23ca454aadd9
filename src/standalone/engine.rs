use anyhow::{Context, Result};
use bytes::Bytes;
use dashmap::DashMap;
use glob::glob;
use itertools::Itertools;
use std::{
    fs::{self, File},
    io::{BufWriter, Read, Write},
    path::PathBuf,
};
use tracing::{debug, warn};

use crate::standalone::Job;
use crate::*;

// types related to this engine
pub type BucketIndex = u32;
pub type Buckets = DashMap<BucketIndex, Vec<KeyValue>>;

pub fn perform_map(
    job: &Job,
    engine: &Workload,
    serialized_args: &Bytes,
    num_reduce_worker: u32,
) -> Result<Buckets> {
    let input_files = glob(&job.input).with_context(|| format!("bad input glob {}", job.input))?;
    let buckets: Buckets = Buckets::new();
    let mut files = 0;
    for entry in input_files {
        let pathspec = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "skipping unreadable glob entry");
                continue;
            }
        };
        let mut buf = Vec::new();
        {
            // a scope so that the file is closed right after reading
            let mut file = File::open(&pathspec).with_context(|| format!("open {}", pathspec.display()))?;
            file.read_to_end(&mut buf)?;
        }
        let filename = pathspec.to_string_lossy().into_owned();
        debug!(file = %filename, bytes = buf.len(), "mapping");
        let input_kv = KeyValue {
            key: Bytes::from(filename),
            value: Bytes::from(buf),
        };
        let map_func = engine.map_fn;
        // Each emitted pair goes to the bucket picked by its key hash
        for item in map_func(input_kv, serialized_args.clone())? {
            let KeyValue { key, value } = item?;
            let bucket_no = ihash(&key) % num_reduce_worker;

            buckets
                .entry(bucket_no)
                .or_default()
                .push(KeyValue { key, value });
        }
        files += 1;
    }
    if files == 0 {
        warn!(input = %job.input, "input glob matched no files");
    }

    Ok(buckets)
}

pub fn perform_reduce(
    job: &Job,
    engine: &Workload,
    serialized_args: &Bytes,
    buckets: Buckets,
) -> Result<Vec<PathBuf>> {
    let reduce_func = engine.reduce_fn;
    let output_dir = PathBuf::from(&job.output);
    fs::create_dir_all(&output_dir).with_context(|| format!("create {}", output_dir.display()))?;

    let mut outputs = Vec::new();
    // One file per bucket; keys are sorted and equal keys reduced together.
    for (reduce_id, mut bkt) in buckets.into_iter() {
        let out_pathspec = output_dir.join(format!("mr-out-{}", reduce_id));
        let mut out_file = BufWriter::new(
            File::create(&out_pathspec).with_context(|| format!("create {}", out_pathspec.display()))?,
        );
        if let Some(header) = engine.header {
            writeln!(out_file, "{header}")?;
        }
        // stable, so values of one key stay in map emission order
        bkt.sort_by_key(KeyValue::key);
        let mut groups = 0u64;
        for (key, value_group) in &bkt.into_iter().chunk_by(KeyValue::key) {
            let iter = value_group.map(KeyValue::into_value);
            let out = reduce_func(key, Box::new(iter), serialized_args.clone())?;
            out_file.write_all(&out)?;
            groups += 1;
        }
        out_file.flush()?;
        debug!(file = %out_pathspec.display(), groups, "bucket reduced");
        outputs.push(out_pathspec);
    }
    outputs.sort();
    Ok(outputs)
}
