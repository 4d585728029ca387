use std::collections::HashSet;

use primescape_core::errors::ScapeError;
use primescape_core::NumericRecord;
use primescape_decomp::{decompose_all, DecomposeOpts};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::ingest::save_records;
use crate::query::load_records;

/// How a cached batch was satisfied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Records served from the database.
    pub hits: usize,
    /// Records decomposed and written back.
    pub computed: usize,
}

/// Records for a batch of distinct values, ascending by value.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedBatch {
    pub records: Vec<NumericRecord>,
    pub stats: CacheStats,
}

/// Serves known values from the cache and decomposes the rest in parallel.
///
/// Duplicate input values collapse to one record. Newly computed records
/// are persisted before returning.
pub fn decompose_cached(
    conn: &Connection,
    values: &[u64],
    opts: &DecomposeOpts,
    batch_limit: usize,
) -> Result<CachedBatch, ScapeError> {
    let mut unique = values.to_vec();
    unique.sort_unstable();
    unique.dedup();

    let mut records = load_records(conn, &unique, batch_limit)?;
    let known: HashSet<u64> = records.iter().map(|record| record.value).collect();
    let missing: Vec<u64> = unique
        .iter()
        .copied()
        .filter(|value| !known.contains(value))
        .collect();

    let computed = decompose_all(&missing, opts)?;
    save_records(conn, &computed)?;

    let stats = CacheStats {
        hits: records.len(),
        computed: computed.len(),
    };
    records.extend(computed);
    records.sort_by_key(|record| record.value);
    Ok(CachedBatch { records, stats })
}
