use std::collections::HashMap;

use primescape_core::errors::{ErrorInfo, ScapeError};
use primescape_core::PropertyKey;
use serde::Serialize;

use crate::bucket::PropertyBucketMap;

/// Geometric bucket layout for `volume` distinct keys and a palette of
/// `palette_capacity` colours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketPlan {
    /// Growth factor between consecutive bucket sizes.
    pub base: u64,
    /// Number of distinct keys each bucket absorbs, in bucket order.
    pub sizes: Vec<usize>,
}

impl BucketPlan {
    /// Lays out `volume` keys over at most `palette_capacity` buckets.
    ///
    /// Bucket `i` takes `base^i` keys; the last bucket takes whatever remains.
    pub fn new(palette_capacity: usize, volume: usize) -> Result<Self, ScapeError> {
        if palette_capacity == 0 {
            return Err(ScapeError::InvalidInput(
                ErrorInfo::new("palette.capacity", "palette capacity must be at least 1")
                    .with_context("volume", volume),
            ));
        }
        if volume == 0 {
            return Err(empty_input(palette_capacity));
        }
        if volume == 1 {
            return Ok(Self {
                base: 1,
                sizes: vec![1],
            });
        }
        if palette_capacity == 1 {
            return Ok(Self {
                base: volume as u64,
                sizes: vec![volume],
            });
        }

        let base = bucket_base(palette_capacity, volume);
        let mut sizes = Vec::new();
        let mut remaining = volume as u128;
        let mut power = 1u128;
        while remaining > 0 {
            let take = power.min(remaining);
            sizes.push(take as usize);
            remaining -= take;
            power = power.saturating_mul(u128::from(base));
        }
        Ok(Self { base, sizes })
    }
}

/// Smallest base `B >= 2` with `1 + B + ... + B^(L-1) >= V`.
///
/// Degenerate layouts report `1` for `V <= 1` and `V` for `L == 1`.
pub fn bucket_base(palette_capacity: usize, volume: usize) -> u64 {
    if volume <= 1 || palette_capacity == 0 {
        return 1;
    }
    if palette_capacity == 1 {
        return volume as u64;
    }
    let target = volume as u128;
    let mut base = 2u64;
    while geometric_sum(u128::from(base), palette_capacity, target) < target {
        base += 1;
    }
    base
}

/// `1 + base + ... + base^(terms-1)`, stopping early once `target` is reached.
fn geometric_sum(base: u128, terms: usize, target: u128) -> u128 {
    let mut sum = 0u128;
    let mut power = 1u128;
    for _ in 0..terms {
        sum = sum.saturating_add(power);
        if sum >= target {
            break;
        }
        power = power.saturating_mul(base);
    }
    sum
}

/// One palette colour: the keys it covers and the values of their records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaletteBucket {
    /// Colour index.
    pub index: usize,
    /// Distinct property values absorbed, ascending.
    pub keys: Vec<PropertyKey>,
    /// Record values absorbed, grouped by key in key order.
    pub values: Vec<u64>,
}

/// Final bucket layout with a value to bucket index lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaletteBucketAssignment {
    palette_capacity: usize,
    base: u64,
    buckets: Vec<PaletteBucket>,
    #[serde(skip)]
    bucket_of_value: HashMap<u64, usize>,
}

impl PaletteBucketAssignment {
    /// Capacity the assignment was computed for.
    pub fn palette_capacity(&self) -> usize {
        self.palette_capacity
    }

    /// Growth factor of the bucket sizes.
    pub fn base(&self) -> u64 {
        self.base
    }

    /// Buckets in index order.
    pub fn buckets(&self) -> &[PaletteBucket] {
        &self.buckets
    }

    /// Number of emitted buckets, never above the palette capacity.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Record values assigned to `index`.
    pub fn values(&self, index: usize) -> Option<&[u64]> {
        self.buckets
            .get(index)
            .map(|bucket| bucket.values.as_slice())
    }

    /// Bucket index a record value was assigned to.
    pub fn bucket_of(&self, value: u64) -> Option<usize> {
        self.bucket_of_value.get(&value).copied()
    }

    /// Total number of records across all buckets.
    pub fn record_count(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.values.len()).sum()
    }
}

/// Distributes ascending distinct keys over at most `palette_capacity`
/// geometrically growing buckets.
///
/// `sorted_keys` must be strictly ascending and cover exactly the keys of
/// `map`. Zero keys yield the recoverable `EmptyPaletteInput`.
pub fn aggregate(
    sorted_keys: &[PropertyKey],
    map: &PropertyBucketMap<'_>,
    palette_capacity: usize,
) -> Result<PaletteBucketAssignment, ScapeError> {
    let plan = BucketPlan::new(palette_capacity, sorted_keys.len())?;
    if let Some(position) = sorted_keys.windows(2).position(|pair| pair[0] >= pair[1]) {
        return Err(ScapeError::InvalidInput(
            ErrorInfo::new("palette.unsorted_keys", "keys must be strictly ascending")
                .with_context("index", position + 1)
                .with_context("key", sorted_keys[position + 1]),
        ));
    }
    if sorted_keys.len() != map.len() {
        return Err(ScapeError::InvalidInput(
            ErrorInfo::new("palette.key_mismatch", "keys do not cover the bucket map")
                .with_context("keys", sorted_keys.len())
                .with_context("map_len", map.len()),
        ));
    }

    let mut buckets = Vec::with_capacity(plan.sizes.len());
    let mut bucket_of_value = HashMap::new();
    let mut keys = sorted_keys.iter().copied();
    for &size in &plan.sizes {
        let index = buckets.len();
        let mut bucket = PaletteBucket {
            index,
            keys: Vec::with_capacity(size),
            values: Vec::new(),
        };
        for key in keys.by_ref().take(size) {
            let records = map.get(&key).ok_or_else(|| {
                ScapeError::InvalidInput(
                    ErrorInfo::new("palette.key_mismatch", "key has no records in the bucket map")
                        .with_context("key", key),
                )
            })?;
            for record in records {
                bucket_of_value.insert(record.value, index);
                bucket.values.push(record.value);
            }
            bucket.keys.push(key);
        }
        if !bucket.keys.is_empty() {
            buckets.push(bucket);
        }
    }

    Ok(PaletteBucketAssignment {
        palette_capacity,
        base: plan.base,
        buckets,
        bucket_of_value,
    })
}

fn empty_input(palette_capacity: usize) -> ScapeError {
    ScapeError::EmptyPaletteInput(
        ErrorInfo::new("palette.empty_input", "no property values to distribute")
            .with_context("palette_capacity", palette_capacity)
            .with_hint("treat as nothing to color"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_search_matches_geometric_sum() {
        assert_eq!(bucket_base(3, 10), 3);
        assert_eq!(bucket_base(3, 7), 2);
        assert_eq!(bucket_base(2, 10), 9);
        assert_eq!(bucket_base(256, 1_000_000), 2);
        assert_eq!(bucket_base(8, 1), 1);
        assert_eq!(bucket_base(1, 42), 42);
    }

    #[test]
    fn geometric_sum_saturates() {
        assert_eq!(geometric_sum(2, 3, u128::MAX), 7);
        assert_eq!(geometric_sum(u128::MAX, 4, u128::MAX), u128::MAX);
    }

    #[test]
    fn plan_truncates_the_last_bucket() {
        let plan = BucketPlan::new(3, 10).expect("plan");
        assert_eq!(plan.base, 3);
        assert_eq!(plan.sizes, vec![1, 3, 6]);

        let plan = BucketPlan::new(3, 13).expect("plan");
        assert_eq!(plan.sizes, vec![1, 3, 9]);

        let plan = BucketPlan::new(256, 5).expect("plan");
        assert_eq!(plan.base, 2);
        assert_eq!(plan.sizes, vec![1, 2, 2]);
    }

    #[test]
    fn plan_rejects_degenerate_inputs() {
        let err = BucketPlan::new(0, 5).expect_err("zero capacity");
        assert_eq!(err.info().code, "palette.capacity");
        let err = BucketPlan::new(5, 0).expect_err("no keys");
        assert!(err.is_recoverable());
    }
}
