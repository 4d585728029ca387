use indexmap::IndexMap;
use primescape_core::errors::{ErrorInfo, ScapeError};
use primescape_core::{NumericRecord, Property, PropertyKey, Rounding};
use serde::{Deserialize, Serialize};

use crate::aggregate::{aggregate, PaletteBucketAssignment};

/// Records grouped by discretised property value, keys in discovery order.
pub type PropertyBucketMap<'a> = IndexMap<PropertyKey, Vec<&'a NumericRecord>>;

/// Selection of the property that drives bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketOpts {
    /// Record field used as the bucketing axis.
    pub property: Property,
    /// Discretisation applied before grouping.
    pub rounding: Rounding,
    /// Whether prime records take part in bucketing.
    pub include_primes: bool,
}

impl BucketOpts {
    /// Resolves a property by name, failing with `UnknownProperty`.
    pub fn from_name(
        property_name: &str,
        rounding: Rounding,
        include_primes: bool,
    ) -> Result<Self, ScapeError> {
        Ok(Self {
            property: property_name.parse()?,
            rounding,
            include_primes,
        })
    }
}

/// Output of [`bucket_by_property`].
#[derive(Debug, Clone)]
pub struct PropertyBuckets<'a> {
    opts: BucketOpts,
    map: PropertyBucketMap<'a>,
    excluded_primes: usize,
}

impl<'a> PropertyBuckets<'a> {
    /// Options the buckets were built with.
    pub fn opts(&self) -> &BucketOpts {
        &self.opts
    }

    /// Distinct property values in the order they were first encountered.
    pub fn discovery_order(&self) -> Vec<PropertyKey> {
        self.map.keys().copied().collect()
    }

    /// Distinct property values, ascending.
    pub fn sorted_keys(&self) -> Vec<PropertyKey> {
        let mut keys = self.discovery_order();
        keys.sort_unstable();
        keys
    }

    /// Property value to records mapping.
    pub fn map(&self) -> &PropertyBucketMap<'a> {
        &self.map
    }

    /// Records sharing one property value.
    pub fn records(&self, key: PropertyKey) -> &[&'a NumericRecord] {
        self.map.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct property values.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when no record was bucketed.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of bucketed records.
    pub fn record_count(&self) -> usize {
        self.map.values().map(Vec::len).sum()
    }

    /// Number of prime records left out by the prime policy.
    pub fn excluded_primes(&self) -> usize {
        self.excluded_primes
    }

    /// Sorts the keys and reduces them to at most `palette_capacity` buckets.
    pub fn aggregate(&self, palette_capacity: usize) -> Result<PaletteBucketAssignment, ScapeError> {
        aggregate(&self.sorted_keys(), &self.map, palette_capacity)
    }
}

/// Groups records by one discretised property.
///
/// Prime records are skipped unless `opts.include_primes` is set. Fails
/// with `InvalidInput` if the selected property is not finite.
pub fn bucket_by_property<'a>(
    records: &'a [NumericRecord],
    opts: &BucketOpts,
) -> Result<PropertyBuckets<'a>, ScapeError> {
    let mut map = PropertyBucketMap::new();
    let mut excluded_primes = 0;
    for record in records {
        if record.is_prime && !opts.include_primes {
            excluded_primes += 1;
            continue;
        }
        let raw = opts.rounding.apply(record.property(opts.property));
        if !raw.is_finite() {
            return Err(ScapeError::InvalidInput(
                ErrorInfo::new("palette.non_finite", "property value is not finite")
                    .with_context("value", record.value)
                    .with_context("property", opts.property),
            ));
        }
        map.entry(PropertyKey::new(raw)).or_default().push(record);
    }
    Ok(PropertyBuckets {
        opts: *opts,
        map,
        excluded_primes,
    })
}
