#![deny(missing_docs)]
#![doc = "Property bucketing and adaptive palette-sized bucket aggregation."]

/// Geometric bucket aggregation bounded by palette capacity.
pub mod aggregate;
/// Grouping of records by a discretised property.
pub mod bucket;
/// Named palettes and their capacities.
pub mod palettes;

pub use aggregate::{aggregate, bucket_base, BucketPlan, PaletteBucket, PaletteBucketAssignment};
pub use bucket::{bucket_by_property, BucketOpts, PropertyBucketMap, PropertyBuckets};
pub use palettes::{color_factors, Palette};
