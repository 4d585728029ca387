use std::error::Error;

use clap::Args;
use primescape_core::Rounding;
use primescape_decomp::{continuous_range, decompose_all, DecomposeOpts};
use primescape_palette::{bucket_by_property, BucketOpts, Palette};
use primescape_sim::serde::to_canonical_json_bytes;
use serde_json::json;

#[derive(Args, Debug)]
pub struct BucketsArgs {
    /// Inclusive lower bound.
    #[arg(long, default_value_t = 2)]
    pub lower: u64,
    /// Inclusive upper bound.
    #[arg(long)]
    pub upper: u64,
    /// Record property driving the buckets.
    #[arg(long, default_value = "antislope")]
    pub property: String,
    /// Rounding applied to the property (none, round, floor, ceil).
    #[arg(long, default_value = "round")]
    pub rounding: Rounding,
    /// Palette whose capacity bounds the bucket count.
    #[arg(long, default_value = "Turbo")]
    pub palette: String,
    /// Keep primes in the range.
    #[arg(long)]
    pub include_primes: bool,
}

pub fn run(args: &BucketsArgs) -> Result<(), Box<dyn Error>> {
    let opts = BucketOpts::from_name(&args.property, args.rounding, args.include_primes)?;
    let palette = Palette::from_name(&args.palette);
    let values = continuous_range(args.lower, args.upper, args.include_primes)?;
    let records = decompose_all(&values, &DecomposeOpts::default())?;
    let buckets = bucket_by_property(&records, &opts)?;

    let summary = match buckets.aggregate(palette.capacity()) {
        Ok(assignment) => {
            let layout: Vec<_> = assignment
                .buckets()
                .iter()
                .map(|bucket| {
                    json!({
                        "index": bucket.index,
                        "keys": bucket.keys.len(),
                        "first_key": bucket.keys.first().map(|key| key.get()),
                        "last_key": bucket.keys.last().map(|key| key.get()),
                        "values": bucket.values.len(),
                    })
                })
                .collect();
            json!({
                "property": opts.property,
                "palette": palette.name(),
                "palette_capacity": palette.capacity(),
                "distinct_keys": buckets.len(),
                "base": assignment.base(),
                "bucket_count": assignment.bucket_count(),
                "buckets": layout,
            })
        }
        Err(err) if err.is_recoverable() => json!({
            "property": opts.property,
            "palette": palette.name(),
            "palette_capacity": palette.capacity(),
            "distinct_keys": 0,
            "bucket_count": 0,
            "buckets": [],
        }),
        Err(err) => return Err(err.into()),
    };
    let json = to_canonical_json_bytes(&summary)?;
    print!("{}", String::from_utf8(json)?);
    Ok(())
}
