use std::error::Error;

use clap::Args;
use primescape_decomp::{decompose_all, DecomposeOpts};
use primescape_sim::serde::to_canonical_json_bytes;

#[derive(Args, Debug)]
pub struct DecomposeArgs {
    /// Values to decompose.
    #[arg(required = true)]
    pub values: Vec<u64>,
    /// Worker count; defaults to the available parallelism.
    #[arg(long)]
    pub workers: Option<usize>,
}

pub fn run(args: &DecomposeArgs) -> Result<(), Box<dyn Error>> {
    let opts = DecomposeOpts {
        workers: args.workers,
        cancel: None,
    };
    let mut records = decompose_all(&args.values, &opts)?;
    records.sort_by_key(|record| record.value);
    let json = to_canonical_json_bytes(&records)?;
    print!("{}", String::from_utf8(json)?);
    Ok(())
}
