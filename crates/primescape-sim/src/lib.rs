//! Configuration, orchestration and hard-copy export behind the `primescape` CLI.

pub mod config;
pub mod export;
pub mod hash;
pub mod pipeline;
pub mod serde;

pub use config::{load_config, GraphMode, RangeMode, RunConfig};
pub use pipeline::{generate_values, run_pipeline, RunOutcome, StepTiming};
