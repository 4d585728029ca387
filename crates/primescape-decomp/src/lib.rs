#![deny(missing_docs)]
#![doc = "Per-value number decomposition and its parallel batch execution."]

/// Single-value decomposition.
pub mod decompose;
/// Parallel decomposition coordinator.
pub mod dispatch;
/// Value list generation (ranges and division families).
pub mod generate;
/// Batch partitioning across workers.
pub mod partition;
/// Prime tables and trial division.
pub mod primes;

pub use decompose::{decompose, decompose_with, division_family};
pub use dispatch::{decompose_all, DecomposeOpts};
pub use generate::{
    continuous_range, family_members, filter_by_families, FamilyFilterReport, FamilyScheme,
    IdentityFactorSpec, IdentityMinimum, IdentityMode,
};
pub use partition::{available_workers, effective_workers, partition};
pub use primes::{is_prime, primes_above, PrimeTable};
