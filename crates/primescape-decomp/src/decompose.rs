use primescape_core::errors::{ErrorInfo, ScapeError};
use primescape_core::NumericRecord;

use crate::primes::PrimeTable;

/// Decomposes a single integer into its decorated record.
///
/// Fails with [`ScapeError::InvalidInput`] when `value` is 0.
pub fn decompose(value: u64) -> Result<NumericRecord, ScapeError> {
    decompose_with(&PrimeTable::covering(value), value)
}

/// Decomposes `value` using a prebuilt trial-division table.
pub fn decompose_with(table: &PrimeTable, value: u64) -> Result<NumericRecord, ScapeError> {
    if value < 1 {
        return Err(invalid_value(value));
    }
    if value == 1 {
        return Ok(NumericRecord {
            value,
            is_prime: false,
            prime_factors: Vec::new(),
            ideal_factor: 0.0,
            mean_deviation: 0.0,
            antislope: 0.0,
            division_family: 1,
        });
    }

    let prime_factors = table.factorize(value);
    let is_prime = prime_factors.len() == 1;
    let ideal_factor = ideal_factor(value, &prime_factors);
    let mean_deviation = mean_deviation(&prime_factors, ideal_factor);
    let antislope = if mean_deviation > 0.0 {
        value as f64 / mean_deviation
    } else {
        0.0
    };
    let largest = prime_factors.last().copied().unwrap_or(value);
    Ok(NumericRecord {
        value,
        is_prime,
        prime_factors,
        ideal_factor,
        mean_deviation,
        antislope,
        division_family: if is_prime { value } else { value / largest },
    })
}

/// Division family of `value` without building the full record.
pub fn division_family(table: &PrimeTable, value: u64) -> u64 {
    match table.factorize(value).as_slice() {
        [] => 1,
        [_] => value,
        factors => value / factors[factors.len() - 1],
    }
}

pub(crate) fn invalid_value(value: u64) -> ScapeError {
    ScapeError::InvalidInput(
        ErrorInfo::new(
            "decomp.invalid_input",
            "only positive integers can be decomposed",
        )
        .with_context("value", value),
    )
}

fn ideal_factor(value: u64, prime_factors: &[u64]) -> f64 {
    (value as f64).powf(1.0 / prime_factors.len() as f64)
}

fn mean_deviation(prime_factors: &[u64], ideal_factor: f64) -> f64 {
    let Some((&first, rest)) = prime_factors.split_first() else {
        return 0.0;
    };
    // Equal factors sit exactly on the ideal; skip the lossy root.
    if rest.iter().all(|&factor| factor == first) {
        return 0.0;
    }
    let total: f64 = prime_factors
        .iter()
        .map(|&factor| (factor as f64 - ideal_factor).abs())
        .sum();
    total / prime_factors.len() as f64
}
