#![deny(missing_docs)]
#![doc = "Core data types and errors for the primescape number decomposition pipeline."]

use serde::{Deserialize, Serialize};

pub mod errors;
pub mod property;
pub mod provenance;

pub use errors::{ErrorInfo, ScapeError};
pub use property::{Property, PropertyKey, Rounding};
pub use provenance::{RunProvenance, SchemaVersion};

/// One analysed integer together with its derived descriptors.
///
/// Records are produced once by the decomposer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericRecord {
    /// The analysed integer, at least 1.
    pub value: u64,
    /// Primality of `value`.
    pub is_prime: bool,
    /// Prime factors with multiplicity, ascending. Empty for 1.
    pub prime_factors: Vec<u64>,
    /// `value^(1/k)` where `k` is the number of prime factors; 0 for 1.
    pub ideal_factor: f64,
    /// Mean absolute deviation of the factors from `ideal_factor`.
    pub mean_deviation: f64,
    /// `value / mean_deviation`, or 0 when the deviation vanishes.
    pub antislope: f64,
    /// `value` divided by its largest prime factor; 1 for 1, `value` for primes.
    pub division_family: u64,
}

impl NumericRecord {
    /// Largest prime factor (the "identity factor"), `None` for 1.
    pub fn largest_prime_factor(&self) -> Option<u64> {
        self.prime_factors.last().copied()
    }

    /// Every prime factor except the largest one.
    pub fn family_factors(&self) -> &[u64] {
        match self.prime_factors.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }

    /// Arithmetic mean of the prime factors, 0 for 1.
    pub fn prime_mean(&self) -> f64 {
        if self.prime_factors.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.prime_factors.iter().map(|&p| p as f64).sum();
        sum / self.prime_factors.len() as f64
    }

    /// Shortest decimal text that parses back to exactly the stored antislope.
    pub fn antislope_text(&self) -> String {
        if self.antislope == 0.0 {
            "0".to_string()
        } else {
            format!("{}", self.antislope)
        }
    }

    /// Reads the selected scalar property.
    ///
    /// Integer properties are exact up to 2^53; above that, neighbouring
    /// integers may read as the same `f64` and therefore share a bucket key.
    pub fn property(&self, property: Property) -> f64 {
        match property {
            Property::Value => self.value as f64,
            Property::IdealFactor => self.ideal_factor,
            Property::MeanDeviation => self.mean_deviation,
            Property::Antislope => self.antislope,
            Property::DivisionFamily => self.division_family as f64,
        }
    }
}
