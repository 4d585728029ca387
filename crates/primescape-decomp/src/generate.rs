use std::collections::BTreeMap;

use primescape_core::errors::{ErrorInfo, ScapeError};
use serde::{Deserialize, Serialize};

use crate::decompose::division_family;
use crate::primes::{is_prime, primes_above, PrimeTable};

fn generate_error(code: &str, message: impl Into<String>) -> ScapeError {
    ScapeError::InvalidInput(ErrorInfo::new(code, message))
}

/// Ascending values in `[lower, upper]`, dropping primes unless `include_primes`.
pub fn continuous_range(
    lower: u64,
    upper: u64,
    include_primes: bool,
) -> Result<Vec<u64>, ScapeError> {
    if lower < 1 {
        return Err(generate_error("generate.lower_bound", "lower bound must be at least 1")
            .map_info(|info| info.with_context("lower", lower)));
    }
    if lower > upper {
        return Err(generate_error(
            "generate.bounds",
            "lower bound exceeds upper bound",
        )
        .map_info(|info| {
            info.with_context("lower", lower)
                .with_context("upper", upper)
        }));
    }
    let table = PrimeTable::covering(upper);
    Ok((lower..=upper)
        .filter(|&value| include_primes || !table.is_prime(value))
        .collect())
}

/// Outcome of restricting a value list to a set of division families.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyFilterReport {
    /// Values whose division family is listed, in input order.
    pub values: Vec<u64>,
    /// Number of kept values per requested family.
    pub counts: BTreeMap<u64, usize>,
}

impl FamilyFilterReport {
    /// True when no value matched any requested family.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Keeps the values whose division family appears in `families`.
pub fn filter_by_families(values: &[u64], families: &[u64]) -> FamilyFilterReport {
    let mut counts: BTreeMap<u64, usize> = families.iter().map(|&family| (family, 0)).collect();
    let max_value = values.iter().copied().max().unwrap_or(1);
    let table = PrimeTable::covering(max_value);
    let mut kept = Vec::new();
    for &value in values {
        if let Some(count) = counts.get_mut(&division_family(&table, value)) {
            *count += 1;
            kept.push(value);
        }
    }
    FamilyFilterReport {
        values: kept,
        counts,
    }
}

/// Where the identity-factor sequence of a family starts.
///
/// Reads as `family`, `origin` or a plain integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "MinimumRepr", into = "MinimumRepr")]
pub enum IdentityMinimum {
    /// First prime above the family's largest factor.
    #[default]
    Family,
    /// The first prime, 2.
    Origin,
    /// First prime at or above the given value.
    Value(u64),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum MinimumRepr {
    Value(u64),
    Named(String),
}

impl TryFrom<MinimumRepr> for IdentityMinimum {
    type Error = String;

    fn try_from(repr: MinimumRepr) -> Result<Self, Self::Error> {
        match repr {
            MinimumRepr::Value(value) => Ok(IdentityMinimum::Value(value)),
            MinimumRepr::Named(name) => match name.trim().to_ascii_lowercase().as_str() {
                "family" => Ok(IdentityMinimum::Family),
                "origin" => Ok(IdentityMinimum::Origin),
                _ => Err(format!(
                    "unknown identity minimum '{name}', expected family, origin or an integer"
                )),
            },
        }
    }
}

impl From<IdentityMinimum> for MinimumRepr {
    fn from(minimum: IdentityMinimum) -> Self {
        match minimum {
            IdentityMinimum::Family => MinimumRepr::Named("family".to_string()),
            IdentityMinimum::Origin => MinimumRepr::Named("origin".to_string()),
            IdentityMinimum::Value(value) => MinimumRepr::Value(value),
        }
    }
}

/// How many identity factors each family receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityMode {
    /// The starting prime plus a fixed count of following primes.
    #[default]
    Count,
    /// Every prime inside an inclusive range.
    Range,
}

/// Identity-factor configuration shared by all families of a scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityFactorSpec {
    /// Counting or ranged enumeration.
    #[serde(default)]
    pub mode: IdentityMode,
    /// Starting point for count mode.
    #[serde(default)]
    pub minimum: IdentityMinimum,
    /// Number of primes emitted after the first one in count mode.
    #[serde(default = "IdentityFactorSpec::default_count")]
    pub count: usize,
    /// Inclusive lower end for range mode.
    #[serde(default)]
    pub range_min: u64,
    /// Inclusive upper end for range mode.
    #[serde(default)]
    pub range_max: u64,
}

impl IdentityFactorSpec {
    fn default_count() -> usize {
        10
    }
}

impl Default for IdentityFactorSpec {
    fn default() -> Self {
        Self {
            mode: IdentityMode::Count,
            minimum: IdentityMinimum::Family,
            count: Self::default_count(),
            range_min: 0,
            range_max: 0,
        }
    }
}

/// A set of division families and the identity factors that extend them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FamilyScheme {
    /// Each family is a list of primes whose product is the family cofactor.
    #[serde(default)]
    pub families: Vec<Vec<u64>>,
    /// Identity-factor enumeration.
    #[serde(default)]
    pub identity_factor: IdentityFactorSpec,
}

impl FamilyScheme {
    /// Rejects families holding anything but primes.
    pub fn validate(&self) -> Result<(), ScapeError> {
        for (index, family) in self.families.iter().enumerate() {
            if let Some(&bad) = family.iter().find(|&&factor| !is_prime(factor)) {
                return Err(ScapeError::InvalidInput(
                    ErrorInfo::new("generate.family_factor", "family factors must be prime")
                        .with_context("family", index)
                        .with_context("factor", bad),
                ));
            }
        }
        if self.identity_factor.mode == IdentityMode::Range
            && self.identity_factor.range_min > self.identity_factor.range_max
        {
            return Err(generate_error(
                "generate.identity_range",
                "identity range_min exceeds range_max",
            ));
        }
        Ok(())
    }
}

/// Members of every family: `product(family) * p` for each identity prime `p`.
///
/// The result is sorted and free of duplicates across overlapping families.
pub fn family_members(scheme: &FamilyScheme) -> Result<Vec<u64>, ScapeError> {
    scheme.validate()?;
    let mut members = Vec::new();
    for family in &scheme.families {
        let mut sorted = family.clone();
        sorted.sort_unstable();
        let product = sorted
            .iter()
            .try_fold(1u64, |acc, &factor| acc.checked_mul(factor))
            .ok_or_else(|| overflow_error(&sorted))?;
        for identity in identity_primes(&sorted, &scheme.identity_factor) {
            members.push(product.checked_mul(identity).ok_or_else(|| overflow_error(&sorted))?);
        }
    }
    members.sort_unstable();
    members.dedup();
    Ok(members)
}

fn identity_primes(
    family: &[u64],
    identity: &IdentityFactorSpec,
) -> Box<dyn Iterator<Item = u64>> {
    match identity.mode {
        IdentityMode::Count => {
            let start = match identity.minimum {
                IdentityMinimum::Family => family.last().copied().unwrap_or(1),
                IdentityMinimum::Origin => 1,
                IdentityMinimum::Value(value) => value.saturating_sub(1),
            };
            Box::new(primes_above(start).take(identity.count.saturating_add(1)))
        }
        IdentityMode::Range => {
            let range_max = identity.range_max;
            Box::new(
                primes_above(identity.range_min.saturating_sub(1))
                    .take_while(move |&prime| prime <= range_max),
            )
        }
    }
}

fn overflow_error(family: &[u64]) -> ScapeError {
    ScapeError::InvalidInput(
        ErrorInfo::new("generate.overflow", "family member exceeds u64")
            .with_context("family", format!("{family:?}")),
    )
}
