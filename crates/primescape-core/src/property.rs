//! Scalar record properties, their discretisation and hashable keys.

use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, ScapeError};

/// Scalar field of a [`crate::NumericRecord`] usable as a bucketing axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    /// The analysed integer itself.
    Value,
    /// `value^(1/k)` for `k` prime factors.
    IdealFactor,
    /// Mean absolute distance of the factors from the ideal factor.
    MeanDeviation,
    /// `value / mean_deviation`.
    Antislope,
    /// Cofactor left after removing the largest prime factor.
    DivisionFamily,
}

impl Property {
    /// Every property, in declaration order.
    pub const ALL: [Property; 5] = [
        Property::Value,
        Property::IdealFactor,
        Property::MeanDeviation,
        Property::Antislope,
        Property::DivisionFamily,
    ];

    /// Canonical snake_case name.
    pub fn name(&self) -> &'static str {
        match self {
            Property::Value => "value",
            Property::IdealFactor => "ideal_factor",
            Property::MeanDeviation => "mean_deviation",
            Property::Antislope => "antislope",
            Property::DivisionFamily => "division_family",
        }
    }
}

impl Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Property {
    type Err = ScapeError;

    /// Accepts the canonical name as well as spaced and legacy spellings
    /// (`"mean deviation"`, `"anti_slope"`).
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "value" | "number" => Ok(Property::Value),
            "ideal_factor" | "ideal" => Ok(Property::IdealFactor),
            "mean_deviation" | "deviation" => Ok(Property::MeanDeviation),
            "antislope" | "anti_slope" | "one_over_slope" => Ok(Property::Antislope),
            "division_family" | "div_family" => Ok(Property::DivisionFamily),
            _ => Err(ScapeError::UnknownProperty(
                ErrorInfo::new(
                    "core.unknown_property",
                    format!("records expose no property named '{raw}'"),
                )
                .with_context("property", raw)
                .with_hint(
                    "expected one of value, ideal_factor, mean_deviation, antislope, division_family",
                ),
            )),
        }
    }
}

/// Discretisation applied to a property before it becomes a bucket key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rounding {
    /// Keep the exact value.
    None,
    /// Round half away from zero.
    #[default]
    Round,
    /// Round towards negative infinity.
    Floor,
    /// Round towards positive infinity.
    Ceil,
}

impl Rounding {
    /// Applies the rounding mode to `raw`.
    pub fn apply(&self, raw: f64) -> f64 {
        match self {
            Rounding::None => raw,
            Rounding::Round => raw.round(),
            Rounding::Floor => raw.floor(),
            Rounding::Ceil => raw.ceil(),
        }
    }
}

impl FromStr for Rounding {
    type Err = ScapeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "none" | "exact" => Ok(Rounding::None),
            "round" | "round-to-nearest" | "nearest" => Ok(Rounding::Round),
            "floor" => Ok(Rounding::Floor),
            "ceil" => Ok(Rounding::Ceil),
            _ => Err(ScapeError::InvalidInput(
                ErrorInfo::new("core.rounding", format!("unknown rounding mode '{raw}'"))
                    .with_hint("expected one of none, round, floor, ceil"),
            )),
        }
    }
}

/// Totally ordered, hashable wrapper around a discretised property value.
///
/// Equality and hashing use the bit pattern after folding `-0.0` into
/// `0.0`; ordering uses [`f64::total_cmp`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyKey(f64);

impl PropertyKey {
    /// Wraps a raw property value.
    pub fn new(value: f64) -> Self {
        if value == 0.0 {
            Self(0.0)
        } else {
            Self(value)
        }
    }

    /// Returns the wrapped value.
    pub fn get(&self) -> f64 {
        self.0
    }
}

impl PartialEq for PropertyKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for PropertyKey {}

impl Hash for PropertyKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for PropertyKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PropertyKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
