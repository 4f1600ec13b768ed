//! Fixed-point item quantity.
//!
//! Counts are taken in 0.1 increments (half-empty containers, partial cases),
//! so quantities are stored as whole tenths instead of floats. This keeps
//! equality exact and serialization stable no matter how many times a value
//! round-trips through the queue snapshot or the backend.

use core::fmt;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DomainError, DomainResult};

/// A non-negative quantity with 0.1 granularity.
///
/// Compared by value. Two quantities are equal iff they hold the same number
/// of tenths, so `2.5` counted twice is always equal to itself.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quantity(u64);

impl Quantity {
    pub const ZERO: Quantity = Quantity(0);
    pub const ONE: Quantity = Quantity(10);

    /// Build a quantity from a float, rounding to the nearest tenth.
    ///
    /// Rejects negative and non-finite input.
    pub fn from_f64(value: f64) -> DomainResult<Self> {
        if !value.is_finite() {
            return Err(DomainError::validation("quantity must be a finite number"));
        }
        if value < 0.0 {
            return Err(DomainError::validation("quantity must not be negative"));
        }
        Ok(Self((value * 10.0).round() as u64))
    }

    /// Build a quantity from a whole number of tenths.
    pub const fn from_tenths(tenths: u64) -> Self {
        Self(tenths)
    }

    pub const fn tenths(&self) -> u64 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 10.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 10 == 0 {
            write!(f, "{}", self.0 / 10)
        } else {
            write!(f, "{}.{}", self.0 / 10, self.0 % 10)
        }
    }
}

// On the wire a quantity is a plain JSON number ("2.5"), not a tenths count.
impl Serialize for Quantity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Quantity::from_f64(value).map_err(D::Error::custom)
    }
}
