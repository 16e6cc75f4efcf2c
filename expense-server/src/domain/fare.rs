//! Fare amounts.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned when a value cannot be used as a fare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidFare {
    #[error("fare is not a number")]
    NotANumber,

    #[error("fare must not be negative")]
    Negative,

    #[error("fare may have at most 2 decimal places")]
    TooManyDecimals,

    #[error("fare is too large")]
    TooLarge,
}

/// A non-negative fare with at most two decimal places.
///
/// Stored as an integer count of hundredths so that sums and comparisons
/// are exact. Whole amounts serialize as JSON integers (`200`), fractional
/// ones as floats (`200.5`).
///
/// # Examples
///
/// ```
/// use expense_server::domain::Fare;
///
/// let fare = Fare::parse("220").unwrap();
/// assert_eq!(fare, Fare::from_yen(220));
///
/// assert!(Fare::parse("-1").is_err());
/// assert!(Fare::parse("1.005").is_err());
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fare(u64);

impl Fare {
    pub const ZERO: Fare = Fare(0);

    /// A whole-yen fare.
    pub fn from_yen(yen: u64) -> Self {
        Fare(yen.saturating_mul(100))
    }

    pub fn from_hundredths(hundredths: u64) -> Self {
        Fare(hundredths)
    }

    /// Validate a floating point amount.
    pub fn from_f64(value: f64) -> Result<Self, InvalidFare> {
        if !value.is_finite() {
            return Err(InvalidFare::NotANumber);
        }
        if value < 0.0 {
            return Err(InvalidFare::Negative);
        }

        let scaled = value * 100.0;
        let rounded = scaled.round();
        if (scaled - rounded).abs() > 1e-6 {
            return Err(InvalidFare::TooManyDecimals);
        }
        if rounded >= u64::MAX as f64 {
            return Err(InvalidFare::TooLarge);
        }

        Ok(Fare(rounded as u64))
    }

    /// Parse a fare typed into a text field.
    ///
    /// Surrounding whitespace is ignored.
    pub fn parse(s: &str) -> Result<Self, InvalidFare> {
        let value: f64 = s.trim().parse().map_err(|_| InvalidFare::NotANumber)?;
        Self::from_f64(value)
    }

    pub fn hundredths(self) -> u64 {
        self.0
    }

    /// Whole yen, discarding any fractional part.
    pub fn yen(self) -> u64 {
        self.0 / 100
    }

    pub fn is_whole(self) -> bool {
        self.0 % 100 == 0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn saturating_add(self, other: Fare) -> Fare {
        Fare(self.0.saturating_add(other.0))
    }
}

impl std::iter::Sum for Fare {
    fn sum<I: Iterator<Item = Fare>>(iter: I) -> Self {
        iter.fold(Fare::ZERO, Fare::saturating_add)
    }
}

impl fmt::Debug for Fare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fare({self})")
    }
}

impl fmt::Display for Fare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_whole() {
            write!(f, "{}", self.yen())
        } else {
            write!(f, "{}.{:02}", self.yen(), self.0 % 100)
        }
    }
}

impl Serialize for Fare {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_whole() {
            serializer.serialize_u64(self.yen())
        } else {
            serializer.serialize_f64(self.as_f64())
        }
    }
}

impl<'de> Deserialize<'de> for Fare {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Fare::from_f64(value).map_err(serde::de::Error::custom)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any whole or two-decimal amount parses back to the same hundredths.
        #[test]
        fn display_parse_roundtrip(hundredths in 0u64..100_000_000) {
            let fare = Fare::from_hundredths(hundredths);
            prop_assert_eq!(Fare::parse(&fare.to_string()).unwrap(), fare);
        }

        /// Negative amounts are always rejected.
        #[test]
        fn negatives_rejected(value in -1_000_000.0f64..-0.001) {
            prop_assert_eq!(Fare::from_f64(value), Err(InvalidFare::Negative));
        }
    }
}
