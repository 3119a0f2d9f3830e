use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{de, Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const CENTS_PER_UNIT: i64 = 100;

//--------------------------------------       Money       -----------------------------------------------------------
/// A monetary amount, stored as an integer number of minor currency units (cents).
///
/// Amounts are exact to two decimal places. On the wire, a `Money` value is a plain JSON decimal
/// number (`50.0` == 5000 cents); in the database it is a transparent `INTEGER` column.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd)]
#[sqlx(transparent)]
pub struct Money(i64);

op!(binary Money, Add, add);
op!(binary Money, Sub, sub);
op!(inplace Money, SubAssign, sub_assign);
op!(unary Money, Neg, neg);

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a money amount: {0}")]
pub struct MoneyConversionError(pub String);

impl From<i64> for Money {
    fn from(cents: i64) -> Self {
        Self(cents)
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Money {}

impl Money {
    pub const MAX: Money = Money(i64::MAX);

    /// The amount in minor units (cents).
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Multiplies by a scalar, returning `None` if the result cannot be represented.
    pub fn checked_mul(self, rhs: i64) -> Option<Self> {
        self.0.checked_mul(rhs).map(Self)
    }

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Construct from a number of whole currency units.
    pub fn from_units(units: i64) -> Self {
        Self(units * CENTS_PER_UNIT)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn as_decimal(&self) -> f64 {
        self.0 as f64 / CENTS_PER_UNIT as f64
    }
}

impl TryFrom<f64> for Money {
    type Error = MoneyConversionError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(MoneyConversionError(format!("{value} is not a finite number")));
        }
        let cents = (value * CENTS_PER_UNIT as f64).round();
        if cents.abs() > i64::MAX as f64 {
            return Err(MoneyConversionError(format!("{value} is out of range")));
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self(cents as i64))
    }
}

impl FromStr for Money {
    type Err = MoneyConversionError;

    /// Parses a plain decimal amount, e.g. `"50"`, `"50.5"` or `"50.00"`, with at most two
    /// decimal places.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (sign, digits) = match s.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, s),
        };
        let (units, frac) = match digits.split_once('.') {
            Some((units, frac)) => (units, frac),
            None => (digits, ""),
        };
        if frac.len() > 2 {
            return Err(MoneyConversionError(format!("{s} has more than two decimal places")));
        }
        let units = units.parse::<i64>().map_err(|e| MoneyConversionError(format!("{s}: {e}")))?;
        let frac = if frac.is_empty() {
            0
        } else {
            // right-pad so that ".5" means 50 cents
            format!("{frac:0<2}").parse::<i64>().map_err(|e| MoneyConversionError(format!("{s}: {e}")))?
        };
        Ok(Self(sign * (units * CENTS_PER_UNIT + frac)))
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.abs();
        write!(f, "{sign}{}.{:02}", cents / CENTS_PER_UNIT, cents % CENTS_PER_UNIT)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where S: serde::Serializer {
        serializer.serialize_f64(self.as_decimal())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where D: serde::Deserializer<'de> {
        struct MoneyVisitor;

        impl de::Visitor<'_> for MoneyVisitor {
            type Value = Money;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a decimal amount as a number or string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
                Ok(Money::from_units(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
                i64::try_from(v).map(Money::from_units).map_err(|e| E::custom(e.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
                Money::try_from(v).map_err(|e| E::custom(e.to_string()))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
                v.parse().map_err(|e: MoneyConversionError| E::custom(e.to_string()))
            }
        }

        deserializer.deserialize_any(MoneyVisitor)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn arithmetic() {
        let a = Money::from_cents(5_000);
        let b = Money::from_cents(2_500);
        assert_eq!(a + b, Money::from_cents(7_500));
        assert_eq!(a - b, b);
        assert_eq!(b * 2, a);
        assert_eq!(-a, Money::from_cents(-5_000));
        let total: Money = [a, b, b].into_iter().sum();
        assert_eq!(total, Money::from_cents(10_000));
        assert_eq!(a.checked_mul(3), Some(Money::from_cents(15_000)));
        assert_eq!(Money::MAX.checked_mul(2), None);
    }

    #[test]
    fn parsing() {
        assert_eq!("50".parse::<Money>().unwrap(), Money::from_cents(5_000));
        assert_eq!("50.00".parse::<Money>().unwrap(), Money::from_cents(5_000));
        assert_eq!("50.5".parse::<Money>().unwrap(), Money::from_cents(5_050));
        assert_eq!("-0.05".parse::<Money>().unwrap(), Money::from_cents(-5));
        assert!("50.005".parse::<Money>().is_err());
        assert!("fifty".parse::<Money>().is_err());
    }

    #[test]
    fn display() {
        assert_eq!(Money::from_cents(10_000).to_string(), "100.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-1_250).to_string(), "-12.50");
    }

    #[test]
    fn serde_round_trip() {
        let m: Money = serde_json::from_str("50.0").unwrap();
        assert_eq!(m, Money::from_cents(5_000));
        let m: Money = serde_json::from_str("50").unwrap();
        assert_eq!(m, Money::from_cents(5_000));
        let m: Money = serde_json::from_str("\"12.34\"").unwrap();
        assert_eq!(m, Money::from_cents(1_234));
        assert_eq!(serde_json::to_string(&Money::from_cents(10_000)).unwrap(), "100.0");
    }
}
