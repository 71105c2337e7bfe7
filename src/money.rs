//! Fixed-point money arithmetic in integer minor units.
//!
//! Summing account balances with `f64` accumulates binary rounding error
//! (0.1 + 0.2 != 0.3). Every amount in this crate is therefore an `i64`
//! count of minor units (cents/kopecks), converted to and from decimals
//! only at the crate boundary.

use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub},
    sync::OnceLock,
};

use numfmt::{Formatter, Precision};
use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::currency::Currency;

/// A monetary amount stored as a whole number of minor units.
///
/// The sign carries meaning: ledger amounts are positive for income and
/// negative for expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Zero minor units.
    pub const ZERO: Money = Money(0);

    /// Create an amount from a raw count of minor units.
    pub fn from_minor_units(minor_units: i64) -> Self {
        Self(minor_units)
    }

    /// Create an amount from a decimal value, e.g. `12.34` -> 1234 cents.
    ///
    /// Halves round away from zero (`12.345` -> 1235 cents, `-12.345` ->
    /// -1235 cents). Non-finite input coerces to zero; callers are expected
    /// to validate amounts before they reach this type.
    pub fn from_decimal(value: f64) -> Self {
        let minor_units = (value * 100.0).round();

        if minor_units.is_finite() {
            Self(minor_units as i64)
        } else {
            Self::ZERO
        }
    }

    /// The amount as a decimal with two fractional digits.
    pub fn to_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// The raw count of minor units.
    pub fn minor_units(self) -> i64 {
        self.0
    }

    /// The magnitude of the amount.
    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Whether the amount is below zero.
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Whether the amount is above zero.
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Scale the amount by a factor, rounding to the nearest minor unit.
    ///
    /// A non-finite result coerces to zero.
    pub fn multiply(self, scalar: f64) -> Self {
        Self::from_round(self.0 as f64 * scalar)
    }

    /// Divide the amount by a divisor, rounding to the nearest minor unit.
    ///
    /// Division by zero coerces to zero, consistent with the non-finite
    /// input policy of [Money::from_decimal].
    pub fn divide(self, divisor: f64) -> Self {
        Self::from_round(self.0 as f64 / divisor)
    }

    fn from_round(minor_units: f64) -> Self {
        let rounded = minor_units.round();

        if rounded.is_finite() {
            Self(rounded as i64)
        } else {
            Self::ZERO
        }
    }

    /// Format the amount with thousands separators and exactly two decimal
    /// places, e.g. `"1,234.50"`.
    pub fn format(self) -> String {
        static FMT: OnceLock<Formatter> = OnceLock::new();

        let fmt = FMT.get_or_init(|| {
            Formatter::new()
                .separator(',')
                .unwrap()
                .precision(Precision::Decimals(2))
        });

        let mut formatted = if self.0 == 0 {
            // Zero is hardcoded as "0", so we must specify the formatted
            // string for zero ourselves.
            "0.00".to_owned()
        } else {
            fmt.fmt_string(self.abs().to_decimal())
        };

        // numfmt omits the last trailing zero, so we must add it ourselves.
        // For example, "12.30" is rendered as "12.3" so we append "0".
        if formatted.as_bytes()[formatted.len() - 3] != b'.' {
            formatted = format!("{formatted}0");
        }

        if self.is_negative() {
            format!("-{formatted}")
        } else {
            formatted
        }
    }

    /// Format the amount followed by the currency symbol, e.g. `"99.90 ₽"`.
    pub fn format_with_symbol(self, currency: Currency) -> String {
        format!("{} {}", self.format(), currency.symbol())
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format())
    }
}

// Amounts cross the wire as plain JSON decimals, e.g. `-45.99`.
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;

        Ok(Money::from_decimal(value))
    }
}

// Stored in SQLite as INTEGER minor units so that SUM() stays exact.
impl ToSql for Money {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for Money {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_i64().map(Money)
    }
}

#[cfg(test)]
mod conversion_tests {
    use super::Money;

    #[test]
    fn from_decimal_rounds_to_nearest_cent() {
        assert_eq!(Money::from_decimal(12.34).minor_units(), 1234);
        assert_eq!(Money::from_decimal(12.345).minor_units(), 1235);
        assert_eq!(Money::from_decimal(-12.345).minor_units(), -1235);
        assert_eq!(Money::from_decimal(0.1).minor_units(), 10);
    }

    #[test]
    fn from_decimal_coerces_non_finite_to_zero() {
        assert_eq!(Money::from_decimal(f64::NAN), Money::ZERO);
        assert_eq!(Money::from_decimal(f64::INFINITY), Money::ZERO);
        assert_eq!(Money::from_decimal(f64::NEG_INFINITY), Money::ZERO);
    }

    #[test]
    fn to_decimal_has_two_fractional_digits() {
        assert_eq!(Money::from_minor_units(1050).to_decimal(), 10.5);
        assert_eq!(Money::from_minor_units(-25).to_decimal(), -0.25);
    }
}

#[cfg(test)]
mod arithmetic_tests {
    use super::Money;

    #[test]
    fn addition_avoids_float_drift() {
        // 0.1 + 0.2 != 0.3 in binary floating point.
        let sum = Money::from_decimal(0.1) + Money::from_decimal(0.2);

        assert_eq!(sum, Money::from_decimal(0.3));
    }

    #[test]
    fn subtract_then_add_round_trips_exactly() {
        let values = [
            (19.99, 0.01),
            (0.1, 0.2),
            (1234.56, 789.01),
            (0.07, 100_000.33),
        ];

        for (a, b) in values {
            let a = Money::from_decimal(a);
            let b = Money::from_decimal(b);

            assert_eq!((a - b) + b, a, "({a:?} - {b:?}) + {b:?} != {a:?}");
        }
    }

    #[test]
    fn sum_over_many_small_amounts_is_exact() {
        let total: Money = std::iter::repeat_n(Money::from_decimal(0.1), 1000).sum();

        assert_eq!(total, Money::from_decimal(100.0));
    }

    #[test]
    fn multiply_rounds_to_nearest_cent() {
        let price = Money::from_decimal(10.0);

        assert_eq!(price.multiply(0.333), Money::from_minor_units(333));
        assert_eq!(price.multiply(-1.5), Money::from_decimal(-15.0));
    }

    #[test]
    fn divide_by_zero_coerces_to_zero() {
        assert_eq!(Money::from_decimal(10.0).divide(0.0), Money::ZERO);
    }

    #[test]
    fn divide_rounds_to_nearest_cent() {
        // 10.00 / 3 = 3.333... -> 3.33
        assert_eq!(Money::from_decimal(10.0).divide(3.0), Money::from_minor_units(333));
    }
}
