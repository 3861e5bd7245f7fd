// Fixed-point currency amounts

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when parsing an amount
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("invalid amount: {0}")]
    Invalid(String),
    #[error("amount has more than two decimal places: {0}")]
    TooPrecise(String),
    #[error("amount out of range: {0}")]
    OutOfRange(String),
}

/// A currency value stored as integer cents
///
/// Two-decimal values round-trip exactly, so repeated aggregation never drifts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_cents(cents: i64) -> Self {
        Amount(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn abs(self) -> Self {
        Amount(self.0.abs())
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Whole currency units, as found in integer JSON fields
    pub fn from_whole(units: i64) -> Result<Self, AmountError> {
        units
            .checked_mul(100)
            .map(Amount)
            .ok_or_else(|| AmountError::OutOfRange(units.to_string()))
    }

    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    pub fn checked_mul(self, rhs: u32) -> Option<Amount> {
        self.0.checked_mul(i64::from(rhs)).map(Amount)
    }

    pub fn checked_abs(self) -> Option<Amount> {
        self.0.checked_abs().map(Amount)
    }

    /// Convert a JSON-sourced float without going through binary arithmetic.
    ///
    /// `f64`'s `Display` prints the shortest representation that round-trips,
    /// so `9.99` formats as "9.99" and parses back to exactly 999 cents.
    pub fn from_f64(value: f64) -> Result<Self, AmountError> {
        if !value.is_finite() {
            return Err(AmountError::Invalid(value.to_string()));
        }
        value.to_string().parse()
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let mut s: String = trimmed.chars().filter(|c| *c != ',' && *c != '$' && *c != ' ').collect();
        if s.is_empty() {
            return Err(AmountError::Empty);
        }

        let negative = s.starts_with('-');
        if s.starts_with('-') || s.starts_with('+') {
            s.remove(0);
        }
        if s.is_empty() {
            return Err(AmountError::Invalid(trimmed.to_string()));
        }

        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s.as_str(), ""),
        };
        let int_part = if int_part.is_empty() { "0" } else { int_part };

        if !int_part.chars().all(|c| c.is_ascii_digit()) || !frac_part.chars().all(|c| c.is_ascii_digit()) {
            return Err(AmountError::Invalid(trimmed.to_string()));
        }
        if frac_part.len() > 2 {
            return Err(AmountError::TooPrecise(trimmed.to_string()));
        }

        let int_val: i64 = int_part
            .parse()
            .map_err(|_| AmountError::OutOfRange(trimmed.to_string()))?;
        let frac_val: i64 = match frac_part.len() {
            0 => 0,
            1 => frac_part.parse::<i64>().map_err(|_| AmountError::Invalid(trimmed.to_string()))? * 10,
            _ => frac_part.parse().map_err(|_| AmountError::Invalid(trimmed.to_string()))?,
        };

        let cents = int_val
            .checked_mul(100)
            .and_then(|v| v.checked_add(frac_val))
            .ok_or_else(|| AmountError::OutOfRange(trimmed.to_string()))?;

        Ok(Amount(if negative { -cents } else { cents }))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0 - rhs.0)
    }
}

impl Mul<u32> for Amount {
    type Output = Amount;

    fn mul(self, rhs: u32) -> Amount {
        Amount(self.0 * i64::from(rhs))
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_and_fractional() {
        assert_eq!("1500".parse::<Amount>().unwrap().cents(), 150_000);
        assert_eq!("-200".parse::<Amount>().unwrap().cents(), -20_000);
        assert_eq!("9.99".parse::<Amount>().unwrap().cents(), 999);
        assert_eq!("0.5".parse::<Amount>().unwrap().cents(), 50);
        assert_eq!(".25".parse::<Amount>().unwrap().cents(), 25);
        assert_eq!("$1,234.56".parse::<Amount>().unwrap().cents(), 123_456);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!("".parse::<Amount>(), Err(AmountError::Empty));
        assert!(matches!("abc".parse::<Amount>(), Err(AmountError::Invalid(_))));
        assert!(matches!("-".parse::<Amount>(), Err(AmountError::Invalid(_))));
        assert!(matches!("1.2.3".parse::<Amount>(), Err(AmountError::Invalid(_))));
        assert!(matches!("1.999".parse::<Amount>(), Err(AmountError::TooPrecise(_))));
        assert!(matches!(
            "99999999999999999999".parse::<Amount>(),
            Err(AmountError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_from_f64_is_exact() {
        assert_eq!(Amount::from_f64(9.99).unwrap().cents(), 999);
        assert_eq!(Amount::from_f64(109.95).unwrap().cents(), 10_995);
        assert_eq!(Amount::from_f64(-0.1).unwrap().cents(), -10);
        assert!(Amount::from_f64(f64::NAN).is_err());
        assert!(Amount::from_f64(0.125).is_err());
    }

    #[test]
    fn test_repeated_addition_does_not_drift() {
        let dime = Amount::from_f64(0.1).unwrap();
        let total: Amount = std::iter::repeat_n(dime, 1000).sum();
        assert_eq!(total, Amount::from_cents(10_000));
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::from_cents(125_000).to_string(), "1250.00");
        assert_eq!(Amount::from_cents(-5).to_string(), "-0.05");
        assert_eq!(Amount::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Amount::from_cents(1000);
        let b = Amount::from_cents(250);
        assert_eq!(a - b, Amount::from_cents(750));
        assert_eq!(b * 3, Amount::from_cents(750));
        assert_eq!(Amount::from_cents(-40).abs(), Amount::from_cents(40));
    }

    #[test]
    fn test_checked_arithmetic() {
        let big = Amount::from_cents(i64::MAX - 10);
        assert_eq!(big.checked_add(Amount::from_cents(10)), Some(Amount::from_cents(i64::MAX)));
        assert_eq!(big.checked_add(Amount::from_cents(11)), None);
        assert_eq!(big.checked_mul(2), None);
        assert_eq!(Amount::from_cents(250).checked_mul(4), Some(Amount::from_cents(1_000)));
        assert_eq!(Amount::from_cents(i64::MIN).checked_abs(), None);
    }

    #[test]
    fn test_from_whole() {
        assert_eq!(Amount::from_whole(695).unwrap().cents(), 69_500);
        assert_eq!(Amount::from_whole(-3).unwrap().cents(), -300);
        assert!(matches!(Amount::from_whole(i64::MAX), Err(AmountError::OutOfRange(_))));
    }
}
