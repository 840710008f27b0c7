//! Shared traits and the fixed-point money representation.

use std::{fmt, iter::Sum, ops};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Exposes a stable identifier for entities held by the stores.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Monetary amount stored as signed minor units (cents).
///
/// Binary floating point never touches balances; arithmetic and comparisons
/// operate on the underlying integer.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(self) -> i64 {
        self.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Parses a decimal string such as `200`, `15.99`, or `-2150.30`.
    ///
    /// At most two fraction digits are accepted; anything else is malformed.
    pub fn parse(input: &str) -> Result<Self, ParseMoneyError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ParseMoneyError::Malformed);
        }
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (whole, fraction) = match body.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (body, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(ParseMoneyError::Malformed);
        }
        if fraction.len() > 2 {
            return Err(ParseMoneyError::Malformed);
        }
        let all_digits = |value: &str| value.chars().all(|c| c.is_ascii_digit());
        if !all_digits(whole) || !all_digits(fraction) {
            return Err(ParseMoneyError::Malformed);
        }
        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| ParseMoneyError::Overflow)?
        };
        let fraction_value: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| ParseMoneyError::Malformed)? * 10,
            _ => fraction.parse().map_err(|_| ParseMoneyError::Malformed)?,
        };
        let cents = whole_value
            .checked_mul(100)
            .and_then(|value| value.checked_add(fraction_value))
            .ok_or(ParseMoneyError::Overflow)?;
        Ok(Self(if negative { -cents } else { cents }))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl ops::Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, value| acc + value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Errors that can occur when parsing [`Money`] from text.
pub enum ParseMoneyError {
    Malformed,
    Overflow,
}

impl fmt::Display for ParseMoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseMoneyError::Malformed => f.write_str("amount is not a valid decimal"),
            ParseMoneyError::Overflow => f.write_str("amount is out of range"),
        }
    }
}

impl std::error::Error for ParseMoneyError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_fractional_amounts() {
        assert_eq!(Money::parse("200").unwrap(), Money::from_cents(20_000));
        assert_eq!(Money::parse("15.99").unwrap(), Money::from_cents(1_599));
        assert_eq!(Money::parse("0.5").unwrap(), Money::from_cents(50));
        assert_eq!(Money::parse("-2150.30").unwrap(), Money::from_cents(-215_030));
        assert_eq!(Money::parse(" 42.00 ").unwrap(), Money::from_cents(4_200));
    }

    #[test]
    fn rejects_malformed_input() {
        for input in ["", "  ", "abc", "12.345", "1,000", "12.3.4", "-", "$5"] {
            assert!(Money::parse(input).is_err(), "`{input}` should not parse");
        }
    }

    #[test]
    fn formats_with_two_fraction_digits() {
        assert_eq!(Money::from_cents(20_000).to_string(), "200.00");
        assert_eq!(Money::from_cents(-215_030).to_string(), "-2150.30");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
    }

    #[test]
    fn arithmetic_stays_in_minor_units() {
        let total: Money = [Money::from_cents(150), Money::from_cents(50)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_cents(200));
        assert_eq!(Money::from_cents(100) - Money::from_cents(30), Money::from_cents(70));
        assert_eq!(-Money::from_cents(25), Money::from_cents(-25));
    }
}
