//! Rupee amounts using decimal arithmetic.
//!
//! The backend sends amounts as JSON numbers (occasionally as strings), so
//! [`Money`] accepts both on the way in and always writes a number on the way
//! out.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul, Sub};
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Currency symbol printed in front of every amount.
pub const RUPEE_SYMBOL: &str = "₹";

/// Error returned when a form value cannot be parsed as an amount.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid amount: {0:?}")]
pub struct MoneyParseError(pub String);

/// An amount in Indian rupees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Whole-rupee amount.
    #[must_use]
    pub fn from_rupees(rupees: i64) -> Self {
        Self(Decimal::from(rupees))
    }

    /// Amount from paise (1/100 rupee).
    #[must_use]
    pub fn from_paise(paise: i64) -> Self {
        Self(Decimal::new(paise, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// `self + rhs`, or `None` on overflow.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// `self - rhs`, or `None` on overflow.
    #[must_use]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// `self × factor`, or `None` on overflow.
    #[must_use]
    pub fn checked_mul(self, factor: Decimal) -> Option<Self> {
        self.0.checked_mul(factor).map(Self)
    }

    /// Round to two decimal places, half away from zero.
    #[must_use]
    pub fn round_to_paise(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Round to the nearest whole rupee, half away from zero.
    #[must_use]
    pub fn round_to_rupee(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Plain two-decimal representation without symbol or grouping (`1234.50`).
    ///
    /// Used for form values and CSV cells.
    #[must_use]
    pub fn to_plain_string(&self) -> String {
        let mut rounded = self.round_to_paise().0;
        rounded.rescale(2);
        rounded.to_string()
    }

    /// Format for display with the rupee symbol and Indian digit grouping
    /// (e.g., `₹1,23,456.78`).
    #[must_use]
    pub fn display(&self) -> String {
        let plain = self.to_plain_string();
        let (sign, unsigned) = plain
            .strip_prefix('-')
            .map_or(("", plain.as_str()), |rest| ("-", rest));
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, "00"));
        format!("{sign}{RUPEE_SYMBOL}{}.{fraction}", group_indian(whole))
    }

    /// Parse a user-entered amount.
    ///
    /// Accepts an optional rupee symbol, surrounding whitespace and digit
    /// grouping commas (`₹ 1,299.00`).
    ///
    /// # Errors
    ///
    /// Returns [`MoneyParseError`] if the remaining text is not a decimal number.
    pub fn parse(input: &str) -> Result<Self, MoneyParseError> {
        let cleaned: String = input
            .trim()
            .trim_start_matches(RUPEE_SYMBOL)
            .chars()
            .filter(|c| *c != ',' && !c.is_whitespace())
            .collect();
        Decimal::from_str(&cleaned)
            .map(Self)
            .map_err(|_| MoneyParseError(input.to_string()))
    }
}

/// Group an unsigned digit string the Indian way: the last three digits, then
/// pairs (`1234567` becomes `12,34,567`).
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, last_three) = digits.split_at(digits.len() - 3);

    let mut pairs = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (front, pair) = rest.split_at(rest.len() - 2);
        pairs.push(pair);
        rest = front;
    }
    if !rest.is_empty() {
        pairs.push(rest);
    }
    pairs.reverse();

    let mut out = pairs.join(",");
    out.push(',');
    out.push_str(last_three);
    out
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Money {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <Decimal as Deserialize>::deserialize(deserializer).map(Self)
    }
}
