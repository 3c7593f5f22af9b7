//! Fixed-radix money arithmetic.
//!
//! Amounts are split into gold, silver and copper with 100 copper to the
//! silver and 100 silver to the gold. Every operation goes through the
//! total copper value, so the canonical form (silver and copper below 100)
//! is kept by construction.

use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

use serde::{Deserialize, Serialize};

const RADIX: u64 = 100;

/// A non-negative amount of in-game currency.
///
/// # Example
///
/// ```
/// use craftpath::currency::CurrencyAmount;
///
/// let amount = CurrencyAmount::from_copper(1_234_567);
/// assert_eq!((amount.gold, amount.silver, amount.copper), (123, 45, 67));
/// assert_eq!(amount.to_copper(), 1_234_567);
/// assert_eq!(amount.to_string(), "123g45s67cu");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u64", into = "u64")]
pub struct CurrencyAmount {
    pub gold: u64,
    pub silver: u64,
    pub copper: u64,
}

impl CurrencyAmount {
    pub const ZERO: CurrencyAmount = CurrencyAmount {
        gold: 0,
        silver: 0,
        copper: 0,
    };

    /// Splits a raw copper value into its gold/silver/copper tiers.
    pub fn from_copper(raw: u64) -> Self {
        let silver = raw / RADIX;
        Self {
            gold: silver / RADIX,
            silver: silver % RADIX,
            copper: raw % RADIX,
        }
    }

    /// Total value in copper.
    pub fn to_copper(&self) -> u64 {
        self.gold * RADIX * RADIX + self.silver * RADIX + self.copper
    }

    /// Scales by a real-valued factor, flooring the resulting copper value.
    pub fn mul_f64(self, factor: f64) -> Self {
        Self::from_copper((self.to_copper() as f64 * factor).floor() as u64)
    }

    /// Divides by a real-valued divisor, flooring the resulting copper value.
    ///
    /// Results that are negative or not a number collapse to zero.
    pub fn div_f64(self, divisor: f64) -> Self {
        let raw = (self.to_copper() as f64 / divisor).floor();
        // `as` saturates: NaN and negatives become 0, overflow becomes u64::MAX.
        Self::from_copper(raw as u64)
    }
}

impl From<u64> for CurrencyAmount {
    fn from(raw: u64) -> Self {
        Self::from_copper(raw)
    }
}

impl From<CurrencyAmount> for u64 {
    fn from(amount: CurrencyAmount) -> Self {
        amount.to_copper()
    }
}

impl Add for CurrencyAmount {
    type Output = CurrencyAmount;

    fn add(self, other: CurrencyAmount) -> CurrencyAmount {
        Self::from_copper(self.to_copper().saturating_add(other.to_copper()))
    }
}

impl AddAssign for CurrencyAmount {
    fn add_assign(&mut self, other: CurrencyAmount) {
        *self = *self + other;
    }
}

impl Mul<u64> for CurrencyAmount {
    type Output = CurrencyAmount;

    fn mul(self, factor: u64) -> CurrencyAmount {
        Self::from_copper(self.to_copper().saturating_mul(factor))
    }
}

impl Sum for CurrencyAmount {
    fn sum<I: Iterator<Item = CurrencyAmount>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |total, amount| total + amount)
    }
}

impl Ord for CurrencyAmount {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_copper().cmp(&other.to_copper())
    }
}

impl PartialOrd for CurrencyAmount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CurrencyAmount {
    /// Zero gold and zero silver are omitted; copper is always shown.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.gold != 0 {
            write!(f, "{}g", group_thousands(self.gold))?;
        }
        if self.silver != 0 {
            write!(f, "{}s", self.silver)?;
        }
        write!(f, "{}cu", self.copper)
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(7), "7");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }
}
