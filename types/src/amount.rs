//! Value amounts on either chain.
//!
//! Amounts are fixed-point integers (u128) counted in the smallest value unit,
//! so all monetary arithmetic is exact. One whole unit is `10^18` raw units.
//! Config files and JSON carry amounts as decimal strings (`"0.5"`).

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Raw units per whole unit of value.
pub const UNIT: u128 = 1_000_000_000_000_000_000;

/// Number of decimal places in one whole unit.
pub const DECIMALS: usize = 18;

/// An amount of native value, stored as raw units.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// Whole units (`from_units(1)` is `1.0`).
    pub const fn from_units(units: u128) -> Self {
        Self(units * UNIT)
    }

    /// Thousandths of a unit (`from_milli(500)` is `0.5`).
    pub const fn from_milli(milli: u128) -> Self {
        Self(milli * (UNIT / 1000))
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// `floor(self * percentage / 100)`, or `None` on overflow.
    pub fn percent(self, percentage: u8) -> Option<Self> {
        self.0
            .checked_mul(u128::from(percentage))
            .map(|scaled| Self(scaled / 100))
    }
}

impl Add for Amount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / UNIT;
        let frac = self.0 % UNIT;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{frac:0width$}", width = DECIMALS);
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({self})")
    }
}

impl FromStr for Amount {
    type Err = TypesError;

    /// Parse a decimal amount such as `"1"`, `"0.5"` or `"0.000000000000000001"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| TypesError::InvalidAmount(format!("{s:?}: {reason}"));
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("empty"));
        }
        if frac.len() > DECIMALS {
            return Err(invalid("more than 18 decimal places"));
        }
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if !all_digits(whole) || !all_digits(frac) {
            return Err(invalid("not a decimal number"));
        }
        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("whole part out of range"))?
        };
        let frac_raw: u128 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{frac:0<width$}", width = DECIMALS);
            padded.parse().map_err(|_| invalid("fraction out of range"))?
        };
        whole
            .checked_mul(UNIT)
            .and_then(|w| w.checked_add(frac_raw))
            .map(Self)
            .ok_or_else(|| invalid("overflow"))
    }
}

impl TryFrom<String> for Amount {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.to_string()
    }
}
