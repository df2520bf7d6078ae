//! Fixed-point monetary amounts.
//!
//! Every balance and operation amount in the ledger is an [`Amount`]: an
//! integer count of minor units (centimes), two decimal places. Integer
//! representation keeps the exact-equality checks used by the rule engines
//! (multiple-of-unit, balance floors) reliable, which binary floats cannot
//! guarantee.

use sea_orm::DeriveValueType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minor units per major currency unit (1 FC = 100 centimes).
const SCALE: i64 = 100;

/// A monetary amount stored as a scaled integer of minor units.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Default,
    Hash,
    Serialize,
    Deserialize,
    DeriveValueType,
)]
pub struct Amount(i64);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Amount(0);

    /// Builds an amount from whole currency units.
    pub const fn from_major(value: i64) -> Self {
        Amount(value * SCALE)
    }

    /// Builds an amount from minor units (centimes).
    pub const fn from_minor(value: i64) -> Self {
        Amount(value)
    }

    /// The raw minor-unit count.
    pub const fn minor(self) -> i64 {
        self.0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Whether `self` is an exact multiple of `unit`. False if `unit` is
    /// not positive.
    pub const fn is_multiple_of(self, unit: Self) -> bool {
        unit.0 > 0 && self.0 % unit.0 == 0
    }

    /// How many whole `unit`s fit into `self` (floor division). Zero if
    /// `unit` is not positive.
    pub const fn units_of(self, unit: Self) -> i64 {
        if unit.0 > 0 { self.0 / unit.0 } else { 0 }
    }

    /// `self × percent / 100`, rounded down to the minor unit.
    pub const fn percent(self, percent: u32) -> Self {
        Amount(self.0 * percent as i64 / 100)
    }

    /// Interest charged on `self` at `rate_bp` basis points, rounded down.
    pub const fn interest_at(self, rate_bp: u32) -> Self {
        Amount(self.0 * rate_bp as i64 / 10_000)
    }

    /// The largest request `r` such that `r + interest_at(r) <= self`,
    /// i.e. `floor(self / (1 + rate))` in minor units. This is the ceiling
    /// reported when a requested net amount plus its commission exceeds
    /// the balance.
    pub const fn max_request_at(self, rate_bp: u32) -> Self {
        Amount(self.0 * 10_000 / (10_000 + rate_bp as i64))
    }

    /// `self - other`, floored at zero.
    pub const fn saturating_sub(self, other: Self) -> Self {
        let diff = self.0 - other.0;
        if diff < 0 { Amount(0) } else { Amount(diff) }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{sign}{}.{:02} FC", abs / SCALE, abs % SCALE)
    }
}

impl std::ops::Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Amount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount(self.0 - rhs.0)
    }
}

impl std::ops::Neg for Amount {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Amount(-self.0)
    }
}

impl std::ops::AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::ops::SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_major_scales() {
        assert_eq!(Amount::from_major(5_000), Amount::from_minor(500_000));
        assert_eq!(Amount::from_major(0), Amount::ZERO);
    }

    #[test]
    fn display_formats_minor_units() {
        assert_eq!(Amount::from_minor(500_000).to_string(), "5000.00 FC");
        assert_eq!(Amount::from_minor(123_45).to_string(), "123.45 FC");
        assert_eq!(Amount::from_minor(-150).to_string(), "-1.50 FC");
    }

    #[test]
    fn multiple_of_unit() {
        let unit = Amount::from_major(5_000);
        assert!(Amount::from_major(15_000).is_multiple_of(unit));
        assert!(!Amount::from_major(15_001).is_multiple_of(unit));
        assert!(!Amount::from_major(100).is_multiple_of(Amount::ZERO));
    }

    #[test]
    fn units_of_floors() {
        let unit = Amount::from_major(5_000);
        assert_eq!(Amount::from_major(15_000).units_of(unit), 3);
        assert_eq!(Amount::from_major(14_999).units_of(unit), 2);
        assert_eq!(Amount::from_major(100).units_of(Amount::ZERO), 0);
    }

    #[test]
    fn percent_floors() {
        assert_eq!(
            Amount::from_major(10_000).percent(30),
            Amount::from_major(3_000)
        );
        assert_eq!(Amount::from_minor(101).percent(50), Amount::from_minor(50));
    }

    #[test]
    fn interest_at_five_percent_is_exact() {
        // 10_000 FC at 5% -> 500 FC
        assert_eq!(
            Amount::from_major(10_000).interest_at(500),
            Amount::from_major(500)
        );
    }

    #[test]
    fn max_request_inverts_interest() {
        // balance 10_500 FC at 5% -> at most 10_000 FC may be requested
        let balance = Amount::from_major(10_500);
        let max = balance.max_request_at(500);
        assert_eq!(max, Amount::from_major(10_000));
        assert!(max + max.interest_at(500) <= balance);
    }

    #[test]
    fn max_request_plus_interest_never_exceeds_balance() {
        for minor in [1, 99, 1_000, 123_457, 1_050_000, 99_999_999] {
            let balance = Amount::from_minor(minor);
            let max = balance.max_request_at(500);
            assert!(max + max.interest_at(500) <= balance);
        }
    }

    #[test]
    fn saturating_sub_floors_at_zero() {
        let a = Amount::from_major(100);
        let b = Amount::from_major(150);
        assert_eq!(a.saturating_sub(b), Amount::ZERO);
        assert_eq!(b.saturating_sub(a), Amount::from_major(50));
    }

    #[test]
    fn arithmetic_ops() {
        let mut a = Amount::from_major(100);
        a += Amount::from_major(50);
        assert_eq!(a, Amount::from_major(150));
        a -= Amount::from_major(25);
        assert_eq!(a, Amount::from_major(125));
        assert_eq!(a - Amount::from_major(125), Amount::ZERO);
        assert_eq!(-Amount::from_major(10), Amount::from_major(-10));
    }
}
