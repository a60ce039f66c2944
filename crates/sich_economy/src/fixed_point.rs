//! # Reward Amounts
//!
//! **NO FLOATING POINT IN REWARD BALANCES**
//!
//! The reward currency has 18 decimals. An amount is a count of base units
//! in a `u128`; one whole unit is `10^18` of them. Arithmetic is checked and
//! surfaces as [`EconomyError`] so a balance never wraps.

use std::fmt;

use sich_shared::REWARD_DECIMALS;

use crate::error::{EconomyError, EconomyResult};

/// Base units per whole reward unit.
const UNIT: u128 = 10u128.pow(REWARD_DECIMALS);

/// A reward amount in base units (18 decimals).
///
/// ```rust
/// use sich_economy::FixedPoint18;
///
/// let price = FixedPoint18::from_whole(100);
/// assert_eq!(price.to_base_units(), 100 * 10u128.pow(18));
/// assert_eq!(price.to_string(), "100.000000000000000000");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct FixedPoint18(u128);

impl FixedPoint18 {
    /// No reward.
    pub const ZERO: Self = Self(0);

    /// Exactly one whole unit.
    pub const ONE: Self = Self(UNIT);

    /// `whole` units. Never overflows: `u64::MAX * 10^18 < u128::MAX`.
    #[inline]
    #[must_use]
    pub const fn from_whole(whole: u64) -> Self {
        Self(whole as u128 * UNIT)
    }

    /// Wraps a raw base-unit count.
    #[inline]
    #[must_use]
    pub const fn from_base_units(units: u128) -> Self {
        Self(units)
    }

    /// The raw base-unit count.
    #[inline]
    #[must_use]
    pub const fn to_base_units(self) -> u128 {
        self.0
    }

    /// `true` for the zero amount.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Adds two amounts.
    ///
    /// # Errors
    ///
    /// `ArithmeticOverflow` past `u128::MAX` base units.
    #[inline]
    pub fn safe_add(self, rhs: Self) -> EconomyResult<Self> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(EconomyError::ArithmeticOverflow)
    }

    /// Subtracts `rhs`, treating `self` as the available balance.
    ///
    /// # Errors
    ///
    /// `InsufficientBalance` if `rhs > self`.
    #[inline]
    pub fn safe_sub(self, rhs: Self) -> EconomyResult<Self> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or(EconomyError::InsufficientBalance {
                required: rhs.0,
                available: self.0,
            })
    }
}

impl fmt::Display for FixedPoint18 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:018}", self.0 / UNIT, self.0 % UNIT)
    }
}

impl fmt::Debug for FixedPoint18 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedPoint18({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_units_scale_by_decimals() {
        assert_eq!(FixedPoint18::from_whole(100).to_base_units(), 100 * UNIT);
        assert_eq!(FixedPoint18::from_whole(1), FixedPoint18::ONE);
        assert!(FixedPoint18::from_whole(0).is_zero());
    }

    #[test]
    fn test_largest_whole_amount_fits() {
        let amount = FixedPoint18::from_whole(u64::MAX);
        assert_eq!(amount.to_base_units() / UNIT, u128::from(u64::MAX));
    }

    #[test]
    fn test_add_past_capacity_overflows() {
        let top = FixedPoint18::from_base_units(u128::MAX);
        assert_eq!(top.safe_add(FixedPoint18::ONE), Err(EconomyError::ArithmeticOverflow));
    }

    #[test]
    fn test_sub_below_zero_reports_balance() {
        let result = FixedPoint18::from_base_units(5).safe_sub(FixedPoint18::from_base_units(7));
        assert_eq!(
            result,
            Err(EconomyError::InsufficientBalance {
                required: 7,
                available: 5,
            })
        );
    }

    #[test]
    fn test_fractional_display() {
        let amount = FixedPoint18::from_base_units(42 * UNIT + 5);
        assert_eq!(amount.to_string(), "42.000000000000000005");
        assert_eq!(format!("{amount:?}"), "FixedPoint18(42.000000000000000005)");
    }
}
