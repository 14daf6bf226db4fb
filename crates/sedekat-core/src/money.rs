//! # Money Module
//!
//! Provides the `Money` type for commission amounts, prices and reward costs.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing 0.1 commission a thousand times in f64 does not give 100.0.    │
//! │  A ledger that drifts by a fraction of a rupiah per item eventually     │
//! │  disagrees with the redemption table.                                   │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Sen (1 rupiah = 100 sen)                         │
//! │    Every amount is an i64 count of sen. Accumulation never rounds;      │
//! │    rounding only happens when the UI formats a value for display.       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use sedekat_core::money::Money;
//!
//! let commission = Money::from_rupiah(1_000);
//! let earned = commission * 2_i64;
//! assert_eq!(earned.sen(), 200_000);
//! assert_eq!(earned.to_string(), "Rp2.000");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

/// Sen per rupiah.
pub const SEN_PER_RUPIAH: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in sen (1/100 rupiah).
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate differences (earned - redeemed) can be
///   negative before the reconciler clamps them
/// - **Single field tuple struct**: zero-cost abstraction over i64
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.commission_value ──► OrderItem.commission_snapshot            │
/// │                                        │                                │
/// │                                        ▼                                │
/// │                        snapshot × quantity ──► Earnings.commission     │
/// │                                                        │                │
/// │  RewardRedemption.amount (approved) ──► redeemed ──────┤                │
/// │                                                        ▼                │
/// │                                       DerivedBalance.available_commission│
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from sen.
    ///
    /// ## Example
    /// ```rust
    /// use sedekat_core::money::Money;
    ///
    /// let fee = Money::from_sen(150_050); // Rp1.500,50
    /// assert_eq!(fee.sen(), 150_050);
    /// ```
    #[inline]
    pub const fn from_sen(sen: i64) -> Self {
        Money(sen)
    }

    /// Creates a Money value from whole rupiah.
    #[inline]
    pub const fn from_rupiah(rupiah: i64) -> Self {
        Money(rupiah * SEN_PER_RUPIAH)
    }

    /// Returns the value in sen.
    #[inline]
    pub const fn sen(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupiah portion (truncated toward zero).
    #[inline]
    pub const fn rupiah(&self) -> i64 {
        self.0 / SEN_PER_RUPIAH
    }

    /// Returns the sen portion (always 0-99).
    #[inline]
    pub const fn sen_part(&self) -> i64 {
        (self.0 % SEN_PER_RUPIAH).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the value, or zero if it is negative.
    ///
    /// ## Example
    /// ```rust
    /// use sedekat_core::money::Money;
    ///
    /// let over_redeemed = Money::from_rupiah(500) - Money::from_rupiah(800);
    /// assert_eq!(over_redeemed.floor_zero(), Money::zero());
    /// ```
    #[inline]
    pub const fn floor_zero(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            Money(self.0)
        }
    }

    /// Multiplies a per-unit amount by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use sedekat_core::money::Money;
    ///
    /// let per_unit = Money::from_rupiah(1_000);
    /// assert_eq!(per_unit.multiply_quantity(3), Money::from_rupiah(3_000));
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as Indonesian rupiah: `.` groups thousands, `,` separates sen.
///
/// ## Note
/// For logs and debugging. The dashboards do their own locale formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.rupiah().unsigned_abs().to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        if self.sen_part() == 0 {
            write!(f, "{}Rp{}", sign, grouped)
        } else {
            write!(f, "{}Rp{},{:02}", sign, grouped, self.sen_part())
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
