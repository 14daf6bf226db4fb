//! # Balance Reconciliation
//!
//! Turns earnings and approved redemptions into the one balance every screen
//! shows and every redemption is checked against.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  completed orders ──► compute_earnings ──► Earnings ─────┐             │
//! │                                                            │             │
//! │  approved redemptions ──► RedeemedTotals ──────────────────┤             │
//! │                                                            ▼             │
//! │                                                       reconcile()       │
//! │                                                            │             │
//! │                                                            ▼             │
//! │                                                     DerivedBalance      │
//! │                                       available = max(0, earned - spent)│
//! │                                                            │             │
//! │                                       ┌────────────────────┴──────┐     │
//! │                                       ▼                           ▼     │
//! │                                 dashboards                 authorize()  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is persisted. A [`DerivedBalance`] is only valid for the
//! period it was computed over.

use serde::Serialize;
use ts_rs::TS;

use crate::earnings::Earnings;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{
    LedgerAmount, Points, RedemptionStatus, RewardCatalogEntry, RewardRedemption, RewardType,
};

// =============================================================================
// Redeemed Totals
// =============================================================================

/// Sum of approved redemptions, split by reward type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct RedeemedTotals {
    pub redeemed_commission: Money,
    pub redeemed_points: Points,
}

impl RedeemedTotals {
    /// Adds one redemption amount to the matching partition.
    pub fn add(&mut self, amount: LedgerAmount) {
        match amount {
            LedgerAmount::Commission(m) => self.redeemed_commission += m,
            LedgerAmount::Points(p) => self.redeemed_points += p,
        }
    }

    /// Sums the approved redemptions in `redemptions`, ignoring pending and rejected rows.
    pub fn from_approved<'a, I>(redemptions: I) -> Self
    where
        I: IntoIterator<Item = &'a RewardRedemption>,
    {
        let mut totals = RedeemedTotals::default();
        for redemption in redemptions {
            if redemption.status == RedemptionStatus::Approved {
                totals.add(redemption.amount());
            }
        }
        totals
    }
}

// =============================================================================
// Derived Balance
// =============================================================================

/// Earned, redeemed and available commission and points for one reseller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct DerivedBalance {
    pub earned_commission: Money,
    pub earned_points: Points,
    pub redeemed_commission: Money,
    pub redeemed_points: Points,
    pub available_commission: Money,
    pub available_points: Points,
}

impl DerivedBalance {
    /// Available amount in the balance a reward type draws from.
    pub fn available(&self, reward_type: RewardType) -> LedgerAmount {
        match reward_type {
            RewardType::Commission => LedgerAmount::Commission(self.available_commission),
            RewardType::Points => LedgerAmount::Points(self.available_points),
        }
    }

    /// Whether earlier approvals exceeded earnings (the clamp was applied).
    ///
    /// Only manual edits or approvals that predate approval-time checks can
    /// produce this.
    pub fn is_overdrawn(&self) -> bool {
        self.redeemed_commission > self.earned_commission
            || self.redeemed_points > self.earned_points
    }
}

impl std::ops::Add for DerivedBalance {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        DerivedBalance {
            earned_commission: self.earned_commission + other.earned_commission,
            earned_points: self.earned_points + other.earned_points,
            redeemed_commission: self.redeemed_commission + other.redeemed_commission,
            redeemed_points: self.redeemed_points + other.redeemed_points,
            available_commission: self.available_commission + other.available_commission,
            available_points: self.available_points + other.available_points,
        }
    }
}

impl std::iter::Sum for DerivedBalance {
    fn sum<I: Iterator<Item = DerivedBalance>>(iter: I) -> Self {
        iter.fold(DerivedBalance::default(), std::ops::Add::add)
    }
}

/// Computes the balance for one reseller.
///
/// Each side is clamped at zero independently. Pure: same input, same output.
///
/// ## Example
/// ```rust
/// use sedekat_core::balance::{reconcile, RedeemedTotals};
/// use sedekat_core::earnings::Earnings;
/// use sedekat_core::money::Money;
///
/// let earned = Earnings { total_commission: Money::from_rupiah(2_500), ..Default::default() };
/// let spent = RedeemedTotals { redeemed_commission: Money::from_rupiah(1_000), ..Default::default() };
///
/// let balance = reconcile(&earned, &spent);
/// assert_eq!(balance.available_commission, Money::from_rupiah(1_500));
/// ```
pub fn reconcile(earnings: &Earnings, redeemed: &RedeemedTotals) -> DerivedBalance {
    DerivedBalance {
        earned_commission: earnings.total_commission,
        earned_points: earnings.total_points,
        redeemed_commission: redeemed.redeemed_commission,
        redeemed_points: redeemed.redeemed_points,
        available_commission: (earnings.total_commission - redeemed.redeemed_commission)
            .floor_zero(),
        available_points: (earnings.total_points - redeemed.redeemed_points).floor_zero(),
    }
}

// =============================================================================
// Authorization
// =============================================================================

/// Decides whether a balance covers a reward.
///
/// Rejects when `cost > available`; a cost exactly equal to the available
/// amount is allowed.
pub fn authorize(balance: &DerivedBalance, reward: &RewardCatalogEntry) -> CoreResult<()> {
    authorize_amount(balance, reward.cost_amount())
}

/// Same check as [`authorize`] for an arbitrary amount (used when approving a
/// stored redemption whose reward may since have changed).
pub fn authorize_amount(balance: &DerivedBalance, cost: LedgerAmount) -> CoreResult<()> {
    let reward_type = cost.reward_type();
    let available = balance.available(reward_type);

    if cost.raw() > available.raw() {
        return Err(CoreError::InsufficientBalance {
            reward_type,
            available,
            cost,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
