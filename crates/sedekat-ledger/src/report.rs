//! # Dashboard Reports
//!
//! Report rows are plain [`DerivedBalance`] values, one per reseller. The
//! report adds nothing of its own beyond the grand total.

use serde::Serialize;
use ts_rs::TS;

use sedekat_core::{DateRange, DerivedBalance, Reseller};

/// One reseller's line in the admin report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct ResellerBalance {
    pub reseller_id: String,
    pub name: String,
    pub is_active: bool,
    pub balance: DerivedBalance,
}

impl ResellerBalance {
    pub fn new(reseller: Reseller, balance: DerivedBalance) -> Self {
        ResellerBalance {
            reseller_id: reseller.id,
            name: reseller.name,
            is_active: reseller.is_active,
            balance,
        }
    }
}

/// Balances of every reseller over a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct BalancesReport {
    pub range: DateRange,
    pub rows: Vec<ResellerBalance>,
    pub totals: DerivedBalance,
}

impl BalancesReport {
    /// Builds the report, totalling the rows.
    pub fn new(range: DateRange, rows: Vec<ResellerBalance>) -> Self {
        let totals = rows.iter().map(|row| row.balance).sum();
        BalancesReport {
            range,
            rows,
            totals,
        }
    }

    /// Rows whose approvals exceed their earnings in this period.
    pub fn overdrawn(&self) -> impl Iterator<Item = &ResellerBalance> {
        self.rows.iter().filter(|row| row.balance.is_overdrawn())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
