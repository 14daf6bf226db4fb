//! # Snapshot-Based Earnings
//!
//! Computes the commission and points a reseller earned from completed orders.
//!
//! ## Rate Resolution (per order item)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  item.commission_snapshot ──► present? ── yes ──► use it               │
//! │                                   │                                     │
//! │                                   no                                    │
//! │                                   ▼                                     │
//! │  product.commission_value ──► product exists and has a value? ──► use  │
//! │                                   │                                     │
//! │                                   no                                    │
//! │                                   ▼                                     │
//! │                                   0   (orphaned reference, not an error)│
//! │                                                                         │
//! │  earned += per_unit × item.quantity                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Points resolve the same way, independently of commission: an item may
//! carry a commission snapshot but fall back to the product for points.
//!
//! Catalog edits after checkout never change historical earnings for items
//! that were snapshotted.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;
use ts_rs::TS;

use crate::money::Money;
use crate::types::{OrderItem, OrderWithItems, Points, ProductRates};

/// Current product rates, looked up by product id.
pub type RateTable = HashMap<String, ProductRates>;

/// Totals earned over a set of orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct Earnings {
    pub total_commission: Money,
    pub total_points: Points,
}

/// Commission per unit for an item: snapshot, then live product value, then zero.
pub fn commission_per_unit(item: &OrderItem, current: Option<&ProductRates>) -> Money {
    item.commission_snapshot()
        .or_else(|| current.and_then(|r| r.commission_value))
        .unwrap_or_default()
}

/// Points per unit for an item: snapshot, then live product value, then zero.
pub fn points_per_unit(item: &OrderItem, current: Option<&ProductRates>) -> Points {
    item.points_snapshot()
        .or_else(|| current.and_then(|r| r.points_value))
        .unwrap_or_default()
}

/// Sums commission and points over every item of every order.
///
/// The caller decides which orders count (attribution, status, period);
/// this function only prices their items.
pub fn compute_earnings(orders: &[OrderWithItems], rates: &RateTable) -> Earnings {
    let mut earnings = Earnings::default();

    for order in orders {
        for item in &order.items {
            let current = rates.get(&item.product_id);

            if current.is_none()
                && (item.commission_snapshot_sen.is_none() || item.points_snapshot.is_none())
            {
                debug!(
                    order_id = %order.order.id,
                    product_id = %item.product_id,
                    "Order item has no snapshot and no live product, contributes zero"
                );
            }

            earnings.total_commission += commission_per_unit(item, current) * item.quantity;
            earnings.total_points += points_per_unit(item, current) * item.quantity;
        }
    }

    earnings
}

// =============================================================================
// Unit Tests
// =============================================================================
