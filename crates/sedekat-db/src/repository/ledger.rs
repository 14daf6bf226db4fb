//! # Single-Connection Balance
//!
//! Computes a reseller's balance with every read on one connection, so it
//! sees the same snapshot as the transaction it runs in.
//!
//! The ledger service computes dashboard balances with parallel reads on
//! separate connections instead; this path exists for the approval
//! transaction, which must read and write under one lock.

use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::order::fetch_completed_orders;
use crate::repository::redemption::fetch_approved_totals;
use sedekat_core::balance::{reconcile, DerivedBalance};
use sedekat_core::earnings::compute_earnings;
use sedekat_core::DateRange;

/// Earned, redeemed and available balance of one reseller over `range`.
pub async fn load_balance(
    conn: &mut SqliteConnection,
    reseller_id: &str,
    range: &DateRange,
) -> DbResult<DerivedBalance> {
    let ledger = fetch_completed_orders(&mut *conn, reseller_id, range).await?;
    let redeemed = fetch_approved_totals(&mut *conn, reseller_id, range).await?;

    let earnings = compute_earnings(&ledger.orders, &ledger.rates);
    let balance = reconcile(&earnings, &redeemed);

    debug!(
        reseller_id = %reseller_id,
        available_commission = %balance.available_commission,
        available_points = %balance.available_points,
        "Balance loaded in transaction"
    );

    Ok(balance)
}
