//! # Repository Module
//!
//! Database repository implementations for the SEDEKAT ledger.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  LedgerService                                                          │
//! │       │                                                                 │
//! │       │  db.orders().completed_orders(reseller_id, range)              │
//! │       ▼                                                                 │
//! │  OrderRepository                    (owns a pool handle)               │
//! │       │                                                                 │
//! │       │  acquire a connection, then call                                │
//! │       ▼                                                                 │
//! │  order::fetch_completed_orders(&mut conn, ...)                         │
//! │       │                                                                 │
//! │       │  the same function runs inside the approval transaction        │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Queries that the approval transaction also needs are free functions over
//! `&mut SqliteConnection`; the repositories wrap them for pool callers.
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog master (fallback rates)
//! - [`reseller::ResellerRepository`] - Resellers and catalog tokens
//! - [`order::OrderRepository`] - Checkout, status changes, order ledger reads
//! - [`reward::RewardCatalogRepository`] - Redeemable rewards
//! - [`redemption::RedemptionRepository`] - Redemption ledger, approval, rejection
//! - [`ledger`] - Balance computed on a single connection

pub mod ledger;
pub mod order;
pub mod product;
pub mod redemption;
pub mod reseller;
pub mod reward;

use chrono::{DateTime, Utc};
use sedekat_core::DateRange;

/// Half-open instant bounds of a report range, ready to bind.
///
/// Queries compare with `(?1 IS NULL OR created_at >= ?1) AND (?2 IS NULL OR created_at < ?2)`.
pub(crate) fn range_bounds(range: &DateRange) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    (range.starts_at(), range.ends_before())
}
