//! # sedekat-core: Pure Ledger Logic for SEDEKAT
//!
//! This crate holds the commission and points rules of the SEDEKAT reseller
//! program as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      SEDEKAT Ledger Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Admin dashboard / Reseller dashboard (React)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP/JSON                              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    ledger-api (axum)                            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        sedekat-ledger (balance service, redemption gate)        │   │
//! │  └──────────────┬──────────────────────────────────┬───────────────┘   │
//! │                 │                                  │                    │
//! │  ┌──────────────▼──────────────────┐  ┌────────────▼────────────────┐  │
//! │  │  ★ sedekat-core (THIS CRATE) ★  │  │  sedekat-db (SQLite/sqlx)   │  │
//! │  │                                 │  │  ledger reads, atomic       │  │
//! │  │  earnings  balance  redemption  │◄─┤  checkout and redemption    │  │
//! │  │  checkout  period   validation  │  │  writes                     │  │
//! │  │                                 │  └─────────────────────────────┘  │
//! │  │  NO I/O • NO DATABASE • NO CLOCK│                                    │
//! │  └─────────────────────────────────┘                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Order, OrderItem, Reseller, RewardRedemption, ...)
//! - [`money`] - Money in integer sen
//! - [`period`] - Report date ranges with whole-day boundaries
//! - [`earnings`] - Snapshot-based commission and points calculator
//! - [`balance`] - Reconciler and redemption authorization decision
//! - [`redemption`] - Redemption approval state machine
//! - [`checkout`] - Order aggregate builder with product snapshots
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use sedekat_core::balance::{reconcile, RedeemedTotals};
//! use sedekat_core::earnings::{compute_earnings, RateTable};
//! use sedekat_core::money::Money;
//!
//! let earnings = compute_earnings(&[], &RateTable::new());
//! let balance = reconcile(&earnings, &RedeemedTotals::default());
//! assert_eq!(balance.available_commission, Money::zero());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod balance;
pub mod checkout;
pub mod earnings;
pub mod error;
pub mod money;
pub mod period;
pub mod redemption;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use balance::{DerivedBalance, RedeemedTotals};
pub use earnings::Earnings;
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use period::DateRange;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single product in one order.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum distinct products in one order.
pub const MAX_ORDER_ITEMS: usize = 100;
