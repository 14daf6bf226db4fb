//! # sedekat-ledger: Balance and Redemption Service
//!
//! The layer the admin and reseller dashboards call. It reads the order and
//! redemption ledgers through `sedekat-db`, derives balances with
//! `sedekat-core`, and guards every redemption with the available balance.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ledger-api (HTTP)                                                     │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 sedekat-ledger (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   LedgerService ──────► BalanceCache (short TTL)               │   │
//! │  │        │                                                        │   │
//! │  │        ├── balance / balances_report                           │   │
//! │  │        ├── request / approve / reject redemption               │   │
//! │  │        └── create_order / advance_order_status                 │   │
//! │  └────────┬────────────────────────────────────────────────────────┘   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │   sedekat-db (SQLite)          sedekat-core (pure rules)                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`service`] - `LedgerService`, every operation the dashboards use
//! - [`cache`] - TTL cache for dashboard balances
//! - [`report`] - Per-reseller report rows and totals
//! - [`error`] - `LedgerError`

pub mod cache;
pub mod error;
pub mod report;
pub mod service;

pub use cache::{BalanceCache, Generation};
pub use error::{LedgerError, LedgerResult};
pub use report::{BalancesReport, ResellerBalance};
pub use service::LedgerService;
