//! # sedekat-db: Database Layer for the SEDEKAT Ledger
//!
//! This crate provides database access for the reseller ledger.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SEDEKAT Data Flow                                │
//! │                                                                         │
//! │  LedgerService::balance(reseller_id, range)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     sedekat-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │               │    │ OrderRepo      │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ RedemptionRepo │   │ 001_initial_ │  │   │
//! │  │   │               │    │ ResellerRepo   │   │   schema.sql │  │   │
//! │  │   │               │    │ ProductRepo    │   │              │  │   │
//! │  │   │               │    │ RewardCatalog  │   │              │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (sedekat.db)                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sedekat_db::{Database, DbConfig};
//! use sedekat_core::DateRange;
//!
//! let db = Database::new(DbConfig::new("./sedekat.db")).await?;
//! let ledger = db.orders().completed_orders("reseller-1", &DateRange::all_time()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::order::{OrderLedger, OrderRepository};
pub use repository::product::ProductRepository;
pub use repository::redemption::{DecisionOutcome, RedemptionRepository};
pub use repository::reseller::ResellerRepository;
pub use repository::reward::RewardCatalogRepository;
