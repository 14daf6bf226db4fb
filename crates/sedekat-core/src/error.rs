//! # Error Types
//!
//! Domain-specific error types for sedekat-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  sedekat-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  sedekat-db errors                                                     │
//! │  └── DbError          - Data access failures                           │
//! │                                                                         │
//! │  sedekat-ledger errors                                                 │
//! │  └── LedgerError      - What the service returns                       │
//! │                                                                         │
//! │  ledger-api errors                                                     │
//! │  └── ApiError         - What the dashboards see (JSON)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::{LedgerAmount, OrderStatus, RedemptionStatus, RewardType};

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A redemption costs more than the reseller can currently spend.
    ///
    /// ## User Workflow
    /// ```text
    /// Admin picks "Voucher Rp2.000" for reseller R
    ///      │
    ///      ▼
    /// available_commission = Rp1.500
    ///      │
    ///      ▼
    /// InsufficientBalance { available: Rp1.500, cost: Rp2.000 }
    ///      │
    ///      ▼
    /// UI shows the shortfall inline, nothing is written
    /// ```
    #[error("Insufficient {reward_type} balance: available {available}, cost {cost}")]
    InsufficientBalance {
        reward_type: RewardType,
        available: LedgerAmount,
        cost: LedgerAmount,
    },

    /// A redemption is already approved or rejected.
    #[error("Redemption cannot move from {from} to {to}")]
    InvalidRedemptionTransition {
        from: RedemptionStatus,
        to: RedemptionStatus,
    },

    /// An order status change that goes backwards or leaves a terminal state.
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidOrderTransition {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// A stored status string in neither vocabulary.
    #[error("Unknown order status: {0:?}")]
    UnknownOrderStatus(String),

    /// Product referenced at checkout does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Product exists but is no longer sold.
    #[error("Product is inactive: {0}")]
    ProductInactive(String),

    /// Checkout without any line item.
    #[error("Order must contain at least one item")]
    EmptyOrder,

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Report period whose start is after its end.
    #[error("start date {start} is after end date {end}")]
    InvalidDateRange { start: String, end: String },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
