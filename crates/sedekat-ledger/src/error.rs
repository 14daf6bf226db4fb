//! # Ledger Error Types
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Ledger Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   Data Access   │  │  Business Rule  │  │     Lookup / State      │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  DataAccess     │  │  Core           │  │  NotFound               │ │
//! │  │  (DbError)      │  │  (CoreError)    │  │  RewardInactive         │ │
//! │  │                 │  │                 │  │  Conflict               │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing in this crate retries. Every error goes straight to the caller.

use sedekat_core::{CoreError, ValidationError};
use sedekat_db::DbError;
use thiserror::Error;

/// Result type alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// The store read or write failed.
    #[error("Data access failed: {0}")]
    DataAccess(DbError),

    /// A business rule refused the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The reward exists but has been withdrawn from the catalog.
    #[error("Reward is not available: {0}")]
    RewardInactive(String),

    /// The row changed between read and write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A report worker task panicked or was cancelled.
    #[error("Task failed: {0}")]
    TaskFailed(String),
}

impl LedgerError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        LedgerError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

impl From<DbError> for LedgerError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => LedgerError::NotFound { entity, id },
            DbError::Invalid(err) => LedgerError::Core(CoreError::Validation(err)),
            other => LedgerError::DataAccess(other),
        }
    }
}

impl From<ValidationError> for LedgerError {
    fn from(err: ValidationError) -> Self {
        LedgerError::Core(CoreError::Validation(err))
    }
}

impl From<tokio::task::JoinError> for LedgerError {
    fn from(err: tokio::task::JoinError) -> Self {
        LedgerError::TaskFailed(err.to_string())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_not_found_becomes_ledger_not_found() {
        let err: LedgerError = DbError::not_found("Redemption", "r-1").into();
        match err {
            LedgerError::NotFound { entity, id } => {
                assert_eq!(entity, "Redemption");
                assert_eq!(id, "r-1");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_other_db_errors_are_data_access() {
        let err: LedgerError = DbError::QueryFailed("disk I/O error".into()).into();
        assert!(matches!(err, LedgerError::DataAccess(_)));
    }

    #[test]
    fn test_refused_row_is_a_validation_error() {
        let err: LedgerError = DbError::Invalid(ValidationError::MustBePositive {
            field: "cost".into(),
        })
        .into();
        assert!(matches!(err, LedgerError::Core(CoreError::Validation(_))));
    }

    #[test]
    fn test_validation_wraps_into_core() {
        let err: LedgerError = ValidationError::Required {
            field: "customer_name".into(),
        }
        .into();
        assert!(matches!(err, LedgerError::Core(CoreError::Validation(_))));
        assert_eq!(err.to_string(), "Validation error: customer_name is required");
    }
}
