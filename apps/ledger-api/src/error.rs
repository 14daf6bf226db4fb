//! # API Error Type
//!
//! Every failed request answers with the same JSON body:
//!
//! ```json
//! {
//!   "code": "INSUFFICIENT_BALANCE",
//!   "message": "Insufficient commission balance: available Rp1.500, cost Rp2.000"
//! }
//! ```
//!
//! ## Status Mapping
//! ```text
//! ┌──────────────────────────────┬──────────────────────────┬────────┐
//! │ Source                       │ code                     │ status │
//! ├──────────────────────────────┼──────────────────────────┼────────┤
//! │ ValidationError, bad body    │ VALIDATION_ERROR         │ 400    │
//! │ NotFound (any entity)        │ NOT_FOUND                │ 404    │
//! │ Invalid status transition    │ INVALID_TRANSITION       │ 409    │
//! │ Concurrent change, duplicate │ CONFLICT                 │ 409    │
//! │ InsufficientBalance          │ INSUFFICIENT_BALANCE     │ 422    │
//! │ Inactive product or reward   │ BUSINESS_LOGIC           │ 422    │
//! │ Query/transaction/corrupt    │ DATABASE_ERROR           │ 500    │
//! │ Pool exhausted, no database  │ SERVICE_UNAVAILABLE      │ 503    │
//! └──────────────────────────────┴──────────────────────────┴────────┘
//! ```
//!
//! Database error details are logged, never returned.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use sedekat_core::{CoreError, ValidationError};
use sedekat_db::DbError;
use sedekat_ledger::LedgerError;

/// Error body returned by every handler.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    NotFound,
    InvalidTransition,
    Conflict,
    InsufficientBalance,
    BusinessLogic,
    DatabaseError,
    ServiceUnavailable,
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InvalidTransition | ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::InsufficientBalance | ErrorCode::BusinessLogic => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::Invalid(e) => e.into(),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::Corrupt { entity, id, reason } => {
                error!(%entity, %id, %reason, "Corrupt row");
                ApiError::new(ErrorCode::DatabaseError, "Stored data could not be read")
            }
            DbError::ConnectionFailed(e) => {
                error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::ServiceUnavailable, "Database unavailable")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::ServiceUnavailable, "Database busy, try again")
            }
            DbError::MigrationFailed(e)
            | DbError::QueryFailed(e)
            | DbError::TransactionFailed(e)
            | DbError::Internal(e) => {
                error!("Database operation failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::InsufficientBalance { .. } => {
                ApiError::new(ErrorCode::InsufficientBalance, message)
            }
            CoreError::InvalidRedemptionTransition { .. }
            | CoreError::InvalidOrderTransition { .. } => {
                ApiError::new(ErrorCode::InvalidTransition, message)
            }
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::ProductInactive(_) => ApiError::new(ErrorCode::BusinessLogic, message),
            // Only reachable from request input; stored rows fail as Corrupt.
            CoreError::UnknownOrderStatus(_) | CoreError::EmptyOrder => {
                ApiError::validation(message)
            }
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::DataAccess(e) => e.into(),
            LedgerError::Core(e) => e.into(),
            LedgerError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            LedgerError::RewardInactive(id) => ApiError::new(
                ErrorCode::BusinessLogic,
                format!("Reward is no longer offered: {}", id),
            ),
            LedgerError::Conflict(message) => ApiError::new(ErrorCode::Conflict, message),
            LedgerError::TaskFailed(e) => {
                error!("Report task failed: {}", e);
                ApiError::new(ErrorCode::Internal, "Internal error")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use sedekat_core::money::Money;
    use sedekat_core::{LedgerAmount, RewardType};

    #[test]
    fn test_insufficient_balance_is_422() {
        let err: ApiError = LedgerError::Core(CoreError::InsufficientBalance {
            reward_type: RewardType::Commission,
            available: LedgerAmount::Commission(Money::from_rupiah(1_500)),
            cost: LedgerAmount::Commission(Money::from_rupiah(2_000)),
        })
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientBalance);
        assert_eq!(err.code.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_database_details_are_hidden() {
        let err: ApiError =
            LedgerError::DataAccess(DbError::QueryFailed("no such column: secret".into())).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("secret"));
    }

    #[test]
    fn test_refused_row_is_400() {
        let err: ApiError = DbError::Invalid(sedekat_core::ValidationError::MustBePositive {
            field: "cost".into(),
        })
        .into();
        assert_eq!(err.code.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_pool_exhausted_is_503() {
        let err: ApiError = LedgerError::DataAccess(DbError::PoolExhausted).into();
        assert_eq!(err.code.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_not_found_and_conflict() {
        let err: ApiError = LedgerError::not_found("Reseller", "r9").into();
        assert_eq!(err.code.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Reseller not found: r9");

        let err: ApiError = LedgerError::Conflict("order o1 is no longer pending".into()).into();
        assert_eq!(err.code.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_code_serializes_screaming_snake_case() {
        let body = serde_json::to_value(ApiError::validation("bad")).unwrap();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["message"], "bad");
    }
}
