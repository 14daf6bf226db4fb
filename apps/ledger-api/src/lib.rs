//! # SEDEKAT Ledger API
//!
//! HTTP/JSON surface over [`LedgerService`] for the admin and reseller
//! dashboards.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Ledger API Server                                │
//! │                                                                         │
//! │  Dashboards ───► HTTP (8080) ───► routes/* ───► LedgerService          │
//! │                      │                              │                   │
//! │                 TraceLayer                          ▼                   │
//! │               (request spans)                 SQLite (sqlx)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Authentication is handled in front of this service and not here.

pub mod config;
pub mod error;
pub mod routes;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use sedekat_ledger::LedgerService;

pub use config::ApiConfig;
pub use error::{ApiError, ErrorCode};

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub ledger: LedgerService,
}

impl AppState {
    pub fn new(ledger: LedgerService) -> Self {
        AppState { ledger }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/resellers/{id}/balance", get(routes::balances::reseller_balance))
        .route(
            "/resellers/{id}/redemptions",
            get(routes::redemptions::list_for_reseller),
        )
        .route("/reports/balances", get(routes::balances::balances_report))
        .route("/rewards", get(routes::rewards::list_rewards))
        .route("/redemptions", post(routes::redemptions::request_redemption))
        .route("/redemptions/pending", get(routes::redemptions::list_pending))
        .route("/redemptions/{id}/approve", post(routes::redemptions::approve))
        .route("/redemptions/{id}/reject", post(routes::redemptions::reject))
        .route("/orders", post(routes::orders::create_order))
        .route("/orders/{id}/status", post(routes::orders::change_status))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
