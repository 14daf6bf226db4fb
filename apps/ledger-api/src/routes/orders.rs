//! Checkout and order status workflow.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use sedekat_core::checkout::OrderDraft;
use sedekat_core::{Order, OrderStatus, OrderWithItems};

use crate::error::ApiResult;
use crate::AppState;

/// `POST /orders`: creates the order and its items in one transaction.
pub async fn create_order(
    State(state): State<AppState>,
    body: Result<Json<OrderDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<OrderWithItems>)> {
    let Json(draft) = body?;
    let order = state.ledger.create_order(draft).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Either vocabulary is accepted: `"completed"` or `"Selesai"`.
#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: String,
}

/// `POST /orders/{id}/status`
pub async fn change_status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    body: Result<Json<StatusChange>, JsonRejection>,
) -> ApiResult<Json<Order>> {
    let Json(change) = body?;
    let to: OrderStatus = change.status.parse()?;
    Ok(Json(state.ledger.advance_order_status(&order_id, to).await?))
}
