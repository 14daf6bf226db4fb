//! Redemption requests, the approval queue and admin decisions.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use sedekat_core::validation::validate_id;
use sedekat_core::RewardRedemption;

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RedemptionRequest {
    pub reseller_id: String,
    pub reward_id: String,
}

/// `POST /redemptions`: 201 with the pending redemption, or
/// 422 `INSUFFICIENT_BALANCE` with nothing written.
pub async fn request_redemption(
    State(state): State<AppState>,
    body: Result<Json<RedemptionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RewardRedemption>)> {
    let Json(request) = body?;
    validate_id("reseller_id", &request.reseller_id)?;
    validate_id("reward_id", &request.reward_id)?;

    let redemption = state
        .ledger
        .request_redemption(&request.reseller_id, &request.reward_id)
        .await?;
    Ok((StatusCode::CREATED, Json(redemption)))
}

/// `GET /redemptions/pending`
pub async fn list_pending(State(state): State<AppState>) -> ApiResult<Json<Vec<RewardRedemption>>> {
    Ok(Json(state.ledger.list_pending().await?))
}

/// `GET /resellers/{id}/redemptions`
pub async fn list_for_reseller(
    State(state): State<AppState>,
    Path(reseller_id): Path<String>,
) -> ApiResult<Json<Vec<RewardRedemption>>> {
    Ok(Json(state.ledger.list_redemptions(&reseller_id).await?))
}

/// `POST /redemptions/{id}/approve`
pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<RewardRedemption>> {
    Ok(Json(state.ledger.approve_redemption(&id).await?))
}

/// `POST /redemptions/{id}/reject`
pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<RewardRedemption>> {
    Ok(Json(state.ledger.reject_redemption(&id).await?))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{get, post, post_empty, TestApp};
    use axum::http::StatusCode;
    use serde_json::json;

    async fn request(app: &TestApp, reward_id: &str) -> (StatusCode, serde_json::Value) {
        post(app, "/redemptions", json!({ "reseller_id": "r1", "reward_id": reward_id })).await
    }

    #[tokio::test]
    async fn test_request_within_balance_is_created_pending() {
        let app = TestApp::new().await;
        app.earn_2500().await;

        let (status, body) = request(&app, "v1500").await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["status"], "pending");
        assert_eq!(body["amount_redeemed"], 150_000);

        let (_, pending) = get(&app, "/redemptions/pending").await;
        assert_eq!(pending.as_array().unwrap().len(), 1);

        // Pending reserves nothing.
        let (_, balance) = get(&app, "/resellers/r1/balance").await;
        assert_eq!(balance["balance"]["available_commission"], 250_000);
    }

    #[tokio::test]
    async fn test_request_over_balance_is_422_and_writes_nothing() {
        let app = TestApp::new().await;
        app.earn_2500().await;
        let (_, first) = request(&app, "v1500").await;
        let id = first["id"].as_str().unwrap();
        let (status, _) = post_empty(&app, &format!("/redemptions/{}/approve", id)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = request(&app, "v2000").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "INSUFFICIENT_BALANCE");

        let (_, history) = get(&app, "/resellers/r1/redemptions").await;
        assert_eq!(history.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_approval_revalidates_balance() {
        let app = TestApp::new().await;
        app.earn_2500().await;
        let (_, first) = request(&app, "v1500").await;
        let (_, second) = request(&app, "v1500").await;

        let (status, body) =
            post_empty(&app, &format!("/redemptions/{}/approve", first["id"].as_str().unwrap())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "approved");

        let (status, body) =
            post_empty(&app, &format!("/redemptions/{}/approve", second["id"].as_str().unwrap())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "INSUFFICIENT_BALANCE");

        let (_, balance) = get(&app, "/resellers/r1/balance").await;
        assert_eq!(balance["balance"]["available_commission"], 100_000);
    }

    #[tokio::test]
    async fn test_reject_then_approve_is_conflict() {
        let app = TestApp::new().await;
        app.earn_2500().await;
        let (_, redemption) = request(&app, "v1500").await;
        let id = redemption["id"].as_str().unwrap();

        let (status, body) = post_empty(&app, &format!("/redemptions/{}/reject", id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "rejected");

        let (status, body) = post_empty(&app, &format!("/redemptions/{}/approve", id)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "INVALID_TRANSITION");
    }

    #[tokio::test]
    async fn test_unknown_redemption_and_reward_are_404() {
        let app = TestApp::new().await;
        let (status, _) = post_empty(&app, "/redemptions/nope/approve").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = request(&app, "nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let app = TestApp::new().await;
        let (status, body) = post(&app, "/redemptions", json!({ "reseller_id": "r1" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}
