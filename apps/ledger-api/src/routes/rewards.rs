//! Reward catalog.

use axum::extract::State;
use axum::Json;

use sedekat_core::RewardCatalogEntry;

use crate::error::ApiResult;
use crate::AppState;

/// `GET /rewards`: active rewards, cheapest first within each type.
pub async fn list_rewards(State(state): State<AppState>) -> ApiResult<Json<Vec<RewardCatalogEntry>>> {
    Ok(Json(state.ledger.list_rewards().await?))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{get, TestApp};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_lists_active_rewards() {
        let app = TestApp::new().await;
        let (status, body) = get(&app, "/rewards").await;
        assert_eq!(status, StatusCode::OK);

        let ids: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["v1500", "v2000"]);
        assert_eq!(body[0]["reward_type"], "commission");
    }
}
