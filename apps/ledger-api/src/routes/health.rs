//! Health check.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub migrations_applied: usize,
    pub migrations_total: usize,
}

/// `GET /health`: 200 when the database answers, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> ApiResult<(StatusCode, Json<HealthResponse>)> {
    let db = state.ledger.database();
    let healthy = db.health_check().await;
    let (total, applied) = if healthy {
        db.migration_status().await?
    } else {
        (0, 0)
    };

    let (status, label) = if healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };

    Ok((
        status,
        Json(HealthResponse {
            status: label,
            database: healthy,
            migrations_applied: applied,
            migrations_total: total,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{get, TestApp};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health_ok() {
        let app = TestApp::new().await;
        let (status, body) = get(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], true);
        assert_eq!(body["migrations_applied"], body["migrations_total"]);
    }

    #[tokio::test]
    async fn test_health_unavailable_after_close() {
        let app = TestApp::new().await;
        app.db.close().await;
        let (status, body) = get(&app, "/health").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["database"], false);
    }
}
