//! Balance lookups and the dashboard report.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use sedekat_core::validation::parse_date_range;
use sedekat_core::{DateRange, DerivedBalance};
use sedekat_ledger::BalancesReport;

use crate::error::ApiResult;
use crate::AppState;

/// `?start=YYYY-MM-DD&end=YYYY-MM-DD`, both optional and inclusive.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl PeriodQuery {
    fn range(&self) -> ApiResult<DateRange> {
        Ok(parse_date_range(self.start.as_deref(), self.end.as_deref())?)
    }
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub reseller_id: String,
    pub range: DateRange,
    pub balance: DerivedBalance,
}

/// `GET /resellers/{id}/balance`
pub async fn reseller_balance(
    State(state): State<AppState>,
    Path(reseller_id): Path<String>,
    Query(period): Query<PeriodQuery>,
) -> ApiResult<Json<BalanceResponse>> {
    let range = period.range()?;
    let balance = state.ledger.balance(&reseller_id, &range).await?;
    Ok(Json(BalanceResponse {
        reseller_id,
        range,
        balance,
    }))
}

/// `GET /reports/balances`
pub async fn balances_report(
    State(state): State<AppState>,
    Query(period): Query<PeriodQuery>,
) -> ApiResult<Json<BalancesReport>> {
    let range = period.range()?;
    Ok(Json(state.ledger.balances_report(&range).await?))
}
