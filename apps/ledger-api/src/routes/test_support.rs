//! In-memory application for route tests.

use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;

use sedekat_core::money::Money;
use sedekat_core::{Product, Reseller, RewardCatalogEntry, RewardType};
use sedekat_db::{Database, DbConfig};
use sedekat_ledger::{BalanceCache, LedgerService};

use crate::{router, AppState};

pub struct TestApp {
    pub router: Router,
    pub db: Database,
}

impl TestApp {
    /// Product `a` pays Rp1.000 commission and 2 points per unit, `b` pays
    /// Rp500. Reseller `r1` owns token `tok-r1`. Rewards `v1500` and `v2000`
    /// cost that much commission.
    pub async fn new() -> Self {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();

        for (id, commission, points) in [("a", Some(1_000), Some(2)), ("b", Some(500), None)] {
            db.products()
                .insert(&Product {
                    id: id.to_string(),
                    name: format!("Produk {}", id),
                    price_sen: Money::from_rupiah(10_000).sen(),
                    commission_value_sen: commission.map(|c: i64| Money::from_rupiah(c).sen()),
                    points_value: points,
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                })
                .await
                .unwrap();
        }

        db.resellers()
            .insert(&Reseller {
                id: "r1".to_string(),
                name: "Sari".to_string(),
                phone: "081234567890".to_string(),
                address: None,
                branch_id: None,
                commission_rate_bps: 1_000,
                is_active: true,
                catalog_token: "tok-r1".to_string(),
                created_at: now,
            })
            .await
            .unwrap();

        for rupiah in [1_500, 2_000] {
            db.rewards()
                .insert(&RewardCatalogEntry {
                    id: format!("v{}", rupiah),
                    name: format!("Voucher Rp{}", rupiah),
                    description: None,
                    reward_type: RewardType::Commission,
                    cost: Money::from_rupiah(rupiah).sen(),
                    is_active: true,
                })
                .await
                .unwrap();
        }

        let ledger = LedgerService::new(db.clone(), BalanceCache::new(Duration::from_secs(60)));
        TestApp {
            router: router(AppState::new(ledger)),
            db,
        }
    }

    /// Places and completes orders so `r1` earns Rp2.500.
    pub async fn earn_2500(&self) {
        for lines in [
            serde_json::json!([{ "product_id": "a", "quantity": 2 }]),
            serde_json::json!([{ "product_id": "b", "quantity": 1 }]),
        ] {
            let (status, order) = post(
                self,
                "/orders",
                serde_json::json!({
                    "customer_name": "Budi",
                    "customer_phone": "081300001111",
                    "catalog_token": "tok-r1",
                    "lines": lines,
                }),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED, "{order}");

            let id = order["order"]["id"].as_str().unwrap().to_string();
            let (status, body) = post(
                self,
                &format!("/orders/{}/status", id),
                serde_json::json!({ "status": "completed" }),
            )
            .await;
            assert_eq!(status, StatusCode::OK, "{body}");
        }
    }
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub async fn get(app: &TestApp, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn post(app: &TestApp, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_empty(app: &TestApp, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}
