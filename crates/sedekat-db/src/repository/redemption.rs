//! # Redemption Repository
//!
//! The redemption ledger: approved totals, pending inserts and admin decisions.
//!
//! ## Approval Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    UPDATE reward_redemptions SET status = status WHERE id = ?           │
//! │        └── takes the database write lock before anything is read       │
//! │    SELECT the redemption              → transition(status, approved)   │
//! │    load_balance(reseller, all time)   → orders + approved redemptions  │
//! │    cost > available?                  → ROLLBACK, InsufficientBalance   │
//! │    UPDATE ... SET status = 'approved' WHERE id = ? AND status = 'pending'│
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rejection takes the same lock and asks the same state machine, without the
//! balance check.
//!
//! Two admins approving different pending redemptions of the same reseller
//! are serialized by the write lock; the second sees the first's approval in
//! its balance.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::ledger::load_balance;
use crate::repository::range_bounds;
use sedekat_core::balance::{authorize_amount, RedeemedTotals};
use sedekat_core::redemption::transition;
use sedekat_core::{
    CoreError, DateRange, LedgerAmount, RedemptionStatus, RewardCatalogEntry, RewardRedemption,
    RewardType,
};

// =============================================================================
// Records
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct RedemptionRecord {
    id: String,
    reseller_id: String,
    reward_id: Option<String>,
    reward_type: RewardType,
    amount_redeemed: i64,
    reward_description: String,
    status: RedemptionStatus,
    created_at: DateTime<Utc>,
    decided_at: Option<DateTime<Utc>>,
}

impl From<RedemptionRecord> for RewardRedemption {
    fn from(r: RedemptionRecord) -> Self {
        RewardRedemption {
            id: r.id,
            reseller_id: r.reseller_id,
            reward_id: r.reward_id,
            reward_type: r.reward_type,
            amount_redeemed: r.amount_redeemed,
            reward_description: r.reward_description,
            status: r.status,
            created_at: r.created_at,
            decided_at: r.decided_at,
        }
    }
}

const SELECT_REDEMPTION: &str = r#"
    SELECT id, reseller_id, reward_id, reward_type, amount_redeemed,
           reward_description, status, created_at, decided_at
    FROM reward_redemptions
"#;

/// Result of an admin decision on a redemption.
#[derive(Debug)]
pub enum DecisionOutcome {
    /// The decision was recorded.
    Decided(RewardRedemption),
    /// The lifecycle does not allow the move from the current status.
    AlreadyDecided {
        current: RewardRedemption,
        refusal: CoreError,
    },
    /// Approving would take the reseller's balance below zero. Nothing changed.
    InsufficientBalance {
        available: LedgerAmount,
        cost: LedgerAmount,
    },
}

// =============================================================================
// Connection-level Queries
// =============================================================================

/// Sums approved redemptions of one reseller within `range`, per reward type.
///
/// Pending and rejected rows never count.
pub async fn fetch_approved_totals(
    conn: &mut SqliteConnection,
    reseller_id: &str,
    range: &DateRange,
) -> DbResult<RedeemedTotals> {
    let (start, end) = range_bounds(range);

    let rows: Vec<(RewardType, i64)> = sqlx::query_as(
        r#"
        SELECT reward_type, COALESCE(SUM(amount_redeemed), 0) AS total
        FROM reward_redemptions
        WHERE reseller_id = ?1
          AND status = 'approved'
          AND (?2 IS NULL OR created_at >= ?2)
          AND (?3 IS NULL OR created_at < ?3)
        GROUP BY reward_type
        "#,
    )
    .bind(reseller_id)
    .bind(start)
    .bind(end)
    .fetch_all(&mut *conn)
    .await?;

    let mut totals = RedeemedTotals::default();
    for (reward_type, total) in rows {
        totals.add(LedgerAmount::from_raw(reward_type, total));
    }

    debug!(
        reseller_id = %reseller_id,
        redeemed_commission = %totals.redeemed_commission,
        redeemed_points = %totals.redeemed_points,
        "Fetched approved redemption totals"
    );

    Ok(totals)
}

async fn fetch_redemption(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<RewardRedemption>> {
    let record: Option<RedemptionRecord> =
        sqlx::query_as(&format!("{} WHERE id = ?1", SELECT_REDEMPTION))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

    Ok(record.map(RewardRedemption::from))
}

/// Takes the database write lock and reads the redemption under it.
async fn lock_redemption(conn: &mut SqliteConnection, id: &str) -> DbResult<RewardRedemption> {
    // No-op write so everything read afterwards sits under the write lock.
    let touched = sqlx::query("UPDATE reward_redemptions SET status = status WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if touched.rows_affected() == 0 {
        return Err(DbError::not_found("Redemption", id));
    }

    fetch_redemption(&mut *conn, id)
        .await?
        .ok_or_else(|| DbError::not_found("Redemption", id))
}

/// Moves a pending redemption to `to`. Returns whether the row was still pending.
async fn set_status_if_pending(
    conn: &mut SqliteConnection,
    id: &str,
    to: RedemptionStatus,
    now: DateTime<Utc>,
) -> DbResult<bool> {
    let result = sqlx::query(
        "UPDATE reward_redemptions SET status = ?2, decided_at = ?3 \
         WHERE id = ?1 AND status = 'pending'",
    )
    .bind(id)
    .bind(to)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for reward redemption database operations.
#[derive(Debug, Clone)]
pub struct RedemptionRepository {
    pool: SqlitePool,
}

impl RedemptionRepository {
    /// Creates a new RedemptionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RedemptionRepository { pool }
    }

    /// Approved redemption totals of a reseller within a range.
    pub async fn approved_totals(
        &self,
        reseller_id: &str,
        range: &DateRange,
    ) -> DbResult<RedeemedTotals> {
        let mut conn = self.pool.acquire().await?;
        fetch_approved_totals(&mut *conn, reseller_id, range).await
    }

    /// Records a new pending redemption of `reward` for a reseller.
    ///
    /// The amount and description are copied from the reward so later
    /// catalog edits don't change the claim.
    pub async fn insert_pending(
        &self,
        reseller_id: &str,
        reward: &RewardCatalogEntry,
        now: DateTime<Utc>,
    ) -> DbResult<RewardRedemption> {
        let redemption = RewardRedemption {
            id: Uuid::new_v4().to_string(),
            reseller_id: reseller_id.to_string(),
            reward_id: Some(reward.id.clone()),
            reward_type: reward.reward_type,
            amount_redeemed: reward.cost,
            reward_description: reward.name.clone(),
            status: RedemptionStatus::Pending,
            created_at: now,
            decided_at: None,
        };

        sqlx::query(
            r#"
            INSERT INTO reward_redemptions (
                id, reseller_id, reward_id, reward_type, amount_redeemed,
                reward_description, status, created_at, decided_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&redemption.id)
        .bind(&redemption.reseller_id)
        .bind(&redemption.reward_id)
        .bind(redemption.reward_type)
        .bind(redemption.amount_redeemed)
        .bind(&redemption.reward_description)
        .bind(redemption.status)
        .bind(redemption.created_at)
        .bind(redemption.decided_at)
        .execute(&self.pool)
        .await?;

        info!(
            redemption_id = %redemption.id,
            reseller_id = %reseller_id,
            amount = %redemption.amount(),
            "Pending redemption recorded"
        );

        Ok(redemption)
    }

    /// Gets a redemption by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<RewardRedemption>> {
        let mut conn = self.pool.acquire().await?;
        fetch_redemption(&mut *conn, id).await
    }

    /// All redemptions of a reseller, newest first.
    pub async fn list_for_reseller(&self, reseller_id: &str) -> DbResult<Vec<RewardRedemption>> {
        let records: Vec<RedemptionRecord> = sqlx::query_as(&format!(
            "{} WHERE reseller_id = ?1 ORDER BY created_at DESC, id",
            SELECT_REDEMPTION
        ))
        .bind(reseller_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(RewardRedemption::from).collect())
    }

    /// The admin approval queue, oldest first.
    pub async fn list_pending(&self) -> DbResult<Vec<RewardRedemption>> {
        let records: Vec<RedemptionRecord> = sqlx::query_as(&format!(
            "{} WHERE status = 'pending' ORDER BY created_at, id",
            SELECT_REDEMPTION
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(RewardRedemption::from).collect())
    }

    /// Approves a pending redemption if the reseller's all-time balance still
    /// covers it.
    pub async fn approve(&self, id: &str, now: DateTime<Utc>) -> DbResult<DecisionOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let redemption = lock_redemption(&mut *tx, id).await?;
        let to = match transition(redemption.status, RedemptionStatus::Approved) {
            Ok(to) => to,
            Err(refusal) => {
                debug!(redemption_id = %id, status = %redemption.status, "Redemption already decided");
                return Ok(DecisionOutcome::AlreadyDecided {
                    current: redemption,
                    refusal,
                });
            }
        };

        let balance = load_balance(&mut *tx, &redemption.reseller_id, &DateRange::all_time()).await?;

        if let Err(CoreError::InsufficientBalance {
            available, cost, ..
        }) = authorize_amount(&balance, redemption.amount())
        {
            warn!(
                redemption_id = %id,
                reseller_id = %redemption.reseller_id,
                %available,
                %cost,
                "Approval refused, balance no longer covers redemption"
            );
            return Ok(DecisionOutcome::InsufficientBalance { available, cost });
        }

        if !set_status_if_pending(&mut *tx, id, to, now).await? {
            return Err(DbError::TransactionFailed(format!(
                "redemption {} changed while write-locked",
                id
            )));
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            redemption_id = %id,
            reseller_id = %redemption.reseller_id,
            amount = %redemption.amount(),
            "Redemption approved"
        );

        Ok(DecisionOutcome::Decided(RewardRedemption {
            status: to,
            decided_at: Some(now),
            ..redemption
        }))
    }

    /// Rejects a pending redemption. Never touches balances.
    pub async fn reject(&self, id: &str, now: DateTime<Utc>) -> DbResult<DecisionOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let redemption = lock_redemption(&mut *tx, id).await?;
        let to = match transition(redemption.status, RedemptionStatus::Rejected) {
            Ok(to) => to,
            Err(refusal) => {
                debug!(redemption_id = %id, status = %redemption.status, "Redemption already decided");
                return Ok(DecisionOutcome::AlreadyDecided {
                    current: redemption,
                    refusal,
                });
            }
        };

        if !set_status_if_pending(&mut *tx, id, to, now).await? {
            return Err(DbError::TransactionFailed(format!(
                "redemption {} changed while write-locked",
                id
            )));
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(redemption_id = %id, reseller_id = %redemption.reseller_id, "Redemption rejected");

        Ok(DecisionOutcome::Decided(RewardRedemption {
            status: to,
            decided_at: Some(now),
            ..redemption
        }))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::{NaiveDate, TimeZone};
    use sedekat_core::money::Money;
    use sedekat_core::{
        DeliveryMethod, Order, OrderItem, OrderStatus, OrderWithItems, Points, Reseller,
    };

    async fn setup() -> Database {
        setup_with(DbConfig::in_memory()).await
    }

    async fn setup_with(config: DbConfig) -> Database {
        let db = Database::new(config).await.unwrap();
        db.resellers()
            .insert(&Reseller {
                id: "r1".to_string(),
                name: "Sari".to_string(),
                phone: "081200000000".to_string(),
                address: None,
                branch_id: None,
                commission_rate_bps: 0,
                is_active: true,
                catalog_token: "tok-1".to_string(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        db
    }

    /// One completed order earning `commission_rupiah` for r1.
    async fn earn(db: &Database, order_id: &str, commission_rupiah: i64) {
        let now = Utc::now();
        db.orders()
            .create_order(&OrderWithItems {
                order: Order {
                    id: order_id.to_string(),
                    customer_name: "Budi".to_string(),
                    customer_phone: "081234567890".to_string(),
                    catalog_token: Some("tok-1".to_string()),
                    total_amount_sen: 0,
                    status: OrderStatus::Completed,
                    delivery_method: DeliveryMethod::Pickup,
                    created_at: now,
                    updated_at: now,
                },
                items: vec![OrderItem {
                    id: format!("{}-item", order_id),
                    order_id: order_id.to_string(),
                    product_id: "A".to_string(),
                    product_name: "A".to_string(),
                    product_price_sen: 0,
                    quantity: 1,
                    subtotal_sen: 0,
                    commission_snapshot_sen: Some(Money::from_rupiah(commission_rupiah).sen()),
                    points_snapshot: None,
                }],
            })
            .await
            .unwrap();
    }

    fn reward(reward_type: RewardType, cost: i64) -> RewardCatalogEntry {
        RewardCatalogEntry {
            id: Uuid::new_v4().to_string(),
            name: "Voucher".to_string(),
            description: None,
            reward_type,
            cost,
            is_active: true,
        }
    }

    async fn insert_with_status(
        db: &Database,
        reward: &RewardCatalogEntry,
        status: RedemptionStatus,
        created_at: DateTime<Utc>,
    ) {
        let r = db
            .redemptions()
            .insert_pending("r1", reward, created_at)
            .await
            .unwrap();
        sqlx::query("UPDATE reward_redemptions SET status = ?2 WHERE id = ?1")
            .bind(&r.id)
            .bind(status)
            .execute(db.pool())
            .await
            .unwrap();
    }

    async fn store_reward(db: &Database, reward: &RewardCatalogEntry) {
        db.rewards().insert(reward).await.unwrap();
    }

    #[tokio::test]
    async fn test_approved_totals_exclude_pending_and_rejected() {
        let db = setup().await;
        let commission = reward(RewardType::Commission, Money::from_rupiah(1_000).sen());
        let big = reward(RewardType::Commission, Money::from_rupiah(3_000).sen());
        let points = reward(RewardType::Points, 40);
        for r in [&commission, &big, &points] {
            store_reward(&db, r).await;
        }

        let now = Utc::now();
        insert_with_status(&db, &commission, RedemptionStatus::Approved, now).await;
        insert_with_status(&db, &big, RedemptionStatus::Pending, now).await;
        insert_with_status(&db, &big, RedemptionStatus::Rejected, now).await;
        insert_with_status(&db, &points, RedemptionStatus::Approved, now).await;

        let totals = db
            .redemptions()
            .approved_totals("r1", &DateRange::all_time())
            .await
            .unwrap();
        assert_eq!(totals.redeemed_commission, Money::from_rupiah(1_000));
        assert_eq!(totals.redeemed_points, Points::new(40));
    }

    #[tokio::test]
    async fn test_approved_totals_respect_range() {
        let db = setup().await;
        let commission = reward(RewardType::Commission, 100);
        store_reward(&db, &commission).await;

        insert_with_status(
            &db,
            &commission,
            RedemptionStatus::Approved,
            Utc.with_ymd_and_hms(2026, 3, 31, 23, 0, 0).unwrap(),
        )
        .await;
        insert_with_status(
            &db,
            &commission,
            RedemptionStatus::Approved,
            Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap(),
        )
        .await;

        let march = DateRange::new(
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        )
        .unwrap();
        let totals = db.redemptions().approved_totals("r1", &march).await.unwrap();
        assert_eq!(totals.redeemed_commission, Money::from_sen(100));
    }

    #[tokio::test]
    async fn test_approve_within_balance() {
        let db = setup().await;
        earn(&db, "o1", 2_500).await;
        let voucher = reward(RewardType::Commission, Money::from_rupiah(1_500).sen());
        store_reward(&db, &voucher).await;

        let pending = db
            .redemptions()
            .insert_pending("r1", &voucher, Utc::now())
            .await
            .unwrap();
        let outcome = db.redemptions().approve(&pending.id, Utc::now()).await.unwrap();

        match outcome {
            DecisionOutcome::Decided(r) => {
                assert_eq!(r.status, RedemptionStatus::Approved);
                assert!(r.decided_at.is_some());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let stored = db.redemptions().get_by_id(&pending.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RedemptionStatus::Approved);
    }

    #[tokio::test]
    async fn test_second_approval_that_overdraws_is_refused() {
        let db = setup().await;
        earn(&db, "o1", 2_500).await;
        let voucher = reward(RewardType::Commission, Money::from_rupiah(1_500).sen());
        store_reward(&db, &voucher).await;

        // Both requested while 2.500 was available.
        let first = db.redemptions().insert_pending("r1", &voucher, Utc::now()).await.unwrap();
        let second = db.redemptions().insert_pending("r1", &voucher, Utc::now()).await.unwrap();

        assert!(matches!(
            db.redemptions().approve(&first.id, Utc::now()).await.unwrap(),
            DecisionOutcome::Decided(_)
        ));

        match db.redemptions().approve(&second.id, Utc::now()).await.unwrap() {
            DecisionOutcome::InsufficientBalance { available, cost } => {
                assert_eq!(available, LedgerAmount::Commission(Money::from_rupiah(1_000)));
                assert_eq!(cost, LedgerAmount::Commission(Money::from_rupiah(1_500)));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let stored = db.redemptions().get_by_id(&second.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RedemptionStatus::Pending);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_approvals_never_overdraw() {
        let dir = tempfile::tempdir().unwrap();
        let db = setup_with(DbConfig::new(dir.path().join("ledger.db")).max_connections(5)).await;
        let voucher = reward(RewardType::Commission, Money::from_rupiah(1_500).sen());
        store_reward(&db, &voucher).await;

        for round in 0..10 {
            // Each round starts at Rp2.500 available with two Rp1.500 claims
            // racing for it; the winner leaves Rp1.000 behind.
            let top_up = if round == 0 { 2_500 } else { 1_500 };
            earn(&db, &format!("o{}", round), top_up).await;
            let first = db.redemptions().insert_pending("r1", &voucher, Utc::now()).await.unwrap();
            let second = db.redemptions().insert_pending("r1", &voucher, Utc::now()).await.unwrap();

            let (a, b) = (db.redemptions(), db.redemptions());
            let first = tokio::spawn(async move { a.approve(&first.id, Utc::now()).await });
            let second = tokio::spawn(async move { b.approve(&second.id, Utc::now()).await });
            let outcomes = [first.await.unwrap().unwrap(), second.await.unwrap().unwrap()];

            let approved = outcomes
                .iter()
                .filter(|o| matches!(o, DecisionOutcome::Decided(_)))
                .count();
            let refused = outcomes
                .iter()
                .filter(|o| matches!(o, DecisionOutcome::InsufficientBalance { .. }))
                .count();
            assert_eq!((approved, refused), (1, 1), "round {round}: {outcomes:?}");

            let mut conn = db.pool().acquire().await.unwrap();
            let balance = load_balance(&mut *conn, "r1", &DateRange::all_time()).await.unwrap();
            assert!(!balance.is_overdrawn(), "round {round}: {balance:?}");
            assert_eq!(balance.available_commission, Money::from_rupiah(1_000));
        }

        db.close().await;
    }

    #[tokio::test]
    async fn test_decided_redemptions_are_terminal() {
        let db = setup().await;
        earn(&db, "o1", 5_000).await;
        let voucher = reward(RewardType::Commission, 100);
        store_reward(&db, &voucher).await;

        let r = db.redemptions().insert_pending("r1", &voucher, Utc::now()).await.unwrap();
        assert!(matches!(
            db.redemptions().reject(&r.id, Utc::now()).await.unwrap(),
            DecisionOutcome::Decided(ref d) if d.status == RedemptionStatus::Rejected
        ));

        assert!(matches!(
            db.redemptions().approve(&r.id, Utc::now()).await.unwrap(),
            DecisionOutcome::AlreadyDecided {
                ref current,
                refusal: CoreError::InvalidRedemptionTransition {
                    from: RedemptionStatus::Rejected,
                    to: RedemptionStatus::Approved,
                },
            } if current.status == RedemptionStatus::Rejected
        ));
        assert!(matches!(
            db.redemptions().reject(&r.id, Utc::now()).await.unwrap(),
            DecisionOutcome::AlreadyDecided {
                refusal: CoreError::InvalidRedemptionTransition { .. },
                ..
            }
        ));

        let stored = db.redemptions().get_by_id(&r.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RedemptionStatus::Rejected);
    }

    #[tokio::test]
    async fn test_decisions_on_missing_redemption() {
        let db = setup().await;
        assert!(matches!(
            db.redemptions().approve("missing", Utc::now()).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(
            db.redemptions().reject("missing", Utc::now()).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_listings() {
        let db = setup().await;
        let voucher = reward(RewardType::Points, 5);
        store_reward(&db, &voucher).await;

        let older = db
            .redemptions()
            .insert_pending("r1", &voucher, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap())
            .await
            .unwrap();
        let newer = db
            .redemptions()
            .insert_pending("r1", &voucher, Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap())
            .await
            .unwrap();
        db.redemptions().reject(&newer.id, Utc::now()).await.unwrap();

        let history = db.redemptions().list_for_reseller("r1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, newer.id);

        let pending = db.redemptions().list_pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, older.id);
    }
}
