//! # Ledger Service
//!
//! Every balance the dashboards show is derived here on demand from completed
//! orders and approved redemptions. Nothing is stored.
//!
//! ## Balance Read
//! ```text
//! balance(reseller, range)
//!      │
//!      ├── cache hit? ──────────────────────────────► DerivedBalance
//!      │
//!      ▼
//! ┌──────────────────────────┐   ┌───────────────────────────┐
//! │ completed_orders(range)  │   │ approved_totals(range)    │  (concurrent)
//! └────────────┬─────────────┘   └─────────────┬─────────────┘
//!              ▼                               │
//!      compute_earnings                        │
//!              └──────────────┬────────────────┘
//!                             ▼
//!                         reconcile ──► cache ──► DerivedBalance
//! ```
//!
//! ## Redemption Lifecycle
//! ```text
//! request_redemption ── all-time balance, uncached ── cost > available? ── refuse
//!         │
//!         ▼
//!     pending ── approve (re-checked under write lock) ──► approved
//!         │
//!         └───── reject ──────────────────────────────────► rejected
//! ```
//!
//! A pending redemption reserves nothing. Two requests may each pass the
//! gate against the same balance; the approval check stops the second one
//! from overdrawing.

use chrono::Utc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use sedekat_core::balance::{authorize, reconcile};
use sedekat_core::checkout::{check_order_transition, OrderBuilder, OrderDraft};
use sedekat_core::earnings::compute_earnings;
use sedekat_core::{
    CoreError, DateRange, DerivedBalance, Order, OrderStatus, OrderWithItems, RedemptionStatus,
    Reseller, RewardCatalogEntry, RewardRedemption,
};
use sedekat_db::{Database, DecisionOutcome};

use crate::cache::BalanceCache;
use crate::error::{LedgerError, LedgerResult};
use crate::report::{BalancesReport, ResellerBalance};

/// Balance computation, redemption authorization and order workflow.
///
/// Cheap to clone; clones share the pool and the cache.
#[derive(Debug, Clone)]
pub struct LedgerService {
    db: Database,
    cache: BalanceCache,
}

impl LedgerService {
    pub fn new(db: Database, cache: BalanceCache) -> Self {
        LedgerService { db, cache }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn cache(&self) -> &BalanceCache {
        &self.cache
    }

    // =========================================================================
    // Balances
    // =========================================================================

    /// Derived balance of one reseller over `range`.
    ///
    /// Fails with `NotFound` for an unknown reseller. A deactivated reseller
    /// has no attributed orders and so earns nothing.
    pub async fn balance(&self, reseller_id: &str, range: &DateRange) -> LedgerResult<DerivedBalance> {
        self.require_reseller(reseller_id).await?;
        self.cached_balance(reseller_id, range).await
    }

    async fn cached_balance(&self, reseller_id: &str, range: &DateRange) -> LedgerResult<DerivedBalance> {
        if let Some(balance) = self.cache.get(reseller_id, range).await {
            return Ok(balance);
        }

        let generation = self.cache.generation(reseller_id).await;
        let balance = self.compute_balance(reseller_id, range).await?;
        self.cache.insert(reseller_id, range, balance, generation).await;
        Ok(balance)
    }

    async fn compute_balance(&self, reseller_id: &str, range: &DateRange) -> LedgerResult<DerivedBalance> {
        let orders = self.db.orders();
        let redemptions = self.db.redemptions();

        let (ledger, redeemed) = tokio::try_join!(
            orders.completed_orders(reseller_id, range),
            redemptions.approved_totals(reseller_id, range),
        )?;

        let earnings = compute_earnings(&ledger.orders, &ledger.rates);
        let balance = reconcile(&earnings, &redeemed);

        debug!(
            reseller_id = %reseller_id,
            orders = ledger.orders.len(),
            earned_commission = %balance.earned_commission,
            available_commission = %balance.available_commission,
            earned_points = %balance.earned_points,
            available_points = %balance.available_points,
            "Balance computed"
        );
        if balance.is_overdrawn() {
            warn!(reseller_id = %reseller_id, "Approved redemptions exceed earnings, balance clamped at zero");
        }

        Ok(balance)
    }

    /// One balance per reseller, active and inactive, plus totals.
    ///
    /// Each reseller is computed on its own task; the pool bounds how many
    /// actually hit the database at once.
    pub async fn balances_report(&self, range: &DateRange) -> LedgerResult<BalancesReport> {
        let resellers = self.db.resellers().list_all().await?;
        let range = *range;

        let mut tasks = JoinSet::new();
        for (index, reseller) in resellers.into_iter().enumerate() {
            let service = self.clone();
            tasks.spawn(async move {
                let balance = service.cached_balance(&reseller.id, &range).await;
                (index, reseller, balance)
            });
        }

        let mut rows = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            let (index, reseller, balance) = joined?;
            rows.push((index, ResellerBalance::new(reseller, balance?)));
        }
        rows.sort_by_key(|(index, _)| *index);

        let report = BalancesReport::new(range, rows.into_iter().map(|(_, row)| row).collect());
        debug!(resellers = report.rows.len(), "Balances report built");
        Ok(report)
    }

    // =========================================================================
    // Redemptions
    // =========================================================================

    /// Requests a reward for a reseller.
    ///
    /// Checks the reward's cost against the reseller's all-time available
    /// balance, read fresh from the store. A refused request writes nothing.
    pub async fn request_redemption(
        &self,
        reseller_id: &str,
        reward_id: &str,
    ) -> LedgerResult<RewardRedemption> {
        self.require_reseller(reseller_id).await?;

        let reward = self
            .db
            .rewards()
            .get_by_id(reward_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Reward", reward_id))?;
        if !reward.is_active {
            return Err(LedgerError::RewardInactive(reward.id));
        }

        let balance = self.compute_balance(reseller_id, &DateRange::all_time()).await?;
        if let Err(err) = authorize(&balance, &reward) {
            warn!(
                reseller_id = %reseller_id,
                reward_id = %reward.id,
                cost = %reward.cost_amount(),
                available = %balance.available(reward.reward_type),
                "Redemption refused"
            );
            return Err(err.into());
        }

        let redemption = self
            .db
            .redemptions()
            .insert_pending(reseller_id, &reward, Utc::now())
            .await?;

        info!(
            redemption_id = %redemption.id,
            reseller_id = %reseller_id,
            reward = %reward.name,
            "Redemption requested"
        );
        Ok(redemption)
    }

    /// Approves a pending redemption.
    ///
    /// Refused with `InsufficientBalance` if approvals made since the request
    /// already used up the balance.
    pub async fn approve_redemption(&self, redemption_id: &str) -> LedgerResult<RewardRedemption> {
        let outcome = self.db.redemptions().approve(redemption_id, Utc::now()).await?;
        let redemption = decided(outcome, RedemptionStatus::Approved)?;
        self.cache.invalidate(&redemption.reseller_id).await;
        Ok(redemption)
    }

    /// Rejects a pending redemption. Balances are unaffected.
    pub async fn reject_redemption(&self, redemption_id: &str) -> LedgerResult<RewardRedemption> {
        let outcome = self.db.redemptions().reject(redemption_id, Utc::now()).await?;
        decided(outcome, RedemptionStatus::Rejected)
    }

    /// A reseller's redemptions, newest first.
    pub async fn list_redemptions(&self, reseller_id: &str) -> LedgerResult<Vec<RewardRedemption>> {
        self.require_reseller(reseller_id).await?;
        Ok(self.db.redemptions().list_for_reseller(reseller_id).await?)
    }

    /// The admin approval queue, oldest first.
    pub async fn list_pending(&self) -> LedgerResult<Vec<RewardRedemption>> {
        Ok(self.db.redemptions().list_pending().await?)
    }

    /// Rewards currently offered.
    pub async fn list_rewards(&self) -> LedgerResult<Vec<RewardCatalogEntry>> {
        Ok(self.db.rewards().list_active().await?)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Places an order, freezing current commission and points values into
    /// its items. Order and items are written together or not at all.
    ///
    /// A token that matches no active reseller is kept on the order, which is
    /// then unattributed.
    pub async fn create_order(&self, draft: OrderDraft) -> LedgerResult<OrderWithItems> {
        let products = self.db.products().get_many(&draft.product_ids()).await?;
        let aggregate = OrderBuilder::new(draft).build(&products, Utc::now())?;

        self.db.orders().create_order(&aggregate).await?;

        let attributed = match aggregate.order.catalog_token.as_deref() {
            Some(token) => self.db.resellers().find_active_by_token(token).await?,
            None => None,
        };
        info!(
            order_id = %aggregate.order.id,
            items = aggregate.items.len(),
            total = %aggregate.order.total_amount(),
            reseller_id = attributed.as_ref().map(|r| r.id.as_str()).unwrap_or("-"),
            "Order created"
        );

        Ok(aggregate)
    }

    /// Moves an order along its status workflow.
    ///
    /// Fails with `Conflict` if another admin changed the order in between.
    pub async fn advance_order_status(&self, order_id: &str, to: OrderStatus) -> LedgerResult<Order> {
        let orders = self.db.orders();
        let order = orders
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Order", order_id))?;

        check_order_transition(&order.id, order.status, to)?;

        if !orders.update_status_if(&order.id, order.status, to).await? {
            return Err(LedgerError::Conflict(format!(
                "order {} is no longer {}",
                order.id, order.status
            )));
        }

        if to == OrderStatus::Completed {
            if let Some(token) = order.catalog_token.as_deref() {
                if let Some(reseller) = self.db.resellers().find_active_by_token(token).await? {
                    self.cache.invalidate(&reseller.id).await;
                }
            }
        }

        info!(order_id = %order.id, from = %order.status, %to, "Order status changed");

        orders
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Order", order_id))
    }

    // =========================================================================
    // Resellers
    // =========================================================================

    /// The active reseller behind a catalog token.
    pub async fn reseller_by_token(&self, token: &str) -> LedgerResult<Reseller> {
        self.db
            .resellers()
            .find_active_by_token(token)
            .await?
            .ok_or_else(|| LedgerError::not_found("Reseller", token))
    }

    async fn require_reseller(&self, reseller_id: &str) -> LedgerResult<Reseller> {
        self.db
            .resellers()
            .get_by_id(reseller_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Reseller", reseller_id))
    }
}

/// Maps a decision outcome onto the redemption or the refusal.
fn decided(outcome: DecisionOutcome, to: RedemptionStatus) -> LedgerResult<RewardRedemption> {
    match outcome {
        DecisionOutcome::Decided(redemption) => Ok(redemption),
        DecisionOutcome::AlreadyDecided { current, refusal } => {
            warn!(redemption_id = %current.id, status = %current.status, %to, "Redemption already decided");
            Err(refusal.into())
        }
        DecisionOutcome::InsufficientBalance { available, cost } => {
            Err(CoreError::InsufficientBalance {
                reward_type: cost.reward_type(),
                available,
                cost,
            }
            .into())
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
