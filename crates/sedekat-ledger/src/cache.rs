//! # Balance Cache
//!
//! Short-lived read-through cache for dashboard balances.
//!
//! Entries are keyed by reseller and date range and expire after a fixed TTL.
//! Writes that can move a balance (approval, order completion) drop the
//! reseller's entries explicitly, so the TTL only bounds how stale a balance
//! can get when the store is edited behind the service's back.
//!
//! ## Fill vs Invalidate
//! ```text
//! reader                          writer
//!   generation(r1) = g
//!   compute balance ...           approve ── invalidate(r1): g → g+1
//!   insert(r1, balance, g) ──► generation moved, value dropped
//! ```
//!
//! The redemption gate and the approval transaction never read from here.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use sedekat_core::{DateRange, DerivedBalance};

type CacheKey = (String, DateRange);

#[derive(Debug, Clone, Copy)]
struct CachedBalance {
    stored_at: Instant,
    balance: DerivedBalance,
}

/// Snapshot of a reseller's invalidation count, taken before a balance is
/// computed and checked again when it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<CacheKey, CachedBalance>,
    /// Invalidation count per reseller.
    generations: HashMap<String, u64>,
}

impl CacheState {
    fn generation(&self, reseller_id: &str) -> Generation {
        Generation(self.generations.get(reseller_id).copied().unwrap_or(0))
    }
}

/// Shared TTL cache of derived balances. Clones share entries.
#[derive(Debug, Clone)]
pub struct BalanceCache {
    ttl: Duration,
    state: Arc<RwLock<CacheState>>,
}

impl BalanceCache {
    /// A cache holding entries for `ttl`. A zero TTL disables caching.
    pub fn new(ttl: Duration) -> Self {
        BalanceCache {
            ttl,
            state: Arc::new(RwLock::new(CacheState::default())),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns a fresh entry, if any.
    pub async fn get(&self, reseller_id: &str, range: &DateRange) -> Option<DerivedBalance> {
        if !self.is_enabled() {
            return None;
        }

        let state = self.state.read().await;
        let cached = state.entries.get(&(reseller_id.to_string(), *range))?;
        if cached.stored_at.elapsed() < self.ttl {
            debug!(reseller_id = %reseller_id, "Balance cache hit");
            Some(cached.balance)
        } else {
            None
        }
    }

    /// Current generation of a reseller. Capture it before computing a
    /// balance that will be passed to [`insert`](Self::insert).
    pub async fn generation(&self, reseller_id: &str) -> Generation {
        self.state.read().await.generation(reseller_id)
    }

    /// Stores a balance computed under `generation`.
    ///
    /// Returns `false` and stores nothing if the reseller was invalidated
    /// since `generation` was taken.
    pub async fn insert(
        &self,
        reseller_id: &str,
        range: &DateRange,
        balance: DerivedBalance,
        generation: Generation,
    ) -> bool {
        if !self.is_enabled() {
            return false;
        }

        let now = Instant::now();
        let mut state = self.state.write().await;
        if state.generation(reseller_id) != generation {
            debug!(reseller_id = %reseller_id, "Balance invalidated while computing, not cached");
            return false;
        }

        // Expired entries are only pruned on write.
        state
            .entries
            .retain(|_, cached| now.duration_since(cached.stored_at) < self.ttl);
        state.entries.insert(
            (reseller_id.to_string(), *range),
            CachedBalance {
                stored_at: now,
                balance,
            },
        );
        true
    }

    /// Drops every cached range of one reseller.
    pub async fn invalidate(&self, reseller_id: &str) {
        let mut state = self.state.write().await;
        *state.generations.entry(reseller_id.to_string()).or_insert(0) += 1;

        let before = state.entries.len();
        state.entries.retain(|(id, _), _| id != reseller_id);
        debug!(
            reseller_id = %reseller_id,
            dropped = before - state.entries.len(),
            "Balance cache invalidated"
        );
    }

    /// Number of stored entries, fresh or not.
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sedekat_core::money::Money;

    fn balance(rupiah: i64) -> DerivedBalance {
        DerivedBalance {
            earned_commission: Money::from_rupiah(rupiah),
            available_commission: Money::from_rupiah(rupiah),
            ..DerivedBalance::default()
        }
    }

    async fn put(cache: &BalanceCache, reseller_id: &str, range: &DateRange, balance: DerivedBalance) {
        let generation = cache.generation(reseller_id).await;
        cache.insert(reseller_id, range, balance, generation).await;
    }

    fn january() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = BalanceCache::new(Duration::from_secs(15));
        put(&cache, "r1", &DateRange::all_time(), balance(2_500)).await;

        tokio::time::advance(Duration::from_secs(14)).await;
        assert_eq!(
            cache.get("r1", &DateRange::all_time()).await,
            Some(balance(2_500))
        );

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("r1", &DateRange::all_time()).await, None);
    }

    #[tokio::test]
    async fn test_ranges_are_cached_separately() {
        let cache = BalanceCache::new(Duration::from_secs(60));
        put(&cache, "r1", &DateRange::all_time(), balance(2_500)).await;
        put(&cache, "r1", &january(), balance(1_000)).await;

        assert_eq!(cache.get("r1", &january()).await, Some(balance(1_000)));
        assert_eq!(
            cache.get("r1", &DateRange::all_time()).await,
            Some(balance(2_500))
        );
        assert_eq!(cache.get("r2", &january()).await, None);
    }

    #[tokio::test]
    async fn test_invalidate_drops_only_that_reseller() {
        let cache = BalanceCache::new(Duration::from_secs(60));
        put(&cache, "r1", &DateRange::all_time(), balance(1)).await;
        put(&cache, "r1", &january(), balance(2)).await;
        put(&cache, "r2", &january(), balance(3)).await;

        cache.invalidate("r1").await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("r2", &january()).await, Some(balance(3)));
    }

    #[tokio::test]
    async fn test_zero_ttl_disables_cache() {
        let cache = BalanceCache::disabled();
        put(&cache, "r1", &DateRange::all_time(), balance(1)).await;

        assert!(!cache.is_enabled());
        assert!(cache.is_empty().await);
        assert_eq!(cache.get("r1", &DateRange::all_time()).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_prunes_expired_entries() {
        let cache = BalanceCache::new(Duration::from_secs(5));
        put(&cache, "r1", &DateRange::all_time(), balance(1)).await;
        tokio::time::advance(Duration::from_secs(10)).await;
        put(&cache, "r2", &DateRange::all_time(), balance(2)).await;

        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_insert_after_invalidate_is_dropped() {
        let cache = BalanceCache::new(Duration::from_secs(60));
        let generation = cache.generation("r1").await;

        // An approval lands while the balance is being computed.
        cache.invalidate("r1").await;

        assert!(!cache.insert("r1", &DateRange::all_time(), balance(2_500), generation).await);
        assert_eq!(cache.get("r1", &DateRange::all_time()).await, None);

        let generation = cache.generation("r1").await;
        assert!(cache.insert("r1", &DateRange::all_time(), balance(1_500), generation).await);
        assert_eq!(
            cache.get("r1", &DateRange::all_time()).await,
            Some(balance(1_500))
        );
    }

    #[tokio::test]
    async fn test_invalidating_one_reseller_keeps_others_generation() {
        let cache = BalanceCache::new(Duration::from_secs(60));
        let r2 = cache.generation("r2").await;

        cache.invalidate("r1").await;

        assert!(cache.insert("r2", &january(), balance(3), r2).await);
    }
}
