//! # Reward Catalog Repository

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use sedekat_core::validation::validate_reward_cost;
use sedekat_core::{RewardCatalogEntry, RewardType};

#[derive(Debug, sqlx::FromRow)]
struct RewardRecord {
    id: String,
    name: String,
    description: Option<String>,
    reward_type: RewardType,
    cost: i64,
    is_active: bool,
}

impl From<RewardRecord> for RewardCatalogEntry {
    fn from(r: RewardRecord) -> Self {
        RewardCatalogEntry {
            id: r.id,
            name: r.name,
            description: r.description,
            reward_type: r.reward_type,
            cost: r.cost,
            is_active: r.is_active,
        }
    }
}

const SELECT_REWARD: &str = r#"
    SELECT id, name, description, reward_type, cost, is_active
    FROM reward_catalog
"#;

/// Repository for the reward catalog.
#[derive(Debug, Clone)]
pub struct RewardCatalogRepository {
    pool: SqlitePool,
}

impl RewardCatalogRepository {
    /// Creates a new RewardCatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RewardCatalogRepository { pool }
    }

    /// Gets a reward by ID, active or not.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<RewardCatalogEntry>> {
        let record: Option<RewardRecord> =
            sqlx::query_as(&format!("{} WHERE id = ?1", SELECT_REWARD))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(record.map(RewardCatalogEntry::from))
    }

    /// Rewards resellers can currently redeem, cheapest first within each type.
    pub async fn list_active(&self) -> DbResult<Vec<RewardCatalogEntry>> {
        let records: Vec<RewardRecord> = sqlx::query_as(&format!(
            "{} WHERE is_active = 1 ORDER BY reward_type, cost, name",
            SELECT_REWARD
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(RewardCatalogEntry::from).collect())
    }

    /// Inserts a reward. A cost that is not positive is refused.
    pub async fn insert(&self, reward: &RewardCatalogEntry) -> DbResult<()> {
        validate_reward_cost(reward.cost)?;
        debug!(id = %reward.id, name = %reward.name, cost = %reward.cost_amount(), "Inserting reward");

        sqlx::query(
            r#"
            INSERT INTO reward_catalog (
                id, name, description, reward_type, cost, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&reward.id)
        .bind(&reward.name)
        .bind(&reward.description)
        .bind(reward.reward_type)
        .bind(reward.cost)
        .bind(reward.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn reward(id: &str, reward_type: RewardType, cost: i64, is_active: bool) -> RewardCatalogEntry {
        RewardCatalogEntry {
            id: id.to_string(),
            name: format!("Hadiah {}", id),
            description: Some("Tukar poin".to_string()),
            reward_type,
            cost,
            is_active,
        }
    }

    #[tokio::test]
    async fn test_insert_get_and_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let rewards = db.rewards();
        rewards.insert(&reward("a", RewardType::Points, 50, true)).await.unwrap();
        rewards.insert(&reward("b", RewardType::Commission, 200_000, true)).await.unwrap();
        rewards.insert(&reward("c", RewardType::Points, 10, false)).await.unwrap();

        let a = rewards.get_by_id("a").await.unwrap().unwrap();
        assert_eq!(a.reward_type, RewardType::Points);
        assert_eq!(a.cost, 50);

        let active = rewards.list_active().await.unwrap();
        let ids: Vec<&str> = active.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_non_positive_cost_refused() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for cost in [0, -500] {
            assert!(matches!(
                db.rewards()
                    .insert(&reward("free", RewardType::Points, cost, true))
                    .await,
                Err(crate::DbError::Invalid(_))
            ));
        }
        assert!(db.rewards().get_by_id("free").await.unwrap().is_none());
    }
}
