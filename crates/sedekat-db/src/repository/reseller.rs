//! # Reseller Repository
//!
//! Resellers and the catalog tokens that attribute orders to them.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use sedekat_core::Reseller;

#[derive(Debug, sqlx::FromRow)]
struct ResellerRecord {
    id: String,
    name: String,
    phone: String,
    address: Option<String>,
    branch_id: Option<String>,
    commission_rate: i64,
    is_active: bool,
    catalog_token: String,
    created_at: DateTime<Utc>,
}

impl From<ResellerRecord> for Reseller {
    fn from(r: ResellerRecord) -> Self {
        Reseller {
            id: r.id,
            name: r.name,
            phone: r.phone,
            address: r.address,
            branch_id: r.branch_id,
            commission_rate_bps: r.commission_rate,
            is_active: r.is_active,
            catalog_token: r.catalog_token,
            created_at: r.created_at,
        }
    }
}

const SELECT_RESELLER: &str = r#"
    SELECT id, name, phone, address, branch_id, commission_rate,
           is_active, catalog_token, created_at
    FROM resellers
"#;

/// Repository for reseller database operations.
#[derive(Debug, Clone)]
pub struct ResellerRepository {
    pool: SqlitePool,
}

impl ResellerRepository {
    /// Creates a new ResellerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ResellerRepository { pool }
    }

    /// Gets a reseller by ID, active or not.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Reseller>> {
        let record: Option<ResellerRecord> =
            sqlx::query_as(&format!("{} WHERE id = ?1", SELECT_RESELLER))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(record.map(Reseller::from))
    }

    /// Resolves a catalog token to the active reseller it belongs to.
    ///
    /// Tokens of deactivated resellers resolve to `None`, which makes their
    /// orders unattributed.
    pub async fn find_active_by_token(&self, token: &str) -> DbResult<Option<Reseller>> {
        let record: Option<ResellerRecord> = sqlx::query_as(&format!(
            "{} WHERE catalog_token = ?1 AND is_active = 1",
            SELECT_RESELLER
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Reseller::from))
    }

    /// Lists every reseller, active first, then by name.
    pub async fn list_all(&self) -> DbResult<Vec<Reseller>> {
        let records: Vec<ResellerRecord> = sqlx::query_as(&format!(
            "{} ORDER BY is_active DESC, name",
            SELECT_RESELLER
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Reseller::from).collect())
    }

    /// Inserts a reseller. Catalog tokens are unique.
    pub async fn insert(&self, reseller: &Reseller) -> DbResult<()> {
        debug!(id = %reseller.id, token = %reseller.catalog_token, "Inserting reseller");

        sqlx::query(
            r#"
            INSERT INTO resellers (
                id, name, phone, address, branch_id, commission_rate,
                is_active, catalog_token, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&reseller.id)
        .bind(&reseller.name)
        .bind(&reseller.phone)
        .bind(&reseller.address)
        .bind(&reseller.branch_id)
        .bind(reseller.commission_rate_bps)
        .bind(reseller.is_active)
        .bind(&reseller.catalog_token)
        .bind(reseller.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } if field.ends_with("catalog_token") => {
                DbError::duplicate("catalog_token", reseller.catalog_token.clone())
            }
            other => other,
        })?;

        Ok(())
    }

    /// Activates or deactivates a reseller.
    pub async fn set_active(&self, id: &str, is_active: bool) -> DbResult<()> {
        debug!(id = %id, is_active, "Changing reseller active flag");

        let result = sqlx::query("UPDATE resellers SET is_active = ?2 WHERE id = ?1")
            .bind(id)
            .bind(is_active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Reseller", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn reseller(id: &str, token: &str) -> Reseller {
        Reseller {
            id: id.to_string(),
            name: format!("Mitra {}", id),
            phone: "081200000000".to_string(),
            address: None,
            branch_id: Some("cabang-1".to_string()),
            commission_rate_bps: 1_000,
            is_active: true,
            catalog_token: token.to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_find_active_by_token() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.resellers().insert(&reseller("r1", "tok-1")).await.unwrap();

        let found = db.resellers().find_active_by_token("tok-1").await.unwrap();
        assert_eq!(found.unwrap().id, "r1");

        db.resellers().set_active("r1", false).await.unwrap();
        assert!(db
            .resellers()
            .find_active_by_token("tok-1")
            .await
            .unwrap()
            .is_none());

        // Still visible by id
        let by_id = db.resellers().get_by_id("r1").await.unwrap().unwrap();
        assert!(!by_id.is_active);
    }

    #[tokio::test]
    async fn test_duplicate_token_is_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.resellers().insert(&reseller("r1", "tok-1")).await.unwrap();

        let err = db
            .resellers()
            .insert(&reseller("r2", "tok-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { field, .. } if field == "catalog_token"));
    }

    #[tokio::test]
    async fn test_list_all_puts_active_first() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.resellers().insert(&reseller("a", "tok-a")).await.unwrap();
        db.resellers().insert(&reseller("b", "tok-b")).await.unwrap();
        db.resellers().set_active("a", false).await.unwrap();

        let all = db.resellers().list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "b");
        assert_eq!(all[1].id, "a");
    }
}
