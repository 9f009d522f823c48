//! SQLite Credit Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::DbPool;
use crate::application::ports::{CreditRepositoryPort, RepositoryError};
use crate::domain::credits::{CreditBalance, PlanTier};

/// SQLite Credit Repository
pub struct SqliteCreditRepository {
    pool: DbPool,
}

impl SqliteCreditRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct CreditRow {
    user_id: String,
    credits: i64,
    subscription_plan: String,
    last_reset_at: Option<String>,
}

impl TryFrom<CreditRow> for CreditBalance {
    type Error = RepositoryError;

    fn try_from(row: CreditRow) -> Result<Self, Self::Error> {
        let last_reset_at = row
            .last_reset_at
            .map(|ts| {
                DateTime::parse_from_rfc3339(&ts)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| RepositoryError::SerializationError(e.to_string()))
            })
            .transpose()?;

        Ok(CreditBalance {
            user_id: row.user_id,
            count: row.credits,
            plan: PlanTier::parse(&row.subscription_plan),
            last_reset_at,
        })
    }
}

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(e.to_string())
}

const SELECT_COLUMNS: &str = "SELECT user_id, credits, subscription_plan, last_reset_at FROM user_credits";

#[async_trait]
impl CreditRepositoryPort for SqliteCreditRepository {
    async fn get(&self, user_id: &str) -> Result<Option<CreditBalance>, RepositoryError> {
        let row: Option<CreditRow> = sqlx::query_as(&format!("{} WHERE user_id = ?", SELECT_COLUMNS))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.map(CreditBalance::try_from).transpose()
    }

    async fn ensure(&self, initial: &CreditBalance) -> Result<CreditBalance, RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO user_credits (user_id, credits, subscription_plan, last_reset_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id) DO NOTHING
            "#,
        )
        .bind(&initial.user_id)
        .bind(initial.count)
        .bind(initial.plan.as_str())
        .bind(initial.last_reset_at.map(|ts| ts.to_rfc3339()))
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        self.get(&initial.user_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(initial.user_id.clone()))
    }

    async fn decrement(&self, user_id: &str) -> Result<i64, RepositoryError> {
        // 条件更新保证额度不会低于 0
        let remaining: Option<i64> = sqlx::query_scalar(
            "UPDATE user_credits SET credits = credits - 1 WHERE user_id = ? AND credits > 0 RETURNING credits",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        remaining.ok_or_else(|| {
            RepositoryError::NotFound(format!("No remaining credits for user {}", user_id))
        })
    }

    async fn reset(
        &self,
        user_id: &str,
        count: i64,
        reset_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE user_credits SET credits = ?, last_reset_at = ? WHERE user_id = ?")
            .bind(count)
            .bind(reset_at.to_rfc3339())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(user_id.to_string()));
        }
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<CreditBalance>, RepositoryError> {
        let rows: Vec<CreditRow> = sqlx::query_as(SELECT_COLUMNS)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.into_iter().map(CreditBalance::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::credits::CreditPolicy;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};

    async fn setup() -> SqliteCreditRepository {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteCreditRepository::new(pool)
    }

    #[tokio::test]
    async fn test_ensure_is_insert_if_absent() {
        let repo = setup().await;
        let initial = CreditBalance::provisioned("u1", &CreditPolicy::default(), Utc::now());

        assert_eq!(repo.ensure(&initial).await.unwrap().count, 3);
        assert_eq!(repo.decrement("u1").await.unwrap(), 2);
        let again = repo.ensure(&initial).await.unwrap();
        assert_eq!(again.count, 2);
        assert_eq!(again.plan, PlanTier::Free);
        assert!(again.last_reset_at.is_some());
    }

    #[tokio::test]
    async fn test_decrement_never_goes_negative() {
        let repo = setup().await;
        repo.ensure(&CreditBalance {
            user_id: "u1".to_string(),
            count: 1,
            plan: PlanTier::Pro,
            last_reset_at: None,
        })
        .await
        .unwrap();

        assert_eq!(repo.decrement("u1").await.unwrap(), 0);
        assert!(matches!(repo.decrement("u1").await, Err(RepositoryError::NotFound(_))));
        assert!(matches!(repo.decrement("ghost").await, Err(RepositoryError::NotFound(_))));
        assert_eq!(repo.get("u1").await.unwrap().unwrap().count, 0);
    }

    #[tokio::test]
    async fn test_reset_and_find_all() {
        let repo = setup().await;
        let now = Utc::now();
        repo.ensure(&CreditBalance {
            user_id: "pro".to_string(),
            count: 0,
            plan: PlanTier::Pro,
            last_reset_at: None,
        })
        .await
        .unwrap();

        repo.reset("pro", 30, now).await.unwrap();
        let all = repo.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].count, 30);
        assert_eq!(all[0].plan, PlanTier::Pro);
        assert_eq!(
            all[0].last_reset_at.map(|ts| ts.timestamp_micros()),
            Some(now.timestamp_micros())
        );
        assert!(repo.reset("ghost", 3, now).await.is_err());
    }
}
