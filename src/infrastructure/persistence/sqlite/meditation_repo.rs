//! SQLite Meditation Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::DbPool;
use crate::application::ports::{MeditationRecord, MeditationRepositoryPort, RepositoryError};

/// SQLite Meditation Repository
pub struct SqliteMeditationRepository {
    pool: DbPool,
}

impl SqliteMeditationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct MeditationRow {
    id: String,
    user_id: String,
    audio_path: String,
    display_name: String,
    duration: String,
    created_at: String,
}

impl TryFrom<MeditationRow> for MeditationRecord {
    type Error = RepositoryError;

    fn try_from(row: MeditationRow) -> Result<Self, Self::Error> {
        Ok(MeditationRecord {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            user_id: row.user_id,
            audio_path: row.audio_path,
            display_name: row.display_name,
            duration: row.duration,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
        })
    }
}

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(e.to_string())
}

#[async_trait]
impl MeditationRepositoryPort for SqliteMeditationRepository {
    async fn insert(&self, record: &MeditationRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO meditations (id, user_id, audio_path, display_name, duration, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(&record.user_id)
        .bind(&record.audio_path)
        .bind(&record.display_name)
        .bind(&record.duration)
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                RepositoryError::Duplicate(record.id.to_string())
            }
            other => db_error(other),
        })?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        id: Uuid,
        user_id: &str,
    ) -> Result<Option<MeditationRecord>, RepositoryError> {
        let row: Option<MeditationRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, audio_path, display_name, duration, created_at
            FROM meditations WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(id.to_string())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(MeditationRecord::try_from).transpose()
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<MeditationRecord>, RepositoryError> {
        let rows: Vec<MeditationRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, audio_path, display_name, duration, created_at
            FROM meditations WHERE user_id = ? ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(MeditationRecord::try_from).collect()
    }

    async fn rename(
        &self,
        id: Uuid,
        user_id: &str,
        display_name: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE meditations SET display_name = ? WHERE id = ? AND user_id = ?")
            .bind(display_name)
            .bind(id.to_string())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid, user_id: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM meditations WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};
    use chrono::Duration;

    async fn setup() -> SqliteMeditationRepository {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteMeditationRepository::new(pool)
    }

    fn record(user_id: &str, minutes_ago: i64) -> MeditationRecord {
        let id = Uuid::new_v4();
        MeditationRecord {
            id,
            user_id: user_id.to_string(),
            audio_path: format!("user_{}/meditation-{}.wav", user_id, id),
            display_name: "Evening calm".to_string(),
            duration: "4:05".to_string(),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = setup().await;
        let rec = record("u1", 0);
        repo.insert(&rec).await.unwrap();

        let found = repo.find_by_id(rec.id, "u1").await.unwrap().unwrap();
        assert_eq!(found.audio_path, rec.audio_path);
        assert_eq!(found.duration, "4:05");
        assert!(repo.find_by_id(rec.id, "u2").await.unwrap().is_none());
        assert!(matches!(repo.insert(&rec).await, Err(RepositoryError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let repo = setup().await;
        let old = record("u1", 30);
        let new = record("u1", 1);
        repo.insert(&old).await.unwrap();
        repo.insert(&new).await.unwrap();
        repo.insert(&record("u2", 0)).await.unwrap();

        let list = repo.list_by_user("u1").await.unwrap();
        assert_eq!(list.iter().map(|r| r.id).collect::<Vec<_>>(), vec![new.id, old.id]);
    }

    #[tokio::test]
    async fn test_rename_and_delete_are_scoped() {
        let repo = setup().await;
        let rec = record("u1", 0);
        repo.insert(&rec).await.unwrap();

        assert!(repo.rename(rec.id, "u1", "Morning").await.unwrap());
        assert!(repo.rename(rec.id, "u1", "Morning").await.unwrap());
        assert!(!repo.rename(rec.id, "u2", "Stolen").await.unwrap());
        assert_eq!(
            repo.find_by_id(rec.id, "u1").await.unwrap().unwrap().display_name,
            "Morning"
        );

        assert!(!repo.delete(rec.id, "u2").await.unwrap());
        assert!(repo.delete(rec.id, "u1").await.unwrap());
        assert!(!repo.delete(rec.id, "u1").await.unwrap());
    }
}
