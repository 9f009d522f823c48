//! Meditation Library Query Handlers

use std::sync::Arc;
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::{
    MeditationRecord, MeditationRepositoryPort, ObjectStoragePort, StorageError,
};
use crate::application::queries::{GetMeditationAudio, ListMeditations};

// ============================================================================
// Response DTOs
// ============================================================================

/// 冥想摘要
#[derive(Debug, Clone)]
pub struct MeditationSummary {
    pub id: Uuid,
    pub display_name: String,
    pub audio_path: String,
    pub duration: String,
    pub created_at: String,
}

impl From<MeditationRecord> for MeditationSummary {
    fn from(record: MeditationRecord) -> Self {
        Self {
            id: record.id,
            display_name: record.display_name,
            audio_path: record.audio_path,
            duration: record.duration,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

/// 签名音频 URL
#[derive(Debug, Clone)]
pub struct SignedAudioUrl {
    pub signed_url: String,
    pub expires_in_secs: u64,
}

// ============================================================================
// Handlers
// ============================================================================

/// ListMeditations Handler
pub struct ListMeditationsHandler {
    meditation_repo: Arc<dyn MeditationRepositoryPort>,
}

impl ListMeditationsHandler {
    pub fn new(meditation_repo: Arc<dyn MeditationRepositoryPort>) -> Self {
        Self { meditation_repo }
    }

    pub async fn handle(&self, query: ListMeditations) -> Result<Vec<MeditationSummary>, ApplicationError> {
        let records = self.meditation_repo.list_by_user(&query.user_id).await?;
        Ok(records.into_iter().map(MeditationSummary::from).collect())
    }
}

/// GetMeditationAudio Handler
pub struct GetMeditationAudioHandler {
    meditation_repo: Arc<dyn MeditationRepositoryPort>,
    object_storage: Arc<dyn ObjectStoragePort>,
    ttl_secs: u64,
}

impl GetMeditationAudioHandler {
    pub fn new(
        meditation_repo: Arc<dyn MeditationRepositoryPort>,
        object_storage: Arc<dyn ObjectStoragePort>,
        ttl_secs: u64,
    ) -> Self {
        Self {
            meditation_repo,
            object_storage,
            ttl_secs,
        }
    }

    pub async fn handle(&self, query: GetMeditationAudio) -> Result<SignedAudioUrl, ApplicationError> {
        let record = self
            .meditation_repo
            .find_by_id(query.meditation_id, &query.user_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Meditation", query.meditation_id))?;

        let signed_url = self
            .object_storage
            .create_signed_url(&record.audio_path, self.ttl_secs)
            .await
            .map_err(|e| match e {
                StorageError::NotFound(_) => {
                    ApplicationError::not_found("Meditation audio", query.meditation_id)
                }
                other => ApplicationError::Storage(other.to_string()),
            })?;

        Ok(SignedAudioUrl {
            signed_url,
            expires_in_secs: self.ttl_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::{InMemoryMeditationRepository, InMemoryObjectStorage};
    use chrono::{Duration, Utc};

    fn record(user_id: &str, minutes_ago: i64) -> MeditationRecord {
        let id = Uuid::new_v4();
        MeditationRecord {
            id,
            user_id: user_id.to_string(),
            audio_path: format!("user_{}/meditation-{}.wav", user_id, id),
            display_name: format!("Session {}", minutes_ago),
            duration: "2:30".to_string(),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_newest_first() {
        let repo = Arc::new(InMemoryMeditationRepository::new());
        let old = record("u1", 10);
        let new = record("u1", 1);
        repo.insert(&old).await.unwrap();
        repo.insert(&new).await.unwrap();
        repo.insert(&record("u2", 5)).await.unwrap();

        let handler = ListMeditationsHandler::new(repo);
        let list = handler
            .handle(ListMeditations {
                user_id: "u1".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, new.id);
        assert_eq!(list[1].id, old.id);
    }

    #[tokio::test]
    async fn test_signed_url_for_existing_record() {
        let repo = Arc::new(InMemoryMeditationRepository::new());
        let storage = Arc::new(InMemoryObjectStorage::new("secret", "http://localhost:5060"));
        let rec = record("u1", 0);
        repo.insert(&rec).await.unwrap();
        storage.upload(&rec.audio_path, b"RIFF").await.unwrap();

        let handler = GetMeditationAudioHandler::new(repo, storage, 3600);
        let signed = handler
            .handle(GetMeditationAudio {
                user_id: "u1".to_string(),
                meditation_id: rec.id,
            })
            .await
            .unwrap();

        assert!(signed
            .signed_url
            .starts_with(&format!("http://localhost:5060/media/{}?expires=", rec.audio_path)));
        assert!(signed.signed_url.contains("&signature="));
        assert_eq!(signed.expires_in_secs, 3600);
    }

    #[tokio::test]
    async fn test_signed_url_for_unknown_record_is_not_found() {
        let repo = Arc::new(InMemoryMeditationRepository::new());
        let storage = Arc::new(InMemoryObjectStorage::new("secret", "http://localhost"));
        let handler = GetMeditationAudioHandler::new(repo, storage, 3600);

        let err = handler
            .handle(GetMeditationAudio {
                user_id: "u1".to_string(),
                meditation_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.reason(), "not_found");
    }
}
