//! Meditation Library Command Handlers

use std::sync::Arc;

use crate::application::commands::{DeleteMeditation, RenameMeditation};
use crate::application::error::ApplicationError;
use crate::application::ports::{MeditationRepositoryPort, ObjectStoragePort, StorageError};

/// 显示名称最大长度
const MAX_DISPLAY_NAME_CHARS: usize = 120;

// ============================================================================
// RenameMeditation
// ============================================================================

/// RenameMeditation Handler
pub struct RenameMeditationHandler {
    meditation_repo: Arc<dyn MeditationRepositoryPort>,
}

impl RenameMeditationHandler {
    pub fn new(meditation_repo: Arc<dyn MeditationRepositoryPort>) -> Self {
        Self { meditation_repo }
    }

    pub async fn handle(&self, command: RenameMeditation) -> Result<(), ApplicationError> {
        let new_name = command.new_name.trim();
        if new_name.is_empty() {
            return Err(ApplicationError::validation("New name is required"));
        }
        if new_name.chars().count() > MAX_DISPLAY_NAME_CHARS {
            return Err(ApplicationError::validation(format!(
                "Name must be at most {} characters",
                MAX_DISPLAY_NAME_CHARS
            )));
        }

        let found = self
            .meditation_repo
            .rename(command.meditation_id, &command.user_id, new_name)
            .await?;
        if !found {
            return Err(ApplicationError::not_found("Meditation", command.meditation_id));
        }

        tracing::info!(
            user_id = %command.user_id,
            meditation_id = %command.meditation_id,
            display_name = %new_name,
            "Meditation renamed"
        );

        Ok(())
    }
}

// ============================================================================
// DeleteMeditation
// ============================================================================

/// DeleteMeditation Handler
///
/// 对象删除与记录删除不是原子的，两者都会尝试
pub struct DeleteMeditationHandler {
    meditation_repo: Arc<dyn MeditationRepositoryPort>,
    object_storage: Arc<dyn ObjectStoragePort>,
}

impl DeleteMeditationHandler {
    pub fn new(
        meditation_repo: Arc<dyn MeditationRepositoryPort>,
        object_storage: Arc<dyn ObjectStoragePort>,
    ) -> Self {
        Self {
            meditation_repo,
            object_storage,
        }
    }

    pub async fn handle(&self, command: DeleteMeditation) -> Result<(), ApplicationError> {
        let record = self
            .meditation_repo
            .find_by_id(command.meditation_id, &command.user_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Meditation", command.meditation_id))?;

        let storage_result = match self.object_storage.delete(&record.audio_path).await {
            Ok(()) => Ok(()),
            Err(StorageError::NotFound(path)) => {
                tracing::warn!(audio_path = %path, "Audio object already missing");
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    audio_path = %record.audio_path,
                    error = %e,
                    "Failed to delete audio object"
                );
                Err(ApplicationError::Storage(e.to_string()))
            }
        };

        self.meditation_repo
            .delete(command.meditation_id, &command.user_id)
            .await?;

        tracing::info!(
            user_id = %command.user_id,
            meditation_id = %command.meditation_id,
            "Meditation deleted"
        );

        storage_result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MeditationRecord;
    use crate::infrastructure::memory::{InMemoryMeditationRepository, InMemoryObjectStorage};
    use chrono::Utc;
    use uuid::Uuid;

    fn record(user_id: &str) -> MeditationRecord {
        let id = Uuid::new_v4();
        MeditationRecord {
            id,
            user_id: user_id.to_string(),
            audio_path: format!("user_{}/meditation-{}.wav", user_id, id),
            display_name: "Morning calm".to_string(),
            duration: "4:05".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_rename_is_idempotent() {
        let repo = Arc::new(InMemoryMeditationRepository::new());
        let rec = record("u1");
        repo.insert(&rec).await.unwrap();
        let handler = RenameMeditationHandler::new(repo.clone());

        for _ in 0..2 {
            handler
                .handle(RenameMeditation {
                    user_id: "u1".to_string(),
                    meditation_id: rec.id,
                    new_name: "Evening".to_string(),
                })
                .await
                .unwrap();
        }

        let stored = repo.find_by_id(rec.id, "u1").await.unwrap().unwrap();
        assert_eq!(stored.display_name, "Evening");
    }

    #[tokio::test]
    async fn test_rename_requires_name() {
        let repo = Arc::new(InMemoryMeditationRepository::new());
        let handler = RenameMeditationHandler::new(repo);
        let err = handler
            .handle(RenameMeditation {
                user_id: "u1".to_string(),
                meditation_id: Uuid::new_v4(),
                new_name: "   ".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.reason(), "validation");
    }

    #[tokio::test]
    async fn test_rename_other_users_record_is_not_found() {
        let repo = Arc::new(InMemoryMeditationRepository::new());
        let rec = record("u1");
        repo.insert(&rec).await.unwrap();
        let handler = RenameMeditationHandler::new(repo);

        let err = handler
            .handle(RenameMeditation {
                user_id: "u2".to_string(),
                meditation_id: rec.id,
                new_name: "Mine now".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.reason(), "not_found");
    }

    #[tokio::test]
    async fn test_delete_removes_object_and_record() {
        let repo = Arc::new(InMemoryMeditationRepository::new());
        let storage = Arc::new(InMemoryObjectStorage::new("secret", "http://localhost"));
        let rec = record("u1");
        repo.insert(&rec).await.unwrap();
        storage.upload(&rec.audio_path, b"RIFF").await.unwrap();

        let handler = DeleteMeditationHandler::new(repo.clone(), storage.clone());
        handler
            .handle(DeleteMeditation {
                user_id: "u1".to_string(),
                meditation_id: rec.id,
            })
            .await
            .unwrap();

        assert!(repo.find_by_id(rec.id, "u1").await.unwrap().is_none());
        assert!(!storage.exists(&rec.audio_path).await);
    }

    #[tokio::test]
    async fn test_delete_with_missing_object_still_removes_record() {
        let repo = Arc::new(InMemoryMeditationRepository::new());
        let storage = Arc::new(InMemoryObjectStorage::new("secret", "http://localhost"));
        let rec = record("u1");
        repo.insert(&rec).await.unwrap();

        let handler = DeleteMeditationHandler::new(repo.clone(), storage);
        handler
            .handle(DeleteMeditation {
                user_id: "u1".to_string(),
                meditation_id: rec.id,
            })
            .await
            .unwrap();

        assert!(repo.find_by_id(rec.id, "u1").await.unwrap().is_none());
    }
}
