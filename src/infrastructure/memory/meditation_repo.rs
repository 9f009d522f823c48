//! In-Memory Meditation Repository

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::application::ports::{MeditationRecord, MeditationRepositoryPort, RepositoryError};

/// 内存冥想记录仓储
pub struct InMemoryMeditationRepository {
    records: DashMap<Uuid, MeditationRecord>,
}

impl InMemoryMeditationRepository {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for InMemoryMeditationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MeditationRepositoryPort for InMemoryMeditationRepository {
    async fn insert(&self, record: &MeditationRecord) -> Result<(), RepositoryError> {
        if self.records.contains_key(&record.id) {
            return Err(RepositoryError::Duplicate(record.id.to_string()));
        }
        self.records.insert(record.id, record.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: Uuid,
        user_id: &str,
    ) -> Result<Option<MeditationRecord>, RepositoryError> {
        Ok(self
            .records
            .get(&id)
            .filter(|r| r.user_id == user_id)
            .map(|r| r.clone()))
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<MeditationRecord>, RepositoryError> {
        let mut records: Vec<MeditationRecord> = self
            .records
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.value().clone())
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn rename(
        &self,
        id: Uuid,
        user_id: &str,
        display_name: &str,
    ) -> Result<bool, RepositoryError> {
        match self.records.get_mut(&id) {
            Some(mut record) if record.user_id == user_id => {
                record.display_name = display_name.to_string();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid, user_id: &str) -> Result<bool, RepositoryError> {
        Ok(self
            .records
            .remove_if(&id, |_, record| record.user_id == user_id)
            .is_some())
    }
}
