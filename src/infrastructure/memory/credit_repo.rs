//! In-Memory Credit Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::application::ports::{CreditRepositoryPort, RepositoryError};
use crate::domain::credits::CreditBalance;

/// 内存额度仓储
pub struct InMemoryCreditRepository {
    balances: DashMap<String, CreditBalance>,
}

impl InMemoryCreditRepository {
    pub fn new() -> Self {
        Self {
            balances: DashMap::new(),
        }
    }

    /// 直接写入额度（测试预置数据）
    pub fn insert(&self, balance: CreditBalance) {
        self.balances.insert(balance.user_id.clone(), balance);
    }
}

impl Default for InMemoryCreditRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CreditRepositoryPort for InMemoryCreditRepository {
    async fn get(&self, user_id: &str) -> Result<Option<CreditBalance>, RepositoryError> {
        Ok(self.balances.get(user_id).map(|b| b.clone()))
    }

    async fn ensure(&self, initial: &CreditBalance) -> Result<CreditBalance, RepositoryError> {
        let entry = self
            .balances
            .entry(initial.user_id.clone())
            .or_insert_with(|| initial.clone());
        Ok(entry.clone())
    }

    async fn decrement(&self, user_id: &str) -> Result<i64, RepositoryError> {
        match self.balances.entry(user_id.to_string()) {
            Entry::Occupied(mut entry) if entry.get().count > 0 => {
                let balance = entry.get_mut();
                balance.count -= 1;
                Ok(balance.count)
            }
            _ => Err(RepositoryError::NotFound(format!(
                "No remaining credits for user {}",
                user_id
            ))),
        }
    }

    async fn reset(
        &self,
        user_id: &str,
        count: i64,
        reset_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut balance = self
            .balances
            .get_mut(user_id)
            .ok_or_else(|| RepositoryError::NotFound(user_id.to_string()))?;
        balance.count = count;
        balance.last_reset_at = Some(reset_at);
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<CreditBalance>, RepositoryError> {
        Ok(self.balances.iter().map(|b| b.value().clone()).collect())
    }
}
