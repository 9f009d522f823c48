//! Repository Ports - 出站端口
//!
//! 定义数据持久化的抽象接口
//! 具体实现在 infrastructure 层（SQLite / 内存）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::credits::CreditBalance;

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// ============================================================================
// Meditation Repository
// ============================================================================

/// 冥想记录
#[derive(Debug, Clone, PartialEq)]
pub struct MeditationRecord {
    pub id: Uuid,
    pub user_id: String,
    /// 对象存储中的完整路径
    pub audio_path: String,
    pub display_name: String,
    /// `m:ss`
    pub duration: String,
    pub created_at: DateTime<Utc>,
}

/// Meditation Repository Port
///
/// 所有查询都按 user_id 隔离，其他用户的记录视为不存在
#[async_trait]
pub trait MeditationRepositoryPort: Send + Sync {
    /// 插入新记录
    async fn insert(&self, record: &MeditationRecord) -> Result<(), RepositoryError>;

    /// 查找用户的某条记录
    async fn find_by_id(
        &self,
        id: Uuid,
        user_id: &str,
    ) -> Result<Option<MeditationRecord>, RepositoryError>;

    /// 列出用户的所有记录（按创建时间倒序）
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<MeditationRecord>, RepositoryError>;

    /// 重命名，返回记录是否存在
    async fn rename(
        &self,
        id: Uuid,
        user_id: &str,
        display_name: &str,
    ) -> Result<bool, RepositoryError>;

    /// 删除，返回记录是否存在
    async fn delete(&self, id: Uuid, user_id: &str) -> Result<bool, RepositoryError>;
}

// ============================================================================
// Credit Repository
// ============================================================================

/// Credit Repository Port
#[async_trait]
pub trait CreditRepositoryPort: Send + Sync {
    /// 查询用户额度
    async fn get(&self, user_id: &str) -> Result<Option<CreditBalance>, RepositoryError>;

    /// 不存在时写入初始额度，返回当前存储的额度
    async fn ensure(&self, initial: &CreditBalance) -> Result<CreditBalance, RepositoryError>;

    /// 扣减一次额度，不会低于 0
    ///
    /// 返回扣减后的剩余额度；没有可扣减的额度时返回 NotFound
    async fn decrement(&self, user_id: &str) -> Result<i64, RepositoryError>;

    /// 重置额度并记录重置时间
    async fn reset(
        &self,
        user_id: &str,
        count: i64,
        reset_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// 获取所有用户额度
    async fn find_all(&self) -> Result<Vec<CreditBalance>, RepositoryError>;
}
