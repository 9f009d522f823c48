//! Object Storage Port - 出站端口
//!
//! 冥想音频的对象存储，路径形如 `user_{hex(user_id)}/meditation-{uuid}.{ext}`

use async_trait::async_trait;
use thiserror::Error;

/// 对象存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid object path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// 构造用户私有目录下的对象路径
///
/// user_id 以十六进制编码，任意字符都不会影响目录结构
pub fn user_object_path(user_id: &str, file_name: &str) -> String {
    format!("user_{}/{}", hex::encode(user_id), file_name)
}

/// Object Storage Port
#[async_trait]
pub trait ObjectStoragePort: Send + Sync {
    /// 写入对象（覆盖已有对象）
    async fn upload(&self, path: &str, data: &[u8]) -> Result<(), StorageError>;

    /// 生成带过期时间的访问 URL，对象不存在时返回 NotFound
    async fn create_signed_url(&self, path: &str, ttl_secs: u64) -> Result<String, StorageError>;

    /// 删除对象，对象不存在时返回 NotFound
    async fn delete(&self, path: &str) -> Result<(), StorageError>;

    /// 读取对象
    async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// 检查对象是否存在
    async fn exists(&self, path: &str) -> bool;
}
