//! File Storage - 文件系统对象存储实现
//!
//! 实现 ObjectStoragePort trait，对象路径映射为根目录下的相对路径

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::application::ports::{ObjectStoragePort, StorageError};

use super::signer::UrlSigner;

/// 校验对象路径，只允许普通的相对路径片段
pub fn validate_object_path(path: &str) -> Result<PathBuf, StorageError> {
    if path.is_empty() || path.contains('\\') || path.contains('\0') {
        return Err(StorageError::InvalidPath(path.to_string()));
    }

    let relative = Path::new(path);
    let all_normal = relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)));
    if !all_normal {
        return Err(StorageError::InvalidPath(path.to_string()));
    }

    Ok(relative.to_path_buf())
}

/// 文件系统对象存储
pub struct FileObjectStorage {
    /// 存储根目录
    base_dir: PathBuf,
    signer: UrlSigner,
    /// 签名链接的 Base URL
    public_base_url: String,
}

impl FileObjectStorage {
    /// 创建新的文件存储
    pub async fn new(
        base_dir: impl AsRef<Path>,
        signer: UrlSigner,
        public_base_url: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        // 确保目录存在
        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;

        Ok(Self {
            base_dir,
            signer,
            public_base_url: public_base_url.into(),
        })
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        Ok(self.base_dir.join(validate_object_path(path)?))
    }
}

#[async_trait]
impl ObjectStoragePort for FileObjectStorage {
    async fn upload(&self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        let full_path = self.resolve(path)?;

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::IoError(e.to_string()))?;
        }

        fs::write(&full_path, data)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;

        tracing::debug!(path = %path, size = data.len(), "Object stored");
        Ok(())
    }

    async fn create_signed_url(&self, path: &str, ttl_secs: u64) -> Result<String, StorageError> {
        if !self.exists(path).await {
            return Err(StorageError::NotFound(path.to_string()));
        }

        let expires = chrono::Utc::now().timestamp() + ttl_secs as i64;
        Ok(self.signer.signed_url(&self.public_base_url, path, expires))
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let full_path = self.resolve(path)?;

        match fs::remove_file(&full_path).await {
            Ok(()) => {
                tracing::debug!(path = %path, "Object deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => Err(StorageError::IoError(e.to_string())),
        }
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let full_path = self.resolve(path)?;

        match fs::read(&full_path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => Err(StorageError::IoError(e.to_string())),
        }
    }

    async fn exists(&self, path: &str) -> bool {
        match self.resolve(path) {
            Ok(full_path) => fs::metadata(&full_path)
                .await
                .map(|meta| meta.is_file())
                .unwrap_or(false),
            Err(_) => false,
        }
    }
}
