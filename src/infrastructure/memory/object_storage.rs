//! In-Memory Object Storage

use async_trait::async_trait;
use dashmap::DashMap;

use crate::application::ports::{ObjectStoragePort, StorageError};
use crate::infrastructure::adapters::storage::{validate_object_path, UrlSigner};

/// 内存对象存储，签名链接格式与文件存储一致
pub struct InMemoryObjectStorage {
    objects: DashMap<String, Vec<u8>>,
    signer: UrlSigner,
    public_base_url: String,
}

impl InMemoryObjectStorage {
    pub fn new(signing_secret: &str, public_base_url: impl Into<String>) -> Self {
        Self {
            objects: DashMap::new(),
            signer: UrlSigner::new(signing_secret),
            public_base_url: public_base_url.into(),
        }
    }

    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.objects.iter().map(|o| o.key().clone()).collect();
        paths.sort();
        paths
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ObjectStoragePort for InMemoryObjectStorage {
    async fn upload(&self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        validate_object_path(path)?;
        self.objects.insert(path.to_string(), data.to_vec());
        Ok(())
    }

    async fn create_signed_url(&self, path: &str, ttl_secs: u64) -> Result<String, StorageError> {
        if !self.objects.contains_key(path) {
            return Err(StorageError::NotFound(path.to_string()));
        }
        let expires = chrono::Utc::now().timestamp() + ttl_secs as i64;
        Ok(self.signer.signed_url(&self.public_base_url, path, expires))
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.objects
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.objects
            .get(path)
            .map(|o| o.clone())
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn exists(&self, path: &str) -> bool {
        self.objects.contains_key(path)
    }
}
